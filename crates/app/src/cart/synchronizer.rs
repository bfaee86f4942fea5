//! Cart synchronizer.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use rustc_hash::FxHashMap;
use tokio::{sync::broadcast, time};
use tracing::{Instrument, debug, info, info_span, instrument, trace, warn};

use checkout::{
    items::{LineItem, LineItemUuid, VariantUuid},
    pricing::{Totals, price},
    promotions::Promotion,
    selection::SelectionSet,
    validation::ValidationError,
};

use crate::{
    cart::{errors::CartError, events::CartEvent, pending::PendingUpdates},
    handoff::{CheckoutHandoff, CheckoutSnapshot},
    remote::{CartApi, CartItemUpdate, RemoteError},
    session::Session,
    settings::CheckoutSettings,
};

const EVENT_CAPACITY: usize = 64;

/// Quantity the cart service last stored, and the update that stored it.
///
/// Generation 0 is the quantity the cart was loaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Confirmed {
    quantity: u32,
    generation: u64,
}

#[derive(Debug)]
struct CartState {
    items: Vec<LineItem>,
    confirmed: FxHashMap<LineItemUuid, Confirmed>,
    selection: SelectionSet,
    pending: PendingUpdates,
}

impl CartState {
    fn item_mut(&mut self, id: LineItemUuid) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.uuid == id)
    }

    fn contains(&self, id: LineItemUuid) -> bool {
        self.items.iter().any(|item| item.uuid == id)
    }

    /// Record what the service stored for `generation`.
    ///
    /// Replies older than the confirmed generation are dropped. The display
    /// only follows the reply when no newer update is outstanding.
    fn confirm(
        &mut self,
        id: LineItemUuid,
        stored: LineItem,
        generation: u64,
        newest: bool,
    ) -> Option<CartEvent> {
        let confirmed = self.confirmed.get_mut(&id)?;

        if confirmed.generation > generation {
            trace!(generation, confirmed = confirmed.generation, "stale confirmation");

            return None;
        }

        let quantity = stored.quantity;

        *confirmed = Confirmed {
            quantity,
            generation,
        };

        if !newest {
            return None;
        }

        let item = self.item_mut(id)?;

        item.variant = stored.variant;
        item.quantity = quantity;

        Some(CartEvent::QuantityConfirmed { item: id, quantity })
    }

    fn reject(&mut self, id: LineItemUuid, latest: bool, error: &RemoteError) -> Option<CartEvent> {
        let restored = self.confirmed.get(&id)?.quantity;

        if !latest {
            return None;
        }

        self.item_mut(id)?.quantity = restored;

        Some(CartEvent::QuantityRejected {
            item: id,
            restored,
            message: error.user_message(),
        })
    }
}

fn lock(state: &Mutex<CartState>) -> MutexGuard<'_, CartState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn publish(events: &broadcast::Sender<CartEvent>, event: CartEvent) {
    if events.send(event).is_err() {
        trace!("no cart event subscribers");
    }
}

/// A quantity change waiting out its quiet period.
#[derive(Debug, Clone, Copy)]
struct QuantityUpdate {
    item: LineItemUuid,
    variant: VariantUuid,
    quantity: u32,
    generation: u64,
}

/// Authoritative cart for one shopper.
///
/// Holds the line items, the selection set and the last quantity the cart
/// service confirmed for each line. Quantity changes show immediately and are
/// sent per item once no further change has arrived for the quiet period.
/// Dropping the synchronizer leaves in-flight calls running, but their results
/// are discarded.
pub struct CartSynchronizer {
    session: Arc<Session>,
    api: Arc<dyn CartApi>,
    settings: Arc<CheckoutSettings>,
    state: Arc<Mutex<CartState>>,
    events: broadcast::Sender<CartEvent>,
}

impl fmt::Debug for CartSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSynchronizer")
            .field("account", &self.session.account())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CartSynchronizer {
    /// Fetch the shopper's cart. Every item starts unselected.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Remote`] when the cart cannot be fetched.
    #[instrument(
        name = "cart.load",
        skip(session, api, settings),
        fields(account = %session.account()),
        err
    )]
    pub async fn load(
        session: Arc<Session>,
        api: Arc<dyn CartApi>,
        settings: Arc<CheckoutSettings>,
    ) -> Result<Self, CartError> {
        let items = api.get_cart(session.account()).await?;

        info!(items = items.len(), "cart loaded");

        Ok(Self::from_items(session, api, settings, items))
    }

    /// Synchronizer over items that were already fetched.
    pub fn from_items(
        session: Arc<Session>,
        api: Arc<dyn CartApi>,
        settings: Arc<CheckoutSettings>,
        items: Vec<LineItem>,
    ) -> Self {
        let confirmed = items
            .iter()
            .map(|item| {
                let confirmed = Confirmed {
                    quantity: item.quantity,
                    generation: 0,
                };

                (item.uuid, confirmed)
            })
            .collect();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            session,
            api,
            settings,
            state: Arc::new(Mutex::new(CartState {
                items,
                confirmed,
                selection: SelectionSet::new(),
                pending: PendingUpdates::default(),
            })),
            events,
        }
    }

    /// Receive quantity confirmations, rejections and removals.
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Line items as currently displayed, including unconfirmed quantities.
    pub fn items(&self) -> Vec<LineItem> {
        lock(&self.state).items.clone()
    }

    /// Displayed quantity of one line.
    pub fn quantity(&self, id: LineItemUuid) -> Option<u32> {
        lock(&self.state)
            .items
            .iter()
            .find(|item| item.uuid == id)
            .map(|item| item.quantity)
    }

    /// Whether a quantity change for `id` has not been confirmed yet.
    pub fn is_pending(&self, id: LineItemUuid) -> bool {
        lock(&self.state).pending.contains(id)
    }

    /// Ids currently selected for checkout.
    pub fn selection(&self) -> SelectionSet {
        lock(&self.state).selection.clone()
    }

    /// Selected items in cart order.
    pub fn selected_items(&self) -> Vec<LineItem> {
        let state = lock(&self.state);

        state.selection.filter(&state.items).cloned().collect()
    }

    /// Include or exclude one line from checkout.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownItem`] when `id` is not in the cart.
    pub fn select_item(&self, id: LineItemUuid, included: bool) -> Result<(), CartError> {
        let mut state = lock(&self.state);

        if !state.contains(id) {
            return Err(ValidationError::UnknownItem.into());
        }

        state.selection.set(id, included);

        Ok(())
    }

    /// Include or exclude every line.
    pub fn select_all(&self, included: bool) {
        let mut guard = lock(&self.state);
        let state = &mut *guard;

        state.selection = if included {
            SelectionSet::all_of(&state.items)
        } else {
            SelectionSet::new()
        };
    }

    /// Totals for the current selection.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] when the amounts overflow.
    pub fn totals(&self, promotion: Option<&Promotion>) -> Result<Totals, CartError> {
        let state = lock(&self.state);

        Ok(price(
            &state.items,
            &state.selection,
            promotion,
            self.settings.shipping_fee,
            self.settings.currency,
        )?)
    }

    /// Show `quantity` for `id` immediately and schedule it to be sent.
    ///
    /// Only the last quantity set for an item within the quiet period reaches
    /// the cart service. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnknownItem`]: `id` is not in the cart.
    /// - [`ValidationError::QuantityOutOfRange`]: `quantity` is zero or above
    ///   the lower of the cap and the variant's stock. Nothing is scheduled.
    #[instrument(name = "cart.set_quantity", skip(self), fields(item = %id), err)]
    pub fn set_quantity(&self, id: LineItemUuid, quantity: u32) -> Result<(), CartError> {
        let mut state = lock(&self.state);
        let max_quantity = self.settings.max_quantity;

        let item = state.item_mut(id).ok_or(ValidationError::UnknownItem)?;

        item.validate_quantity(quantity, max_quantity)?;
        item.quantity = quantity;

        let variant = item.variant.uuid;
        let generation = state.pending.begin(id);

        let update = QuantityUpdate {
            item: id,
            variant,
            quantity,
            generation,
        };

        let task = send_when_quiet(
            Arc::downgrade(&self.state),
            Arc::clone(&self.api),
            self.events.clone(),
            self.settings.quiet_period,
            update,
        )
        .instrument(info_span!("cart.quantity_update", item = %id, quantity));

        let handle = tokio::spawn(task);

        state.pending.attach(id, generation, handle);

        debug!(generation, "quantity update scheduled");

        Ok(())
    }

    /// Delete a line through the cart service, then drop it locally.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnknownItem`]: `id` is not in the cart.
    /// - [`CartError::Remote`]: the delete failed; the cart is unchanged.
    #[instrument(name = "cart.remove_item", skip(self), fields(item = %id), err)]
    pub async fn remove_item(&self, id: LineItemUuid) -> Result<(), CartError> {
        if !lock(&self.state).contains(id) {
            return Err(ValidationError::UnknownItem.into());
        }

        self.api.remove_item(id).await?;

        {
            let mut guard = lock(&self.state);
            let state = &mut *guard;

            if let Some(handle) = state.pending.forget(id) {
                handle.abort();
            }

            state.items.retain(|item| item.uuid != id);
            state.confirmed.remove(&id);
            state.selection.retain_present(&state.items);
        }

        info!("item removed");

        publish(&self.events, CartEvent::ItemRemoved { item: id });

        Ok(())
    }

    /// Wait for every scheduled quantity update to be sent and answered.
    pub async fn settle(&self) {
        loop {
            let handles = lock(&self.state).pending.take_handles();

            if handles.is_empty() {
                return;
            }

            for handle in handles {
                if let Err(error) = handle.await {
                    warn!(%error, "quantity update task did not finish");
                }
            }
        }
    }

    /// Freeze the selected items and `promotion` for checkout.
    ///
    /// Outstanding quantity updates are settled first so the snapshot carries
    /// confirmed quantities.
    ///
    /// # Errors
    ///
    /// - [`CartError::EmptySelection`]: nothing is selected.
    /// - [`CartError::Handoff`]: the snapshot could not be stored.
    #[instrument(name = "cart.proceed_to_checkout", skip_all, err)]
    pub async fn proceed_to_checkout(
        &self,
        promotion: Option<&Promotion>,
        handoff: &CheckoutHandoff,
    ) -> Result<CheckoutSnapshot, CartError> {
        self.settle().await;

        let items = self.selected_items();

        if items.is_empty() {
            return Err(CartError::EmptySelection);
        }

        Ok(handoff.freeze(&items, promotion)?)
    }
}

async fn send_when_quiet(
    state: Weak<Mutex<CartState>>,
    api: Arc<dyn CartApi>,
    events: broadcast::Sender<CartEvent>,
    quiet_period: Duration,
    update: QuantityUpdate,
) {
    time::sleep(quiet_period).await;

    {
        let Some(shared) = state.upgrade() else {
            debug!("cart closed before quantity update was sent");
            return;
        };

        if !lock(&shared).pending.is_current(update.item, update.generation) {
            trace!("quantity update superseded");
            return;
        }
    }

    let body = CartItemUpdate {
        variant_uuid: update.variant,
        quantity: update.quantity,
    };

    let result = api.update_item(update.item, body).await;

    let Some(shared) = state.upgrade() else {
        debug!("cart closed while quantity update was in flight");
        return;
    };

    let event = {
        let mut state = lock(&shared);
        let latest = state.pending.finish(update.item, update.generation);
        let newest = !state.pending.has_newer(update.item, update.generation);

        match result {
            Ok(stored) => state.confirm(update.item, stored, update.generation, newest),
            Err(error) => {
                warn!(%error, latest, "quantity update rejected");

                state.reject(update.item, latest, &error)
            }
        }
    };

    if let Some(event) = event {
        publish(&events, event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use checkout::{
        accounts::{AccountUuid, Profile},
        fixtures::{line_item_named, line_item_with_stock, percentage_off},
    };
    use mockall::predicate::eq;
    use reqwest::Url;
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{handoff::CheckoutHandoff, remote::MockCartApi};

    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    fn settings() -> TestResult<Arc<CheckoutSettings>> {
        Ok(Arc::new(CheckoutSettings::new(
            iso::VND,
            Url::parse("https://qr.storefront.local/pay")?,
        )))
    }

    fn session() -> Arc<Session> {
        Session::new(Profile {
            account: AccountUuid::now_v7(),
            display_name: "An".to_string(),
            addresses: Vec::new(),
        })
    }

    fn synchronizer(
        api: impl CartApi + 'static,
        items: Vec<LineItem>,
    ) -> TestResult<CartSynchronizer> {
        Ok(CartSynchronizer::from_items(
            session(),
            Arc::new(api),
            settings()?,
            items,
        ))
    }

    fn stored(item: &LineItem, quantity: u32) -> LineItem {
        LineItem {
            quantity,
            ..item.clone()
        }
    }

    /// Cart service that answers each quantity after its own delay.
    struct SlowCart {
        item: LineItem,
        replies: FxHashMap<u32, (Duration, bool)>,
    }

    impl SlowCart {
        fn new(item: &LineItem) -> Self {
            Self {
                item: item.clone(),
                replies: FxHashMap::default(),
            }
        }

        fn accept(mut self, quantity: u32, after: Duration) -> Self {
            self.replies.insert(quantity, (after, true));
            self
        }

        fn refuse(mut self, quantity: u32, after: Duration) -> Self {
            self.replies.insert(quantity, (after, false));
            self
        }
    }

    #[async_trait]
    impl CartApi for SlowCart {
        async fn get_cart(&self, _account: AccountUuid) -> Result<Vec<LineItem>, RemoteError> {
            Ok(vec![self.item.clone()])
        }

        async fn update_item(
            &self,
            _item: LineItemUuid,
            update: CartItemUpdate,
        ) -> Result<LineItem, RemoteError> {
            let (delay, accepted) = self
                .replies
                .get(&update.quantity)
                .copied()
                .unwrap_or((Duration::ZERO, false));

            time::sleep(delay).await;

            if accepted {
                Ok(stored(&self.item, update.quantity))
            } else {
                Err(RemoteError::Status {
                    status: 409,
                    message: "Not enough stock".to_string(),
                })
            }
        }

        async fn remove_item(&self, _item: LineItemUuid) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn load_fetches_cart_with_nothing_selected() -> TestResult {
        let session = session();
        let items = vec![line_item_named("Linen Shirt", 200_000, 2)];
        let returned = items.clone();

        let mut api = MockCartApi::new();

        api.expect_get_cart()
            .with(eq(session.account()))
            .times(1)
            .return_once(move |_| Ok(returned));

        let cart = CartSynchronizer::load(session, Arc::new(api), settings()?).await?;

        assert_eq!(cart.items(), items);
        assert!(cart.selection().is_empty());
        assert_eq!(cart.totals(None)?.subtotal_minor(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_quantity_never_reaches_the_service() -> TestResult {
        let item = line_item_with_stock("Linen Shirt", 200_000, 2, 5);
        let id = item.uuid;

        let mut api = MockCartApi::new();

        api.expect_update_item().never();

        let cart = synchronizer(api, vec![item])?;

        assert!(matches!(
            cart.set_quantity(id, 0),
            Err(CartError::Validation(ValidationError::QuantityOutOfRange { .. }))
        ));
        assert!(matches!(
            cart.set_quantity(id, 6),
            Err(CartError::Validation(ValidationError::QuantityOutOfRange { max: 5, .. }))
        ));
        assert_eq!(cart.quantity(id), Some(2));
        assert!(!cart.is_pending(id));

        Ok(())
    }

    #[tokio::test]
    async fn quantity_above_cap_is_rejected_even_with_stock() -> TestResult {
        let item = line_item_with_stock("Linen Shirt", 200_000, 2, 1_000);
        let id = item.uuid;

        let mut api = MockCartApi::new();

        api.expect_update_item().never();

        let cart = synchronizer(api, vec![item])?;

        assert!(matches!(
            cart.set_quantity(id, 101),
            Err(CartError::Validation(ValidationError::QuantityOutOfRange { max: 100, .. }))
        ));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_changes_send_only_the_last_quantity() -> TestResult {
        let item = line_item_named("Linen Shirt", 200_000, 1);
        let id = item.uuid;
        let confirmed = stored(&item, 4);

        let mut api = MockCartApi::new();

        api.expect_update_item()
            .withf(move |target, update| *target == id && update.quantity == 4)
            .times(1)
            .return_once(move |_, _| Ok(confirmed));

        let cart = synchronizer(api, vec![item])?;
        let mut events = cart.subscribe();

        cart.set_quantity(id, 2)?;
        time::advance(Duration::from_millis(100)).await;
        cart.set_quantity(id, 3)?;
        time::advance(Duration::from_millis(100)).await;
        cart.set_quantity(id, 4)?;

        assert_eq!(cart.quantity(id), Some(4));
        assert!(cart.is_pending(id));

        cart.settle().await;

        assert_eq!(cart.quantity(id), Some(4));
        assert!(!cart.is_pending(id));
        assert_eq!(
            events.recv().await?,
            CartEvent::QuantityConfirmed {
                item: id,
                quantity: 4
            }
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn updates_to_different_items_are_independent() -> TestResult {
        let shirt = line_item_named("Linen Shirt", 200_000, 1);
        let tote = line_item_named("Canvas Tote", 90_000, 1);
        let (shirt_id, tote_id) = (shirt.uuid, tote.uuid);
        let (shirt_stored, tote_stored) = (stored(&shirt, 2), stored(&tote, 3));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut api = MockCartApi::new();

        api.expect_update_item()
            .times(2)
            .returning(move |target, _| {
                counter.fetch_add(1, Ordering::SeqCst);

                if target == shirt_id {
                    Ok(shirt_stored.clone())
                } else {
                    Ok(tote_stored.clone())
                }
            });

        let cart = synchronizer(api, vec![shirt, tote])?;

        cart.set_quantity(shirt_id, 2)?;
        time::advance(Duration::from_millis(300)).await;
        cart.set_quantity(tote_id, 3)?;

        cart.settle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cart.quantity(shirt_id), Some(2));
        assert_eq!(cart.quantity(tote_id), Some(3));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_sent_before_the_quiet_period() -> TestResult {
        let item = line_item_named("Linen Shirt", 200_000, 1);
        let id = item.uuid;

        let mut api = MockCartApi::new();

        api.expect_update_item().never();

        let cart = synchronizer(api, vec![item])?;

        cart.set_quantity(id, 2)?;
        time::advance(QUIET - Duration::from_millis(1)).await;

        assert!(cart.is_pending(id));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_update_rolls_back_and_notifies() -> TestResult {
        let item = line_item_named("Linen Shirt", 200_000, 2);
        let id = item.uuid;

        let mut api = MockCartApi::new();

        api.expect_update_item().times(1).return_once(|_, _| {
            Err(RemoteError::Status {
                status: 409,
                message: "Only 3 left in stock".to_string(),
            })
        });

        let cart = synchronizer(api, vec![item])?;
        let mut events = cart.subscribe();

        cart.set_quantity(id, 5)?;

        assert_eq!(cart.quantity(id), Some(5));

        cart.settle().await;

        assert_eq!(cart.quantity(id), Some(2));
        assert_eq!(
            events.recv().await?,
            CartEvent::QuantityRejected {
                item: id,
                restored: 2,
                message: "Only 3 left in stock".to_string(),
            }
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn late_reply_to_superseded_update_keeps_newer_confirmation() -> TestResult {
        let item = line_item_named("Linen Shirt", 200_000, 2);
        let id = item.uuid;

        let api = SlowCart::new(&item)
            .accept(3, Duration::from_secs(5))
            .accept(4, Duration::ZERO)
            .refuse(5, Duration::ZERO);

        let cart = synchronizer(api, vec![item])?;
        let mut events = cart.subscribe();

        cart.set_quantity(id, 3)?;
        time::sleep(QUIET + Duration::from_millis(1)).await;
        cart.set_quantity(id, 4)?;
        cart.settle().await;

        assert_eq!(cart.quantity(id), Some(4));

        cart.set_quantity(id, 5)?;
        cart.settle().await;

        assert_eq!(cart.quantity(id), Some(4));
        assert_eq!(
            events.recv().await?,
            CartEvent::QuantityConfirmed {
                item: id,
                quantity: 4
            }
        );
        assert_eq!(
            events.recv().await?,
            CartEvent::QuantityRejected {
                item: id,
                restored: 4,
                message: "Not enough stock".to_string(),
            }
        );
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_reply_arriving_first_leaves_display_alone() -> TestResult {
        let item = line_item_named("Linen Shirt", 200_000, 2);
        let id = item.uuid;

        let api = SlowCart::new(&item)
            .accept(3, Duration::from_secs(2))
            .accept(4, Duration::from_secs(5));

        let cart = synchronizer(api, vec![item])?;
        let mut events = cart.subscribe();

        cart.set_quantity(id, 3)?;
        time::sleep(QUIET + Duration::from_millis(1)).await;
        cart.set_quantity(id, 4)?;
        time::sleep(Duration::from_secs(3)).await;

        assert_eq!(cart.quantity(id), Some(4));
        assert!(cart.is_pending(id));
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        cart.settle().await;

        assert_eq!(cart.quantity(id), Some(4));
        assert_eq!(
            events.recv().await?,
            CartEvent::QuantityConfirmed {
                item: id,
                quantity: 4
            }
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_failure_does_not_roll_back() -> TestResult {
        let item = line_item_named("Linen Shirt", 200_000, 2);
        let id = item.uuid;

        let api = SlowCart::new(&item)
            .refuse(3, Duration::from_secs(2))
            .accept(4, Duration::from_secs(5));

        let cart = synchronizer(api, vec![item])?;
        let mut events = cart.subscribe();

        cart.set_quantity(id, 3)?;
        time::sleep(QUIET + Duration::from_millis(1)).await;
        cart.set_quantity(id, 4)?;
        time::sleep(Duration::from_secs(3)).await;

        assert_eq!(cart.quantity(id), Some(4));
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        cart.settle().await;

        assert_eq!(cart.quantity(id), Some(4));
        assert_eq!(
            events.recv().await?,
            CartEvent::QuantityConfirmed {
                item: id,
                quantity: 4
            }
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn older_reply_after_newer_failure_shows_stored_quantity() -> TestResult {
        let item = line_item_named("Linen Shirt", 200_000, 2);
        let id = item.uuid;

        let api = SlowCart::new(&item)
            .accept(3, Duration::from_secs(5))
            .refuse(4, Duration::ZERO);

        let cart = synchronizer(api, vec![item])?;
        let mut events = cart.subscribe();

        cart.set_quantity(id, 3)?;
        time::sleep(QUIET + Duration::from_millis(1)).await;
        cart.set_quantity(id, 4)?;
        cart.settle().await;

        assert_eq!(cart.quantity(id), Some(3));
        assert_eq!(
            events.recv().await?,
            CartEvent::QuantityRejected {
                item: id,
                restored: 2,
                message: "Not enough stock".to_string(),
            }
        );
        assert_eq!(
            events.recv().await?,
            CartEvent::QuantityConfirmed {
                item: id,
                quantity: 3
            }
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_cart_ignores_late_completion() -> TestResult {
        let item = line_item_named("Linen Shirt", 200_000, 1);
        let id = item.uuid;

        let mut api = MockCartApi::new();

        api.expect_update_item().never();

        let cart = synchronizer(api, vec![item])?;

        cart.set_quantity(id, 2)?;
        drop(cart);

        time::sleep(QUIET * 2).await;

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_prunes_selection() -> TestResult {
        let shirt = line_item_named("Linen Shirt", 200_000, 1);
        let tote = line_item_named("Canvas Tote", 90_000, 1);
        let shirt_id = shirt.uuid;

        let mut api = MockCartApi::new();

        api.expect_remove_item()
            .with(eq(shirt_id))
            .times(1)
            .return_once(|_| Ok(()));

        let cart = synchronizer(api, vec![shirt, tote])?;
        let mut events = cart.subscribe();

        cart.select_all(true);
        cart.remove_item(shirt_id).await?;

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.selection().len(), 1);
        assert!(!cart.selection().contains(shirt_id));
        assert_eq!(
            events.recv().await?,
            CartEvent::ItemRemoved { item: shirt_id }
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_remove_leaves_cart_unchanged() -> TestResult {
        let item = line_item_named("Linen Shirt", 200_000, 1);
        let id = item.uuid;

        let mut api = MockCartApi::new();

        api.expect_remove_item().return_once(|_| {
            Err(RemoteError::Status {
                status: 500,
                message: String::new(),
            })
        });

        let cart = synchronizer(api, vec![item])?;

        cart.select_item(id, true)?;

        let result = cart.remove_item(id).await;

        assert!(matches!(result, Err(CartError::Remote(_))));
        assert_eq!(cart.items().len(), 1);
        assert!(cart.selection().contains(id));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_item_is_rejected_locally() -> TestResult {
        let mut api = MockCartApi::new();

        api.expect_remove_item().never();

        let cart = synchronizer(api, vec![line_item_named("Linen Shirt", 200_000, 1)])?;
        let stranger = LineItemUuid::now_v7();

        assert!(matches!(
            cart.select_item(stranger, true),
            Err(CartError::Validation(ValidationError::UnknownItem))
        ));
        assert!(matches!(
            cart.remove_item(stranger).await,
            Err(CartError::Validation(ValidationError::UnknownItem))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn totals_follow_selection() -> TestResult {
        let shirt = line_item_named("Linen Shirt", 200_000, 2);
        let tote = line_item_named("Canvas Tote", 100_000, 1);
        let shirt_id = shirt.uuid;

        let cart = synchronizer(MockCartApi::new(), vec![shirt, tote])?;

        cart.select_item(shirt_id, true)?;

        assert_eq!(cart.totals(None)?.subtotal_minor(), 400_000);

        cart.select_all(true);

        let promotion = percentage_off("SAVE10", 10);
        let totals = cart.totals(Some(&promotion))?;

        assert_eq!(totals.subtotal_minor(), 500_000);
        assert_eq!(totals.discount_minor(), 50_000);
        assert_eq!(totals.total_minor(), 480_000);

        Ok(())
    }

    #[tokio::test]
    async fn proceed_without_selection_is_empty_selection() -> TestResult {
        let cart = synchronizer(
            MockCartApi::new(),
            vec![line_item_named("Linen Shirt", 200_000, 1)],
        )?;

        let result = cart
            .proceed_to_checkout(None, &CheckoutHandoff::in_memory())
            .await;

        assert!(matches!(result, Err(CartError::EmptySelection)));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn proceed_freezes_confirmed_selected_items() -> TestResult {
        let shirt = line_item_named("Linen Shirt", 200_000, 1);
        let tote = line_item_named("Canvas Tote", 90_000, 1);
        let shirt_id = shirt.uuid;
        let confirmed = stored(&shirt, 3);

        let mut api = MockCartApi::new();

        api.expect_update_item()
            .times(1)
            .return_once(move |_, _| Ok(confirmed));

        let cart = synchronizer(api, vec![shirt, tote])?;
        let handoff = CheckoutHandoff::in_memory();
        let promotion = percentage_off("SAVE10", 10);

        cart.select_item(shirt_id, true)?;
        cart.set_quantity(shirt_id, 3)?;

        let frozen = cart.proceed_to_checkout(Some(&promotion), &handoff).await?;

        assert_eq!(frozen.items.len(), 1);
        assert_eq!(frozen.items.first().map(|item| item.quantity), Some(3));
        assert_eq!(handoff.restore()?, frozen);

        Ok(())
    }
}
