//! Checkout state machine.

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use tracing::{info, instrument, warn};

use checkout::{
    accounts::{Address, AddressUuid, choose_default},
    items::LineItem,
    orders::{OrderConfirmation, OrderDetails, OrderRequest},
    payments::{PaymentMethod, find_method},
    pricing::{Totals, price_items},
    promotions::Promotion,
    validation::{ValidationError, normalize_note},
};

use crate::{
    checkout::{
        errors::CheckoutError,
        steps::Step,
        wallet::{WalletReference, order_token},
    },
    handoff::{CheckoutHandoff, CheckoutSnapshot, LastOrder},
    remote::{OrdersApi, PaymentMethodsApi},
    session::Session,
    settings::CheckoutSettings,
};

/// Remote collaborators checkout talks to.
#[derive(Clone)]
pub struct CheckoutServices {
    /// Payment method catalog
    pub payment_methods: Arc<dyn PaymentMethodsApi>,

    /// Order creation
    pub orders: Arc<dyn OrdersApi>,
}

impl fmt::Debug for CheckoutServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutServices").finish_non_exhaustive()
    }
}

/// One checkout attempt over a frozen snapshot.
///
/// The snapshot is never modified. Moving backwards keeps every choice made
/// so far, and a failed submission leaves the step unchanged so it can be
/// retried.
pub struct Checkout {
    session: Arc<Session>,
    handoff: CheckoutHandoff,
    orders: Arc<dyn OrdersApi>,
    settings: Arc<CheckoutSettings>,
    snapshot: CheckoutSnapshot,
    payment_methods: Vec<PaymentMethod>,
    address: Option<AddressUuid>,
    payment_method: Option<String>,
    note: Option<String>,
    step: Step,
    last_error: Option<String>,
}

impl fmt::Debug for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout")
            .field("account", &self.session.account())
            .field("items", &self.snapshot.items.len())
            .field("address", &self.address)
            .field("payment_method", &self.payment_method)
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

impl Checkout {
    /// Start checkout from the snapshot frozen by the cart.
    ///
    /// The default address (or the first one) and the first payment method
    /// are preselected.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptySelection`]: the snapshot has no items.
    /// - [`CheckoutError::Handoff`]: the snapshot could not be read.
    /// - [`CheckoutError::Remote`]: the payment catalog could not be fetched.
    #[instrument(
        name = "checkout.begin",
        skip_all,
        fields(account = %session.account()),
        err
    )]
    pub async fn begin(
        session: Arc<Session>,
        handoff: CheckoutHandoff,
        services: CheckoutServices,
        settings: Arc<CheckoutSettings>,
    ) -> Result<Self, CheckoutError> {
        let snapshot = handoff.restore()?;

        if snapshot.items.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }

        let payment_methods = services.payment_methods.list_payment_methods().await?;

        let address = choose_default(session.addresses()).map(|address| address.uuid);
        let payment_method = payment_methods.first().map(|method| method.code.clone());

        info!(
            items = snapshot.items.len(),
            payment_methods = payment_methods.len(),
            "checkout started"
        );

        Ok(Self {
            session,
            handoff,
            orders: services.orders,
            settings,
            snapshot,
            payment_methods,
            address,
            payment_method,
            note: None,
            step: Step::ShippingInfo,
            last_error: None,
        })
    }

    /// Current step.
    pub fn step(&self) -> &Step {
        &self.step
    }

    /// Frozen items being ordered.
    pub fn items(&self) -> &[LineItem] {
        &self.snapshot.items
    }

    /// Promotion carried over from the cart.
    pub fn promotion(&self) -> Option<&Promotion> {
        self.snapshot.promotion.as_ref()
    }

    /// Payment methods on offer.
    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    /// Selected shipping address.
    pub fn address(&self) -> Option<&Address> {
        self.address
            .and_then(|uuid| self.session.profile().address(uuid))
    }

    /// Selected payment method.
    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_method
            .as_deref()
            .and_then(|code| find_method(&self.payment_methods, code))
    }

    /// Order note.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Message from the last failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Totals for the frozen snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Pricing`] when the amounts overflow.
    pub fn totals(&self) -> Result<Totals, CheckoutError> {
        Ok(price_items(
            &self.snapshot.items,
            self.snapshot.promotion.as_ref(),
            self.settings.shipping_fee,
            self.settings.currency,
        )?)
    }

    /// Choose the shipping address.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InvalidStep`]: not in shipping info.
    /// - [`ValidationError::UnknownAddress`]: not in the shopper's address book.
    pub fn select_address(&mut self, uuid: AddressUuid) -> Result<(), CheckoutError> {
        self.expect_shipping_info("select an address")?;

        if self.session.profile().address(uuid).is_none() {
            return Err(ValidationError::UnknownAddress.into());
        }

        self.address = Some(uuid);

        Ok(())
    }

    /// Set the order note. Blank text clears it.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InvalidStep`]: not in shipping info.
    /// - [`ValidationError::NoteTooLong`]: the trimmed note is too long.
    pub fn set_note(&mut self, text: &str) -> Result<(), CheckoutError> {
        self.expect_shipping_info("edit the note")?;

        self.note = normalize_note(text)?;

        Ok(())
    }

    /// Choose how to pay.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InvalidStep`]: not in payment selection.
    /// - [`ValidationError::UnknownPaymentMethod`]: not in the catalog.
    pub fn select_payment_method(&mut self, code: &str) -> Result<(), CheckoutError> {
        if !matches!(self.step, Step::PaymentSelection) {
            return Err(self.invalid("select a payment method"));
        }

        let method = find_method(&self.payment_methods, code)
            .ok_or_else(|| ValidationError::UnknownPaymentMethod(code.to_string()))?;

        self.payment_method = Some(method.code.clone());

        Ok(())
    }

    /// Move to the next step.
    ///
    /// From payment selection a wallet method moves to wallet confirmation;
    /// any other method submits the order.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NoAddressSelected`]: leaving shipping info without
    ///   an address.
    /// - [`ValidationError::NoPaymentMethodSelected`]: leaving payment
    ///   selection without a method.
    /// - [`CheckoutError::Remote`]: the order could not be created.
    /// - [`CheckoutError::InvalidStep`]: checkout is already completed.
    #[instrument(name = "checkout.advance", skip(self), fields(step = self.step.name()), err)]
    pub async fn advance(&mut self) -> Result<&Step, CheckoutError> {
        match self.step {
            Step::ShippingInfo => {
                self.selected_address()?;
                self.step = Step::PaymentSelection;
            }
            Step::PaymentSelection => {
                let method = self.selected_payment_method()?.clone();

                if method.category.requires_wallet_confirmation() {
                    let totals = self.totals()?;
                    let reference = WalletReference::new(
                        &self.settings.wallet_link_base,
                        &method,
                        &totals,
                        order_token(),
                    );

                    info!(
                        provider = %reference.provider,
                        amount = reference.amount,
                        "awaiting wallet confirmation"
                    );

                    self.step = Step::WalletConfirmation { reference };
                } else {
                    self.submit(None).await?;
                }
            }
            Step::WalletConfirmation { .. } => self.confirm_wallet_payment().await?,
            Step::Completed { .. } => return Err(self.invalid("advance")),
        }

        Ok(&self.step)
    }

    /// Submit the order once the shopper has confirmed in their wallet.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InvalidStep`]: not in wallet confirmation.
    /// - [`CheckoutError::Remote`]: the order could not be created.
    pub async fn confirm_wallet_payment(&mut self) -> Result<(), CheckoutError> {
        let Step::WalletConfirmation { reference } = &self.step else {
            return Err(self.invalid("confirm a wallet payment"));
        };

        let token = reference.token.clone();

        self.submit(Some(token)).await
    }

    /// Leave wallet confirmation without paying, keeping every selection.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidStep`] when not in wallet confirmation.
    pub fn cancel_wallet(&mut self) -> Result<(), CheckoutError> {
        if !matches!(self.step, Step::WalletConfirmation { .. }) {
            return Err(self.invalid("cancel the wallet payment"));
        }

        self.step = Step::PaymentSelection;

        Ok(())
    }

    /// Go back one step, keeping every selection.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidStep`] from shipping info or once
    /// completed.
    pub fn retreat(&mut self) -> Result<&Step, CheckoutError> {
        self.step = match self.step {
            Step::PaymentSelection => Step::ShippingInfo,
            Step::WalletConfirmation { .. } => Step::PaymentSelection,
            Step::ShippingInfo | Step::Completed { .. } => return Err(self.invalid("go back")),
        };

        Ok(&self.step)
    }

    /// Give up on this checkout. The frozen snapshot stays in the handoff.
    pub fn abandon(self) {
        info!(step = self.step.name(), "checkout abandoned");
    }

    #[instrument(name = "checkout.submit", skip_all, err)]
    async fn submit(&mut self, payment_token: Option<String>) -> Result<(), CheckoutError> {
        let address = self.selected_address()?.uuid;
        let payment_method = self.selected_payment_method()?.code.clone();
        let totals = self.totals()?;

        let details = OrderDetails {
            account: self.session.account(),
            address,
            payment_method,
            promotion_code: self
                .snapshot
                .promotion
                .as_ref()
                .map(|promotion| promotion.code.clone()),
            note: self.note.clone(),
            payment_token,
        };

        let request = OrderRequest::build(details, &self.snapshot.items, &totals);

        match self.orders.create_order(request).await {
            Ok(order) => {
                self.complete(order);

                Ok(())
            }
            Err(error) => {
                warn!(%error, "order submission failed");

                self.last_error = Some(error.user_message());

                Err(error.into())
            }
        }
    }

    fn complete(&mut self, order: OrderConfirmation) {
        info!(order = %order.order_uuid, "order placed");

        if let Err(error) = self.handoff.clear() {
            warn!(%error, "failed to clear checkout snapshot");
        }

        let last_order = LastOrder {
            order_uuid: order.order_uuid,
            placed_at: Timestamp::now(),
        };

        if let Err(error) = self.handoff.record_last_order(&last_order) {
            warn!(%error, "failed to record last order");
        }

        self.last_error = None;
        self.step = Step::Completed { order };
    }

    fn selected_address(&self) -> Result<&Address, ValidationError> {
        self.address().ok_or(ValidationError::NoAddressSelected)
    }

    fn selected_payment_method(&self) -> Result<&PaymentMethod, ValidationError> {
        self.payment_method()
            .ok_or(ValidationError::NoPaymentMethodSelected)
    }

    fn expect_shipping_info(&self, action: &'static str) -> Result<(), CheckoutError> {
        if matches!(self.step, Step::ShippingInfo) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidStep {
            action,
            step: self.step.name(),
        }
    }
}
