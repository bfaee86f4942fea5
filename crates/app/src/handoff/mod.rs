//! Checkout Handoff
//!
//! Carries the shopper's selected items and applied promotion from the cart
//! view into checkout through a key-value store, so the snapshot survives a
//! restart between the two.

use std::sync::Arc;

use jiff::Timestamp;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use checkout::{items::LineItem, orders::OrderUuid, promotions::Promotion};

pub use errors::{HandoffError, StoreError};
pub use store::{FileStore, HandoffStore, MemoryStore};

mod errors;
mod store;

/// Key holding the frozen line items.
pub const ITEMS_KEY: &str = "checkout.items";

/// Key holding the applied promotion, absent when none is applied.
pub const PROMOTION_KEY: &str = "checkout.promotion";

/// Key holding the most recently placed order.
pub const LAST_ORDER_KEY: &str = "checkout.last_order";

/// What checkout starts from: the items and promotion frozen at handoff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutSnapshot {
    /// Selected items, in cart order
    pub items: Vec<LineItem>,

    /// Promotion applied in the cart, if any
    pub promotion: Option<Promotion>,
}

/// Reference to the last successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastOrder {
    /// Created order
    pub order_uuid: OrderUuid,

    /// When checkout completed
    pub placed_at: Timestamp,
}

/// Freezes and restores checkout snapshots.
#[derive(Clone)]
pub struct CheckoutHandoff {
    store: Arc<dyn HandoffStore>,
}

impl std::fmt::Debug for CheckoutHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutHandoff").finish_non_exhaustive()
    }
}

impl CheckoutHandoff {
    /// Handoff backed by `store`.
    pub fn new(store: Arc<dyn HandoffStore>) -> Self {
        Self { store }
    }

    /// Handoff backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist `items` and `promotion`, replacing any previous snapshot.
    ///
    /// With no promotion the promotion key is removed. The items key is
    /// dropped first and written last, so a failure part way leaves no
    /// snapshot rather than items paired with an older promotion.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError`] when encoding or the store fails.
    #[instrument(
        name = "handoff.freeze",
        skip_all,
        fields(items = items.len(), promotion = promotion.map(|p| p.code.as_str())),
        err
    )]
    pub fn freeze(
        &self,
        items: &[LineItem],
        promotion: Option<&Promotion>,
    ) -> Result<CheckoutSnapshot, HandoffError> {
        self.store.remove(ITEMS_KEY)?;

        match promotion {
            Some(promotion) => self.write(PROMOTION_KEY, promotion)?,
            None => self.store.remove(PROMOTION_KEY)?,
        }

        self.write(ITEMS_KEY, items)?;

        Ok(CheckoutSnapshot {
            items: items.to_vec(),
            promotion: promotion.cloned(),
        })
    }

    /// Read back the last frozen snapshot. Missing keys read as empty.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError`] when decoding or the store fails.
    #[instrument(name = "handoff.restore", skip_all, err)]
    pub fn restore(&self) -> Result<CheckoutSnapshot, HandoffError> {
        let items: Option<Vec<LineItem>> = self.read(ITEMS_KEY)?;
        let promotion: Option<Promotion> = self.read(PROMOTION_KEY)?;

        let snapshot = CheckoutSnapshot {
            items: items.unwrap_or_default(),
            promotion,
        };

        debug!(items = snapshot.items.len(), "snapshot restored");

        Ok(snapshot)
    }

    /// Delete the frozen snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError`] when the store fails.
    #[instrument(name = "handoff.clear", skip_all, err)]
    pub fn clear(&self) -> Result<(), HandoffError> {
        self.store.remove(ITEMS_KEY)?;
        self.store.remove(PROMOTION_KEY)?;

        Ok(())
    }

    /// Remember `order` as the last placed order.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError`] when encoding or the store fails.
    pub fn record_last_order(&self, order: &LastOrder) -> Result<(), HandoffError> {
        self.write(LAST_ORDER_KEY, order)
    }

    /// The last placed order, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError`] when decoding or the store fails.
    pub fn last_order(&self) -> Result<Option<LastOrder>, HandoffError> {
        self.read(LAST_ORDER_KEY)
    }

    fn write<T>(&self, key: &'static str, value: &T) -> Result<(), HandoffError>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_json::to_string(value)
            .map_err(|source| HandoffError::Malformed { key, source })?;

        self.store.set(key, &encoded)?;

        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, HandoffError> {
        self.store
            .get(key)?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|source| HandoffError::Malformed { key, source })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use checkout::fixtures::{line_item_named, percentage_off};
    use testresult::TestResult;

    use super::*;

    /// Memory store that refuses writes to one key.
    struct RefusingStore {
        inner: MemoryStore,
        refused: &'static str,
    }

    impl HandoffStore for RefusingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.refused {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }

            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn restore_returns_what_was_frozen() -> TestResult {
        let handoff = CheckoutHandoff::in_memory();
        let items = vec![
            line_item_named("Linen Shirt", 200_000, 2),
            line_item_named("Canvas Tote", 90_000, 1),
        ];
        let promotion = percentage_off("SAVE10", 10);

        let frozen = handoff.freeze(&items, Some(&promotion))?;
        let restored = handoff.restore()?;

        assert_eq!(restored, frozen);
        assert_eq!(restored.items, items);
        assert_eq!(restored.promotion, Some(promotion));

        Ok(())
    }

    #[test]
    fn restore_with_nothing_frozen_is_empty() -> TestResult {
        let snapshot = CheckoutHandoff::in_memory().restore()?;

        assert!(snapshot.items.is_empty());
        assert!(snapshot.promotion.is_none());

        Ok(())
    }

    #[test]
    fn freeze_replaces_previous_snapshot() -> TestResult {
        let handoff = CheckoutHandoff::in_memory();

        handoff.freeze(
            &[line_item_named("Linen Shirt", 200_000, 2)],
            Some(&percentage_off("SAVE10", 10)),
        )?;
        handoff.freeze(&[line_item_named("Canvas Tote", 90_000, 1)], None)?;

        let restored = handoff.restore()?;

        assert_eq!(restored.items.len(), 1);
        assert!(restored.promotion.is_none());

        Ok(())
    }

    #[test]
    fn freeze_without_promotion_removes_the_key() -> TestResult {
        let store = Arc::new(MemoryStore::new());
        let handoff = CheckoutHandoff::new(store.clone());

        handoff.freeze(&[], Some(&percentage_off("SAVE10", 10)))?;

        assert!(store.get(PROMOTION_KEY)?.is_some());

        handoff.freeze(&[], None)?;

        assert_eq!(store.get(PROMOTION_KEY)?, None);
        assert_eq!(store.get(ITEMS_KEY)?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn clear_removes_snapshot_but_keeps_last_order() -> TestResult {
        let handoff = CheckoutHandoff::in_memory();
        let order = LastOrder {
            order_uuid: OrderUuid::now_v7(),
            placed_at: Timestamp::now(),
        };

        handoff.freeze(&[line_item_named("Linen Shirt", 200_000, 2)], None)?;
        handoff.record_last_order(&order)?;
        handoff.clear()?;

        assert!(handoff.restore()?.items.is_empty());
        assert_eq!(handoff.last_order()?, Some(order));

        Ok(())
    }

    #[test]
    fn snapshot_survives_file_store_reopen() -> TestResult {
        let dir = tempfile::tempdir()?;
        let items = vec![line_item_named("Linen Shirt", 200_000, 2)];

        CheckoutHandoff::new(Arc::new(FileStore::new(dir.path()))).freeze(&items, None)?;

        let restored = CheckoutHandoff::new(Arc::new(FileStore::new(dir.path()))).restore()?;

        assert_eq!(restored.items, items);

        Ok(())
    }

    #[test]
    fn failed_promotion_write_leaves_no_snapshot() -> TestResult {
        let inner = MemoryStore::new();
        let earlier = vec![line_item_named("Canvas Tote", 90_000, 1)];

        inner.set(ITEMS_KEY, &serde_json::to_string(&earlier)?)?;
        inner.set(
            PROMOTION_KEY,
            &serde_json::to_string(&percentage_off("OLD5", 5))?,
        )?;

        let handoff = CheckoutHandoff::new(Arc::new(RefusingStore {
            inner,
            refused: PROMOTION_KEY,
        }));

        let result = handoff.freeze(
            &[line_item_named("Linen Shirt", 200_000, 2)],
            Some(&percentage_off("SAVE10", 10)),
        );

        assert!(matches!(result, Err(HandoffError::Store(StoreError::Io { .. }))));
        assert!(handoff.restore()?.items.is_empty());

        Ok(())
    }

    #[test]
    fn malformed_value_is_reported() -> TestResult {
        let store = Arc::new(MemoryStore::new());

        store.set(ITEMS_KEY, "{not json")?;

        let result = CheckoutHandoff::new(store).restore();

        assert!(matches!(
            result,
            Err(HandoffError::Malformed { key: ITEMS_KEY, .. })
        ));

        Ok(())
    }
}
