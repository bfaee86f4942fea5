//! Selection

use rustc_hash::FxHashSet;

use crate::items::{LineItem, LineItemUuid};

/// The cart entries the shopper has marked for pricing and checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: FxHashSet<LineItemUuid>,
}

impl SelectionSet {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection containing every given item.
    pub fn all_of(items: &[LineItem]) -> Self {
        Self {
            ids: items.iter().map(|item| item.uuid).collect(),
        }
    }

    /// Include or exclude a single id.
    pub fn set(&mut self, id: LineItemUuid, included: bool) {
        if included {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: LineItemUuid) -> bool {
        self.ids.contains(&id)
    }

    /// Drop ids that no longer reference an item in `items`.
    pub fn retain_present(&mut self, items: &[LineItem]) {
        let present: FxHashSet<LineItemUuid> = items.iter().map(|item| item.uuid).collect();

        self.ids.retain(|id| present.contains(id));
    }

    /// Remove every id.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether every item in `items` is selected (and there is at least one).
    pub fn covers(&self, items: &[LineItem]) -> bool {
        !items.is_empty() && items.iter().all(|item| self.contains(item.uuid))
    }

    /// The selected items, in cart order.
    pub fn filter<'a>(&'a self, items: &'a [LineItem]) -> impl Iterator<Item = &'a LineItem> {
        items.iter().filter(|item| self.contains(item.uuid))
    }
}

impl FromIterator<LineItemUuid> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = LineItemUuid>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
