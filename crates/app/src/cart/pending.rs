//! Per-item bookkeeping for coalesced quantity updates.

use checkout::items::LineItemUuid;
use rustc_hash::FxHashMap;
use tokio::task::JoinHandle;

#[derive(Debug)]
struct Pending {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

/// Latest scheduled update per line item.
///
/// Tasks of superseded updates are kept until they finish so settling still
/// waits for requests already on the wire.
///
/// Generations are unique across all items, so a task scheduled before an item
/// was forgotten can never be mistaken for a later one.
#[derive(Debug, Default)]
pub(crate) struct PendingUpdates {
    next_generation: u64,
    latest: FxHashMap<LineItemUuid, Pending>,
    superseded: Vec<JoinHandle<()>>,
}

impl PendingUpdates {
    /// Claim a generation for `item`, superseding whatever was scheduled before.
    pub(crate) fn begin(&mut self, item: LineItemUuid) -> u64 {
        self.next_generation += 1;

        let generation = self.next_generation;

        let replaced = self.latest.insert(
            item,
            Pending {
                generation,
                handle: None,
            },
        );

        self.superseded.retain(|handle| !handle.is_finished());
        self.superseded.extend(replaced.and_then(|pending| pending.handle));

        generation
    }

    /// Record the task driving `generation`.
    pub(crate) fn attach(&mut self, item: LineItemUuid, generation: u64, handle: JoinHandle<()>) {
        if let Some(pending) = self
            .latest
            .get_mut(&item)
            .filter(|pending| pending.generation == generation)
        {
            pending.handle = Some(handle);
        }
    }

    /// Whether `generation` is still the newest update for `item`.
    pub(crate) fn is_current(&self, item: LineItemUuid, generation: u64) -> bool {
        self.latest
            .get(&item)
            .is_some_and(|pending| pending.generation == generation)
    }

    /// Whether an update newer than `generation` is scheduled for `item`.
    pub(crate) fn has_newer(&self, item: LineItemUuid, generation: u64) -> bool {
        self.latest
            .get(&item)
            .is_some_and(|pending| pending.generation > generation)
    }

    /// Mark `generation` done. Returns whether it was still the newest.
    pub(crate) fn finish(&mut self, item: LineItemUuid, generation: u64) -> bool {
        let current = self.is_current(item, generation);

        if current {
            self.latest.remove(&item);
        }

        current
    }

    /// Drop `item` entirely, returning the task that was driving it.
    pub(crate) fn forget(&mut self, item: LineItemUuid) -> Option<JoinHandle<()>> {
        self.latest.remove(&item).and_then(|pending| pending.handle)
    }

    /// Whether `item` has an update scheduled or in flight.
    pub(crate) fn contains(&self, item: LineItemUuid) -> bool {
        self.latest.contains_key(&item)
    }

    /// Take every attached task handle, superseded ones included, leaving the
    /// generations in place.
    pub(crate) fn take_handles(&mut self) -> Vec<JoinHandle<()>> {
        let mut handles = std::mem::take(&mut self.superseded);

        handles.extend(
            self.latest
                .values_mut()
                .filter_map(|pending| pending.handle.take()),
        );

        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_generation_supersedes_older() {
        let item = LineItemUuid::now_v7();
        let mut pending = PendingUpdates::default();

        let first = pending.begin(item);
        let second = pending.begin(item);

        assert!(!pending.is_current(item, first));
        assert!(pending.is_current(item, second));
        assert!(!pending.finish(item, first));
        assert!(pending.contains(item));
        assert!(pending.finish(item, second));
        assert!(!pending.contains(item));
    }

    #[test]
    fn only_later_generations_count_as_newer() {
        let item = LineItemUuid::now_v7();
        let mut pending = PendingUpdates::default();

        let first = pending.begin(item);
        let second = pending.begin(item);

        assert!(pending.has_newer(item, first));
        assert!(!pending.has_newer(item, second));
        assert!(pending.finish(item, second));
        assert!(!pending.has_newer(item, first));
    }

    #[tokio::test]
    async fn superseded_task_is_still_handed_out() {
        let item = LineItemUuid::now_v7();
        let mut pending = PendingUpdates::default();

        let first = pending.begin(item);
        pending.attach(item, first, tokio::spawn(std::future::pending::<()>()));

        let second = pending.begin(item);
        pending.attach(item, second, tokio::spawn(async {}));

        let handles = pending.take_handles();

        assert_eq!(handles.len(), 2);
        assert!(pending.take_handles().is_empty());

        for handle in handles {
            handle.abort();
        }
    }

    #[test]
    fn generations_are_independent_per_item() {
        let a = LineItemUuid::now_v7();
        let b = LineItemUuid::now_v7();
        let mut pending = PendingUpdates::default();

        let for_a = pending.begin(a);
        let for_b = pending.begin(b);

        assert!(pending.is_current(a, for_a));
        assert!(pending.is_current(b, for_b));
    }

    #[test]
    fn forgotten_item_does_not_revive_old_generation() {
        let item = LineItemUuid::now_v7();
        let mut pending = PendingUpdates::default();

        let old = pending.begin(item);

        assert!(pending.forget(item).is_none());

        let fresh = pending.begin(item);

        assert_ne!(old, fresh);
        assert!(!pending.is_current(item, old));
    }
}
