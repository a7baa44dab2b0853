//! Watchlist state for discovery mode
//!
//! The watchlist is the set of items currently being sampled. It is owned
//! by the scheduler loop and mutated between awaits only, so plain `&mut`
//! access is enough; there is no shared-state locking here.

use crate::api::ItemId;
use std::collections::HashMap;

/// Bookkeeping for one tracked item
#[derive(Debug, Clone)]
pub struct WatchEntry {
    /// Cached from the first successful detail fetch so later rounds can
    /// age-check without re-fetching
    pub submission_time: Option<i64>,
    /// Tick at which the item first appeared in the discovery snapshot
    pub first_seen_tick: u64,
}

#[derive(Debug, Default)]
pub struct Watchlist {
    entries: HashMap<ItemId, WatchEntry>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Current membership, in no particular order
    pub fn ids(&self) -> Vec<ItemId> {
        self.entries.keys().copied().collect()
    }

    pub fn submission_time(&self, id: ItemId) -> Option<i64> {
        self.entries.get(&id).and_then(|e| e.submission_time)
    }

    /// Admit every ID from this tick's discovery snapshot that is not
    /// already tracked. Returns how many were new.
    pub fn admit_discovered<I>(&mut self, ids: I, tick: u64) -> usize
    where
        I: IntoIterator<Item = ItemId>,
    {
        let before = self.entries.len();
        for id in ids {
            self.entries.entry(id).or_insert(WatchEntry {
                submission_time: None,
                first_seen_tick: tick,
            });
        }
        self.entries.len() - before
    }

    /// Cache an item's submission time after its first successful fetch.
    /// Submission times never change upstream, so the first value sticks.
    pub fn record_submission_time(&mut self, id: ItemId, time: i64) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.submission_time.get_or_insert(time);
        }
    }

    /// Drop every entry whose cached submission time proves it over-age,
    /// before any fetch is spent on it. Entries without a cached time are
    /// left for the post-fetch check. Returns the evicted IDs.
    pub fn evict_aged(&mut self, now: i64, max_age_secs: i64) -> Vec<ItemId> {
        let aged: Vec<ItemId> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry
                    .submission_time
                    .map(|t| now - t > max_age_secs)
                    .unwrap_or(false)
            })
            .map(|(&id, _)| id)
            .collect();

        for id in &aged {
            self.entries.remove(id);
        }
        aged
    }

    /// Remove a single item. Returns whether it was present.
    pub fn evict(&mut self, id: ItemId) -> bool {
        self.entries.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_deduplicates() {
        let mut watchlist = Watchlist::new();

        assert_eq!(watchlist.admit_discovered([1, 2, 3], 0), 3);
        assert_eq!(watchlist.admit_discovered([2, 3, 4], 1), 1);

        assert_eq!(watchlist.len(), 4);
        assert!(watchlist.contains(1));
        assert!(watchlist.contains(4));
    }

    #[test]
    fn test_readmission_keeps_first_seen_tick() {
        let mut watchlist = Watchlist::new();
        watchlist.admit_discovered([7], 0);
        watchlist.record_submission_time(7, 1_000);

        watchlist.admit_discovered([7], 5);

        assert_eq!(watchlist.entries[&7].first_seen_tick, 0);
        assert_eq!(watchlist.submission_time(7), Some(1_000));
    }

    #[test]
    fn test_submission_time_caches_first_value() {
        let mut watchlist = Watchlist::new();
        watchlist.admit_discovered([7], 0);

        watchlist.record_submission_time(7, 1_000);
        watchlist.record_submission_time(7, 2_000);

        assert_eq!(watchlist.submission_time(7), Some(1_000));
    }

    #[test]
    fn test_evict_aged_uses_cached_times_only() {
        let mut watchlist = Watchlist::new();
        watchlist.admit_discovered([1, 2, 3], 0);
        watchlist.record_submission_time(1, 0);
        watchlist.record_submission_time(2, 9_000);
        // item 3 has no cached submission time yet

        let evicted = watchlist.evict_aged(10_000, 3_600);

        assert_eq!(evicted, vec![1]);
        assert!(!watchlist.contains(1));
        assert!(watchlist.contains(2));
        assert!(watchlist.contains(3));
    }

    #[test]
    fn test_age_boundary_is_strictly_greater() {
        let mut watchlist = Watchlist::new();
        watchlist.admit_discovered([1], 0);
        watchlist.record_submission_time(1, 0);

        // exactly max_age old: still tracked
        assert!(watchlist.evict_aged(3_600, 3_600).is_empty());
        // one second past: gone
        assert_eq!(watchlist.evict_aged(3_601, 3_600), vec![1]);
    }

    #[test]
    fn test_evict_single() {
        let mut watchlist = Watchlist::new();
        watchlist.admit_discovered([1, 2], 0);

        assert!(watchlist.evict(1));
        assert!(!watchlist.evict(1));
        assert_eq!(watchlist.ids(), vec![2]);
    }
}
