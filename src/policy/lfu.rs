//! Least Frequently Used eviction.
//!
//! Evicts the key with the fewest requests since it entered the cache. Among
//! keys with the same count, the one that reached that count first goes.
//! Every operation is O(1), backed by [`FrequencyBuckets`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                             LfuPolicy<K>                                    │
//! │                                                                             │
//! │   buckets: FrequencyBuckets<K>                                              │
//! │                                                                             │
//! │   least ─► freq=1: [d] ◄──► [e]          on_insert(k)    → back of freq=1   │
//! │               │                          on_access(k, n) → back of freq=n   │
//! │               ▼                          choose_victim   → front of least   │
//! │            freq=2: [b]                                                      │
//! │               │                                                             │
//! │               ▼                                                             │
//! │            freq=7: [a] ◄──► [c]                                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bucket a key sits in always equals the cache entry's `access_count`.
//! `on_access` and `check_entry` report a mismatch as an
//! [`InvariantError`].
//!
//! ## Example Usage
//!
//! ```
//! use hypercache::entry::EntryMeta;
//! use hypercache::policy::lfu::LfuPolicy;
//! use hypercache::traits::EvictionPolicy;
//! use rustc_hash::FxHashMap;
//!
//! let mut lfu = LfuPolicy::new();
//! for key in ["a", "b", "c"] {
//!     lfu.on_insert(&key).unwrap();
//! }
//! lfu.on_access(&"a", 2).unwrap();
//! lfu.on_access(&"b", 2).unwrap();
//!
//! let entries: FxHashMap<&str, EntryMeta> = FxHashMap::default();
//! assert_eq!(lfu.choose_victim(&entries, 0), Ok("c"));
//! assert_eq!(lfu.frequency(&"a"), Some(2));
//! ```

use std::hash::Hash;

use crate::clock::Timestamp;
use crate::ds::FrequencyBuckets;
use crate::entry::{EntryIndex, EntryMeta};
use crate::error::InvariantError;
use crate::traits::EvictionPolicy;

/// Exact O(1) LFU index.
#[derive(Debug)]
pub struct LfuPolicy<K> {
    buckets: FrequencyBuckets<K>,
}

impl<K> LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            buckets: FrequencyBuckets::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: FrequencyBuckets::with_capacity(capacity),
        }
    }

    /// Tracked frequency of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }

    /// Smallest tracked frequency.
    pub fn least_frequency(&self) -> Option<u64> {
        self.buckets.least_frequency()
    }

    /// Next victim, without selecting it.
    pub fn peek_victim(&self) -> Option<(&K, u64)> {
        self.buckets.peek_min()
    }
}

impl<K> Default for LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    fn on_insert(&mut self, key: &K) -> Result<(), InvariantError> {
        if self.buckets.insert(key.clone()) {
            Ok(())
        } else {
            Err(InvariantError::new("lfu: key inserted twice"))
        }
    }

    fn on_access(&mut self, key: &K, access_count: u64) -> Result<(), InvariantError> {
        let freq = self
            .buckets
            .touch(key)
            .ok_or_else(|| InvariantError::new("lfu: accessed key is not tracked"))?;
        if freq != access_count {
            return Err(InvariantError::new(format!(
                "lfu: bucket frequency {freq} does not match access_count {access_count}"
            )));
        }
        Ok(())
    }

    fn on_remove(&mut self, key: &K) -> Result<(), InvariantError> {
        match self.buckets.remove(key) {
            Some(_) => Ok(()),
            None => Err(InvariantError::new("lfu: removed key is not tracked")),
        }
    }

    fn choose_victim(
        &mut self,
        _entries: &dyn EntryIndex<K>,
        _now: Timestamp,
    ) -> Result<K, InvariantError> {
        self.buckets
            .peek_min()
            .map(|(key, _)| key.clone())
            .ok_or_else(|| InvariantError::new("lfu: choose_victim on an empty policy"))
    }

    fn check_entry(&self, key: &K, meta: EntryMeta) -> Result<(), InvariantError> {
        match self.buckets.frequency(key) {
            Some(freq) if freq == meta.access_count => Ok(()),
            Some(freq) => Err(InvariantError::new(format!(
                "lfu: key sits in bucket {freq} but access_count is {}",
                meta.access_count
            ))),
            None => Err(InvariantError::new(
                "lfu: resident key missing from frequency buckets",
            )),
        }
    }

    fn clear(&mut self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn no_entries() -> FxHashMap<u32, EntryMeta> {
        FxHashMap::default()
    }

    #[test]
    fn evicts_least_frequent() {
        let mut lfu = LfuPolicy::new();
        for key in 1..=3u32 {
            lfu.on_insert(&key).unwrap();
        }
        lfu.on_access(&1, 2).unwrap();
        lfu.on_access(&3, 2).unwrap();
        lfu.on_access(&3, 3).unwrap();

        assert_eq!(lfu.choose_victim(&no_entries(), 0), Ok(2));
        assert_eq!(lfu.least_frequency(), Some(1));
    }

    #[test]
    fn ties_go_to_first_arrival_at_that_count() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert(&1u32).unwrap();
        lfu.on_insert(&2).unwrap();
        // 2 reaches frequency 2 before 1 does
        lfu.on_access(&2, 2).unwrap();
        lfu.on_access(&1, 2).unwrap();

        assert_eq!(lfu.peek_victim(), Some((&2, 2)));
    }

    #[test]
    fn choose_victim_does_not_remove() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert(&1u32).unwrap();
        assert_eq!(lfu.choose_victim(&no_entries(), 0), Ok(1));
        assert_eq!(lfu.choose_victim(&no_entries(), 0), Ok(1));
        assert_eq!(lfu.len(), 1);

        lfu.on_remove(&1).unwrap();
        assert!(lfu.is_empty());
        assert!(lfu.choose_victim(&no_entries(), 0).is_err());
    }

    #[test]
    fn mismatched_access_count_is_reported() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert(&1u32).unwrap();
        let err = lfu.on_access(&1, 5).unwrap_err();
        assert!(err.message().contains("access_count 5"));
    }

    #[test]
    fn unknown_keys_are_invariant_errors() {
        let mut lfu = LfuPolicy::<u32>::new();
        assert!(lfu.on_access(&1, 2).is_err());
        assert!(lfu.on_remove(&1).is_err());
        lfu.on_insert(&1).unwrap();
        assert!(lfu.on_insert(&1).is_err());
    }

    #[test]
    fn check_entry_compares_bucket_with_meta() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert(&1u32).unwrap();
        lfu.on_access(&1, 2).unwrap();

        let ok = EntryMeta {
            inserted_at: 0,
            access_count: 2,
        };
        let stale = EntryMeta {
            inserted_at: 0,
            access_count: 1,
        };
        assert!(lfu.check_entry(&1, ok).is_ok());
        assert!(lfu.check_entry(&1, stale).is_err());
        assert!(lfu.check_entry(&2, ok).is_err());
    }

    #[test]
    fn removal_advances_least_frequency() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert(&1u32).unwrap();
        lfu.on_insert(&2).unwrap();
        lfu.on_access(&2, 2).unwrap();
        lfu.on_access(&2, 3).unwrap();
        lfu.on_remove(&1).unwrap();

        assert_eq!(lfu.least_frequency(), Some(3));
        assert_eq!(lfu.choose_victim(&no_entries(), 0), Ok(2));
    }

    #[test]
    fn clear_empties_index() {
        let mut lfu = LfuPolicy::with_capacity(4);
        lfu.on_insert(&1u32).unwrap();
        lfu.clear();
        assert!(lfu.is_empty());
        assert_eq!(lfu.frequency(&1), None);
    }
}
