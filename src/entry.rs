//! Per-key cache records.
//!
//! [`Entry`] is owned by the cache's entry map. Eviction policies never hold
//! an `Entry`; they read the metadata they need through [`EntryIndex`], which
//! hands out copyable [`EntryMeta`] snapshots keyed by the policy's own key
//! back-references.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use crate::clock::Timestamp;

/// Metadata the eviction policies rank entries by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    /// Clock reading when the key entered the cache.
    pub inserted_at: Timestamp,
    /// Requests since the key entered the cache, counting the insertion.
    pub access_count: u64,
}

impl EntryMeta {
    /// Metadata of a key admitted at `now`.
    #[inline]
    pub fn admitted(now: Timestamp) -> Self {
        Self {
            inserted_at: now,
            access_count: 1,
        }
    }

    /// Ticks since admission, or 0 if the clock reads earlier than
    /// `inserted_at`.
    #[inline]
    pub fn raw_age(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.inserted_at)
    }
}

/// A resident value and its metadata.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    pub(crate) value: V,
    pub(crate) meta: EntryMeta,
}

impl<V> Entry<V> {
    pub(crate) fn new(value: V, now: Timestamp) -> Self {
        Self {
            value,
            meta: EntryMeta::admitted(now),
        }
    }

    /// Counts one request; `insertion_time` is untouched.
    #[inline]
    pub(crate) fn record_access(&mut self) -> u64 {
        self.meta.access_count = self.meta.access_count.saturating_add(1);
        self.meta.access_count
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn meta(&self) -> EntryMeta {
        self.meta
    }
}

/// Read-only metadata lookup handed to [`EvictionPolicy::choose_victim`].
///
/// [`EvictionPolicy::choose_victim`]: crate::traits::EvictionPolicy::choose_victim
pub trait EntryIndex<K> {
    fn meta(&self, key: &K) -> Option<EntryMeta>;
}

impl<K, V, S> EntryIndex<K> for HashMap<K, Entry<V>, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn meta(&self, key: &K) -> Option<EntryMeta> {
        self.get(key).map(|entry| entry.meta)
    }
}

impl<K, S> EntryIndex<K> for HashMap<K, EntryMeta, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn meta(&self, key: &K) -> Option<EntryMeta> {
        self.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn admitted_entry_has_one_access() {
        let entry = Entry::new("v", 10);
        assert_eq!(entry.meta().access_count, 1);
        assert_eq!(entry.meta().inserted_at, 10);
        assert_eq!(entry.value(), &"v");
    }

    #[test]
    fn record_access_keeps_insertion_time() {
        let mut entry = Entry::new(1u8, 3);
        assert_eq!(entry.record_access(), 2);
        assert_eq!(entry.record_access(), 3);
        assert_eq!(entry.meta().inserted_at, 3);
    }

    #[test]
    fn raw_age_clamps_backwards_clock() {
        let meta = EntryMeta::admitted(50);
        assert_eq!(meta.raw_age(80), 30);
        assert_eq!(meta.raw_age(20), 0);
    }

    #[test]
    fn entry_map_serves_as_index() {
        let mut map: FxHashMap<&str, Entry<u32>> = FxHashMap::default();
        map.insert("a", Entry::new(1, 4));
        assert_eq!(map.meta(&"a"), Some(EntryMeta::admitted(4)));
        assert_eq!(map.meta(&"b"), None);
    }
}
