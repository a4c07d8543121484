//! # Eviction Policy Contract
//!
//! The cache core owns every value and all per-entry metadata. An eviction
//! policy owns only the auxiliary index it needs to pick victims: a samplable
//! key set for Hyperbolic, frequency buckets for LFU.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        Cache<K, V, C, P>                             │
//!   │                                                                      │
//!   │   entries: FxHashMap<K, Entry<V>>        policy: P                   │
//!   │   ┌──────┬──────────────────────────┐    ┌────────────────────────┐  │
//!   │   │ key  │ value, inserted_at, hits │    │ key back-references    │  │
//!   │   └──────┴──────────────────────────┘    │ (sample slots/buckets) │  │
//!   │                 ▲                        └───────────┬────────────┘  │
//!   │                 │     EntryIndex::meta(&K)           │               │
//!   │                 └────────────────────────────────────┘               │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   put(new key, full) ──► choose_victim ──► entries.remove ──► on_remove
//!                                                      └──► insert ──► on_insert
//!   put(existing key)  ──► access_count += 1 ──► on_access
//!   get(hit)           ──► access_count += 1 ──► on_access
//!   remove(key)        ──► entries.remove ──► on_remove
//! ```
//!
//! ## Hook Contract
//!
//! | Hook            | Called when                         | Must fail when              |
//! |-----------------|-------------------------------------|-----------------------------|
//! | `on_insert`     | a new key was stored                | key already tracked         |
//! | `on_access`     | `get` hit or value-update `put`     | key not tracked             |
//! | `on_remove`     | eviction or explicit removal        | key not tracked             |
//! | `choose_victim` | cache is full and a new key arrives | index is empty              |
//!
//! `on_access` receives the entry's `access_count` *after* the cache has
//! incremented it. Policies that track a frequency of their own use it to
//! cross-check.
//!
//! `choose_victim` does not remove anything. The cache removes the victim's
//! entry and then calls `on_remove`, so both removal paths share one hook.
//!
//! ## Thread Safety
//!
//! Policies are plain single-threaded structures. Shared use goes through a
//! lock around the whole cache (see `ConcurrentCache` behind the
//! `concurrency` feature).

use crate::clock::Timestamp;
use crate::entry::{EntryIndex, EntryMeta};
use crate::error::InvariantError;

/// Victim selection strategy plugged into [`Cache`](crate::cache::Cache).
///
/// # Example
///
/// ```
/// use hypercache::entry::EntryMeta;
/// use hypercache::policy::lfu::LfuPolicy;
/// use hypercache::traits::EvictionPolicy;
/// use rustc_hash::FxHashMap;
///
/// let mut policy = LfuPolicy::new();
/// policy.on_insert(&"a").unwrap();
/// policy.on_insert(&"b").unwrap();
/// policy.on_access(&"a", 2).unwrap();
///
/// let entries: FxHashMap<&str, EntryMeta> = FxHashMap::default();
/// assert_eq!(policy.choose_victim(&entries, 0), Ok("b"));
/// ```
pub trait EvictionPolicy<K> {
    /// Short, stable policy name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Number of keys tracked by the policy index.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is tracked.
    fn contains(&self, key: &K) -> bool;

    /// Registers a freshly inserted key.
    fn on_insert(&mut self, key: &K) -> Result<(), InvariantError>;

    /// Records a request for a resident key.
    ///
    /// `access_count` is the entry's count after the increment.
    fn on_access(&mut self, key: &K, access_count: u64) -> Result<(), InvariantError>;

    /// Forgets a key that left the cache.
    fn on_remove(&mut self, key: &K) -> Result<(), InvariantError>;

    /// Picks the key to evict next without removing it.
    fn choose_victim(
        &mut self,
        entries: &dyn EntryIndex<K>,
        now: Timestamp,
    ) -> Result<K, InvariantError>;

    /// Keys ranked by the most recent `choose_victim`.
    fn candidates_examined(&self) -> usize {
        1
    }

    /// Cross-checks one resident entry against the policy index.
    fn check_entry(&self, key: &K, meta: EntryMeta) -> Result<(), InvariantError>;

    /// Drops every tracked key.
    fn clear(&mut self);
}
