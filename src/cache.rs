//! Fixed-capacity key/value cache with a pluggable eviction policy.
//!
//! [`Cache`] owns every value together with its [`EntryMeta`]: the clock
//! reading at admission and the number of requests since then. The eviction
//! policy keeps only key back-references and is consulted when a new key
//! arrives at a full cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          Cache<K, V, C, P>                                  │
//! │                                                                             │
//! │   entries: FxHashMap<K, Entry<V>>       policy: P: EvictionPolicy<K>        │
//! │   clock:   C: Clock                     capacity: usize (> 0, fixed)        │
//! │                                                                             │
//! │   put(k, v)                                                                 │
//! │     ├─ k resident ──► replace value, access_count += 1, on_access           │
//! │     └─ k absent                                                             │
//! │          ├─ len == capacity ──► choose_victim ─► remove entry ─► on_remove  │
//! │          └─► insert Entry { inserted_at: now, access_count: 1 } ─► on_insert│
//! │                                                                             │
//! │   get(k)                                                                    │
//! │     ├─ hit  ──► access_count += 1, on_access, Some(&v)                      │
//! │     └─ miss ──► None                                                        │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation          | Counts an access | Can evict | Errors             |
//! |--------------------|------------------|-----------|--------------------|
//! | `put` (new key)    | no (starts at 1) | yes       | `InvariantError`   |
//! | `put` (update)     | yes              | no        | `InvariantError`   |
//! | `get`              | on hit           | no        | `InvariantError`   |
//! | `peek`             | no               | no        |                    |
//! | `remove`           | no               | no        | `InvariantError`   |
//! | `evict`            | no               | yes       | `InvariantError`   |
//!
//! An `InvariantError` means the entry map and the policy index disagree.
//! It is logged at `error` level and returned to the caller of the operation
//! that found it.
//!
//! ## Example Usage
//!
//! ```
//! use hypercache::builder::{CacheBuilder, CachePolicy};
//! use hypercache::clock::ManualClock;
//!
//! let clock = ManualClock::new();
//! let mut cache = CacheBuilder::new(2)
//!     .with_clock(clock.clone())
//!     .build::<&str, u32>(CachePolicy::Lfu)
//!     .unwrap();
//!
//! cache.put("a", 1).unwrap();
//! cache.put("b", 2).unwrap();
//! assert_eq!(cache.get(&"a").unwrap(), Some(&1));
//!
//! // "b" has fewer requests than "a".
//! cache.put("c", 3).unwrap();
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.len(), 2);
//! ```

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, error, trace};

use crate::clock::{Clock, SystemClock, Timestamp};
use crate::entry::{Entry, EntryMeta};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsReadRecorder, CoreMetricsRecorder, EvictionMetricsRecorder, MetricsReset,
    MetricsSnapshotProvider,
};
use crate::policy::Policy;
use crate::policy::hyperbolic::{DEFAULT_MIN_AGE, Priority};
use crate::traits::EvictionPolicy;

/// Fixed-capacity cache.
///
/// `C` supplies timestamps and `P` picks victims. The defaults are the wall
/// clock and the built-in [`Policy`] enum produced by
/// [`CacheBuilder`](crate::builder::CacheBuilder).
pub struct Cache<K, V, C = SystemClock, P = Policy<K>> {
    entries: FxHashMap<K, Entry<V>>,
    policy: P,
    clock: C,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

/// Logs a surfaced invariant violation and hands it back.
fn report(op: &'static str, err: InvariantError) -> InvariantError {
    error!(op, error = %err, "cache invariant violated");
    err
}

impl<K, V, C, P> Cache<K, V, C, P>
where
    K: Eq + Hash + Clone,
    C: Clock,
    P: EvictionPolicy<K>,
{
    /// Creates an empty cache around `policy`.
    ///
    /// Fails when `capacity` is 0 or `policy` already tracks keys.
    pub fn with_policy(capacity: usize, policy: P, clock: C) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        if !policy.is_empty() {
            return Err(ConfigError::new("eviction policy must start empty"));
        }
        Ok(Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            policy,
            clock,
            capacity,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        })
    }

    /// Stores `value` under `key` and returns the value it replaced.
    ///
    /// Replacing a resident value counts as a request and keeps the entry's
    /// admission time. A new key arriving at a full cache evicts exactly one
    /// entry first.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, InvariantError> {
        if let Some(entry) = self.entries.get_mut(&key) {
            let previous = std::mem::replace(&mut entry.value, value);
            let access_count = entry.record_access();
            self.policy
                .on_access(&key, access_count)
                .map_err(|err| report("put", err))?;
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return Ok(Some(previous));
        }

        let now = self.clock.now();
        if self.entries.len() >= self.capacity {
            self.evict_at(now)?;
        }

        self.entries.insert(key.clone(), Entry::new(value, now));
        if let Err(err) = self.policy.on_insert(&key) {
            self.entries.remove(&key);
            return Err(report("put", err));
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();
        Ok(None)
    }

    /// Returns the value for `key`, counting one request on a hit.
    pub fn get(&mut self, key: &K) -> Result<Option<&V>, InvariantError> {
        let Some(entry) = self.entries.get_mut(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return Ok(None);
        };

        let access_count = entry.record_access();
        if let Err(err) = self.policy.on_access(key, access_count) {
            return Err(report("get", err));
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        Ok(Some(&entry.value))
    }

    /// Returns the value for `key` without counting a request.
    pub fn peek(&self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_call();
        let value = self.entries.get(key).map(Entry::value);
        #[cfg(feature = "metrics")]
        if value.is_some() {
            (&self.metrics).record_peek_found();
        }
        value
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, InvariantError> {
        let Some(entry) = self.entries.remove(key) else {
            return Ok(None);
        };
        self.policy
            .on_remove(key)
            .map_err(|err| report("remove", err))?;
        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        Ok(Some(entry.value))
    }

    /// Evicts one entry chosen by the policy, or returns `None` if empty.
    pub fn evict(&mut self) -> Result<Option<(K, V)>, InvariantError> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let now = self.clock.now();
        self.evict_at(now).map(Some)
    }

    fn evict_at(&mut self, now: Timestamp) -> Result<(K, V), InvariantError> {
        let victim = self
            .policy
            .choose_victim(&self.entries, now)
            .map_err(|err| report("evict", err))?;
        let Some(entry) = self.entries.remove(&victim) else {
            return Err(report(
                "evict",
                InvariantError::new("chosen victim has no cache entry"),
            ));
        };
        self.policy
            .on_remove(&victim)
            .map_err(|err| report("evict", err))?;

        let candidates = self.policy.candidates_examined();
        debug!(
            policy = self.policy.name(),
            access_count = entry.meta.access_count,
            age = entry.meta.raw_age(now),
            candidates,
            "evicted entry"
        );
        #[cfg(feature = "metrics")]
        self.metrics.record_eviction(candidates);
        Ok((victim, entry.value))
    }

    /// Drops every entry. Capacity and policy configuration are kept.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.policy.clear();
        trace!(policy = self.policy.name(), dropped, "cache cleared");
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots before the next new key triggers an eviction.
    pub fn remaining(&self) -> usize {
        self.capacity - self.entries.len()
    }

    /// Admission time and request count of a resident key.
    pub fn entry_meta(&self, key: &K) -> Option<EntryMeta> {
        self.entries.get(key).map(Entry::meta)
    }

    /// Resident entries in arbitrary order. Does not count requests.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, entry)| (key, &entry.value))
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Walks the entry map against the policy index.
    ///
    /// Checks the capacity bound, that both sides track the same number of
    /// keys, that every `access_count` is at least 1, and each policy's own
    /// per-entry check.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.entries.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.entries.len(),
                self.capacity
            )));
        }
        if self.entries.len() != self.policy.len() {
            return Err(InvariantError::new(format!(
                "entry map holds {} keys but {} index holds {}",
                self.entries.len(),
                self.policy.name(),
                self.policy.len()
            )));
        }
        for (key, entry) in &self.entries {
            if entry.meta.access_count == 0 {
                return Err(InvariantError::new("access_count dropped to 0"));
            }
            self.policy.check_entry(key, entry.meta)?;
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K, V, C> Cache<K, V, C, Policy<K>>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Hyperbolic priority of `key` at the current clock reading.
    ///
    /// Uses the policy's `ε` under hyperbolic eviction and the default `ε`
    /// otherwise.
    pub fn priority(&self, key: &K) -> Option<Priority> {
        let meta = self.entries.get(key)?.meta;
        let min_age = self
            .policy
            .as_hyperbolic()
            .map_or(DEFAULT_MIN_AGE, |policy| policy.min_age());
        Some(Priority::of(meta, self.clock.now(), min_age))
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C, P> Cache<K, V, C, P>
where
    K: Eq + Hash + Clone,
    C: Clock,
    P: EvictionPolicy<K>,
{
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            policy: self.policy.name(),
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_new: self.metrics.insert_new,
            insert_updates: self.metrics.insert_updates,
            evicted_entries: self.metrics.evicted_entries,
            eviction_candidates: self.metrics.eviction_candidates,
            removals: self.metrics.removals,
            clears: self.metrics.clears,
            peek_calls: self.metrics.peek_calls.get(),
            peek_found: self.metrics.peek_found.get(),
            cache_len: self.entries.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C, P> MetricsSnapshotProvider<CacheMetricsSnapshot> for Cache<K, V, C, P>
where
    K: Eq + Hash + Clone,
    C: Clock,
    P: EvictionPolicy<K>,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C, P> MetricsReset for Cache<K, V, C, P> {
    fn reset_metrics(&mut self) {
        self.metrics.reset_metrics();
    }
}

impl<K, V, C, P> fmt::Debug for Cache<K, V, C, P>
where
    K: Eq + Hash + Clone,
    C: Clock,
    P: EvictionPolicy<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy.name())
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::policy::hyperbolic::{HyperbolicConfig, HyperbolicPolicy};
    use crate::policy::lfu::LfuPolicy;
    use proptest::prelude::*;
    use rustc_hash::FxHashMap;

    #[derive(Debug, Clone)]
    enum Op {
        Put(u8, u32),
        Get(u8),
        Remove(u8),
        Tick(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..16, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
            4 => (0u8..16).prop_map(Op::Get),
            1 => (0u8..16).prop_map(Op::Remove),
            2 => (1u8..5).prop_map(Op::Tick),
        ]
    }

    fn build(capacity: usize, use_lfu: bool, clock: &ManualClock) -> Cache<u8, u32, ManualClock> {
        let policy = if use_lfu {
            Policy::Lfu(LfuPolicy::new())
        } else {
            Policy::Hyperbolic(
                HyperbolicPolicy::new(HyperbolicConfig {
                    sample_size: 3,
                    min_age: 2,
                    seed: 5,
                })
                .unwrap(),
            )
        };
        Cache::with_policy(capacity, policy, clock.clone()).unwrap()
    }

    proptest! {
        /// Capacity bound, one eviction per admission into a full cache,
        /// access counting and put/get round trips, under both policies.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_cache_invariants_hold(
            capacity in 1usize..8,
            use_lfu in any::<bool>(),
            ops in prop::collection::vec(op(), 0..200),
        ) {
            let clock = ManualClock::new();
            let mut cache = build(capacity, use_lfu, &clock);
            let mut counts: FxHashMap<u8, u64> = FxHashMap::default();

            for op in ops {
                match op {
                    Op::Put(key, value) => {
                        let resident = cache.contains(&key);
                        let was_full = cache.len() == capacity;
                        let before = cache.len();
                        cache.put(key, value).unwrap();
                        if resident {
                            *counts.get_mut(&key).unwrap() += 1;
                            prop_assert_eq!(cache.len(), before);
                        } else {
                            counts.retain(|k, _| cache.contains(k));
                            counts.insert(key, 1);
                            let expected = if was_full { before } else { before + 1 };
                            prop_assert_eq!(cache.len(), expected);
                        }
                        prop_assert_eq!(cache.peek(&key), Some(&value));
                    },
                    Op::Get(key) => {
                        let hit = cache.get(&key).unwrap().is_some();
                        prop_assert_eq!(hit, counts.contains_key(&key));
                        if hit {
                            *counts.get_mut(&key).unwrap() += 1;
                        }
                    },
                    Op::Remove(key) => {
                        let removed = cache.remove(&key).unwrap().is_some();
                        prop_assert_eq!(removed, counts.remove(&key).is_some());
                    },
                    Op::Tick(ticks) => clock.advance(u64::from(ticks)),
                }

                prop_assert!(cache.len() <= capacity);
                prop_assert_eq!(cache.len(), counts.len());
                for (key, count) in &counts {
                    prop_assert_eq!(cache.entry_meta(key).map(|m| m.access_count), Some(*count));
                }
                prop_assert!(cache.check_invariants().is_ok());
            }
        }

        /// LFU evicts the key with the lowest count, first to reach that
        /// count among ties.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_lfu_matches_reference_model(
            capacity in 1usize..6,
            ops in prop::collection::vec(op(), 0..200),
        ) {
            let clock = ManualClock::new();
            let mut cache = build(capacity, true, &clock);
            // key -> (count, arrival sequence at that count)
            let mut model: FxHashMap<u8, (u64, u64)> = FxHashMap::default();
            let mut seq = 0u64;
            let victim_of = |model: &FxHashMap<u8, (u64, u64)>| {
                model.iter().min_by_key(|(_, rank)| **rank).map(|(k, _)| *k)
            };

            for op in ops {
                seq += 1;
                match op {
                    Op::Put(key, value) => {
                        if let Some(rank) = model.get_mut(&key) {
                            *rank = (rank.0 + 1, seq);
                        } else {
                            if model.len() == capacity {
                                let victim = victim_of(&model).unwrap();
                                model.remove(&victim);
                            }
                            model.insert(key, (1, seq));
                        }
                        cache.put(key, value).unwrap();
                    },
                    Op::Get(key) => {
                        if let Some(rank) = model.get_mut(&key) {
                            *rank = (rank.0 + 1, seq);
                        }
                        cache.get(&key).unwrap();
                    },
                    Op::Remove(key) => {
                        model.remove(&key);
                        cache.remove(&key).unwrap();
                    },
                    Op::Tick(_) => {
                        if let Some(expected) = victim_of(&model) {
                            model.remove(&expected);
                            let evicted = cache.evict().unwrap().map(|(k, _)| k);
                            prop_assert_eq!(evicted, Some(expected));
                        }
                    },
                }

                let mut resident: Vec<u8> = cache.iter().map(|(k, _)| *k).collect();
                let mut expected: Vec<u8> = model.keys().copied().collect();
                resident.sort_unstable();
                expected.sort_unstable();
                prop_assert_eq!(resident, expected);
            }
        }
    }
}
