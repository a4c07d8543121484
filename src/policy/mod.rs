//! Eviction policies.
//!
//! | Policy       | Victim                                   | `choose_victim`           |
//! |--------------|------------------------------------------|---------------------------|
//! | `hyperbolic` | lowest `access_count / age` in a sample  | O(S), O(n) if all fresh   |
//! | `lfu`        | lowest `access_count`, oldest at a tie   | O(1)                      |
//!
//! [`Policy`] is the closed set the [`CacheBuilder`](crate::builder::CacheBuilder)
//! produces. [`Cache`](crate::cache::Cache) is generic over
//! [`EvictionPolicy`], so either variant can also be used on its own.

use std::hash::Hash;

use crate::clock::Timestamp;
use crate::entry::{EntryIndex, EntryMeta};
use crate::error::InvariantError;
use crate::traits::EvictionPolicy;

pub mod hyperbolic;
pub mod lfu;

use hyperbolic::HyperbolicPolicy;
use lfu::LfuPolicy;

/// Either built-in policy, dispatched by `match`.
#[derive(Debug)]
pub enum Policy<K> {
    Hyperbolic(HyperbolicPolicy<K>),
    Lfu(LfuPolicy<K>),
}

impl<K> Policy<K>
where
    K: Eq + Hash + Clone,
{
    pub fn as_hyperbolic(&self) -> Option<&HyperbolicPolicy<K>> {
        match self {
            Policy::Hyperbolic(policy) => Some(policy),
            Policy::Lfu(_) => None,
        }
    }

    pub fn as_lfu(&self) -> Option<&LfuPolicy<K>> {
        match self {
            Policy::Lfu(policy) => Some(policy),
            Policy::Hyperbolic(_) => None,
        }
    }
}

impl<K> From<HyperbolicPolicy<K>> for Policy<K> {
    fn from(policy: HyperbolicPolicy<K>) -> Self {
        Policy::Hyperbolic(policy)
    }
}

impl<K> From<LfuPolicy<K>> for Policy<K> {
    fn from(policy: LfuPolicy<K>) -> Self {
        Policy::Lfu(policy)
    }
}

impl<K> EvictionPolicy<K> for Policy<K>
where
    K: Eq + Hash + Clone,
{
    fn name(&self) -> &'static str {
        match self {
            Policy::Hyperbolic(p) => p.name(),
            Policy::Lfu(p) => p.name(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Policy::Hyperbolic(p) => p.len(),
            Policy::Lfu(p) => p.len(),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match self {
            Policy::Hyperbolic(p) => p.contains(key),
            Policy::Lfu(p) => p.contains(key),
        }
    }

    fn on_insert(&mut self, key: &K) -> Result<(), InvariantError> {
        match self {
            Policy::Hyperbolic(p) => p.on_insert(key),
            Policy::Lfu(p) => p.on_insert(key),
        }
    }

    fn on_access(&mut self, key: &K, access_count: u64) -> Result<(), InvariantError> {
        match self {
            Policy::Hyperbolic(p) => p.on_access(key, access_count),
            Policy::Lfu(p) => p.on_access(key, access_count),
        }
    }

    fn on_remove(&mut self, key: &K) -> Result<(), InvariantError> {
        match self {
            Policy::Hyperbolic(p) => p.on_remove(key),
            Policy::Lfu(p) => p.on_remove(key),
        }
    }

    fn choose_victim(
        &mut self,
        entries: &dyn EntryIndex<K>,
        now: Timestamp,
    ) -> Result<K, InvariantError> {
        match self {
            Policy::Hyperbolic(p) => p.choose_victim(entries, now),
            Policy::Lfu(p) => p.choose_victim(entries, now),
        }
    }

    fn candidates_examined(&self) -> usize {
        match self {
            Policy::Hyperbolic(p) => p.candidates_examined(),
            Policy::Lfu(p) => p.candidates_examined(),
        }
    }

    fn check_entry(&self, key: &K, meta: EntryMeta) -> Result<(), InvariantError> {
        match self {
            Policy::Hyperbolic(p) => p.check_entry(key, meta),
            Policy::Lfu(p) => p.check_entry(key, meta),
        }
    }

    fn clear(&mut self) {
        match self {
            Policy::Hyperbolic(p) => p.clear(),
            Policy::Lfu(p) => p.clear(),
        }
    }
}
