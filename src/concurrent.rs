//! Thread-safe cache handle.
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────┐
//!   │                 ConcurrentCache<K, V, C, P>              │
//!   │                                                          │
//!   │   inner: Arc<Mutex<Cache<K, V, C, P>>>                   │
//!   │                                                          │
//!   │   clone() ──► another handle to the same cache           │
//!   │   get/put/remove/evict ──► lock, delegate, unlock        │
//!   └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `get` hit updates entry metadata, so reads take the same exclusive
//! lock as writes and there is no read/write split. Values leave the lock by
//! clone; use `Arc<V>` values when cloning is expensive, or
//! [`ConcurrentCache::with_lock`] to borrow in place.
//!
//! ## Example
//!
//! ```
//! use std::thread;
//!
//! use hypercache::builder::{CacheBuilder, CachePolicy};
//! use hypercache::concurrent::ConcurrentCache;
//!
//! let cache = ConcurrentCache::new(
//!     CacheBuilder::new(64)
//!         .build::<u32, u32>(CachePolicy::Lfu)
//!         .unwrap(),
//! );
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = cache.clone();
//!         thread::spawn(move || {
//!             for i in 0..16 {
//!                 cache.put(t * 16 + i, i).unwrap();
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.len(), 64);
//! ```

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::Cache;
use crate::clock::{Clock, SystemClock};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::policy::Policy;
use crate::traits::EvictionPolicy;

/// Cloneable, lock-protected handle to a [`Cache`].
pub struct ConcurrentCache<K, V, C = SystemClock, P = Policy<K>> {
    inner: Arc<Mutex<Cache<K, V, C, P>>>,
}

impl<K, V, C, P> Clone for ConcurrentCache<K, V, C, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, C, P> ConcurrentCache<K, V, C, P>
where
    K: Eq + Hash + Clone,
    C: Clock,
    P: EvictionPolicy<K>,
{
    pub fn new(cache: Cache<K, V, C, P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn put(&self, key: K, value: V) -> Result<Option<V>, InvariantError> {
        self.inner.lock().put(key, value)
    }

    /// Clones the value out on a hit and counts the request.
    pub fn get(&self, key: &K) -> Result<Option<V>, InvariantError>
    where
        V: Clone,
    {
        let mut cache = self.inner.lock();
        Ok(cache.get(key)?.cloned())
    }

    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn remove(&self, key: &K) -> Result<Option<V>, InvariantError> {
        self.inner.lock().remove(key)
    }

    pub fn evict(&self) -> Result<Option<(K, V)>, InvariantError> {
        self.inner.lock().evict()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    /// Runs `f` with exclusive access to the underlying cache.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut Cache<K, V, C, P>) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut cache)
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C, P> ConcurrentCache<K, V, C, P>
where
    K: Eq + Hash + Clone,
    C: Clock,
    P: EvictionPolicy<K>,
{
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C, P> MetricsSnapshotProvider<CacheMetricsSnapshot> for ConcurrentCache<K, V, C, P>
where
    K: Eq + Hash + Clone,
    C: Clock,
    P: EvictionPolicy<K>,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}
