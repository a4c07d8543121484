//! Unified cache builder for both eviction policies.
//!
//! ## Example
//!
//! ```rust
//! use hypercache::builder::{CacheBuilder, CachePolicy};
//!
//! let mut cache = CacheBuilder::new(100)
//!     .seed(7)
//!     .build::<u64, String>(CachePolicy::Hyperbolic { sample_size: 32 })
//!     .unwrap();
//! cache.put(1, "hello".to_string()).unwrap();
//! assert_eq!(cache.get(&1).unwrap(), Some(&"hello".to_string()));
//! ```

use std::hash::Hash;

use crate::cache::Cache;
use crate::clock::{Clock, SystemClock};
use crate::error::ConfigError;
use crate::policy::Policy;
use crate::policy::hyperbolic::{
    DEFAULT_MIN_AGE, DEFAULT_SAMPLE_SIZE, DEFAULT_SEED, HyperbolicConfig, HyperbolicPolicy,
};
use crate::policy::lfu::LfuPolicy;

/// Available cache eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Sampled `access_count / age` eviction drawing `sample_size` keys.
    Hyperbolic { sample_size: usize },
    /// Least Frequently Used eviction (bucket-based).
    Lfu,
}

impl CachePolicy {
    /// Hyperbolic eviction with the default sample size.
    pub fn hyperbolic() -> Self {
        CachePolicy::Hyperbolic {
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

/// Builder for creating [`Cache`] instances.
///
/// Capacity is required. The clock defaults to [`SystemClock`] (microsecond
/// ticks); `seed` and `min_age` only affect hyperbolic eviction.
#[derive(Debug, Clone)]
pub struct CacheBuilder<C = SystemClock> {
    capacity: usize,
    clock: C,
    seed: u64,
    min_age: u64,
}

impl CacheBuilder<SystemClock> {
    /// Create a new cache builder with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            clock: SystemClock::new(),
            seed: DEFAULT_SEED,
            min_age: DEFAULT_MIN_AGE,
        }
    }
}

impl<C: Clock> CacheBuilder<C> {
    /// Replaces the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> CacheBuilder<C2> {
        CacheBuilder {
            capacity: self.capacity,
            clock,
            seed: self.seed,
            min_age: self.min_age,
        }
    }

    /// Seeds the sampling RNG.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets `ε`, the minimum age in clock ticks.
    pub fn min_age(mut self, ticks: u64) -> Self {
        self.min_age = ticks;
        self
    }

    /// Build the cache with the specified eviction policy.
    pub fn build<K, V>(self, policy: CachePolicy) -> Result<Cache<K, V, C>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        if self.capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }

        let policy = match policy {
            CachePolicy::Hyperbolic { sample_size } => {
                let mut hyperbolic = HyperbolicPolicy::new(HyperbolicConfig {
                    sample_size,
                    min_age: self.min_age,
                    seed: self.seed,
                })?;
                hyperbolic.reserve(self.capacity);
                Policy::Hyperbolic(hyperbolic)
            },
            CachePolicy::Lfu => Policy::Lfu(LfuPolicy::with_capacity(self.capacity)),
        };

        Cache::with_policy(self.capacity, policy, self.clock)
    }
}
