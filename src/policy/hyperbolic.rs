//! Hyperbolic caching.
//!
//! Every entry carries an estimated request rate since it was admitted,
//! `p(i) = n_i / age_i`. Finding the global minimum would cost O(n) per
//! eviction, so the policy draws a small uniform sample of resident keys and
//! evicts the sample's minimum instead.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                         HyperbolicPolicy<K>                                 │
//! │                                                                             │
//! │   keys: SampleSet<K>      O(1) insert / swap-remove / uniform pick          │
//! │   rng:  SmallRng          seeded, so eviction is reproducible               │
//! │   sample: Vec<K>          scratch buffer, reused across evictions           │
//! │                                                                             │
//! │   choose_victim(entries, now):                                              │
//! │                                                                             │
//! │     keys ──sample S distinct──► [k3, k9, k1, k7]                            │
//! │                                   │                                         │
//! │                     entries.meta(k) → (n, inserted_at)                      │
//! │                                   ▼                                         │
//! │            rank = (fresh?, n / max(now - inserted_at, ε), inserted_at)      │
//! │                                   │                                         │
//! │                                   ▼                                         │
//! │                           smallest rank wins                                │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ranking
//!
//! | Step | Criterion                      | Lower rank (evicted first)          |
//! |------|--------------------------------|-------------------------------------|
//! | 1    | raw age `< ε`                  | entries at least `ε` old            |
//! | 2    | priority `n / max(age, ε)`     | lower estimated request rate        |
//! | 3    | `inserted_at`                  | older entry                         |
//! | 4    | position in the drawn sample   | drawn earlier                       |
//!
//! Step 4 uses index order instead when the search has widened to every key.
//!
//! Step 1 keeps newcomers out of reach until they have had `ε` ticks to
//! collect requests. When every sampled key is that young but the cache holds
//! more keys than were drawn, the whole index is scanned for the lowest rank
//! instead. A newcomer is evicted only when no resident key is `ε` old yet.
//!
//! Priorities are never stored. They are recomputed from `access_count` and
//! `inserted_at` at eviction time and compared exactly by cross-multiplying
//! in `u128`.
//!
//! ## Example Usage
//!
//! ```
//! use hypercache::entry::EntryMeta;
//! use hypercache::policy::hyperbolic::{HyperbolicConfig, HyperbolicPolicy};
//! use hypercache::traits::EvictionPolicy;
//! use rustc_hash::FxHashMap;
//!
//! let mut policy = HyperbolicPolicy::new(HyperbolicConfig {
//!     sample_size: 8,
//!     ..HyperbolicConfig::default()
//! })
//! .unwrap();
//!
//! let mut entries = FxHashMap::default();
//! entries.insert("hot", EntryMeta { inserted_at: 0, access_count: 50 });
//! entries.insert("cold", EntryMeta { inserted_at: 0, access_count: 1 });
//! for key in ["hot", "cold"] {
//!     policy.on_insert(&key).unwrap();
//! }
//!
//! assert_eq!(policy.choose_victim(&entries, 100), Ok("cold"));
//! ```
//!
//! ## References
//!
//! - Blankstein, Sen, Freedman: "Hyperbolic Caching: Flexible Caching for
//!   Web Applications", USENIX ATC 2017.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::clock::Timestamp;
use crate::ds::SampleSet;
use crate::entry::{EntryIndex, EntryMeta};
use crate::error::{ConfigError, InvariantError};
use crate::traits::EvictionPolicy;

/// Keys drawn per eviction when not configured otherwise.
pub const DEFAULT_SAMPLE_SIZE: usize = 64;

/// Default `ε`: one clock tick.
pub const DEFAULT_MIN_AGE: u64 = 1;

/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Tunables for [`HyperbolicPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HyperbolicConfig {
    /// Keys drawn per eviction (`S`). Must be > 0.
    pub sample_size: usize,
    /// Minimum age `ε` in clock ticks. Must be > 0.
    pub min_age: u64,
    /// Seed for the sampling RNG.
    pub seed: u64,
}

impl Default for HyperbolicConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            min_age: DEFAULT_MIN_AGE,
            seed: DEFAULT_SEED,
        }
    }
}

impl HyperbolicConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_size == 0 {
            return Err(ConfigError::new("sample_size must be > 0"));
        }
        if self.min_age == 0 {
            return Err(ConfigError::new("min_age must be > 0"));
        }
        Ok(())
    }
}

/// Estimated request rate `hits / age`, compared exactly.
///
/// ```
/// use hypercache::entry::EntryMeta;
/// use hypercache::policy::hyperbolic::Priority;
///
/// let a = Priority::of(EntryMeta { inserted_at: 0, access_count: 1 }, 3, 1);
/// let b = Priority::of(EntryMeta { inserted_at: 0, access_count: 2 }, 6, 1);
/// assert_eq!(a, b);
///
/// // A brand-new entry is aged as if `ε` had already elapsed.
/// let fresh = Priority::of(EntryMeta { inserted_at: 10, access_count: 1 }, 10, 4);
/// assert_eq!(fresh.age(), 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Priority {
    hits: u64,
    age: u64,
}

impl Priority {
    /// Priority of `meta` at `now`, with the age clamped to at least `min_age`.
    #[inline]
    pub fn of(meta: EntryMeta, now: Timestamp, min_age: u64) -> Self {
        Self {
            hits: meta.access_count,
            age: meta.raw_age(now).max(min_age).max(1),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    /// Requests per tick.
    pub fn as_f64(&self) -> f64 {
        self.hits as f64 / self.age as f64
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.hits) * u128::from(other.age);
        let rhs = u128::from(other.hits) * u128::from(self.age);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hits, self.age)
    }
}

/// Eviction rank; the smallest rank is the victim.
type Rank = (bool, Priority, Timestamp);

/// Sampling eviction policy ranking entries by `access_count / age`.
pub struct HyperbolicPolicy<K> {
    keys: SampleSet<K>,
    config: HyperbolicConfig,
    rng: SmallRng,
    sample: Vec<K>,
    examined: usize,
}

impl<K> HyperbolicPolicy<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a policy, rejecting a zero sample size or zero `ε`.
    pub fn new(config: HyperbolicConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            keys: SampleSet::new(),
            rng: SmallRng::seed_from_u64(config.seed),
            sample: Vec::with_capacity(config.sample_size.min(1024)),
            examined: 0,
            config,
        })
    }

    /// Default configuration with the given sample size.
    pub fn with_sample_size(sample_size: usize) -> Result<Self, ConfigError> {
        Self::new(HyperbolicConfig {
            sample_size,
            ..HyperbolicConfig::default()
        })
    }

    /// Pre-sizes the key index for `capacity` keys.
    pub fn reserve(&mut self, capacity: usize) {
        if self.keys.is_empty() {
            self.keys = SampleSet::with_capacity(capacity);
        }
    }

    pub fn config(&self) -> &HyperbolicConfig {
        &self.config
    }

    pub fn sample_size(&self) -> usize {
        self.config.sample_size
    }

    pub fn min_age(&self) -> u64 {
        self.config.min_age
    }

    /// Keys drawn by the most recent `choose_victim`, in draw order.
    pub fn last_sample(&self) -> &[K] {
        &self.sample
    }

    /// Priority of `meta` at `now` under this policy's `ε`.
    pub fn priority(&self, meta: EntryMeta, now: Timestamp) -> Priority {
        Priority::of(meta, now, self.config.min_age)
    }

    fn rank(&self, meta: EntryMeta, now: Timestamp) -> Rank {
        let fresh = meta.raw_age(now) < self.config.min_age;
        (fresh, self.priority(meta, now), meta.inserted_at)
    }

    /// Smallest-ranked key among `keys`; the earlier key wins a tie.
    fn min_rank<'a>(
        &self,
        keys: impl Iterator<Item = &'a K>,
        entries: &dyn EntryIndex<K>,
        now: Timestamp,
    ) -> Result<Option<(&'a K, Rank)>, InvariantError>
    where
        K: 'a,
    {
        let mut best: Option<(&'a K, Rank)> = None;
        for key in keys {
            let meta = entries.meta(key).ok_or_else(|| {
                InvariantError::new("hyperbolic: sampled key has no cache entry")
            })?;
            let rank = self.rank(meta, now);
            if best.as_ref().is_none_or(|(_, current)| rank < *current) {
                best = Some((key, rank));
            }
        }
        Ok(best)
    }
}

impl<K> EvictionPolicy<K> for HyperbolicPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn name(&self) -> &'static str {
        "hyperbolic"
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    fn on_insert(&mut self, key: &K) -> Result<(), InvariantError> {
        if self.keys.insert(key.clone()) {
            Ok(())
        } else {
            Err(InvariantError::new("hyperbolic: key inserted twice"))
        }
    }

    fn on_access(&mut self, key: &K, _access_count: u64) -> Result<(), InvariantError> {
        if self.keys.contains(key) {
            Ok(())
        } else {
            Err(InvariantError::new("hyperbolic: accessed key is not tracked"))
        }
    }

    fn on_remove(&mut self, key: &K) -> Result<(), InvariantError> {
        if self.keys.remove(key) {
            Ok(())
        } else {
            Err(InvariantError::new("hyperbolic: removed key is not tracked"))
        }
    }

    fn choose_victim(
        &mut self,
        entries: &dyn EntryIndex<K>,
        now: Timestamp,
    ) -> Result<K, InvariantError> {
        if self.keys.is_empty() {
            return Err(InvariantError::new(
                "hyperbolic: choose_victim on an empty policy",
            ));
        }

        let mut sample = std::mem::take(&mut self.sample);
        self.keys
            .sample_into(&mut self.rng, self.config.sample_size, &mut sample);

        let mut examined = sample.len();
        let chosen = match self.min_rank(sample.iter(), entries, now) {
            // Only newcomers were drawn; an unsampled key may be old enough.
            Ok(Some((_, (true, _, _)))) if sample.len() < self.keys.len() => {
                examined += self.keys.len();
                self.min_rank(self.keys.iter(), entries, now)
                    .map(|best| best.map(|(key, _)| key.clone()))
            },
            drawn => drawn.map(|best| best.map(|(key, _)| key.clone())),
        };

        self.sample = sample;
        self.examined = examined;
        chosen?.ok_or_else(|| InvariantError::new("hyperbolic: empty sample"))
    }

    fn candidates_examined(&self) -> usize {
        self.examined
    }

    fn check_entry(&self, key: &K, _meta: EntryMeta) -> Result<(), InvariantError> {
        if self.keys.contains(key) {
            Ok(())
        } else {
            Err(InvariantError::new(
                "hyperbolic: resident key missing from sample index",
            ))
        }
    }

    fn clear(&mut self) {
        self.keys.clear();
        self.sample.clear();
        self.examined = 0;
    }
}

impl<K> fmt::Debug for HyperbolicPolicy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperbolicPolicy")
            .field("tracked", &self.keys.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
