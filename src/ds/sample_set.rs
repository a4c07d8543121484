//! Key set with O(1) insert, O(1) removal and uniform random sampling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          SampleSet<K>                               │
//! │                                                                     │
//! │   slots: FxHashMap<K, usize>          keys: Vec<K> (dense)          │
//! │   ┌────────┬──────┐                   ┌─────┬─────┬─────┬─────┐     │
//! │   │  "a"   │  0   │──────────────────►│  a  │  b  │  c  │  d  │     │
//! │   │  "b"   │  1   │                   └─────┴─────┴─────┴─────┘     │
//! │   │  "c"   │  2   │                      0     1     2     3        │
//! │   │  "d"   │  3   │                                                 │
//! │   └────────┴──────┘                                                 │
//! │                                                                     │
//! │   remove("b"): swap keys[1] with keys[3], fix slots["d"] = 1, pop   │
//! │                [a, d, c]                                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sampling draws distinct slot indices with `rand::seq::index::sample`,
//! which costs O(amount) rather than O(len).

use std::hash::Hash;

use rand::Rng;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct SampleSet<K> {
    keys: Vec<K>,
    slots: FxHashMap<K, usize>,
}

impl<K> SampleSet<K> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.keys.iter()
    }
}

impl<K> SampleSet<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            slots: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Adds `key`. Returns `false` if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.slots.contains_key(&key) {
            return false;
        }
        self.slots.insert(key.clone(), self.keys.len());
        self.keys.push(key);
        true
    }

    /// Swap-removes `key`. Returns `false` if it was absent.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(slot) = self.slots.remove(key) else {
            return false;
        };
        self.keys.swap_remove(slot);
        if let Some(moved) = self.keys.get(slot) {
            if let Some(moved_slot) = self.slots.get_mut(moved) {
                *moved_slot = slot;
            }
        }
        true
    }

    /// Replaces the contents of `out` with up to `amount` distinct keys drawn
    /// uniformly without replacement.
    pub fn sample_into<R>(&self, rng: &mut R, amount: usize, out: &mut Vec<K>)
    where
        R: Rng + ?Sized,
    {
        out.clear();
        let amount = amount.min(self.keys.len());
        if amount == 0 {
            return;
        }
        if amount == self.keys.len() {
            out.extend(self.keys.iter().cloned());
            return;
        }
        out.extend(
            rand::seq::index::sample(rng, self.keys.len(), amount)
                .into_iter()
                .map(|slot| self.keys[slot].clone()),
        );
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.slots.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.keys.len(), self.slots.len());
        for (slot, key) in self.keys.iter().enumerate() {
            assert_eq!(self.slots.get(key), Some(&slot), "slot map out of sync");
        }
    }
}

impl<K> Default for SampleSet<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
