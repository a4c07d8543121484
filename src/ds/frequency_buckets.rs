//! Frequency buckets for O(1) LFU tracking.
//!
//! Keys are grouped by exact access frequency. Each bucket is an
//! insertion-ordered list, and the populated buckets are chained to their
//! nearest populated neighbours, so the least frequency can be advanced
//! without scanning.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          FrequencyBuckets<K>                                │
//! │                                                                             │
//! │   index: FxHashMap<K, SlotId>        nodes: SlotArena<Node<K>>              │
//! │   ┌──────────┬────────┐              ┌──────┬──────────────────────────┐    │
//! │   │ "a"      │ id_0   │─────────────►│ id_0 │ freq 3, prev, next       │    │
//! │   │ "b"      │ id_1   │─────────────►│ id_1 │ freq 1, prev, next       │    │
//! │   │ "c"      │ id_2   │─────────────►│ id_2 │ freq 1, prev, next       │    │
//! │   └──────────┴────────┘              └──────┴──────────────────────────┘    │
//! │                                                                             │
//! │   buckets: FxHashMap<u64, Bucket>                                           │
//! │                                                                             │
//! │   least_frequency = 1                                                       │
//! │        │                                                                    │
//! │        ▼                                                                    │
//! │   freq=1: front ──► [id_1] ◄──► [id_2] ◄── back                             │
//! │                     oldest       newest                                     │
//! │      │ higher                                                               │
//! │      ▼                                                                      │
//! │   freq=3: front ──► [id_0] ◄── back         (no freq=2 bucket: not linked)  │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation           | Time | Notes                                       |
//! |---------------------|------|---------------------------------------------|
//! | `insert`            | O(1) | New key joins the back of `bucket[1]`       |
//! | `touch`             | O(1) | Moves key to the back of `bucket[f + 1]`    |
//! | `remove`            | O(1) | Advances `least_frequency` via bucket links |
//! | `peek_min`          | O(1) | Front of `bucket[least_frequency]`          |
//! | `pop_min`           | O(1) | Removes the front of the least bucket       |
//! | `frequency`         | O(1) |                                             |
//!
//! ## Example Usage
//!
//! ```
//! use hypercache::ds::FrequencyBuckets;
//!
//! let mut freq = FrequencyBuckets::new();
//! freq.insert("a");
//! freq.insert("b");
//! freq.insert("c");
//!
//! freq.touch(&"a");
//! assert_eq!(freq.frequency(&"a"), Some(2));
//!
//! // Lowest frequency first, oldest first among ties.
//! assert_eq!(freq.pop_min(), Some(("b", 1)));
//! assert_eq!(freq.pop_min(), Some(("c", 1)));
//! assert_eq!(freq.least_frequency(), Some(2));
//! ```
//!
//! ## Implementation Notes
//!
//! - Bucket order is FIFO by arrival *into that bucket*: a touched key goes to
//!   the back of its new bucket even if it was inserted long ago.
//! - A key at `u64::MAX` stays in its bucket on touch and is moved to the back.
//! - `debug_validate_invariants()` is available in debug and test builds.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Node<K> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    freq: u64,
    key: K,
}

#[derive(Debug, Default)]
struct Bucket {
    front: Option<SlotId>,
    back: Option<SlotId>,
    lower: Option<u64>,
    higher: Option<u64>,
}

/// O(1) LFU metadata tracker with FIFO tie-breaking within a frequency.
///
/// # Example
///
/// ```
/// use hypercache::ds::FrequencyBuckets;
///
/// let mut freq = FrequencyBuckets::with_capacity(16);
/// assert!(freq.insert(7u64));
/// assert!(!freq.insert(7u64));
/// assert_eq!(freq.touch(&7), Some(2));
/// assert_eq!(freq.remove(&7), Some(2));
/// assert!(freq.is_empty());
/// ```
#[derive(Debug)]
pub struct FrequencyBuckets<K> {
    nodes: SlotArena<Node<K>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, Bucket>,
    // 0 while empty
    least_frequency: u64,
}

impl<K> FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty tracker sized for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            least_frequency: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Current frequency of `key`, or `None` if untracked.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.nodes.get(id).map(|node| node.freq)
    }

    /// Smallest populated frequency, or `None` if empty.
    pub fn least_frequency(&self) -> Option<u64> {
        (self.least_frequency != 0).then_some(self.least_frequency)
    }

    /// Returns the next eviction candidate without removing it.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        let id = self.buckets.get(&self.least_frequency)?.front?;
        self.nodes.get(id).map(|node| (&node.key, node.freq))
    }

    /// Keys at exactly `freq`, oldest first.
    pub fn bucket_keys(&self, freq: u64) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.buckets.get(&freq).and_then(|bucket| bucket.front);
        std::iter::from_fn(move || {
            let node = self.nodes.get(cursor?)?;
            cursor = node.next;
            Some(&node.key)
        })
    }

    /// Starts tracking `key` at frequency 1. Returns `false` if already tracked.
    pub fn insert(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let id = self.nodes.insert(Node {
            prev: None,
            next: None,
            freq: 1,
            key: key.clone(),
        });
        self.index.insert(key, id);

        if !self.buckets.contains_key(&1) {
            let higher = self.least_frequency().filter(|&f| f > 1);
            self.link_bucket(1, None, higher);
        }
        self.push_back(1, id);
        self.least_frequency = 1;
        true
    }

    /// Increments the frequency of `key` and returns the new value.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let freq = self.nodes.get(id)?.freq;

        if freq == u64::MAX {
            self.unlink(freq, id)?;
            self.push_back(freq, id);
            return Some(freq);
        }
        let next_freq = freq + 1;

        let (lower, higher) = self.neighbours(freq)?;
        self.unlink(freq, id)?;
        let emptied = self.bucket_is_empty(freq);
        if emptied {
            self.unlink_bucket(freq, lower, higher);
        }

        if !self.buckets.contains_key(&next_freq) {
            let below = if emptied { lower } else { Some(freq) };
            self.link_bucket(next_freq, below, higher);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.freq = next_freq;
        }
        self.push_back(next_freq, id);

        if emptied && self.least_frequency == freq {
            self.least_frequency = next_freq;
        }
        Some(next_freq)
    }

    /// Stops tracking `key` and returns its last frequency.
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let node = self.detach(id)?;
        Some(node.freq)
    }

    /// Removes and returns the eviction candidate `(key, freq)`.
    pub fn pop_min(&mut self) -> Option<(K, u64)> {
        let id = self.buckets.get(&self.least_frequency)?.front?;
        let node = self.detach(id)?;
        Some((node.key, node.freq))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.buckets.clear();
        self.least_frequency = 0;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.nodes.len(), self.index.len());

        if self.is_empty() {
            assert!(self.buckets.is_empty());
            assert_eq!(self.least_frequency, 0);
            return;
        }

        let least = self
            .buckets
            .get(&self.least_frequency)
            .expect("least frequency bucket missing");
        assert_eq!(least.lower, None);

        for (&freq, bucket) in &self.buckets {
            if let Some(lower) = bucket.lower {
                assert!(lower < freq);
                assert_eq!(self.buckets[&lower].higher, Some(freq));
            } else {
                assert_eq!(self.least_frequency, freq);
            }
            if let Some(higher) = bucket.higher {
                assert!(higher > freq);
                assert_eq!(self.buckets[&higher].lower, Some(freq));
            }

            let mut cursor = bucket.front;
            let mut last = None;
            let mut count = 0usize;
            while let Some(id) = cursor {
                let node = self.nodes.get(id).expect("bucket node missing");
                assert_eq!(node.freq, freq);
                assert_eq!(node.prev, last);
                assert_eq!(self.index.get(&node.key), Some(&id));
                last = Some(id);
                cursor = node.next;
                count += 1;
            }
            assert_eq!(bucket.back, last);
            assert!(count > 0, "empty bucket {freq} left linked");
        }
    }

    fn detach(&mut self, id: SlotId) -> Option<Node<K>> {
        let freq = self.nodes.get(id)?.freq;
        let (lower, higher) = self.neighbours(freq)?;
        self.unlink(freq, id)?;
        if self.bucket_is_empty(freq) {
            self.unlink_bucket(freq, lower, higher);
            if self.least_frequency == freq {
                self.least_frequency = higher.unwrap_or(0);
            }
        }
        let node = self.nodes.remove(id)?;
        self.index.remove(&node.key);
        Some(node)
    }

    fn neighbours(&self, freq: u64) -> Option<(Option<u64>, Option<u64>)> {
        self.buckets
            .get(&freq)
            .map(|bucket| (bucket.lower, bucket.higher))
    }

    fn bucket_is_empty(&self, freq: u64) -> bool {
        self.buckets
            .get(&freq)
            .is_none_or(|bucket| bucket.front.is_none())
    }

    fn bucket_mut(&mut self, freq: Option<u64>) -> Option<&mut Bucket> {
        self.buckets.get_mut(&freq?)
    }

    fn link_bucket(&mut self, freq: u64, lower: Option<u64>, higher: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                lower,
                higher,
                ..Bucket::default()
            },
        );
        if let Some(bucket) = self.bucket_mut(lower) {
            bucket.higher = Some(freq);
        }
        if let Some(bucket) = self.bucket_mut(higher) {
            bucket.lower = Some(freq);
        }
    }

    fn unlink_bucket(&mut self, freq: u64, lower: Option<u64>, higher: Option<u64>) {
        if let Some(bucket) = self.bucket_mut(lower) {
            bucket.higher = higher;
        }
        if let Some(bucket) = self.bucket_mut(higher) {
            bucket.lower = lower;
        }
        self.buckets.remove(&freq);
    }

    fn push_back(&mut self, freq: u64, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return;
        };
        let old_back = bucket.back.replace(id);
        if old_back.is_none() {
            bucket.front = Some(id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = old_back;
            node.next = None;
        }
        if let Some(prev) = old_back {
            if let Some(node) = self.nodes.get_mut(prev) {
                node.next = Some(id);
            }
        }
    }

    fn unlink(&mut self, freq: u64, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.nodes.get(id)?;
            (node.prev, node.next)
        };

        let bucket = self.buckets.get_mut(&freq)?;
        match prev {
            Some(prev) => {
                if let Some(node) = self.nodes.get_mut(prev) {
                    node.next = next;
                }
            },
            None => bucket.front = next,
        }
        match next {
            Some(next) => {
                if let Some(node) = self.nodes.get_mut(next) {
                    node.prev = prev;
                }
            },
            None => bucket.back = prev,
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = None;
            node.next = None;
        }
        Some(())
    }
}

impl<K> Default for FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_starts_at_one() {
        let mut buckets = FrequencyBuckets::new();
        assert!(buckets.insert("a"));
        assert_eq!(buckets.frequency(&"a"), Some(1));
        assert_eq!(buckets.least_frequency(), Some(1));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn touch_missing_returns_none() {
        let mut buckets: FrequencyBuckets<&str> = FrequencyBuckets::new();
        assert_eq!(buckets.touch(&"missing"), None);
        assert_eq!(buckets.remove(&"missing"), None);
        assert_eq!(buckets.least_frequency(), None);
    }

    #[test]
    fn fifo_within_same_frequency() {
        let mut buckets = FrequencyBuckets::new();
        for key in ["a", "b", "c"] {
            buckets.insert(key);
        }
        assert_eq!(buckets.bucket_keys(1).copied().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(buckets.pop_min(), Some(("a", 1)));
        assert_eq!(buckets.pop_min(), Some(("b", 1)));
        assert_eq!(buckets.pop_min(), Some(("c", 1)));
        assert_eq!(buckets.pop_min(), None);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn touched_key_joins_back_of_next_bucket() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("old");
        buckets.insert("new");
        buckets.touch(&"new");
        buckets.touch(&"old");

        // "new" reached freq 2 first, so it leaves first.
        assert_eq!(buckets.bucket_keys(2).copied().collect::<Vec<_>>(), ["new", "old"]);
        assert_eq!(buckets.least_frequency(), Some(2));
        assert_eq!(buckets.peek_min(), Some((&"new", 2)));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn least_frequency_skips_gaps_on_remove() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        for _ in 0..4 {
            buckets.touch(&"b");
        }
        assert_eq!(buckets.frequency(&"b"), Some(5));

        assert_eq!(buckets.remove(&"a"), Some(1));
        assert_eq!(buckets.least_frequency(), Some(5));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn insert_below_existing_buckets_relinks() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.touch(&"a");
        buckets.touch(&"a");
        assert_eq!(buckets.least_frequency(), Some(3));

        buckets.insert("b");
        assert_eq!(buckets.least_frequency(), Some(1));
        buckets.debug_validate_invariants();
        assert_eq!(buckets.pop_min(), Some(("b", 1)));
        assert_eq!(buckets.least_frequency(), Some(3));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn touch_inserts_bucket_between_neighbours() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        buckets.insert("c");
        for _ in 0..3 {
            buckets.touch(&"c");
        }
        // buckets: 1 -> 4; touching "a" creates 2 between them.
        buckets.touch(&"a");
        buckets.debug_validate_invariants();
        assert_eq!(buckets.frequency(&"a"), Some(2));
        assert_eq!(buckets.pop_min(), Some(("b", 1)));
        assert_eq!(buckets.pop_min(), Some(("a", 2)));
        assert_eq!(buckets.pop_min(), Some(("c", 4)));
    }

    #[test]
    fn clear_resets_state() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert(1);
        buckets.insert(2);
        buckets.touch(&2);
        buckets.clear();
        assert!(buckets.is_empty());
        assert_eq!(buckets.least_frequency(), None);
        assert_eq!(buckets.peek_min(), None);
        buckets.debug_validate_invariants();
    }
}
