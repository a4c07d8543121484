use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{
    CoreMetricsReadRecorder, CoreMetricsRecorder, EvictionMetricsRecorder, MetricsReset,
};

/// Live counters owned by a [`Cache`](crate::cache::Cache).
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
    pub eviction_candidates: u64,
    pub removals: u64,
    pub clears: u64,
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CoreMetricsRecorder for CacheMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_calls += 1;
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_calls += 1;
        self.insert_updates += 1;
    }

    fn record_remove(&mut self) {
        self.removals += 1;
    }

    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl EvictionMetricsRecorder for CacheMetrics {
    fn record_eviction(&mut self, candidates: usize) {
        self.evicted_entries += 1;
        self.eviction_candidates += candidates as u64;
    }
}

impl CoreMetricsReadRecorder for &CacheMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_found(&self) {
        self.peek_found.incr();
    }
}

impl MetricsReset for CacheMetrics {
    fn reset_metrics(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_counters_split_hits_and_misses() {
        let mut m = CacheMetrics::new();
        m.record_get_hit();
        m.record_get_hit();
        m.record_get_miss();
        assert_eq!((m.get_calls, m.get_hits, m.get_misses), (3, 2, 1));
    }

    #[test]
    fn eviction_accumulates_candidates() {
        let mut m = CacheMetrics::new();
        m.record_eviction(8);
        m.record_eviction(3);
        assert_eq!(m.evicted_entries, 2);
        assert_eq!(m.eviction_candidates, 11);
    }

    #[test]
    fn read_recorder_works_through_shared_ref() {
        let m = CacheMetrics::new();
        (&m).record_peek_call();
        (&m).record_peek_found();
        (&m).record_peek_call();
        assert_eq!(m.peek_calls.get(), 2);
        assert_eq!(m.peek_found.get(), 1);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut m = CacheMetrics::new();
        m.record_insert_new();
        m.record_clear();
        (&m).record_peek_call();
        m.reset_metrics();
        assert_eq!(m.insert_calls, 0);
        assert_eq!(m.clears, 0);
        assert_eq!(m.peek_calls.get(), 0);
    }
}
