/// Point-in-time copy of a cache's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CacheMetricsSnapshot {
    pub policy: &'static str,

    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,

    pub evicted_entries: u64,
    pub eviction_candidates: u64, // keys ranked across all evictions
    pub removals: u64,
    pub clears: u64,

    pub peek_calls: u64,
    pub peek_found: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl CacheMetricsSnapshot {
    /// Fraction of `get` calls that hit, or 0.0 before the first call.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }

    /// Mean keys ranked per eviction.
    pub fn mean_eviction_candidates(&self) -> f64 {
        if self.evicted_entries == 0 {
            0.0
        } else {
            self.eviction_candidates as f64 / self.evicted_entries as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_handle_zero_denominators() {
        let snap = CacheMetricsSnapshot::default();
        assert_eq!(snap.hit_ratio(), 0.0);
        assert_eq!(snap.mean_eviction_candidates(), 0.0);
    }

    #[test]
    fn ratios() {
        let snap = CacheMetricsSnapshot {
            get_calls: 4,
            get_hits: 3,
            evicted_entries: 2,
            eviction_candidates: 10,
            ..Default::default()
        };
        assert_eq!(snap.hit_ratio(), 0.75);
        assert_eq!(snap.mean_eviction_candidates(), 5.0);
    }
}
