//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and export are separate traits so the cache core
//! only ever writes counters.
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │     CoreMetricsRecorder      │   &mut self, called from put/get/remove
//!   │  get_hit/get_miss/insert     │
//!   │  evict/remove/clear          │
//!   └──────────────┬───────────────┘
//!                  │
//!                  ▼
//!   ┌──────────────────────────────┐
//!   │   EvictionMetricsRecorder    │   candidates examined per eviction
//!   └──────────────────────────────┘
//!
//!   ┌──────────────────────────────┐
//!   │   CoreMetricsReadRecorder    │   &self, called from peek
//!   └──────────────────────────────┘
//!
//!   Consumption:
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters shared by every policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_remove(&mut self);
    fn record_clear(&mut self);
}

/// Eviction counters.
pub trait EvictionMetricsRecorder: CoreMetricsRecorder {
    /// One entry evicted after `candidates` keys were ranked.
    fn record_eviction(&mut self, candidates: usize);
}

/// Counters for `&self` paths (interior mutability).
pub trait CoreMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
