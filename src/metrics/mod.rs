//! Cache metrics: live counters, snapshots and export.
//!
//! Enabled by the `metrics` feature. A [`Cache`](crate::cache::Cache) records
//! into [`CacheMetrics`](metrics_impl::CacheMetrics) and hands out
//! [`CacheMetricsSnapshot`](snapshot::CacheMetricsSnapshot)s through
//! [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider).

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
