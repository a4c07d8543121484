use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for cache metrics snapshots.
///
/// Writes the text exposition format, one `# TYPE` line per sample, with the
/// eviction policy as a `policy` label.
///
/// ```
/// use hypercache::metrics::exporter::PrometheusTextExporter;
/// use hypercache::metrics::snapshot::CacheMetricsSnapshot;
/// use hypercache::metrics::traits::MetricsExporter;
///
/// let exporter = PrometheusTextExporter::new("hypercache", Vec::new());
/// exporter.export(&CacheMetricsSnapshot {
///     policy: "lfu",
///     get_hits: 3,
///     ..Default::default()
/// });
/// let text = String::from_utf8(exporter.into_inner()).unwrap();
/// assert!(text.contains("hypercache_get_hits_total{policy=\"lfu\"} 3"));
/// ```
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_sample(&self, kind: &str, suffix: &str, policy: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(writer, "# TYPE {name} {kind}");
        let _ = writeln!(writer, "{name}{{policy=\"{policy}\"}} {value}");
    }

    fn write_counter(&self, suffix: &str, policy: &str, value: u64) {
        self.write_sample("counter", suffix, policy, value);
    }

    fn write_gauge(&self, suffix: &str, policy: &str, value: u64) {
        self.write_sample("gauge", suffix, policy, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<CacheMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CacheMetricsSnapshot) {
        let policy = snapshot.policy;
        self.write_counter("get_calls_total", policy, snapshot.get_calls);
        self.write_counter("get_hits_total", policy, snapshot.get_hits);
        self.write_counter("get_misses_total", policy, snapshot.get_misses);
        self.write_counter("insert_calls_total", policy, snapshot.insert_calls);
        self.write_counter("insert_new_total", policy, snapshot.insert_new);
        self.write_counter("insert_updates_total", policy, snapshot.insert_updates);
        self.write_counter("evicted_entries_total", policy, snapshot.evicted_entries);
        self.write_counter(
            "eviction_candidates_total",
            policy,
            snapshot.eviction_candidates,
        );
        self.write_counter("removals_total", policy, snapshot.removals);
        self.write_counter("clears_total", policy, snapshot.clears);
        self.write_counter("peek_calls_total", policy, snapshot.peek_calls);
        self.write_counter("peek_found_total", policy, snapshot.peek_found);
        self.write_gauge("cache_len", policy, snapshot.cache_len as u64);
        self.write_gauge("capacity", policy, snapshot.capacity as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(prefix: &str, snapshot: &CacheMetricsSnapshot) -> String {
        let exporter = PrometheusTextExporter::new(prefix, Vec::new());
        exporter.export(snapshot);
        String::from_utf8(exporter.into_inner()).unwrap()
    }

    #[test]
    fn writes_counters_and_gauges() {
        let text = render(
            "cache",
            &CacheMetricsSnapshot {
                policy: "hyperbolic",
                evicted_entries: 7,
                cache_len: 10,
                capacity: 16,
                ..Default::default()
            },
        );
        assert!(text.contains("# TYPE cache_evicted_entries_total counter\n"));
        assert!(text.contains("cache_evicted_entries_total{policy=\"hyperbolic\"} 7\n"));
        assert!(text.contains("# TYPE cache_capacity gauge\n"));
        assert!(text.contains("cache_cache_len{policy=\"hyperbolic\"} 10\n"));
    }

    #[test]
    fn empty_prefix_leaves_names_bare() {
        let text = render("", &CacheMetricsSnapshot::default());
        assert!(text.starts_with("# TYPE get_calls_total counter\n"));
    }
}
