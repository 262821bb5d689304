use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    chunks_succeeded: AtomicU64,
    chunks_failed: AtomicU64,
    rows_transported: AtomicU64,
    transport_bytes: AtomicU64,
}

/// Counters shared by every chunk of a run. Cloning shares the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub chunks_succeeded: u64,
    pub chunks_failed: u64,
    pub rows_transported: u64,
    pub transport_bytes: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn record_success(&self, rows: u64, transport_bytes: Option<u64>) {
        self.inner.chunks_succeeded.fetch_add(1, Ordering::Relaxed);
        self.inner
            .rows_transported
            .fetch_add(rows, Ordering::Relaxed);
        if let Some(bytes) = transport_bytes {
            self.inner
                .transport_bytes
                .fetch_add(bytes, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self) {
        self.inner.chunks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            chunks_succeeded: self.inner.chunks_succeeded.load(Ordering::Relaxed),
            chunks_failed: self.inner.chunks_failed.load(Ordering::Relaxed),
            rows_transported: self.inner.rows_transported.load(Ordering::Relaxed),
            transport_bytes: self.inner.transport_bytes.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_counters() {
        let metrics = Metrics::new();
        let other = metrics.clone();

        metrics.record_success(10, Some(100));
        other.record_success(5, None);
        other.record_failure();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                chunks_succeeded: 2,
                chunks_failed: 1,
                rows_transported: 15,
                transport_bytes: 100,
            }
        );
    }
}
