use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Process-wide request counters, shared by every in-flight classification.
///
/// Inject one instance per process (or per test) behind an `Arc`.
#[derive(Debug, Default)]
pub struct RequestStats {
    requests: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub successful: u64,
    pub errors: u64,
    /// Percentage of requests that succeeded; `None` before the first request.
    pub success_rate: Option<f64>,
}

impl RequestStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request and return its 1-based sequence number.
    pub fn record_request(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let total_requests = self.requests.load(Ordering::Relaxed);
        let successful = self.successes.load(Ordering::Relaxed);
        StatsSnapshot {
            total_requests,
            successful,
            errors: self.failures.load(Ordering::Relaxed),
            success_rate: (total_requests > 0)
                .then(|| successful as f64 / total_requests as f64 * 100.0),
        }
    }
}
