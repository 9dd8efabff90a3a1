use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing completed plagiarism checks.
#[derive(Default)]
pub struct CheckMetrics {
    documents_checked: AtomicU64,
    chunks_searched: AtomicU64,
    matches_found: AtomicU64,
}

impl CheckMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed check together with its searched chunks and matches.
    pub fn record_check(&self, chunks_searched: u64, matches_found: u64) {
        self.documents_checked.fetch_add(1, Ordering::Relaxed);
        self.chunks_searched
            .fetch_add(chunks_searched, Ordering::Relaxed);
        self.matches_found
            .fetch_add(matches_found, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_checked: self.documents_checked.load(Ordering::Relaxed),
            chunks_searched: self.chunks_searched.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of check counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents successfully checked since startup.
    pub documents_checked: u64,
    /// Chunks sent to the search provider across all checks.
    pub chunks_searched: u64,
    /// Matches reported across all checks.
    pub matches_found: u64,
}
