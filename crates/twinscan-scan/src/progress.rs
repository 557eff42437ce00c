//! Scan progress reporting.

use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress information during a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanProgress {
    /// Bytes of files accepted so far (neither ignored nor errored).
    pub total_size: u64,
    /// Regular files seen by the walker.
    pub files_scanned: u64,
    /// Files whose content was digested.
    pub files_hashed: u64,
    /// Per-file errors recorded.
    pub errors_count: u64,
    /// Files ignored for being too small.
    pub ignored_count: u64,
    /// Whether the scan has finished.
    pub done: bool,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            total_size: 0,
            files_scanned: 0,
            files_hashed: 0,
            errors_count: 0,
            ignored_count: 0,
            done: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate scan rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.total_size as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Live counters written by the scan task and read by observers.
///
/// Only the scan task writes. `done` flips from false to true once, with
/// release ordering so readers that see it also see the final counters.
#[derive(Debug, Default)]
pub struct ProgressState {
    started: OnceLock<Instant>,
    total_size: AtomicU64,
    files_scanned: AtomicU64,
    files_hashed: AtomicU64,
    errors_count: AtomicU64,
    ignored_count: AtomicU64,
    done: AtomicBool,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the elapsed-time clock. Later calls are no-ops.
    pub fn start(&self) {
        let _ = self.started.set(Instant::now());
    }

    pub fn add_size(&self, bytes: u64) {
        self.total_size.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Take back bytes of a file that later failed. Saturates at zero.
    pub fn remove_size(&self, bytes: u64) {
        let _ = self
            .total_size
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(bytes))
            });
    }

    pub fn record_file(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_files_hashed(&self, count: u64) {
        self.files_hashed.store(count, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Forget all recorded errors (used when a fatal error replaces them).
    pub fn clear_errors(&self) {
        self.errors_count.store(0, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.ignored_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
    }

    pub fn total_size(&self) -> u64 {
        self.total_size.load(Ordering::Relaxed)
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Time since [`start`](Self::start), or zero if not started.
    pub fn elapsed(&self) -> Duration {
        self.started
            .get()
            .map(Instant::elapsed)
            .unwrap_or(Duration::ZERO)
    }

    /// Read every counter into a snapshot.
    pub fn snapshot(&self) -> ScanProgress {
        let done = self.is_done();
        ScanProgress {
            total_size: self.total_size(),
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_hashed: self.files_hashed.load(Ordering::Relaxed),
            errors_count: self.errors_count.load(Ordering::Relaxed),
            ignored_count: self.ignored_count.load(Ordering::Relaxed),
            done,
            elapsed: self.elapsed(),
        }
    }
}

/// Read-only view of a scan's [`ProgressState`], cheap to clone and send
/// to another task.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    state: Arc<ProgressState>,
}

impl ProgressHandle {
    pub fn new(state: Arc<ProgressState>) -> Self {
        Self { state }
    }

    /// Bytes accepted so far.
    pub fn current_total_size(&self) -> u64 {
        self.state.total_size()
    }

    /// Whether the scan has finished, been cancelled, or aborted.
    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    pub fn snapshot(&self) -> ScanProgress {
        self.state.snapshot()
    }
}
