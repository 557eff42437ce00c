//! Scan orchestration.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use twinscan_core::{
    ConfigError, FileCandidate, FileError, ScanConfig, ScanError, ScanParams, ScanResult,
    ScanStatus,
};
use twinscan_scan::{DirectoryWalker, ProgressHandle, ProgressState};

use crate::buckets::{BucketStore, Insertion};
use crate::digest::{Digester, StreamingDigest};
use crate::report::ResultBuilder;

/// Mutable per-scan bookkeeping. Counters that observers read live in the
/// shared [`ProgressState`].
struct ScanLedger {
    progress: Arc<ProgressState>,
    errors: Vec<FileError>,
    ignored: Vec<PathBuf>,
}

impl ScanLedger {
    fn new(progress: Arc<ProgressState>) -> Self {
        Self {
            progress,
            errors: Vec::new(),
            ignored: Vec::new(),
        }
    }

    fn record_error(&mut self, error: FileError) {
        tracing::warn!(path = %error.path.display(), message = %error.message, "skipping file");
        self.progress.record_error();
        self.errors.push(error);
    }

    fn ignore(&mut self, path: PathBuf) {
        tracing::trace!(path = %path.display(), "below min size, ignoring");
        self.progress.record_ignored();
        self.ignored.push(path);
    }

    /// Fold one store insertion into the totals.
    fn apply(&mut self, path: PathBuf, size: u64, insertion: Insertion) {
        if let Some(evicted) = insertion.evicted {
            // Counted when it arrived alone; no longer part of the total.
            self.progress.remove_size(size);
            self.record_error(FileError::from_read(evicted.path, &evicted.error));
        }
        match insertion.incoming_error {
            None => self.progress.add_size(size),
            Some(error) => self.record_error(FileError::from_read(path, &error)),
        }
    }

    /// Replace every per-file error with nothing; the fatal error is reported
    /// as the scan status instead.
    fn abort(&mut self) {
        self.errors.clear();
        self.progress.clear_errors();
    }
}

/// Runs one duplicate scan and owns its state.
///
/// Take a [`ProgressHandle`] before calling one of the `run` methods; they
/// consume the engine, so an engine scans at most once.
///
/// ```rust,no_run
/// use twinscan_analyze::{ScanEngine, ScanParams};
///
/// let engine = ScanEngine::new();
/// let progress = engine.progress();
/// let result = engine.run(&ScanParams::new("/data")).unwrap();
/// assert!(progress.is_done());
/// println!("{} duplicate groups", result.groups.len());
/// ```
#[derive(Debug)]
pub struct ScanEngine {
    progress: Arc<ProgressState>,
    cancel: Arc<AtomicBool>,
}

impl ScanEngine {
    /// Create an engine with its own cancel flag.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(ProgressState::new()),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use an externally owned cancel flag (e.g. one set by a Ctrl+C handler).
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Flag that stops the scan before the next traversal step when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Read-only handle on the live counters.
    pub fn progress(&self) -> ProgressHandle {
        ProgressHandle::new(Arc::clone(&self.progress))
    }

    pub fn current_total_size(&self) -> u64 {
        self.progress.total_size()
    }

    pub fn is_done(&self) -> bool {
        self.progress.is_done()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Validate `params` and scan. A configuration error returns before any
    /// traversal and leaves the progress untouched (`done` stays false).
    pub fn run(self, params: &ScanParams) -> Result<ScanResult, ConfigError> {
        let config = params.validate().inspect_err(|err| {
            tracing::error!(error = %err, "invalid scan configuration");
        })?;
        Ok(self.run_config(&config))
    }

    /// Scan with the built-in streaming digester.
    pub fn run_config(self, config: &ScanConfig) -> ScanResult {
        let digester = StreamingDigest::new(config.hash_mode(), config.block_size());
        tracing::debug!(
            mode = %digester.mode(),
            block_size = digester.block_size(),
            "using streaming digest"
        );
        self.run_with_digester(config, digester)
    }

    /// Scan with a custom digest implementation.
    pub fn run_with_digester<D: Digester>(self, config: &ScanConfig, mut digester: D) -> ScanResult {
        self.progress.start();
        let walker = DirectoryWalker::new(config);
        tracing::info!(
            root = %walker.root().display(),
            mode = %config.hash_mode(),
            block_size = config.block_size(),
            min_size = config.min_size(),
            "starting duplicate scan"
        );

        let mut store = BucketStore::new();
        let mut ledger = ScanLedger::new(Arc::clone(&self.progress));
        let mut status = ScanStatus::Completed;

        for entry in walker.walk() {
            if self.is_cancelled() {
                tracing::warn!("scan cancelled");
                status = ScanStatus::Cancelled;
                break;
            }

            let FileCandidate { path, size } = match entry {
                Ok(candidate) => candidate,
                Err(err) => {
                    let path = err
                        .path()
                        .map(PathBuf::from)
                        .unwrap_or_else(|| config.root().to_path_buf());
                    ledger.record_error(FileError::from_walk(path, &err));
                    continue;
                }
            };
            self.progress.record_file();

            if config.is_undersized(size) {
                ledger.ignore(path);
                continue;
            }

            let outcome = store.insert(FileCandidate::new(path.clone(), size), &mut digester);
            self.progress.set_files_hashed(store.files_hashed());
            match outcome {
                Ok(insertion) => ledger.apply(path, size, insertion),
                Err(fatal) => {
                    tracing::error!(error = %fatal, path = %path.display(), "aborting scan");
                    ledger.abort();
                    status = ScanStatus::Aborted {
                        message: fatal_message(&fatal),
                    };
                    break;
                }
            }
        }

        self.progress.mark_done();
        let elapsed = self.progress.elapsed();

        let result = ResultBuilder::new(&store)
            .errors(ledger.errors)
            .ignored(ledger.ignored)
            .total_size(self.progress.total_size())
            .status(status)
            .hash_mode(config.hash_mode())
            .files_scanned(self.progress.snapshot().files_scanned)
            .scan_duration(elapsed)
            .build();

        tracing::info!(
            sizes = store.distinct_sizes(),
            groups = result.groups.len(),
            total_size = result.total_size,
            files_hashed = result.files_hashed,
            errors = result.errors.len(),
            ignored = result.ignored.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan finished"
        );
        result
    }
}

impl Default for ScanEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn fatal_message(error: &ScanError) -> String {
    match error {
        ScanError::BlockSizeTooLarge { .. } => "Block size is too large".to_string(),
        other => other.to_string(),
    }
}
