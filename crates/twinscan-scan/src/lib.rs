//! Directory traversal and scan progress for twinscan.
//!
//! # Overview
//!
//! `twinscan-scan` turns a validated [`ScanConfig`] into a lazy stream of
//! [`FileCandidate`]s and carries the live counters a running scan exposes:
//!
//! - **Deterministic traversal** via jwalk with sorted siblings
//! - **Per-entry errors** yielded inline, never aborting the walk
//! - **Lock-free progress** through atomics shared with observers
//! - **Polling observer** driven by a tokio interval
//!
//! # Example
//!
//! ```rust,no_run
//! use twinscan_scan::{DirectoryWalker, ScanParams};
//!
//! let config = ScanParams::new("/path/to/scan").validate().unwrap();
//! for entry in DirectoryWalker::new(&config).walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {e}"),
//!     }
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use twinscan_scan::{ProgressHandle, ProgressObserver, ProgressState};
//!
//! # async fn demo() {
//! let state = Arc::new(ProgressState::new());
//! let observer = ProgressObserver::new(ProgressHandle::new(state));
//! let last = observer
//!     .watch(|p| println!("Scanned {} bytes so far", p.total_size))
//!     .await;
//! println!("Done: {} bytes", last.total_size);
//! # }
//! ```

mod observer;
mod progress;
mod walker;

pub use observer::{DEFAULT_POLL_INTERVAL, ProgressObserver};
pub use progress::{ProgressHandle, ProgressState, ScanProgress};
pub use walker::{Candidates, DirectoryWalker};

// Re-export core types for convenience
pub use twinscan_core::{FileCandidate, ScanConfig, ScanError, ScanParams};
