//! Duplicate detection for twinscan.
//!
//! This crate drives a scan from configuration to report:
//!
//! - **Size buckets** - files are grouped by exact byte size as they arrive
//! - **Lazy hashing** - a file is only read once a second file shares its size
//! - **Streaming digests** - XXH3 (`fast`) or BLAKE3 (`strong`), block by block
//!
//! # Duplicate Detection
//!
//! A file alone in its size bucket is never read. When a second file of
//! that size shows up, both are digested and every later file of the same
//! size is digested on arrival. Each file is digested at most once.
//!
//! ```rust,no_run
//! use twinscan_analyze::{HashMode, ScanEngine, ScanParams};
//!
//! let params = ScanParams::builder()
//!     .root("/path/to/scan")
//!     .min_size("1024")
//!     .hash_mode(HashMode::Fast)
//!     .build()
//!     .unwrap();
//!
//! let result = ScanEngine::new().run(&params).unwrap();
//!
//! println!("Found {} duplicate groups", result.groups.len());
//! println!("Wasted space: {} bytes", result.total_wasted_space());
//! ```
//!
//! # Custom digests
//!
//! Any [`Digester`] can replace the built-in [`StreamingDigest`] through
//! [`ScanEngine::run_with_digester`].

mod buckets;
mod digest;
mod engine;
mod report;

pub use buckets::{Bucket, BucketStore, Evicted, Insertion};
pub use digest::{Digester, StreamingDigest};
pub use engine::ScanEngine;
pub use report::ResultBuilder;

pub use twinscan_core::{
    ConfigError, ContentDigest, DuplicateGroup, FileError, FileErrorKind, HashMode, ScanConfig,
    ScanError, ScanParams, ScanResult, ScanStatus,
};
pub use twinscan_scan::{ProgressHandle, ProgressObserver, ScanProgress};
