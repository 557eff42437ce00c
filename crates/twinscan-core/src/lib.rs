//! Core types for twinscan.
//!
//! This crate provides the data structures shared by the scanner, the
//! duplicate-detection engine and front ends: validated configuration,
//! the error taxonomy, file candidates, digests and scan results.

mod config;
mod error;
mod file;
mod report;

pub use config::{DEFAULT_BLOCK_SIZE, HashMode, ScanConfig, ScanParams, ScanParamsBuilder};
pub use error::{ConfigError, FileError, FileErrorKind, ScanError};
pub use file::{ContentDigest, FileCandidate};
pub use report::{DuplicateGroup, ScanResult, ScanStatus};
