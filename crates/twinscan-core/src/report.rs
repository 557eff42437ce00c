//! Scan result types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::HashMode;
use crate::error::FileError;
use crate::file::ContentDigest;

/// A group of files sharing size and content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Size of each file in bytes.
    pub size: u64,

    /// Digest shared by all files in this group.
    pub digest: ContentDigest,

    /// Paths in first-seen traversal order. Always at least two.
    pub paths: Vec<PathBuf>,

    /// Wasted space: size * (count - 1).
    pub wasted_bytes: u64,
}

impl DuplicateGroup {
    /// Create a group, computing the wasted space.
    pub fn new(size: u64, digest: ContentDigest, paths: Vec<PathBuf>) -> Self {
        let wasted_bytes = size.saturating_mul(paths.len().saturating_sub(1) as u64);
        Self {
            size,
            digest,
            paths,
            wasted_bytes,
        }
    }

    /// Get the number of duplicate files.
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// Check if keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }
}

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanStatus {
    /// Traversal visited the whole tree.
    Completed,
    /// The cancel flag was raised; results are partial.
    Cancelled,
    /// A fatal error stopped the scan; per-file errors were discarded.
    Aborted { message: String },
}

/// Final, immutable outcome of a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Duplicate groups, largest files first.
    pub groups: Vec<DuplicateGroup>,

    /// Per-file errors, sorted by path.
    pub errors: Vec<FileError>,

    /// Files below the minimum size, sorted by path.
    pub ignored: Vec<PathBuf>,

    /// Sum of sizes of all files neither ignored nor errored.
    pub total_size: u64,

    /// How the scan ended.
    pub status: ScanStatus,

    /// Digest algorithm used.
    pub hash_mode: HashMode,

    /// Regular files seen by the walker.
    pub files_scanned: u64,

    /// Files whose content was digested.
    pub files_hashed: u64,

    /// Wall time of the scan.
    pub scan_duration: Duration,
}

impl ScanResult {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Get total number of duplicate files across all groups.
    pub fn total_duplicate_files(&self) -> usize {
        self.groups.iter().map(|g| g.paths.len()).sum()
    }

    /// Total space that could be reclaimed by keeping one file per group.
    pub fn total_wasted_space(&self) -> u64 {
        self.groups.iter().map(|g| g.wasted_bytes).sum()
    }

    /// Whether the whole tree was visited.
    pub fn is_complete(&self) -> bool {
        self.status == ScanStatus::Completed
    }

    /// The top-level error that aborted the scan, if any.
    pub fn fatal_error(&self) -> Option<&str> {
        match &self.status {
            ScanStatus::Aborted { message } => Some(message),
            _ => None,
        }
    }
}
