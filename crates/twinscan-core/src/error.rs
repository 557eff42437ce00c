//! Error types for configuration and scanning.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid scan parameters. Detected before any traversal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Root path does not exist.
    #[error("The path doesn't exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Root path exists but its metadata could not be read.
    #[error("Cannot access {path}: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is relative while absolute paths are required.
    #[error("The path is not absolute: {path}")]
    PathNotAbsolute { path: PathBuf },

    /// Root path is not a directory.
    #[error("The path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Block size is not a positive integer.
    #[error("The block size is not a positive integer: {value:?}")]
    InvalidBlockSize { value: String },

    /// Min size is not a non-negative integer.
    #[error("The min size is not a positive integer or zero: {value:?}")]
    InvalidMinSize { value: String },
}

/// Errors raised while walking or digesting.
///
/// Everything except [`ScanError::BlockSizeTooLarge`] is local to one file.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path vanished or never existed.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Traversal failure that carries no I/O error (e.g. a link loop).
    #[error("Cannot traverse {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// The configured block size cannot be allocated as a read buffer.
    #[error("Block size is too large ({block_size} bytes)")]
    BlockSizeTooLarge { block_size: u64 },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error must abort the whole scan.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BlockSizeTooLarge { .. })
    }

    /// Path the error is attached to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::Walk { path, .. } => Some(path),
            Self::BlockSizeTooLarge { .. } => None,
        }
    }
}

/// Kind of per-file error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileErrorKind {
    /// Permission was denied.
    PermissionDenied,
    /// The file disappeared during the scan.
    NotFound,
    /// Error reading metadata or traversing.
    Metadata,
    /// Error reading file contents.
    Read,
}

/// A per-file problem recorded in the scan ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    /// Path where the error occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of error.
    pub kind: FileErrorKind,
}

impl FileError {
    /// Create a new file error.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: FileErrorKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Record a traversal failure (stat, directory listing, broken link).
    pub fn from_walk(path: impl Into<PathBuf>, error: &ScanError) -> Self {
        let kind = match error {
            ScanError::PermissionDenied { .. } => FileErrorKind::PermissionDenied,
            ScanError::NotFound { .. } => FileErrorKind::NotFound,
            _ => FileErrorKind::Metadata,
        };
        Self::new(path, error.to_string(), kind)
    }

    /// Record a failure while reading file contents.
    pub fn from_read(path: impl Into<PathBuf>, error: &ScanError) -> Self {
        let kind = match error {
            ScanError::PermissionDenied { .. } => FileErrorKind::PermissionDenied,
            ScanError::NotFound { .. } => FileErrorKind::NotFound,
            _ => FileErrorKind::Read,
        };
        Self::new(path, error.to_string(), kind)
    }
}
