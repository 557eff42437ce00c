//! Scan parameters and their validation.

use std::fmt;
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of bytes read per call while digesting.
pub const DEFAULT_BLOCK_SIZE: u64 = 1024;

/// Digest algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    /// 64-bit XXH3. Quick, with a small chance of false duplicates.
    Fast,
    /// 256-bit BLAKE3.
    #[default]
    Strong,
}

impl fmt::Display for HashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Strong => write!(f, "strong"),
        }
    }
}

impl FromStr for HashMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "strong" => Ok(Self::Strong),
            other => Err(format!("unknown hash mode '{other}' (expected 'fast' or 'strong')")),
        }
    }
}

/// Raw scan parameters as supplied by the user, before validation.
///
/// Sizes are kept as text so the validator owns the parsing rules and
/// reports them with the same messages regardless of the front end.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ScanParams {
    /// Directory to scan.
    pub root: PathBuf,

    /// Bytes read per call while digesting.
    #[builder(default = "DEFAULT_BLOCK_SIZE.to_string()")]
    #[serde(default = "default_block_size")]
    pub block_size: String,

    /// Files strictly smaller than this are ignored.
    #[builder(default = "\"0\".to_string()")]
    #[serde(default = "default_min_size")]
    pub min_size: String,

    /// Digest algorithm.
    #[builder(default)]
    #[serde(default)]
    pub hash_mode: HashMode,

    /// Reject relative root paths.
    #[builder(default = "false")]
    #[serde(default)]
    pub require_absolute: bool,

    /// Treat symlinks to regular files as candidates.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,
}

fn default_block_size() -> String {
    DEFAULT_BLOCK_SIZE.to_string()
}

fn default_min_size() -> String {
    "0".to_string()
}

fn default_true() -> bool {
    true
}

impl ScanParams {
    /// Create a new params builder.
    pub fn builder() -> ScanParamsBuilder {
        ScanParamsBuilder::default()
    }

    /// Create params for scanning a path with all defaults.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            block_size: default_block_size(),
            min_size: default_min_size(),
            hash_mode: HashMode::default(),
            require_absolute: false,
            follow_symlinks: false,
            include_hidden: true,
        }
    }

    /// Validate the parameters and produce an immutable [`ScanConfig`].
    ///
    /// Checks run in a fixed order and stop at the first failure: the root
    /// exists, is absolute (only when required), is a directory, then the
    /// block size and the min size parse.
    pub fn validate(&self) -> Result<ScanConfig, ConfigError> {
        let root = self.root.as_path();

        let metadata = std::fs::metadata(root).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::PathNotFound {
                    path: root.to_path_buf(),
                }
            } else {
                ConfigError::Inaccessible {
                    path: root.to_path_buf(),
                    source,
                }
            }
        })?;

        if self.require_absolute && !root.is_absolute() {
            return Err(ConfigError::PathNotAbsolute {
                path: root.to_path_buf(),
            });
        }

        if !metadata.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let block_size = match self.block_size.trim().parse::<u64>() {
            Ok(n) if n > 0 => n,
            // Still a positive integer; the digester reports it as too large.
            Err(err) if *err.kind() == IntErrorKind::PosOverflow => u64::MAX,
            _ => {
                return Err(ConfigError::InvalidBlockSize {
                    value: self.block_size.clone(),
                });
            }
        };

        let min_size =
            self.min_size
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidMinSize {
                    value: self.min_size.clone(),
                })?;

        let root = root
            .canonicalize()
            .map_err(|source| ConfigError::Inaccessible {
                path: root.to_path_buf(),
                source,
            })?;

        Ok(ScanConfig {
            root,
            block_size,
            min_size,
            hash_mode: self.hash_mode,
            follow_symlinks: self.follow_symlinks,
            include_hidden: self.include_hidden,
        })
    }
}

/// Validated, immutable configuration for one scan.
///
/// Only [`ScanParams::validate`] can create one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanConfig {
    root: PathBuf,
    block_size: u64,
    min_size: u64,
    hash_mode: HashMode,
    follow_symlinks: bool,
    include_hidden: bool,
}

impl ScanConfig {
    /// Canonical absolute root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Bytes read per call while digesting. Always positive.
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Files strictly smaller than this are ignored.
    pub fn min_size(&self) -> u64 {
        self.min_size
    }

    pub fn hash_mode(&self) -> HashMode {
        self.hash_mode
    }

    pub fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Check whether a file of `size` bytes is below the minimum.
    pub fn is_undersized(&self, size: u64) -> bool {
        size < self.min_size
    }
}
