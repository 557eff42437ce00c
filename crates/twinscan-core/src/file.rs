//! File candidates and content digests.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A regular file found during traversal, not yet classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Path to the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

impl FileCandidate {
    /// Create a new candidate.
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Content digest of a whole file.
///
/// The variant follows the scan's [`HashMode`](crate::HashMode); digests of
/// different widths never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ContentDigest {
    /// 64-bit XXH3 digest.
    Fast(u64),
    /// 256-bit BLAKE3 digest.
    Strong([u8; 32]),
}

impl ContentDigest {
    /// Get the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        match self {
            Self::Fast(value) => format!("{value:016x}"),
            Self::Strong(bytes) => bytes.iter().map(|b| format!("{b:02x}")).collect(),
        }
    }

    /// Parse a digest from its hex form (16 chars for fast, 64 for strong).
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("invalid hex digest: {hex:?}"));
        }
        match hex.len() {
            16 => u64::from_str_radix(hex, 16)
                .map(Self::Fast)
                .map_err(|e| e.to_string()),
            64 => {
                let mut bytes = [0u8; 32];
                for (i, byte) in bytes.iter_mut().enumerate() {
                    *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                        .map_err(|e| e.to_string())?;
                }
                Ok(Self::Strong(bytes))
            }
            n => Err(format!("digest must be 16 or 64 hex characters, got {n}")),
        }
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.to_hex()
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = String;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        Self::from_hex(&hex)
    }
}
