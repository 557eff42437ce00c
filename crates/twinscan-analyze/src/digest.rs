//! Streaming content digests.
//!
//! Files are read in blocks of at most `block_size` bytes, so memory stays
//! bounded regardless of file size. Each call gets a fresh digest context
//! that is consumed when finalized; only the read buffer is reused.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use xxhash_rust::xxh3::Xxh3;

use twinscan_core::{ContentDigest, HashMode, ScanError};

/// Something that can digest a whole file.
///
/// The engine calls [`digest`](Digester::digest) at most once per file.
/// Implementations must return the same variant of [`ContentDigest`] for
/// every file in a scan.
pub trait Digester {
    /// Compute the digest of the file at `path`.
    ///
    /// Errors for which [`ScanError::is_fatal`] is true abort the scan; any
    /// other error is recorded against `path`.
    fn digest(&mut self, path: &Path) -> Result<ContentDigest, ScanError>;
}

impl<D: Digester + ?Sized> Digester for &mut D {
    fn digest(&mut self, path: &Path) -> Result<ContentDigest, ScanError> {
        (**self).digest(path)
    }
}

/// Per-file digest state.
enum DigestContext {
    Fast(Box<Xxh3>),
    Strong(Box<blake3::Hasher>),
}

impl DigestContext {
    fn new(mode: HashMode) -> Self {
        match mode {
            HashMode::Fast => Self::Fast(Box::new(Xxh3::new())),
            HashMode::Strong => Self::Strong(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, block: &[u8]) {
        match self {
            Self::Fast(hasher) => hasher.update(block),
            Self::Strong(hasher) => {
                hasher.update(block);
            }
        }
    }

    fn finalize(self) -> ContentDigest {
        match self {
            Self::Fast(hasher) => ContentDigest::Fast(hasher.digest()),
            Self::Strong(hasher) => ContentDigest::Strong(*hasher.finalize().as_bytes()),
        }
    }
}

/// Block-reading file digester for one scan.
#[derive(Debug)]
pub struct StreamingDigest {
    mode: HashMode,
    block_size: u64,
    buffer: Vec<u8>,
}

impl StreamingDigest {
    /// Create a digester. The block size is checked lazily, on the first
    /// file that actually needs hashing.
    pub fn new(mode: HashMode, block_size: u64) -> Self {
        Self {
            mode,
            block_size,
            buffer: Vec::new(),
        }
    }

    pub fn mode(&self) -> HashMode {
        self.mode
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Make the read buffer at least `min(block_size, file_len)` bytes long.
    fn ensure_buffer(&mut self, file_len: u64) -> Result<usize, ScanError> {
        let too_large = ScanError::BlockSizeTooLarge {
            block_size: self.block_size,
        };

        // A block can never exceed the largest possible allocation.
        if self.block_size > isize::MAX as u64 {
            return Err(too_large);
        }
        let wanted = self.block_size.min(file_len.max(1));
        let wanted = usize::try_from(wanted).map_err(|_| ScanError::BlockSizeTooLarge {
            block_size: self.block_size,
        })?;

        if self.buffer.len() < wanted {
            let additional = wanted - self.buffer.len();
            self.buffer
                .try_reserve_exact(additional)
                .map_err(|_| too_large)?;
            self.buffer.resize(wanted, 0);
        }
        Ok(wanted)
    }
}

impl Digester for StreamingDigest {
    fn digest(&mut self, path: &Path) -> Result<ContentDigest, ScanError> {
        let mut file = File::open(path).map_err(|e| ScanError::io(path, e))?;
        let file_len = file.metadata().map_err(|e| ScanError::io(path, e))?.len();
        let block_len = self.ensure_buffer(file_len)?;

        let mut context = DigestContext::new(self.mode);
        let block = &mut self.buffer[..block_len];
        loop {
            match file.read(block) {
                Ok(0) => break,
                Ok(n) => context.update(&block[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ScanError::io(path, e)),
            }
        }

        let digest = context.finalize();
        tracing::trace!(path = %path.display(), %digest, "digested file");
        Ok(digest)
    }
}
