//! JWalk-based directory walker producing file candidates.

use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use twinscan_core::{FileCandidate, ScanConfig, ScanError};

type EntryResult = Result<jwalk::DirEntry<((), ())>, jwalk::Error>;

/// Walks a directory tree and yields regular files as [`FileCandidate`]s.
///
/// Traversal is serial with siblings sorted by name, so the order is
/// deterministic for a given filesystem snapshot.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
    follow_symlinks: bool,
    include_hidden: bool,
}

impl DirectoryWalker {
    /// Create a walker for a validated configuration.
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            root: config.root().to_path_buf(),
            follow_symlinks: config.follow_symlinks(),
            include_hidden: config.include_hidden(),
        }
    }

    /// Root directory of the walk.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start walking. The returned iterator is lazy and cannot be restarted.
    ///
    /// Per-entry failures are yielded as `Err` and never end the walk.
    pub fn walk(self) -> Candidates {
        // Links are resolved by hand so that directory links are never
        // descended and broken links surface as per-file errors.
        let walker = WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(!self.include_hidden)
            .follow_links(false);

        Candidates {
            entries: Box::new(walker.into_iter()),
            follow_symlinks: self.follow_symlinks,
            root: self.root,
        }
    }
}

/// Lazy sequence of candidates produced by [`DirectoryWalker::walk`].
pub struct Candidates {
    entries: Box<dyn Iterator<Item = EntryResult>>,
    follow_symlinks: bool,
    root: PathBuf,
}

impl Candidates {
    fn classify(&self, mut entry: jwalk::DirEntry<((), ())>) -> Option<Result<FileCandidate, ScanError>> {
        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            // jwalk yields a directory it failed to list, with the failure attached.
            return entry
                .read_children_error
                .take()
                .map(|err| Err(walk_error(err, &path)));
        }

        if file_type.is_symlink() {
            if !self.follow_symlinks {
                tracing::trace!(path = %path.display(), "skipping symlink");
                return None;
            }
            return match std::fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => {
                    Some(Ok(FileCandidate::new(path, metadata.len())))
                }
                Ok(_) => {
                    tracing::trace!(path = %path.display(), "skipping link to non-file");
                    None
                }
                Err(err) => Some(Err(ScanError::io(path, err))),
            };
        }

        if !file_type.is_file() {
            return None;
        }

        Some(
            entry
                .metadata()
                .map(|metadata| FileCandidate::new(path.clone(), metadata.len()))
                .map_err(|err| walk_error(err, &path)),
        )
    }
}

impl Iterator for Candidates {
    type Item = Result<FileCandidate, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let fallback = self.root.clone();
                    return Some(Err(walk_error(err, &fallback)));
                }
            };

            if let Some(item) = self.classify(entry) {
                return Some(item);
            }
        }
    }
}

/// Convert a jwalk error into a [`ScanError`] carrying the failing path.
fn walk_error(err: jwalk::Error, fallback: &Path) -> ScanError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());
    let message = err.to_string();
    match err.into_io_error() {
        Some(source) => ScanError::io(path, source),
        None => ScanError::Walk { path, message },
    }
}
