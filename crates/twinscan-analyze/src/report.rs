//! Projection of scan state into a [`ScanResult`].

use std::path::PathBuf;
use std::time::Duration;

use twinscan_core::{DuplicateGroup, FileError, HashMode, ScanResult, ScanStatus};

use crate::buckets::BucketStore;

/// Builds the final [`ScanResult`] from a finished bucket store.
///
/// Output order is deterministic: groups by descending size and then by
/// their smallest path, errors and ignored files by path.
pub struct ResultBuilder<'a> {
    store: &'a BucketStore,
    errors: Vec<FileError>,
    ignored: Vec<PathBuf>,
    total_size: u64,
    status: ScanStatus,
    hash_mode: HashMode,
    files_scanned: u64,
    scan_duration: Duration,
}

impl<'a> ResultBuilder<'a> {
    pub fn new(store: &'a BucketStore) -> Self {
        Self {
            store,
            errors: Vec::new(),
            ignored: Vec::new(),
            total_size: 0,
            status: ScanStatus::Completed,
            hash_mode: HashMode::default(),
            files_scanned: 0,
            scan_duration: Duration::ZERO,
        }
    }

    pub fn errors(mut self, errors: impl IntoIterator<Item = FileError>) -> Self {
        self.errors = errors.into_iter().collect();
        self
    }

    pub fn ignored(mut self, ignored: impl IntoIterator<Item = PathBuf>) -> Self {
        self.ignored = ignored.into_iter().collect();
        self
    }

    pub fn total_size(mut self, total_size: u64) -> Self {
        self.total_size = total_size;
        self
    }

    pub fn status(mut self, status: ScanStatus) -> Self {
        self.status = status;
        self
    }

    pub fn hash_mode(mut self, hash_mode: HashMode) -> Self {
        self.hash_mode = hash_mode;
        self
    }

    pub fn files_scanned(mut self, files_scanned: u64) -> Self {
        self.files_scanned = files_scanned;
        self
    }

    pub fn scan_duration(mut self, scan_duration: Duration) -> Self {
        self.scan_duration = scan_duration;
        self
    }

    /// Collect groups of two or more files and sort everything.
    pub fn build(self) -> ScanResult {
        let mut groups: Vec<DuplicateGroup> = self
            .store
            .digest_lists()
            .filter(|(_, _, paths)| paths.len() >= 2)
            .map(|(size, digest, paths)| DuplicateGroup::new(size, digest.clone(), paths.to_vec()))
            .collect();
        groups.sort_by(|a, b| {
            b.size
                .cmp(&a.size)
                .then_with(|| smallest_path(a).cmp(&smallest_path(b)))
        });

        let mut errors = self.errors;
        errors.sort_by(|a, b| a.path.cmp(&b.path));

        let mut ignored = self.ignored;
        ignored.sort();

        ScanResult {
            groups,
            errors,
            ignored,
            total_size: self.total_size,
            status: self.status,
            hash_mode: self.hash_mode,
            files_scanned: self.files_scanned,
            files_hashed: self.store.files_hashed(),
            scan_duration: self.scan_duration,
        }
    }
}

fn smallest_path(group: &DuplicateGroup) -> Option<&PathBuf> {
    group.paths.iter().min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::Digester;
    use std::path::Path;
    use twinscan_core::{ContentDigest, FileCandidate, FileErrorKind, ScanError};

    /// Every file name starting with the same letter has the same content.
    struct ByInitial;

    impl Digester for ByInitial {
        fn digest(&mut self, path: &Path) -> Result<ContentDigest, ScanError> {
            let name = path.file_name().unwrap().to_string_lossy();
            Ok(ContentDigest::Fast(u64::from(name.as_bytes()[0])))
        }
    }

    fn store_with(files: &[(&str, u64)]) -> BucketStore {
        let mut store = BucketStore::new();
        for (path, size) in files {
            store.insert(FileCandidate::new(*path, *size), &mut ByInitial).unwrap();
        }
        store
    }

    #[test]
    fn test_singletons_are_dropped() {
        let store = store_with(&[("/a1", 5), ("/b1", 5), ("/c1", 9)]);
        let result = ResultBuilder::new(&store).build();

        assert!(result.groups.is_empty());
        assert_eq!(result.files_hashed, 2);
    }

    #[test]
    fn test_group_order() {
        let store = store_with(&[
            ("/z/b1", 3),
            ("/z/b2", 3),
            ("/y/a1", 3),
            ("/y/a2", 3),
            ("/x/c1", 100),
            ("/x/c2", 100),
        ]);
        let result = ResultBuilder::new(&store).build();

        let firsts: Vec<_> = result.groups.iter().map(|g| g.paths[0].clone()).collect();
        assert_eq!(
            firsts,
            vec![
                PathBuf::from("/x/c1"),
                PathBuf::from("/y/a1"),
                PathBuf::from("/z/b1"),
            ]
        );
        assert_eq!(result.groups[0].wasted_bytes, 100);
        assert_eq!(result.total_wasted_space(), 106);
    }

    #[test]
    fn test_errors_and_ignored_sorted() {
        let store = BucketStore::new();
        let result = ResultBuilder::new(&store)
            .errors([
                FileError::new("/b", "denied", FileErrorKind::PermissionDenied),
                FileError::new("/a", "gone", FileErrorKind::NotFound),
            ])
            .ignored([PathBuf::from("/q"), PathBuf::from("/p")])
            .status(ScanStatus::Cancelled)
            .build();

        assert_eq!(result.errors[0].path, PathBuf::from("/a"));
        assert_eq!(result.ignored, vec![PathBuf::from("/p"), PathBuf::from("/q")]);
        assert_eq!(result.status, ScanStatus::Cancelled);
    }
}
