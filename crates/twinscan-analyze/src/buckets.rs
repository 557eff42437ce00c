//! Size buckets with lazy hashing.
//!
//! Most files in a tree have a size no other file shares, and such a file
//! can never be a duplicate. A bucket therefore holds a lone file without
//! reading it, and only the second file of a size triggers hashing of both.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use twinscan_core::{ContentDigest, FileCandidate, ScanError};

use crate::digest::Digester;

/// State of one file size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bucket {
    /// Exactly one file of this size so far; not hashed.
    Pending(PathBuf),
    /// Two or more files seen; every placed file is hashed exactly once.
    /// Lists keep first-seen order.
    Hashed(HashMap<ContentDigest, Vec<PathBuf>>),
}

/// A file that was waiting alone in a pending bucket and failed its
/// deferred digest. It has been removed from the store.
#[derive(Debug)]
pub struct Evicted {
    pub path: PathBuf,
    pub error: ScanError,
}

/// Outcome of placing one candidate.
#[derive(Debug, Default)]
pub struct Insertion {
    /// Digest failure of the incoming file, which was not placed.
    pub incoming_error: Option<ScanError>,
    /// Earlier file evicted from a pending bucket.
    pub evicted: Option<Evicted>,
}

impl Insertion {
    /// Whether the incoming file is now in the store.
    pub fn is_placed(&self) -> bool {
        self.incoming_error.is_none()
    }
}

/// Map from file size to [`Bucket`].
#[derive(Debug, Default)]
pub struct BucketStore {
    buckets: HashMap<u64, Bucket>,
    files_hashed: u64,
}

impl BucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one candidate, hashing only on a size collision.
    ///
    /// Returns `Err` only for fatal digest errors, in which case no bucket
    /// is modified and no digest is counted.
    pub fn insert<D>(&mut self, candidate: FileCandidate, digester: &mut D) -> Result<Insertion, ScanError>
    where
        D: Digester + ?Sized,
    {
        let FileCandidate { path, size } = candidate;
        let mut insertion = Insertion::default();

        match self.buckets.entry(size) {
            Entry::Vacant(slot) => {
                tracing::trace!(size, path = %path.display(), "new size, deferring hash");
                slot.insert(Bucket::Pending(path));
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Bucket::Pending(prev) => {
                    // First collision for this size: hash the waiting file, then the new one.
                    let prev_digest = digest_once(digester, prev)?;
                    let digest = digest_once(digester, &path)?;
                    self.files_hashed += u64::from(prev_digest.is_ok()) + u64::from(digest.is_ok());

                    let prev = std::mem::take(prev);
                    let mut lists: HashMap<ContentDigest, Vec<PathBuf>> = HashMap::new();
                    match prev_digest {
                        Ok(d) => lists.entry(d).or_default().push(prev),
                        Err(error) => insertion.evicted = Some(Evicted { path: prev, error }),
                    }
                    match digest {
                        Ok(d) => lists.entry(d).or_default().push(path),
                        Err(error) => insertion.incoming_error = Some(error),
                    }
                    slot.insert(Bucket::Hashed(lists));
                }
                Bucket::Hashed(lists) => {
                    match digest_once(digester, &path)? {
                        Ok(d) => {
                            self.files_hashed += 1;
                            lists.entry(d).or_default().push(path);
                        }
                        Err(error) => insertion.incoming_error = Some(error),
                    }
                }
            },
        }

        Ok(insertion)
    }

    /// Number of digest computations performed.
    pub fn files_hashed(&self) -> u64 {
        self.files_hashed
    }

    /// Number of distinct sizes seen.
    pub fn distinct_sizes(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket(&self, size: u64) -> Option<&Bucket> {
        self.buckets.get(&size)
    }

    /// Iterate over every `(size, digest, paths)` list in hashed buckets,
    /// singletons included. Order is unspecified.
    pub fn digest_lists(&self) -> impl Iterator<Item = (u64, &ContentDigest, &[PathBuf])> {
        self.buckets.iter().flat_map(|(&size, bucket)| {
            let lists = match bucket {
                Bucket::Hashed(lists) => Some(lists),
                Bucket::Pending(_) => None,
            };
            lists
                .into_iter()
                .flatten()
                .map(move |(digest, paths)| (size, digest, paths.as_slice()))
        })
    }
}

/// Digest one file, splitting fatal errors (outer `Err`) from per-file
/// errors (inner `Err`).
fn digest_once<D>(digester: &mut D, path: &Path) -> Result<Result<ContentDigest, ScanError>, ScanError>
where
    D: Digester + ?Sized,
{
    match digester.digest(path) {
        Ok(digest) => Ok(Ok(digest)),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => Ok(Err(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Digests by path name prefix so tests control collisions, and
    /// remembers every path it was asked about.
    #[derive(Default)]
    struct ScriptedDigester {
        calls: Vec<PathBuf>,
        failing: HashSet<PathBuf>,
        fatal_on: HashSet<PathBuf>,
        fatal: bool,
    }

    impl Digester for ScriptedDigester {
        fn digest(&mut self, path: &Path) -> Result<ContentDigest, ScanError> {
            self.calls.push(path.to_path_buf());
            if self.fatal || self.fatal_on.contains(path) {
                return Err(ScanError::BlockSizeTooLarge { block_size: u64::MAX });
            }
            if self.failing.contains(path) {
                return Err(ScanError::PermissionDenied {
                    path: path.to_path_buf(),
                });
            }
            let name = path.file_name().unwrap().to_string_lossy();
            let content = name.split('-').next().unwrap().as_bytes()[0];
            Ok(ContentDigest::Fast(u64::from(content)))
        }
    }

    fn candidate(path: &str, size: u64) -> FileCandidate {
        FileCandidate::new(path, size)
    }

    #[test]
    fn test_unique_size_is_never_hashed() {
        let mut store = BucketStore::new();
        let mut digester = ScriptedDigester::default();

        let insertion = store.insert(candidate("/a-1", 10), &mut digester).unwrap();
        store.insert(candidate("/a-2", 20), &mut digester).unwrap();

        assert!(insertion.is_placed());
        assert!(digester.calls.is_empty());
        assert_eq!(store.bucket(10), Some(&Bucket::Pending(PathBuf::from("/a-1"))));
        assert_eq!(store.digest_lists().count(), 0);
    }

    #[test]
    fn test_second_file_hashes_both_in_order() {
        let mut store = BucketStore::new();
        let mut digester = ScriptedDigester::default();

        store.insert(candidate("/x-first", 5), &mut digester).unwrap();
        store.insert(candidate("/x-second", 5), &mut digester).unwrap();

        assert_eq!(
            digester.calls,
            vec![PathBuf::from("/x-first"), PathBuf::from("/x-second")]
        );
        let Some(Bucket::Hashed(lists)) = store.bucket(5) else {
            panic!("bucket should be hashed");
        };
        assert_eq!(
            lists[&ContentDigest::Fast(u64::from(b'x'))],
            vec![PathBuf::from("/x-first"), PathBuf::from("/x-second")]
        );
    }

    #[test]
    fn test_each_file_hashed_at_most_once() {
        let mut store = BucketStore::new();
        let mut digester = ScriptedDigester::default();

        for name in ["/a-1", "/b-2", "/a-3", "/c-4", "/a-5"] {
            store.insert(candidate(name, 7), &mut digester).unwrap();
        }

        assert_eq!(digester.calls.len(), 5);
        let unique: HashSet<_> = digester.calls.iter().collect();
        assert_eq!(unique.len(), 5);
        assert_eq!(store.files_hashed(), 5);
    }

    #[test]
    fn test_hashed_bucket_splits_by_digest() {
        let mut store = BucketStore::new();
        let mut digester = ScriptedDigester::default();

        for name in ["/a-1", "/b-2", "/a-3", "/b-4", "/c-5"] {
            store.insert(candidate(name, 3), &mut digester).unwrap();
        }

        let mut lists: Vec<Vec<PathBuf>> = store
            .digest_lists()
            .map(|(size, _, paths)| {
                assert_eq!(size, 3);
                paths.to_vec()
            })
            .collect();
        lists.sort();

        assert_eq!(
            lists,
            vec![
                vec![PathBuf::from("/a-1"), PathBuf::from("/a-3")],
                vec![PathBuf::from("/b-2"), PathBuf::from("/b-4")],
                vec![PathBuf::from("/c-5")],
            ]
        );
    }

    #[test]
    fn test_incoming_failure_is_not_placed() {
        let mut store = BucketStore::new();
        let mut digester = ScriptedDigester::default();
        digester.failing.insert(PathBuf::from("/a-2"));

        store.insert(candidate("/a-1", 9), &mut digester).unwrap();
        let insertion = store.insert(candidate("/a-2", 9), &mut digester).unwrap();

        assert!(!insertion.is_placed());
        assert!(insertion.evicted.is_none());
        let lists: Vec<_> = store.digest_lists().map(|(_, _, p)| p.to_vec()).collect();
        assert_eq!(lists, vec![vec![PathBuf::from("/a-1")]]);
        assert_eq!(store.files_hashed(), 1);
    }

    #[test]
    fn test_pending_failure_evicts_previous() {
        let mut store = BucketStore::new();
        let mut digester = ScriptedDigester::default();
        digester.failing.insert(PathBuf::from("/a-1"));

        store.insert(candidate("/a-1", 9), &mut digester).unwrap();
        let insertion = store.insert(candidate("/a-2", 9), &mut digester).unwrap();

        assert!(insertion.is_placed());
        let evicted = insertion.evicted.unwrap();
        assert_eq!(evicted.path, PathBuf::from("/a-1"));
        assert!(matches!(evicted.error, ScanError::PermissionDenied { .. }));

        // The bucket stays hashed; the next file joins the survivor.
        store.insert(candidate("/a-3", 9), &mut digester).unwrap();
        let lists: Vec<_> = store.digest_lists().map(|(_, _, p)| p.to_vec()).collect();
        assert_eq!(
            lists,
            vec![vec![PathBuf::from("/a-2"), PathBuf::from("/a-3")]]
        );
    }

    #[test]
    fn test_fatal_on_incoming_file_counts_nothing() {
        let mut store = BucketStore::new();
        let mut digester = ScriptedDigester::default();
        digester.fatal_on.insert(PathBuf::from("/a-2"));

        store.insert(candidate("/a-1", 6), &mut digester).unwrap();
        let err = store.insert(candidate("/a-2", 6), &mut digester).unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(digester.calls.len(), 2);
        assert_eq!(store.files_hashed(), 0);
        assert_eq!(store.bucket(6), Some(&Bucket::Pending(PathBuf::from("/a-1"))));
        assert_eq!(store.distinct_sizes(), 1);
    }

    #[test]
    fn test_fatal_error_leaves_store_untouched() {
        let mut store = BucketStore::new();
        let mut digester = ScriptedDigester::default();

        store.insert(candidate("/a-1", 4), &mut digester).unwrap();
        digester.fatal = true;
        let err = store.insert(candidate("/a-2", 4), &mut digester).unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(store.bucket(4), Some(&Bucket::Pending(PathBuf::from("/a-1"))));
        assert_eq!(store.files_hashed(), 0);
    }
}
