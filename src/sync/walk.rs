// Tree enumerator: lists every entry under a root as root-relative paths and
// partitions entry lists into round-robin chunks for concurrent consumption.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use tracing::warn;

/// Kind of a discovered entry at enumeration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One file or directory discovered under a root, identified by its
/// root-relative path. Entries are snapshots: the tree may mutate between
/// enumeration and use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub rel_path: PathBuf,
    pub kind: EntryKind,
}

/// Recursively enumerate every file and directory under `root`.
///
/// Paths are relative to `root`, in the traversal order of the walker. The
/// order is deterministic within one invocation but not guaranteed sorted;
/// callers rely on it only for chunk assignment. Symlinks are not followed
/// and special files are skipped. A missing root yields an empty list (the
/// replica may not exist yet on the first pass). Per-entry walk errors are
/// logged and skipped rather than aborting the enumeration.
pub fn list_relative(root: &Path) -> Vec<Entry> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut entries = Vec::new();
    for result in WalkDir::new(root)
        .parallelism(jwalk::Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false)
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("error walking {}: {}", root.display(), err);
                continue;
            }
        };

        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else if entry.file_type().is_file() {
            EntryKind::File
        } else {
            continue;
        };

        let rel_path = match entry.path().strip_prefix(root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            // The root itself, or an entry outside the prefix
            _ => continue,
        };

        entries.push(Entry { rel_path, kind });
    }
    entries
}

/// Partition `items` into `n` round-robin chunks: item `i` goes to chunk
/// `i mod n`. With `n == 1` the whole list comes back as a single chunk.
pub fn partition<T>(items: Vec<T>, n: usize) -> Vec<Vec<T>> {
    let n = n.max(1);
    let mut chunks: Vec<Vec<T>> = (0..n).map(|_| Vec::new()).collect();
    for (index, item) in items.into_iter().enumerate() {
        chunks[index % n].push(item);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn lists_files_and_directories_relative_to_root() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/inner")).unwrap();
        fs::write(dir.path().join("top.txt"), b"t").unwrap();
        fs::write(dir.path().join("sub/leaf.txt"), b"l").unwrap();

        let entries = list_relative(dir.path());
        let paths: BTreeSet<String> = entries
            .iter()
            .map(|e| e.rel_path.to_string_lossy().into_owned())
            .collect();

        let expected: BTreeSet<String> = ["top.txt", "sub", "sub/inner", "sub/leaf.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(paths, expected);

        let leaf = entries
            .iter()
            .find(|e| e.rel_path == Path::new("sub/leaf.txt"))
            .unwrap();
        assert_eq!(leaf.kind, EntryKind::File);
        let sub = entries
            .iter()
            .find(|e| e.rel_path == Path::new("sub"))
            .unwrap();
        assert_eq!(sub.kind, EntryKind::Directory);
    }

    #[test]
    fn missing_root_yields_empty_list() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("never-created");
        assert!(list_relative(&missing).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), b"r").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let entries = list_relative(dir.path());
        assert!(entries.iter().all(|e| e.rel_path != Path::new("link.txt")));
    }

    #[test]
    fn partition_round_robin_assignment() {
        let chunks = partition((0..10).collect(), 3);
        assert_eq!(chunks, vec![vec![0, 3, 6, 9], vec![1, 4, 7], vec![2, 5, 8]]);
    }

    #[test]
    fn partition_preserves_every_item_exactly_once() {
        for n in 1..=7 {
            let chunks = partition((0..23).collect::<Vec<i32>>(), n);
            assert_eq!(chunks.len(), n);
            let mut merged: Vec<i32> = chunks.into_iter().flatten().collect();
            merged.sort_unstable();
            assert_eq!(merged, (0..23).collect::<Vec<i32>>());
        }
    }

    #[test]
    fn partition_single_chunk_equals_input() {
        let chunks = partition(vec!["a", "b", "c"], 1);
        assert_eq!(chunks, vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn partition_more_chunks_than_items() {
        let chunks = partition(vec![1, 2], 4);
        assert_eq!(chunks, vec![vec![1], vec![2], vec![], vec![]]);
    }
}
