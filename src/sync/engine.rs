// Sync planner/executor: drives one propagate-then-prune pass over the
// source and replica trees, sequentially or across a worker pool.

use std::fmt;
use std::fs;
use std::io;
use std::ops::Add;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use super::error::{SyncError, SyncResult};
use super::pathlock::PathLocks;
use super::replicate::{self, ReplicateOutcome};
use super::walk::{self, Entry, EntryKind};

/// Counters for one synchronization pass, summed across chunks
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    pub dirs_created: usize,
    pub files_copied: usize,
    pub files_replaced: usize,
    pub files_unchanged: usize,
    pub entries_pruned: usize,
    pub failures: usize,
}

impl PassStats {
    /// True when the pass performed no create, copy, replace, or delete
    pub fn is_noop(&self) -> bool {
        self.dirs_created == 0
            && self.files_copied == 0
            && self.files_replaced == 0
            && self.entries_pruned == 0
    }
}

impl Add for PassStats {
    type Output = PassStats;

    fn add(self, other: PassStats) -> PassStats {
        PassStats {
            dirs_created: self.dirs_created + other.dirs_created,
            files_copied: self.files_copied + other.files_copied,
            files_replaced: self.files_replaced + other.files_replaced,
            files_unchanged: self.files_unchanged + other.files_unchanged,
            entries_pruned: self.entries_pruned + other.entries_pruned,
            failures: self.failures + other.failures,
        }
    }
}

impl fmt::Display for PassStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dirs created, {} files copied, {} replaced, {} unchanged, {} pruned, {} failures",
            self.dirs_created,
            self.files_copied,
            self.files_replaced,
            self.files_unchanged,
            self.entries_pruned,
            self.failures
        )
    }
}

enum Propagated {
    DirCreated,
    DirUnchanged,
    File(ReplicateOutcome),
}

enum Pruned {
    Removed,
    Kept,
    AlreadyAbsent,
}

/// One-way synchronization engine between a fixed source and replica root.
///
/// Each pass enumerates both trees from scratch, partitions the entry lists
/// into one chunk per worker, and runs exactly one propagate phase followed
/// by exactly one prune phase. Errors are contained at entry granularity.
pub struct SyncEngine {
    source: PathBuf,
    replica: PathBuf,
    workers: usize,
    pool: Option<rayon::ThreadPool>,
    locks: PathLocks,
}

impl SyncEngine {
    /// Create an engine sized to the host's available parallelism
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>) -> SyncResult<Self> {
        Self::with_workers(source, replica, num_cpus::get())
    }

    /// Create an engine with an explicit worker count (minimum 1).
    ///
    /// A single worker runs the sequential code path; more than one worker
    /// builds a dedicated thread pool of that size. Both paths produce the
    /// same final replica state.
    pub fn with_workers(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        workers: usize,
    ) -> SyncResult<Self> {
        let workers = workers.max(1);
        let pool = if workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|err| SyncError::Unexpected {
                    message: format!("failed to build worker pool: {err}"),
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            source: source.into(),
            replica: replica.into(),
            workers,
            pool,
            locks: PathLocks::new(),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run one full synchronization pass: propagate, then prune.
    ///
    /// After a pass with no concurrent external mutation, every source file
    /// exists in the replica with an equal digest and every replica entry
    /// has a source counterpart.
    pub fn run_pass(&self) -> SyncResult<PassStats> {
        fs::create_dir_all(&self.replica)
            .map_err(|err| SyncError::from_io(err, "creating replica root", &self.replica))?;

        let source_entries = walk::list_relative(&self.source);
        let replica_entries = walk::list_relative(&self.replica);
        debug!(
            "pass started: {} source entries, {} replica entries, {} workers",
            source_entries.len(),
            replica_entries.len(),
            self.workers
        );

        let source_chunks = walk::partition(source_entries, self.workers);
        let replica_chunks = walk::partition(replica_entries, self.workers);

        let stats = match &self.pool {
            Some(pool) => {
                // Full barrier between the phases: a prune worker must not
                // delete a directory a propagate worker is still populating.
                let propagated = pool.install(|| {
                    source_chunks
                        .par_iter()
                        .map(|chunk| self.propagate_chunk(chunk))
                        .reduce(PassStats::default, Add::add)
                });
                let pruned = pool.install(|| {
                    replica_chunks
                        .par_iter()
                        .map(|chunk| self.prune_chunk(chunk))
                        .reduce(PassStats::default, Add::add)
                });
                propagated + pruned
            }
            None => {
                let propagated = source_chunks
                    .iter()
                    .map(|chunk| self.propagate_chunk(chunk))
                    .fold(PassStats::default(), Add::add);
                let pruned = replica_chunks
                    .iter()
                    .map(|chunk| self.prune_chunk(chunk))
                    .fold(PassStats::default(), Add::add);
                propagated + pruned
            }
        };

        debug!("pass finished: {stats}");
        Ok(stats)
    }

    /// Propagate phase over one chunk of source entries. Failures are
    /// logged and counted; they never abort the rest of the chunk.
    fn propagate_chunk(&self, chunk: &[Entry]) -> PassStats {
        let mut stats = PassStats::default();
        for entry in chunk {
            match self.propagate_entry(entry) {
                Ok(Propagated::DirCreated) => stats.dirs_created += 1,
                Ok(Propagated::DirUnchanged) => {}
                Ok(Propagated::File(ReplicateOutcome::Copied)) => stats.files_copied += 1,
                Ok(Propagated::File(ReplicateOutcome::Replaced)) => stats.files_replaced += 1,
                Ok(Propagated::File(ReplicateOutcome::Unchanged)) => stats.files_unchanged += 1,
                Err(err) if err.is_not_found() => {
                    stats.failures += 1;
                    warn!(
                        "source entry vanished during pass: {}",
                        entry.rel_path.display()
                    );
                }
                Err(err) => {
                    stats.failures += 1;
                    error!("failed to propagate {}: {}", entry.rel_path.display(), err);
                }
            }
        }
        stats
    }

    fn propagate_entry(&self, entry: &Entry) -> SyncResult<Propagated> {
        let src = self.source.join(&entry.rel_path);
        let dest = self.replica.join(&entry.rel_path);

        match entry.kind {
            EntryKind::Directory => {
                if dest.is_dir() {
                    return Ok(Propagated::DirUnchanged);
                }
                // Racing workers may create shared ancestors concurrently;
                // create_dir_all is idempotent, so no lock is needed here.
                fs::create_dir_all(&dest)
                    .map_err(|err| SyncError::from_io(err, "creating directory", &dest))?;
                info!("created directory {}", dest.display());
                Ok(Propagated::DirCreated)
            }
            EntryKind::File => {
                if !src.is_file() {
                    return Err(SyncError::NotFound { path: src });
                }
                let _guard = self.locks.acquire(&dest);
                let outcome = replicate::replicate_file(&src, &dest)?;
                match outcome {
                    ReplicateOutcome::Copied => {
                        info!("copied {} to {}", src.display(), dest.display());
                    }
                    ReplicateOutcome::Replaced => {
                        info!("replaced {} with {}", dest.display(), src.display());
                    }
                    ReplicateOutcome::Unchanged => {}
                }
                Ok(Propagated::File(outcome))
            }
        }
    }

    /// Prune phase over one chunk of replica entries
    fn prune_chunk(&self, chunk: &[Entry]) -> PassStats {
        let mut stats = PassStats::default();
        for entry in chunk {
            match self.prune_entry(entry) {
                Ok(Pruned::Removed) => stats.entries_pruned += 1,
                Ok(Pruned::Kept) | Ok(Pruned::AlreadyAbsent) => {}
                Err(err) => {
                    stats.failures += 1;
                    error!("failed to prune {}: {}", entry.rel_path.display(), err);
                }
            }
        }
        stats
    }

    fn prune_entry(&self, entry: &Entry) -> SyncResult<Pruned> {
        let counterpart = self.source.join(&entry.rel_path);
        if counterpart.exists() {
            return Ok(Pruned::Kept);
        }

        let target = self.replica.join(&entry.rel_path);
        let _guard = self.locks.acquire(&target);
        if delete_path(&target)? {
            info!("deleted {}", target.display());
            Ok(Pruned::Removed)
        } else {
            // A racing worker or an earlier recursive delete got here first.
            warn!("replica entry already removed: {}", target.display());
            Ok(Pruned::AlreadyAbsent)
        }
    }
}

/// Delete a file or a directory with all its descendants.
///
/// Returns false when the target was already gone; deletion is idempotent.
fn delete_path(path: &Path) -> SyncResult<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(SyncError::from_io(err, "inspecting", path)),
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match removed {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(SyncError::from_io(err, "deleting", path)),
    }
}
