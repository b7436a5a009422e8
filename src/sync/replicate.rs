// File replicator: streams a source file into the replica, skipping the
// copy entirely when digests already match.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use tempfile::Builder;

use super::checksum::checksum;
use super::error::{SyncError, SyncResult};

/// Block size for streaming file copies
pub const COPY_BLOCK_SIZE: usize = 1024 * 1024;

/// What `replicate_file` did for one source/replica pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicateOutcome {
    /// Replica file was missing and has been created
    Copied,
    /// Replica file existed with a different digest and has been overwritten
    Replaced,
    /// Digests matched, nothing written
    Unchanged,
}

/// Stream `src` into `dest` in fixed-size blocks.
///
/// The bytes land in a temporary file next to `dest` and are renamed onto it
/// once the stream is exhausted, so the replica never observes a
/// half-written file. Parent directories are created if missing; a file may
/// be assigned to a different chunk than its parent directory.
pub fn copy_file(src: &Path, dest: &Path) -> SyncResult<()> {
    let mut reader =
        File::open(src).map_err(|err| SyncError::from_io(err, "opening source file", src))?;

    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .map_err(|err| SyncError::from_io(err, "creating parent directory", parent))?;

    let mut staged = Builder::new()
        .prefix(".replisync-")
        .tempfile_in(parent)
        .map_err(|err| SyncError::from_io(err, "staging temporary file in", parent))?;

    let mut block = vec![0u8; COPY_BLOCK_SIZE];
    loop {
        let read = reader
            .read(&mut block)
            .map_err(|err| SyncError::from_io(err, "reading source file", src))?;
        if read == 0 {
            break;
        }
        staged
            .write_all(&block[..read])
            .map_err(|err| SyncError::from_io(err, "writing replica file", dest))?;
    }
    staged
        .flush()
        .map_err(|err| SyncError::from_io(err, "flushing replica file", dest))?;

    staged
        .persist(dest)
        .map_err(|err| SyncError::from_io(err.error, "renaming temporary file onto", dest))?;

    Ok(())
}

/// Converge one replica file onto its source counterpart.
///
/// A missing replica is copied unconditionally; an existing one is copied
/// only when the digests of both sides differ. Checksum and copy failures
/// propagate to the caller, which records them without retrying within the
/// pass.
pub fn replicate_file(src: &Path, dest: &Path) -> SyncResult<ReplicateOutcome> {
    if !dest.exists() {
        copy_file(src, dest)?;
        return Ok(ReplicateOutcome::Copied);
    }

    if checksum(src)? != checksum(dest)? {
        copy_file(src, dest)?;
        return Ok(ReplicateOutcome::Replaced);
    }

    Ok(ReplicateOutcome::Unchanged)
}
