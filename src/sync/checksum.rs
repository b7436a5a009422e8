// Checksum service: streamed MD5 content digests.
// Two files are considered content-equal iff their digests are bit-equal.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::{Digest as Md5Digest, Md5};

use super::error::{SyncError, SyncResult};

/// Block size for streaming checksum reads
pub const CHECKSUM_BLOCK_SIZE: usize = 4096;

/// Fixed-length content fingerprint of a file's full byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digest([u8; 16]);

impl Digest {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the digest of a file by feeding fixed-size blocks into a
/// cumulative hash state.
///
/// Returns `SyncError::NotFound` if the path disappeared before or during
/// the read, `SyncError::Io` for any other read failure.
pub fn checksum(path: &Path) -> SyncResult<Digest> {
    let mut file =
        File::open(path).map_err(|err| SyncError::from_io(err, "opening for checksum", path))?;

    let mut hasher = Md5::new();
    let mut block = [0u8; CHECKSUM_BLOCK_SIZE];
    loop {
        let read = file
            .read(&mut block)
            .map_err(|err| SyncError::from_io(err, "reading for checksum", path))?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }

    Ok(Digest(hasher.finalize().into()))
}
