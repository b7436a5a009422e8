//! Synchronization engine: tree diffing, checksum-based change detection,
//! chunked concurrent execution, and orphan pruning.

pub mod checksum;
pub mod engine;
pub mod error;
pub mod pathlock;
pub mod replicate;
pub mod walk;

pub use checksum::{checksum, Digest};
pub use engine::{PassStats, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use pathlock::PathLocks;
pub use replicate::{copy_file, replicate_file, ReplicateOutcome};
pub use walk::{list_relative, partition, Entry, EntryKind};
