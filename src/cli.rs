// Command-line interface definition

use std::path::PathBuf;

use clap::Parser;

/// Periodically mirror a source folder into a replica folder, using content
/// checksums to skip files that have not changed.
#[derive(Debug, Parser)]
#[command(name = "replisync", version)]
pub struct Args {
    /// Folder to mirror from
    pub source_folder: PathBuf,

    /// Folder to mirror into
    pub replica_folder: PathBuf,

    /// Seconds to wait between synchronization passes
    pub sync_interval: u64,

    /// File that receives a copy of the log stream
    pub log_file: PathBuf,
}
