// Library module for replisync
// Re-exports modules for use in integration tests and the binary

pub mod cli;
pub mod logging;
pub mod scheduler;
pub mod sync;
