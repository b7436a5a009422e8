// Keyed mutex set over destination paths.
// The invariant is "no two operations write the same destination path
// concurrently", so workers hold a lock per exact path instead of one
// process-wide lock, and unrelated paths proceed in parallel.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};

#[derive(Debug, Default)]
pub struct PathLocks {
    held: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

/// RAII guard returned by [`PathLocks::acquire`]; releases the path on drop
pub struct PathGuard<'a> {
    locks: &'a PathLocks,
    path: PathBuf,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `path` is not held by any other worker, then hold it
    pub fn acquire(&self, path: &Path) -> PathGuard<'_> {
        let mut held = self.held.lock().unwrap();
        while held.contains(path) {
            held = self.released.wait(held).unwrap();
        }
        held.insert(path.to_path_buf());
        PathGuard {
            locks: self,
            path: path.to_path_buf(),
        }
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.locks.held.lock().unwrap();
        held.remove(&self.path);
        drop(held);
        self.locks.released.notify_all();
    }
}
