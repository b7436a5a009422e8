// Pass scheduler: re-invokes the engine at a fixed wall-clock interval until
// the shutdown flag is raised. A failed pass is logged and the loop
// continues; availability of future passes wins over halting on one failure.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::sync::SyncEngine;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Run synchronization passes forever, sleeping `interval` between them.
///
/// Raising `shutdown` (the interrupt handler does this) lets an in-progress
/// pass finish and then ends the loop cleanly.
pub fn run(engine: &SyncEngine, interval: Duration, shutdown: &AtomicBool) {
    info!(
        "starting synchronization loop (interval: {}s, workers: {})",
        interval.as_secs(),
        engine.workers()
    );

    while !shutdown.load(Ordering::Relaxed) {
        match panic::catch_unwind(AssertUnwindSafe(|| engine.run_pass())) {
            Ok(Ok(stats)) => info!("synchronization pass completed: {stats}"),
            Ok(Err(err)) => error!("synchronization pass failed: {err}"),
            Err(_) => error!("synchronization pass panicked; continuing with next interval"),
        }
        sleep_until_deadline(interval, shutdown);
    }

    info!("interrupted, exiting");
}

/// Sleep for `interval`, waking early when the shutdown flag is raised
fn sleep_until_deadline(interval: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while !shutdown.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(SHUTDOWN_POLL));
    }
}
