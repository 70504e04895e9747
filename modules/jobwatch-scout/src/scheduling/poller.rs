use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use super::cycle::JobChecker;

/// Run check cycles forever, sleeping `interval` between them, until
/// `shutdown` flips to true. Returns the number of cycles started.
///
/// Each cycle runs in its own task so a panic inside it is contained and
/// logged; the loop carries on to the next sleep.
pub async fn run_poll_loop(
    checker: Arc<JobChecker>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    info!(interval_secs = interval.as_secs(), "Starting job poll loop");
    let mut cycles = 0u64;

    loop {
        if *shutdown.borrow() {
            break;
        }

        cycles += 1;
        let cycle_checker = checker.clone();
        if let Err(e) = tokio::spawn(async move { cycle_checker.run_cycle().await }).await {
            error!(cycle = cycles, error = %e, "Unhandled error in job check cycle");
        }

        info!(
            sleep_minutes = interval.as_secs() / 60,
            "Check cycle complete. Sleeping until next run"
        );
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                // A dropped sender also means stop.
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!(cycles, "Job poll loop stopped");
    cycles
}
