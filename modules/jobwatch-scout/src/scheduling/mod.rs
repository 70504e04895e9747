pub mod cycle;
pub mod poller;

pub use cycle::{CycleStats, JobChecker, MESSAGE_DELAY};
pub use poller::run_poll_loop;
