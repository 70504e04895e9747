mod json_file;

pub use json_file::JsonFileStore;

use async_trait::async_trait;

use jobwatch_common::{Result, SeenJobSet};

/// Durable record of job ids that have already been delivered.
/// Read once at the start of a cycle, written at most once at the end.
#[async_trait]
pub trait SeenJobStore: Send + Sync {
    /// Never fails: unreadable state degrades to an empty set.
    async fn load(&self) -> SeenJobSet;

    /// Replace the persisted set with `seen`.
    async fn save(&self, seen: &SeenJobSet) -> Result<()>;
}
