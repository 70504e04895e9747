use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use jobwatch_common::{JobWatchError, Result, SeenJobSet};

use super::SeenJobStore;

/// Seen-set persisted as a pretty-printed JSON array of strings.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "seen_jobs.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SeenJobStore for JsonFileStore {
    async fn load(&self) -> SeenJobSet {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No seen-jobs file yet, starting empty");
                return SeenJobSet::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read seen-jobs file. Starting fresh");
                return SeenJobSet::new();
            }
        };

        match serde_json::from_slice::<Vec<String>>(&raw) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Seen-jobs file is corrupt. Starting fresh");
                SeenJobSet::new()
            }
        }
    }

    async fn save(&self, seen: &SeenJobSet) -> Result<()> {
        let ids: Vec<&String> = seen.iter().collect();
        let json = serde_json::to_vec_pretty(&ids)
            .map_err(|e| JobWatchError::Persistence(format!("encode failed: {e}")))?;

        // Write beside the target then rename, so a crash never leaves a half-written file.
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json).await.map_err(|e| {
            JobWatchError::Persistence(format!("write {} failed: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            JobWatchError::Persistence(format!("rename to {} failed: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), ids = seen.len(), "Saved seen-jobs file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_sits_beside_target() {
        let store = JsonFileStore::new("/var/lib/jobwatch/seen_jobs.json");
        assert_eq!(
            store.temp_path(),
            PathBuf::from("/var/lib/jobwatch/seen_jobs.json.tmp")
        );
    }
}
