//! Plugin result persistence seam.
//!
//! The framework keeps the latest result of every plugin for the document
//! status endpoint. The executor persists exactly once per invocation, at
//! the end of the batch loop or at each early-exit point.

use std::path::PathBuf;
use std::sync::Mutex;
use steward_common::PluginResult;
use tracing::error;

/// Stores the current result for a plugin.
pub trait ResultPersister {
    fn persist(&self, plugin_id: &str, result: &PluginResult);
}

/// Persists results as JSON files under a state directory.
///
/// Write failures are logged, not surfaced; a missed persistence must not
/// change the plugin's reported status.
#[derive(Debug)]
pub struct FileResultPersister {
    state_dir: PathBuf,
}

impl FileResultPersister {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    fn result_path(&self, plugin_id: &str) -> PathBuf {
        self.state_dir.join(format!("{}_current.json", plugin_id))
    }
}

impl ResultPersister for FileResultPersister {
    fn persist(&self, plugin_id: &str, result: &PluginResult) {
        if let Err(err) = std::fs::create_dir_all(&self.state_dir) {
            error!(plugin_id, %err, "failed to create state directory");
            return;
        }
        let path = self.result_path(plugin_id);
        let payload = match serde_json::to_vec_pretty(result) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(plugin_id, %err, "failed to serialize plugin result");
                return;
            }
        };
        if let Err(err) = std::fs::write(&path, payload) {
            error!(plugin_id, path = %path.display(), %err, "failed to persist plugin result");
        }
    }
}

/// Persister double recording every call.
#[derive(Debug, Default)]
pub struct MemoryPersister {
    persisted: Mutex<Vec<(String, PluginResult)>>,
}

impl MemoryPersister {
    pub fn persisted(&self) -> Vec<(String, PluginResult)> {
        self.persisted.lock().expect("persist mutex").clone()
    }

    pub fn persist_count(&self) -> usize {
        self.persisted.lock().expect("persist mutex").len()
    }
}

impl ResultPersister for MemoryPersister {
    fn persist(&self, plugin_id: &str, result: &PluginResult) {
        self.persisted
            .lock()
            .expect("persist mutex")
            .push((plugin_id.to_string(), result.clone()));
    }
}
