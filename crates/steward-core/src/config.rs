//! Plugin configuration.
//!
//! Resolution order follows the agent convention: environment overrides on
//! top of built-in defaults. The host process may also construct a
//! [`PluginConfig`] directly when it carries its own configuration store.

use serde::{Deserialize, Serialize};

/// Default cap on the in-memory stdout copy, in bytes.
pub const DEFAULT_MAX_STDOUT_LENGTH: usize = 24_000;

/// Default cap on the in-memory stderr copy, in bytes.
pub const DEFAULT_MAX_STDERR_LENGTH: usize = 8_000;

/// Marker appended to truncated output.
pub const DEFAULT_OUTPUT_TRUNCATED_SUFFIX: &str = "--output truncated--";

/// File the full stdout capture is written to inside the working directory.
pub const DEFAULT_STDOUT_FILE_NAME: &str = "stdout";

/// File the full stderr capture is written to inside the working directory.
pub const DEFAULT_STDERR_FILE_NAME: &str = "stderr";

/// Owner read/write; output files may carry command payloads.
pub const OUTPUT_FILE_MODE: u32 = 0o600;

/// Per-plugin output handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Maximum bytes of stdout kept in memory (files keep the full copy).
    pub max_stdout_length: usize,
    /// Maximum bytes of stderr kept in memory.
    pub max_stderr_length: usize,
    /// File name for the stdout capture.
    pub stdout_file_name: String,
    /// File name for the stderr capture.
    pub stderr_file_name: String,
    /// Suffix appended when in-memory output is truncated.
    pub output_truncated_suffix: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            max_stdout_length: DEFAULT_MAX_STDOUT_LENGTH,
            max_stderr_length: DEFAULT_MAX_STDERR_LENGTH,
            stdout_file_name: DEFAULT_STDOUT_FILE_NAME.to_string(),
            stderr_file_name: DEFAULT_STDERR_FILE_NAME.to_string(),
            output_truncated_suffix: DEFAULT_OUTPUT_TRUNCATED_SUFFIX.to_string(),
        }
    }
}

impl PluginConfig {
    /// Build a config from defaults with environment overrides applied.
    ///
    /// Recognized variables: `STEWARD_MAX_STDOUT`, `STEWARD_MAX_STDERR`,
    /// `STEWARD_STDOUT_FILE`, `STEWARD_STDERR_FILE`,
    /// `STEWARD_TRUNCATED_SUFFIX`. Unparsable numeric values fall back to
    /// the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(max) = env_usize("STEWARD_MAX_STDOUT") {
            config.max_stdout_length = max;
        }
        if let Some(max) = env_usize("STEWARD_MAX_STDERR") {
            config.max_stderr_length = max;
        }
        if let Ok(name) = std::env::var("STEWARD_STDOUT_FILE") {
            if !name.is_empty() {
                config.stdout_file_name = name;
            }
        }
        if let Ok(name) = std::env::var("STEWARD_STDERR_FILE") {
            if !name.is_empty() {
                config.stderr_file_name = name;
            }
        }
        if let Ok(suffix) = std::env::var("STEWARD_TRUNCATED_SUFFIX") {
            config.output_truncated_suffix = suffix;
        }
        config
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok()?.parse().ok()
}
