//! Captured output handling for one batch element.
//!
//! Owns the invocation's working directory artifacts: the full stdout/stderr
//! copies go to files, the in-memory copies are truncated to the configured
//! byte limits, and the truncated copies are offered to the uploader. File
//! and upload failures are logged, never fatal; the computed status stands.

use crate::config::{PluginConfig, OUTPUT_FILE_MODE};
use crate::plugin::gate::ExecutionGate;
use crate::upload::{OutputUploader, UploadRequest};
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use steward_common::{truncate_output, Error, ResultStatus};
use tracing::{debug, error};

/// Output of one refresh invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionOutput {
    pub exit_code: i32,
    pub status: ResultStatus,
    pub stdout: String,
    pub stderr: String,
    pub info_messages: Vec<String>,
    /// Per-request working directory (`<base>/<request id>`).
    #[serde(skip)]
    pub working_dir: PathBuf,
    /// True when no working-dir hint was given and a temp dir was created.
    #[serde(skip)]
    pub uses_temp_dir: bool,
    /// The created temp dir. Retained after the run so uploads and
    /// post-mortem debugging can read it; the host owns eventual cleanup.
    #[serde(skip)]
    pub temp_dir: Option<PathBuf>,
}

impl ExecutionOutput {
    /// Mark this invocation failed with a wrapped reason.
    pub fn mark_as_failed(&mut self, err: &Error) {
        error!(code = err.code(), category = %err.category(), "{}", err);
        self.exit_code = 1;
        self.status = ResultStatus::Failed;
        if !self.stderr.is_empty() {
            self.stderr.push('\n');
        }
        self.stderr.push_str(&err.to_string());
    }

    /// Append a human-readable informational message.
    pub fn append_info(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("{}", message);
        self.info_messages.push(message);
    }
}

impl fmt::Display for ExecutionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.info_messages {
            writeln!(f, "{}", message)?;
        }
        write!(f, "{}", self.stdout)?;
        if !self.stderr.is_empty() {
            write!(f, "\n----------ERROR-------\n{}", self.stderr)?;
        }
        Ok(())
    }
}

/// Map an exit code and the gate state to a terminal status.
///
/// Exit 0 is success regardless of a late cancel; a nonzero exit is
/// `Cancelled` when cancellation was requested, otherwise `Failed`.
pub fn status_for(exit_code: i32, gate: &dyn ExecutionGate) -> ResultStatus {
    if exit_code == 0 {
        ResultStatus::Success
    } else if gate.is_cancelled() {
        ResultStatus::Cancelled
    } else {
        ResultStatus::Failed
    }
}

/// Finalizes one invocation's output: status, files, truncation, upload.
pub struct OutputManager<'a> {
    config: &'a PluginConfig,
    uploader: &'a dyn OutputUploader,
}

impl<'a> OutputManager<'a> {
    pub fn new(config: &'a PluginConfig, uploader: &'a dyn OutputUploader) -> Self {
        Self { config, uploader }
    }

    /// Run the full output pipeline over a computed invocation output.
    pub fn finalize(
        &self,
        out: &mut ExecutionOutput,
        gate: &dyn ExecutionGate,
        request_id: &str,
        bucket: &str,
        prefix: &str,
    ) {
        out.status = status_for(out.exit_code, gate);

        // Full copies to files, best effort.
        let stdout_path = out.working_dir.join(&self.config.stdout_file_name);
        let stderr_path = out.working_dir.join(&self.config.stderr_file_name);
        debug!(stdout = %stdout_path.display(), stderr = %stderr_path.display(), "output files");
        if let Err(err) = write_output_file(&stdout_path, &out.stdout) {
            error!(path = %stdout_path.display(), %err, "failed to write stdout file");
        }
        if let Err(err) = write_output_file(&stderr_path, &out.stderr) {
            error!(path = %stderr_path.display(), %err, "failed to write stderr file");
        }

        // In-memory copies are bounded.
        out.stdout = truncate_output(
            &out.stdout,
            &self.config.output_truncated_suffix,
            self.config.max_stdout_length,
        );
        out.stderr = truncate_output(
            &out.stderr,
            &self.config.output_truncated_suffix,
            self.config.max_stderr_length,
        );

        let upload_errors = self.uploader.upload(&UploadRequest {
            request_id: request_id.to_string(),
            working_dir: out.working_dir.clone(),
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
            uses_temp_dir: out.uses_temp_dir,
            temp_dir: out.temp_dir.clone(),
            stdout: out.stdout.clone(),
            stderr: out.stderr.clone(),
        });
        if !upload_errors.is_empty() {
            error!(errors = ?upload_errors, "unable to upload captured output");
        }
    }
}

fn write_output_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(OUTPUT_FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())
}
