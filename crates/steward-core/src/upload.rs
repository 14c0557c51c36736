//! Output upload seam.
//!
//! After truncation, the captured output is offered to an uploader bound to
//! a bucket/prefix. Uploads are best-effort: errors come back as
//! descriptions and are logged by the caller, never failing the request.

use std::path::PathBuf;
use std::sync::Mutex;

/// Everything the uploader needs to place one invocation's output.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub request_id: String,
    pub working_dir: PathBuf,
    pub bucket: String,
    pub prefix: String,
    pub uses_temp_dir: bool,
    pub temp_dir: Option<PathBuf>,
    /// Truncated stdout copy.
    pub stdout: String,
    /// Truncated stderr copy.
    pub stderr: String,
}

/// Remote sink for captured output.
pub trait OutputUploader {
    /// Upload the captured output. Returns a description per failed item;
    /// an empty list means success.
    fn upload(&self, request: &UploadRequest) -> Vec<String>;
}

/// Uploader for deployments without an output bucket.
#[derive(Debug, Default)]
pub struct NoopUploader;

impl OutputUploader for NoopUploader {
    fn upload(&self, _request: &UploadRequest) -> Vec<String> {
        Vec::new()
    }
}

/// Uploader double recording requests, optionally failing every upload.
#[derive(Debug, Default)]
pub struct RecordingUploader {
    requests: Mutex<Vec<UploadRequest>>,
    errors: Vec<String>,
}

impl RecordingUploader {
    /// Make every upload report these errors.
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.lock().expect("upload mutex").clone()
    }
}

impl OutputUploader for RecordingUploader {
    fn upload(&self, request: &UploadRequest) -> Vec<String> {
        self.requests
            .lock()
            .expect("upload mutex")
            .push(request.clone());
        self.errors.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request() -> UploadRequest {
        UploadRequest {
            request_id: "refresh-1".into(),
            working_dir: PathBuf::from("/tmp/work/refresh-1"),
            bucket: "agent-output".into(),
            prefix: "node/i-1234".into(),
            uses_temp_dir: false,
            temp_dir: None,
            stdout: "ok".into(),
            stderr: String::new(),
        }
    }

    #[test]
    fn noop_uploader_always_succeeds() {
        assert!(NoopUploader.upload(&make_request()).is_empty());
    }

    #[test]
    fn recording_uploader_captures_request() {
        let uploader = RecordingUploader::default();
        uploader.upload(&make_request());
        let seen = uploader.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].bucket, "agent-output");
    }

    #[test]
    fn recording_uploader_reports_injected_errors() {
        let uploader = RecordingUploader::default().with_errors(vec!["access denied".into()]);
        let errors = uploader.upload(&make_request());
        assert_eq!(errors, vec!["access denied".to_string()]);
    }
}
