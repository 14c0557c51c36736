//! Error types for the Steward agent.
//!
//! Structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//!
//! Plugin-level failures never abort the host process; they surface through
//! the plugin result's `Status`/`ExitCode`/`Output` fields. These types carry
//! the wrapped failure reason up to that boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Steward operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Plugin input decoding errors.
    Input,
    /// Working-directory and file I/O errors.
    Workspace,
    /// Node identity resolution errors.
    Identity,
    /// Association service errors (listing, detail loading).
    Service,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Workspace => write!(f, "workspace"),
            ErrorCategory::Identity => write!(f, "identity"),
            ErrorCategory::Service => write!(f, "service"),
        }
    }
}

/// Unified error type for the Steward agent.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("invalid format in plugin properties: {0}")]
    InvalidInput(String),

    // Workspace errors (20-29)
    #[error("failed to create working directory {path}: {message}")]
    WorkspaceCreation { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Identity errors (30-39)
    #[error("failed to resolve instance identity: {0}")]
    IdentityResolution(String),

    // Service errors (40-49)
    #[error("association service error: {0}")]
    Service(String),

    #[error("failed to list instance associations: {0}")]
    ListAssociations(String),

    #[error("encountered error while loading association {association_id} contents: {message}")]
    LoadAssociation {
        association_id: String,
        message: String,
    },
}

impl Error {
    /// Returns the stable error code for this error type.
    ///
    /// Codes are grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Workspace errors
    /// - 30-39: Identity errors
    /// - 40-49: Service errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidInput(_) => 10,
            Error::WorkspaceCreation { .. } => 20,
            Error::Io(_) => 21,
            Error::Json(_) => 22,
            Error::IdentityResolution(_) => 30,
            Error::Service(_) => 40,
            Error::ListAssociations(_) => 41,
            Error::LoadAssociation { .. } => 42,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidInput(_) => ErrorCategory::Input,
            Error::WorkspaceCreation { .. } | Error::Io(_) | Error::Json(_) => {
                ErrorCategory::Workspace
            }
            Error::IdentityResolution(_) => ErrorCategory::Identity,
            Error::Service(_)
            | Error::ListAssociations(_)
            | Error::LoadAssociation { .. } => ErrorCategory::Service,
        }
    }

    /// Returns whether this error is potentially recoverable by a retry of
    /// the whole refresh request.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // A malformed document stays malformed.
            Error::InvalidInput(_) => false,
            Error::WorkspaceCreation { .. } => true,
            Error::Io(_) => true,
            Error::Json(_) => false,
            Error::IdentityResolution(_) => true,
            Error::Service(_) => true,
            Error::ListAssociations(_) => true,
            Error::LoadAssociation { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(Error::InvalidInput("bad".into()).code(), 10);
        assert_eq!(
            Error::WorkspaceCreation {
                path: "/tmp/x".into(),
                message: "denied".into()
            }
            .code(),
            20
        );
        assert_eq!(Error::IdentityResolution("no metadata".into()).code(), 30);
        assert_eq!(
            Error::LoadAssociation {
                association_id: "a1".into(),
                message: "timeout".into()
            }
            .code(),
            42
        );
        assert_eq!(Error::Service("timeout".into()).code(), 40);
    }

    #[test]
    fn categories_group_variants() {
        assert_eq!(
            Error::ListAssociations("down".into()).category(),
            ErrorCategory::Service
        );
        assert_eq!(
            Error::Io(std::io::Error::other("disk full")).category(),
            ErrorCategory::Workspace
        );
        assert_eq!(
            Error::InvalidInput("x".into()).category(),
            ErrorCategory::Input
        );
    }

    #[test]
    fn recoverability_hints() {
        assert!(!Error::InvalidInput("x".into()).is_recoverable());
        assert!(Error::ListAssociations("x".into()).is_recoverable());
        assert!(Error::IdentityResolution("x".into()).is_recoverable());
        assert!(!Error::Json(serde_json::from_str::<i64>("nope").unwrap_err()).is_recoverable());
    }

    #[test]
    fn load_association_message_names_the_association() {
        let err = Error::LoadAssociation {
            association_id: "assoc-7".into(),
            message: "content not found".into(),
        };
        let text = err.to_string();
        assert!(text.contains("assoc-7"));
        assert!(text.contains("content not found"));
    }
}
