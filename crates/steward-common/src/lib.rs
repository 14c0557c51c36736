//! Steward agent common types, IDs, and contracts.
//!
//! This crate provides foundational types shared across steward-core modules:
//! - Association and instance identity types
//! - Common error types with stable codes
//! - Plugin result contract shared with the agent framework
//! - Output truncation and timestamp helpers

pub mod contracts;
pub mod error;
pub mod id;

pub use contracts::{
    to_iso8601_utc, truncate_output, AssociationErrorCode, AssociationStatus, PluginResult,
    ResultStatus,
};
pub use error::{Error, ErrorCategory, Result};
pub use id::{AssociationId, InstanceId};
