//! Steward Core Library
//!
//! This library implements the association refresh plugin for the Steward
//! managed-node agent:
//! - Plugin configuration loading
//! - Association data model and run-now selection
//! - Collaborator traits for the association service, cache, and scheduler
//! - The batch plugin executor with cooperative cancellation
//! - Output capture, truncation, and upload hand-off
//!
//! The binary entry point is in `main.rs`.

pub mod association;
pub mod config;
pub mod logging;
pub mod persist;
pub mod plugin;
pub mod schedule;
pub mod upload;
