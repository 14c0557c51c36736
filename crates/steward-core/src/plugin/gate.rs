//! Cooperative execution gate.
//!
//! Shutdown, cancellation, and reboot signals are process concerns owned by
//! the agent host. The plugin queries them through an injected capability
//! object at defined checkpoints only (batch-element boundaries); a
//! collaborator call in flight is never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};

/// Synchronous view of the host's stop signals.
pub trait ExecutionGate {
    /// The agent is shutting down; unfinished work is reported as failed.
    fn is_shutdown_requested(&self) -> bool;

    /// The document invocation was cancelled by the operator.
    fn is_cancelled(&self) -> bool;

    /// A reboot is pending; execution stops silently without failure.
    fn is_reboot_pending(&self) -> bool;
}

/// Gate backed by atomic flags, shareable with the signal handlers that
/// flip them.
#[derive(Debug, Default)]
pub struct AtomicGate {
    shutdown: AtomicBool,
    cancelled: AtomicBool,
    reboot_pending: AtomicBool,
}

impl AtomicGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn set_reboot_pending(&self) {
        self.reboot_pending.store(true, Ordering::SeqCst);
    }
}

impl ExecutionGate for AtomicGate {
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn is_reboot_pending(&self) -> bool {
        self.reboot_pending.load(Ordering::SeqCst)
    }
}
