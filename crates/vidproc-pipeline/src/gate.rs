//! Frame delivery gate
//!
//! The one piece of state the capture thread reads without going through
//! the event queue. The coordinator opens it on the transition into
//! `Rendering` and closes it as the first step of stopping a renderer, before
//! the stop command is issued.
//!
//! Writes use `Release` and reads use `Acquire`, so a capture thread that
//! observes the gate closed also observes everything the coordinator did
//! before closing it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared on/off switch for frame forwarding
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct FrameDeliveryGate {
    open: Arc<AtomicBool>,
}

impl FrameDeliveryGate {
    /// Create a closed gate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit forwarding
    pub(crate) fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    /// Forbid forwarding
    pub(crate) fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    /// Whether frames may be forwarded to the renderer
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}
