//! Progress reporting capability
//!
//! The pipeline emits human-readable progress text through an injected
//! reporter instead of reading or writing any ambient global state. An
//! interactive caller wires in a channel-backed reporter; headless runs
//! use the tracing-backed one; tests use the no-op reporter. The core
//! pipeline behaves identically regardless of which is installed.

use std::sync::Arc;
use tokio::sync::mpsc;

/// Capability for emitting progress text to an interested caller
pub trait ProgressReporter: Send + Sync {
    /// Report one progress message
    fn report(&self, message: &str);
}

/// Reporter that discards every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _message: &str) {}
}

/// Reporter that forwards messages to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Reporter that forwards messages over an unbounded channel
///
/// A send failure means the receiver is gone; the run keeps going, it
/// just stops being observed.
pub struct ChannelReporter {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelReporter {
    /// Create a reporter and the receiving end for the caller
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, message: &str) {
        let _ = self.sender.send(message.to_string());
    }
}

/// Shared reporter handle passed into every component
pub type Reporter = Arc<dyn ProgressReporter>;

/// Convenience constructor for a no-op reporter handle
pub fn null_reporter() -> Reporter {
    Arc::new(NullReporter)
}
