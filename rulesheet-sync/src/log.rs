//! Injected progress log
//!
//! The engine narrates what it does through a [`SyncLog`]. The default is
//! [`NullLog`], which discards everything; [`TracingLog`] forwards to
//! `tracing`.

/// Log sink accepted by the engine
pub trait SyncLog: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
}

/// Discards all messages
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl SyncLog for NullLog {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
}

/// Forwards messages to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl SyncLog for TracingLog {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "rulesheet_sync", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "rulesheet_sync", "{message}");
    }
}
