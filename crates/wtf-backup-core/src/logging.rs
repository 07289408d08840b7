//! Logging capability handed to the backup orchestrators

use std::fmt;

/// Severity-leveled message sink used by [`BackupManager`](crate::BackupManager)
///
/// Diagnostics only: nothing in this crate depends on what an implementation
/// does with the messages.
pub trait Logger: Send + Sync {
    fn debug(&self, message: fmt::Arguments<'_>);

    fn info(&self, message: fmt::Arguments<'_>);

    fn warn(&self, message: fmt::Arguments<'_>);

    fn error(&self, message: fmt::Arguments<'_>);
}

/// Forwards every message to the `tracing` macros
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: fmt::Arguments<'_>) {
        tracing::debug!("{}", message);
    }

    fn info(&self, message: fmt::Arguments<'_>) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        tracing::error!("{}", message);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn debug(&self, _message: fmt::Arguments<'_>) {}

    fn info(&self, _message: fmt::Arguments<'_>) {}

    fn warn(&self, _message: fmt::Arguments<'_>) {}

    fn error(&self, _message: fmt::Arguments<'_>) {}
}
