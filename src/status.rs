//! Status reporting
//!
//! A single human-readable status plus a severity category, overwritten on
//! every state change. There is no history; the presentation layer reads
//! whatever is current.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Severity category of the current status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Neutral information ("ready", "no text detected")
    Info,
    /// A long-running operation is underway
    Progress,
    /// An operation completed successfully
    Success,
    /// An operation failed
    Error,
}

/// The current (message, severity) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusState {
    pub message: String,
    pub severity: Severity,
}

impl Default for StatusState {
    fn default() -> Self {
        Self {
            message: String::new(),
            severity: Severity::Info,
        }
    }
}

/// Cheaply cloneable handle to the single current status.
///
/// Every component writes through this; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    inner: Arc<RwLock<StatusState>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the current status
    pub fn set(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match severity {
            Severity::Info | Severity::Success => info!("{}", message),
            Severity::Progress => debug!("{}", message),
            Severity::Error => error!("{}", message),
        }
        *self.inner.write() = StatusState { message, severity };
    }

    /// Read the current status
    pub fn current(&self) -> StatusState {
        self.inner.read().clone()
    }
}

/// Free-text output field the recognition dispatcher writes into.
///
/// Kept separate from the status display: recognition writes it exactly once
/// per successful or empty-result attempt and leaves it untouched on failure.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    inner: Arc<RwLock<String>>,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.inner.write() = text.into();
    }

    pub fn get(&self) -> String {
        self.inner.read().clone()
    }
}
