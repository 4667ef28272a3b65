//! Error taxonomy for the window management core.
//!
//! Two kinds of failure propagate out of engine entry points: a handle that
//! no longer (or never) resolved to a live record, and an operation the
//! state machine forbids. Both indicate a collaborator bug and terminate the
//! offending request, never the process. A policy veto is *not* an error:
//! it is surfaced as a no-op decision, so it has no variant here.

use thiserror::Error;

/// Errors surfaced by registry lookups and engine entry points.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WmError {
    /// A handle did not resolve to a live record: stale or never registered.
    #[error("no {kind} registered for handle {id}")]
    NotFound { kind: &'static str, id: u64 },

    /// The caller attempted a transition the state machine forbids.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl WmError {
    pub(crate) fn no_window(id: u64) -> Self {
        WmError::NotFound { kind: "window", id }
    }

    pub(crate) fn no_application(id: u64) -> Self {
        WmError::NotFound { kind: "application", id }
    }

    pub(crate) fn no_session(id: u64) -> Self {
        WmError::NotFound { kind: "session", id }
    }
}

pub type Result<T> = std::result::Result<T, WmError>;
