//! Error types

use thiserror::Error;

/// Errors reported by the binding table and mapper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MapperError {
    /// An action name was used that was never registered.
    #[error("unknown action {0:?}")]
    UnknownAction(String),

    /// An action was registered twice.
    #[error("action {0:?} is already registered")]
    DuplicateAction(String),

    /// A rebind capture was started while another is active.
    #[error("a rebind capture is already in progress for {0:?}")]
    CaptureInProgress(String),

    /// A capture operation was used with no capture in progress.
    #[error("no rebind capture is in progress")]
    NoCapture,

    /// Conflict resolution was requested with no conflict pending.
    #[error("no binding conflict is awaiting resolution")]
    NoConflict,

    /// A profile name was not present in the profile set.
    #[error("unknown profile {0:?}")]
    UnknownProfile(String),
}
