//! Shared error and result types.

use thiserror::Error;

/// Errors surfaced by floorpulse operations.
///
/// Expected domain outcomes (an unregistered target chip, a duplicate tap)
/// are not errors; they are normal return values of the reconciler. These
/// variants cover genuine faults: bad input, rows in the wrong state, and
/// infrastructure failures.
#[derive(Debug, Error)]
pub enum FloorError {
    /// Request is missing a parameter or carries a malformed value
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Scanner and target chip are the same physical chip
    #[error("scanner and target chip are identical")]
    SelfTap,

    /// No interaction row with this id exists
    #[error("unknown interaction row: {0}")]
    UnknownRow(u64),

    /// Row exists but is not in a state that permits the operation
    #[error("row {0} is already {1}")]
    RowState(u64, &'static str),

    /// Registration conflict (chip already bound, alias or email taken)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Feedback template could not be loaded or parsed
    #[error("feedback template: {0}")]
    Template(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for floorpulse operations
pub type Result<T> = std::result::Result<T, FloorError>;
