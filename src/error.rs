//! The closed set of errors this crate's public API can return.
//!
//! Per the crate's error-handling design, most failure modes here are
//! programming errors (mismatched spaces, unknown flows) and are fatal by
//! contract — callers are expected to propagate `RankmeshError` up and abort,
//! not retry. The one genuinely recoverable condition (asking the QAP
//! remapper to act on a non-matrix topology) is modeled as `Option::None`
//! instead, not as a variant here.

use thiserror::Error;

/// Errors surfaced at the fallible boundaries of the rank-remapping core.
#[derive(Debug, Error)]
pub enum RankmeshError {
    /// A transition was requested between two partitionings of different spaces.
    #[error("transition requires both partitionings to share a space, got {from_space:?} and {to_space:?}")]
    MismatchedSpace {
        from_space: crate::space::SpaceId,
        to_space: crate::space::SpaceId,
    },

    /// A `DataFlow` value was not one the transition calculator recognizes.
    #[error("unrecognized data flow")]
    UnknownFlow,

    /// The two partitionings in a transition belong to different groups.
    #[error("transition requires both partitionings to share a group")]
    GroupMismatch,

    /// A caller passed handles or configuration that violate a documented
    /// invariant (e.g. a `Reduce` flow fed a `from` partitioning that is not
    /// the `All` partitioner).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A reordering environment variable or file was malformed.
    #[error("bad reordering configuration: {0}")]
    BadConfig(String),

    /// `CommMatrix::sync` was requested but the backend does not support it.
    #[error("backend does not support matrix sync")]
    BackendUnavailable,
}
