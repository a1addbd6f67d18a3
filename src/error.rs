use thiserror::Error;

use crate::model::UserId;

/// Errors returned by the clustering, prediction and evaluation routines in this crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// The user pool has fewer distinct users than the requested cluster count.
    #[error("insufficient users: requested {requested} clusters, but pool has {available} users")]
    InsufficientUsers {
        /// Requested number of clusters.
        requested: usize,
        /// Number of distinct users in the pool.
        available: usize,
    },

    /// The same user id appears more than once in a clustering pool.
    #[error("duplicate user {0} in pool")]
    DuplicateUser(UserId),

    /// A user expected in a clustering result is missing from it.
    #[error("user {0} is not a member of any cluster")]
    UnknownUser(UserId),

    /// Items in a catalog have inconsistent attribute arity.
    #[error("dimension mismatch in {kind} attributes: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Attribute type whose columns disagree.
        kind: &'static str,
        /// Expected number of columns.
        expected: usize,
        /// Found number of columns.
        found: usize,
    },

    /// Ranking score is undefined because the reference has no gain to normalize by.
    #[error("undefined score: reference ranking has zero ideal gain")]
    UndefinedScore,
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
