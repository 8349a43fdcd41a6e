use std::fmt;

use thiserror::Error;

/// Identifies the operation in which an error was raised.
pub type Op = &'static str;

/// The classification of a `MovieError`, for callers that map errors
/// onto their own boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// A business rule or required field was violated.
    Validation,

    /// Preparing, executing or reading the storage call failed.
    Database,

    /// The store reported a uniqueness violation.
    Exist,

    /// The actor could not be resolved or something unexpected happened.
    Internal,

    /// The call was cancelled or its deadline expired.
    Cancelled,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Validation => "validation",
            Kind::Database => "database",
            Kind::Exist => "exist",
            Kind::Internal => "internal",
            Kind::Cancelled => "cancelled",
        };

        f.write_str(s)
    }
}

/// Why a call was interrupted before the store answered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Interruption {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interruption::Cancelled => f.write_str("cancelled"),
            Interruption::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// A single failed business check on a movie.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("{param}: {message}")]
pub struct ValidationError {
    pub op: Op,

    /// The name of the offending field.
    pub param: &'static str,

    pub message: String,
}

impl ValidationError {
    pub fn new(op: Op, param: &'static str, message: impl Into<String>) -> Self {
        ValidationError {
            op,
            param,
            message: message.into(),
        }
    }

    pub fn missing_field(op: Op, param: &'static str) -> Self {
        Self::new(op, param, format!("missing field: {}", param))
    }
}

/// Enumerates errors returned by the storage port.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents a unique constraint violation.
    #[error("Record already exists (constraint {constraint:?})")]
    AlreadyExists {
        constraint: Option<String>,
        source: sqlx::Error,
    },

    /// Represents a stored routine that returned no timestamps.
    #[error("Stored routine returned no timestamps")]
    MissingTimestamps,

    /// Represents use of a transaction that was already committed or
    /// rolled back.
    #[error("Transaction already closed")]
    TransactionClosed,

    /// Represents a rollback that was abandoned after waiting too long.
    #[error("Rollback did not finish in time")]
    RollbackTimedOut,
}

/// Enumerates the classified errors returned by movie operations.
#[derive(Debug, Error)]
pub enum MovieError {
    #[error("{op}: invalid movie: {source}")]
    Validation { op: Op, source: ValidationError },

    #[error("{op}: database error")]
    Database { op: Op, source: StoreError },

    #[error("{op}: movie already exists")]
    Exist { op: Op, source: StoreError },

    #[error("{op}: {message}")]
    Internal {
        op: Op,
        message: String,
        #[source]
        source: Option<StoreError>,
    },

    #[error("{op}: {reason}")]
    Cancelled { op: Op, reason: Interruption },

    /// The rollback that followed `original` failed as well.
    #[error("{op}: rollback failed after: {original}")]
    RollbackFailed {
        op: Op,
        source: StoreError,
        original: Box<MovieError>,
    },
}

impl MovieError {
    pub fn kind(&self) -> Kind {
        match self {
            MovieError::Validation { .. } => Kind::Validation,
            MovieError::Database { .. } => Kind::Database,
            MovieError::Exist { .. } => Kind::Exist,
            MovieError::Internal { .. } => Kind::Internal,
            MovieError::Cancelled { .. } => Kind::Cancelled,
            MovieError::RollbackFailed { .. } => Kind::Database,
        }
    }

    pub fn op(&self) -> Op {
        match self {
            MovieError::Validation { op, .. }
            | MovieError::Database { op, .. }
            | MovieError::Exist { op, .. }
            | MovieError::Internal { op, .. }
            | MovieError::Cancelled { op, .. }
            | MovieError::RollbackFailed { op, .. } => *op,
        }
    }

    /// Returns the name of the offending field, if any.
    pub fn param(&self) -> Option<&'static str> {
        match self {
            MovieError::Validation { source, .. } => Some(source.param),
            MovieError::RollbackFailed { original, .. } => original.param(),
            _ => None,
        }
    }

    /// Returns the error that preceded a failed rollback.
    pub fn original(&self) -> Option<&MovieError> {
        match self {
            MovieError::RollbackFailed { original, .. } => Some(original),
            _ => None,
        }
    }

    /// Classifies a storage failure raised while persisting.
    pub(crate) fn from_store(op: Op, source: StoreError) -> Self {
        match source {
            StoreError::AlreadyExists { .. } => MovieError::Exist { op, source },
            _ => MovieError::Database { op, source },
        }
    }
}
