//! Value-level constraint errors raised while building domain values.

use thiserror::Error;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Course type name is not one of the known variants.
    #[error("unknown course type: {0}")]
    UnknownCourseType(String),
    /// Timestamp could not be parsed.
    #[error("invalid date-time: {0}")]
    InvalidDateTime(String),
}
