//! Request-level operations on top of the search engine.

use thiserror::Error;

pub mod search;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller supplied a value the core cannot work with.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The search engine could not be reached.
    #[error("Search engine unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
