//! Error conversion glue between the layers.
//!
//! The domain and repository layers do not know about service errors; the
//! mapping onto caller-facing categories lives here.

use crate::domain::types::TypeConstraintError;
use crate::pagination::PaginationError;
use crate::repository::errors::RepositoryError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::InvalidInput(val.to_string())
    }
}

impl From<PaginationError> for ServiceError {
    fn from(val: PaginationError) -> Self {
        ServiceError::InvalidInput(val.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::ConnectionError(message) => ServiceError::Unavailable(message),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
