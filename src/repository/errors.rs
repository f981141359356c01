use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Search engine error: {0}")]
    EngineError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::DeserializationError(err.to_string())
    }
}

#[cfg(feature = "server")]
impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            RepositoryError::ConnectionError(format!("Search engine unreachable: {err}"))
        } else if err.is_decode() {
            RepositoryError::DeserializationError(err.to_string())
        } else if let Some(status) = err.status() {
            RepositoryError::EngineError(format!("{status}: {err}"))
        } else {
            RepositoryError::Unexpected(format!("Unexpected HTTP error: {err}"))
        }
    }
}
