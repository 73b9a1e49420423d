use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid field element: {0:?}")]
    InvalidFelt(String),

    #[error("invalid field prime: {0:?}")]
    InvalidPrime(String),
}

pub type Result<T> = std::result::Result<T, Error>;
