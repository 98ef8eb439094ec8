//! Errors surfaced by the listing store collaborators.
//!
//! Search and filtering over fetched data never fail; everything here comes
//! from talking to the backend or reading listings from disk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Backend answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Request never completed (connect, timeout, TLS, ...)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Property not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
            || matches!(self, RepositoryError::Http { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
