//! Error types for directory operations

/// Errors from directory API calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] transport::Error),

    #[error("request body serialization failed: {0}")]
    Encode(String),
}

impl Error {
    /// HTTP status of the failed call, when the server answered.
    pub fn status(&self) -> Option<transport::StatusCode> {
        match self {
            Error::Transport(e) => e.status(),
            Error::Encode(_) => None,
        }
    }
}

/// Result alias for directory operations.
pub type Result<T> = std::result::Result<T, Error>;
