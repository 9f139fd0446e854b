//! Error types for OAuth and token persistence

/// Errors from OAuth operations and the token file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("token load failed: {0}")]
    TokenLoad(String),

    #[error("token save failed: {0}")]
    TokenSave(String),

    #[error("invalid OAuth configuration: {0}")]
    Config(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
