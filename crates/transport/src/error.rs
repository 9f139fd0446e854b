//! Error taxonomy for directory API calls

use reqwest::StatusCode;

/// Errors from a single directory API call.
///
/// None of these are retried. The caller decides what to do next.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be built (bad URL, bad header). Nothing was sent.
    #[error("invalid request: {0}")]
    Request(String),

    /// Connection, DNS, timeout or body read failure from the HTTP client.
    #[error("transport error: {0}")]
    Transport(String),

    /// The client holds no usable credentials: the token expired with no way
    /// to refresh it, or the authorization server rejected the refresh.
    /// Fresh consent is needed.
    #[error("credentials rejected: {0}")]
    Credentials(String),

    /// HTTP 403. `challenge` is the `WWW-Authenticate` value, verbatim.
    #[error("{status} {challenge}")]
    Authorization {
        status: StatusCode,
        challenge: String,
    },

    /// The server answered with a status other than the one the call expects.
    #[error("{status}")]
    StatusMismatch {
        status: StatusCode,
        expected: StatusCode,
    },

    /// The body did not decode into the destination type.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl Error {
    /// Classify a client-side failure from `reqwest`.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Transport(format!("request timed out: {err}"))
        } else if err.is_builder() {
            Error::Request(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }

    /// HTTP status the server returned, for status-carrying variants.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Authorization { status, .. } | Error::StatusMismatch { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;
