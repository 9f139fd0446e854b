//! Service-specific error types

use thiserror::Error;

/// Report tool errors. `main` wraps these in `anyhow` with context.
#[derive(Error, Debug)]
pub enum Error {
    #[error("consent failed: {0}")]
    Consent(String),

    #[error(transparent)]
    Auth(#[from] yandex_auth::Error),

    #[error("{what}: {source}")]
    Fetch {
        what: &'static str,
        source: directory::Error,
    },

    #[error("report rendering failed: {0}")]
    Render(#[from] std::fmt::Error),

    #[error(transparent)]
    Config(#[from] common::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn fetch(what: &'static str) -> impl FnOnce(directory::Error) -> Self {
        move |source| Error::Fetch { what, source }
    }
}

/// Result alias using service Error
pub type Result<T> = std::result::Result<T, Error>;
