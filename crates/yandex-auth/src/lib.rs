//! Yandex OAuth for the directory client
//!
//! Covers everything between "no credentials" and "signed request":
//!
//! 1. `authorize::build_authorization_url()` produces the consent URL
//! 2. `token::exchange_code()` trades the confirmation code for a token
//! 3. `TokenStore::save()` keeps it for the next run, `TokenStore::load()`
//!    reads it back
//! 4. `AuthorizedClient` injects the token into directory requests and
//!    refreshes it through `token::refresh_token()` when it runs out
//!
//! The interactive part of consent (showing the URL, reading the code) is
//! left to the binary.

pub mod authorize;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod token;
pub mod token_store;

pub use authorize::{build_authorization_url, compute_challenge, generate_state, generate_verifier};
pub use client::AuthorizedClient;
pub use config::OAuthConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use token::{Token, TokenResponse, exchange_code, now_millis, refresh_token};
pub use token_store::TokenStore;
