//! Authorization URL for the interactive consent step
//!
//! The user opens the URL, approves access and gets a confirmation code that
//! is then exchanged for a token. PKCE (RFC 7636, S256) binds the code to
//! this process: the verifier stays local, only its challenge goes into the
//! URL.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::OAuthConfig;
use crate::error::{Error, Result};

/// Generate a random PKCE code verifier.
///
/// 64 random bytes as URL-safe base64 without padding: 86 characters,
/// inside the 43-128 range RFC 7636 allows.
pub fn generate_verifier() -> String {
    let mut bytes = [0u8; 64];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `challenge = BASE64URL(SHA256(verifier))`
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque CSRF `state` value, echoed back by the authorization server.
pub fn generate_state() -> String {
    uuid::Uuid::new_v4().as_simple().to_string()
}

/// Build the consent URL for `config`.
///
/// `scope` is only sent when scopes are configured; with none, Yandex
/// grants whatever the application was registered with.
pub fn build_authorization_url(config: &OAuthConfig, state: &str, challenge: &str) -> Result<String> {
    let mut url = Url::parse(&config.auth_url)
        .map_err(|e| Error::Config(format!("invalid auth_url {}: {e}", config.auth_url)))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.client_id);
        if !config.scopes.is_empty() {
            query.append_pair("scope", &config.scopes.join(" "));
        }
        query
            .append_pair("state", state)
            .append_pair("code_challenge", challenge)
            .append_pair("code_challenge_method", "S256");
    }

    Ok(url.into())
}
