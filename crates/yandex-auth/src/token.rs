//! OAuth token, code exchange and refresh
//!
//! Both operations POST a form to the configured token endpoint with
//! different grant types. The client credentials go in the form body, which
//! the Yandex OAuth server accepts alongside HTTP basic auth.

use serde::{Deserialize, Serialize};

use crate::config::OAuthConfig;
use crate::constants::TOKEN_TYPE;
use crate::error::{Error, Result};

/// Credential record persisted between runs.
///
/// `expires_at` is a unix timestamp in milliseconds (absolute, not a delta),
/// computed from `TokenResponse.expires_in` at the time the token is stored.
/// `Token::default()` is the zero value used when nothing could be loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    /// Authorization scheme, "OAuth" for the directory API
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiration as unix timestamp in milliseconds, if the server gave one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl Token {
    /// Build a token from a token endpoint response received at `now_millis`.
    pub fn from_response(response: TokenResponse, now_millis: u64) -> Self {
        Self {
            access_token: response.access_token,
            token_type: TOKEN_TYPE.to_string(),
            refresh_token: response.refresh_token,
            expires_at: response
                .expires_in
                .map(|secs| now_millis.saturating_add(secs.saturating_mul(1000))),
        }
    }

    /// Token after a refresh. The server may omit a new refresh token, in
    /// which case the current one stays valid.
    pub fn refreshed(&self, response: TokenResponse, now_millis: u64) -> Self {
        let mut next = Self::from_response(response, now_millis);
        if next.refresh_token.is_none() {
            next.refresh_token = self.refresh_token.clone();
        }
        next
    }

    /// True when the token has expired or will within `window_millis`.
    /// Tokens without a known expiry never expire.
    pub fn expires_within(&self, window_millis: u64, now_millis: u64) -> bool {
        self.expires_at
            .is_some_and(|at| at <= now_millis.saturating_add(window_millis))
    }

    /// Usable for a request right now.
    pub fn is_valid(&self, now_millis: u64) -> bool {
        !self.access_token.is_empty() && !self.expires_within(0, now_millis)
    }

    /// `Authorization` header value. Well-known schemes are canonicalised,
    /// anything else (including "OAuth") is sent as stored.
    pub fn authorization_value(&self) -> String {
        let scheme = match self.token_type.to_ascii_lowercase().as_str() {
            "" | "bearer" => "Bearer",
            "mac" => "MAC",
            "basic" => "Basic",
            _ => self.token_type.as_str(),
        };
        format!("{scheme} {}", self.access_token)
    }
}

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Current time as unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Exchange the confirmation code from the consent page for a token.
///
/// `verifier` is the PKCE verifier whose challenge went into the
/// authorization URL, if one was used.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
    verifier: Option<&str>,
) -> Result<TokenResponse> {
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.expose().as_str()),
    ];
    if let Some(verifier) = verifier {
        form.push(("code_verifier", verifier));
    }

    let response = client
        .post(&config.token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::TokenExchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
}

/// Obtain a fresh access token with a refresh token.
pub async fn refresh_token(
    client: &reqwest::Client,
    config: &OAuthConfig,
    refresh: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(&config.token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose().as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        // Revoked or unknown refresh tokens come back as 401/403 or invalid_grant
        if status.as_u16() == 401 || status.as_u16() == 403 || body.contains("invalid_grant") {
            return Err(Error::InvalidCredentials(format!(
                "refresh token rejected ({status}): {body}"
            )));
        }

        return Err(Error::TokenExchange(format!(
            "token refresh returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid refresh response: {e}")))
}
