//! HTTP client that signs directory requests with the OAuth token
//!
//! Plugs into the transport layer as an `HttpTransport`. Before each request
//! it checks the token, refreshes it inline when it is about to expire and
//! writes the refreshed token back to the token file, so the transport never
//! deals with credentials.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use transport::HttpTransport;

use crate::config::OAuthConfig;
use crate::error::Error;
use crate::token::{Token, now_millis, refresh_token};
use crate::token_store::TokenStore;

/// Refresh when the token expires within this many milliseconds.
const REFRESH_THRESHOLD_MILLIS: u64 = 60_000;

/// `reqwest::Client` plus the token it authorizes requests with.
///
/// The token sits behind a Mutex so concurrent requests sharing one client
/// refresh at most once.
pub struct AuthorizedClient {
    http: reqwest::Client,
    config: OAuthConfig,
    token: Mutex<Token>,
    store: Option<TokenStore>,
}

impl AuthorizedClient {
    pub fn new(http: reqwest::Client, config: OAuthConfig, token: Token) -> Self {
        Self {
            http,
            config,
            token: Mutex::new(token),
            store: None,
        }
    }

    /// Persist refreshed tokens to `store`.
    pub fn with_store(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Snapshot of the current token.
    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }

    /// Header value for the next request, refreshing first if needed.
    async fn authorization(&self) -> transport::Result<HeaderValue> {
        let mut token = self.token.lock().await;
        let now = now_millis();

        if token.expires_within(REFRESH_THRESHOLD_MILLIS, now) {
            match token.refresh_token.clone() {
                Some(refresh) => {
                    debug!("token expiring soon, refreshing inline");
                    let response = refresh_token(&self.http, &self.config, &refresh)
                        .await
                        .map_err(|e| match e {
                            Error::InvalidCredentials(msg) => transport::Error::Credentials(msg),
                            other => transport::Error::Transport(format!("token refresh: {other}")),
                        })?;
                    *token = token.refreshed(response, now);
                    info!("token refresh succeeded");

                    if let Some(store) = &self.store {
                        if let Err(e) = store.save(&token).await {
                            warn!(path = %store.path().display(), error = %e, "failed to persist refreshed token");
                        }
                    }
                }
                None if !token.is_valid(now) => {
                    return Err(transport::Error::Credentials(
                        "token expired and no refresh token is set".into(),
                    ));
                }
                None => {}
            }
        }

        HeaderValue::from_str(&token.authorization_value())
            .map_err(|e| transport::Error::Request(format!("invalid token value: {e}")))
    }
}

impl HttpTransport for AuthorizedClient {
    fn send(
        &self,
        mut request: reqwest::Request,
    ) -> Pin<Box<dyn Future<Output = transport::Result<reqwest::Response>> + Send + '_>> {
        Box::pin(async move {
            let mut value = self.authorization().await?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
            self.http
                .execute(request)
                .await
                .map_err(transport::Error::from_reqwest)
        })
    }
}
