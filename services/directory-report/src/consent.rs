//! Token bootstrap
//!
//! Reuses the token file when it can be read. Otherwise walks the user
//! through the consent page: prints the authorization URL, reads the
//! confirmation code from the terminal, exchanges it and saves the result.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};
use yandex_auth::{OAuthConfig, Token, TokenStore};

use crate::error::{Error, Result};

/// Return a usable token, running interactive consent if none is stored.
pub async fn obtain_token<R, W>(
    http: &reqwest::Client,
    oauth: &OAuthConfig,
    store: &TokenStore,
    input: &mut R,
    output: &mut W,
) -> Result<Token>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match store.load().await {
        Ok(token) => return Ok(token),
        Err(e) => info!(error = %e, "no usable stored token, starting consent"),
    }

    if oauth.client_id.is_empty() {
        return Err(common::Error::Missing("CLIENT_ID").into());
    }
    if oauth.client_secret.is_blank() {
        return Err(common::Error::Missing("CLIENT_SECRET").into());
    }

    let verifier = yandex_auth::generate_verifier();
    let challenge = yandex_auth::compute_challenge(&verifier);
    let state = yandex_auth::generate_state();
    let url = yandex_auth::build_authorization_url(oauth, &state, &challenge)?;

    write!(output, "Visit the URL for the auth dialog:\n{url}\nAnd enter code: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).await?;
    let code = line.trim();
    if code.is_empty() {
        return Err(Error::Consent("no confirmation code entered".into()));
    }

    let response = yandex_auth::exchange_code(http, oauth, code, Some(&verifier)).await?;
    let token = Token::from_response(response, yandex_auth::now_millis());

    if let Err(e) = store.save(&token).await {
        // The token is still good for this run
        warn!(path = %store.path().display(), error = %e, "failed to save token");
    } else {
        info!(path = %store.path().display(), "token saved");
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use common::Secret;
    use std::sync::{Arc, Mutex};

    /// Token endpoint stub recording the submitted form.
    async fn start_token_server(forms: Arc<Mutex<Vec<String>>>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route(
            "/token",
            post(move |body: String| {
                let forms = forms.clone();
                async move {
                    forms.lock().unwrap().push(body);
                    r#"{"access_token":"at_new","token_type":"bearer","refresh_token":"rt_new","expires_in":31536000}"#
                }
            }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn oauth(base: &str, id: &str, secret: &str) -> OAuthConfig {
        OAuthConfig::new(id, Secret::new(secret.into()), vec![])
            .with_endpoints(format!("{base}/authorize"), format!("{base}/token"))
    }

    #[tokio::test]
    async fn stored_token_skips_consent() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(".token"));
        let stored = Token {
            access_token: "at_stored".into(),
            token_type: "OAuth".into(),
            ..Token::default()
        };
        store.save(&stored).await.unwrap();

        let mut input: &[u8] = b"";
        let mut output = Vec::new();
        let token = obtain_token(
            &reqwest::Client::new(),
            &oauth("http://127.0.0.1:1", "", ""),
            &store,
            &mut input,
            &mut output,
        )
        .await
        .unwrap();

        assert_eq!(token, stored);
        assert!(output.is_empty(), "must not prompt when a token is stored");
    }

    #[tokio::test]
    async fn consent_exchanges_code_and_saves_token() {
        let forms = Arc::new(Mutex::new(Vec::new()));
        let base = start_token_server(forms.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(".token"));

        let mut input: &[u8] = b"4815162342\n";
        let mut output = Vec::new();
        let token = obtain_token(
            &reqwest::Client::new(),
            &oauth(&base, "cid", "cs"),
            &store,
            &mut input,
            &mut output,
        )
        .await
        .unwrap();

        assert_eq!(token.access_token, "at_new");
        assert_eq!(token.token_type, "OAuth");
        assert_eq!(token.refresh_token.as_deref(), Some("rt_new"));
        assert_eq!(store.load().await.unwrap(), token);

        let prompt = String::from_utf8(output).unwrap();
        assert!(prompt.contains(&format!("{base}/authorize?")), "got {prompt}");
        assert!(prompt.contains("client_id=cid"), "got {prompt}");
        assert!(prompt.ends_with("And enter code: "), "got {prompt}");

        let forms = forms.lock().unwrap();
        assert!(forms[0].contains("grant_type=authorization_code"));
        assert!(forms[0].contains("code=4815162342"));
        assert!(forms[0].contains("code_verifier="));
    }

    #[tokio::test]
    async fn missing_client_id_fails_before_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(".token"));

        let mut input: &[u8] = b"code\n";
        let mut output = Vec::new();
        let err = obtain_token(
            &reqwest::Client::new(),
            &oauth("http://127.0.0.1:1", "", "cs"),
            &store,
            &mut input,
            &mut output,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Config(common::Error::Missing("CLIENT_ID"))), "got {err:?}");
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn missing_client_secret_fails_before_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(".token"));

        let mut input: &[u8] = b"code\n";
        let mut output = Vec::new();
        let err = obtain_token(
            &reqwest::Client::new(),
            &oauth("http://127.0.0.1:1", "cid", "  "),
            &store,
            &mut input,
            &mut output,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Config(common::Error::Missing("CLIENT_SECRET"))), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_code_aborts_consent() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(".token"));

        let mut input: &[u8] = b"\n";
        let mut output = Vec::new();
        let err = obtain_token(
            &reqwest::Client::new(),
            &oauth("http://127.0.0.1:1", "cid", "cs"),
            &store,
            &mut input,
            &mut output,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Consent(_)), "got {err:?}");
        assert!(tokio::fs::metadata(store.path()).await.is_err());
    }
}
