//! Request descriptor and the single executor behind every API call

use std::collections::HashMap;

use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue, WWW_AUTHENTICATE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::HttpTransport;
use crate::error::{Error, Result};
use crate::params::Parameters;

/// Header name to value, attached verbatim to the outgoing request.
pub type HeaderSet = HashMap<String, String>;

/// One directory API call: built, executed once, discarded.
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    method: Method,
    base_url: String,
    params: Option<&'a Parameters>,
    headers: HeaderSet,
    expected_status: StatusCode,
    body: Option<Vec<u8>>,
}

impl<'a> ApiRequest<'a> {
    pub fn new(method: Method, base_url: impl Into<String>, expected_status: StatusCode) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            params: None,
            headers: HeaderSet::new(),
            expected_status,
            body: None,
        }
    }

    /// Read: no body, expects 200.
    pub fn get(base_url: impl Into<String>) -> Self {
        Self::new(Method::GET, base_url, StatusCode::OK)
    }

    /// Create: body, expects 201.
    pub fn post(base_url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::POST, base_url, StatusCode::CREATED).body(body)
    }

    /// Update: body, expects 200.
    pub fn patch(base_url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::PATCH, base_url, StatusCode::OK).body(body)
    }

    /// Remove: no body, expects 200.
    pub fn delete(base_url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, base_url, StatusCode::OK)
    }

    pub fn params(mut self, params: impl Into<Option<&'a Parameters>>) -> Self {
        self.params = params.into();
        self
    }

    pub fn headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn expected_status(&self) -> StatusCode {
        self.expected_status
    }

    /// Base URL with the encoded query appended.
    pub fn url(&self) -> String {
        match self.params {
            Some(params) => format!("{}{}", self.base_url, params.encode()),
            None => self.base_url.clone(),
        }
    }

    fn build(self) -> Result<reqwest::Request> {
        let raw_url = self.url();
        let url = Url::parse(&raw_url)
            .map_err(|e| Error::Request(format!("invalid url {raw_url}: {e}")))?;

        let mut request = reqwest::Request::new(self.method, url);
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Request(format!("invalid header name {name:?}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::Request(format!("invalid value for header {name}: {e}")))?;
            request.headers_mut().append(header_name, header_value);
        }
        if let Some(body) = self.body {
            *request.body_mut() = Some(body.into());
        }
        Ok(request)
    }
}

/// Send one request and validate the response status.
///
/// On the expected status the whole body is read and returned. A 403 is
/// reported as [`Error::Authorization`] before any status comparison, any
/// other unexpected status as [`Error::StatusMismatch`]. The response is
/// dropped (and its connection released) on every path.
pub async fn execute<C>(client: &C, request: ApiRequest<'_>) -> Result<Bytes>
where
    C: HttpTransport + ?Sized,
{
    let expected = request.expected_status;
    let outgoing = request.build()?;
    let method = outgoing.method().clone();
    let url = outgoing.url().clone();

    debug!(%method, %url, "sending directory request");
    let response = client.send(outgoing).await?;

    let status = response.status();
    debug!(%method, %url, %status, "received directory response");

    if status == StatusCode::FORBIDDEN {
        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();
        return Err(Error::Authorization { status, challenge });
    }

    if status != expected {
        return Err(Error::StatusMismatch { status, expected });
    }

    response
        .bytes()
        .await
        .map_err(|e| Error::Transport(format!("reading response body: {e}")))
}

/// [`execute`], then decode the body as JSON into `T`.
pub async fn execute_json<C, T>(client: &C, request: ApiRequest<'_>) -> Result<T>
where
    C: HttpTransport + ?Sized,
    T: DeserializeOwned,
{
    let body = execute(client, request).await?;
    serde_json::from_slice(&body).map_err(|e| Error::Decode(e.to_string()))
}

pub async fn get<C, T>(
    client: &C,
    url: &str,
    params: Option<&Parameters>,
    headers: HeaderSet,
) -> Result<T>
where
    C: HttpTransport + ?Sized,
    T: DeserializeOwned,
{
    execute_json(client, ApiRequest::get(url).params(params).headers(headers)).await
}

pub async fn post<C, T>(
    client: &C,
    url: &str,
    params: Option<&Parameters>,
    headers: HeaderSet,
    body: Vec<u8>,
) -> Result<T>
where
    C: HttpTransport + ?Sized,
    T: DeserializeOwned,
{
    execute_json(
        client,
        ApiRequest::post(url, body).params(params).headers(headers),
    )
    .await
}

pub async fn patch<C, T>(
    client: &C,
    url: &str,
    params: Option<&Parameters>,
    headers: HeaderSet,
    body: Vec<u8>,
) -> Result<T>
where
    C: HttpTransport + ?Sized,
    T: DeserializeOwned,
{
    execute_json(
        client,
        ApiRequest::patch(url, body).params(params).headers(headers),
    )
    .await
}

/// DELETE ignores whatever body the server sends back.
pub async fn delete<C>(
    client: &C,
    url: &str,
    params: Option<&Parameters>,
    headers: HeaderSet,
) -> Result<()>
where
    C: HttpTransport + ?Sized,
{
    execute(client, ApiRequest::delete(url).params(params).headers(headers))
        .await
        .map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde::Deserialize;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::task::Poll;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Department {
        id: u64,
        name: String,
    }

    /// What the in-memory transport saw.
    #[derive(Debug, Clone)]
    struct Sent {
        method: Method,
        url: String,
        headers: reqwest::header::HeaderMap,
        body: Option<Vec<u8>>,
    }

    /// In-memory transport: records each request and answers from a factory.
    struct StaticTransport {
        respond: Box<dyn Fn() -> reqwest::Response + Send + Sync>,
        sent: Mutex<Vec<Sent>>,
    }

    impl StaticTransport {
        fn new(respond: impl Fn() -> reqwest::Response + Send + Sync + 'static) -> Self {
            Self {
                respond: Box::new(respond),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl HttpTransport for StaticTransport {
        fn send(
            &self,
            request: reqwest::Request,
        ) -> Pin<Box<dyn Future<Output = Result<reqwest::Response>> + Send + '_>> {
            self.sent.lock().unwrap().push(Sent {
                method: request.method().clone(),
                url: request.url().to_string(),
                headers: request.headers().clone(),
                body: request.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec),
            });
            Box::pin(async move { Ok((self.respond)()) })
        }
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &'static str) -> reqwest::Response {
        let mut builder = http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        reqwest::Response::from(builder.body(reqwest::Body::from(body)).unwrap())
    }

    #[tokio::test]
    async fn forbidden_reports_www_authenticate_challenge() {
        let transport = StaticTransport::new(|| {
            response(403, &[("WWW-Authenticate", r#"Bearer realm="x""#)], "{}")
        });

        let err = execute(&transport, ApiRequest::get("https://api.example.test/users/"))
            .await
            .unwrap_err();

        match &err {
            Error::Authorization { status, challenge } => {
                assert_eq!(*status, StatusCode::FORBIDDEN);
                assert_eq!(challenge, r#"Bearer realm="x""#);
            }
            other => panic!("expected Authorization, got {other:?}"),
        }
        assert!(err.to_string().contains(r#"Bearer realm="x""#), "got: {err}");
    }

    #[tokio::test]
    async fn forbidden_wins_over_status_check_even_when_expected() {
        // 403 is classified before the expected-status comparison
        let transport = StaticTransport::new(|| response(403, &[], ""));
        let request = ApiRequest::new(
            Method::GET,
            "https://api.example.test/",
            StatusCode::FORBIDDEN,
        );

        let err = execute(&transport, request).await.unwrap_err();
        assert!(matches!(err, Error::Authorization { ref challenge, .. } if challenge.is_empty()));
    }

    #[tokio::test]
    async fn unexpected_status_is_mismatch_without_decoding() {
        let transport = StaticTransport::new(|| response(404, &[], "definitely not json"));

        let err = get::<_, Department>(&transport, "https://api.example.test/departments/1/", None, HeaderSet::new())
            .await
            .unwrap_err();

        match err {
            Error::StatusMismatch { status, expected } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(expected, StatusCode::OK);
            }
            other => panic!("expected StatusMismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_expects_created() {
        let transport = StaticTransport::new(|| response(200, &[], r#"{"id":1,"name":"x"}"#));

        let err = post::<_, Department>(
            &transport,
            "https://api.example.test/departments/",
            None,
            HeaderSet::new(),
            br#"{"name":"x"}"#.to_vec(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::StatusMismatch { expected, .. } if expected == StatusCode::CREATED));
    }

    #[tokio::test]
    async fn malformed_json_is_decode_error_and_body_is_drained() {
        let drained = Arc::new(AtomicBool::new(false));
        let flag = drained.clone();
        let transport = StaticTransport::new(move || {
            let flag = flag.clone();
            let chunks = futures_util::stream::iter(vec![Ok::<_, std::io::Error>(
                bytes::Bytes::from_static(br#"{"id": 42, "name": "#),
            )]);
            let end = futures_util::stream::poll_fn(move |_| {
                flag.store(true, Ordering::SeqCst);
                Poll::<Option<std::result::Result<bytes::Bytes, std::io::Error>>>::Ready(None)
            });
            let body = reqwest::Body::wrap_stream(chunks.chain(end));
            reqwest::Response::from(http::Response::builder().status(200).body(body).unwrap())
        });

        let err = get::<_, Department>(&transport, "https://api.example.test/departments/42/", None, HeaderSet::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode(_)), "got {err:?}");
        assert!(drained.load(Ordering::SeqCst), "body stream must be read to its end");
    }

    #[tokio::test]
    async fn attaches_headers_query_and_body() {
        let transport = StaticTransport::new(|| response(200, &[], r#"{"id":7,"name":"Ops"}"#));
        let params = Parameters::fields(["id", "name"]);
        let headers = HeaderSet::from([
            ("X-Org-ID".to_string(), "7".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]);

        let department: Department = patch(
            &transport,
            "https://api.example.test/departments/7/",
            Some(&params),
            headers,
            br#"{"name":"Ops"}"#.to_vec(),
        )
        .await
        .unwrap();
        assert_eq!(department, Department { id: 7, name: "Ops".into() });

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::PATCH);
        assert_eq!(
            sent[0].url,
            "https://api.example.test/departments/7/?fields=id,name"
        );
        assert_eq!(sent[0].headers.get("x-org-id").unwrap(), "7");
        assert_eq!(sent[0].headers.get("content-type").unwrap(), "application/json");
        assert!(sent[0].headers.get("authorization").is_none());
        assert_eq!(sent[0].body.as_deref(), Some(&br#"{"name":"Ops"}"#[..]));
    }

    #[tokio::test]
    async fn delete_ignores_response_body() {
        let transport = StaticTransport::new(|| response(200, &[], "not json at all"));

        delete(&transport, "https://api.example.test/departments/3/", None, HeaderSet::new())
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].method, Method::DELETE);
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn invalid_header_is_rejected_before_sending() {
        let transport = StaticTransport::new(|| response(200, &[], "{}"));
        let headers = HeaderSet::from([("bad header".to_string(), "v".to_string())]);

        let err = execute(
            &transport,
            ApiRequest::get("https://api.example.test/").headers(headers),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Request(_)), "got {err:?}");
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_sending() {
        let transport = StaticTransport::new(|| response(200, &[], "{}"));
        let err = execute(&transport, ApiRequest::get("not a url")).await.unwrap_err();
        assert!(matches!(err, Error::Request(_)), "got {err:?}");
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn call_shapes_fix_method_and_status() {
        assert_eq!(*ApiRequest::get("u").method(), Method::GET);
        assert_eq!(ApiRequest::get("u").expected_status(), StatusCode::OK);
        assert_eq!(ApiRequest::post("u", vec![]).expected_status(), StatusCode::CREATED);
        assert_eq!(*ApiRequest::patch("u", vec![]).method(), Method::PATCH);
        assert_eq!(ApiRequest::patch("u", vec![]).expected_status(), StatusCode::OK);
        assert_eq!(*ApiRequest::delete("u").method(), Method::DELETE);
        assert_eq!(ApiRequest::delete("u").expected_status(), StatusCode::OK);
    }

    #[test]
    fn url_without_params_is_base() {
        let params = Parameters::new();
        assert_eq!(ApiRequest::get("https://h/x/").url(), "https://h/x/");
        assert_eq!(ApiRequest::get("https://h/x/").params(&params).url(), "https://h/x/");
    }

    /// Start a local upstream that echoes method, path, query and org header.
    async fn start_echo_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let app = axum::Router::new().fallback(
                |request: axum::http::Request<axum::body::Body>| async move {
                    let body = serde_json::json!({
                        "method": request.method().to_string(),
                        "path": request.uri().path(),
                        "query": request.uri().query().unwrap_or(""),
                        "org": request
                            .headers()
                            .get("x-org-id")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or(""),
                    });
                    (axum::http::StatusCode::OK, body.to_string())
                },
            );
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn reqwest_client_round_trip_against_local_server() {
        let base = start_echo_server().await;
        let client = reqwest::Client::new();
        let params = Parameters::new().with("per_page", ["3"]);
        let headers = HeaderSet::from([("X-Org-ID".to_string(), "5".to_string())]);

        let echoed: serde_json::Value = get(&client, &format!("{base}/users/"), Some(&params), headers)
            .await
            .unwrap();

        assert_eq!(echoed["method"], "GET");
        assert_eq!(echoed["path"], "/users/");
        assert_eq!(echoed["query"], "per_page=3");
        assert_eq!(echoed["org"], "5");
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::Client::new();
        let err = execute(&client, ApiRequest::get(format!("http://{addr}/users/")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }
}
