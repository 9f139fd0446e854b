//! Generic request/response transport for the directory API
//!
//! Every directory call goes through one primitive, [`execute`]: build the
//! URL from a base and encoded [`Parameters`], attach a header set, send it
//! through an injected [`HttpTransport`], check the status and hand back the
//! body. [`get`], [`post`], [`patch`] and [`delete`] are fixed-parameter
//! specializations of that primitive.
//!
//! Authentication is not handled here. The caller supplies the client; an
//! OAuth-aware client injects `Authorization` and refreshes tokens on its
//! own, so this crate never sees a credential.

pub mod error;
pub mod params;
pub mod request;

pub use error::{Error, Result};
pub use params::Parameters;
pub use reqwest::StatusCode;
pub use request::{
    ApiRequest, HeaderSet, delete, execute, execute_json, get, patch, post,
};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The HTTP client seam used by [`execute`].
///
/// Implementations send one fully built request and return the response
/// untouched. They must not interpret the status code. Transport failures
/// (connect, DNS, timeout) are reported as [`Error::Transport`].
///
/// Uses `Pin<Box<dyn Future>>` return types so the trait stays dyn-compatible
/// (`Arc<dyn HttpTransport>`).
pub trait HttpTransport: Send + Sync {
    fn send(
        &self,
        request: reqwest::Request,
    ) -> Pin<Box<dyn Future<Output = Result<reqwest::Response>> + Send + '_>>;
}

impl HttpTransport for reqwest::Client {
    fn send(
        &self,
        request: reqwest::Request,
    ) -> Pin<Box<dyn Future<Output = Result<reqwest::Response>> + Send + '_>> {
        Box::pin(async move { self.execute(request).await.map_err(Error::from_reqwest) })
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn send(
        &self,
        request: reqwest::Request,
    ) -> Pin<Box<dyn Future<Output = Result<reqwest::Response>> + Send + '_>> {
        (**self).send(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn send(
        &self,
        request: reqwest::Request,
    ) -> Pin<Box<dyn Future<Output = Result<reqwest::Response>> + Send + '_>> {
        (**self).send(request)
    }
}
