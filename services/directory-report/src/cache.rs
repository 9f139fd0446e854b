//! Last rendered report, shared between the refresh task and HTTP handlers

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::RwLock;

/// Body served before the first refresh completes.
pub const PLACEHOLDER: &str = "Report is being prepared, try again shortly\n";

#[derive(Debug, Clone)]
struct Snapshot {
    body: String,
    updated_at: Option<SystemTime>,
    last_error: Option<String>,
}

/// Cloneable handle to the cached report.
///
/// A failed refresh records its error but keeps serving the previous body.
#[derive(Debug, Clone)]
pub struct ReportCache {
    inner: Arc<RwLock<Snapshot>>,
}

/// Point-in-time view for `/health`.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatus {
    pub ready: bool,
    pub updated_at: Option<SystemTime>,
    pub last_error: Option<String>,
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot {
                body: PLACEHOLDER.to_string(),
                updated_at: None,
                last_error: None,
            })),
        }
    }

    pub async fn body(&self) -> String {
        self.inner.read().await.body.clone()
    }

    pub async fn store(&self, body: String) {
        let mut snapshot = self.inner.write().await;
        snapshot.body = body;
        snapshot.updated_at = Some(SystemTime::now());
        snapshot.last_error = None;
    }

    pub async fn record_failure(&self, error: String) {
        self.inner.write().await.last_error = Some(error);
    }

    pub async fn status(&self) -> CacheStatus {
        let snapshot = self.inner.read().await;
        CacheStatus {
            ready: snapshot.updated_at.is_some(),
            updated_at: snapshot.updated_at,
            last_error: snapshot.last_error.clone(),
        }
    }
}
