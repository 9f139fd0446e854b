//! Web mode: serve the cached report and refresh it in the background

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use directory::{Directory, HttpTransport};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::cache::ReportCache;
use crate::report;

/// How long in-flight requests get to finish after a shutdown signal.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: ReportCache,
    pub prometheus: PrometheusHandle,
    pub started_at: Instant,
}

/// Build the axum router. `max_connections` caps concurrent requests.
pub fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/", get(report_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

async fn report_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.cache.body().await,
    )
}

/// 200 once a report has been rendered, 503 until then.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.cache.status().await;
    let uptime = state.started_at.elapsed().as_secs();
    let updated_at = status
        .updated_at
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs());

    let (code, label) = if status.ready {
        (axum::http::StatusCode::OK, "healthy")
    } else {
        (axum::http::StatusCode::SERVICE_UNAVAILABLE, "initializing")
    };

    (
        code,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        serde_json::json!({
            "status": label,
            "uptime_seconds": uptime,
            "report_updated_at": updated_at,
            "last_error": status.last_error,
        })
        .to_string(),
    )
}

/// Prometheus metrics endpoint in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Render the report once and store it. Returns whether it succeeded.
pub async fn refresh_once<C: HttpTransport>(
    directory: &Directory<C>,
    org_id: i64,
    cache: &ReportCache,
) -> bool {
    let started = Instant::now();
    info!("start report refresh");

    let result = report::render(directory, org_id).await;
    let elapsed = started.elapsed();
    crate::metrics::record_refresh(result.is_ok(), elapsed.as_secs_f64());

    match result {
        Ok(body) => {
            cache.store(body).await;
            info!(duration_ms = elapsed.as_millis() as u64, "report refreshed");
            true
        }
        Err(e) => {
            warn!(error = %e, "report refresh failed, serving previous report");
            cache.record_failure(e.to_string()).await;
            false
        }
    }
}

/// Refresh immediately, then every `interval`, until the task is aborted.
pub fn spawn_refresh<C>(
    directory: Arc<Directory<C>>,
    org_id: i64,
    cache: ReportCache,
    interval: Duration,
) -> tokio::task::JoinHandle<()>
where
    C: HttpTransport + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            refresh_once(&directory, org_id, &cache).await;
        }
    })
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain for at
/// most [`DRAIN_TIMEOUT`].
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown.await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => info!("all in-flight requests drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "server task panicked"),
        Err(_) => warn!(
            drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timeout exceeded, forcing shutdown"
        ),
    }
}

/// Wait for SIGTERM or SIGINT.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
