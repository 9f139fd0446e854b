//! Directory report
//!
//! Prints every organization the token can see with its mail groups and
//! their members, or serves the same table over HTTP and keeps it fresh.
//!
//! ```text
//! directory-report [--config PATH] [--org ID] [--token-file PATH] [--web] [--listen ADDR]
//! ```

mod cache;
mod config;
mod consent;
mod error;
mod metrics;
mod report;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use directory::Directory;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yandex_auth::{AuthorizedClient, TokenStore};

use crate::cache::ReportCache;
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::server::AppState;

/// Command line overrides. Anything not given falls back to the config.
#[derive(Debug, Default, PartialEq)]
struct Cli {
    config: Option<String>,
    org_id: Option<i64>,
    token_file: Option<PathBuf>,
    web: bool,
    listen_addr: Option<SocketAddr>,
}

impl Cli {
    fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = Cli::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .with_context(|| format!("{name} requires a value"))
            };
            match arg.as_str() {
                "--config" => cli.config = Some(value("--config")?),
                "--org" => {
                    let raw = value("--org")?;
                    cli.org_id = Some(
                        raw.parse()
                            .with_context(|| format!("--org expects a number, got {raw}"))?,
                    );
                }
                "--token-file" => cli.token_file = Some(PathBuf::from(value("--token-file")?)),
                "--web" => cli.web = true,
                "--listen" => {
                    let raw = value("--listen")?;
                    cli.listen_addr = Some(
                        raw.parse()
                            .with_context(|| format!("--listen expects host:port, got {raw}"))?,
                    );
                }
                other => anyhow::bail!("unknown argument: {other}"),
            }
        }
        Ok(cli)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(org_id) = self.org_id {
            config.directory.org_id = org_id;
        }
        if let Some(ref token_file) = self.token_file {
            config.directory.token_file = token_file.clone();
        }
        if self.web {
            config.report.web = true;
        }
        if let Some(addr) = self.listen_addr {
            config.report.listen_addr = addr;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse(std::env::args().skip(1))?;

    let config_path = Config::resolve_path(cli.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");
    let mut config = if config_path == PathBuf::from(DEFAULT_CONFIG_FILE) {
        Config::load_or_default(&config_path)
    } else {
        Config::load(&config_path)
    }
    .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    cli.apply(&mut config);

    info!(
        org_id = config.directory.org_id,
        token_file = %config.directory.token_file.display(),
        base_url = %config.directory.base_url,
        web = config.report.web,
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.directory.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let oauth = config.oauth_config();
    let store = TokenStore::new(&config.directory.token_file);
    let token = {
        let mut stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        consent::obtain_token(&http, &oauth, &store, &mut stdin, &mut stdout)
            .await
            .context("failed to obtain OAuth token")?
    };

    let client = AuthorizedClient::new(http, oauth, token).with_store(store);
    let directory = Directory::with_base_url(client, config.directory.base_url.clone());
    let org_id = config.directory.org_id;

    if !config.report.web {
        let table = report::render(&directory, org_id)
            .await
            .context("failed to build report")?;
        print!("{table}");
        return Ok(());
    }

    let prometheus = metrics::install_recorder().context("failed to install metrics recorder")?;
    let cache = ReportCache::new();
    let refresh = server::spawn_refresh(
        Arc::new(directory),
        org_id,
        cache.clone(),
        Duration::from_secs(config.report.refresh_interval_secs),
    );

    let state = AppState {
        cache,
        prometheus,
        started_at: Instant::now(),
    };
    let app = server::build_router(state, config.report.max_connections);

    let listen_addr = config.report.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "serving report");

    server::serve(listener, app, server::shutdown_signal()).await;
    refresh.abort();

    info!("shutdown complete");
    Ok(())
}
