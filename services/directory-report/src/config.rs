//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The OAuth client secret is read from CLIENT_SECRET or client_secret_file
//! and never stored in the TOML directly.

use common::Secret;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use yandex_auth::OAuthConfig;

/// Config file used when neither `--config` nor CONFIG_PATH is given.
pub const DEFAULT_CONFIG_FILE: &str = "directory-report.toml";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub oauth: OAuthSection,
    pub directory: DirectorySection,
    pub report: ReportSection,
}

/// Registered OAuth application
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OAuthSection {
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// File holding the client secret (alternative to CLIENT_SECRET)
    pub client_secret_file: Option<PathBuf>,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
}

impl Default for OAuthSection {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            client_secret_file: None,
            scopes: Vec::new(),
            auth_url: yandex_auth::AUTHORIZE_ENDPOINT.to_string(),
            token_url: yandex_auth::TOKEN_ENDPOINT.to_string(),
        }
    }
}

/// Directory API access
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DirectorySection {
    /// Organization to report on; 0 means every organization
    pub org_id: i64,
    pub token_file: PathBuf,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for DirectorySection {
    fn default() -> Self {
        Self {
            org_id: 0,
            token_file: PathBuf::from(yandex_auth::DEFAULT_TOKEN_FILE),
            base_url: format!("{}{}", directory::DIRECTORY_API, directory::API_VERSION),
            timeout_secs: 30,
        }
    }
}

/// Report output and web mode
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Serve the report over HTTP instead of printing it once
    pub web: bool,
    pub listen_addr: SocketAddr,
    pub refresh_interval_secs: u64,
    pub max_connections: usize,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            web: false,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            refresh_interval_secs: 600,
            max_connections: 1000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Client secret resolution order:
    /// 1. CLIENT_SECRET env var
    /// 2. client_secret_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.finish()
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    ///
    /// Used for the implicit default path only; an explicitly named file
    /// that does not exist is still an error.
    pub fn load_or_default(path: &Path) -> common::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Config::default().finish()
        }
    }

    fn finish(mut self) -> common::Result<Self> {
        if let Ok(id) = std::env::var("CLIENT_ID") {
            self.oauth.client_id = id;
        }

        if let Ok(secret) = std::env::var("CLIENT_SECRET") {
            self.oauth.client_secret = Some(Secret::new(secret));
        } else if let Some(ref secret_file) = self.oauth.client_secret_file {
            let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read client_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            let secret = secret.trim().to_owned();
            if !secret.is_empty() {
                self.oauth.client_secret = Some(Secret::new(secret));
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> common::Result<()> {
        if !self.directory.base_url.starts_with("http://")
            && !self.directory.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.directory.base_url
            )));
        }

        if self.directory.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.report.refresh_interval_secs == 0 {
            return Err(common::Error::Config(
                "refresh_interval_secs must be greater than 0".into(),
            ));
        }

        if self.report.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// OAuth client settings. The secret may be empty when a stored token is
    /// used and consent is not needed.
    pub fn oauth_config(&self) -> OAuthConfig {
        let secret = self
            .oauth
            .client_secret
            .clone()
            .unwrap_or_else(|| Secret::new(String::new()));
        OAuthConfig::new(self.oauth.client_id.clone(), secret, self.oauth.scopes.clone())
            .with_endpoints(self.oauth.auth_url.clone(), self.oauth.token_url.clone())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch process environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn clear_credentials_env() {
        unsafe {
            remove_env("CLIENT_ID");
            remove_env("CLIENT_SECRET");
        }
    }

    fn valid_toml() -> &'static str {
        r#"
[oauth]
client_id = "file-client"
scopes = ["directory:read_users", "directory:read_groups"]

[directory]
org_id = 7
token_file = "/var/lib/directory-report/token.json"

[report]
web = true
listen_addr = "127.0.0.1:9000"
refresh_interval_secs = 60
"#
    }

    #[test]
    fn test_load_valid_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_credentials_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, valid_toml()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.oauth.client_id, "file-client");
        assert_eq!(config.oauth.scopes.len(), 2);
        assert!(config.oauth.client_secret.is_none());
        assert_eq!(config.oauth.token_url, "https://oauth.yandex.ru/token");
        assert_eq!(config.directory.org_id, 7);
        assert_eq!(
            config.directory.token_file,
            PathBuf::from("/var/lib/directory-report/token.json")
        );
        assert_eq!(config.directory.base_url, "https://api.directory.yandex.net/v6");
        assert_eq!(config.directory.timeout_secs, 30);
        assert!(config.report.web);
        assert_eq!(config.report.listen_addr.port(), 9000);
        assert_eq!(config.report.refresh_interval_secs, 60);
        assert_eq!(config.report.max_connections, 1000);
    }

    #[test]
    fn test_defaults_match_interactive_tool() {
        let config = Config::default();
        assert_eq!(config.directory.org_id, 0);
        assert_eq!(config.directory.token_file, PathBuf::from(".token"));
        assert!(!config.report.web);
        assert_eq!(config.report.listen_addr.port(), 8080);
        assert_eq!(config.report.refresh_interval_secs, 600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(common::Error::Io(_))));
    }

    #[test]
    fn test_load_or_default_missing_file_gives_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_credentials_env();
        let dir = tempfile::tempdir().unwrap();

        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.directory.org_id, 0);
        assert!(config.oauth.client_id.is_empty());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{{{ toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Toml(_))));
    }

    #[test]
    fn test_credentials_from_env_override_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let secret_path = dir.path().join("secret");
        std::fs::write(&secret_path, "from-file\n").unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "[oauth]\nclient_id = \"file-client\"\nclient_secret_file = \"{}\"\n",
                secret_path.display()
            ),
        )
        .unwrap();

        unsafe {
            set_env("CLIENT_ID", "env-client");
            set_env("CLIENT_SECRET", "env-secret");
        }
        let config = Config::load(&path).unwrap();
        clear_credentials_env();

        assert_eq!(config.oauth.client_id, "env-client");
        assert_eq!(config.oauth.client_secret.as_ref().unwrap().expose(), "env-secret");
    }

    #[test]
    fn test_client_secret_from_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_credentials_env();
        let dir = tempfile::tempdir().unwrap();
        let secret_path = dir.path().join("secret");
        std::fs::write(&secret_path, "from-file\n").unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!("[oauth]\nclient_secret_file = \"{}\"\n", secret_path.display()),
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.oauth.client_secret.as_ref().unwrap().expose(), "from-file");
    }

    #[test]
    fn test_unreadable_secret_file_is_config_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_credentials_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[oauth]\nclient_secret_file = \"/nonexistent/secret\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, common::Error::Config(_)), "got {err:?}");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.directory.base_url = "ftp://example.com".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"), "got {err}");
    }

    #[test]
    fn test_rejects_zero_values() {
        let mut config = Config::default();
        config.directory.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.report.refresh_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.report.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oauth_config_carries_endpoints_and_scopes() {
        let mut config = Config::default();
        config.oauth.client_id = "cid".into();
        config.oauth.scopes = vec!["directory:read_users".into()];
        config.oauth.token_url = "http://127.0.0.1:1/token".into();

        let oauth = config.oauth_config();
        assert_eq!(oauth.client_id, "cid");
        assert!(oauth.client_secret.is_blank());
        assert_eq!(oauth.scopes, vec!["directory:read_users".to_string()]);
        assert_eq!(oauth.token_url, "http://127.0.0.1:1/token");
        assert_eq!(oauth.auth_url, "https://oauth.yandex.ru/authorize");
    }

    #[test]
    fn test_resolve_path_prefers_cli() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/etc/from-env.toml") };
        assert_eq!(
            Config::resolve_path(Some("/tmp/cli.toml")),
            PathBuf::from("/tmp/cli.toml")
        );
        assert_eq!(
            Config::resolve_path(None),
            PathBuf::from("/etc/from-env.toml")
        );
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(
            Config::resolve_path(None),
            PathBuf::from(DEFAULT_CONFIG_FILE)
        );
    }
}
