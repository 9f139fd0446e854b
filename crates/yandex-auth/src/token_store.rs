//! Token file persistence
//!
//! Keeps one OAuth token in a local JSON file so later runs can skip the
//! consent step. Writes replace the whole file atomically (temp file +
//! rename), so a crash mid-write leaves the previous token intact.
//!
//! There is no locking. One process owns the file; concurrent writers from
//! several processes can lose updates.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::token::Token;

/// Location of the persisted token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token from disk.
    ///
    /// A missing or unparsable file is a `TokenLoad` error. Callers that need
    /// a value anyway fall back to `Token::default()` or run consent again.
    pub async fn load(&self) -> Result<Token> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::TokenLoad(format!("reading {}: {e}", self.path.display())))?;
        let token: Token = serde_json::from_str(&contents)
            .map_err(|e| Error::TokenLoad(format!("parsing {}: {e}", self.path.display())))?;
        info!(
            path = %self.path.display(),
            has_refresh = token.refresh_token.is_some(),
            "loaded token"
        );
        Ok(token)
    }

    /// Replace the stored token with `token`.
    pub async fn save(&self, token: &Token) -> Result<()> {
        write_atomic(&self.path, token).await
    }
}

/// Serialize `token` next to `path` and rename it into place.
///
/// The file is created with 0600 permissions on unix since it holds a bearer
/// credential.
async fn write_atomic(path: &Path, token: &Token) -> Result<()> {
    let json = serde_json::to_string_pretty(token)
        .map_err(|e| Error::TokenSave(format!("serializing token: {e}")))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::TokenSave(format!("{} is not a file path", path.display())))?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let tmp_path = dir.join(format!(
        ".{}.tmp.{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::TokenSave(format!("writing {}: {e}", tmp_path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        if let Err(e) = tokio::fs::set_permissions(&tmp_path, perms).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(Error::TokenSave(format!("setting token file permissions: {e}")));
        }
    }

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(Error::TokenSave(format!(
            "replacing {}: {e}",
            path.display()
        )));
    }

    debug!(path = %path.display(), "persisted token");
    Ok(())
}
