//! Token storage and the JSON token cache file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;

/// Seconds of remaining lifetime below which a token counts as expired.
const EXPIRY_MARGIN_SECS: u64 = 10;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// OAuth2 credential as stored in the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl CachedToken {
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in_secs: Option<u64>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: Some("Bearer".to_string()),
            expires_at: expires_in_secs.map(|secs| now_secs() + secs),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => now_secs() + EXPIRY_MARGIN_SECS >= exp,
            None => false,
        }
    }

    /// Non-empty and not expired.
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }
}

/// JSON file holding a single [`CachedToken`].
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached token. A missing or unreadable file means "no token".
    pub fn read(&self) -> Option<CachedToken> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("No token cache at {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::debug!("Ignoring unreadable token cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Truncate and rewrite the cache file. Invalid tokens are not written.
    pub fn write(&self, token: &CachedToken) -> Result<()> {
        if !token.is_valid() {
            tracing::debug!("Not caching invalid or expired token");
            return Ok(());
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string(token)?;
        fs::write(&self.path, content)?;

        // Restrictive permissions: the file holds bearer credentials
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!("Token cached in {}", self.path.display());
        Ok(())
    }

    /// Remove the cache file. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
