//! Configuration for the command line tools

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use flowdock::auth::{self, OAuthConfig, TokenCache};

/// Settings file. Every field is optional; CLI flags win over the file.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// OAuth2 application client id
    pub client_id: Option<String>,
    /// OAuth2 application client secret
    pub client_secret: Option<String>,
    /// Space-separated OAuth scopes
    pub scope: Option<String>,
    pub redirect_url: Option<String>,
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    /// Token cache file (defaults to `token.json` next to this file)
    pub token_cache: Option<PathBuf>,
    /// REST API base URL override
    pub api_url: Option<String>,
    /// Streaming API base URL override
    pub stream_url: Option<String>,
    /// Default organization for commands that take one
    pub organization: Option<String>,
    /// Default flow for commands that take one
    pub flow: Option<String>,
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "flowdock", "flowdock")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        // Client secret lives here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// OAuth settings, with flag overrides for id and secret.
    pub fn oauth(&self, id: Option<&str>, secret: Option<&str>) -> OAuthConfig {
        let pick = |flag: Option<&str>, file: &Option<String>| {
            flag.map(String::from)
                .or_else(|| file.clone())
                .unwrap_or_default()
        };
        let or_default = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };

        OAuthConfig {
            client_id: pick(id, &self.client_id),
            client_secret: pick(secret, &self.client_secret),
            scope: or_default(&self.scope, auth::DEFAULT_SCOPE),
            redirect_url: or_default(&self.redirect_url, auth::DEFAULT_REDIRECT_URL),
            auth_url: or_default(&self.auth_url, auth::DEFAULT_AUTH_URL),
            token_url: or_default(&self.token_url, auth::DEFAULT_TOKEN_URL),
        }
    }

    /// Token cache location: flag, then config file, then config dir.
    pub fn token_cache(&self, flag: Option<&Path>) -> Result<TokenCache> {
        let path = match (flag, &self.token_cache) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => path.clone(),
            (None, None) => Self::config_dir()?.join("token.json"),
        };
        Ok(TokenCache::new(path))
    }

    /// Resolve `org` and `flow`, falling back to the configured defaults.
    pub fn flow_ref(&self, org: Option<String>, flow: Option<String>) -> Result<(String, String)> {
        let org = org
            .or_else(|| self.organization.clone())
            .context("No organization given and none configured")?;
        let flow = flow
            .or_else(|| self.flow.clone())
            .context("No flow given and none configured")?;
        Ok((org, flow))
    }
}
