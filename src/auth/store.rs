//! Credential store shared by everything that issues requests

use tokio::sync::Mutex;

use super::{oauth, CachedToken, OAuthConfig, TokenCache};
use crate::error::{Error, Result};

/// Holds the current token, refreshes it when it expires, and writes every
/// new token back to the cache file.
///
/// Refresh and cache write happen under one lock, so concurrent callers
/// wait for a single refresh instead of racing on the file.
pub struct CredentialStore {
    oauth: OAuthConfig,
    cache: TokenCache,
    current: Mutex<Option<CachedToken>>,
}

impl CredentialStore {
    pub fn new(oauth: OAuthConfig, cache: TokenCache, token: Option<CachedToken>) -> Self {
        Self {
            oauth,
            cache,
            current: Mutex::new(token),
        }
    }

    /// Build a store seeded from the cache file (missing file = no token).
    pub fn load(oauth: OAuthConfig, cache: TokenCache) -> Self {
        let token = cache.read();
        Self::new(oauth, cache, token)
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Snapshot of the current token, valid or not.
    pub async fn token(&self) -> Option<CachedToken> {
        self.current.lock().await.clone()
    }

    /// Replace the current token and persist it.
    pub async fn set_token(&self, token: CachedToken) -> Result<()> {
        let mut current = self.current.lock().await;
        self.cache.write(&token)?;
        *current = Some(token);
        Ok(())
    }

    /// A usable access token, refreshing through OAuth if the cached one
    /// expired and a refresh token is available.
    pub async fn access_token(&self) -> Result<String> {
        let mut current = self.current.lock().await;

        let refresh_token = match current.as_ref() {
            Some(token) if token.is_valid() => return Ok(token.access_token.clone()),
            Some(token) => token.refresh_token.clone(),
            None => None,
        };

        let refresh_token = refresh_token
            .ok_or_else(|| Error::Auth("no valid token and no refresh token".to_string()))?;
        if !self.oauth.has_credentials() {
            return Err(Error::Auth(
                "token expired and no client credentials to refresh it".to_string(),
            ));
        }

        let token = oauth::refresh(&self.oauth, &refresh_token).await?;
        self.cache.write(&token)?;
        let access = token.access_token.clone();
        *current = Some(token);
        Ok(access)
    }
}
