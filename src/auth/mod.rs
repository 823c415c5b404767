//! Authentication for the Flowdock API
//!
//! OAuth2 authorization-code flow with an out-of-band redirect, a JSON token
//! cache, and a [`CredentialStore`] that hands out (and refreshes) bearer
//! tokens for the client.

pub mod oauth;
pub mod store;
pub mod tokens;

pub use store::CredentialStore;
pub use tokens::{CachedToken, TokenCache};

pub const DEFAULT_AUTH_URL: &str = "https://api.flowdock.com/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.flowdock.com/oauth/token";
pub const DEFAULT_REDIRECT_URL: &str = "urn:ietf:wg:oauth:2.0:oob";
pub const DEFAULT_SCOPE: &str = "flow private manage profile offline_access";

/// OAuth2 application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Space-separated scopes
    pub scope: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
}

impl OAuthConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Default::default()
        }
    }

    /// Both client id and secret are present.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            scope: DEFAULT_SCOPE.to_string(),
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}
