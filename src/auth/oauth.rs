//! OAuth2 authorization-code exchange and token refresh

use oauth2::{
    basic::{BasicClient, BasicTokenResponse},
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};

use super::{CachedToken, OAuthConfig};
use crate::error::{Error, Result};

/// Fixed `state` parameter; the code is pasted back by hand so there is no
/// callback to match it against.
const STATE: &str = "state-token";

/// Build the OAuth2 client from an OAuthConfig
fn build_client(config: &OAuthConfig) -> Result<BasicClient> {
    let auth_url = AuthUrl::new(config.auth_url.clone())
        .map_err(|e| Error::Config(format!("invalid auth URL: {}", e)))?;
    let token_url = TokenUrl::new(config.token_url.clone())
        .map_err(|e| Error::Config(format!("invalid token URL: {}", e)))?;
    let redirect_url = RedirectUrl::new(config.redirect_url.clone())
        .map_err(|e| Error::Config(format!("invalid redirect URL: {}", e)))?;

    Ok(BasicClient::new(
        ClientId::new(config.client_id.clone()),
        Some(ClientSecret::new(config.client_secret.clone())),
        auth_url,
        Some(token_url),
    )
    .set_redirect_uri(redirect_url))
}

fn into_cached(response: &BasicTokenResponse, previous_refresh: Option<String>) -> CachedToken {
    CachedToken::new(
        response.access_token().secret().to_string(),
        response
            .refresh_token()
            .map(|rt| rt.secret().to_string())
            .or(previous_refresh),
        response.expires_in().map(|d| d.as_secs()),
    )
}

/// URL the user visits to obtain an authorization code.
pub fn authorize_url(config: &OAuthConfig) -> Result<String> {
    let client = build_client(config)?;
    let (url, _state) = client
        .authorize_url(|| CsrfToken::new(STATE.to_string()))
        .add_scopes(config.scopes().map(|s| Scope::new(s.to_string())))
        .add_extra_param("access_type", "offline")
        .url();
    Ok(url.to_string())
}

/// Exchange an authorization code for a token.
pub async fn exchange_code(config: &OAuthConfig, code: &str) -> Result<CachedToken> {
    let client = build_client(config)?;

    tracing::info!("Exchanging authorization code...");
    let response = client
        .exchange_code(AuthorizationCode::new(code.to_string()))
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .map_err(|e| Error::Auth(format!("code exchange failed: {}", e)))?;

    Ok(into_cached(&response, None))
}

/// Obtain a fresh access token with a refresh token. The old refresh token
/// is kept when the server does not rotate it.
pub async fn refresh(config: &OAuthConfig, refresh_token: &str) -> Result<CachedToken> {
    let client = build_client(config)?;

    tracing::info!("Refreshing access token...");
    let response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .map_err(|e| Error::Auth(format!("token refresh failed: {}", e)))?;

    Ok(into_cached(&response, Some(refresh_token.to_string())))
}
