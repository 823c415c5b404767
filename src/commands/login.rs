//! login / logout / status

use anyhow::{Context, Result};
use flowdock::auth::{oauth, CredentialStore};

use super::Globals;
use crate::config::Config;

const USAGE: &str = "
To obtain a token you must provide both --id and --secret (or set client_id
and client_secret in the config file).

Client ID and Secret are listed under \"OAuth 2 Credentials\" on the
\"API Access\" tab of https://flowdock.com/account/authorized_applications

Once the OAuth flow completes the token is cached, and later commands run
without --id and --secret.
";

/// Perform the OAuth2 authorization-code flow.
///
/// Without `code`, prints the authorization URL and returns. With `code`,
/// exchanges it and caches the resulting token.
pub async fn login(globals: &Globals, code: Option<&str>, force: bool) -> Result<()> {
    let mut config = Config::load()?;
    let oauth_config = config.oauth(
        globals.client_id.as_deref(),
        globals.client_secret.as_deref(),
    );
    let cache = config.token_cache(globals.cache.as_deref())?;
    let store = CredentialStore::load(oauth_config.clone(), cache);

    if !force && code.is_none() {
        if let Some(token) = store.token().await {
            if token.is_valid() {
                println!("Already logged in (token valid). Use --force to re-authenticate.");
                return Ok(());
            }
            if token.refresh_token.is_some() && oauth_config.has_credentials() {
                tracing::info!("Token expired, attempting refresh...");
                match store.access_token().await {
                    Ok(_) => {
                        println!(
                            "Token refreshed and cached in {}",
                            store.cache().path().display()
                        );
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::warn!("Refresh failed, falling back to authorization code: {:#}", e);
                    }
                }
            }
        }
    }

    if !oauth_config.has_credentials() {
        eprint!("{}", USAGE);
        std::process::exit(2);
    }

    // Keep client credentials so later runs can refresh without flags
    if globals.client_id.is_some() || globals.client_secret.is_some() {
        config.client_id = Some(oauth_config.client_id.clone());
        config.client_secret = Some(oauth_config.client_secret.clone());
        config.save()?;
        tracing::debug!("Client credentials saved to config");
    }

    let Some(code) = code else {
        let url = oauth::authorize_url(&oauth_config)?;
        println!("Visit this URL to get a code, then run again with --code=YOUR_CODE");
        println!("{}", url);
        return Ok(());
    };

    let token = oauth::exchange_code(&oauth_config, code)
        .await
        .context("Failed to exchange authorization code")?;
    store.set_token(token).await.context("Failed to cache token")?;

    println!("Token is cached in {}", store.cache().path().display());
    Ok(())
}

/// Remove the cached token
pub async fn logout(globals: &Globals) -> Result<()> {
    let config = Config::load()?;
    let cache = config.token_cache(globals.cache.as_deref())?;
    if cache.clear()? {
        println!("Logged out.");
    } else {
        println!("No cached token at {}.", cache.path().display());
    }
    Ok(())
}

/// Display current auth status
pub async fn status(globals: &Globals) -> Result<()> {
    let config = Config::load()?;
    let cache = config.token_cache(globals.cache.as_deref())?;
    let oauth_config = config.oauth(
        globals.client_id.as_deref(),
        globals.client_secret.as_deref(),
    );

    println!("Token cache: {}", cache.path().display());

    let token = cache.read();
    match &token {
        Some(token) if token.is_valid() => {
            println!("Token:       valid");
            if let Some(exp) = token.expires_at {
                println!("  expires_at: {}", exp);
            }
        }
        Some(_) => println!("Token:       expired"),
        None => println!("Token:       none"),
    }

    match token.as_ref().and_then(|t| t.refresh_token.as_ref()) {
        Some(_) => println!("Refresh tok: present"),
        None => println!("Refresh tok: none"),
    }

    if oauth_config.has_credentials() {
        println!("Client:      {}", oauth_config.client_id);
    } else {
        println!("Client:      not configured");
    }

    if token.is_none() {
        println!("\nRun 'flowdock login' to authenticate.");
    }

    Ok(())
}
