//! Subcommand implementations for the `flowdock` binary

pub mod deploys;
pub mod login;
pub mod resources;
pub mod stream;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use flowdock::auth::CredentialStore;
use flowdock::{ClientBuilder, FlowdockClient, Message};

use crate::config::Config;

/// Flags shared by every subcommand.
#[derive(Debug, Default, Clone)]
pub struct Globals {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub cache: Option<PathBuf>,
    pub api_url: Option<String>,
}

/// Loaded config plus a client wired to the credential store.
pub struct Session {
    pub config: Config,
    pub store: Arc<CredentialStore>,
    pub client: FlowdockClient,
}

impl Session {
    /// Build a session and make sure a usable token is available.
    pub async fn authenticated(globals: &Globals) -> Result<Self> {
        let session = Self::open(globals)?;
        session.access_token().await?;
        Ok(session)
    }

    fn open(globals: &Globals) -> Result<Self> {
        let config = Config::load()?;
        let oauth = config.oauth(
            globals.client_id.as_deref(),
            globals.client_secret.as_deref(),
        );
        let cache = config.token_cache(globals.cache.as_deref())?;
        let store = Arc::new(CredentialStore::load(oauth, cache));

        let client = client_builder(&config, globals)
            .credentials(Arc::clone(&store))
            .build()
            .context("Failed to build API client")?;

        Ok(Self {
            config,
            store,
            client,
        })
    }

    pub async fn access_token(&self) -> Result<String> {
        self.store
            .access_token()
            .await
            .context("Not logged in or token expired. Run 'flowdock login'.")
    }
}

/// Client without OAuth credentials (inbox posts authenticate by flow token).
pub fn anonymous_client(globals: &Globals) -> Result<FlowdockClient> {
    let config = Config::load()?;
    client_builder(&config, globals)
        .build()
        .context("Failed to build API client")
}

fn client_builder(config: &Config, globals: &Globals) -> ClientBuilder {
    let mut builder = FlowdockClient::builder();
    if let Some(url) = globals.api_url.as_ref().or(config.api_url.as_ref()) {
        builder = builder.rest_url(url.as_str());
    }
    if let Some(url) = &config.stream_url {
        builder = builder.stream_url(url.as_str());
    }
    builder
}

/// Decoded content for display, or a marker when it does not decode.
pub fn render_content(msg: &Message) -> String {
    match msg.content() {
        Ok(content) => content.to_string(),
        Err(e) => format!("(undecodable content: {})", e),
    }
}

/// Parse `org/flow`.
pub fn parse_flow_ref(value: &str) -> Result<(String, String)> {
    match value.split_once('/') {
        Some((org, flow)) if !org.is_empty() && !flow.is_empty() => {
            Ok((org.to_string(), flow.to_string()))
        }
        _ => anyhow::bail!("Expected ORG/FLOW, got '{}'", value),
    }
}
