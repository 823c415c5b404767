//! Authenticated HTTP client for the Flowdock API
//!
//! Wraps reqwest::Client with base URL handling, bearer token injection
//! (static or refreshed through a [`CredentialStore`]) and uniform error
//! conversion for non-2xx responses.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::{FlowsApi, InboxApi, MessagesApi, OrganizationsApi, UsersApi};
use crate::auth::CredentialStore;
use crate::error::{Error, ErrorResponse, Result};

pub const REST_URL: &str = "https://api.flowdock.com/";
pub const STREAM_URL: &str = "https://stream.flowdock.com/";
pub const USER_AGENT: &str = concat!("flowdock-rs/", env!("CARGO_PKG_VERSION"));

/// Default timeout for REST requests. Streams have none.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delivery channel capacity for event streams.
const DEFAULT_STREAM_BUFFER: usize = 1;

/// Status, final URL and headers of a successful response. The body has
/// already been decoded into the returned record.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub url: Url,
    pub headers: HeaderMap,
}

impl RawResponse {
    fn from_response(resp: &reqwest::Response) -> Self {
        Self {
            status: resp.status(),
            url: resp.url().clone(),
            headers: resp.headers().clone(),
        }
    }
}

#[derive(Clone)]
enum Credentials {
    None,
    Bearer(String),
    Store(Arc<CredentialStore>),
}

/// Flowdock API client.
///
/// Cheap to clone; clones share the connection pool and credentials.
#[derive(Clone)]
pub struct FlowdockClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    rest_url: Url,
    stream_url: Url,
    credentials: Credentials,
    timeout: Duration,
    stream_buffer: usize,
}

impl FlowdockClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client against the public API with no credentials attached.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn rest_url(&self) -> &Url {
        &self.inner.rest_url
    }

    pub fn stream_url(&self) -> &Url {
        &self.inner.stream_url
    }

    pub fn flows(&self) -> FlowsApi {
        FlowsApi::new(self.clone())
    }

    pub fn messages(&self) -> MessagesApi {
        MessagesApi::new(self.clone())
    }

    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    pub fn organizations(&self) -> OrganizationsApi {
        OrganizationsApi::new(self.clone())
    }

    pub fn inbox(&self) -> InboxApi {
        InboxApi::new(self.clone())
    }

    /// Resolve a relative API path against the REST base URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        join(&self.inner.rest_url, path)
    }

    pub(crate) fn stream_endpoint(&self, path: &str) -> Result<Url> {
        join(&self.inner.stream_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn stream_buffer(&self) -> usize {
        self.inner.stream_buffer
    }

    /// Start a REST request: resolved URL, timeout and credentials attached.
    pub async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);

        let builder = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);

        match &self.inner.credentials {
            Credentials::None => Ok(builder),
            Credentials::Bearer(token) => Ok(builder.bearer_auth(token)),
            Credentials::Store(store) => Ok(builder.bearer_auth(store.access_token().await?)),
        }
    }

    /// Send a request and decode the JSON body.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(T, RawResponse)> {
        let resp = check_response(request.send().await?).await?;
        let raw = RawResponse::from_response(&resp);
        let body = resp.bytes().await?;
        let value = serde_json::from_slice(&body)?;
        Ok((value, raw))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<(T, RawResponse)> {
        let request = self.request(Method::GET, path).await?;
        self.send(request).await
    }

    pub(crate) async fn get_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<(T, RawResponse)>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).await?.query(query);
        self.send(request).await
    }

    pub(crate) async fn post_form<T, B>(&self, path: &str, form: &B) -> Result<(T, RawResponse)>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path).await?.form(form);
        self.send(request).await
    }

    pub(crate) async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<(T, RawResponse)>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PUT, path).await?.json(body);
        self.send(request).await
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Turn a non-2xx response into [`Error::Api`], keeping the raw body.
pub(crate) async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().clone();
    let headers = resp.headers().clone();
    let data = resp.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
    tracing::debug!("HTTP {} for {}", status.as_u16(), url);

    Err(ErrorResponse::new(status, url, headers, data).into())
}

/// Builder for [`FlowdockClient`].
pub struct ClientBuilder {
    rest_url: String,
    stream_url: String,
    user_agent: String,
    credentials: Credentials,
    personal_token: Option<String>,
    timeout: Duration,
    stream_buffer: usize,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            rest_url: REST_URL.to_string(),
            stream_url: STREAM_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            credentials: Credentials::None,
            personal_token: None,
            timeout: DEFAULT_TIMEOUT,
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    pub fn rest_url(mut self, url: impl Into<String>) -> Self {
        self.rest_url = url.into();
        self
    }

    pub fn stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = url.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Fixed OAuth access token sent as `Authorization: Bearer`.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Credentials::Bearer(token.into());
        self
    }

    /// Take bearer tokens from a credential store, refreshing as needed.
    pub fn credentials(mut self, store: Arc<CredentialStore>) -> Self {
        self.credentials = Credentials::Store(store);
        self
    }

    /// Personal API token, sent as the user part of the REST base URL
    /// (HTTP basic auth).
    pub fn personal_token(mut self, token: impl Into<String>) -> Self {
        self.personal_token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Capacity of each stream's delivery channel (minimum 1).
    pub fn stream_buffer(mut self, capacity: usize) -> Self {
        self.stream_buffer = capacity.max(1);
        self
    }

    pub fn build(self) -> Result<FlowdockClient> {
        let mut rest_url = parse_base(&self.rest_url)?;
        let stream_url = parse_base(&self.stream_url)?;

        if let Some(token) = &self.personal_token {
            rest_url
                .set_username(token)
                .map_err(|_| Error::Config("cannot attach token to REST URL".to_string()))?;
        }

        let http = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .build()?;

        Ok(FlowdockClient {
            inner: Arc::new(ClientInner {
                http,
                rest_url,
                stream_url,
                credentials: self.credentials,
                timeout: self.timeout,
                stream_buffer: self.stream_buffer,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a base URL, making sure it ends in `/` so joins append.
fn parse_base(url: &str) -> Result<Url> {
    let mut url = Url::parse(url)?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}
