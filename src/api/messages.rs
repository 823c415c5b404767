//! Messages API.

use serde::Serialize;
use urlencoding::encode;

use super::client::{FlowdockClient, RawResponse};
use super::serialize_tags;
use super::stream::{self, MessageStream};
use crate::error::Result;
use crate::models::{Message, TagMode};

/// Filters for listing a flow's messages. Unset fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessagesListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until_id: Option<i64>,
    #[serde(serialize_with = "serialize_tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_mode: Option<TagMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// New chat message or comment, sent form-encoded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessagesCreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    pub event: String,
    pub content: String,
    /// Parent message id (comments only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<i64>,
    #[serde(serialize_with = "serialize_tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_user_name: Option<String>,
}

pub struct MessagesApi {
    client: FlowdockClient,
}

impl MessagesApi {
    pub(crate) fn new(client: FlowdockClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        org: &str,
        flow: &str,
        opts: Option<&MessagesListOptions>,
    ) -> Result<(Vec<Message>, RawResponse)> {
        let path = format!("flows/{}/{}/messages", encode(org), encode(flow));
        match opts {
            Some(opts) => self.client.get_with_query(&path, opts).await,
            None => self.client.get(&path).await,
        }
    }

    pub async fn create(&self, opts: &MessagesCreateOptions) -> Result<(Message, RawResponse)> {
        self.client.post_form("messages", opts).await
    }

    pub async fn create_comment(
        &self,
        opts: &MessagesCreateOptions,
    ) -> Result<(Message, RawResponse)> {
        self.client.post_form("comments", opts).await
    }

    /// Open the event stream of one flow.
    ///
    /// `token` is passed as the `access_token` query parameter. Returns once
    /// the server has accepted the connection; messages then arrive on the
    /// returned [`MessageStream`].
    pub async fn stream(&self, token: &str, org: &str, flow: &str) -> Result<MessageStream> {
        stream::open(&self.client, token, org, flow).await
    }
}
