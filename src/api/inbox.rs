//! Team inbox (push) API.

use serde::Serialize;
use urlencoding::encode;

use super::client::{FlowdockClient, RawResponse};
use super::serialize_tags;
use crate::error::Result;
use crate::models::Message;

/// Inbox post. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InboxCreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// `html` or `markdown`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(serialize_with = "serialize_tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

pub struct InboxApi {
    client: FlowdockClient,
}

impl InboxApi {
    pub(crate) fn new(client: FlowdockClient) -> Self {
        Self { client }
    }

    /// Post into a flow's team inbox, authenticated by the flow's API token.
    pub async fn create(
        &self,
        flow_api_token: &str,
        opts: &InboxCreateOptions,
    ) -> Result<(Message, RawResponse)> {
        self.client
            .post_form(&format!("v1/messages/team_inbox/{}", encode(flow_api_token)), opts)
            .await
    }
}
