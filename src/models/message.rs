//! Message-related models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::content::Content;
use crate::error::{Error, Result};

/// Chat message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Event kind, e.g. `message`, `comment`, `mail`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Sender's user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Originating flow id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Untyped `content` payload, exactly as received. See [`Message::content`].
    #[serde(rename = "content", default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<Box<RawValue>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sent: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<serde_json::Value>>,
}

impl Message {
    /// Decode the content payload according to the event kind.
    pub fn content(&self) -> Result<Content> {
        let event = self
            .event
            .as_deref()
            .ok_or_else(|| Error::missing_field("event"))?;
        let raw = self
            .raw_content
            .as_deref()
            .ok_or_else(|| Error::missing_field("content"))?;
        Content::decode(event, raw.get())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}

/// How `tags` in a message query are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    And,
    Or,
}
