//! Typed message content, keyed by the message's event kind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Decoded `content` of a [`Message`](super::Message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// `event == "message"`: the payload is a bare JSON string.
    Text(String),
    /// `event == "comment"`.
    Comment(CommentContent),
    /// Version-control webhook content (GitHub and friends).
    Vcs(VcsContent),
    /// Any other payload, kept as the original JSON text.
    Raw(String),
}

impl Content {
    /// Decode a raw JSON payload according to its event kind.
    ///
    /// Only `message` and `comment` payloads can fail; unknown kinds fall
    /// back to [`Content::Raw`].
    pub fn decode(event: &str, raw: &str) -> Result<Self> {
        match event {
            "message" => Ok(Content::Text(serde_json::from_str(raw)?)),
            "comment" => Ok(Content::Comment(serde_json::from_str(raw)?)),
            _ => Ok(serde_json::from_str::<VcsContent>(raw)
                .map(Content::Vcs)
                .unwrap_or_else(|_| Content::Raw(raw.to_string()))),
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(text) => f.write_str(text),
            Content::Comment(comment) => comment.fmt(f),
            Content::Vcs(vcs) => vcs.fmt(f),
            Content::Raw(raw) => f.write_str(raw),
        }
    }
}

/// Content of a `comment` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentContent {
    /// Title of the commented item.
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
}

impl fmt::Display for CommentContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsLink {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsPusher {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsSender {
    pub login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsRepository {
    pub name: String,
}

/// Version-control event content.
///
/// A payload only decodes as VCS content when it carries both `event` and
/// `repository.name`; everything else is left to the raw fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsContent {
    pub event: String,
    pub repository: VcsRepository,
    #[serde(default)]
    pub pusher: Option<VcsPusher>,
    #[serde(default)]
    pub sender: Option<VcsSender>,
    #[serde(default)]
    pub issue: Option<VcsLink>,
    #[serde(default)]
    pub pull_request: Option<VcsLink>,
    #[serde(default, rename = "compare")]
    pub compare_url: Option<String>,
}

impl VcsContent {
    /// Pusher name, else sender login, else `Unknown`.
    pub fn user(&self) -> &str {
        self.pusher
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .or_else(|| self.sender.as_ref().and_then(|s| s.login.as_deref()))
            .unwrap_or("Unknown")
    }

    /// Compare URL, else pull request URL, else issue URL.
    pub fn url(&self) -> Option<&str> {
        self.compare_url
            .as_deref()
            .or_else(|| self.pull_request.as_ref().and_then(|p| p.url.as_deref()))
            .or_else(|| self.issue.as_ref().and_then(|i| i.url.as_deref()))
    }
}

impl fmt::Display for VcsContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} by {} {}",
            self.repository.name,
            self.event,
            self.user(),
            self.url().unwrap_or("")
        )
    }
}
