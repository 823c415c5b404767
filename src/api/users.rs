//! Users API.

use serde::Serialize;
use urlencoding::encode;

use super::client::{FlowdockClient, RawResponse};
use crate::error::Result;
use crate::models::User;

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

pub struct UsersApi {
    client: FlowdockClient,
}

impl UsersApi {
    pub(crate) fn new(client: FlowdockClient) -> Self {
        Self { client }
    }

    /// Every user visible to the authenticated user.
    pub async fn all(&self) -> Result<(Vec<User>, RawResponse)> {
        self.client.get("users").await
    }

    /// Users of one flow.
    pub async fn list(&self, org: &str, flow: &str) -> Result<(Vec<User>, RawResponse)> {
        self.client
            .get(&format!("flows/{}/{}/users", encode(org), encode(flow)))
            .await
    }

    pub async fn get(&self, id: u64) -> Result<(User, RawResponse)> {
        self.client.get(&format!("users/{}", id)).await
    }

    pub async fn update(&self, id: u64, opts: &UserUpdateOptions) -> Result<(User, RawResponse)> {
        self.client.put_json(&format!("users/{}", id), opts).await
    }
}
