//! Organizations API.

use serde::Serialize;
use urlencoding::encode;

use super::client::{FlowdockClient, RawResponse};
use crate::error::Result;
use crate::models::Organization;

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<u32>,
}

pub struct OrganizationsApi {
    client: FlowdockClient,
}

impl OrganizationsApi {
    pub(crate) fn new(client: FlowdockClient) -> Self {
        Self { client }
    }

    pub async fn all(&self) -> Result<(Vec<Organization>, RawResponse)> {
        self.client.get("organizations").await
    }

    pub async fn get_by_parameterized_name(
        &self,
        name: &str,
    ) -> Result<(Organization, RawResponse)> {
        self.client.get(&format!("organizations/{}", encode(name))).await
    }

    pub async fn get_by_id(&self, id: u64) -> Result<(Organization, RawResponse)> {
        self.client
            .get_with_query("organizations/find", &[("id", id)])
            .await
    }

    pub async fn update(
        &self,
        id: u64,
        opts: &OrganizationUpdateOptions,
    ) -> Result<(Organization, RawResponse)> {
        self.client
            .put_json(&format!("organizations/{}", id), opts)
            .await
    }
}
