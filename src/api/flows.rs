//! Flows API.

use serde::Serialize;
use urlencoding::encode;

use super::client::{FlowdockClient, RawResponse};
use crate::error::Result;
use crate::models::Flow;

#[derive(Debug, Clone, Default)]
pub struct FlowsListOptions {
    /// Include the flow's users in each record.
    pub users: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowsCreateOptions {
    pub name: String,
}

pub struct FlowsApi {
    client: FlowdockClient,
}

impl FlowsApi {
    pub(crate) fn new(client: FlowdockClient) -> Self {
        Self { client }
    }

    /// Flows the user has joined, or every accessible flow when `all` is set.
    pub async fn list(
        &self,
        all: bool,
        opts: Option<&FlowsListOptions>,
    ) -> Result<(Vec<Flow>, RawResponse)> {
        let path = if all { "flows/all" } else { "flows" };
        match opts {
            Some(opts) if opts.users => {
                self.client
                    .get_with_query(path, &[("users", "1")])
                    .await
            }
            _ => self.client.get(path).await,
        }
    }

    pub async fn get(&self, org: &str, flow: &str) -> Result<(Flow, RawResponse)> {
        self.client.get(&format!("flows/{}/{}", encode(org), encode(flow))).await
    }

    /// Look up a flow by its id (`org:flow` form or opaque id).
    pub async fn get_by_id(&self, id: &str) -> Result<(Flow, RawResponse)> {
        self.client
            .get_with_query("flows/find", &[("id", id)])
            .await
    }

    pub async fn create(
        &self,
        org: &str,
        opts: &FlowsCreateOptions,
    ) -> Result<(Flow, RawResponse)> {
        self.client.post_form(&format!("flows/{}", encode(org)), opts).await
    }

    /// Update a flow. Only fields set on `flow` are sent.
    pub async fn update(&self, org: &str, flow: &str, update: &Flow) -> Result<(Flow, RawResponse)> {
        self.client
            .put_json(&format!("flows/{}/{}", encode(org), encode(flow)), update)
            .await
    }
}
