//! ClusterInspector implementation.

use async_trait::async_trait;

use crate::core::ClusterInspector;
use crate::error::ClientResult;
use crate::types::NodeRecord;

use super::client::{SearchClient, decode, ensure_success, read_json, send_error};

#[async_trait]
impl ClusterInspector for SearchClient {
    async fn nodes(&self) -> ClientResult<Vec<NodeRecord>> {
        let response = self
            .client()
            .cat()
            .nodes()
            .format("json")
            .send()
            .await
            .map_err(|e| send_error("list nodes", "_cluster", None, e))?;

        let response = ensure_success("list nodes", "_cluster", None, response).await?;
        let body = read_json("list nodes", "_cluster", None, response).await?;
        let nodes: Vec<NodeRecord> = decode("list nodes", "_cluster", None, body)?;

        tracing::debug!("Cluster has {} node(s)", nodes.len());
        Ok(nodes)
    }
}
