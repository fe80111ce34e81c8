//! Cluster inspection trait.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::types::NodeRecord;

/// Read-only view of the cluster the client is connected to.
#[async_trait]
pub trait ClusterInspector: Send + Sync {
    /// Lists the nodes of the cluster.
    async fn nodes(&self) -> ClientResult<Vec<NodeRecord>>;
}
