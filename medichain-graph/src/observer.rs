use async_trait::async_trait;

use crate::GraphError;

/// Hooks invoked by the executor around every node. All methods default to no-ops.
#[async_trait]
pub trait Observer: Send + Sync {
    async fn on_node_start(&self, _node_id: &str, _input: &serde_json::Value) {}
    async fn on_node_end(&self, _node_id: &str, _output: &serde_json::Value, _duration_ms: u128) {}
    async fn on_error(&self, _node_id: &str, _error: &GraphError) {}
}
