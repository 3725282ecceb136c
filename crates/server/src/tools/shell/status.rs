//! shell_status tool implementation.

use chrono::Utc;
use kiteshell_core::PartitionInfo;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Output from the shell_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShellStatusOutput {
    /// Lifecycle state of the active worker, or "none".
    pub state: String,
    pub static_cache: Option<String>,
    pub dynamic_cache: Option<String>,
    pub origin: String,
    pub partitions: Vec<PartitionInfo>,
    pub checked_at: String,
}

/// Implementation of the shell_status tool.
pub async fn status_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let worker = state.registration.active().await;
    let worker_state = match &worker {
        Some(worker) => worker.state().await.to_string(),
        None => "none".to_string(),
    };

    let output = ShellStatusOutput {
        state: worker_state,
        static_cache: worker.as_ref().map(|w| w.config().static_cache.clone()),
        dynamic_cache: worker.as_ref().map(|w| w.config().dynamic_cache.clone()),
        origin: state.config.origin.clone(),
        partitions: state.registration.cache().list_partitions().await?,
        checked_at: Utc::now().to_rfc3339(),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::shell::register::{ShellRegisterParams, register_impl};
    use crate::tools::testing::{output, serve_manifest, state_with, test_config};
    use kiteshell_client::testing::ScriptedNetwork;

    #[tokio::test]
    async fn test_status_before_registration() {
        let state = state_with(test_config(), ScriptedNetwork::new()).await;

        let out = output(&status_impl(&state).await.unwrap());
        assert_eq!(out["state"], "none");
        assert!(out["static_cache"].is_null());
        assert_eq!(out["partitions"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_status_after_registration() {
        let network = ScriptedNetwork::new();
        serve_manifest(&network);
        let state = state_with(test_config(), network).await;
        register_impl(&state, ShellRegisterParams::default()).await.unwrap();

        let out = output(&status_impl(&state).await.unwrap());
        assert_eq!(out["state"], "active");
        assert_eq!(out["static_cache"], "static-v1");
        assert_eq!(out["partitions"][0]["name"], "static-v1");
        assert_eq!(out["partitions"][0]["entries"], 6);
    }
}
