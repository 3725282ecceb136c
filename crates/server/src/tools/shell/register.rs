//! shell_register tool implementation.
//!
//! Installs and activates a new worker version. Passing new partition tags
//! is how a deploy invalidates the previous version's content.

use kiteshell_client::ShellConfig;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the shell_register tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ShellRegisterParams {
    /// Static partition tag for the new version (default: configured tag).
    #[serde(default)]
    pub static_cache: Option<String>,

    /// Dynamic partition tag for the new version (default: configured tag).
    #[serde(default)]
    pub dynamic_cache: Option<String>,
}

/// Implementation of the shell_register tool.
pub async fn register_impl(state: &AppState, params: ShellRegisterParams) -> Result<CallToolResult, McpError> {
    let config = ShellConfig::from_app(&state.config)?.with_version(
        params.static_cache.filter(|tag| !tag.trim().is_empty()),
        params.dynamic_cache.filter(|tag| !tag.trim().is_empty()),
    );

    let report = state.registration.register(config).await?;
    json_result(&report)
}
