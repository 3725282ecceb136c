//! visitor_track tool implementation.

use kiteshell_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the visitor_track tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VisitorTrackParams {
    /// Report the current count without counting a visit.
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitorTrackOutput {
    pub count: i64,
    pub tracked: bool,
}

/// Implementation of the visitor_track tool.
pub async fn track_impl(state: &AppState, params: VisitorTrackParams) -> Result<CallToolResult, McpError> {
    let counter = state.visitors()?;

    let count = if params.read_only {
        counter.current().await.map_err(Error::from)?.map_or(0, |row| row.count)
    } else {
        counter.track().await.map_err(Error::from)?.count
    };

    json_result(&VisitorTrackOutput { count, tracked: !params.read_only })
}
