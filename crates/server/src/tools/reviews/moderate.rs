//! review_moderate tool implementation.
//!
//! Admin-only: publish, hide, or delete a review.

use kiteshell_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Unapprove,
    Delete,
}

/// Parameters for the review_moderate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReviewModerateParams {
    /// Review id.
    pub id: i64,
    pub action: ModerationAction,
    pub admin_password: String,
}

/// Implementation of the review_moderate tool.
pub async fn moderate_impl(state: &AppState, params: ReviewModerateParams) -> Result<CallToolResult, McpError> {
    state.admin.check(Some(&params.admin_password))?;
    let client = state.reviews()?;

    let review = match params.action {
        ModerationAction::Approve => client.set_approved(params.id, true).await,
        ModerationAction::Unapprove => client.set_approved(params.id, false).await,
        ModerationAction::Delete => client.delete(params.id).await,
    }
    .map_err(Error::from)?;

    json_result(&serde_json::json!({ "action": params.action, "review": review }))
}
