//! reviews_list tool implementation.

use kiteshell_client::Review;
use kiteshell_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the reviews_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReviewsListParams {
    /// Include unapproved reviews. Requires the admin password.
    #[serde(default)]
    pub include_pending: bool,

    #[serde(default)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewsListOutput {
    pub count: usize,
    pub reviews: Vec<Review>,
}

/// Implementation of the reviews_list tool.
pub async fn list_impl(state: &AppState, params: ReviewsListParams) -> Result<CallToolResult, McpError> {
    if params.include_pending {
        state.admin.check(params.admin_password.as_deref())?;
    }

    let client = state.reviews()?;
    let reviews = if params.include_pending { client.list_all().await } else { client.list_approved().await }
        .map_err(Error::from)?;

    json_result(&ReviewsListOutput { count: reviews.len(), reviews })
}
