//! review_submit tool implementation.

use kiteshell_client::NewReview;
use kiteshell_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the review_submit tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReviewSubmitParams {
    pub name: String,
    /// Stars from 1 to 5 (default: 5).
    #[serde(default)]
    pub rating: Option<u8>,
    pub comment: String,
    /// City or region the reviewer comes from.
    pub location: String,
    /// ISO 3166-1 alpha-2 country code, e.g. "FR".
    pub countrycode: String,
    /// Flight date, YYYY-MM-DD (default: today).
    #[serde(default)]
    pub date: Option<String>,
}

impl From<ReviewSubmitParams> for NewReview {
    fn from(params: ReviewSubmitParams) -> Self {
        Self {
            name: params.name,
            rating: params.rating,
            comment: params.comment,
            location: params.location,
            countrycode: params.countrycode,
            date: params.date,
        }
    }
}

/// Implementation of the review_submit tool.
pub async fn submit_impl(state: &AppState, params: ReviewSubmitParams) -> Result<CallToolResult, McpError> {
    let review = NewReview::from(params);
    review.validate().map_err(Error::from)?;

    let stored = state.reviews()?.submit(review).await.map_err(Error::from)?;
    json_result(&stored)
}
