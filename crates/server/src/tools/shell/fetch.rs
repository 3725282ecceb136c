//! shell_fetch tool implementation.
//!
//! Dispatches one request through the active worker, the way a page load
//! would, and reports where the response came from.

use kiteshell_client::fetch::{Request, parse_origin, resolve};
use kiteshell_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::{json_result, label, parse_method};

/// Parameters for the shell_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShellFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET). Anything but GET passes through.
    #[serde(default)]
    pub method: Option<String>,
}

/// Output from the shell_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShellFetchOutput {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    pub body_bytes: usize,
    /// One of cache, network, offline, passthrough.
    pub source: String,
    /// Policy that served the request; absent for pass-through.
    pub policy: Option<String>,
    /// Whether a background refresh was started.
    pub revalidating: bool,
}

/// Implementation of the shell_fetch tool.
pub async fn fetch_impl(state: &AppState, params: ShellFetchParams) -> Result<CallToolResult, McpError> {
    let method = parse_method(params.method.as_deref())?;
    let origin = parse_origin(&state.config.origin).map_err(Error::from)?;
    let url = resolve(&origin, &params.url).map_err(Error::from)?;

    let outcome = state.registration.handle(Request::new(method, url)).await?;
    tracing::debug!(url = %outcome.response.url, source = ?outcome.source, "shell_fetch served");

    let output = ShellFetchOutput {
        url: outcome.response.url.clone(),
        status: outcome.response.status,
        headers: outcome.response.headers.clone(),
        body: outcome.response.body_text().into_owned(),
        body_bytes: outcome.response.body.len(),
        source: label(&outcome.source),
        policy: outcome.policy.as_ref().map(label),
        revalidating: outcome.revalidation.is_some(),
    };

    json_result(&output)
}
