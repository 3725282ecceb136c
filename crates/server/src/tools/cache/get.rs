//! cache_get tool implementation.
//!
//! Looks up the stored response for a request, across all partitions or in
//! one named partition.

use kiteshell_client::fetch::{Request, parse_origin, resolve};
use kiteshell_core::{CachedEntry, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::{json_result, parse_method};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method of the cached request (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Restrict the lookup to one partition.
    #[serde(default)]
    pub partition: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub key: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    pub body_bytes: usize,
    pub stored_at: String,
}

impl From<CachedEntry> for CacheGetOutput {
    fn from(entry: CachedEntry) -> Self {
        Self {
            body: String::from_utf8_lossy(&entry.body).into_owned(),
            body_bytes: entry.body.len(),
            key: entry.key,
            method: entry.method,
            url: entry.url,
            status: entry.status,
            headers: entry.headers,
            stored_at: entry.stored_at,
        }
    }
}

/// Implementation of the cache_get tool.
pub async fn get_impl(state: &AppState, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let method = parse_method(params.method.as_deref())?;
    let origin = parse_origin(&state.config.origin).map_err(Error::from)?;
    let url = resolve(&origin, &params.url).map_err(Error::from)?;
    let request = Request::new(method, url);
    let key = request.cache_key();

    let cache = state.registration.cache();
    let entry = match &params.partition {
        Some(partition) => cache.match_entry(partition, &key).await?,
        None => cache.match_any(&key).await?,
    };
    let entry = entry.ok_or_else(|| Error::CacheMiss(format!("{} {}", request.method, request.url)))?;

    json_result(&CacheGetOutput::from(entry))
}
