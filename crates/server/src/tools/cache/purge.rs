//! cache_purge tool implementation.
//!
//! Deletes a whole partition, one entry from a partition, or one entry from
//! every partition that holds it.

use kiteshell_client::fetch::{Request, parse_origin, resolve};
use kiteshell_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::{json_result, parse_method};

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Partition to delete, or to delete `url` from.
    #[serde(default)]
    pub partition: Option<String>,

    /// Request URL whose entry should be removed.
    #[serde(default)]
    pub url: Option<String>,

    /// HTTP method of the cached request (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Partitions deleted outright.
    pub deleted_partitions: Vec<String>,
    /// Entries deleted individually.
    pub deleted_entries: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(state: &AppState, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let cache = state.registration.cache();
    let mut output = CachePurgeOutput::default();

    match (params.partition, params.url) {
        (None, None) => {
            return Err(Error::InvalidInput("At least one of partition or url must be specified".to_string()).into());
        }
        (Some(partition), None) => {
            if cache.delete_partition(&partition).await? {
                output.deleted_partitions.push(partition);
            }
        }
        (partition, Some(url)) => {
            let method = parse_method(params.method.as_deref())?;
            let origin = parse_origin(&state.config.origin).map_err(Error::from)?;
            let key = Request::new(method, resolve(&origin, &url).map_err(Error::from)?).cache_key();

            let targets = match partition {
                Some(partition) => vec![partition],
                None => cache.partition_names().await?,
            };
            for target in targets {
                if cache.delete_entry(&target, &key).await? {
                    output.deleted_entries += 1;
                }
            }
        }
    }

    tracing::info!(
        partitions = output.deleted_partitions.len(),
        entries = output.deleted_entries,
        "cache purged"
    );
    json_result(&output)
}
