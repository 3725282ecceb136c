//! Structured errors for the kiteshell server.
//!
//! Errors from the cache and interceptor arrive as `kiteshell_core::Error`;
//! these cover failures that only exist at the tool surface.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the kiteshell server.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Store URL or key not configured.
    #[error("CONFIG_ERROR: store tools unavailable: {0}")]
    StoreUnavailable(String),

    /// Tool output could not be encoded.
    #[error("INTERNAL: failed to serialize output: {0}")]
    Serialize(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::StoreUnavailable(_) => -32010,
            ToolError::Serialize(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
