//! MCP tool implementations.
//!
//! This module contains all tools exposed by the kiteshell server.

pub mod cache;
pub mod reviews;
pub mod shell;
pub mod visitors;

#[cfg(test)]
pub(crate) mod testing;

use kiteshell_client::fetch::Method;
use kiteshell_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

/// Encode a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::Serialize(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Parse an optional HTTP method name, defaulting to GET.
pub(crate) fn parse_method(method: Option<&str>) -> Result<Method, Error> {
    match method.map(str::trim) {
        None | Some("") => Ok(Method::GET),
        Some(name) => Method::from_bytes(name.to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid HTTP method: {name}"))),
    }
}

/// The wire name of a serde unit enum, e.g. `cache-first`.
pub(crate) fn label<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiteshell_client::Policy;

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method(None).unwrap(), Method::GET);
        assert_eq!(parse_method(Some("post")).unwrap(), Method::POST);
        assert!(parse_method(Some("GE T")).is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(label(&Policy::StaleWhileRevalidate), "stale-while-revalidate");
    }
}
