//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::AppState;
use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl};
use crate::tools::reviews::{
    ReviewModerateParams, ReviewSubmitParams, ReviewsListParams, list_impl, moderate_impl, submit_impl,
};
use crate::tools::shell::{ShellFetchParams, ShellRegisterParams, fetch_impl, register_impl, status_impl};
use crate::tools::visitors::{VisitorTrackParams, track_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for kiteshell.
#[derive(Clone)]
pub struct KiteShellServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl KiteShellServer {
    /// Create a new server handler.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Fetch a URL through the offline shell. Static assets are served cache-first, API calls network-first, content stale-while-revalidate. Reports whether the response came from cache, network, offline fallback or pass-through."
    )]
    async fn shell_fetch(&self, params: Parameters<ShellFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state, params.0).await
    }

    #[tool(
        description = "Install and activate a new shell version. Precaches the asset manifest, then deletes partitions of older versions. Pass new partition tags to invalidate previously cached content."
    )]
    async fn shell_register(&self, params: Parameters<ShellRegisterParams>) -> Result<CallToolResult, McpError> {
        register_impl(&self.state, params.0).await
    }

    #[tool(description = "Show the active shell version, its lifecycle state, and every cache partition with its entry count.")]
    async fn shell_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.state).await
    }

    #[tool(description = "Look up the cached response for a URL, across all partitions or in one partition.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.state, params.0).await
    }

    #[tool(description = "Delete a cache partition, or remove one URL from a partition or from all partitions.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.state, params.0).await
    }

    #[tool(description = "List customer reviews, newest first. Unapproved reviews are included only with the admin password.")]
    async fn reviews_list(&self, params: Parameters<ReviewsListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.state, params.0).await
    }

    #[tool(description = "Submit a customer review. Requires name, location, country code and comment; rating 1-5.")]
    async fn review_submit(&self, params: Parameters<ReviewSubmitParams>) -> Result<CallToolResult, McpError> {
        submit_impl(&self.state, params.0).await
    }

    #[tool(description = "Approve, unapprove or delete a review. Requires the admin password.")]
    async fn review_moderate(&self, params: Parameters<ReviewModerateParams>) -> Result<CallToolResult, McpError> {
        moderate_impl(&self.state, params.0).await
    }

    #[tool(description = "Count a site visit and return the visitor total. With read_only, report the total without counting.")]
    async fn visitor_track(&self, params: Parameters<VisitorTrackParams>) -> Result<CallToolResult, McpError> {
        track_impl(&self.state, params.0).await
    }
}

impl ServerHandler for KiteShellServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "kiteshell".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Offline-first shell for bakardykite.com: fetch through the cache strategies, manage versions, moderate reviews, count visitors."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
