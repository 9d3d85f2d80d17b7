//! MCP surface.
//!
//! request  -> tool name + JSON arguments -> typed `Operation`
//! registry -> static tool table (names, descriptions, input schemas)
//! handlers -> per-family `p4` logic
//! dispatch -> decode + run + wrap into an `Envelope`
//! envelope -> uniform text response, converted to `CallToolResult`
//!
//! `PerforceServer` adapts the dispatcher to rmcp's `ServerHandler` and is
//! served over stdio.

use anyhow::{Context, Result};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use tracing::info;

use crate::p4::CommandRunner;

pub mod dispatch;
pub mod envelope;
pub mod handlers;
pub mod registry;
pub mod request;

pub use dispatch::Dispatcher;

const INSTRUCTIONS: &str = "Perforce (p4) operations as tools: open, revert, sync and diff files; \
create and submit changelists; manage client workspaces and streams. Every tool except \
mcp_perforce_version accepts an optional `path` used as the working directory for p4.";

pub struct PerforceServer<R> {
    dispatcher: Dispatcher<R>,
}

impl<R: CommandRunner> PerforceServer<R> {
    pub fn new(dispatcher: Dispatcher<R>) -> Self {
        Self { dispatcher }
    }
}

impl<R: CommandRunner> ServerHandler for PerforceServer<R> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(registry::tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let envelope = self
            .dispatcher
            .dispatch(&request.name, request.arguments)
            .await;
        Ok(envelope.into())
    }
}

/// Serve `dispatcher` over stdin/stdout until the client disconnects.
pub async fn serve_stdio<R: CommandRunner>(dispatcher: Dispatcher<R>) -> Result<()> {
    info!(tools = registry::TOOLS.len(), "starting MCP server on stdio");
    let service = PerforceServer::new(dispatcher)
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to initialize MCP session on stdio")?;
    let reason = service
        .waiting()
        .await
        .context("MCP session ended abnormally")?;
    info!(?reason, "MCP session closed");
    Ok(())
}
