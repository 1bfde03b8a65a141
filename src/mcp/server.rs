//! MCP server implementation using rmcp over stdio transport.
//!
//! [`TrademarkServer`] is a thin `ServerHandler` over the shared
//! [`Dispatcher`]; the HTTP binding in [`super::http`] serves the same type.

use std::sync::Arc;

use rmcp::model::{
    Annotated, CallToolRequestParams, CallToolResult, Content, ListResourcesResult,
    ListToolsResult, PaginatedRequestParams, RawResource, ReadResourceRequestParams,
    ReadResourceResult, Resource, ResourceContents, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};

use crate::error::DispatchError;
use crate::render::RenderError;
use crate::types::{
    ContentBlock, ResourceContent, ResourceDescriptor, ToolDescriptor, ToolInvocation, ToolResult,
};

use super::dispatcher::Dispatcher;

// ---------------------------------------------------------------------------
// Server struct
// ---------------------------------------------------------------------------

/// Trademark MCP server.
///
/// Cloning is cheap: all clones share one [`Dispatcher`], which is what the
/// streamable HTTP service factory needs.
#[derive(Clone, Debug)]
pub struct TrademarkServer {
    dispatcher: Arc<Dispatcher>,
}

impl TrademarkServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

// ---------------------------------------------------------------------------
// Conversions to rmcp wire types
// ---------------------------------------------------------------------------

pub(crate) fn to_rmcp_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool::new(
        descriptor.name.clone(),
        descriptor.description.clone(),
        Arc::new(descriptor.input_schema.to_json_object()),
    )
}

pub(crate) fn to_rmcp_resource(descriptor: &ResourceDescriptor) -> Resource {
    Annotated::new(
        RawResource {
            uri: descriptor.uri.clone(),
            name: descriptor.name.clone(),
            title: None,
            description: Some(descriptor.description.clone()),
            mime_type: Some(descriptor.mime_type.clone()),
            size: None,
            icons: None,
            meta: None,
        },
        None,
    )
}

pub(crate) fn to_resource_contents(content: ResourceContent) -> ResourceContents {
    let mut contents = ResourceContents::text(content.text, content.uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(content.mime_type);
    }
    contents
}

pub(crate) fn to_call_tool_result(result: ToolResult) -> CallToolResult {
    let content: Vec<Content> = result
        .content
        .into_iter()
        .map(|block| match block {
            ContentBlock::Text { text } => Content::text(text),
            ContentBlock::Resource { resource } => Content::resource(to_resource_contents(resource)),
        })
        .collect();
    let mut out = if result.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    };
    out.structured_content = result.meta;
    out
}

fn to_mcp_error(error: DispatchError) -> McpError {
    match error {
        DispatchError::UnknownResource(uri) | DispatchError::Render(RenderError::NotFound(uri)) => {
            McpError::resource_not_found(format!("Unknown resource: {uri}"), None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}

// ---------------------------------------------------------------------------
// ServerHandler impl
// ---------------------------------------------------------------------------

impl ServerHandler for TrademarkServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Trademark registration assistant. Use check or search_trademark to test a \
                 name's availability, get_trademark_pricing for per-country costs, \
                 createFiling to place a filing order, and getFiling or \
                 check_search_status to follow up on existing orders."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: rmcp::model::Implementation {
                name: "trademark-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.dispatcher.list_tools().iter().map(to_rmcp_tool).collect();
        std::future::ready(Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools,
        }))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let invocation = ToolInvocation::new(
            request.name.to_string(),
            request.arguments.unwrap_or_default(),
        );
        let result = self.dispatcher.call_tool(invocation).await;
        Ok(to_call_tool_result(result))
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let resources = self
            .dispatcher
            .list_resources()
            .iter()
            .map(to_rmcp_resource)
            .collect();
        std::future::ready(Ok(ListResourcesResult {
            meta: None,
            next_cursor: None,
            resources,
        }))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        let result = self
            .dispatcher
            .read_resource(&request.uri)
            .map(|read| ReadResourceResult {
                contents: read.contents.into_iter().map(to_resource_contents).collect(),
            })
            .map_err(to_mcp_error);
        std::future::ready(result)
    }
}

// ---------------------------------------------------------------------------
// Public entry point: run the MCP server over stdio
// ---------------------------------------------------------------------------

/// Start the MCP server on stdin/stdout.
///
/// This blocks until the client disconnects.
pub async fn run_server(server: TrademarkServer) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        tools = server.dispatcher().list_tools().len(),
        resources = server.dispatcher().list_resources().len(),
        "serving MCP over stdio"
    );
    let transport = rmcp::transport::io::stdio();
    let running = server.serve(transport).await.inspect_err(|e| {
        tracing::error!("MCP server error: {}", e);
    })?;
    let _ = running.waiting().await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
