/// MCP Server Implementation
///
/// This module contains the MCP transport layer:
/// - JSON-RPC 2.0 request/response structures
/// - The `ToolService` seam and the registry implementing it
/// - A single dispatcher shared by both transports
/// - HTTP server setup with Actix Web
/// - STDIO server implementation for line-based communication

use actix_web::{
    App, HttpResponse, HttpServer,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::core::config::ServerConfig;
use crate::core::error::{INVALID_PARAMS, ToolError};
use crate::tools;

const JSONRPC_VERSION: &str = "2.0";
const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;

/// Text returned for a tool name that is not registered.
pub const UNKNOWN_TOOL: &str = "Unknown tool";

/// Server metadata reported in MCP initialize responses.
///
/// Shared by every HTTP worker and by the STDIO loop.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server name as reported in `serverInfo.name`
    pub server_name: String,
    /// Server version as reported in `serverInfo.version`
    pub server_version: String,
}

impl From<&ServerConfig> for AppState {
    fn from(config: &ServerConfig) -> Self {
        Self {
            server_name: config.name.clone(),
            server_version: config.version.clone(),
        }
    }
}

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// `id` is None for notifications, which never receive a response.
#[derive(Deserialize, Debug)]
pub struct MCPRequest {
    /// JSON-RPC version identifier, must be "2.0"
    #[allow(dead_code)]
    jsonrpc: String,
    /// Request ID for correlating responses. None indicates a notification.
    id: Option<Value>,
    /// MCP method name (e.g., "initialize", "tools/list", "tools/call")
    method: String,
    /// Method-specific parameters as JSON value
    params: Option<Value>,
}

/// JSON-RPC 2.0 response structure. Exactly one of `result` or `error` is set.
#[derive(Serialize, Debug)]
pub struct MCPResponse {
    /// JSON-RPC version identifier, always "2.0"
    jsonrpc: &'static str,
    /// Request ID from the original request
    id: Option<Value>,
    /// Response result, present when the request succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error information, present when the request failed
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MCPError>,
}

impl MCPResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(MCPError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Debug)]
pub struct MCPError {
    /// JSON-RPC error code (e.g., -32602 for invalid params)
    code: i32,
    /// Human-readable error message
    message: String,
    /// Optional additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// MCP tool definition, serialized as-is in `tools/list`.
#[derive(Serialize, Debug, Clone)]
pub struct MCPTool {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// One text block of a tool result.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl TextContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
        }
    }
}

/// Tool handler function type definition.
///
/// Handlers take the JSON argument object and return the text blocks to send
/// back. They must be Send + Sync to run on any HTTP worker thread.
pub type ToolHandler = Box<dyn Fn(Value) -> Result<Vec<TextContent>, ToolError> + Send + Sync>;

/// What a transport needs from the tool layer.
pub trait ToolService: Send + Sync {
    /// Tool definitions in registration order.
    fn list_tools(&self) -> &[MCPTool];

    /// Run a tool by name. Unknown names yield a normal result, not an error.
    fn call_tool(&self, name: &str, arguments: Value) -> Result<Vec<TextContent>, ToolError>;
}

/// Registry of available MCP tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<MCPTool>,
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool definition together with its handler.
    pub fn register(&mut self, tool: MCPTool, handler: ToolHandler) {
        let name = tool.name.clone();
        self.tools.push(tool);
        self.handlers.insert(name, handler);
    }
}

impl ToolService for ToolRegistry {
    fn list_tools(&self) -> &[MCPTool] {
        &self.tools
    }

    fn call_tool(&self, name: &str, arguments: Value) -> Result<Vec<TextContent>, ToolError> {
        match self.handlers.get(name) {
            Some(handler) => {
                debug!(tool = name, "calling tool");
                handler(arguments)
            }
            None => {
                warn!(tool = name, "unknown tool requested");
                Ok(vec![TextContent::text(UNKNOWN_TOOL)])
            }
        }
    }
}

/// Initialize and register all tools against the built-in catalog.
pub fn initialize_tools() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    let catalog = Catalog::builtin();

    tools::lookup::register(&mut registry, catalog);
    tools::search::register(&mut registry, catalog);

    Arc::new(registry)
}

/// Route one JSON-RPC request to its method handler.
///
/// # Arguments
/// * `state` - Server metadata for the initialize response
/// * `service` - Tool layer answering `tools/list` and `tools/call`
/// * `req` - The parsed request
///
/// # Returns
/// The response to send back, or None for notifications (requests without an id).
pub fn dispatch(state: &AppState, service: &dyn ToolService, req: MCPRequest) -> Option<MCPResponse> {
    let Some(id) = req.id else {
        debug!(method = %req.method, "notification received");
        return None;
    };
    let id = Some(id);

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(state, id),
        "ping" => MCPResponse::success(id, serde_json::json!({})),
        "tools/list" => handle_tools_list(service, id),
        "tools/call" => handle_tools_call(service, id, req.params),
        other => {
            warn!(method = other, "method not found");
            MCPResponse::failure(id, METHOD_NOT_FOUND, format!("Method not found: {}", other))
        }
    };
    Some(response)
}

/// Handle MCP initialize method.
fn handle_initialize(state: &AppState, id: Option<Value>) -> MCPResponse {
    MCPResponse::success(
        id,
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": state.server_name,
                "version": state.server_version
            }
        }),
    )
}

fn handle_tools_list(service: &dyn ToolService, id: Option<Value>) -> MCPResponse {
    MCPResponse::success(id, serde_json::json!({ "tools": service.list_tools() }))
}

/// Handle MCP tools/call method.
///
/// Argument errors become JSON-RPC "Invalid params" errors; everything else,
/// including unknown tools, is a successful content response.
fn handle_tools_call(service: &dyn ToolService, id: Option<Value>, params: Option<Value>) -> MCPResponse {
    let Some(params) = params else {
        return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params");
    };

    let tool_name = params.get("name").and_then(Value::as_str).unwrap_or("");
    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));

    match service.call_tool(tool_name, arguments) {
        Ok(content) => MCPResponse::success(
            id,
            serde_json::json!({
                "content": content,
                "isError": false
            }),
        ),
        Err(err) => {
            warn!(tool = tool_name, error = %err, "tool call rejected");
            MCPResponse::failure(id, err.rpc_code(), err.to_string())
        }
    }
}

/// Health check endpoint handler.
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "billing-codes-mcp"
    }))
}

/// MCP JSON-RPC request handler for HTTP mode.
///
/// Notifications are acknowledged with 202 and an empty body.
async fn mcp_handler(
    state: web::Data<AppState>,
    service: web::Data<dyn ToolService>,
    counter: web::Data<AtomicU64>,
    req: web::Json<MCPRequest>,
) -> HttpResponse {
    // Only atomicity is needed, not ordering with other operations
    counter.fetch_add(1, Ordering::Relaxed);

    match dispatch(&state, service.get_ref(), req.into_inner()) {
        Some(response) => HttpResponse::Ok().json(response),
        None => HttpResponse::Accepted().finish(),
    }
}

/// Total number of JSON-RPC requests processed since start.
async fn metrics_handler(counter: web::Data<AtomicU64>) -> HttpResponse {
    let count = counter.load(Ordering::Relaxed);
    HttpResponse::Ok().json(serde_json::json!({
        "requests_total": count,
        "status": "ok"
    }))
}

/// Server-Sent Events endpoint for tools discovery.
///
/// Emits a single event carrying the tool list and count.
async fn sse_tools_discovery(service: web::Data<dyn ToolService>) -> HttpResponse {
    use actix_web::http::header;

    let tools = service.list_tools();
    let tools_data = serde_json::json!({
        "tools": tools,
        "count": tools.len()
    });

    let sse_data = format!(
        "data: {}\n\n",
        serde_json::to_string(&tools_data).unwrap_or_else(|_| "{}".to_string())
    );

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(header::CacheControl(vec![
            header::CacheDirective::NoCache,
            header::CacheDirective::NoStore,
            header::CacheDirective::MustRevalidate,
        ]))
        // Disable nginx buffering
        .insert_header(("x-accel-buffering", "no"))
        .body(sse_data)
}

/// Route table shared by the HTTP server and its tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/sse", web::get().to(sse_tools_discovery))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// Run the MCP server in HTTP mode.
///
/// # Configuration
/// - Worker threads: from `ServerConfig::workers`
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive and request timeout: 30 seconds
/// - Disconnect timeout: 2 seconds
/// - Shutdown timeout: 10 seconds
///
/// # Arguments
/// * `config` - Bind address, worker count and server metadata
/// * `service` - Tool layer shared by every worker
pub async fn run_server_http(config: ServerConfig, service: Arc<dyn ToolService>) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = config.bind_addr();
    let app_state = web::Data::new(AppState::from(&config));
    let service = web::Data::from(service);
    let request_count = web::Data::new(AtomicU64::new(0));

    info!(
        name = %config.name,
        version = %config.version,
        bind = %bind_addr,
        workers = config.workers,
        tools = service.list_tools().len(),
        "MCP server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(service.clone())
            .app_data(request_count.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block")),
            )
            // %r = request line, %s = status, %D = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(routes)
    })
    .workers(config.workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the MCP server in STDIO mode.
///
/// Reads JSON-RPC requests line-by-line from stdin and writes one response
/// line per request to stdout. Logs go to stderr.
///
/// # Arguments
/// * `config` - Server metadata for the initialize response
/// * `service` - Tool layer answering tool requests
///
/// Returns when stdin reaches EOF.
pub async fn run_server_stdio(config: ServerConfig, service: Arc<dyn ToolService>) -> std::io::Result<()> {
    info!(
        name = %config.name,
        version = %config.version,
        tools = service.list_tools().len(),
        "MCP server starting (STDIO mode)"
    );

    let app_state = AppState::from(&config);
    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());

    serve_lines(&app_state, &*service, stdin, stdout).await
}

/// Line-based JSON-RPC loop over any async reader/writer pair.
///
/// - Skips blank lines and notifications
/// - Answers unparsable requests with a parse error when an id can be recovered
/// - Flushes after each response
///
/// # Arguments
/// * `reader` - Source of newline-delimited requests
/// * `writer` - Sink for newline-delimited responses
pub async fn serve_lines<R, W>(
    state: &AppState,
    service: &dyn ToolService,
    reader: R,
    mut writer: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<MCPRequest>(&line) {
            Ok(req) => match dispatch(state, service, req) {
                Some(response) => response,
                None => continue,
            },
            Err(err) => {
                warn!(error = %err, "failed to parse JSON-RPC request");
                let id = serde_json::from_str::<Value>(&line)
                    .ok()
                    .and_then(|partial| partial.get("id").cloned());
                match id {
                    Some(id) => MCPResponse::failure(Some(id), PARSE_ERROR, format!("Parse error: {}", err)),
                    None => continue,
                }
            }
        };

        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize response");
                continue;
            }
        };

        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}
