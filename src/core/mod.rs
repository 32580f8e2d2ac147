/// Core Server Framework Module
///
/// - server.rs: MCP transport (JSON-RPC, HTTP and STDIO) and the tool registry
/// - config.rs: Environment-driven server configuration
/// - error.rs: Tool and configuration error types
/// - logging.rs: Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;
pub mod server;
