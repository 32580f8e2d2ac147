/// Healthcare Billing Codes MCP Server
///
/// Exposes a reference catalog of CPT, ICD-10 and HCPCS codes to MCP clients
/// through two tools: `lookup_billing_code` and `search_codes_by_description`.
/// Configuration comes from environment variables (see `core::config`).

mod catalog;
mod core;
mod tools;

use std::sync::Arc;
use tracing::{error, info};

use crate::catalog::Catalog;
use crate::core::config::{ServerConfig, TransportMode};
use crate::core::logging;
use crate::core::server::{self, ToolService};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    logging::init_tracing();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let service: Arc<dyn ToolService> = server::initialize_tools();
    let catalog = Catalog::builtin();
    info!(
        codes = catalog.len(),
        systems = ?catalog.systems().collect::<Vec<_>>(),
        transport = ?config.transport,
        "billing code catalog loaded"
    );

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(config, service).await,
        TransportMode::Http => server::run_server_http(config, service).await,
        TransportMode::Both => {
            // STDIO in the background, HTTP in the foreground
            let stdio_config = config.clone();
            let stdio_service = Arc::clone(&service);
            let stdio_handle = tokio::spawn(async move {
                if let Err(err) = server::run_server_stdio(stdio_config, stdio_service).await {
                    error!(error = %err, "STDIO server error");
                }
            });

            let http_result = server::run_server_http(config, service).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();

            http_result
        }
    }
}
