/// Server Configuration
///
/// All settings come from environment variables and are read once at startup.
///
/// Environment Variables:
/// - SERVER_NAME: Name reported to clients (default: "healthcare-billing-codes")
/// - SERVER_VERSION: Version reported to clients (default: crate version)
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "stdio")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 3000)
/// - WORKER_THREADS: HTTP worker count (default: CPU count, capped at 16)

use std::str::FromStr;

use crate::core::error::ConfigError;

pub const DEFAULT_SERVER_NAME: &str = "healthcare-billing-codes";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
const MAX_DEFAULT_WORKERS: usize = 16;

/// How the server talks to its clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    Stdio,
    /// JSON-RPC over HTTP with Actix Web.
    Http,
    /// STDIO in a background task alongside the HTTP server.
    Both,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            "both" => Ok(TransportMode::Both),
            other => Err(ConfigError::InvalidTransport(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = lookup("SERVER_NAME").unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());
        let version =
            lookup("SERVER_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        let transport = match lookup("MCP_TRANSPORT_MODE") {
            Some(mode) => mode.parse()?,
            None => TransportMode::Stdio,
        };

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        // Defaults to CPU count but capped to avoid excessive context switching
        let workers = match lookup("WORKER_THREADS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidWorkers(raw)),
            },
            None => num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS),
        };

        Ok(Self {
            name,
            version,
            transport,
            host,
            port,
            workers,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
