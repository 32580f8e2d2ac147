/// Error Types
///
/// Tool errors are caller contract violations (bad or missing arguments).
/// Lookups that miss, empty searches and unknown tool names are not errors;
/// they produce a normal text result instead.

use thiserror::Error;

/// JSON-RPC 2.0 "Invalid params" error code.
pub const INVALID_PARAMS: i32 = -32602;

/// Failure raised by a tool handler before it touches the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// A required argument is missing, empty, or has the wrong JSON type.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// JSON-RPC error code reported to the client.
    pub fn rpc_code(&self) -> i32 {
        match self {
            ToolError::InvalidArguments(_) => INVALID_PARAMS,
        }
    }
}

/// Startup configuration errors. These abort the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid transport mode '{0}', must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),

    #[error("invalid PORT '{0}', expected an integer in 0..=65535")]
    InvalidPort(String),

    #[error("invalid WORKER_THREADS '{0}', expected a positive integer")]
    InvalidWorkers(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_arguments_maps_to_invalid_params() {
        let err = ToolError::invalid_arguments("Missing required parameter: code");
        assert_eq!(err.rpc_code(), -32602);
        assert_eq!(
            err.to_string(),
            "Invalid arguments: Missing required parameter: code"
        );
    }

    #[test]
    fn config_error_names_offending_value() {
        let err = ConfigError::InvalidTransport("grpc".into());
        assert!(err.to_string().contains("'grpc'"));
    }
}
