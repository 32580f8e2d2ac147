/// Argument extraction for tool handlers.
///
/// Handlers re-check required fields even though clients are expected to
/// validate against the advertised input schema.

use serde_json::Value;

use crate::core::error::ToolError;

/// Fetch a required, non-empty string argument.
///
/// Whitespace is content: `" "` is accepted as-is.
pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Err(ToolError::invalid_arguments(format!(
            "Missing required parameter: {}",
            key
        ))),
        Some(Value::String(s)) if s.is_empty() => Err(ToolError::invalid_arguments(
            format!("Parameter '{}' must not be empty", key),
        )),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ToolError::invalid_arguments(format!(
            "Parameter '{}' must be a string",
            key
        ))),
    }
}

/// Fetch an optional string argument. JSON null counts as absent.
pub fn optional_str<'a>(args: &'a Value, key: &str) -> Result<Option<&'a str>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ToolError::invalid_arguments(format!(
            "Parameter '{}' must be a string",
            key
        ))),
    }
}
