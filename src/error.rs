/// Errors surfaced by a tool dispatch. Every variant ends up as an error-state
/// `ToolInvocationResult`; none of them escape to the caller as a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// Missing or malformed arguments, detected before any outbound call.
    #[error("{0}")]
    Input(String),

    /// Non-2xx response from the calendar API.
    #[error("Failed to {op}: {body}")]
    Remote {
        op: &'static str,
        status: u16,
        body: String,
    },

    /// The request never produced a response.
    #[error("Failed to {op}: {message}")]
    Transport { op: &'static str, message: String },

    /// 2xx response with a body we couldn't read.
    #[error("Invalid response from calendar API")]
    ResponseParse,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn missing(names: &str) -> Self {
        ToolError::Input(format!("Missing required parameter: {names}"))
    }
}

/// Failure reading from the ambient input channel.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("no input bound to the host")]
    NoInput,
}

/// Failure in the outbound HTTP capability before a response was received.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("request timed out")]
    Timeout,

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

/// Invalid value in the process environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_names_operation_and_body() {
        let err = ToolError::Remote {
            op: "create event",
            status: 403,
            body: r#"{"error":{"message":"forbidden"}}"#.to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to create event: "));
        assert!(msg.contains("forbidden"));
    }

    #[test]
    fn test_unknown_tool_message() {
        assert_eq!(
            ToolError::UnknownTool("nope".into()).to_string(),
            "Unknown tool: nope"
        );
    }

    #[test]
    fn test_missing_parameter_message() {
        assert_eq!(
            ToolError::missing("eventId").to_string(),
            "Missing required parameter: eventId"
        );
    }
}
