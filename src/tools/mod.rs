pub mod catalog;
pub mod classify;
pub mod router;
pub mod schema;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One incoming tool call: `{"toolId": "...", "arguments": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocationRequest {
    pub tool_id: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocationRequest {
    pub fn new(tool_id: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_id: tool_id.into(),
            arguments,
        }
    }
}

/// Normalized outcome of a dispatch.
///
/// Serialized as `{"state":"success","result":...}` or
/// `{"state":"error","error":"..."}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ToolInvocationResult {
    Success { result: Value },
    Error { error: String },
}

impl ToolInvocationResult {
    pub fn error(message: impl Into<String>) -> Self {
        ToolInvocationResult::Error {
            error: message.into(),
        }
    }

    #[cfg(test)]
    pub fn is_error(&self) -> bool {
        matches!(self, ToolInvocationResult::Error { .. })
    }
}
