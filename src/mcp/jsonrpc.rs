//! JSON-RPC 2.0 framing shared by the HTTP and stdio transports.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const VERSION: &str = "2.0";

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    pub version: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Requests without an id are notifications and get no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    pub fn has_supported_version(&self) -> bool {
        self.version == VERSION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// Exactly one of `result` or `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(RpcError),
}

/// Outgoing message. `id` is `null` when the request's id couldn't be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(flatten)]
    outcome: Outcome,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: VERSION,
            id: id.unwrap_or(Value::Null),
            outcome: Outcome::Result(result),
        }
    }

    pub fn failure(id: Option<Value>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: VERSION,
            id: id.unwrap_or(Value::Null),
            outcome: Outcome::Error(RpcError {
                code: code.code(),
                message: message.into(),
            }),
        }
    }

    pub fn parse_error(detail: impl fmt::Display) -> Self {
        Self::failure(None, ErrorCode::ParseError, format!("Parse error: {detail}"))
    }

    pub fn invalid_request(id: Option<Value>, version: &str) -> Self {
        Self::failure(
            id,
            ErrorCode::InvalidRequest,
            format!("Unsupported jsonrpc version '{version}'"),
        )
    }

    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::failure(id, ErrorCode::MethodNotFound, format!("Method not found: {method}"))
    }

    pub fn invalid_params(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::failure(id, ErrorCode::InvalidParams, message)
    }

    #[cfg(test)]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
