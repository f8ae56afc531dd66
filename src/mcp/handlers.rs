use std::sync::Arc;

use serde_json::{Map, Value, json};

use super::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::tools::router::Dispatcher;
use crate::tools::schema;
use crate::tools::{ToolInvocationRequest, ToolInvocationResult};

pub const PROTOCOL_VERSION: &str = "2025-03-26";
pub const SERVER_NAME: &str = "gcal-mcp";

/// Handle an MCP JSON-RPC request. Returns the response value to serialize,
/// or `Value::Null` for notifications.
pub async fn handle_request(dispatcher: &Arc<Dispatcher>, request: &JsonRpcRequest) -> Value {
    if !request.has_supported_version() {
        return JsonRpcResponse::invalid_request(request.id.clone(), &request.version).to_value();
    }
    match request.method.as_str() {
        "initialize" => handle_initialize(request),
        "notifications/initialized" => {
            // Notification: no response needed
            Value::Null
        }
        "tools/list" => handle_tools_list(dispatcher, request),
        "tools/call" => handle_tools_call(dispatcher, request).await,
        "ping" => JsonRpcResponse::success(request.id.clone(), json!({})).to_value(),
        _ => JsonRpcResponse::method_not_found(request.id.clone(), &request.method).to_value(),
    }
}

/// Handle the MCP initialize request.
fn handle_initialize(request: &JsonRpcRequest) -> Value {
    let result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "instructions": "This MCP server manages events on a Google Calendar. Use list_events to see upcoming events, then create_event, update_event or delete_event to change them."
    });

    JsonRpcResponse::success(request.id.clone(), result).to_value()
}

/// Handle tools/list: return all tool definitions.
fn handle_tools_list(dispatcher: &Dispatcher, request: &JsonRpcRequest) -> Value {
    let tools = schema::render_mcp(dispatcher.credential_mode());
    JsonRpcResponse::success(request.id.clone(), json!({ "tools": tools })).to_value()
}

/// Handle tools/call: dispatch to the appropriate tool handler.
async fn handle_tools_call(dispatcher: &Arc<Dispatcher>, request: &JsonRpcRequest) -> Value {
    let Some(tool_name) = request.params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(request.id.clone(), "Missing 'name' in params")
            .to_value();
    };

    let arguments = match request.params.get("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return JsonRpcResponse::invalid_params(
                request.id.clone(),
                "'arguments' must be an object",
            )
            .to_value();
        }
    };

    let outcome = dispatcher
        .dispatch(ToolInvocationRequest::new(tool_name, arguments))
        .await;

    let content = match outcome {
        ToolInvocationResult::Success { result } => {
            let text = match &result {
                Value::String(s) => s.clone(),
                other => serde_json::to_string_pretty(other).unwrap_or_default(),
            };
            let mut content = json!({
                "content": [{"type": "text", "text": text}],
                "isError": false
            });
            if result.is_object() {
                content["structuredContent"] = result;
            }
            content
        }
        ToolInvocationResult::Error { error } => json!({
            "content": [{"type": "text", "text": error}],
            "isError": true
        }),
    };
    JsonRpcResponse::success(request.id.clone(), content).to_value()
}
