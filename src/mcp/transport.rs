use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use super::handlers;
use super::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use super::session::SessionManager;
use crate::tools::router::Dispatcher;

pub const SESSION_HEADER: &str = "mcp-session-id";
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state for the MCP server.
#[derive(Clone)]
pub struct McpState {
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: SessionManager,
}

/// Handle POST /mcp: receive JSON-RPC messages from the client.
pub async fn handle_post(State(state): State<McpState>, request: Request<Body>) -> Response {
    let body = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "Request body too large").into_response();
        }
    };

    let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            return Json(JsonRpcResponse::parse_error(e)).into_response();
        }
    };

    // Handle notifications (no id): return 202 Accepted
    if rpc_request.is_notification() {
        // Still process the notification
        handlers::handle_request(&state.dispatcher, &rpc_request).await;
        return (StatusCode::ACCEPTED, "").into_response();
    }

    let response = handlers::handle_request(&state.dispatcher, &rpc_request).await;
    let mut http_response = Json(response).into_response();

    // A successful initialize opens a session.
    if rpc_request.method == "initialize" {
        let client_name = rpc_request
            .params
            .pointer("/clientInfo/name")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        let session_id = state.sessions.create_session(client_name);
        tracing::info!(%session_id, client = client_name, "MCP session opened");
        if let Ok(value) = HeaderValue::from_str(&session_id) {
            http_response.headers_mut().insert(SESSION_HEADER, value);
        }
    }

    http_response
}

/// Handle GET /mcp: SSE stream for server-initiated messages.
/// This server never pushes, so the stream is empty.
pub async fn handle_get() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::empty(),
    )
        .into_response()
}

/// Handle DELETE /mcp: terminate a session.
pub async fn handle_delete(State(state): State<McpState>, headers: HeaderMap) -> Response {
    let Some(session_id) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) else {
        return (StatusCode::BAD_REQUEST, "Missing Mcp-Session-Id header").into_response();
    };
    match state.sessions.remove_session(session_id) {
        Some(info) => {
            let age_secs = (Utc::now() - info.created_at).num_seconds();
            tracing::info!(%session_id, client = %info.client_name, age_secs, "MCP session closed");
            (StatusCode::OK, "Session terminated").into_response()
        }
        None => (StatusCode::NOT_FOUND, "Unknown session").into_response(),
    }
}
