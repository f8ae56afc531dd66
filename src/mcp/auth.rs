use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Middleware to require Bearer token authentication for MCP requests.
/// Only installed when `MCP_AUTH_TOKEN` is configured; this guards the MCP
/// endpoint itself and has nothing to do with the calendar credential.
pub async fn require_bearer_auth(
    State(expected): State<Arc<str>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized_response("Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized_response("Invalid authorization scheme, expected Bearer"))?;

    if token != &*expected {
        tracing::warn!("rejected MCP request with invalid bearer token");
        return Err(unauthorized_response("Invalid token"));
    }

    Ok(next.run(request).await)
}

fn unauthorized_response(msg: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer realm=\"gcal-mcp\"")],
        msg,
    )
        .into_response()
}
