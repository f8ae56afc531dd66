mod auth;
mod handlers;
mod jsonrpc;
mod session;
pub mod stdio;
mod transport;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::tools::router::Dispatcher;
use session::SessionManager;
use transport::McpState;

/// Build the MCP router. When `auth_token` is set, every request must
/// present it as a bearer token.
pub fn router(dispatcher: Arc<Dispatcher>, auth_token: Option<String>) -> Router {
    let state = McpState {
        dispatcher,
        sessions: SessionManager::new(),
    };

    let routes = Router::new()
        .route("/mcp", post(transport::handle_post))
        .route("/mcp", get(transport::handle_get))
        .route("/mcp", delete(transport::handle_delete));

    let routes = match auth_token {
        Some(token) => routes.layer(middleware::from_fn_with_state(
            Arc::<str>::from(token),
            auth::require_bearer_auth,
        )),
        None => routes,
    };

    routes.layer(TraceLayer::new_for_http()).with_state(state)
}
