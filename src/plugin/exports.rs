//! Plugin entry points: `call` and `describe`.
//!
//! Both talk to whoever is bound to the host's input and output at top level,
//! the same way a sandboxed plugin talks to its runtime.

use serde_json::json;

use crate::calendar::handlers::handler_for;
use crate::tools::catalog::ToolId;
use crate::tools::router::Dispatcher;
use crate::tools::schema::{self, SchemaDialect};
use crate::tools::{ToolInvocationRequest, ToolInvocationResult};

/// Read a `{toolId, arguments}` request, dispatch it, write the result.
///
/// Returns 0 whenever a result was produced (including error results), and 1
/// only when the request itself couldn't be read.
pub fn call(dispatcher: &Dispatcher) -> i32 {
    let host = dispatcher.host();
    let request = host
        .input_string()
        .map_err(|e| e.to_string())
        .and_then(|input| {
            serde_json::from_str::<ToolInvocationRequest>(&input).map_err(|e| e.to_string())
        });

    let (result, status) = match request {
        Ok(request) => (dispatcher.dispatch_blocking(&request), 0),
        Err(e) => {
            tracing::warn!(error = %e, "malformed plugin call");
            (ToolInvocationResult::error(format!("Invalid request: {e}")), 1)
        }
    };

    match serde_json::to_string(&result) {
        Ok(text) => {
            host.output_string(&text);
            status
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to encode tool result");
            1
        }
    }
}

/// Run one operation's handler directly against the top-level channel: the
/// handler reads its own arguments and writes its own blob.
pub fn invoke(dispatcher: &Dispatcher, id: ToolId) -> i32 {
    let host = dispatcher.host();
    let _window = host.lock_window();
    tracing::debug!(tool = %id, "direct handler export");
    handler_for(id)(host)
}

/// Write `{tools: [...]}` in the requested dialect.
pub fn describe(dispatcher: &Dispatcher, dialect: SchemaDialect) -> i32 {
    let tools = schema::render(dialect, dispatcher.credential_mode());
    dispatcher
        .host()
        .output_string(&json!({ "tools": tools }).to_string());
    0
}
