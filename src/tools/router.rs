use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use super::catalog::ToolId;
use super::classify::classify_outcome;
use super::{ToolInvocationRequest, ToolInvocationResult};
use crate::calendar::args::ToolCall;
use crate::calendar::handlers::{HandlerFn, handler_for};
use crate::config::CredentialMode;
use crate::error::ToolError;
use crate::plugin::host::PluginHost;
use crate::plugin::shim;

/// Routes tool calls to their handlers through the channel shim.
///
/// The host's ambient channel is shared by every dispatch; the shim holds the
/// host's window lock for the whole install/run/restore sequence, so
/// dispatches through one host never interleave.
pub struct Dispatcher {
    host: Arc<PluginHost>,
    handlers: HashMap<ToolId, HandlerFn>,
}

impl Dispatcher {
    pub fn new(host: Arc<PluginHost>) -> Self {
        Self::with_handlers(host, ToolId::ALL.map(|id| (id, handler_for(id))))
    }

    pub fn with_handlers(
        host: Arc<PluginHost>,
        handlers: impl IntoIterator<Item = (ToolId, HandlerFn)>,
    ) -> Self {
        Self {
            host,
            handlers: handlers.into_iter().collect(),
        }
    }

    pub fn host(&self) -> &PluginHost {
        &self.host
    }

    pub fn credential_mode(&self) -> CredentialMode {
        self.host.settings().credential_mode
    }

    /// Dispatch on the current thread. Blocks for the duration of the
    /// handler's outbound call. Never panics and never returns a raw error.
    pub fn dispatch_blocking(&self, request: &ToolInvocationRequest) -> ToolInvocationResult {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.try_dispatch(request)))
            .unwrap_or_else(|payload| Err(ToolError::Internal(panic_message(payload.as_ref()))));

        match outcome {
            Ok(result) => {
                if let ToolInvocationResult::Error { error } = &result {
                    tracing::debug!(tool = %request.tool_id, %error, "tool returned an error");
                }
                result
            }
            Err(err) => {
                match &err {
                    ToolError::Internal(_) => {
                        tracing::error!(tool = %request.tool_id, error = %err, "dispatch failed")
                    }
                    _ => tracing::warn!(tool = %request.tool_id, error = %err, "tool call rejected"),
                }
                ToolInvocationResult::error(err.to_string())
            }
        }
    }

    /// Dispatch from async code. The handler runs on the blocking pool so its
    /// outbound call doesn't stall the runtime.
    pub async fn dispatch(self: &Arc<Self>, request: ToolInvocationRequest) -> ToolInvocationResult {
        let dispatcher = Arc::clone(self);
        let tool_id = request.tool_id.clone();
        match tokio::task::spawn_blocking(move || dispatcher.dispatch_blocking(&request)).await {
            Ok(result) => result,
            Err(join_err) => {
                let err = ToolError::Internal(join_err.to_string());
                tracing::error!(tool = %tool_id, error = %err, "dispatch task failed");
                ToolInvocationResult::error(err.to_string())
            }
        }
    }

    fn try_dispatch(&self, request: &ToolInvocationRequest) -> Result<ToolInvocationResult, ToolError> {
        let (id, handler) = request
            .tool_id
            .parse::<ToolId>()
            .ok()
            .and_then(|id| self.handlers.get(&id).map(|h| (id, *h)))
            .ok_or_else(|| ToolError::UnknownTool(request.tool_id.clone()))?;

        let call = ToolCall::parse(id, &request.arguments, self.credential_mode())?;
        let input = call.to_input()?;

        tracing::debug!(tool = %id, "dispatching");
        let outcome = shim::with_captured_channel(&self.host, &input, handler);
        Ok(classify_outcome(outcome))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
