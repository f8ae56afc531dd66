//! Typed arguments for each calendar operation.
//!
//! Callers send an open key/value bag. It is parsed into exactly one of these
//! shapes, and unknown keys are rejected rather than ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::CredentialMode;
use crate::error::ToolError;
use crate::tools::catalog::ToolId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListEventsArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_back: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_forward: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateEventArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_google_meet_details: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateEventArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_google_meet_details: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteEventArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

/// A non-empty string argument.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl ListEventsArgs {
    /// `maxResults` arrives as a JSON number; only whole, non-negative values fit.
    pub fn max_results(&self) -> Result<Option<u32>, ToolError> {
        match self.max_results {
            None => Ok(None),
            Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => Ok(Some(n as u32)),
            Some(n) => Err(ToolError::Input(format!(
                "maxResults must be a non-negative whole number, got {n}"
            ))),
        }
    }
}

impl CreateEventArgs {
    /// `(summary, start, end)`
    pub fn required(&self) -> Result<(&str, &str, &str), ToolError> {
        match (present(&self.summary), present(&self.start), present(&self.end)) {
            (Some(summary), Some(start), Some(end)) => Ok((summary, start, end)),
            _ => Err(ToolError::Input(
                "Missing required parameters: summary, start, and end are required".to_string(),
            )),
        }
    }
}

impl UpdateEventArgs {
    pub fn event_id(&self) -> Result<&str, ToolError> {
        present(&self.event_id).ok_or_else(|| ToolError::missing("eventId"))
    }
}

impl DeleteEventArgs {
    pub fn event_id(&self) -> Result<&str, ToolError> {
        present(&self.event_id).ok_or_else(|| ToolError::missing("eventId"))
    }
}

/// `accessToken` is required per call in `PerCall` mode and absent from the
/// schema, so refused, in `ProcessConfig` mode.
pub fn check_token_argument(token: &Option<String>, mode: CredentialMode) -> Result<(), ToolError> {
    match mode {
        CredentialMode::PerCall if present(token).is_none() => Err(ToolError::missing("accessToken")),
        CredentialMode::ProcessConfig if token.is_some() => Err(ToolError::Input(
            "accessToken is not accepted: the access token comes from process config".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Parse a JSON object into one operation's arguments.
pub fn from_object<T: DeserializeOwned>(id: ToolId, object: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(object))
        .map_err(|e| ToolError::Input(format!("Invalid arguments for {id}: {e}")))
}

/// Parse the raw input text a handler receives.
pub fn from_input<T: DeserializeOwned>(id: ToolId, input: &str) -> Result<T, ToolError> {
    match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(object)) => from_object(id, object),
        Ok(_) | Err(_) => Err(ToolError::Input("Invalid JSON input".to_string())),
    }
}

/// One validated tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    ListEvents(ListEventsArgs),
    CreateEvent(CreateEventArgs),
    UpdateEvent(UpdateEventArgs),
    DeleteEvent(DeleteEventArgs),
}

impl ToolCall {
    /// Shape-check `arguments` for `id`, then check required fields.
    pub fn parse(
        id: ToolId,
        arguments: &Map<String, Value>,
        mode: CredentialMode,
    ) -> Result<Self, ToolError> {
        let object = arguments.clone();
        let call = match id {
            ToolId::ListEvents => ToolCall::ListEvents(from_object(id, object)?),
            ToolId::CreateEvent => ToolCall::CreateEvent(from_object(id, object)?),
            ToolId::UpdateEvent => ToolCall::UpdateEvent(from_object(id, object)?),
            ToolId::DeleteEvent => ToolCall::DeleteEvent(from_object(id, object)?),
        };
        call.validate(mode)?;
        Ok(call)
    }

    fn validate(&self, mode: CredentialMode) -> Result<(), ToolError> {
        match self {
            ToolCall::ListEvents(args) => {
                args.max_results()?;
            }
            ToolCall::CreateEvent(args) => {
                args.required()?;
            }
            ToolCall::UpdateEvent(args) => {
                args.event_id()?;
            }
            ToolCall::DeleteEvent(args) => {
                args.event_id()?;
            }
        }
        check_token_argument(self.access_token(), mode)
    }

    fn access_token(&self) -> &Option<String> {
        match self {
            ToolCall::ListEvents(args) => &args.access_token,
            ToolCall::CreateEvent(args) => &args.access_token,
            ToolCall::UpdateEvent(args) => &args.access_token,
            ToolCall::DeleteEvent(args) => &args.access_token,
        }
    }

    /// The JSON text handed to the handler as its ambient input.
    pub fn to_input(&self) -> Result<String, ToolError> {
        let serialized = match self {
            ToolCall::ListEvents(args) => serde_json::to_string(args),
            ToolCall::CreateEvent(args) => serde_json::to_string(args),
            ToolCall::UpdateEvent(args) => serde_json::to_string(args),
            ToolCall::DeleteEvent(args) => serde_json::to_string(args),
        };
        serialized.map_err(|e| ToolError::Internal(format!("failed to serialize arguments: {e}")))
    }
}
