//! Projections of the tool catalog into the schema dialects callers expect.
//!
//! Every rendering here is a pure function of `catalog::list_descriptors()`
//! and the credential mode; nothing holds a second copy of tool metadata.

use std::str::FromStr;

use serde_json::{Map, Value, json};

use super::catalog::{ACCESS_TOKEN_PARAM, ParamKind, ParamSpec, ToolDescriptor, list_descriptors};
use crate::config::CredentialMode;

/// Discovery dialect used by the plugin `describe` export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDialect {
    /// `{id, label, description, parameters: {name: {type, description, optional}}}`
    Flat,
    /// `{type: "function", function: {name, description, parameters}}`
    Function,
}

impl FromStr for SchemaDialect {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(SchemaDialect::Flat),
            "function" => Ok(SchemaDialect::Function),
            _ => Err(()),
        }
    }
}

/// Parameters as a caller sees them, with the access token prepended when the
/// credential travels per call.
fn effective_params(desc: &ToolDescriptor, mode: CredentialMode) -> Vec<&'static ParamSpec> {
    let mut params = Vec::with_capacity(desc.params.len() + 1);
    if mode == CredentialMode::PerCall {
        params.push(&ACCESS_TOKEN_PARAM);
    }
    params.extend(desc.params.iter());
    params
}

fn property_schema(param: &ParamSpec) -> Value {
    let mut prop = json!({
        "type": param.kind.json_type(),
        "description": param.description,
    });
    if param.kind == ParamKind::StringArray {
        prop["items"] = json!({"type": "string"});
    }
    prop
}

/// JSON schema object for a tool's arguments.
fn json_schema(desc: &ToolDescriptor, mode: CredentialMode) -> Value {
    let params = effective_params(desc, mode);
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| (p.name.to_string(), property_schema(p)))
        .collect();
    let required: Vec<&str> = params
        .iter()
        .filter(|p| !p.optional)
        .map(|p| p.name)
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

pub fn flat(desc: &ToolDescriptor, mode: CredentialMode) -> Value {
    let parameters: Map<String, Value> = effective_params(desc, mode)
        .into_iter()
        .map(|p| {
            let mut entry = json!({
                "type": p.kind.json_type(),
                "description": p.description,
            });
            if p.optional {
                entry["optional"] = Value::Bool(true);
            }
            (p.name.to_string(), entry)
        })
        .collect();

    json!({
        "id": desc.id.as_str(),
        "label": desc.label,
        "description": desc.description,
        "parameters": parameters,
    })
}

pub fn function_calling(desc: &ToolDescriptor, mode: CredentialMode) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": desc.id.as_str(),
            "description": desc.description,
            "parameters": json_schema(desc, mode),
        }
    })
}

/// MCP `tools/list` entry.
pub fn mcp_tool(desc: &ToolDescriptor, mode: CredentialMode) -> Value {
    json!({
        "name": desc.id.as_str(),
        "description": desc.description,
        "inputSchema": json_schema(desc, mode),
    })
}

/// Render the whole catalog in one dialect.
pub fn render(dialect: SchemaDialect, mode: CredentialMode) -> Vec<Value> {
    let project: fn(&ToolDescriptor, CredentialMode) -> Value = match dialect {
        SchemaDialect::Flat => flat,
        SchemaDialect::Function => function_calling,
    };
    list_descriptors().iter().map(|d| project(d, mode)).collect()
}

pub fn render_mcp(mode: CredentialMode) -> Vec<Value> {
    list_descriptors().iter().map(|d| mcp_tool(d, mode)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::ToolId;

    fn descriptor(id: ToolId) -> &'static ToolDescriptor {
        list_descriptors().iter().find(|d| d.id == id).unwrap()
    }

    fn flat_ids(tools: &[Value]) -> Vec<String> {
        tools.iter().map(|t| t["id"].as_str().unwrap().to_string()).collect()
    }

    fn function_ids(tools: &[Value]) -> Vec<String> {
        tools
            .iter()
            .map(|t| t["function"]["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_dialects_enumerate_same_tools_in_order() {
        for mode in [CredentialMode::PerCall, CredentialMode::ProcessConfig] {
            let flat = render(SchemaDialect::Flat, mode);
            let func = render(SchemaDialect::Function, mode);
            let mcp: Vec<String> = render_mcp(mode)
                .iter()
                .map(|t| t["name"].as_str().unwrap().to_string())
                .collect();
            let expected = vec!["list_events", "create_event", "update_event", "delete_event"];
            assert_eq!(flat_ids(&flat), expected);
            assert_eq!(function_ids(&func), expected);
            assert_eq!(mcp, expected);
        }
    }

    #[test]
    fn test_function_dialect_lists_required() {
        let tool = function_calling(descriptor(ToolId::CreateEvent), CredentialMode::ProcessConfig);
        assert_eq!(tool["type"], "function");
        assert_eq!(
            tool["function"]["parameters"]["required"],
            json!(["summary", "start", "end"])
        );
        assert_eq!(
            tool["function"]["parameters"]["properties"]["attendees"]["items"]["type"],
            "string"
        );
    }

    #[test]
    fn test_flat_dialect_marks_optional() {
        let tool = flat(descriptor(ToolId::UpdateEvent), CredentialMode::ProcessConfig);
        assert_eq!(tool["label"], "Update Calendar Event");
        assert_eq!(tool["parameters"]["eventId"]["type"], "string");
        assert!(tool["parameters"]["eventId"].get("optional").is_none());
        assert_eq!(tool["parameters"]["summary"]["optional"], true);
    }

    #[test]
    fn test_per_call_mode_requires_access_token() {
        let func = function_calling(descriptor(ToolId::DeleteEvent), CredentialMode::PerCall);
        assert_eq!(
            func["function"]["parameters"]["required"],
            json!(["accessToken", "eventId"])
        );
        let flat = flat(descriptor(ToolId::DeleteEvent), CredentialMode::PerCall);
        assert_eq!(flat["parameters"]["accessToken"]["type"], "string");

        let without = flat_ids(&render(SchemaDialect::Flat, CredentialMode::ProcessConfig));
        assert_eq!(without.len(), 4);
        let list = super::flat(descriptor(ToolId::ListEvents), CredentialMode::ProcessConfig);
        assert!(list["parameters"].get("accessToken").is_none());
    }

    #[test]
    fn test_flat_and_function_agree_on_parameters() {
        for mode in [CredentialMode::PerCall, CredentialMode::ProcessConfig] {
            for desc in list_descriptors() {
                let flat = flat(desc, mode);
                let func = function_calling(desc, mode);
                let flat_params = flat["parameters"].as_object().unwrap();
                let func_props = func["function"]["parameters"]["properties"]
                    .as_object()
                    .unwrap();
                let mut a: Vec<_> = flat_params.keys().collect();
                let mut b: Vec<_> = func_props.keys().collect();
                a.sort();
                b.sort();
                assert_eq!(a, b, "{}", desc.id);

                let required = func["function"]["parameters"]["required"].as_array().unwrap();
                for (name, entry) in flat_params {
                    let is_required = required.iter().any(|r| r == name.as_str());
                    assert_eq!(entry.get("optional").is_none(), is_required, "{name}");
                }
            }
        }
    }

    #[test]
    fn test_mcp_schema_disallows_extra_properties() {
        let tool = mcp_tool(descriptor(ToolId::ListEvents), CredentialMode::ProcessConfig);
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert_eq!(tool["inputSchema"]["additionalProperties"], false);
        assert_eq!(tool["inputSchema"]["required"], json!([]));
    }
}
