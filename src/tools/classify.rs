use serde_json::Value;

use super::ToolInvocationResult;
use crate::plugin::shim::HandlerOutcome;

/// Used when a failing handler didn't leave a readable `error` field.
pub const FALLBACK_ERROR: &str = "Failed to process Calendar request";

/// Turn a handler's status code and captured output into one outcome.
///
/// Status 0 is success, with the output parsed as JSON when it is JSON and
/// passed through as a string otherwise. Any other status is an error whose
/// message comes from the output's `error` field.
pub fn classify(status_code: i32, captured_text: &str) -> ToolInvocationResult {
    if status_code == 0 {
        let result = serde_json::from_str::<Value>(captured_text)
            .unwrap_or_else(|_| Value::String(captured_text.to_string()));
        return ToolInvocationResult::Success { result };
    }

    let message = serde_json::from_str::<Value>(captured_text)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_ERROR.to_string());
    ToolInvocationResult::Error { error: message }
}

pub fn classify_outcome(outcome: HandlerOutcome) -> ToolInvocationResult {
    classify(outcome.status_code, &outcome.captured_text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_round_trips_json() {
        let payloads = [
            json!({"id": "abc123", "message": "Event created successfully"}),
            json!({"count": 2, "events": [{"id": "a"}, {"id": "b", "start": {"dateTime": "x"}}]}),
            json!([1, "two", null, 3.5, {"nested": [true]}]),
            json!("plain string"),
            json!(42),
            json!(null),
            // A success payload may carry an "error" key; status decides, not content.
            json!({"error": "not really"}),
        ];
        for payload in payloads {
            let text = serde_json::to_string(&payload).unwrap();
            assert_eq!(
                classify(0, &text),
                ToolInvocationResult::Success { result: payload }
            );
        }
    }

    #[test]
    fn test_success_with_non_json_text() {
        assert_eq!(
            classify(0, "Event deleted"),
            ToolInvocationResult::Success {
                result: json!("Event deleted")
            }
        );
        assert_eq!(
            classify(0, ""),
            ToolInvocationResult::Success { result: json!("") }
        );
    }

    #[test]
    fn test_error_field_is_extracted() {
        assert_eq!(
            classify(1, r#"{"error":"Failed to create event: forbidden"}"#),
            ToolInvocationResult::Error {
                error: "Failed to create event: forbidden".into()
            }
        );
    }

    #[test]
    fn test_error_fallbacks() {
        for text in ["not json", "", r#"{"message":"no error key"}"#, r#"{"error":{"nested":1}}"#] {
            assert_eq!(
                classify(1, text),
                ToolInvocationResult::Error {
                    error: FALLBACK_ERROR.into()
                },
                "{text}"
            );
        }
    }

    #[test]
    fn test_any_nonzero_status_is_error() {
        assert!(matches!(
            classify(-1, r#"{"error":"x"}"#),
            ToolInvocationResult::Error { .. }
        ));
        assert!(matches!(
            classify(2, r#"{"ok":true}"#),
            ToolInvocationResult::Error { .. }
        ));
    }

    #[test]
    fn test_classify_outcome() {
        let outcome = HandlerOutcome {
            status_code: 0,
            captured_text: r#"{"message":"Event deleted successfully"}"#.into(),
        };
        assert_eq!(
            classify_outcome(outcome),
            ToolInvocationResult::Success {
                result: json!({"message": "Event deleted successfully"})
            }
        );
    }
}
