use serde::{Deserialize, Serialize};

/// A single invocation request for a named tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Caller-chosen correlation id, echoed back in the result.
    #[serde(default)]
    pub id: String,
    /// Tool name to dispatch on.
    pub name: String,
    /// Named arguments as a JSON object.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Tool metadata advertised to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the accepted arguments.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Creates a tool definition from its metadata parts.
    pub fn new(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// Outcome of a tool invocation.
///
/// The payload is always a human-readable text; `is_error` mirrors whether
/// `output` carries a failure message, but callers inspecting only the text
/// can rely on failures starting with `Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub tool_name: String,
    pub output: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful result with the given output text.
    pub fn success(call_id: &str, tool_name: &str, output: impl Into<String>) -> Self {
        Self {
            call_id: call_id.to_string(),
            tool_name: tool_name.to_string(),
            output: output.into(),
            is_error: false,
        }
    }

    /// Creates a failed result with the given message text.
    pub fn error(call_id: &str, tool_name: &str, message: impl Into<String>) -> Self {
        Self {
            call_id: call_id.to_string(),
            tool_name: tool_name.to_string(),
            output: message.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_error_set_the_flag() {
        let ok = ToolResult::success("c1", "navigate", "Navigated to https://example.com");
        assert!(!ok.is_error);
        assert_eq!(ok.call_id, "c1");
        assert_eq!(ok.tool_name, "navigate");

        let err = ToolResult::error("c2", "navigate", "Error navigating: boom");
        assert!(err.is_error);
        assert!(err.output.starts_with("Error"));
    }

    #[test]
    fn tool_call_defaults_missing_fields() {
        let call: ToolCall =
            serde_json::from_str(r#"{"name":"find_element"}"#).expect("minimal call parses");
        assert_eq!(call.id, "");
        assert_eq!(call.name, "find_element");
        assert!(call.arguments.is_null());
    }

    #[test]
    fn tool_definition_round_trips_through_json() {
        let def = ToolDefinition::new(
            "press_key",
            "Press a key",
            serde_json::json!({"type":"object"}),
        );
        let text = serde_json::to_string(&def).expect("serialize");
        let back: ToolDefinition = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back.name, "press_key");
        assert_eq!(back.parameters["type"], "object");
    }
}
