use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 notification envelope; carries no id and expects no response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response envelope.
///
/// Server-originated notifications parse into this shape with no id and are
/// dropped by the reader.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object (protocol-level errors).
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Tool descriptor advertised via `tools/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// Result payload of `tools/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolDescriptor>,
}

/// A single content block inside a tool result.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

/// Result payload of `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Text of the first content block, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.first().map(|block| block.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_serialization_shape() {
        let request = JsonRpcRequest::new(1, "tools/list", json!({}));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list", "params": {}})
        );
    }

    #[test]
    fn test_notification_omits_id_and_null_params() {
        let notification = JsonRpcNotification::new("notifications/initialized", Value::Null);
        let line = serde_json::to_string(&notification).unwrap();

        assert_eq!(
            line,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#
        );
    }

    #[test]
    fn test_response_with_result() {
        let response: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"result":{"tools":[]}}"#).unwrap();

        assert_eq!(response.id, Some(3));
        assert!(response.result.is_some());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_server_notification_parses_without_id() {
        let response: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"notifications/message","params":{"level":"info"}}"#,
        )
        .unwrap();

        assert_eq!(response.id, None);
    }

    #[test]
    fn test_tool_call_result_deserialization() {
        let result: ToolCallResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "Current time: 2024-01-15T12:30:45.000Z"}],
            "isError": false
        }))
        .unwrap();

        assert!(!result.is_error);
        assert_eq!(result.text(), Some("Current time: 2024-01-15T12:30:45.000Z"));
    }

    #[test]
    fn test_tool_call_result_is_error_defaults_to_false() {
        let result: ToolCallResult =
            serde_json::from_value(json!({"content": []})).unwrap();

        assert!(!result.is_error);
        assert_eq!(result.text(), None);
    }

    #[test]
    fn test_tool_descriptor_reads_camel_case_schema() {
        let descriptor: ToolDescriptor = serde_json::from_value(json!({
            "name": "get_current_time",
            "description": "Get the current date and time",
            "inputSchema": {"type": "object"}
        }))
        .unwrap();

        assert_eq!(descriptor.name, "get_current_time");
        assert_eq!(descriptor.input_schema["type"], "object");
    }
}
