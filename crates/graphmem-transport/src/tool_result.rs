use serde::Deserialize;
use serde_json::Value;

use crate::error::{OperationError, OperationResult, TransportError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Content block of a `tools/call` result.
pub enum ToolContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Result object of a `tools/call` response.
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<ToolContentBlock>,
    #[serde(default)]
    pub structured_content: Option<Value>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Text blocks joined by newlines, or `None` when the result has none.
    pub fn text(&self) -> Option<String> {
        let blocks = self
            .content
            .iter()
            .filter_map(|block| match block {
                ToolContentBlock::Text { text } => Some(text.as_str()),
                ToolContentBlock::Other => None,
            })
            .collect::<Vec<_>>();
        if blocks.is_empty() {
            None
        } else {
            Some(blocks.join("\n"))
        }
    }
}

/// Classifies a decoded `tools/call` result.
///
/// A set `isError` flag is an application failure. Otherwise the structured
/// content is returned, unwrapped once when it is an object whose only key is
/// `result`.
pub fn interpret_tool_result(tool: &str, result: Value) -> OperationResult<Value> {
    let result = serde_json::from_value::<ToolCallResult>(result)
        .map_err(|error| OperationError::from(TransportError::from(error)))?;
    if result.is_error {
        return Err(OperationError::application(tool_error_message(tool, &result)));
    }
    Ok(success_payload(result))
}

fn success_payload(result: ToolCallResult) -> Value {
    let text = result.text();
    match result.structured_content {
        Some(structured) => unwrap_result_key(structured),
        None => match text {
            Some(text) => serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text)),
            None => Value::Null,
        },
    }
}

fn unwrap_result_key(structured: Value) -> Value {
    match structured {
        Value::Object(mut object) if object.len() == 1 && object.contains_key("result") => {
            object.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn tool_error_message(tool: &str, result: &ToolCallResult) -> String {
    let structured_error = result
        .structured_content
        .as_ref()
        .and_then(|content| content.get("error"))
        .and_then(error_text);
    if let Some(message) = structured_error {
        return message;
    }

    if let Some(text) = result.text() {
        let parsed_error = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|parsed| parsed.get("error").and_then(error_text));
        if let Some(message) = parsed_error {
            return message;
        }
        if !text.trim().is_empty() {
            return text;
        }
    }

    format!("tool '{tool}' reported an error")
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
