//! JSON-RPC envelopes and single-frame SSE decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

pub const JSONRPC_VERSION: &str = "2.0";

const SSE_DATA_PREFIX: &str = "data:";

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Outbound request envelope.
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Envelope-level error object.
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Inbound response envelope.
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn id_matches(&self, request_id: u64) -> bool {
        self.id.as_ref().and_then(Value::as_u64) == Some(request_id)
    }

    /// Returns the result payload, or the envelope error as a transport failure.
    pub fn into_result(self) -> Result<Value, TransportError> {
        if let Some(error) = self.error {
            let message = if error.message.trim().is_empty() {
                "unknown json-rpc error".to_string()
            } else {
                error.message
            };
            return Err(TransportError::JsonRpc {
                code: error.code,
                message,
            });
        }
        self.result.ok_or_else(|| {
            TransportError::InvalidResponse("response carried neither result nor error".to_string())
        })
    }
}

/// Returns the payload of the first `data:` line in an SSE body.
///
/// Later frames are ignored: the service sends exactly one logical response
/// per request.
pub fn extract_sse_data(body: &str) -> Option<&str> {
    body.lines()
        .find_map(|line| line.strip_prefix(SSE_DATA_PREFIX))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
}

/// Decodes an HTTP response body into a JSON-RPC envelope.
///
/// A body without a `data:` line is accepted only when the server declared a
/// plain JSON content type.
pub fn decode_response_body(
    body: &str,
    content_type: Option<&str>,
) -> Result<JsonRpcResponse, TransportError> {
    let payload = match extract_sse_data(body) {
        Some(data) => data,
        None if is_json_content_type(content_type) => body,
        None => return Err(TransportError::MissingDataLine),
    };
    let envelope = serde_json::from_str::<JsonRpcResponse>(payload.trim())?;
    Ok(envelope)
}

fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|value| value.to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}
