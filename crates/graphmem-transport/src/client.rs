use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;

use crate::error::{OperationError, OperationResult, TransportError};
use crate::jsonrpc::{decode_response_body, JsonRpcRequest, JsonRpcResponse};
use crate::tool_result::interpret_tool_result;

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
pub const MCP_SESSION_HEADER: &str = "mcp-session-id";
pub const MCP_CLIENT_NAME: &str = "graphmem";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const ACCEPT_JSON_AND_EVENT_STREAM: &str = "application/json, text/event-stream";

#[async_trait]
/// Trait contract for executing one remote tool call.
pub trait ToolCaller: Send + Sync {
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> OperationResult<Value>;
}

/// Decoded response plus the session token the server attached to it.
struct RpcExchange {
    envelope: JsonRpcResponse,
    session_id: Option<String>,
}

/// Client for the memory service's streamable-HTTP JSON-RPC endpoint.
///
/// The session is established lazily by the first call and reused for the
/// lifetime of the instance. Concurrent first callers share one in-flight
/// handshake. Request ids start at 1 and are never reused.
pub struct McpTransportClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    next_request_id: AtomicU64,
    session: OnceCell<Option<String>>,
}

impl McpTransportClient {
    /// Builds a client for `endpoint`. `timeout` defaults to 30 seconds.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON_AND_EVENT_STREAM));
        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout: timeout.unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
            next_request_id: AtomicU64::new(1),
            session: OnceCell::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Session token issued by the handshake, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session.get().and_then(|session| session.as_deref())
    }

    pub fn is_initialized(&self) -> bool {
        self.session.initialized()
    }

    /// Performs the protocol handshake unless a session already exists.
    ///
    /// A failed handshake leaves the client uninitialized so a later call can
    /// try again.
    pub async fn initialize_session(&self) -> Result<(), TransportError> {
        self.session
            .get_or_try_init(|| self.handshake())
            .await
            .map(|_| ())
    }

    /// Calls the remote tool `name`, establishing the session first if needed.
    ///
    /// The handshake and the tool call are timed separately, so the first call
    /// on a fresh client can take up to twice the configured timeout.
    #[tracing::instrument(
        name = "graphmem_transport.call_tool",
        skip(self, name, arguments),
        fields(tool = %name)
    )]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> OperationResult<Value> {
        if let Err(error) = self.initialize_session().await {
            tracing::warn!(%error, "memory service handshake failed");
            return Err(OperationError::connectivity(format!(
                "session handshake failed: {error}"
            )));
        }

        let request = self.request(
            "tools/call",
            Some(json!({
                "name": name,
                "arguments": arguments,
            })),
        );
        let outcome = match self.exchange(&request).await {
            Ok(exchange) => exchange.envelope.into_result(),
            Err(error) => Err(error),
        };
        let result = outcome.map_err(|error| {
            tracing::warn!(request_id = request.id, %error, "memory service call failed");
            OperationError::from(error)
        })?;

        let outcome = interpret_tool_result(name, result);
        if let Err(error) = &outcome {
            tracing::debug!(
                request_id = request.id,
                connectivity = error.is_connectivity(),
                reason = error.message(),
                "memory tool call returned failure"
            );
        }
        outcome
    }

    async fn handshake(&self) -> Result<Option<String>, TransportError> {
        let request = self.request(
            "initialize",
            Some(json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": MCP_CLIENT_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
        );
        let exchange = self.exchange(&request).await?;
        let server = exchange.envelope.into_result()?;
        tracing::debug!(
            request_id = request.id,
            server_protocol = server
                .get("protocolVersion")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown"),
            has_session = exchange.session_id.is_some(),
            "memory service session established"
        );
        Ok(exchange.session_id)
    }

    fn request(&self, method: &str, params: Option<Value>) -> JsonRpcRequest {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        JsonRpcRequest::new(id, method, params)
    }

    async fn exchange(&self, request: &JsonRpcRequest) -> Result<RpcExchange, TransportError> {
        match tokio::time::timeout(self.timeout, self.send(request)).await {
            Ok(exchange) => exchange,
            Err(_) => Err(TransportError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    async fn send(&self, request: &JsonRpcRequest) -> Result<RpcExchange, TransportError> {
        let mut outbound = self.client.post(&self.endpoint).json(request);
        if let Some(session_id) = self.session_id() {
            outbound = outbound.header(MCP_SESSION_HEADER, session_id);
        }

        let response = outbound.send().await?;
        let status = response.status();
        let session_id = header_text(response.headers(), MCP_SESSION_HEADER);
        let content_type = header_text(response.headers(), CONTENT_TYPE.as_str());
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::http_status(status.as_u16(), &body));
        }

        let envelope = decode_response_body(&body, content_type.as_deref())?;
        if !envelope.id_matches(request.id) {
            tracing::debug!(
                request_id = request.id,
                response_id = ?envelope.id,
                "response id does not echo request id"
            );
        }
        Ok(RpcExchange {
            envelope,
            session_id,
        })
    }
}

#[async_trait]
impl ToolCaller for McpTransportClient {
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> OperationResult<Value> {
        McpTransportClient::call_tool(self, name, arguments).await
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
