//! Streamable-HTTP JSON-RPC transport for the graph memory service.
//!
//! Owns request framing, single-frame SSE response decoding, the lazily
//! established session, the per-call timeout race, and the classification of
//! failures into connectivity and application outcomes.

mod client;
mod error;
pub mod jsonrpc;
mod tool_result;

pub use client::{
    McpTransportClient, ToolCaller, DEFAULT_TIMEOUT_MS, MCP_CLIENT_NAME, MCP_PROTOCOL_VERSION,
    MCP_SESSION_HEADER,
};
pub use error::{OperationError, OperationResult, TransportError};
pub use tool_result::{interpret_tool_result, ToolCallResult, ToolContentBlock};
