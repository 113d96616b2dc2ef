//! Typed memory operations over the graph memory service.
//!
//! Translates the memory vocabulary (episodes, entity search, relationship
//! search, listing, deletion, clearing) into remote tool calls and decodes the
//! returned payloads into typed values.

pub mod client;
pub mod config;
pub mod types;

pub use client::{MemoryClient, ToolName};
pub use config::{
    ConfigError, MemoryServiceConfig, DEFAULT_ENDPOINT, DEFAULT_GROUP_ID,
    DEFAULT_PROFILE_GROUP_ID,
};
pub use graphmem_transport::{OperationError, OperationResult, ToolCaller};
pub use types::{
    AckResponse, AddMemoryRequest, EntityNode, EntitySearchRequest, EpisodeSource,
    FactSearchRequest, ListMemoriesRequest, MemoryEpisode, RelationshipFact, ServiceStatus,
};
