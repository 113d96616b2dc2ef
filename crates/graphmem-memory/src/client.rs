use graphmem_transport::{McpTransportClient, OperationError, OperationResult, ToolCaller};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::{ConfigError, MemoryServiceConfig};
use crate::types::{
    AckResponse, AddMemoryRequest, EntityNode, EntitySearchRequest, FactSearchRequest,
    ListMemoriesRequest, MemoryEpisode, RelationshipFact, ServiceStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Remote tools exposed by the memory service.
pub enum ToolName {
    AddMemory,
    SearchNodes,
    SearchMemoryFacts,
    GetEpisodes,
    DeleteEpisode,
    DeleteEntityEdge,
    GetEntityEdge,
    ClearGraph,
    GetStatus,
}

impl ToolName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddMemory => "add_memory",
            Self::SearchNodes => "search_nodes",
            Self::SearchMemoryFacts => "search_memory_facts",
            Self::GetEpisodes => "get_episodes",
            Self::DeleteEpisode => "delete_episode",
            Self::DeleteEntityEdge => "delete_entity_edge",
            Self::GetEntityEdge => "get_entity_edge",
            Self::ClearGraph => "clear_graph",
            Self::GetStatus => "get_status",
        }
    }
}

/// Argument map that only carries the parameters a caller supplied.
#[derive(Debug, Default)]
struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    fn required(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    fn optional<T: Into<Value>>(mut self, key: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), value.into());
        }
        self
    }

    fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Typed memory operations over a `ToolCaller`.
///
/// Every operation is a single tool call with no retries. Optional request
/// fields are left out of the argument map when unset.
pub struct MemoryClient<C = McpTransportClient> {
    caller: C,
}

impl MemoryClient<McpTransportClient> {
    pub fn from_config(config: &MemoryServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = McpTransportClient::new(config.endpoint.trim(), Some(config.timeout()))?;
        Ok(Self::new(transport))
    }
}

impl<C: ToolCaller> MemoryClient<C> {
    pub fn new(caller: C) -> Self {
        Self { caller }
    }

    pub fn caller(&self) -> &C {
        &self.caller
    }

    /// Stores one memory entry as an episode in `request.group_id`.
    pub async fn add_memory(&self, request: &AddMemoryRequest) -> OperationResult<AckResponse> {
        let arguments = ToolArguments::default()
            .required("name", request.name.as_str())
            .required("episode_body", request.episode_body.as_str())
            .required("group_id", request.group_id.as_str())
            .optional("source", request.source.map(|source| source.as_str()))
            .optional("source_description", request.source_description.as_deref())
            .optional("uuid", request.uuid.as_deref());
        let payload = self.call(ToolName::AddMemory, arguments).await?;
        decode_ack(ToolName::AddMemory, payload)
    }

    pub async fn search_entities(
        &self,
        request: &EntitySearchRequest,
    ) -> OperationResult<Vec<EntityNode>> {
        let arguments = ToolArguments::default()
            .required("query", request.query.as_str())
            .optional("group_ids", request.group_ids.clone())
            .optional("max_nodes", request.max_nodes)
            .optional("center_node_uuid", request.center_node_uuid.as_deref())
            .optional("entity_types", request.entity_types.clone());
        let payload = self.call(ToolName::SearchNodes, arguments).await?;
        decode_list(ToolName::SearchNodes, "nodes", payload)
    }

    pub async fn search_relationships(
        &self,
        request: &FactSearchRequest,
    ) -> OperationResult<Vec<RelationshipFact>> {
        let arguments = ToolArguments::default()
            .required("query", request.query.as_str())
            .optional("group_ids", request.group_ids.clone())
            .optional("max_facts", request.max_facts)
            .optional("center_node_uuid", request.center_node_uuid.as_deref());
        let payload = self.call(ToolName::SearchMemoryFacts, arguments).await?;
        decode_list(ToolName::SearchMemoryFacts, "facts", payload)
    }

    /// Lists the most recent episodes.
    pub async fn list_memories(
        &self,
        request: &ListMemoriesRequest,
    ) -> OperationResult<Vec<MemoryEpisode>> {
        let arguments = ToolArguments::default()
            .optional("group_ids", request.group_ids.clone())
            .optional("max_episodes", request.max_episodes);
        let payload = self.call(ToolName::GetEpisodes, arguments).await?;
        decode_list(ToolName::GetEpisodes, "episodes", payload)
    }

    pub async fn delete_memory(&self, uuid: &str) -> OperationResult<AckResponse> {
        let arguments = ToolArguments::default().required("uuid", uuid);
        let payload = self.call(ToolName::DeleteEpisode, arguments).await?;
        decode_ack(ToolName::DeleteEpisode, payload)
    }

    pub async fn delete_relationship(&self, uuid: &str) -> OperationResult<AckResponse> {
        let arguments = ToolArguments::default().required("uuid", uuid);
        let payload = self.call(ToolName::DeleteEntityEdge, arguments).await?;
        decode_ack(ToolName::DeleteEntityEdge, payload)
    }

    pub async fn get_relationship(&self, uuid: &str) -> OperationResult<RelationshipFact> {
        let arguments = ToolArguments::default().required("uuid", uuid);
        let payload = self.call(ToolName::GetEntityEdge, arguments).await?;
        decode_payload(ToolName::GetEntityEdge, payload)
    }

    /// Clears the given groups, or every group the server manages when `None`.
    pub async fn clear_memories(
        &self,
        group_ids: Option<&[String]>,
    ) -> OperationResult<AckResponse> {
        let arguments =
            ToolArguments::default().optional("group_ids", group_ids.map(<[String]>::to_vec));
        let payload = self.call(ToolName::ClearGraph, arguments).await?;
        decode_ack(ToolName::ClearGraph, payload)
    }

    pub async fn status(&self) -> OperationResult<ServiceStatus> {
        let payload = self.call(ToolName::GetStatus, ToolArguments::default()).await?;
        decode_payload(ToolName::GetStatus, payload)
    }

    async fn call(&self, tool: ToolName, arguments: ToolArguments) -> OperationResult<Value> {
        let arguments = arguments.into_map();
        tracing::debug!(
            tool = tool.as_str(),
            argument_count = arguments.len(),
            "dispatching memory tool call"
        );
        self.caller.call_tool(tool.as_str(), arguments).await
    }
}

fn decode_payload<T: DeserializeOwned>(tool: ToolName, payload: Value) -> OperationResult<T> {
    reject_error_payload(&payload)?;
    serde_json::from_value(payload).map_err(|error| {
        OperationError::application(format!("unexpected '{}' payload: {error}", tool.as_str()))
    })
}

fn decode_ack(tool: ToolName, payload: Value) -> OperationResult<AckResponse> {
    match payload {
        Value::String(message) => Ok(AckResponse { message }),
        Value::Null => Ok(AckResponse::default()),
        other => decode_payload(tool, other),
    }
}

fn decode_list<T: DeserializeOwned>(
    tool: ToolName,
    key: &str,
    payload: Value,
) -> OperationResult<Vec<T>> {
    reject_error_payload(&payload)?;
    let list = match payload {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut object) => object.remove(key).unwrap_or(Value::Array(Vec::new())),
        Value::Null => Value::Array(Vec::new()),
        other => {
            return Err(OperationError::application(format!(
                "unexpected '{}' payload: expected a list but got {other}",
                tool.as_str()
            )))
        }
    };
    decode_payload(tool, list)
}

/// Error objects the server returns without setting the tool error flag.
fn reject_error_payload(payload: &Value) -> OperationResult<()> {
    let message = payload
        .as_object()
        .and_then(|object| object.get("error"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty());
    match message {
        Some(message) => Err(OperationError::application(message)),
        None => Ok(()),
    }
}
