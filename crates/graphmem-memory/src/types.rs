use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Format of an episode body.
pub enum EpisodeSource {
    Text,
    Json,
    Message,
}

impl EpisodeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Message => "message",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "message" => Some(Self::Message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// A memory entry to store as an episode.
pub struct AddMemoryRequest {
    pub name: String,
    pub episode_body: String,
    pub group_id: String,
    pub source: Option<EpisodeSource>,
    pub source_description: Option<String>,
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntitySearchRequest {
    pub query: String,
    pub group_ids: Option<Vec<String>>,
    pub max_nodes: Option<usize>,
    pub center_node_uuid: Option<String>,
    pub entity_types: Option<Vec<String>>,
}

impl EntitySearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FactSearchRequest {
    pub query: String,
    pub group_ids: Option<Vec<String>>,
    pub max_facts: Option<usize>,
    pub center_node_uuid: Option<String>,
}

impl FactSearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListMemoriesRequest {
    pub group_ids: Option<Vec<String>>,
    pub max_episodes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Acknowledgement returned by mutating operations.
pub struct AckResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Entity node returned by entity search.
pub struct EntityNode {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Relationship fact (entity edge) between two nodes.
pub struct RelationshipFact {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_node_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_node_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub episodes: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Stored memory episode.
pub struct MemoryEpisode {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ServiceStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{EntityNode, EpisodeSource, RelationshipFact};

    #[test]
    fn unit_episode_source_parses_and_serializes_lowercase() {
        assert_eq!(EpisodeSource::parse(" JSON "), Some(EpisodeSource::Json));
        assert_eq!(EpisodeSource::parse("markdown"), None);
        assert_eq!(
            serde_json::to_value(EpisodeSource::Message).expect("encode"),
            json!("message")
        );
        assert_eq!(EpisodeSource::Text.as_str(), "text");
    }

    #[test]
    fn unit_entries_tolerate_missing_and_extra_fields() {
        let node = serde_json::from_value::<EntityNode>(json!({
            "uuid": "n1",
            "name": "Auth Service",
            "labels": ["Entity", "Component"],
            "attributes": {"language": "rust"},
            "score": 0.9
        }))
        .expect("decode node");
        assert_eq!(node.name, "Auth Service");
        assert_eq!(node.attributes["language"], "rust");
        assert_eq!(node.summary, None);

        let fact = serde_json::from_value::<RelationshipFact>(json!({
            "uuid": "f1",
            "fact": "Auth Service uses JWT",
            "valid_at": "2024-05-01T00:00:00Z"
        }))
        .expect("decode fact");
        assert_eq!(fact.name, "");
        assert_eq!(fact.valid_at.as_deref(), Some("2024-05-01T00:00:00Z"));
    }
}
