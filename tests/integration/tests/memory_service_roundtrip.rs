use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use graphmem_memory::{
    AddMemoryRequest, EntitySearchRequest, EpisodeSource, FactSearchRequest, MemoryClient,
    MemoryServiceConfig,
};
use graphmem_namespace::{NamespaceResolver, RepositoryLookup};
use graphmem_transport::MCP_SESSION_HEADER;
use httpmock::prelude::*;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// Repository lookup that reports one fixed remote for every directory.
struct FixedRemote {
    origin: String,
    relative: String,
    lookups: Arc<AtomicUsize>,
}

impl FixedRemote {
    fn new(origin: &str, relative: &str) -> Self {
        Self {
            origin: origin.to_string(),
            relative: relative.to_string(),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl RepositoryLookup for FixedRemote {
    async fn origin_url(&self, _dir: &Path) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Some(self.origin.clone())
    }

    async fn relative_path(&self, _dir: &Path) -> Option<String> {
        Some(self.relative.clone())
    }
}

fn sse(payload: Value) -> String {
    format!("event: message\ndata: {payload}\n\n")
}

fn expected_namespace(group: &str, canonical: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(canonical.as_bytes()));
    format!("{group}_{}", &digest[..8])
}

fn config_for(server: &MockServer) -> MemoryServiceConfig {
    MemoryServiceConfig {
        endpoint: server.url("/mcp"),
        group_id: "team".to_string(),
        profile_group_id: "team_profile".to_string(),
        timeout_ms: 5_000,
    }
}

#[tokio::test]
async fn integration_project_memory_roundtrip_uses_one_handshake() {
    let server = MockServer::start();
    let namespace = expected_namespace("team", "host/org/repo/pkg/app");

    let init = server.mock(|when, then| {
        when.method(POST)
            .path("/mcp")
            .header("accept", "application/json, text/event-stream")
            .body_includes("\"method\":\"initialize\"");
        then.status(200)
            .header("content-type", "text/event-stream")
            .header(MCP_SESSION_HEADER, "roundtrip-session")
            .body(sse(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "serverInfo": {"name": "graphiti", "version": "1.0.0"}
                }
            })));
    });
    let add = server.mock(|when, then| {
        when.method(POST)
            .path("/mcp")
            .header(MCP_SESSION_HEADER, "roundtrip-session")
            .body_includes("\"name\":\"add_memory\"")
            .body_includes(format!("\"group_id\":\"{namespace}\""));
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(sse(json!({
                "jsonrpc": "2.0",
                "id": 2,
                "result": {
                    "content": [{"type": "text", "text": "Episode queued"}],
                    "structuredContent": {"result": {"message": "Episode queued"}},
                    "isError": false
                }
            })));
    });
    let search = server.mock(|when, then| {
        when.method(POST)
            .path("/mcp")
            .header(MCP_SESSION_HEADER, "roundtrip-session")
            .body_includes("\"name\":\"search_nodes\"")
            .body_includes(format!("\"group_ids\":[\"{namespace}\"]"));
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(sse(json!({
                "jsonrpc": "2.0",
                "id": 3,
                "result": {
                    "structuredContent": {
                        "message": "Nodes retrieved successfully",
                        "nodes": [{"uuid": "n1", "name": "Auth Service", "labels": ["Entity"]}]
                    },
                    "isError": false
                }
            })));
    });

    let lookup = FixedRemote::new("git@host:org/repo.git", "pkg/app/");
    let lookups = lookup.lookups.clone();
    let resolver = NamespaceResolver::with_lookup("team", "team_profile", lookup);
    let client = MemoryClient::from_config(&config_for(&server)).expect("client");

    let group_id = resolver.project_namespace(Path::new("/work/repo/pkg/app")).await;
    assert_eq!(group_id, namespace);

    let ack = client
        .add_memory(&AddMemoryRequest {
            name: "auth decision".to_string(),
            episode_body: "Auth Service signs JWTs with rotating keys".to_string(),
            group_id: group_id.clone(),
            source: Some(EpisodeSource::Text),
            ..AddMemoryRequest::default()
        })
        .await
        .expect("add memory");
    assert_eq!(ack.message, "Episode queued");
    init.assert_calls(1);
    add.assert_calls(1);

    let again = resolver.project_namespace(Path::new("/work/repo/pkg/app")).await;
    let nodes = client
        .search_entities(&EntitySearchRequest {
            group_ids: Some(vec![again]),
            ..EntitySearchRequest::new("auth")
        })
        .await
        .expect("search entities");
    assert_eq!(nodes[0].name, "Auth Service");

    init.assert_calls(1);
    search.assert_calls(1);
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
    assert_eq!(client.caller().session_id(), Some("roundtrip-session"));
}

#[tokio::test]
async fn integration_failure_classification_drives_caller_fallback() {
    let server = MockServer::start();
    let _init = server.mock(|when, then| {
        when.method(POST)
            .path("/mcp")
            .body_includes("\"method\":\"initialize\"");
        then.status(200)
            .header(MCP_SESSION_HEADER, "classify-session")
            .body(sse(json!({"jsonrpc": "2.0", "id": 1, "result": {}})));
    });
    let _rejected = server.mock(|when, then| {
        when.method(POST)
            .path("/mcp")
            .body_includes("\"name\":\"search_memory_facts\"");
        then.status(200).body(sse(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "result": {
                "content": [{"type": "text", "text": "query must not be empty"}],
                "isError": true
            }
        })));
    });
    let _unavailable = server.mock(|when, then| {
        when.method(POST)
            .path("/mcp")
            .body_includes("\"name\":\"add_memory\"");
        then.status(502).body("bad gateway");
    });

    let client = MemoryClient::from_config(&config_for(&server)).expect("client");

    let rejected = client
        .search_relationships(&FactSearchRequest::new(""))
        .await
        .expect_err("application failure");
    assert!(!rejected.is_connectivity());
    assert_eq!(rejected.message(), "query must not be empty");

    let unavailable = client
        .add_memory(&AddMemoryRequest {
            name: "note".to_string(),
            episode_body: "body".to_string(),
            group_id: "team_profile".to_string(),
            ..AddMemoryRequest::default()
        })
        .await
        .expect_err("connectivity failure");
    assert!(unavailable.is_connectivity());
    assert!(unavailable.message().contains("502"));
}

#[tokio::test]
async fn integration_ssh_and_https_remotes_resolve_to_the_same_namespace() {
    let ssh = NamespaceResolver::with_lookup(
        "team",
        "team_profile",
        FixedRemote::new("git@GitHub.com:Org/Repo.git", ""),
    );
    let https = NamespaceResolver::with_lookup(
        "team",
        "team_profile",
        FixedRemote::new("https://github.com/org/repo", ""),
    );

    let from_ssh = ssh.project_namespace(Path::new("/home/dev/repo")).await;
    let from_https = https.project_namespace(Path::new("/ci/build/checkout")).await;
    assert_eq!(from_ssh, from_https);
    assert_eq!(from_ssh, expected_namespace("team", "github.com/org/repo"));
    assert_eq!(ssh.profile_namespace(), "team_profile");
}
