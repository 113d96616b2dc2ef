use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use graphmem_memory::{
    AddMemoryRequest, EntitySearchRequest, FactSearchRequest, ListMemoriesRequest, MemoryClient,
    MemoryServiceConfig,
};
use graphmem_namespace::NamespaceResolver;
use serde_json::{json, Value};

use crate::cli_args::{Cli, CliCommand};

/// Settings file values, overridden by flags and environment.
pub(crate) fn resolve_config(cli: &Cli) -> Result<MemoryServiceConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => MemoryServiceConfig::load(path)?,
        None => MemoryServiceConfig::default(),
    };
    if let Some(endpoint) = cli.endpoint.as_ref() {
        config.endpoint = endpoint.clone();
    }
    if let Some(group_id) = cli.group_id.as_ref() {
        config.group_id = group_id.clone();
    }
    if let Some(profile_group_id) = cli.profile_group_id.as_ref() {
        config.profile_group_id = profile_group_id.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

fn project_dir(cli: &Cli) -> Result<PathBuf> {
    match cli.dir.as_ref() {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().context("failed to resolve current directory"),
    }
}

async fn target_namespace(resolver: &NamespaceResolver, dir: &Path, profile: bool) -> String {
    if profile {
        resolver.profile_namespace().to_string()
    } else {
        resolver.project_namespace(dir).await
    }
}

/// Pretty-printed JSON for stdout.
pub(crate) fn render_output(output: &Value) -> String {
    format!("{output:#}")
}

/// Executes one CLI command and returns its JSON output.
pub(crate) async fn run(cli: Cli) -> Result<Value> {
    let config = resolve_config(&cli)?;
    let dir = project_dir(&cli)?;
    let resolver = NamespaceResolver::new(config.group_id.clone(), config.profile_group_id.clone());
    tracing::debug!(
        endpoint = %config.endpoint,
        dir = %dir.display(),
        "resolved graphmem configuration"
    );

    match cli.command {
        CliCommand::Namespace => Ok(namespace_output(&resolver, &dir).await),
        command => {
            let client = MemoryClient::from_config(&config)?;
            run_service_command(&client, &resolver, &dir, command).await
        }
    }
}

async fn namespace_output(resolver: &NamespaceResolver, dir: &Path) -> Value {
    let identity = resolver.identify(dir).await;
    json!({
        "directory": identity.directory.display().to_string(),
        "canonical_identity": identity.canonical_identity,
        "from_remote": identity.from_remote,
        "fingerprint": identity.fingerprint,
        "project_namespace": identity.namespace,
        "profile_namespace": resolver.profile_namespace(),
    })
}

async fn run_service_command(
    client: &MemoryClient,
    resolver: &NamespaceResolver,
    dir: &Path,
    command: CliCommand,
) -> Result<Value> {
    let output = match command {
        CliCommand::Namespace => namespace_output(resolver, dir).await,
        CliCommand::Status => {
            let status = client.status().await.context("status failed")?;
            serde_json::to_value(status)?
        }
        CliCommand::Add {
            name,
            body,
            source,
            source_description,
            profile,
        } => {
            let request = AddMemoryRequest {
                name,
                episode_body: body,
                group_id: target_namespace(resolver, dir, profile).await,
                source,
                source_description,
                uuid: None,
            };
            let ack = client.add_memory(&request).await.context("add failed")?;
            json!({"group_id": request.group_id, "message": ack.message})
        }
        CliCommand::Search {
            query,
            max,
            profile,
        } => {
            let request = EntitySearchRequest {
                group_ids: Some(vec![target_namespace(resolver, dir, profile).await]),
                max_nodes: max,
                ..EntitySearchRequest::new(query)
            };
            let nodes = client
                .search_entities(&request)
                .await
                .context("entity search failed")?;
            serde_json::to_value(nodes)?
        }
        CliCommand::Facts {
            query,
            max,
            profile,
        } => {
            let request = FactSearchRequest {
                group_ids: Some(vec![target_namespace(resolver, dir, profile).await]),
                max_facts: max,
                ..FactSearchRequest::new(query)
            };
            let facts = client
                .search_relationships(&request)
                .await
                .context("relationship search failed")?;
            serde_json::to_value(facts)?
        }
        CliCommand::List { max, profile } => {
            let request = ListMemoriesRequest {
                group_ids: Some(vec![target_namespace(resolver, dir, profile).await]),
                max_episodes: max,
            };
            let episodes = client
                .list_memories(&request)
                .await
                .context("list failed")?;
            serde_json::to_value(episodes)?
        }
        CliCommand::Delete { uuid } => {
            let ack = client.delete_memory(&uuid).await.context("delete failed")?;
            serde_json::to_value(ack)?
        }
        CliCommand::Clear { profile, yes } => {
            let namespace = target_namespace(resolver, dir, profile).await;
            if !yes {
                bail!("refusing to clear '{namespace}' without --yes");
            }
            let ack = client
                .clear_memories(Some(std::slice::from_ref(&namespace)))
                .await
                .context("clear failed")?;
            json!({"group_id": namespace, "message": ack.message})
        }
    };
    Ok(output)
}
