use std::path::PathBuf;

use clap::{Parser, Subcommand};
use graphmem_memory::EpisodeSource;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_episode_source(value: &str) -> Result<EpisodeSource, String> {
    EpisodeSource::parse(value)
        .ok_or_else(|| "source must be one of: text, json, message".to_string())
}

#[derive(Debug, Parser)]
#[command(
    name = "graphmem",
    about = "Project-scoped long-term memory client for coding agents",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "GRAPHMEM_CONFIG",
        help = "JSON settings file with endpoint, groupId, profileGroupId and timeoutMs keys."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "GRAPHMEM_ENDPOINT",
        help = "Memory service endpoint URL. Overrides the settings file."
    )]
    pub endpoint: Option<String>,

    #[arg(
        long = "group-id",
        env = "GRAPHMEM_GROUP_ID",
        help = "Base group id used to build project namespaces."
    )]
    pub group_id: Option<String>,

    #[arg(
        long = "profile-group-id",
        env = "GRAPHMEM_PROFILE_GROUP_ID",
        help = "Group id for cross-project profile memories."
    )]
    pub profile_group_id: Option<String>,

    #[arg(
        long = "timeout-ms",
        env = "GRAPHMEM_TIMEOUT_MS",
        value_parser = parse_positive_u64,
        help = "Per-request timeout in milliseconds."
    )]
    pub timeout_ms: Option<u64>,

    #[arg(
        long,
        help = "Project directory used to resolve the namespace. Defaults to the current directory."
    )]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the project and profile namespaces for the project directory.
    Namespace,
    /// Report memory service health.
    Status,
    /// Store a memory episode.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        body: String,
        #[arg(long, value_parser = parse_episode_source)]
        source: Option<EpisodeSource>,
        #[arg(long = "source-description")]
        source_description: Option<String>,
        #[arg(long, help = "Store in the profile namespace instead of the project namespace.")]
        profile: bool,
    },
    /// Search entity nodes.
    Search {
        query: String,
        #[arg(long, value_parser = parse_positive_usize)]
        max: Option<usize>,
        #[arg(long)]
        profile: bool,
    },
    /// Search relationship facts.
    Facts {
        query: String,
        #[arg(long, value_parser = parse_positive_usize)]
        max: Option<usize>,
        #[arg(long)]
        profile: bool,
    },
    /// List recent episodes.
    List {
        #[arg(long, value_parser = parse_positive_usize)]
        max: Option<usize>,
        #[arg(long)]
        profile: bool,
    },
    /// Delete one episode by uuid.
    Delete { uuid: String },
    /// Clear every memory in the selected namespace.
    Clear {
        #[arg(long)]
        profile: bool,
        #[arg(long, help = "Confirm the clear operation.")]
        yes: bool,
    },
}
