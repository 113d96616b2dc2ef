use std::path::{Path, PathBuf};
use std::time::Duration;

use graphmem_transport::{TransportError, DEFAULT_TIMEOUT_MS};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/mcp";
pub const DEFAULT_GROUP_ID: &str = "claude_code";
pub const DEFAULT_PROFILE_GROUP_ID: &str = "claude_code_profile";

#[derive(Debug, Error)]
/// Enumerates configuration failures.
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("failed to build memory transport: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Connection and partitioning settings for the memory service.
///
/// Keys absent from a settings file take their defaults.
pub struct MemoryServiceConfig {
    pub endpoint: String,
    pub group_id: String,
    pub profile_group_id: String,
    pub timeout_ms: u64,
}

impl Default for MemoryServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            group_id: DEFAULT_GROUP_ID.to_string(),
            profile_group_id: DEFAULT_PROFILE_GROUP_ID.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl MemoryServiceConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str::<Self>(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".to_string()));
        }
        let url = Url::parse(endpoint).map_err(|error| {
            ConfigError::Invalid(format!("endpoint '{endpoint}' is not a valid url: {error}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "endpoint scheme must be http or https, got '{}'",
                url.scheme()
            )));
        }
        validate_group_id("groupId", &self.group_id)?;
        validate_group_id("profileGroupId", &self.profile_group_id)?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "timeoutMs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_group_id(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!(
            "{field} must not contain whitespace"
        )));
    }
    Ok(())
}
