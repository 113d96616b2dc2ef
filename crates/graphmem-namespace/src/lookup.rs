//! Version-control lookups used to derive a project identity.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

pub const DEFAULT_GIT_LOOKUP_TIMEOUT_MS: u64 = 5_000;

#[async_trait]
/// Trait contract for repository metadata lookups.
///
/// Implementations report lookup failures as `None`; the resolver treats a
/// missing remote as "not a repository" and never surfaces an error.
pub trait RepositoryLookup: Send + Sync {
    /// Returns the URL of the `origin` remote for the repository containing `dir`.
    async fn origin_url(&self, dir: &Path) -> Option<String>;

    /// Returns the path of `dir` relative to the repository root.
    async fn relative_path(&self, dir: &Path) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// `RepositoryLookup` backed by the `git` command line.
pub struct GitCliLookup {
    executable: String,
    timeout: Duration,
}

impl Default for GitCliLookup {
    fn default() -> Self {
        Self {
            executable: "git".to_string(),
            timeout: Duration::from_millis(DEFAULT_GIT_LOOKUP_TIMEOUT_MS),
        }
    }
}

impl GitCliLookup {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    async fn run_git(&self, dir: &Path, args: &[&str]) -> Option<String> {
        let mut command = Command::new(&self.executable);
        command.kill_on_drop(true);
        command.args(args);
        command.current_dir(dir);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::null());

        let child = match command.spawn() {
            Ok(child) => child,
            Err(error) => {
                tracing::debug!(
                    executable = %self.executable,
                    %error,
                    "git lookup could not be spawned"
                );
                return None;
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(error)) => {
                tracing::debug!(?args, %error, "git lookup failed");
                return None;
            }
            Err(_) => {
                tracing::debug!(
                    ?args,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "git lookup timed out"
                );
                return None;
            }
        };
        if !output.status.success() {
            tracing::debug!(
                ?args,
                status = ?output.status.code(),
                "git lookup exited unsuccessfully"
            );
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl RepositoryLookup for GitCliLookup {
    async fn origin_url(&self, dir: &Path) -> Option<String> {
        self.run_git(dir, &["config", "--get", "remote.origin.url"])
            .await
            .filter(|url| !url.is_empty())
    }

    async fn relative_path(&self, dir: &Path) -> Option<String> {
        self.run_git(dir, &["rev-parse", "--show-prefix"]).await
    }
}
