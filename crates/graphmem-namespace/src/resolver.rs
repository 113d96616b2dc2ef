use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use sha2::{Digest, Sha256};

use crate::lookup::{GitCliLookup, RepositoryLookup};
use crate::remote_url::{normalize_relative_path, normalize_remote_url};

/// Number of hex characters kept from the identity digest.
pub const FINGERPRINT_LEN: usize = 8;

/// Returns the first `FINGERPRINT_LEN` hex characters of the SHA-256 digest of
/// `canonical_identity`.
pub fn directory_fingerprint(canonical_identity: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(canonical_identity.as_bytes()));
    digest[..FINGERPRINT_LEN].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Resolved identity of a project directory.
pub struct ProjectIdentity {
    pub directory: PathBuf,
    pub canonical_identity: String,
    pub fingerprint: String,
    pub namespace: String,
    pub from_remote: bool,
}

/// Canonical identity string and whether it came from a remote.
#[derive(Debug, Clone)]
struct IdentitySource {
    canonical_identity: String,
    from_remote: bool,
}

/// Resolves project and profile namespaces.
///
/// Identities are cached per absolute directory for the lifetime of the
/// resolver, so the repository lookup runs at most once per directory unless
/// two first calls race.
pub struct NamespaceResolver<L = GitCliLookup> {
    base_group_id: String,
    profile_group_id: String,
    lookup: L,
    sources: Mutex<HashMap<PathBuf, IdentitySource>>,
}

impl NamespaceResolver<GitCliLookup> {
    pub fn new(base_group_id: impl Into<String>, profile_group_id: impl Into<String>) -> Self {
        Self::with_lookup(base_group_id, profile_group_id, GitCliLookup::default())
    }
}

impl<L: RepositoryLookup> NamespaceResolver<L> {
    pub fn with_lookup(
        base_group_id: impl Into<String>,
        profile_group_id: impl Into<String>,
        lookup: L,
    ) -> Self {
        Self {
            base_group_id: base_group_id.into(),
            profile_group_id: profile_group_id.into(),
            lookup,
            sources: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_group_id(&self) -> &str {
        &self.base_group_id
    }

    /// Cross-project namespace for user-scoped data. Never hashed.
    pub fn profile_namespace(&self) -> &str {
        &self.profile_group_id
    }

    /// Returns `<base_group_id>_<fingerprint>` for `dir`.
    pub async fn project_namespace(&self, dir: &Path) -> String {
        let fingerprint = self.fingerprint(dir).await;
        self.namespace_for(&fingerprint)
    }

    /// Returns the directory fingerprint, resolving the identity on first use.
    pub async fn fingerprint(&self, dir: &Path) -> String {
        self.identify(dir).await.fingerprint
    }

    /// Resolves the full identity of `dir`.
    ///
    /// The repository lookup runs once per absolute directory; later calls
    /// read the cached identity.
    #[tracing::instrument(
        name = "graphmem_namespace.identify",
        skip(self, dir),
        fields(dir = %dir.display())
    )]
    pub async fn identify(&self, dir: &Path) -> ProjectIdentity {
        let directory = absolute_directory(dir);
        let source = match self.cached_source(&directory) {
            Some(source) => source,
            None => {
                let source = self.canonical_identity(&directory).await;
                self.store_source(directory.clone(), source)
            }
        };
        let fingerprint = directory_fingerprint(&source.canonical_identity);
        ProjectIdentity {
            namespace: self.namespace_for(&fingerprint),
            directory,
            canonical_identity: source.canonical_identity,
            fingerprint,
            from_remote: source.from_remote,
        }
    }

    fn namespace_for(&self, fingerprint: &str) -> String {
        format!("{}_{}", self.base_group_id, fingerprint)
    }

    async fn canonical_identity(&self, directory: &Path) -> IdentitySource {
        let remote = self
            .lookup
            .origin_url(directory)
            .await
            .map(|url| normalize_remote_url(&url))
            .filter(|url| !url.is_empty());
        let Some(remote) = remote else {
            tracing::debug!(
                dir = %directory.display(),
                "no origin remote, using directory path as project identity"
            );
            return IdentitySource {
                canonical_identity: directory.to_string_lossy().into_owned(),
                from_remote: false,
            };
        };
        let relative = self
            .lookup
            .relative_path(directory)
            .await
            .map(|path| normalize_relative_path(&path))
            .unwrap_or_default();
        let canonical_identity = if relative.is_empty() {
            remote
        } else {
            format!("{remote}/{relative}")
        };
        IdentitySource {
            canonical_identity,
            from_remote: true,
        }
    }

    fn cached_source(&self, directory: &Path) -> Option<IdentitySource> {
        self.sources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(directory)
            .cloned()
    }

    fn store_source(&self, directory: PathBuf, source: IdentitySource) -> IdentitySource {
        self.sources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(directory, source.clone());
        source
    }
}

fn absolute_directory(dir: &Path) -> PathBuf {
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}
