//! Project namespace resolution for graph memory partitions.
//!
//! Maps a working directory to a stable `<group>_<fingerprint>` namespace that
//! is identical across clones and machines of the same repository, and exposes
//! the fixed profile namespace used for cross-project data.

pub mod lookup;
pub mod remote_url;
pub mod resolver;

pub use lookup::{GitCliLookup, RepositoryLookup, DEFAULT_GIT_LOOKUP_TIMEOUT_MS};
pub use remote_url::{normalize_relative_path, normalize_remote_url};
pub use resolver::{directory_fingerprint, NamespaceResolver, ProjectIdentity, FINGERPRINT_LEN};
