use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the cluster-shared artifact storage location.
///
/// The shared root must be reachable from every node of the cluster (e.g. a
/// distributed filesystem mount); remote workers resolve compiled units from
/// archives written under it.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory under which one archive per submission is written.
    #[serde(default = "default_shared_root")]
    pub shared_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { shared_root: default_shared_root() }
    }
}

/// Provides the default value for shared_root.
fn default_shared_root() -> PathBuf {
    PathBuf::from("artifacts")
}
