//! The cluster runtime boundary.
//!
//! The pipeline touches the cluster runtime through exactly one primitive:
//! [`ClusterSession::add_archive`], the announce call that makes a packaged
//! archive resolvable from every node before any task that might reference
//! its code is scheduled. Omitting this call is the classic distributed
//! defect: scripts run fine on the driver and fail with resolution errors the
//! first time a remote task needs their code.

use std::{
    collections::BTreeSet,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use dashmap::DashMap;
use rhai::{Dynamic, Engine};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::executor::{ContextProvider, ExecutionContext};

/// The binding name under which the cluster session handle is injected into
/// every script's execution scope.
pub const CLUSTER_BINDING: &str = "cluster";

/// Errors raised by the cluster runtime boundary.
#[derive(Debug, Error)]
pub enum DistributionError {
    /// The cluster runtime could not reach the archive on shared storage.
    #[error("cluster could not resolve archive at {path}")]
    ArchiveUnreachable {
        /// The archive path that was announced.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The cluster runtime rejected the registration.
    #[error("cluster runtime rejected archive registration: {0}")]
    Rejected(String),
}

/// A session with the cluster runtime.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterSession: Send + Sync {
    /// Registers an additional code archive with the cluster, so that all
    /// subsequently scheduled remote tasks can resolve code units from it.
    ///
    /// Idempotent: announcing the same archive twice must not change the
    /// correctness of later remote resolution.
    async fn add_archive(&self, archive: &Path) -> Result<(), DistributionError>;
}

/// An in-process cluster session for standalone deployments and tests.
///
/// Tracks announced archives in a registry and verifies that each announced
/// path is actually reachable, which is the failure mode a real cluster
/// runtime surfaces when handed a path outside shared storage.
#[derive(Debug, Default)]
pub struct StandaloneCluster {
    archives: Arc<DashMap<PathBuf, ()>>,
}

impl StandaloneCluster {
    /// Creates a session with an empty archive registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of distinct archives announced so far.
    pub fn archive_count(&self) -> usize {
        self.archives.len()
    }

    /// Returns true if the archive at `path` has been announced.
    pub fn has_archive(&self, path: &Path) -> bool {
        self.archives.contains_key(path)
    }

    /// A script-visible handle onto this session.
    pub fn handle(&self) -> ClusterHandle {
        ClusterHandle { archives: Arc::clone(&self.archives) }
    }
}

#[async_trait]
impl ClusterSession for StandaloneCluster {
    async fn add_archive(&self, archive: &Path) -> Result<(), DistributionError> {
        let metadata = tokio::fs::metadata(archive).await.map_err(|source| {
            DistributionError::ArchiveUnreachable { path: archive.to_path_buf(), source }
        })?;

        if !metadata.is_file() {
            return Err(DistributionError::ArchiveUnreachable {
                path: archive.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        self.archives.insert(archive.to_path_buf(), ());
        tracing::debug!(archive = %archive.display(), "archive registered with cluster");
        Ok(())
    }
}

/// The cluster session object bound into script scope.
#[derive(Debug, Clone)]
pub struct ClusterHandle {
    archives: Arc<DashMap<PathBuf, ()>>,
}

impl ClusterHandle {
    /// The number of archives currently resolvable by the cluster.
    pub fn archive_count(&self) -> i64 {
        self.archives.len() as i64
    }
}

/// Registers the [`ClusterHandle`] type and its script-visible methods.
pub fn register_cluster_handle(engine: &mut Engine) {
    engine
        .register_type_with_name::<ClusterHandle>("ClusterHandle")
        .register_fn("archive_count", |handle: &mut ClusterHandle| handle.archive_count());
}

/// The default context provider: injects the cluster session handle under
/// [`CLUSTER_BINDING`].
#[derive(Debug, Clone)]
pub struct ClusterContextProvider {
    handle: ClusterHandle,
}

impl ClusterContextProvider {
    /// Creates a provider that injects the given handle.
    pub fn new(handle: ClusterHandle) -> Self {
        Self { handle }
    }
}

impl ContextProvider for ClusterContextProvider {
    fn binding_names(&self) -> BTreeSet<String> {
        BTreeSet::from([CLUSTER_BINDING.to_string()])
    }

    fn build(&self) -> ExecutionContext {
        let mut context = ExecutionContext::new();
        context.bind(CLUSTER_BINDING, Dynamic::from(self.handle.clone()));
        context.install(Arc::new(register_cluster_handle));
        context
    }
}
