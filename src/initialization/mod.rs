//! Application wiring.

use std::sync::Arc;

use crate::{
    cluster::{ClusterContextProvider, ClusterSession, StandaloneCluster},
    compiler::RhaiSourceCompiler,
    config::AppConfig,
    executor::{ContextProvider, ScriptExecutor},
    packager::ArtifactPackager,
    pipeline::{PipelineBuildError, SubmissionPipeline},
};

/// Builds a submission pipeline wired to a standalone cluster session.
///
/// The compiler's resolvability contract is pinned to exactly the binding
/// names the context provider injects, so scripts can only compile against
/// bindings that will exist in their scope, on the driver and on every
/// remote node.
pub fn build_pipeline(
    config: &AppConfig,
) -> Result<(Arc<SubmissionPipeline>, Arc<StandaloneCluster>), PipelineBuildError> {
    let cluster = Arc::new(StandaloneCluster::new());
    let contexts = Arc::new(ClusterContextProvider::new(cluster.handle()));

    let compiler =
        Arc::new(RhaiSourceCompiler::new(config.script.clone(), contexts.binding_names()));

    let pipeline = SubmissionPipeline::builder()
        .compiler(compiler)
        .packager(ArtifactPackager::new(&config.storage.shared_root))
        .cluster(Arc::clone(&cluster) as Arc<dyn ClusterSession>)
        .contexts(contexts)
        .executor(ScriptExecutor::new(config.script.clone()))
        .build()?;

    Ok((Arc::new(pipeline), cluster))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::{config::StorageConfig, pipeline::ResponseEnvelope};

    #[tokio::test]
    async fn test_wired_pipeline_exposes_cluster_binding() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            storage: StorageConfig { shared_root: dir.path().to_path_buf() },
            ..Default::default()
        };

        let (pipeline, cluster) = build_pipeline(&config).unwrap();

        // The submission's own archive is announced before the script runs,
        // so the handle already sees it.
        let envelope = pipeline.submit("cluster.archive_count()").await;
        assert_eq!(
            envelope,
            ResponseEnvelope::success(std::collections::HashSet::new(), "1")
        );
        assert_eq!(cluster.archive_count(), 1);
    }
}
