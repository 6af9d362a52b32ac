//! The submission pipeline.
//!
//! One submission moves through the stages strictly in order:
//! compile → package → distribute → execute → assemble. The ordering is the
//! load-bearing part: the archive must be announced to the cluster before the
//! script runs, so that any remote task the script schedules can already
//! resolve its code units. Failure at any stage is terminal and reported in
//! the response envelope; nothing is retried.

mod builder;
mod envelope;
mod error;

use std::sync::Arc;

pub use builder::{PipelineBuildError, SubmissionPipelineBuilder};
pub use envelope::ResponseEnvelope;
pub use error::{SubmissionError, diagnostic_chain};

use crate::{
    cluster::ClusterSession,
    compiler::SourceCompiler,
    executor::{ContextProvider, ExecutionOutcome, OutputSink, ScriptExecutor},
    identity::IdentityGenerator,
    packager::ArtifactPackager,
};

/// Processes script submissions end to end.
///
/// Each submission is handled sequentially on its caller's task; the pipeline
/// performs no internal parallelism, and concurrent submissions only meet at
/// the shared storage root and the cluster runtime.
pub struct SubmissionPipeline {
    pub(crate) compiler: Arc<dyn SourceCompiler>,
    pub(crate) packager: ArtifactPackager,
    pub(crate) cluster: Arc<dyn ClusterSession>,
    pub(crate) contexts: Arc<dyn ContextProvider>,
    pub(crate) executor: ScriptExecutor,
    pub(crate) identities: IdentityGenerator,
}

impl std::fmt::Debug for SubmissionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionPipeline").finish_non_exhaustive()
    }
}

impl SubmissionPipeline {
    /// Creates a new, empty builder.
    pub fn builder() -> SubmissionPipelineBuilder {
        SubmissionPipelineBuilder::new()
    }

    /// Processes one submission and returns its response envelope.
    ///
    /// Always returns a well-formed envelope; every internal fault is caught
    /// and rendered into the `exception` field.
    pub async fn submit(&self, source: &str) -> ResponseEnvelope {
        match self.process(source).await {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(%error, "submission failed");
                ResponseEnvelope::failure(diagnostic_chain(&error))
            }
        }
    }

    #[tracing::instrument(skip_all)]
    async fn process(&self, source: &str) -> Result<ResponseEnvelope, SubmissionError> {
        let identity = self.identities.next();
        tracing::debug!(%identity, "compiling submission");
        let units = self.compiler.compile(identity.unit_name(), source)?;

        let archive = self.packager.archive_path(&identity);
        tracing::debug!(%identity, archive = %archive.display(), "packaging compiled units");
        self.packager.package(&units, &archive).await?;

        // The announce must complete before the script runs: a remote task
        // scheduled by the script may resolve code from the archive at any
        // later point.
        self.cluster.add_archive(&archive).await?;

        tracing::debug!(%identity, "executing script");
        let context = self.contexts.build();
        let sink = OutputSink::new();
        let outcome = self.executor.execute(units.entry_payload(), context, sink.clone()).await;

        let captured = sink.captured().map_err(SubmissionError::from)?;
        match outcome {
            ExecutionOutcome::Returned(value) => {
                tracing::info!(%identity, "submission completed");
                Ok(ResponseEnvelope::success(captured, value))
            }
            ExecutionOutcome::Failed(error) => Err(SubmissionError::from(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use tempfile::tempdir;

    use super::*;
    use crate::{
        cluster::{DistributionError, MockClusterSession, StandaloneCluster},
        compiler::{CompilationError, MockSourceCompiler, RhaiSourceCompiler},
        config::ScriptConfig,
        executor::ExecutionContext,
    };

    struct EmptyContexts;

    impl ContextProvider for EmptyContexts {
        fn binding_names(&self) -> BTreeSet<String> {
            BTreeSet::new()
        }

        fn build(&self) -> ExecutionContext {
            ExecutionContext::new()
        }
    }

    fn pipeline_with_cluster(
        shared_root: &std::path::Path,
        cluster: Arc<dyn ClusterSession>,
    ) -> SubmissionPipeline {
        let compiler =
            Arc::new(RhaiSourceCompiler::new(ScriptConfig::default(), BTreeSet::new()));
        SubmissionPipeline::builder()
            .compiler(compiler)
            .packager(ArtifactPackager::new(shared_root))
            .cluster(cluster)
            .contexts(Arc::new(EmptyContexts))
            .executor(ScriptExecutor::new(ScriptConfig::default()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let dir = tempdir().unwrap();
        let pipeline = pipeline_with_cluster(dir.path(), Arc::new(StandaloneCluster::new()));

        let envelope = pipeline.submit("40 + 2").await;
        assert_eq!(envelope, ResponseEnvelope::success(HashSet::new(), "42"));
    }

    #[tokio::test]
    async fn test_archive_is_announced_before_execution() {
        let dir = tempdir().unwrap();
        let mut cluster = MockClusterSession::new();
        cluster
            .expect_add_archive()
            .withf(|archive| archive.is_file())
            .times(1)
            .returning(|_| Ok(()));

        let pipeline = pipeline_with_cluster(dir.path(), Arc::new(cluster));
        let envelope = pipeline.submit("1 + 1").await;
        assert!(!envelope.is_failure());
    }

    #[tokio::test]
    async fn test_distribution_failure_is_terminal() {
        let dir = tempdir().unwrap();
        let mut cluster = MockClusterSession::new();
        cluster.expect_add_archive().times(1).returning(|_| {
            Err(DistributionError::Rejected("runtime unavailable".to_string()))
        });

        let pipeline = pipeline_with_cluster(dir.path(), Arc::new(cluster));
        let envelope = pipeline.submit("1 + 1").await;

        match envelope {
            ResponseEnvelope::Failure { exception } => {
                assert!(exception.contains("distribution failed"));
                assert!(exception.contains("runtime unavailable"));
            }
            other => panic!("expected failure envelope, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_compilation_failure_skips_later_stages() {
        let dir = tempdir().unwrap();
        let mut cluster = MockClusterSession::new();
        cluster.expect_add_archive().never();

        let pipeline = pipeline_with_cluster(dir.path(), Arc::new(cluster));
        let envelope = pipeline.submit(r#"let x = "unclosed"#).await;

        assert!(envelope.is_failure());
        // Nothing was packaged either.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_source_fails_compilation() {
        let dir = tempdir().unwrap();
        let pipeline = pipeline_with_cluster(dir.path(), Arc::new(StandaloneCluster::new()));

        let envelope = pipeline.submit("").await;
        match envelope {
            ResponseEnvelope::Failure { exception } => {
                assert!(exception.contains("script source is empty"));
            }
            other => panic!("expected failure envelope, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_runtime_fault_drops_captured_output() {
        let dir = tempdir().unwrap();
        let pipeline = pipeline_with_cluster(dir.path(), Arc::new(StandaloneCluster::new()));

        let envelope = pipeline.submit(r#"print("before the fault"); 1 / 0"#).await;

        match envelope {
            ResponseEnvelope::Failure { exception } => {
                assert!(exception.to_lowercase().contains("zero"));
                assert!(!exception.contains("before the fault"));
            }
            other => panic!("expected failure envelope, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_compiler_errors_carry_their_diagnostic() {
        let dir = tempdir().unwrap();
        let mut compiler = MockSourceCompiler::new();
        compiler
            .expect_compile()
            .withf(|_, source| source == "anything")
            .returning(|_, _| Err(CompilationError::EmptySource));

        let pipeline = SubmissionPipeline::builder()
            .compiler(Arc::new(compiler))
            .packager(ArtifactPackager::new(dir.path()))
            .cluster(Arc::new(StandaloneCluster::new()))
            .contexts(Arc::new(EmptyContexts))
            .executor(ScriptExecutor::new(ScriptConfig::default()))
            .build()
            .unwrap();

        let envelope = pipeline.submit("anything").await;
        match envelope {
            ResponseEnvelope::Failure { exception } => {
                assert!(exception.contains("compilation failed"));
                assert!(exception.contains("script source is empty"));
            }
            other => panic!("expected failure envelope, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_submissions_get_distinct_archives() {
        let dir = tempdir().unwrap();
        let cluster = Arc::new(StandaloneCluster::new());
        let pipeline =
            Arc::new(pipeline_with_cluster(dir.path(), Arc::clone(&cluster) as Arc<dyn ClusterSession>));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pipeline = Arc::clone(&pipeline);
            handles.push(tokio::spawn(async move { pipeline.submit("2 + 2").await }));
        }
        for handle in handles {
            assert!(!handle.await.unwrap().is_failure());
        }

        // Every submission produced and announced its own archive.
        assert_eq!(cluster.archive_count(), 8);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 8);
    }
}
