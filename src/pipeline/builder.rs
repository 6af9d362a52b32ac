//! This module provides the `SubmissionPipelineBuilder` for constructing a
//! `SubmissionPipeline`.

use std::sync::Arc;

use thiserror::Error;

use super::SubmissionPipeline;
use crate::{
    cluster::ClusterSession,
    compiler::SourceCompiler,
    executor::{ContextProvider, ScriptExecutor},
    identity::IdentityGenerator,
    packager::ArtifactPackager,
};

/// Errors raised while assembling a pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineBuildError {
    /// No source compiler was provided.
    #[error("pipeline requires a source compiler")]
    MissingCompiler,

    /// No artifact packager was provided.
    #[error("pipeline requires an artifact packager")]
    MissingPackager,

    /// No cluster session was provided.
    #[error("pipeline requires a cluster session")]
    MissingCluster,

    /// No context provider was provided.
    #[error("pipeline requires a context provider")]
    MissingContexts,

    /// No script executor was provided.
    #[error("pipeline requires a script executor")]
    MissingExecutor,
}

/// A builder for creating a `SubmissionPipeline` instance.
#[derive(Default)]
pub struct SubmissionPipelineBuilder {
    compiler: Option<Arc<dyn SourceCompiler>>,
    packager: Option<ArtifactPackager>,
    cluster: Option<Arc<dyn ClusterSession>>,
    contexts: Option<Arc<dyn ContextProvider>>,
    executor: Option<ScriptExecutor>,
}

impl SubmissionPipelineBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source compiler.
    pub fn compiler(mut self, compiler: Arc<dyn SourceCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Sets the artifact packager.
    pub fn packager(mut self, packager: ArtifactPackager) -> Self {
        self.packager = Some(packager);
        self
    }

    /// Sets the cluster session.
    pub fn cluster(mut self, cluster: Arc<dyn ClusterSession>) -> Self {
        self.cluster = Some(cluster);
        self
    }

    /// Sets the per-submission context provider.
    pub fn contexts(mut self, contexts: Arc<dyn ContextProvider>) -> Self {
        self.contexts = Some(contexts);
        self
    }

    /// Sets the script executor.
    pub fn executor(mut self, executor: ScriptExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Assembles and validates the components to build a `SubmissionPipeline`.
    pub fn build(self) -> Result<SubmissionPipeline, PipelineBuildError> {
        Ok(SubmissionPipeline {
            compiler: self.compiler.ok_or(PipelineBuildError::MissingCompiler)?,
            packager: self.packager.ok_or(PipelineBuildError::MissingPackager)?,
            cluster: self.cluster.ok_or(PipelineBuildError::MissingCluster)?,
            contexts: self.contexts.ok_or(PipelineBuildError::MissingContexts)?,
            executor: self.executor.ok_or(PipelineBuildError::MissingExecutor)?,
            identities: IdentityGenerator::new(),
        })
    }
}
