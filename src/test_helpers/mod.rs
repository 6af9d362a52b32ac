//! Shared fixtures for unit and integration tests.

use std::{
    collections::BTreeSet,
    path::Path,
    sync::Arc,
};

use rhai::{Dynamic, Engine};

use crate::{
    cluster::{ClusterSession, StandaloneCluster},
    compiler::RhaiSourceCompiler,
    config::ScriptConfig,
    executor::{ContextProvider, EngineInstaller, ExecutionContext, ScriptExecutor},
    packager::ArtifactPackager,
    pipeline::SubmissionPipeline,
};

/// A script-visible service exposing a fixed count, for exercising bound
/// objects end to end.
#[derive(Debug, Clone)]
pub struct CountService {
    count: i64,
}

impl CountService {
    /// Creates a service reporting the given count.
    pub fn new(count: i64) -> Self {
        Self { count }
    }

    /// The fixed count.
    pub fn count(&self) -> i64 {
        self.count
    }
}

/// Registers the [`CountService`] type and its script-visible methods.
pub fn register_count_service(engine: &mut Engine) {
    engine
        .register_type_with_name::<CountService>("CountService")
        .register_fn("count", |svc: &mut CountService| svc.count());
}

/// A context provider over a fixed set of bindings and installers.
#[derive(Clone, Default)]
pub struct FixedContextProvider {
    bindings: Vec<(String, Dynamic)>,
    installers: Vec<EngineInstaller>,
}

impl FixedContextProvider {
    /// Creates a provider with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding supplied to every built context.
    pub fn with_binding(mut self, name: impl Into<String>, value: Dynamic) -> Self {
        self.bindings.push((name.into(), value));
        self
    }

    /// Adds an engine installer applied to every built context.
    pub fn with_installer(mut self, installer: EngineInstaller) -> Self {
        self.installers.push(installer);
        self
    }
}

impl ContextProvider for FixedContextProvider {
    fn binding_names(&self) -> BTreeSet<String> {
        self.bindings.iter().map(|(name, _)| name.clone()).collect()
    }

    fn build(&self) -> ExecutionContext {
        let mut context = ExecutionContext::new();
        for (name, value) in &self.bindings {
            context.bind(name.clone(), value.clone());
        }
        for installer in &self.installers {
            context.install(Arc::clone(installer));
        }
        context
    }
}

/// A provider binding a [`CountService`] under `name`.
pub fn count_service_provider(name: &str, count: i64) -> FixedContextProvider {
    FixedContextProvider::new()
        .with_binding(name, Dynamic::from(CountService::new(count)))
        .with_installer(Arc::new(register_count_service))
}

/// Builds a pipeline over the given provider and a standalone cluster, rooted
/// at `shared_root`.
pub fn create_test_pipeline_with(
    provider: FixedContextProvider,
    shared_root: &Path,
) -> (Arc<SubmissionPipeline>, Arc<StandaloneCluster>) {
    let cluster = Arc::new(StandaloneCluster::new());
    let contexts = Arc::new(provider);
    let compiler =
        Arc::new(RhaiSourceCompiler::new(ScriptConfig::default(), contexts.binding_names()));

    let pipeline = SubmissionPipeline::builder()
        .compiler(compiler)
        .packager(ArtifactPackager::new(shared_root))
        .cluster(Arc::clone(&cluster) as Arc<dyn ClusterSession>)
        .contexts(contexts)
        .executor(ScriptExecutor::new(ScriptConfig::default()))
        .build()
        .expect("test pipeline should build");

    (Arc::new(pipeline), cluster)
}

/// Builds a pipeline with no bindings, rooted at `shared_root`.
pub fn create_test_pipeline(
    shared_root: &Path,
) -> (Arc<SubmissionPipeline>, Arc<StandaloneCluster>) {
    create_test_pipeline_with(FixedContextProvider::new(), shared_root)
}
