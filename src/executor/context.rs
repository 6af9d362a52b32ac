//! Named-value contexts bound into a script's evaluation scope.

use std::{collections::BTreeSet, sync::Arc};

use rhai::{Dynamic, Engine, Scope};

/// A function that registers types or functions on an engine before
/// evaluation, making a bound object's methods callable from script code.
pub type EngineInstaller = Arc<dyn Fn(&mut Engine) + Send + Sync>;

/// The named bindings injected into one script execution.
///
/// Constructed fresh per submission and never shared across submissions. The
/// binding names must match exactly what scripts (and the remote closures
/// they schedule) reference.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    bindings: Vec<(String, Dynamic)>,
    installers: Vec<EngineInstaller>,
}

impl ExecutionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` under `name` in the script's evaluation scope.
    pub fn bind(&mut self, name: impl Into<String>, value: Dynamic) {
        self.bindings.push((name.into(), value));
    }

    /// Adds an engine installer that runs before evaluation.
    pub fn install(&mut self, installer: EngineInstaller) {
        self.installers.push(installer);
    }

    /// The names of all bindings in this context.
    pub fn binding_names(&self) -> BTreeSet<String> {
        self.bindings.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Applies the context to an engine and scope prior to evaluation.
    pub(crate) fn apply(&self, engine: &mut Engine, scope: &mut Scope<'_>) {
        for installer in &self.installers {
            installer(engine);
        }
        for (name, value) in &self.bindings {
            scope.push_dynamic(name.clone(), value.clone());
        }
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("bindings", &self.binding_names())
            .field("installers", &self.installers.len())
            .finish()
    }
}

/// Supplies the pinned binding-name set and builds a fresh context per
/// submission.
///
/// The same name set is handed to the compiler as its resolvability contract,
/// so a script can only compile against bindings that will actually exist in
/// its scope.
pub trait ContextProvider: Send + Sync {
    /// The binding names every built context will contain.
    fn binding_names(&self) -> BTreeSet<String>;

    /// Builds a fresh context for one submission.
    fn build(&self) -> ExecutionContext;
}
