//! The Rhai implementation of [`SourceCompiler`].

use std::collections::BTreeSet;

use rhai::Engine;

use super::{
    CompilationError, CompiledUnits, IMAGE_FORMAT_VERSION, ScriptImage, SourceCompiler,
    ast_analysis,
};
use crate::config::ScriptConfig;

/// Compiles Rhai source text into loadable script images.
///
/// Beyond parsing, the compiler pins the submission-independence contract:
/// every free name a script reads must be one of the ambient bindings the
/// gateway injects into the execution scope. A script that slips a
/// driver-local name past compilation would parse and even run on the driver,
/// then fail with a resolution error the moment a remote task references it,
/// so the check happens here, before anything is distributed.
#[derive(Debug)]
pub struct RhaiSourceCompiler {
    engine: Engine,
    config: ScriptConfig,
    ambient_bindings: BTreeSet<String>,
}

impl RhaiSourceCompiler {
    /// Creates a compiler that accepts exactly the given ambient binding
    /// names.
    pub fn new(config: ScriptConfig, ambient_bindings: BTreeSet<String>) -> Self {
        Self { engine: Engine::new(), config, ambient_bindings }
    }

    fn check_bindings(&self, required: &BTreeSet<String>) -> Result<(), CompilationError> {
        for name in required {
            if !self.ambient_bindings.contains(name) {
                return Err(CompilationError::UnresolvableReference {
                    name: name.clone(),
                    available: self
                        .ambient_bindings
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        Ok(())
    }
}

impl SourceCompiler for RhaiSourceCompiler {
    fn compile(&self, unit_name: &str, source: &str) -> Result<CompiledUnits, CompilationError> {
        if source.trim().is_empty() {
            return Err(CompilationError::EmptySource);
        }

        let ast = self.engine.compile(source)?;

        let analysis = ast_analysis::analyze_ast(&ast);
        let required_bindings = analysis.free_roots();
        self.check_bindings(&required_bindings)?;

        let image = ScriptImage {
            format: IMAGE_FORMAT_VERSION,
            unit_name: unit_name.to_string(),
            source: source.to_string(),
            required_bindings,
            debug_info: self.config.debug_info,
        };

        Ok(CompiledUnits::single(unit_name, image.encode()?))
    }
}
