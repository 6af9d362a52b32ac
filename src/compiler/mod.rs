//! Source compilation.
//!
//! Compilation is modeled as a capability behind the [`SourceCompiler`] trait
//! rather than a fixed front end, so alternative scripting languages can be
//! added as additional implementations. The shipped implementation,
//! [`RhaiSourceCompiler`], compiles Rhai source text into named, loadable
//! [`CompiledUnits`] and enforces the cluster-resolvability contract on every
//! submission.

mod ast_analysis;
mod image;
mod rhai;

use std::collections::BTreeMap;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;

pub use image::{IMAGE_FORMAT_VERSION, ImageDecodeError, ScriptImage};
pub use rhai::RhaiSourceCompiler;

/// Turns source text into a set of named, loadable code units.
#[cfg_attr(test, automock)]
pub trait SourceCompiler: Send + Sync {
    /// Compiles `source` under `unit_name`.
    ///
    /// Fails atomically: either every unit of the submission is returned or
    /// none is.
    fn compile(&self, unit_name: &str, source: &str) -> Result<CompiledUnits, CompilationError>;
}

/// Errors surfaced by compilation.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// The submitted source text is empty.
    #[error("script source is empty")]
    EmptySource,

    /// The source text failed to parse.
    #[error("script compilation failed: {0}")]
    Parse(#[from] ::rhai::ParseError),

    /// The script references a name that is not part of the pinned ambient
    /// binding set, so remote tasks could not resolve it.
    #[error(
        "script references `{name}`, which is not a cluster-resolvable binding; \
         available bindings: {available}"
    )]
    UnresolvableReference {
        /// The unresolvable name.
        name: String,
        /// Comma-separated list of binding names the compiler accepts.
        available: String,
    },

    /// A compiled unit could not be encoded into its loadable form.
    #[error("failed to encode compiled unit: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The compiled units of one submission: an entry unit plus any auxiliary
/// units, each mapping a fully qualified unit name to its payload bytes.
///
/// Owned exclusively by the submission that created it; never mutated after
/// being handed to the packager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnits {
    entry_name: String,
    entry_payload: Vec<u8>,
    aux: BTreeMap<String, Vec<u8>>,
}

impl CompiledUnits {
    /// Creates a unit set containing a single entry unit.
    pub fn single(entry_name: impl Into<String>, entry_payload: Vec<u8>) -> Self {
        Self { entry_name: entry_name.into(), entry_payload, aux: BTreeMap::new() }
    }

    /// Adds an auxiliary unit alongside the entry unit.
    pub fn insert(&mut self, name: impl Into<String>, payload: Vec<u8>) {
        self.aux.insert(name.into(), payload);
    }

    /// The name of the entry unit.
    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    /// The payload of the entry unit.
    pub fn entry_payload(&self) -> &[u8] {
        &self.entry_payload
    }

    /// Iterates over every unit, entry first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        std::iter::once((self.entry_name.as_str(), self.entry_payload.as_slice()))
            .chain(self.aux.iter().map(|(name, payload)| (name.as_str(), payload.as_slice())))
    }

    /// The number of units in the set.
    pub fn len(&self) -> usize {
        1 + self.aux.len()
    }

    /// Always false; a unit set holds at least the entry unit.
    pub fn is_empty(&self) -> bool {
        false
    }
}
