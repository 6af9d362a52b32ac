//! Script execution on the driver process.
//!
//! The executor loads a distributed compiled unit, binds the submission's
//! named-value context into the evaluation scope, runs the script to
//! completion under the configured deadline, and captures its produced value.
//! Every failure along the way (loading, parsing, binding, running) is
//! converted into [`ExecutionOutcome::Failed`]; nothing propagates past this
//! boundary.

mod context;
mod engine;
mod sink;

use std::time::{Duration, Instant};

use rhai::{Dynamic, EvalAltResult, Scope};
use thiserror::Error;

pub use context::{ContextProvider, EngineInstaller, ExecutionContext};
pub use sink::{OutputSink, SinkPoisoned};

use crate::{compiler::ScriptImage, config::ScriptConfig};

use self::engine::create_engine;

/// The marker substituted for a script that produces no result.
pub const EMPTY_RETURN_MARKER: &str = "<empty>";

/// Extra wall-clock allowance for the blocking evaluation task to surface its
/// own deadline error before the async backstop fires.
const BLOCKING_GRACE: Duration = Duration::from_millis(250);

/// Errors raised while loading, binding, or running a script.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The distributed unit payload could not be loaded.
    #[error("failed to load compiled unit: {0}")]
    Load(#[from] crate::compiler::ImageDecodeError),

    /// The unit's source failed to parse on the executing node.
    #[error("failed to parse distributed script: {0}")]
    Parse(#[from] rhai::ParseError),

    /// The script raised an error while running.
    #[error("script runtime error: {0}")]
    Runtime(Box<EvalAltResult>),

    /// The script exceeded the configured execution deadline and was
    /// cancelled.
    #[error("script execution timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The evaluation task ended without producing a result.
    #[error("script execution was interrupted: {0}")]
    Interrupted(String),
}

/// The terminal state of one script execution.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The script ran to completion; carries the stringified produced value,
    /// or [`EMPTY_RETURN_MARKER`] when the script produced none.
    Returned(String),
    /// The script failed to load, bind, or run.
    Failed(ExecutionError),
}

/// Runs compiled units against the driver process.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    config: ScriptConfig,
}

impl ScriptExecutor {
    /// Creates an executor with the given script configuration.
    pub fn new(config: ScriptConfig) -> Self {
        Self { config }
    }

    /// Executes the entry unit payload with the given context, routing printed
    /// values into `sink`.
    pub async fn execute(
        &self,
        unit_payload: &[u8],
        context: ExecutionContext,
        sink: OutputSink,
    ) -> ExecutionOutcome {
        match self.run(unit_payload.to_vec(), context, sink).await {
            Ok(value) => ExecutionOutcome::Returned(value),
            Err(error) => {
                tracing::debug!(%error, "script execution failed");
                ExecutionOutcome::Failed(error)
            }
        }
    }

    async fn run(
        &self,
        payload: Vec<u8>,
        context: ExecutionContext,
        sink: OutputSink,
    ) -> Result<String, ExecutionError> {
        let timeout = self.config.execution_timeout;

        let evaluation = tokio::task::spawn_blocking(move || -> Result<String, ExecutionError> {
            let image = ScriptImage::decode(&payload)?;

            let mut engine = create_engine(&sink);

            // The progress hook is the cancellation point: once the deadline
            // passes, the next engine operation terminates the script.
            let deadline = Instant::now() + timeout;
            engine.on_progress(move |_operations| {
                if Instant::now() >= deadline { Some(Dynamic::UNIT) } else { None }
            });

            let mut scope = Scope::new();
            context.apply(&mut engine, &mut scope);

            let mut ast = engine.compile(&image.source)?;
            if image.debug_info {
                ast.set_source(image.unit_name.clone());
            }

            let value = engine
                .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
                .map_err(|error| {
                    if matches!(*error, EvalAltResult::ErrorTerminated(..)) {
                        ExecutionError::Timeout { timeout }
                    } else {
                        ExecutionError::Runtime(error)
                    }
                })?;

            Ok(render_value(&value))
        });

        // Backstop for scripts stuck inside a native call, where the progress
        // hook cannot fire. The blocking thread keeps running until the script
        // performs another engine operation, but the caller gets its answer.
        match tokio::time::timeout(timeout + BLOCKING_GRACE, evaluation).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ExecutionError::Interrupted(join_error.to_string())),
            Err(_) => Err(ExecutionError::Timeout { timeout }),
        }
    }
}

/// Stringifies a produced value, substituting the empty marker for unit.
fn render_value(value: &Dynamic) -> String {
    if value.is::<()>() { EMPTY_RETURN_MARKER.to_string() } else { value.to_string() }
}
