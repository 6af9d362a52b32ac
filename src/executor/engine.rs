//! Per-execution engine construction.

use rhai::Engine;

use super::sink::OutputSink;

/// Creates a fresh engine for one execution, with the script's print channels
/// wired into that execution's own sink.
///
/// Engines are never shared across executions; a shared engine would make the
/// print hooks a process-wide channel and let concurrent submissions
/// interleave their captured output.
pub(crate) fn create_engine(sink: &OutputSink) -> Engine {
    let mut engine = Engine::new();

    let print_sink = sink.clone();
    engine.on_print(move |text| print_sink.record(text));

    let debug_sink = sink.clone();
    engine.on_debug(move |text, _source, _pos| debug_sink.record(text));

    engine
}
