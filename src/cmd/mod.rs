//! CLI subcommands.

pub mod exec;

pub use exec::ExecArgs;
