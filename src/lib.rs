#![warn(missing_docs)]
//! Catapult is a script execution gateway: callers submit dynamic script
//! source text, and the gateway compiles it, makes the compiled units
//! resolvable on every node of a compute cluster, executes the script against
//! the driver process, and returns the captured output, return value, or
//! failure trace as a single structured response.

pub mod cluster;
pub mod cmd;
pub mod compiler;
pub mod config;
pub mod context;
pub mod executor;
pub mod http_server;
pub mod identity;
pub mod initialization;
pub mod packager;
pub mod pipeline;
pub mod test_helpers;
