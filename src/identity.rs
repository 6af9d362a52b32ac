//! Per-submission artifact identities.
//!
//! Every submission gets a name that is unique for the lifetime of the
//! process, used both as the compiled unit name and as the archive file stem
//! on cluster-shared storage. Deriving the name from the submission timestamp
//! alone would let two submissions landing within the same millisecond collide
//! on the archive path, so the timestamp is combined with a process-wide
//! monotonic sequence number.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::Utc;

/// A unique name for one script submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptIdentity {
    name: String,
}

impl ScriptIdentity {
    fn new(timestamp_millis: i64, sequence: u64) -> Self {
        Self { name: format!("script_{timestamp_millis}_{sequence}") }
    }

    /// The fully qualified name of the submission's entry compiled unit.
    pub fn unit_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ScriptIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Issues collision-free [`ScriptIdentity`] values.
#[derive(Debug, Default)]
pub struct IdentityGenerator {
    sequence: AtomicU64,
}

impl IdentityGenerator {
    /// Creates a new generator with the sequence counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity for the next submission.
    pub fn next(&self) -> ScriptIdentity {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        ScriptIdentity::new(Utc::now().timestamp_millis(), sequence)
    }
}
