//! The response shape returned for every submission.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The structured result of one submission.
///
/// Exactly one of the two shapes is returned: `{output, return}` on success
/// or `{exception}` on failure; key presence distinguishes the cases.
/// A failure envelope intentionally carries no output: anything the script
/// printed before failing is discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    /// The script ran to completion.
    Success {
        /// The deduplicated values the script printed, in sorted order.
        output: Vec<String>,
        /// The stringified produced value.
        #[serde(rename = "return")]
        return_value: String,
    },
    /// The submission failed at some stage of the pipeline.
    Failure {
        /// The full diagnostic for the failure.
        exception: String,
    },
}

impl ResponseEnvelope {
    /// Builds a success envelope from captured output and a return value.
    ///
    /// The captured set is sorted so the wire shape is deterministic; the
    /// collection semantics remain unordered and deduplicating.
    pub fn success(output: HashSet<String>, return_value: impl Into<String>) -> Self {
        let mut output: Vec<String> = output.into_iter().collect();
        output.sort();
        Self::Success { output, return_value: return_value.into() }
    }

    /// Builds a failure envelope from a diagnostic.
    pub fn failure(exception: impl Into<String>) -> Self {
        Self::Failure { exception: exception.into() }
    }

    /// Returns true for failure envelopes.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_shape_has_exactly_output_and_return() {
        let envelope =
            ResponseEnvelope::success(HashSet::from(["b".to_string(), "a".to_string()]), "42");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value, json!({ "output": ["a", "b"], "return": "42" }));
    }

    #[test]
    fn test_failure_shape_has_exactly_exception() {
        let envelope = ResponseEnvelope::failure("boom");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value, json!({ "exception": "boom" }));
    }

    #[test]
    fn test_round_trip() {
        let success = ResponseEnvelope::success(HashSet::from(["x".to_string()]), "1");
        let failure = ResponseEnvelope::failure("boom");

        let success_json = serde_json::to_string(&success).unwrap();
        let failure_json = serde_json::to_string(&failure).unwrap();

        assert_eq!(serde_json::from_str::<ResponseEnvelope>(&success_json).unwrap(), success);
        assert_eq!(serde_json::from_str::<ResponseEnvelope>(&failure_json).unwrap(), failure);
    }

    #[test]
    fn test_is_failure() {
        assert!(ResponseEnvelope::failure("e").is_failure());
        assert!(!ResponseEnvelope::success(HashSet::new(), "1").is_failure());
    }
}
