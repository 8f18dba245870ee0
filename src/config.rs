//! Configuration types for docmill

use serde::{Deserialize, Serialize};

/// Per-source failure policy for a task run
///
/// Under [`FailurePolicy::Strict`] the first failing source aborts the run.
/// Under [`FailurePolicy::Lenient`] a per-source failure is downgraded to a
/// warning notification and the remaining sources are still processed;
/// lenient mode never silently drops a failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the run on the first failing source (default)
    #[default]
    Strict,
    /// Downgrade per-source failures to warnings and continue
    Lenient,
}

impl FailurePolicy {
    /// True when per-source failures should be downgraded to warnings
    pub fn is_lenient(&self) -> bool {
        matches!(self, FailurePolicy::Lenient)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_is_the_default() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Strict);
        assert!(!FailurePolicy::default().is_lenient());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&FailurePolicy::Lenient).unwrap(),
            "\"lenient\""
        );
        let parsed: FailurePolicy = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(parsed, FailurePolicy::Strict);
    }
}
