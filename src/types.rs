//! Core types and events for docmill

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One input item enumerated in a task's parameter list
///
/// The display name feeds `[BASENAME]` substitution and error messages. When
/// not supplied it is derived from the file name of the path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Path to the input item
    pub path: PathBuf,
    /// Display name used for `[BASENAME]` substitution and error messages
    pub name: String,
}

impl Source {
    /// Create a source whose display name is derived from the file name of `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    /// Create a source with an explicit display name
    pub fn with_name(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Path to the input item
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name of the input item
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Events published by a task run
///
/// Consumers receive these over the notification channel of an
/// [`ExecutionContext`](crate::executor::ExecutionContext). The channel is
/// per-invocation, so events carry no task identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Task validated and started
    Started,

    /// Progress update after a source was attempted
    StepsCompleted {
        /// Number of sources attempted so far (1-based)
        completed: usize,
        /// Total number of sources in the run
        total: usize,
    },

    /// A per-source failure was downgraded under the lenient policy
    Warning {
        /// Human-readable description of the downgraded failure
        message: String,
    },

    /// Task completed successfully
    Completed {
        /// Wall-clock duration of the run in milliseconds
        elapsed_ms: u64,
    },

    /// Task failed
    Failed {
        /// Rendered error message
        error: String,
    },

    /// Task stopped because cancellation was requested
    Cancelled,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_name_derives_from_file_name() {
        let source = Source::new("/data/in/report.pdf");
        assert_eq!(source.name(), "report.pdf");

        let named = Source::with_name("/data/in/x.pdf", "quarterly report");
        assert_eq!(named.name(), "quarterly report");
    }

    #[test]
    fn events_serialize_tagged() {
        let event = Event::StepsCompleted {
            completed: 2,
            total: 5,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            "{\"type\":\"steps_completed\",\"completed\":2,\"total\":5}"
        );

        let started = serde_json::to_string(&Event::Started).unwrap();
        assert_eq!(started, "{\"type\":\"started\"}");
    }
}
