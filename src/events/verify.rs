use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Listener events every completed Spark application log is expected to contain
pub const DEFAULT_EXPECTED_EVENTS: &[&str] = &[
    "SparkListenerLogStart",
    "SparkListenerApplicationStart",
    "SparkListenerEnvironmentUpdate",
    "SparkListenerJobStart",
    "SparkListenerStageSubmitted",
    "SparkListenerTaskStart",
    "SparkListenerTaskEnd",
    "SparkListenerStageCompleted",
    "SparkListenerJobEnd",
    "SparkListenerApplicationEnd",
];

/// Result of checking expected event types against the ones observed in a log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureReport {
    /// Distinct expected event types, in the order given
    pub expected: Vec<String>,
    /// Expected event types never observed, in expected order
    pub missing: Vec<String>,
    /// Observed event types with their record counts
    pub observed: IndexMap<String, usize>,
}

impl CaptureReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check every expected event type against `observed` and report all that are missing
pub fn verify_captured<S: AsRef<str>>(
    expected: &[S],
    observed: &IndexMap<String, usize>,
) -> CaptureReport {
    let expected: IndexSet<String> = expected.iter().map(|e| e.as_ref().to_string()).collect();
    let missing = expected
        .iter()
        .filter(|event| observed.get(event.as_str()).is_none_or(|count| *count == 0))
        .cloned()
        .collect();

    CaptureReport { expected: expected.into_iter().collect(), missing, observed: observed.clone() }
}
