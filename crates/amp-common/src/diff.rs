//! Diff reporting for field reconcilers.
//!
//! Reconcilers describe every change they make to an existing object through
//! a `DiffReporter`. Reports are **observability only**: they never feed back
//! into control decisions and a reporter must never fail a reconcile pass.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

#[cfg(test)]
use mockall::automock;

/// Sink for human-readable descriptions of detected changes.
#[cfg_attr(test, automock)]
pub trait DiffReporter: Send + Sync {
    /// Record that `object` (a `Kind/name` identifier) changed as described.
    fn report(&self, object: &str, description: &str);
}

/// Production implementation writing each diff as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiffReporter;

impl DiffReporter for TracingDiffReporter {
    fn report(&self, object: &str, description: &str) {
        info!(object = %object, "{}", description);
    }
}

/// No-op implementation for callers that do not care about diffs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiffReporter;

impl DiffReporter for NoopDiffReporter {
    fn report(&self, _object: &str, _description: &str) {}
}

/// A single recorded diff
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffRecord {
    /// Object identifier (`Kind/name`)
    pub object: String,
    /// Description of the change
    pub description: String,
}

/// Reporter that keeps every diff in memory.
///
/// Used by tests and by the CLI to summarize a run.
#[derive(Debug, Default)]
pub struct RecordingDiffReporter {
    records: Mutex<Vec<DiffRecord>>,
}

impl RecordingDiffReporter {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all diffs recorded so far
    pub fn records(&self) -> Vec<DiffRecord> {
        self.records.lock().clone()
    }

    /// Number of diffs recorded so far
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DiffReporter for RecordingDiffReporter {
    fn report(&self, object: &str, description: &str) {
        self.records.lock().push(DiffRecord {
            object: object.to_string(),
            description: description.to_string(),
        });
    }
}

/// Render the structural difference between two values as a JSON Patch.
///
/// The patch transforms `existing` into `desired`, which reads naturally in
/// a log line ("replace /nodeAffinity/... with ..."). Values that fail to
/// serialize diff as `null`.
pub fn structural_diff<T: Serialize + ?Sized>(existing: &T, desired: &T) -> String {
    let existing = serde_json::to_value(existing).unwrap_or_default();
    let desired = serde_json::to_value(desired).unwrap_or_default();
    let patch = json_patch::diff(&existing, &desired);
    serde_json::to_string(&patch).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use std::sync::Arc;

    #[test]
    fn reporters_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingDiffReporter>();
        assert_send_sync::<NoopDiffReporter>();
        assert_send_sync::<RecordingDiffReporter>();
    }

    #[test]
    fn recording_reporter_keeps_order() {
        let reporter = RecordingDiffReporter::new();
        assert!(reporter.is_empty());

        reporter.report("DeploymentConfig/zync", "first");
        reporter.report("DeploymentConfig/zync-que", "second");

        assert_eq!(reporter.len(), 2);
        let records = reporter.records();
        assert_eq!(records[0].object, "DeploymentConfig/zync");
        assert_eq!(records[1].description, "second");
    }

    #[test]
    fn recording_reporter_behind_trait_object() {
        let reporter = Arc::new(RecordingDiffReporter::new());
        let sink: Arc<dyn DiffReporter> = reporter.clone();
        sink.report("DeploymentConfig/apicast", "changed");
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn noop_and_tracing_reporters_do_not_panic() {
        NoopDiffReporter.report("DeploymentConfig/x", "y");
        TracingDiffReporter.report("DeploymentConfig/x", "y");
    }

    #[test]
    fn mock_reporter_sees_exact_arguments() {
        let mut mock = MockDiffReporter::new();
        mock.expect_report()
            .with(eq("DeploymentConfig/zync"), eq("replicas changed"))
            .times(1)
            .return_const(());
        mock.report("DeploymentConfig/zync", "replicas changed");
    }

    #[test]
    fn structural_diff_of_equal_values_is_empty() {
        let a = serde_json::json!({"requests": {"cpu": "1"}});
        assert_eq!(structural_diff(&a, &a), "[]");
    }

    #[test]
    fn structural_diff_names_changed_path() {
        let existing = serde_json::json!({"requests": {"cpu": "1000m"}});
        let desired = serde_json::json!({"requests": {"cpu": "2"}});
        let diff = structural_diff(&existing, &desired);
        assert!(diff.contains("replace"), "{diff}");
        assert!(diff.contains("/requests/cpu"), "{diff}");
        assert!(diff.contains("\"2\""), "{diff}");
    }

    #[test]
    fn structural_diff_of_absent_value() {
        let existing: Option<Vec<String>> = None;
        let desired = Some(vec!["a".to_string()]);
        let diff = structural_diff(&existing, &desired);
        assert!(diff.contains("replace"), "{diff}");
        assert!(diff.contains("\"a\""), "{diff}");
    }
}
