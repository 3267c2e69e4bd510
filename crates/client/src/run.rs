//! Run snapshots and deferred status-poll wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use reportrun_core::ReportRunId;

use crate::status::ReportStatus;

/// Immutable snapshot of a remote report run.
///
/// A job replaces its snapshot wholesale on every status update; nothing
/// mutates one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRun {
    pub id: ReportRunId,
    pub status: ReportStatus,
    /// Server-reported progress, 0..=100.
    pub percent_complete: u8,
}

impl ReportRun {
    /// Snapshot of a freshly created run.
    pub fn started(id: ReportRunId) -> Self {
        Self {
            id,
            status: ReportStatus::Started,
            percent_complete: 0,
        }
    }

    /// Apply a partial status response on top of this snapshot.
    ///
    /// Fields the service omitted are retained from the prior snapshot; the
    /// result is a new snapshot, the prior one is untouched.
    pub fn merged(&self, patch: &RunPatch) -> ReportRun {
        ReportRun {
            id: self.id.clone(),
            status: patch.status.unwrap_or(self.status),
            percent_complete: patch.percent_complete.unwrap_or(self.percent_complete),
        }
    }
}

/// Partial fields of a status response; `None` means "not reported".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<u8>,
}

impl RunPatch {
    pub fn status(status: ReportStatus) -> Self {
        Self {
            status: Some(status),
            percent_complete: None,
        }
    }

    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent_complete = Some(percent);
        self
    }
}

/// Deferred status-check request for one run.
///
/// Built per job and merged by the caller into a single multi-run batch call
/// instead of one refresh round trip per job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub run_id: ReportRunId,
}

/// One element of a batch status response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub run_id: ReportRunId,
    #[serde(flatten)]
    pub patch: RunPatch,
}

/// Raw output of a completed run.
///
/// Rows are kept opaque; decoding them is the caller's concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub rows: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn snapshot(status: ReportStatus, percent: u8) -> ReportRun {
        ReportRun {
            id: ReportRunId::new("run-1"),
            status,
            percent_complete: percent,
        }
    }

    #[test]
    fn merge_overrides_reported_fields() {
        let prior = snapshot(ReportStatus::Running, 40);
        let next = prior.merged(&RunPatch::status(ReportStatus::Completed).with_percent(100));

        assert_eq!(next.status, ReportStatus::Completed);
        assert_eq!(next.percent_complete, 100);
        // prior snapshot untouched
        assert_eq!(prior.status, ReportStatus::Running);
        assert_eq!(prior.percent_complete, 40);
    }

    #[test]
    fn merge_retains_omitted_fields() {
        let prior = snapshot(ReportStatus::Running, 40);

        let status_only = prior.merged(&RunPatch::status(ReportStatus::Running));
        assert_eq!(status_only.percent_complete, 40);

        let percent_only = prior.merged(&RunPatch::default().with_percent(75));
        assert_eq!(percent_only.status, ReportStatus::Running);
        assert_eq!(percent_only.percent_complete, 75);
    }

    #[test]
    fn empty_patch_is_identity() {
        let prior = snapshot(ReportStatus::Started, 5);
        assert_eq!(prior.merged(&RunPatch::default()), prior);
    }

    #[test]
    fn status_response_flattens_patch_fields() {
        let response = StatusResponse {
            run_id: ReportRunId::new("run-9"),
            patch: RunPatch::status(ReportStatus::Completed).with_percent(100),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["run_id"], "run-9");
        assert_eq!(json["status"], "Job Completed");
        assert_eq!(json["percent_complete"], 100);
    }

    fn arb_status() -> impl Strategy<Value = ReportStatus> {
        prop_oneof![
            Just(ReportStatus::NotStarted),
            Just(ReportStatus::Started),
            Just(ReportStatus::Running),
            Just(ReportStatus::Completed),
            Just(ReportStatus::Failed),
            Just(ReportStatus::Skipped),
        ]
    }

    proptest! {
        /// Every merged field comes from either the patch or the prior
        /// snapshot, and the id never changes.
        #[test]
        fn merge_never_invents_fields(
            prior_status in arb_status(),
            prior_percent in 0u8..=100,
            patch_status in proptest::option::of(arb_status()),
            patch_percent in proptest::option::of(0u8..=100),
        ) {
            let prior = snapshot(prior_status, prior_percent);
            let patch = RunPatch { status: patch_status, percent_complete: patch_percent };
            let next = prior.merged(&patch);

            prop_assert_eq!(next.id, prior.id);
            prop_assert_eq!(next.status, patch_status.unwrap_or(prior_status));
            prop_assert_eq!(next.percent_complete, patch_percent.unwrap_or(prior_percent));
        }
    }
}
