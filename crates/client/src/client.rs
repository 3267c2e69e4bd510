//! Client capability for driving remote report runs.

use thiserror::Error;

use reportrun_core::{ReportParams, ReportRunId};

use crate::run::{ReportResult, ReportRun, StatusRequest, StatusResponse};

/// Failure of one remote call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// Throttled by the service; eligible for backoff.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network-level fault (connect, reset, timeout); eligible for backoff.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service rejected the request outright (bad parameters, denied).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The service does not know the given run.
    #[error("unknown report run: {0}")]
    UnknownRun(ReportRunId),

    /// A response could not be decoded or matched to its run.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// Whether a call failing this way may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::RateLimited(_) | ClientError::Transport(_)
        )
    }
}

/// Operations the remote report service exposes to a job.
///
/// One implementation is shared by many jobs at once; each job owns only its
/// own parameters and snapshot, never the connection. Calls block until the
/// service answers.
pub trait ReportClient: Send + Sync {
    /// Kick off an asynchronous report computation.
    fn start_report(&self, params: &ReportParams) -> Result<ReportRun, ClientError>;

    /// Re-fetch the current snapshot of a run.
    fn refresh_status(&self, run_id: &ReportRunId) -> Result<ReportRun, ClientError>;

    /// Retrieve the output of a finished run.
    fn fetch_result(&self, run_id: &ReportRunId) -> Result<ReportResult, ClientError>;

    /// Build a deferred status-check request for one run, to be merged into
    /// a caller-driven batch call.
    fn build_status_request(&self, run_id: &ReportRunId) -> StatusRequest {
        StatusRequest {
            run_id: run_id.clone(),
        }
    }

    /// Fold one element of a batch response into a prior snapshot.
    ///
    /// Pure merge: fields absent from the response are retained from the
    /// prior snapshot. Fails if the response belongs to a different run.
    fn parse_status_response(
        &self,
        prior: &ReportRun,
        response: &StatusResponse,
    ) -> Result<ReportRun, ClientError> {
        if response.run_id != prior.id {
            return Err(ClientError::MalformedResponse(format!(
                "response for run {} applied to run {}",
                response.run_id, prior.id
            )));
        }
        Ok(prior.merged(&response.patch))
    }
}
