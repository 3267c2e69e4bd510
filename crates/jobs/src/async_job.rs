//! Lifecycle of one asynchronous remote report run.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use reportrun_client::{
    ClientError, ReportClient, ReportResult, ReportRun, ReportStatus, StatusRequest,
    StatusResponse,
};
use reportrun_core::{ReportParams, ReportRunId};

use crate::error::JobError;
use crate::retry::{with_retries, RetryPolicy};

/// State machine wrapping one remote report computation.
///
/// Drives a run through start → poll → terminal status, with
/// restart-on-failure and a batched polling adapter. Every transition takes
/// `&mut self`, so a job is owned by one caller at a time; the underlying
/// client may be shared freely across jobs.
///
/// A job is in exactly one of three phases, encoded by its fields:
/// never started (`run` and `finish_time` unset), in flight (`run` set,
/// `finish_time` unset), finished (`run` and `finish_time` set).
pub struct AsyncJob<C: ReportClient> {
    client: Arc<C>,
    params: ReportParams,
    retry_policy: RetryPolicy,
    run: Option<ReportRun>,
    start_time: Option<DateTime<Utc>>,
    finish_time: Option<DateTime<Utc>>,
    failed: bool,
}

impl<C: ReportClient> AsyncJob<C> {
    /// Create a job that has not been started yet.
    pub fn new(client: Arc<C>, params: ReportParams) -> Self {
        Self {
            client,
            params,
            retry_policy: RetryPolicy::default(),
            run: None,
            start_time: None,
            finish_time: None,
            failed: false,
        }
    }

    /// Replace the retry policy applied to remote calls.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn params(&self) -> &ReportParams {
        &self.params
    }

    /// Identifier of the current remote run, if one was started.
    pub fn run_id(&self) -> Option<&ReportRunId> {
        self.run.as_ref().map(|run| &run.id)
    }

    /// Start the remote computation.
    ///
    /// Transient service failures are retried per the policy before the call
    /// fails. A job can be started once; restart failed runs instead.
    pub fn start(&mut self) -> Result<(), JobError> {
        if self.run.is_some() {
            return Err(JobError::invalid_usage(format!(
                "{self}: already started, use restart instead"
            )));
        }

        let run = with_retries(&self.retry_policy, ClientError::is_transient, || {
            self.client.start_report(&self.params)
        })?;
        self.start_time = Some(Utc::now());
        info!(
            run_id = %run.id,
            time_range = %self.params.time_range(),
            breakdowns = %self.params.breakdowns_label(),
            "created report run"
        );
        self.run = Some(run);
        Ok(())
    }

    /// Discard a failed run and start a fresh one from the same parameters.
    ///
    /// Only a job whose last observed status was a failure terminal can be
    /// restarted; a running or succeeded run is not discardable.
    pub fn restart(&mut self) -> Result<(), JobError> {
        if self.run.is_none() || !self.failed {
            return Err(JobError::invalid_usage(format!(
                "{self}: only failed jobs can be restarted"
            )));
        }

        self.run = None;
        self.failed = false;
        self.start_time = None;
        self.finish_time = None;
        self.start()?;
        info!(job = %self, "restarted report run");
        Ok(())
    }

    /// Whether the run has reached a terminal status.
    ///
    /// Once a terminal status has been observed this answers from memory with
    /// no remote call. Otherwise it refreshes the snapshot (retrying
    /// transient failures) and evaluates the transition rule. Check `failed`
    /// to tell success from failure.
    pub fn completed(&mut self) -> Result<bool, JobError> {
        if self.finish_time.is_some() {
            return Ok(true);
        }
        self.refresh()?;
        Ok(self.check_status())
    }

    /// Deferred status request for a batched multi-job sweep.
    ///
    /// `None` when there is nothing to poll: the run already finished, or no
    /// run was ever started.
    pub fn batch_update_request(&self) -> Option<StatusRequest> {
        if self.finish_time.is_some() {
            return None;
        }
        let run = self.run.as_ref()?;
        Some(self.client.build_status_request(&run.id))
    }

    /// Fold one element of a batch status response into this job.
    ///
    /// Fields the response omits are retained from the prior snapshot, then
    /// the same transition rule as `completed` runs: the job ends in exactly
    /// the state a direct poll observing the same remote status would have
    /// produced. A response arriving after the run finished is ignored.
    pub fn process_batch_result(&mut self, response: &StatusResponse) -> Result<(), JobError> {
        if self.finish_time.is_some() {
            return Ok(());
        }
        let Some(run) = self.run.as_ref() else {
            return Err(JobError::invalid_usage(format!(
                "{self}: the job is not started"
            )));
        };

        let merged = self.client.parse_status_response(run, response)?;
        self.run = Some(merged);
        self.check_status();
        Ok(())
    }

    /// Whether the run ended in a failure terminal (`Failed`/`Skipped`).
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Time from start to the observed finish, or to now while running.
    ///
    /// `None` if the job was never started.
    pub fn elapsed_time(&self) -> Option<Duration> {
        let start = self.start_time?;
        let end = self.finish_time.unwrap_or_else(Utc::now);
        Some((end - start).to_std().unwrap_or_default())
    }

    /// Retrieve the output of a successfully finished run.
    ///
    /// No state transition; transient failures are retried per the policy.
    pub fn fetch_result(&self) -> Result<ReportResult, JobError> {
        let Some(run) = self.run.as_ref() else {
            return Err(JobError::invalid_usage(format!(
                "{self}: the job is not started"
            )));
        };
        if self.failed {
            return Err(JobError::invalid_usage(format!(
                "{self}: the job failed, there is no result to fetch"
            )));
        }

        let result = with_retries(&self.retry_policy, ClientError::is_transient, || {
            self.client.fetch_result(&run.id)
        })?;
        Ok(result)
    }

    /// Refresh the snapshot from the service, retrying transient failures.
    fn refresh(&mut self) -> Result<(), JobError> {
        let Some(run) = self.run.as_ref() else {
            return Err(JobError::invalid_usage(format!(
                "{self}: the job is not started"
            )));
        };

        let run_id = run.id.clone();
        let refreshed = with_retries(&self.retry_policy, ClientError::is_transient, || {
            self.client.refresh_status(&run_id)
        })?;
        self.run = Some(refreshed);
        Ok(())
    }

    /// Evaluate the last observed snapshot; true once terminal.
    ///
    /// Only called while the job is unfinished, so the finish timestamp is
    /// stamped at most once.
    fn check_status(&mut self) -> bool {
        let Some((status, percent)) = self
            .run
            .as_ref()
            .map(|run| (run.status, run.percent_complete))
        else {
            return false;
        };

        info!(job = %self, percent, status = %status, "report run progress");

        match status {
            ReportStatus::Completed => {
                // Stamped at poll time: an upper bound between status checks,
                // not the service-side completion instant.
                self.finish_time = Some(Utc::now());
                true
            }
            ReportStatus::Failed | ReportStatus::Skipped => {
                self.finish_time = Some(Utc::now());
                self.failed = true;
                let elapsed = self.elapsed_time().unwrap_or_default();
                info!(
                    job = %self,
                    status = %status,
                    elapsed_secs = elapsed.as_secs(),
                    "report run ended without a result"
                );
                true
            }
            ReportStatus::NotStarted | ReportStatus::Started | ReportStatus::Running => false,
        }
    }
}

impl<C: ReportClient> core::fmt::Display for AsyncJob<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let id = self
            .run
            .as_ref()
            .map(|run| run.id.as_str())
            .unwrap_or("<none>");
        write!(
            f,
            "ReportJob(id={id}, time_range={}, breakdowns={})",
            self.params.time_range(),
            self.params.breakdowns_label()
        )
    }
}
