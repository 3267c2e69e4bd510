//! In-memory report service for tests/dev.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use serde_json::json;
use tracing::debug;

use reportrun_core::{ReportParams, ReportRunId};

use crate::client::{ClientError, ReportClient};
use crate::run::{ReportResult, ReportRun};
use crate::status::ReportStatus;

/// Remote-call counters, for asserting on traffic in tests.
///
/// Failed attempts count too, so retry behavior is observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CallCounts {
    pub starts: u64,
    pub refreshes: u64,
    pub fetches: u64,
}

struct RunState {
    params: ReportParams,
    sequence: Vec<ReportStatus>,
    /// Next sequence index to serve; the last entry repeats.
    cursor: usize,
    last: ReportStatus,
}

/// Queue of failures consumed FIFO, one per call, before the call proceeds.
#[derive(Default)]
struct FailureQueue(RwLock<VecDeque<ClientError>>);

impl FailureQueue {
    fn push(&self, err: ClientError) {
        self.0.write().unwrap().push_back(err);
    }

    fn pop(&self) -> Option<ClientError> {
        self.0.write().unwrap().pop_front()
    }
}

/// Scripted stand-in for the remote report service.
///
/// Every started run walks the configured status sequence, one step per
/// refresh; the final status repeats once reached. Transient and permanent
/// failures can be queued per operation to exercise retry paths. State lives
/// in process memory only; this is not a transport.
pub struct InMemoryReportService {
    sequence: Vec<ReportStatus>,
    runs: RwLock<HashMap<ReportRunId, RunState>>,
    start_failures: FailureQueue,
    refresh_failures: FailureQueue,
    fetch_failures: FailureQueue,
    counts: RwLock<CallCounts>,
}

impl InMemoryReportService {
    /// Service whose runs complete on the first refresh.
    pub fn new() -> Self {
        Self::with_sequence([ReportStatus::Completed])
    }

    /// Service whose runs report the given statuses on successive refreshes.
    pub fn with_sequence(sequence: impl IntoIterator<Item = ReportStatus>) -> Self {
        let sequence: Vec<_> = sequence.into_iter().collect();
        assert!(!sequence.is_empty(), "status sequence must not be empty");
        Self {
            sequence,
            runs: RwLock::new(HashMap::new()),
            start_failures: FailureQueue::default(),
            refresh_failures: FailureQueue::default(),
            fetch_failures: FailureQueue::default(),
            counts: RwLock::new(CallCounts::default()),
        }
    }

    /// Fail the next `start_report` call with `err`.
    pub fn fail_next_start(&self, err: ClientError) {
        self.start_failures.push(err);
    }

    /// Fail the next `refresh_status` call with `err`.
    pub fn fail_next_refresh(&self, err: ClientError) {
        self.refresh_failures.push(err);
    }

    /// Fail the next `fetch_result` call with `err`.
    pub fn fail_next_fetch(&self, err: ClientError) {
        self.fetch_failures.push(err);
    }

    pub fn calls(&self) -> CallCounts {
        *self.counts.read().unwrap()
    }

    fn serve(&self, state: &mut RunState) -> (ReportStatus, u8) {
        let idx = state.cursor;
        let status = state.sequence[idx];
        if idx + 1 < state.sequence.len() {
            state.cursor += 1;
        }
        state.last = status;

        let percent = if status == ReportStatus::Completed {
            100
        } else {
            (((idx + 1) * 100 / state.sequence.len()) as u8).min(99)
        };
        (status, percent)
    }
}

impl Default for InMemoryReportService {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportClient for InMemoryReportService {
    fn start_report(&self, params: &ReportParams) -> Result<ReportRun, ClientError> {
        self.counts.write().unwrap().starts += 1;
        if let Some(err) = self.start_failures.pop() {
            return Err(err);
        }

        let id = ReportRunId::generate();
        debug!(run_id = %id, time_range = %params.time_range(), "simulated run created");
        self.runs.write().unwrap().insert(
            id.clone(),
            RunState {
                params: params.clone(),
                sequence: self.sequence.clone(),
                cursor: 0,
                last: ReportStatus::Started,
            },
        );
        Ok(ReportRun::started(id))
    }

    fn refresh_status(&self, run_id: &ReportRunId) -> Result<ReportRun, ClientError> {
        self.counts.write().unwrap().refreshes += 1;
        if let Some(err) = self.refresh_failures.pop() {
            return Err(err);
        }

        let mut runs = self.runs.write().unwrap();
        let state = runs
            .get_mut(run_id)
            .ok_or_else(|| ClientError::UnknownRun(run_id.clone()))?;
        let (status, percent) = self.serve(state);
        Ok(ReportRun {
            id: run_id.clone(),
            status,
            percent_complete: percent,
        })
    }

    fn fetch_result(&self, run_id: &ReportRunId) -> Result<ReportResult, ClientError> {
        self.counts.write().unwrap().fetches += 1;
        if let Some(err) = self.fetch_failures.pop() {
            return Err(err);
        }

        let runs = self.runs.read().unwrap();
        let state = runs
            .get(run_id)
            .ok_or_else(|| ClientError::UnknownRun(run_id.clone()))?;
        if state.last != ReportStatus::Completed {
            return Err(ClientError::Rejected(format!(
                "run {run_id} has no result (status {})",
                state.last
            )));
        }

        let range = state.params.time_range();
        Ok(ReportResult {
            rows: vec![json!({
                "date_start": range.since().to_string(),
                "date_stop": range.until().to_string(),
                "breakdowns": state.params.breakdowns(),
            })],
        })
    }
}

#[cfg(test)]
mod tests {
    use reportrun_core::TimeRange;

    use super::*;

    fn params() -> ReportParams {
        ReportParams::new(TimeRange::day("2024-05-01".parse().unwrap()))
    }

    #[test]
    fn runs_walk_the_sequence_and_hold_the_tail() {
        let service = InMemoryReportService::with_sequence([
            ReportStatus::Running,
            ReportStatus::Completed,
        ]);
        let run = service.start_report(&params()).unwrap();
        assert_eq!(run.status, ReportStatus::Started);

        assert_eq!(
            service.refresh_status(&run.id).unwrap().status,
            ReportStatus::Running
        );
        let done = service.refresh_status(&run.id).unwrap();
        assert_eq!(done.status, ReportStatus::Completed);
        assert_eq!(done.percent_complete, 100);
        // tail repeats
        assert_eq!(
            service.refresh_status(&run.id).unwrap().status,
            ReportStatus::Completed
        );
    }

    #[test]
    fn unknown_run_is_an_error() {
        let service = InMemoryReportService::new();
        let missing = ReportRunId::new("missing");
        assert!(matches!(
            service.refresh_status(&missing),
            Err(ClientError::UnknownRun(_))
        ));
        assert!(matches!(
            service.fetch_result(&missing),
            Err(ClientError::UnknownRun(_))
        ));
    }

    #[test]
    fn queued_failures_fire_once_and_count_as_calls() {
        let service = InMemoryReportService::new();
        let run = service.start_report(&params()).unwrap();

        service.fail_next_refresh(ClientError::RateLimited("throttled".into()));
        assert!(service.refresh_status(&run.id).is_err());
        assert!(service.refresh_status(&run.id).is_ok());
        assert_eq!(service.calls().refreshes, 2);
    }

    #[test]
    fn result_requires_a_completed_run() {
        let service = InMemoryReportService::with_sequence([ReportStatus::Running]);
        let run = service.start_report(&params()).unwrap();
        service.refresh_status(&run.id).unwrap();

        assert!(matches!(
            service.fetch_result(&run.id),
            Err(ClientError::Rejected(_))
        ));
    }

    #[test]
    fn result_echoes_the_requested_range() {
        let service = InMemoryReportService::new();
        let run = service.start_report(&params()).unwrap();
        service.refresh_status(&run.id).unwrap();

        let result = service.fetch_result(&run.id).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0]["date_start"], "2024-05-01");
    }
}
