//! Job error taxonomy.

use thiserror::Error;

use reportrun_client::ClientError;

/// Failure of one `AsyncJob` operation.
///
/// A remote-reported `Failed`/`Skipped` run is not an error here: polling
/// returns normally and `AsyncJob::failed` reports the outcome as data.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JobError {
    /// A lifecycle precondition was violated by the caller. Never retried.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),

    /// A remote call failed. Transient failures surface here only after the
    /// retry policy is exhausted; the job's logical state is unchanged.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl JobError {
    pub fn invalid_usage(msg: impl Into<String>) -> Self {
        Self::InvalidUsage(msg.into())
    }
}
