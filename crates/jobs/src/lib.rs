//! Asynchronous report-job lifecycle.
//!
//! ## Design
//!
//! - One `AsyncJob` wraps one remote report run plus its retry policy
//! - Closed status lifecycle with exhaustive transitions
//! - Exponential backoff applied to transient remote failures only
//! - Batched status sweeps via deferred request/response adapters
//! - Restart-on-failure, reusing the job's stored parameters
//!
//! ## Components
//!
//! - `AsyncJob`: the state machine around one remote run
//! - `RetryPolicy` / `with_retries`: backoff schedule and the wrapper applied
//!   at each remote call site
//! - `JobError`: usage violations vs remote-call failures

pub mod async_job;
pub mod error;
pub mod retry;

pub use async_job::AsyncJob;
pub use error::JobError;
pub use retry::{with_retries, BackoffStrategy, RetryPolicy};
