//! `reportrun-core` — shared primitives for driving remote report runs.
//!
//! This crate contains value types only (ids, parameters, validation); the
//! remote-service surface and the job state machine live in their own crates.

pub mod error;
pub mod id;
pub mod params;

pub use error::{CoreError, CoreResult};
pub use id::ReportRunId;
pub use params::{Breakdown, ReportParams, TimeRange};
