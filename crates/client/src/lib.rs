//! `reportrun-client` — surface of the remote report service.
//!
//! ## Components
//!
//! - `ReportStatus`: closed lifecycle statuses the service reports
//! - `ReportRun`: immutable snapshot of one remote run, with a pure
//!   reuse-and-patch merge for partial status responses
//! - `StatusRequest`/`StatusResponse`: deferred status-poll wire types used
//!   by batched multi-run sweeps
//! - `ReportClient`: capability trait (start, refresh, batch adapters, fetch)
//! - `InMemoryReportService`: scripted simulator for tests/dev
//!
//! The real transport (HTTP, SDK, batching layer) is the caller's concern;
//! everything here is transport-agnostic.

pub mod client;
pub mod run;
pub mod sim;
pub mod status;

pub use client::{ClientError, ReportClient};
pub use run::{ReportResult, ReportRun, RunPatch, StatusRequest, StatusResponse};
pub use sim::{CallCounts, InMemoryReportService};
pub use status::ReportStatus;
