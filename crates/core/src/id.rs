//! Strongly-typed identifiers.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Identifier of a remote report run.
///
/// Run ids are assigned by the remote service and are opaque here; the only
/// local requirement is that they are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportRunId(String);

impl ReportRunId {
    /// Wrap a server-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Real services assign their own ids; this
    /// exists for the in-memory service and tests.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ReportRunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ReportRunId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CoreError::invalid_id("ReportRunId: empty"));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<ReportRunId> for String {
    fn from(value: ReportRunId) -> Self {
        value.0
    }
}
