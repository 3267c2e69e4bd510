//! Run statuses reported by the remote service.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an asynchronous report run.
///
/// Wire strings use the service's verbose form (`"Job Completed"` etc.).
/// `Completed` is the single success terminal; `Failed` and `Skipped` are
/// failure terminals; everything else means the run is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "Job Not Started")]
    NotStarted,
    #[serde(rename = "Job Started")]
    Started,
    #[serde(rename = "Job Running")]
    Running,
    #[serde(rename = "Job Completed")]
    Completed,
    #[serde(rename = "Job Failed")]
    Failed,
    #[serde(rename = "Job Skipped")]
    Skipped,
}

impl ReportStatus {
    /// No further progress will be reported after a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReportStatus::Completed | ReportStatus::Failed | ReportStatus::Skipped
        )
    }

    /// Failure terminals: the run stopped without producing a result.
    pub fn is_failure(&self) -> bool {
        matches!(self, ReportStatus::Failed | ReportStatus::Skipped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::NotStarted => "Job Not Started",
            ReportStatus::Started => "Job Started",
            ReportStatus::Running => "Job Running",
            ReportStatus::Completed => "Job Completed",
            ReportStatus::Failed => "Job Failed",
            ReportStatus::Skipped => "Job Skipped",
        }
    }
}

impl core::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ReportStatus; 6] = [
        ReportStatus::NotStarted,
        ReportStatus::Started,
        ReportStatus::Running,
        ReportStatus::Completed,
        ReportStatus::Failed,
        ReportStatus::Skipped,
    ];

    #[test]
    fn terminal_and_failure_classification() {
        for status in ALL {
            match status {
                ReportStatus::Completed => {
                    assert!(status.is_terminal());
                    assert!(!status.is_failure());
                }
                ReportStatus::Failed | ReportStatus::Skipped => {
                    assert!(status.is_terminal());
                    assert!(status.is_failure());
                }
                _ => {
                    assert!(!status.is_terminal());
                    assert!(!status.is_failure());
                }
            }
        }
    }

    #[test]
    fn wire_strings_round_trip() {
        for status in ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: ReportStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }
}
