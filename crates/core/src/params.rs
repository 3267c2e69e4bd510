//! Report parameters: what period to report on and how to split the rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Inclusive date range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    since: NaiveDate,
    until: NaiveDate,
}

impl TimeRange {
    /// Create a range; `until` must not precede `since`.
    pub fn new(since: NaiveDate, until: NaiveDate) -> CoreResult<Self> {
        if until < since {
            return Err(CoreError::validation(format!(
                "time range: until {until} precedes since {since}"
            )));
        }
        Ok(Self { since, until })
    }

    /// Single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            since: date,
            until: date,
        }
    }

    pub fn since(&self) -> NaiveDate {
        self.since
    }

    pub fn until(&self) -> NaiveDate {
        self.until
    }

    /// Number of days covered, inclusive of both endpoints.
    pub fn days(&self) -> i64 {
        (self.until - self.since).num_days() + 1
    }
}

impl core::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}..{}", self.since, self.until)
    }
}

/// Dimension the remote service splits report rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breakdown {
    Age,
    Gender,
    Country,
    Region,
    Dma,
    Placement,
    DevicePlatform,
    PublisherPlatform,
}

impl Breakdown {
    pub fn as_str(&self) -> &'static str {
        match self {
            Breakdown::Age => "age",
            Breakdown::Gender => "gender",
            Breakdown::Country => "country",
            Breakdown::Region => "region",
            Breakdown::Dma => "dma",
            Breakdown::Placement => "placement",
            Breakdown::DevicePlatform => "device_platform",
            Breakdown::PublisherPlatform => "publisher_platform",
        }
    }
}

impl core::fmt::Display for Breakdown {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable configuration of one remote report computation.
///
/// Carries everything needed to start (and later restart) a run: the covered
/// time range, the requested breakdowns, and any extra service-specific
/// fields, kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportParams {
    time_range: TimeRange,
    #[serde(default)]
    breakdowns: Vec<Breakdown>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    extra: Map<String, Value>,
}

impl ReportParams {
    pub fn new(time_range: TimeRange) -> Self {
        Self {
            time_range,
            breakdowns: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_breakdowns(mut self, breakdowns: impl IntoIterator<Item = Breakdown>) -> Self {
        self.breakdowns = breakdowns.into_iter().collect();
        self
    }

    /// Attach a service-specific field (attribution window, level, ...).
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn time_range(&self) -> &TimeRange {
        &self.time_range
    }

    pub fn breakdowns(&self) -> &[Breakdown] {
        &self.breakdowns
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Compact breakdown list for log lines, `<none>` when empty.
    pub fn breakdowns_label(&self) -> String {
        if self.breakdowns.is_empty() {
            return "<none>".to_string();
        }
        self.breakdowns
            .iter()
            .map(Breakdown::as_str)
            .collect::<Vec<_>>()
            .join("+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn time_range_rejects_inverted_bounds() {
        let err = TimeRange::new(date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn time_range_counts_inclusive_days() {
        let range = TimeRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(range.days(), 31);
        assert_eq!(TimeRange::day(date(2024, 1, 1)).days(), 1);
    }

    #[test]
    fn time_range_displays_both_endpoints() {
        let range = TimeRange::new(date(2024, 1, 1), date(2024, 1, 7)).unwrap();
        assert_eq!(range.to_string(), "2024-01-01..2024-01-07");
    }

    #[test]
    fn breakdowns_label_joins_or_falls_back() {
        let range = TimeRange::day(date(2024, 3, 5));
        let none = ReportParams::new(range);
        assert_eq!(none.breakdowns_label(), "<none>");

        let some = ReportParams::new(range)
            .with_breakdowns([Breakdown::Age, Breakdown::Gender]);
        assert_eq!(some.breakdowns_label(), "age+gender");
    }

    #[test]
    fn extra_fields_survive_serde() {
        let params = ReportParams::new(TimeRange::day(date(2024, 3, 5)))
            .with_breakdowns([Breakdown::Country])
            .with_extra("level", serde_json::json!("ad"));

        let json = serde_json::to_string(&params).unwrap();
        let back: ReportParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
        assert_eq!(back.extra()["level"], serde_json::json!("ad"));
    }
}
