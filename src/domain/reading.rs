// Reading domain models
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Display string for a source that failed to fetch or parse.
pub const ERROR_PLACEHOLDER: &str = "err";

/// Display string for a source that reported itself unavailable.
pub const UNAVAILABLE: &str = "unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingStatus {
    Ok,
    Unavailable,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub label: String,
    pub value: String,
    pub raw_numeric: Option<f64>,
    pub status: ReadingStatus,
}

impl Reading {
    pub fn ok(label: impl Into<String>, value: String, raw_numeric: f64) -> Self {
        Self {
            label: label.into(),
            value,
            raw_numeric: Some(raw_numeric),
            status: ReadingStatus::Ok,
        }
    }

    pub fn unavailable(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: UNAVAILABLE.to_string(),
            raw_numeric: None,
            status: ReadingStatus::Unavailable,
        }
    }

    pub fn error(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: ERROR_PLACEHOLDER.to_string(),
            raw_numeric: None,
            status: ReadingStatus::Error,
        }
    }
}

/// A reading whose source also reports when it last changed.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedReading {
    pub reading: Reading,
    pub last_updated: Option<DateTime<Utc>>,
    pub reported_state: Option<String>,
}

impl TimestampedReading {
    pub fn new(
        reading: Reading,
        last_updated: Option<DateTime<Utc>>,
        reported_state: Option<String>,
    ) -> Self {
        Self {
            reading,
            last_updated,
            reported_state,
        }
    }
}

/// Everything gathered during one render cycle.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub readings: BTreeMap<String, Reading>,
    pub timestamped: BTreeMap<String, TimestampedReading>,
}

impl Snapshot {
    /// Display text for a source id; sources that produced nothing show the error placeholder.
    pub fn value_of(&self, id: &str) -> &str {
        self.reading(id)
            .map(|r| r.value.as_str())
            .unwrap_or(ERROR_PLACEHOLDER)
    }

    pub fn reading(&self, id: &str) -> Option<&Reading> {
        self.readings
            .get(id)
            .or_else(|| self.timestamped.get(id).map(|t| &t.reading))
    }

    pub fn count_by_status(&self, status: ReadingStatus) -> usize {
        self.readings
            .values()
            .chain(self.timestamped.values().map(|t| &t.reading))
            .filter(|r| r.status == status)
            .count()
    }
}
