// Staleness gating for timestamped readings
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Default freshness threshold.
pub const DEFAULT_THRESHOLD_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    /// The source gave no usable timestamp; rendered the same as stale.
    Unknown,
}

impl Freshness {
    pub fn is_fresh(self) -> bool {
        self == Freshness::Fresh
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StalenessGate {
    threshold: Duration,
}

impl StalenessGate {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn is_fresh(&self, last_updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last_updated) < self.threshold
    }

    pub fn evaluate(&self, last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Freshness {
        match last_updated {
            Some(ts) if self.is_fresh(ts, now) => Freshness::Fresh,
            Some(_) => Freshness::Stale,
            None => Freshness::Unknown,
        }
    }
}

impl Default for StalenessGate {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_THRESHOLD_MINUTES))
    }
}

/// Parse an ISO-8601 timestamp and normalise it to UTC.
/// A timestamp without an offset is taken to be UTC already.
pub fn parse_last_updated(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        parse_last_updated("2023-01-01T13:30:00+00:00").unwrap()
    }

    #[test]
    fn test_ninety_minutes_is_stale() {
        let gate = StalenessGate::default();
        let updated = now() - Duration::minutes(90);
        assert!(!gate.is_fresh(updated, now()));
        assert_eq!(gate.evaluate(Some(updated), now()), Freshness::Stale);
    }

    #[test]
    fn test_threshold_boundary() {
        let gate = StalenessGate::default();
        assert!(gate.is_fresh(now() - Duration::minutes(59), now()));
        assert!(!gate.is_fresh(now() - Duration::minutes(60), now()));
    }

    #[test]
    fn test_offsets_are_normalised_to_utc() {
        // 07:45 at -05:00 is 12:45 UTC, 45 minutes before now
        let updated = parse_last_updated("2023-01-01T07:45:00-05:00").unwrap();
        let gate = StalenessGate::default();
        assert!(gate.is_fresh(updated, now()));
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        let naive = parse_last_updated("2023-01-01T12:00:00").unwrap();
        assert_eq!(naive, parse_last_updated("2023-01-01T12:00:00+00:00").unwrap());
        assert_eq!(
            parse_last_updated("2023-01-01T12:00:00.250"),
            Some(naive + Duration::milliseconds(250))
        );
        assert_eq!(StalenessGate::default().evaluate(Some(naive), now()), Freshness::Stale);
        assert_eq!(
            StalenessGate::default().evaluate(parse_last_updated("2023-01-01T13:00:00"), now()),
            Freshness::Fresh
        );
    }

    #[test]
    fn test_missing_timestamp_is_unknown() {
        let gate = StalenessGate::default();
        assert_eq!(gate.evaluate(None, now()), Freshness::Unknown);
        assert!(!Freshness::Unknown.is_fresh());
        assert_eq!(parse_last_updated("yesterday"), None);
    }
}
