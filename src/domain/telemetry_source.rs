// Telemetry source descriptors and response parsing
use serde_json::Value;
use thiserror::Error;

use super::reading::{Reading, UNAVAILABLE};

/// How a numeric state becomes display text: `prefix + (value / divisor) + unit_suffix`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFormat {
    pub divisor: f64,
    pub precision: usize,
    pub prefix: String,
}

impl Default for NumericFormat {
    fn default() -> Self {
        Self {
            divisor: 1.0,
            precision: 0,
            prefix: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySource {
    pub id: String,
    pub label: String,
    pub endpoint_path: String,
    pub unit_suffix: String,
    pub numeric_format: NumericFormat,
    /// Whether the body also carries `last_updated` and is subject to staleness gating.
    pub timestamped: bool,
}

impl TelemetrySource {
    pub fn format_value(&self, raw: f64) -> String {
        let fmt = &self.numeric_format;
        format!(
            "{}{:.*}{}",
            fmt.prefix,
            fmt.precision,
            raw / fmt.divisor,
            self.unit_suffix
        )
    }

    /// Turn a parsed state into a reading. Anything but a number or an
    /// explicit "unavailable" becomes an error reading.
    pub fn to_reading(&self, state: &ParsedState) -> Reading {
        match state {
            ParsedState::Numeric(raw) => Reading::ok(&self.label, self.format_value(*raw), *raw),
            ParsedState::Unavailable => Reading::unavailable(&self.label),
            ParsedState::Empty | ParsedState::Malformed(_) => Reading::error(&self.label),
        }
    }
}

/// Outcome of pulling the `state` field out of a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedState {
    Numeric(f64),
    Unavailable,
    /// The body was valid but carried no state (e.g. an empty legacy array).
    Empty,
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Fetch(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("response carried no state")]
    Empty,
}

/// Locate the state object. Legacy endpoints wrap it in a one-element array.
fn state_object(body: &Value) -> Result<&Value, ParsedState> {
    match body {
        Value::Object(_) => Ok(body),
        Value::Array(items) => items.first().ok_or(ParsedState::Empty),
        other => Err(ParsedState::Malformed(format!(
            "expected object or array, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse a response body into a typed state.
pub fn parse_state(body: &str) -> ParsedState {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return ParsedState::Malformed(format!("invalid JSON: {}", e)),
    };

    let object = match state_object(&value) {
        Ok(object) => object,
        Err(state) => return state,
    };

    match object.get("state") {
        Some(Value::String(s)) if s == UNAVAILABLE => ParsedState::Unavailable,
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => ParsedState::Numeric(n),
            _ => ParsedState::Malformed(format!("non-numeric state {:?}", s)),
        },
        Some(Value::Number(n)) => n
            .as_f64()
            .map(ParsedState::Numeric)
            .unwrap_or_else(|| ParsedState::Malformed("unrepresentable number".to_string())),
        Some(other) => ParsedState::Malformed(format!("state is a {}", json_kind(other))),
        None => ParsedState::Malformed("missing state field".to_string()),
    }
}

/// Raw `state` string and `last_updated` text, when present.
pub fn parse_timestamp_fields(body: &str) -> (Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return (None, None);
    };
    let Ok(object) = state_object(&value) else {
        return (None, None);
    };

    let state = object.get("state").and_then(|s| match s {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let last_updated = object
        .get("last_updated")
        .and_then(Value::as_str)
        .map(str::to_string);

    (state, last_updated)
}

impl ParsedState {
    pub fn error(&self) -> Option<SourceError> {
        match self {
            ParsedState::Empty => Some(SourceError::Empty),
            ParsedState::Malformed(reason) => Some(SourceError::Malformed(reason.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::ReadingStatus;

    fn solar_now() -> TelemetrySource {
        TelemetrySource {
            id: "solar_now".to_string(),
            label: "solar now".to_string(),
            endpoint_path: "/~trick/epaper/now-ac-power.cgi".to_string(),
            unit_suffix: " kW".to_string(),
            numeric_format: NumericFormat {
                divisor: 1000.0,
                precision: 2,
                prefix: String::new(),
            },
            timestamped: false,
        }
    }

    #[test]
    fn test_format_with_divisor() {
        let source = solar_now();
        assert_eq!(source.format_value(1234.5), "1.23 kW");

        let today = TelemetrySource {
            unit_suffix: " kWh".to_string(),
            numeric_format: NumericFormat {
                divisor: 1000.0,
                precision: 1,
                prefix: String::new(),
            },
            ..source
        };
        assert_eq!(today.format_value(15678.9), "15.7 kWh");
    }

    #[test]
    fn test_format_with_prefix_and_no_decimals() {
        let temp = TelemetrySource {
            unit_suffix: "°".to_string(),
            numeric_format: NumericFormat::default(),
            ..solar_now()
        };
        assert_eq!(temp.format_value(72.0), "72°");

        let bill = TelemetrySource {
            unit_suffix: String::new(),
            numeric_format: NumericFormat {
                divisor: 1.0,
                precision: 2,
                prefix: "$".to_string(),
            },
            ..solar_now()
        };
        assert_eq!(bill.format_value(12.5), "$12.50");
    }

    #[test]
    fn test_parse_state_shapes() {
        assert_eq!(parse_state(r#"{"state": "1234.5"}"#), ParsedState::Numeric(1234.5));
        assert_eq!(parse_state(r#"{"state": 45}"#), ParsedState::Numeric(45.0));
        assert_eq!(parse_state(r#"{"state": "unavailable"}"#), ParsedState::Unavailable);
        assert_eq!(parse_state(r#"[{"state": "72.0"}]"#), ParsedState::Numeric(72.0));
        assert_eq!(parse_state("[]"), ParsedState::Empty);
    }

    #[test]
    fn test_parse_state_malformed() {
        assert!(matches!(parse_state("<html>oops"), ParsedState::Malformed(_)));
        assert!(matches!(parse_state(r#"{"value": "1"}"#), ParsedState::Malformed(_)));
        assert!(matches!(parse_state(r#"{"state": "abc"}"#), ParsedState::Malformed(_)));
        assert!(matches!(parse_state(r#"{"state": null}"#), ParsedState::Malformed(_)));
        assert!(matches!(parse_state(r#""1.0""#), ParsedState::Malformed(_)));
    }

    #[test]
    fn test_to_reading_statuses() {
        let source = solar_now();

        let ok = source.to_reading(&ParsedState::Numeric(1234.5));
        assert_eq!(ok.status, ReadingStatus::Ok);
        assert_eq!(ok.value, "1.23 kW");
        assert_eq!(ok.raw_numeric, Some(1234.5));

        let unavailable = source.to_reading(&ParsedState::Unavailable);
        assert_eq!(unavailable.status, ReadingStatus::Unavailable);
        assert_eq!(unavailable.value, "unavailable");

        let empty = source.to_reading(&ParsedState::Empty);
        assert_eq!(empty.status, ReadingStatus::Error);
        assert_eq!(empty.value, "err");
    }

    #[test]
    fn test_parse_timestamp_fields() {
        let (state, updated) = parse_timestamp_fields(
            r#"{"state": "123.4", "last_updated": "2023-01-01T12:00:00+00:00"}"#,
        );
        assert_eq!(state.as_deref(), Some("123.4"));
        assert_eq!(updated.as_deref(), Some("2023-01-01T12:00:00+00:00"));

        assert_eq!(parse_timestamp_fields("not json"), (None, None));
        assert_eq!(parse_timestamp_fields(r#"{"state": "1"}"#).1, None);
    }
}
