//! Types for surfacing the latest glucose reading.

use serde_json::Value;

/// A glucose value as the site sent it.
///
/// Sites send either a JSON number or a numeric string;
/// anything else that is present is kept as text so it can be shown as-is.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawValue {
    pub fn from_json(v: Option<&Value>) -> Self {
        match v {
            None | Some(Value::Null) => RawValue::Missing,
            Some(Value::Number(n)) => n.as_f64().map_or(RawValue::Missing, RawValue::Number),
            Some(Value::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    RawValue::Missing
                } else if let Ok(v) = s.parse::<f64>() {
                    RawValue::Number(v)
                } else {
                    RawValue::Text(s.to_owned())
                }
            }
            Some(other) => RawValue::Text(other.to_string()),
        }
    }

    /// The value, if it is a usable number.
    pub fn finite(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

/// Change since the previous reading, as the site sent it.
///
/// Text is kept unparsed, since it may carry an explicit sign (`"+2"`, `"-0"`).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawDelta {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawDelta {
    pub fn from_json(v: Option<&Value>) -> Self {
        match v {
            None | Some(Value::Null) => RawDelta::Missing,
            Some(Value::Number(n)) => n.as_f64().map_or(RawDelta::Missing, RawDelta::Number),
            Some(Value::String(s)) if s.trim().is_empty() => RawDelta::Missing,
            Some(Value::String(s)) => RawDelta::Text(s.trim().to_owned()),
            Some(other) => RawDelta::Text(other.to_string()),
        }
    }
}

/// Direction of change, either as a numeric code or a named direction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TrendCode {
    Numeric(i64),
    Named(String),
    #[default]
    Absent,
}

impl TrendCode {
    /// Prefers the named `direction`, falling back to the numeric `trend`.
    fn from_entry(entry: &Value) -> Self {
        if let Some(name) = entry.get("direction").and_then(Value::as_str) {
            if !name.trim().is_empty() {
                return TrendCode::Named(name.trim().to_owned());
            }
        }
        match entry.get("trend") {
            Some(Value::Number(n)) => n
                .as_i64()
                .map_or_else(|| TrendCode::Named(n.to_string()), TrendCode::Numeric),
            Some(Value::String(s)) if !s.trim().is_empty() => match s.trim().parse::<i64>() {
                Ok(code) => TrendCode::Numeric(code),
                Err(_) => TrendCode::Named(s.trim().to_owned()),
            },
            _ => TrendCode::Absent,
        }
    }
}

/// The most recent reading from the site.
///
/// Any field may be missing; an empty reading list yields a sample with every field missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadingSample {
    /// Glucose value, in whatever unit the site sends.
    pub value: RawValue,

    /// Change since the previous reading, in the same unit as `value`.
    pub delta: RawDelta,

    pub trend: TrendCode,

    /// Time at which the reading was taken, in milliseconds since the Unix epoch.
    pub timestamp_ms: Option<f64>,
}

impl ReadingSample {
    /// Picks the latest reading out of a reading payload.
    ///
    /// The payload is normally an object with a `bgs` list;
    /// a bare list of entries is accepted too.
    pub fn from_payload(payload: &Value) -> Self {
        let latest = match payload {
            Value::Array(entries) => entries.first(),
            other => other
                .get("bgs")
                .and_then(Value::as_array)
                .and_then(|bgs| bgs.first()),
        };
        match latest {
            Some(entry) => Self::from_entry(entry),
            None => {
                tracing::warn!("reading payload has no entries");
                Default::default()
            }
        }
    }

    fn from_entry(entry: &Value) -> Self {
        let delta = match entry.get("bgdelta") {
            Some(v) if !v.is_null() => RawDelta::from_json(Some(v)),
            _ => RawDelta::from_json(entry.get("delta")),
        };
        let timestamp_ms = ["datetime", "date"]
            .iter()
            .find_map(|key| RawValue::from_json(entry.get(*key)).finite());
        ReadingSample {
            value: RawValue::from_json(entry.get("sgv")),
            delta,
            trend: TrendCode::from_entry(entry),
            timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn latest_of_pebble() {
        let payload = json!({
            "status": [{"now": 1700000000000u64}],
            "bgs": [
                {"sgv": "120", "trend": 4, "direction": "Flat", "datetime": 1699999990000u64, "bgdelta": "+2"},
                {"sgv": "118", "trend": 4, "direction": "Flat", "datetime": 1699999690000u64, "bgdelta": "0"}
            ]
        });
        let s = ReadingSample::from_payload(&payload);
        assert_eq!(s.value, RawValue::Number(120.0));
        assert_eq!(s.delta, RawDelta::Text("+2".to_owned()));
        assert_eq!(s.trend, TrendCode::Named("Flat".to_owned()));
        assert_eq!(s.timestamp_ms, Some(1699999990000.0));
    }

    #[test]
    fn bare_entry_list() {
        let payload = json!([{"sgv": 95, "delta": -3.5, "trend": 5, "date": 1700000000000u64}]);
        let s = ReadingSample::from_payload(&payload);
        assert_eq!(s.value, RawValue::Number(95.0));
        assert_eq!(s.delta, RawDelta::Number(-3.5));
        assert_eq!(s.trend, TrendCode::Numeric(5));
        assert_eq!(s.timestamp_ms, Some(1700000000000.0));
    }

    #[test]
    fn empty_lists_are_unknown() {
        assert_eq!(ReadingSample::from_payload(&json!({"bgs": []})), ReadingSample::default());
        assert_eq!(ReadingSample::from_payload(&json!([])), ReadingSample::default());
        assert_eq!(ReadingSample::from_payload(&json!({})), ReadingSample::default());
        assert_eq!(ReadingSample::from_payload(&json!(null)), ReadingSample::default());
    }

    #[test]
    fn odd_values_are_kept() {
        assert_eq!(
            RawValue::from_json(Some(&json!("LOW"))),
            RawValue::Text("LOW".to_owned())
        );
        assert_eq!(RawValue::from_json(Some(&json!(""))), RawValue::Missing);
        assert_eq!(RawValue::from_json(Some(&json!(null))), RawValue::Missing);
        assert_eq!(RawDelta::from_json(Some(&json!(" "))), RawDelta::Missing);
    }

    #[test]
    fn empty_direction_falls_back_to_trend() {
        let s = ReadingSample::from_payload(&json!({"bgs": [{"direction": "", "trend": "2"}]}));
        assert_eq!(s.trend, TrendCode::Numeric(2));
        let s = ReadingSample::from_payload(&json!({"bgs": [{"sgv": 100}]}));
        assert_eq!(s.trend, TrendCode::Absent);
        assert_eq!(s.timestamp_ms, None);
        assert_eq!(s.delta, RawDelta::Missing);
    }

    #[test]
    fn timestamp_as_string() {
        let s = ReadingSample::from_payload(&json!({"bgs": [{"datetime": "1700000000000"}]}));
        assert_eq!(s.timestamp_ms, Some(1700000000000.0));
        let s = ReadingSample::from_payload(&json!({"bgs": [{"datetime": "yesterday"}]}));
        assert_eq!(s.timestamp_ms, None);
    }
}
