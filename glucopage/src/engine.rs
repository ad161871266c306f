//! Derives everything shown on the page from one reading and the site's status.
//!
//! Nothing here does I/O or reads the clock: the current time and the local zone are
//! passed in, so the derivation is a pure function of its arguments.

use crate::reading::ReadingSample;
use crate::status::{extract_battery, StatusSnapshot};
use crate::timezone::{format_timestamp, resolve_timezone};
use crate::trend::map_trend;
use crate::units::{format_delta, format_value, resolve_unit, SourceScale};

/// General unit override.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitOverride {
    Mmol,
    MgDl,
}

impl UnitOverride {
    /// Lenient parse: `mmol`, `mmol/L`, `mgdl`, `mg/dL`, any case.
    pub fn parse(s: &str) -> Option<Self> {
        let s: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match s.as_str() {
            "mmol" | "mmoll" => Some(UnitOverride::Mmol),
            "mgdl" | "mg" => Some(UnitOverride::MgDl),
            _ => None,
        }
    }
}

/// Display preferences of whoever runs the build. These beat anything the site says.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preferences {
    /// Always show mmol/L.
    pub force_mmol: bool,
    pub unit_override: Option<UnitOverride>,
    pub timezone_override: Option<String>,
}

/// Everything fetched for one build.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs {
    pub reading: ReadingSample,
    /// Absent if the status could not be fetched.
    pub status: Option<StatusSnapshot>,
}

/// Text for each slot of the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderFields {
    pub display_value: String,
    pub display_delta: String,
    pub trend_symbol: String,
    pub age_label: String,
    pub battery_label: String,
    pub timestamp_label: String,
    pub unit_label: String,
    pub timezone_label: String,
    /// When the page was built, in the same zone as `timestamp_label`.
    pub generated_label: String,
}

/// Whole minutes since the reading, as `"<n>m ago"`.
///
/// Readings from the future are `"0m ago"`; a missing timestamp is `"?"`.
pub fn compute_age(timestamp_ms: Option<f64>, now_ms: f64) -> String {
    match timestamp_ms {
        Some(ts) if ts.is_finite() && now_ms.is_finite() => {
            let minutes = ((now_ms - ts) / 60_000.0).floor().max(0.0);
            format!("{}m ago", minutes as i64)
        }
        _ => "?".to_owned(),
    }
}

pub struct Engine {
    prefs: Preferences,
}

impl Engine {
    pub fn new(prefs: Preferences) -> Self {
        Engine { prefs }
    }

    /// Derive the page's fields.
    ///
    /// Total: every missing or malformed input shows up as a placeholder, never an error.
    pub fn derive(&self, inputs: &Inputs, now_ms: f64, local_tz: Option<&str>) -> RenderFields {
        let reading = &inputs.reading;
        let status = inputs.status.as_ref();

        let unit = resolve_unit(&self.prefs, status, &reading.value);
        let scale = SourceScale::resolve(status, &reading.value);
        let tz = resolve_timezone(&self.prefs, status, local_tz);
        tracing::debug!(
            "showing {} (site sent {:?}) in {}",
            unit.label(),
            scale,
            tz
        );

        let taken = format_timestamp(reading.timestamp_ms, &tz);
        let generated = format_timestamp(Some(now_ms), &tz);

        RenderFields {
            display_value: format_value(&reading.value, scale, unit),
            display_delta: format_delta(&reading.delta, scale, unit),
            trend_symbol: map_trend(&reading.trend),
            age_label: compute_age(reading.timestamp_ms, now_ms),
            battery_label: extract_battery(status.map(|s| &s.payload)),
            timestamp_label: taken.text,
            unit_label: unit.label().to_owned(),
            timezone_label: taken.zone,
            generated_label: generated.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{RawDelta, RawValue, TrendCode};
    use serde_json::json;

    // 2023-11-14 22:13:20 UTC
    const NOW: f64 = 1_700_000_000_000.0;

    fn reading(value: RawValue) -> ReadingSample {
        ReadingSample {
            value,
            delta: RawDelta::Text("+2".into()),
            trend: TrendCode::Named("DoubleUp".into()),
            timestamp_ms: Some(NOW - 5.5 * 60_000.0),
        }
    }

    #[test]
    fn ages() {
        assert_eq!(compute_age(Some(NOW - 5.5 * 60_000.0), NOW), "5m ago");
        assert_eq!(compute_age(Some(NOW), NOW), "0m ago");
        assert_eq!(compute_age(Some(NOW + 10.0 * 60_000.0), NOW), "0m ago");
        assert_eq!(compute_age(None, NOW), "?");
        assert_eq!(compute_age(Some(f64::NAN), NOW), "?");
    }

    #[test]
    fn unit_overrides() {
        assert_eq!(UnitOverride::parse("mmol"), Some(UnitOverride::Mmol));
        assert_eq!(UnitOverride::parse(" mmol/L "), Some(UnitOverride::Mmol));
        assert_eq!(UnitOverride::parse("MG/DL"), Some(UnitOverride::MgDl));
        assert_eq!(UnitOverride::parse("mgdl"), Some(UnitOverride::MgDl));
        assert_eq!(UnitOverride::parse("furlongs"), None);
        assert_eq!(UnitOverride::parse(""), None);
    }

    #[test]
    fn plain_mgdl() {
        let inputs = Inputs {
            reading: reading(RawValue::Number(120.0)),
            status: None,
        };
        let f = Engine::new(Preferences::default()).derive(&inputs, NOW, None);
        assert_eq!(f.display_value, "120");
        assert_eq!(f.unit_label, "mg/dL");
        assert_eq!(f.display_delta, "+2");
        assert_eq!(f.trend_symbol, "⇈");
        assert_eq!(f.age_label, "5m ago");
        assert_eq!(f.battery_label, "?");
        assert_eq!(f.timestamp_label, "2023-11-14 22:07");
        assert_eq!(f.timezone_label, "UTC");
        assert_eq!(f.generated_label, "2023-11-14 22:13");
    }

    #[test]
    fn small_values_are_mmol() {
        let mut r = reading(RawValue::Number(6.5));
        r.delta = RawDelta::Text("-0.3".into());
        let inputs = Inputs { reading: r, status: None };
        let f = Engine::new(Preferences::default()).derive(&inputs, NOW, None);
        assert_eq!(f.display_value, "6.5");
        assert_eq!(f.display_delta, "-0.3");
        assert_eq!(f.unit_label, "mmol/L");
    }

    #[test]
    fn forced_mmol() {
        let prefs = Preferences {
            force_mmol: true,
            ..Default::default()
        };
        let inputs = Inputs {
            reading: reading(RawValue::Number(120.0)),
            status: None,
        };
        let f = Engine::new(prefs).derive(&inputs, NOW, None);
        assert_eq!(f.display_value, "6.7");
        assert_eq!(f.display_delta, "+0.1");
        assert_eq!(f.unit_label, "mmol/L");
    }

    #[test]
    fn status_fills_in() {
        let inputs = Inputs {
            reading: reading(RawValue::Number(10.0)),
            status: Some(StatusSnapshot::from_payload(&json!({
                "settings": {"units": "mmol", "timezone": "Asia/Tokyo"},
                "device": {"battery": 77}
            }))),
        };
        let f = Engine::new(Preferences::default()).derive(&inputs, NOW, Some("Europe/London"));
        assert_eq!(f.display_value, "10.0");
        assert_eq!(f.unit_label, "mmol/L");
        assert_eq!(f.battery_label, "77");
        assert_eq!(f.timezone_label, "Asia/Tokyo");
        assert_eq!(f.timestamp_label, "2023-11-15 07:07");
    }

    #[test]
    fn low_reading_from_mgdl_site() {
        let mut r = reading(RawValue::Number(38.0));
        r.delta = RawDelta::Text("-4".into());
        let inputs = Inputs {
            reading: r,
            status: Some(StatusSnapshot::from_payload(&json!({"settings": {"units": "mg/dl"}}))),
        };
        let f = Engine::new(Preferences::default()).derive(&inputs, NOW, None);
        assert_eq!(f.display_value, "38");
        assert_eq!(f.display_delta, "-4");
        assert_eq!(f.unit_label, "mg/dL");

        let prefs = Preferences {
            force_mmol: true,
            ..Default::default()
        };
        let f = Engine::new(prefs).derive(&inputs, NOW, None);
        assert_eq!(f.display_value, "2.1");
        assert_eq!(f.display_delta, "-0.2");
        assert_eq!(f.unit_label, "mmol/L");
    }

    #[test]
    fn empty_reading() {
        let f = Engine::new(Preferences::default()).derive(&Inputs::default(), NOW, None);
        assert_eq!(f.display_value, "?");
        assert_eq!(f.display_delta, "");
        assert_eq!(f.trend_symbol, "");
        assert_eq!(f.age_label, "?");
        assert_eq!(f.timestamp_label, "?");
        assert_eq!(f.unit_label, "mg/dL");
        assert_eq!(f.timezone_label, "UTC");
    }
}
