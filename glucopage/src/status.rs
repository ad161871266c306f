//! Site settings relevant to display: declared unit, timezone, and device battery.

use serde_json::Value;

/// Key paths for the declared display unit, in priority order.
const UNIT_PATHS: [&[&str]; 3] = [&["settings", "units"], &["settings", "displayUnits"], &["units"]];

/// Key paths for the declared timezone, in priority order.
const TIMEZONE_PATHS: [&[&str]; 3] = [
    &["settings", "timezone"],
    &["settings", "timeZone"],
    &["timezone"],
];

/// What the site says about itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub declared_unit: Option<String>,
    pub declared_timezone: Option<String>,
    /// The whole status document, for fields read on demand (battery).
    pub payload: Value,
}

impl StatusSnapshot {
    pub fn from_payload(payload: &Value) -> Self {
        StatusSnapshot {
            declared_unit: first_string(payload, &UNIT_PATHS),
            declared_timezone: first_string(payload, &TIMEZONE_PATHS),
            payload: payload.clone(),
        }
    }
}

/// Battery level of the uploading device, or `"?"`.
///
/// Looks under the `device` record first, then at the top level.
pub fn extract_battery(payload: Option<&Value>) -> String {
    payload
        .and_then(battery_field)
        .unwrap_or_else(|| "?".to_owned())
}

fn battery_field(payload: &Value) -> Option<String> {
    [&["device", "battery"][..], &["battery"][..]]
        .iter()
        .find_map(|path| lookup(payload, path).and_then(display_scalar))
}

fn lookup<'a>(v: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(v, |v, key| v.get(key))
}

fn first_string(v: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| {
        lookup(v, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    })
}

/// Strings verbatim, numbers as JSON renders them.
fn display_scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
