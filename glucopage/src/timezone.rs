//! Choosing the timezone for displayed times, and formatting times in it.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::engine::Preferences;
use crate::status::StatusSnapshot;

/// Zone used when nothing better is known.
pub const FALLBACK_ZONE: &str = "UTC";

/// A timezone identifier chosen for display. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTimezone(String);

impl ResolvedTimezone {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResolvedTimezone {
    fn default() -> Self {
        ResolvedTimezone(FALLBACK_ZONE.to_owned())
    }
}

impl core::fmt::Display for ResolvedTimezone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// True if times can be formatted in the named zone.
pub fn is_recognized(name: &str) -> bool {
    name.parse::<Tz>().is_ok()
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Choose the display timezone.
///
/// An explicit override is taken as-is, even if it is not a known zone.
/// After that, the site's declared zone and then the local zone are used if they are known.
pub fn resolve_timezone(
    prefs: &Preferences,
    status: Option<&StatusSnapshot>,
    local: Option<&str>,
) -> ResolvedTimezone {
    if let Some(tz) = non_empty(prefs.timezone_override.as_deref()) {
        if !is_recognized(tz) {
            tracing::warn!("timezone override {:?} is not a known zone", tz);
        }
        return ResolvedTimezone(tz.to_owned());
    }
    let declared = non_empty(status.and_then(|s| s.declared_timezone.as_deref()));
    [declared, non_empty(local)]
        .into_iter()
        .flatten()
        .find(|tz| is_recognized(tz))
        .map_or_else(ResolvedTimezone::default, |tz| ResolvedTimezone(tz.to_owned()))
}

/// A time rendered for display, along with the zone it was rendered in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedTime {
    pub text: String,
    pub zone: String,
}

/// Format a Unix-epoch millisecond timestamp in the given zone.
///
/// A zone that can't be used falls back to UTC, and `zone` says so.
/// Missing or out-of-range timestamps render as `"?"`.
pub fn format_timestamp(timestamp_ms: Option<f64>, tz: &ResolvedTimezone) -> FormattedTime {
    let (zone, name) = match tz.as_str().parse::<Tz>() {
        Ok(zone) => (zone, tz.as_str().to_owned()),
        Err(_) => {
            tracing::debug!("formatting in {} instead of {:?}", FALLBACK_ZONE, tz.as_str());
            (Tz::UTC, FALLBACK_ZONE.to_owned())
        }
    };
    let text = timestamp_ms
        .filter(|ms| ms.is_finite())
        .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
        .map(|t| t.with_timezone(&zone).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_owned());
    FormattedTime { text, zone: name }
}
