//! Display unit inference and formatting of glucose values.
//!
//! Values are carried internally in mg/dL. The scale the site used is decided once per
//! reading (the unit the site declares, else a guess from the reading's value) and applied
//! to both the value and its delta; output is then rendered in the resolved display unit.

use crate::engine::{Preferences, UnitOverride};
use crate::reading::{RawDelta, RawValue};
use crate::status::StatusSnapshot;

/// mg/dL per mmol/L of glucose.
pub const MGDL_PER_MMOL: f64 = 18.0182;

/// Largest value guessed to be in mmol/L when the site declares no unit.
const MMOL_CEILING: f64 = 40.0;

fn looks_like_mmol(v: f64) -> bool {
    v > 0.0 && v <= MMOL_CEILING
}

/// Unit shown on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayUnit {
    MgDl,
    MmolL,
}

impl DisplayUnit {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayUnit::MgDl => "mg/dL",
            DisplayUnit::MmolL => "mmol/L",
        }
    }

    fn from_mgdl(&self, mgdl: f64) -> f64 {
        match self {
            DisplayUnit::MgDl => mgdl,
            DisplayUnit::MmolL => mgdl / MGDL_PER_MMOL,
        }
    }

    /// Whole numbers for mg/dL, one decimal place for mmol/L.
    fn render(&self, v: f64) -> String {
        match self {
            DisplayUnit::MgDl => format!("{}", v.round() as i64),
            DisplayUnit::MmolL => format!("{:.1}", v),
        }
    }
}

/// Unit the site sent a reading in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceScale {
    MgDl,
    MmolL,
}

fn declared_scale(status: Option<&StatusSnapshot>) -> Option<SourceScale> {
    let declared = status?.declared_unit.as_deref()?;
    Some(if declared.to_ascii_lowercase().contains("mmol") {
        SourceScale::MmolL
    } else {
        SourceScale::MgDl
    })
}

impl SourceScale {
    /// The unit the site declares; a guess from the value only if it declares none.
    ///
    /// Low readings from an mg/dL site (sensors report 39 or 40 for "LOW") stay mg/dL.
    pub fn resolve(status: Option<&StatusSnapshot>, value: &RawValue) -> Self {
        declared_scale(status).unwrap_or_else(|| SourceScale::infer(value))
    }

    /// Guess from the magnitude of the reading's value.
    pub fn infer(value: &RawValue) -> Self {
        match value.finite() {
            Some(v) if looks_like_mmol(v) => SourceScale::MmolL,
            _ => SourceScale::MgDl,
        }
    }

    fn to_mgdl(self, v: f64) -> f64 {
        match self {
            SourceScale::MgDl => v,
            SourceScale::MmolL => v * MGDL_PER_MMOL,
        }
    }
}

/// Choose the display unit.
///
/// Explicit preferences win, then the unit the site declares,
/// then a guess from the magnitude of the value.
pub fn resolve_unit(
    prefs: &Preferences,
    status: Option<&StatusSnapshot>,
    value: &RawValue,
) -> DisplayUnit {
    if prefs.force_mmol {
        return DisplayUnit::MmolL;
    }
    match prefs.unit_override {
        Some(UnitOverride::Mmol) => return DisplayUnit::MmolL,
        Some(UnitOverride::MgDl) => return DisplayUnit::MgDl,
        None => {}
    }
    match SourceScale::resolve(status, value) {
        SourceScale::MmolL => DisplayUnit::MmolL,
        SourceScale::MgDl => DisplayUnit::MgDl,
    }
}

/// Render a reading's value in the display unit.
///
/// `scale` is the unit the site sent the value in.
/// Missing or non-finite values are `"?"`; non-numeric text is shown as sent.
pub fn format_value(value: &RawValue, scale: SourceScale, unit: DisplayUnit) -> String {
    match value {
        RawValue::Text(s) => s.clone(),
        RawValue::Number(v) if v.is_finite() => {
            let mgdl = scale.to_mgdl(*v);
            unit.render(unit.from_mgdl(mgdl))
        }
        _ => "?".to_owned(),
    }
}

/// Render a delta in the display unit, always signed.
///
/// `scale` must be the scale of the reading the delta belongs to.
/// A missing delta renders as the empty string.
pub fn format_delta(delta: &RawDelta, scale: SourceScale, unit: DisplayUnit) -> String {
    let (negative, magnitude) = match delta {
        RawDelta::Missing => return String::new(),
        RawDelta::Number(v) if !v.is_finite() => return String::new(),
        RawDelta::Number(v) => (*v < 0.0, v.abs()),
        RawDelta::Text(s) => match parse_signed(s) {
            Some(parsed) => parsed,
            None => return s.clone(),
        },
    };
    let sign = if negative { '-' } else { '+' };
    let rendered = unit.render(unit.from_mgdl(scale.to_mgdl(magnitude)));
    format!("{sign}{rendered}")
}

/// Split `"+2"`, `"-1.5"`, `"3"` into (is negative, magnitude).
/// An explicit sign wins over the sign of the number.
fn parse_signed(s: &str) -> Option<(bool, f64)> {
    let s = s.trim();
    let (explicit, rest) = if let Some(rest) = s.strip_prefix('+') {
        (Some(false), rest)
    } else if let Some(rest) = s.strip_prefix('-').or_else(|| s.strip_prefix('\u{2212}')) {
        (Some(true), rest)
    } else {
        (None, s)
    };
    let v = rest.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((explicit.unwrap_or(v < 0.0), v.abs()))
}
