//! Trend arrows.

use crate::reading::TrendCode;

/// Named directions, fastest rise first, with their arrows.
/// The site's numeric codes count from 1 along this list.
const DIRECTIONS: [(&str, &str); 7] = [
    ("DoubleUp", "⇈"),
    ("SingleUp", "↑"),
    ("FortyFiveUp", "↗"),
    ("Flat", "→"),
    ("FortyFiveDown", "↘"),
    ("SingleDown", "↓"),
    ("DoubleDown", "⇊"),
];

/// The arrow for a trend code.
///
/// Names the table doesn't know are shown as sent, unknown numbers as their digits;
/// an absent code is the empty string.
pub fn map_trend(code: &TrendCode) -> String {
    match code {
        TrendCode::Absent => String::new(),
        TrendCode::Named(name) => DIRECTIONS
            .iter()
            .find(|(n, _)| n == name)
            .map_or_else(|| name.clone(), |(_, arrow)| (*arrow).to_owned()),
        TrendCode::Numeric(n) => usize::try_from(*n)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| DIRECTIONS.get(i))
            .map_or_else(|| n.to_string(), |(_, arrow)| (*arrow).to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(s: &str) -> TrendCode {
        TrendCode::Named(s.to_owned())
    }

    #[test]
    fn named_directions() {
        assert_eq!(map_trend(&named("DoubleUp")), "⇈");
        assert_eq!(map_trend(&named("Flat")), "→");
        assert_eq!(map_trend(&named("DoubleDown")), "⇊");
        assert_eq!(map_trend(&named("FortyFiveDown")), "↘");
    }

    #[test]
    fn numeric_codes_match_names() {
        for (i, (name, _)) in DIRECTIONS.iter().enumerate() {
            let code = TrendCode::Numeric(i as i64 + 1);
            assert_eq!(map_trend(&code), map_trend(&named(name)));
        }
    }

    #[test]
    fn numeric_codes() {
        assert_eq!(map_trend(&TrendCode::Numeric(1)), "⇈");
        assert_eq!(map_trend(&TrendCode::Numeric(3)), "↗");
        assert_eq!(map_trend(&TrendCode::Numeric(4)), "→");
        assert_eq!(map_trend(&TrendCode::Numeric(5)), "↘");
        assert_eq!(map_trend(&TrendCode::Numeric(7)), "⇊");
    }

    #[test]
    fn unknown_passes_through() {
        assert_eq!(map_trend(&named("Climbing")), "Climbing");
        assert_eq!(map_trend(&named("NOT COMPUTABLE")), "NOT COMPUTABLE");
        assert_eq!(map_trend(&named("")), "");
        assert_eq!(map_trend(&named("flat")), "flat");
        assert_eq!(map_trend(&TrendCode::Numeric(0)), "0");
        assert_eq!(map_trend(&TrendCode::Numeric(9)), "9");
        assert_eq!(map_trend(&TrendCode::Numeric(-1)), "-1");
        assert_eq!(map_trend(&TrendCode::Absent), "");
    }
}
