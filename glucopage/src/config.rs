//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};

use crate::engine::{Preferences, UnitOverride};
use crate::html::PageSettings;

#[derive(Parser, Debug)]
#[command(name = "glucopage", version, about = "Build a static glucose status page")]
pub struct Config {
    #[arg(long, env = "NIGHTSCOUT_URL", help = "Base URL of the glucose site")]
    pub site: String,

    #[arg(
        long,
        env = "NIGHTSCOUT_TOKEN",
        hide_env_values = true,
        help = "Bearer credential passed to the site"
    )]
    pub token: Option<String>,

    #[arg(long, env = "DISPLAY_UNITS", help = "Show values in `mmol` or `mgdl`")]
    pub units: Option<String>,

    #[arg(
        long,
        env = "FORCE_MMOL",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        help = "Always show mmol/L"
    )]
    pub force_mmol: bool,

    #[arg(long, env = "DISPLAY_TZ", help = "Timezone for displayed times")]
    pub timezone: Option<String>,

    #[arg(
        long,
        env = "OUTPUT_PATH",
        default_value = "public/index.html",
        help = "Where to write the page"
    )]
    pub output: PathBuf,

    #[arg(long, env = "PAGE_TITLE", default_value = "Glucose")]
    pub title: String,

    #[arg(
        long,
        env = "REFRESH_SECS",
        default_value_t = 60,
        help = "Viewers reload the page this often"
    )]
    pub refresh_secs: u64,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 20)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn preferences(&self) -> Preferences {
        let unit_override = self.units.as_deref().and_then(|s| {
            let parsed = UnitOverride::parse(s);
            if parsed.is_none() && !s.trim().is_empty() {
                tracing::warn!("ignoring unknown unit override {:?}", s);
            }
            parsed
        });
        Preferences {
            force_mmol: self.force_mmol,
            unit_override,
            timezone_override: self
                .timezone
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        }
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            title: self.title.clone(),
            refresh_secs: self.refresh_secs,
        }
    }

    pub fn client_settings(&self) -> feed::ClientSettings {
        feed::ClientSettings::default()
            .with_token(self.token.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("glucopage").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn defaults() {
        let c = parse(&["--site", "https://cgm.example.com"]);
        assert_eq!(c.output, PathBuf::from("public/index.html"));
        assert_eq!(c.refresh_secs, 60);
        assert_eq!(c.page_settings().title, "Glucose");
        assert_eq!(c.preferences(), Preferences::default());
    }

    #[test]
    fn preferences_from_flags() {
        let c = parse(&[
            "--site",
            "https://cgm.example.com",
            "--units",
            "mg/dL",
            "--force-mmol",
            "--timezone",
            " Europe/Oslo ",
        ]);
        let p = c.preferences();
        assert!(p.force_mmol);
        assert_eq!(p.unit_override, Some(UnitOverride::MgDl));
        assert_eq!(p.timezone_override.as_deref(), Some("Europe/Oslo"));
    }

    #[test]
    fn unknown_units_are_ignored() {
        let c = parse(&["--site", "x", "--units", "stones", "--timezone", ""]);
        let p = c.preferences();
        assert_eq!(p.unit_override, None);
        assert_eq!(p.timezone_override, None);
    }
}
