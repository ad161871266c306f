//! A glucose status page.
//!
//! Reads the latest glucose reading and the site status from a Nightscout-style site,
//! works out what to show (unit, timezone, value, delta, trend arrow, age, battery),
//! and writes a single self-contained HTML page that reloads itself.
//! Meant to be run periodically, with the output published by a static host.
//!
//! If the reading can't be fetched, a short diagnostic page is written in its place,
//! so there is always something to publish.
//!
//! # Running
//! ```text
//! NIGHTSCOUT_URL=https://cgm.example.com glucopage --output public/index.html
//! ```
//! See `glucopage --help` for the other settings; each can also be set from the environment.

use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, Utc};

pub mod config;
pub mod engine;
pub mod html;
pub mod reading;
pub mod source;
pub mod status;
pub mod timezone;
pub mod trend;
pub mod units;

pub use engine::{Engine, Inputs, Preferences, RenderFields, UnitOverride};
pub use html::PageSettings;
pub use source::{FakeFeed, FeedSource};

use reading::ReadingSample;
use status::StatusSnapshot;

/// Fetch the reading and the status concurrently.
///
/// Only a failure to get the reading is an error;
/// without a status, the page is built from the reading alone.
pub fn fetch_inputs(source: &impl FeedSource) -> Result<Inputs, feed::Error> {
    let (reading, status) = std::thread::scope(|scope| {
        let status = scope.spawn(|| source.status_payload());
        let reading = source.reading_payload();
        (reading, status.join())
    });
    let status = match status {
        Ok(Ok(v)) => Some(StatusSnapshot::from_payload(&v)),
        Ok(Err(e)) => {
            tracing::warn!("no status, continuing without it: {}", e);
            None
        }
        Err(e) => {
            tracing::error!("status fetch panicked: {:?}", e);
            None
        }
    };
    let reading = ReadingSample::from_payload(&reading?);
    Ok(Inputs { reading, status })
}

/// Which kind of page a build produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The page shows a reading.
    Live,
    /// The page is a diagnostic.
    Fallback,
}

/// Builds pages.
pub struct Renderer {
    engine: Engine,
    page: PageSettings,
}

impl Renderer {
    pub fn new(engine: Engine, page: PageSettings) -> Self {
        Renderer { engine, page }
    }

    /// Build the live page, or fail if the reading can't be fetched.
    pub fn build(
        &self,
        source: &impl FeedSource,
        now: DateTime<Utc>,
        local_tz: Option<&str>,
    ) -> Result<String, feed::Error> {
        let inputs = fetch_inputs(source)?;
        let fields = self
            .engine
            .derive(&inputs, now.timestamp_millis() as f64, local_tz);
        tracing::info!(
            "reading {} {} {} {} ({})",
            fields.display_value,
            fields.unit_label,
            fields.trend_symbol,
            fields.display_delta,
            fields.age_label
        );
        Ok(html::render_page(&fields, &self.page))
    }

    /// The diagnostic page for a failed build.
    pub fn fallback(&self, reason: &str, origin: &str) -> String {
        html::render_fallback(reason, origin, &self.page)
    }

    /// Build a page, falling back to the diagnostic page on failure.
    pub fn render(
        &self,
        source: &impl FeedSource,
        now: DateTime<Utc>,
        local_tz: Option<&str>,
    ) -> (String, Outcome) {
        match self.build(source, now, local_tz) {
            Ok(page) => (page, Outcome::Live),
            Err(e) => {
                tracing::error!("build failed, writing diagnostic page: {}", e);
                (self.fallback(&e.to_string(), &source.origin()), Outcome::Fallback)
            }
        }
    }

    /// Build a page and publish it at `path`.
    ///
    /// Only a failure to write the page is an error.
    pub fn render_to(
        &self,
        source: &impl FeedSource,
        now: DateTime<Utc>,
        local_tz: Option<&str>,
        path: &Path,
    ) -> anyhow::Result<Outcome> {
        let (page, outcome) = self.render(source, now, local_tz);
        publish(path, &page)?;
        tracing::info!("wrote {:?} page to {}", outcome, path.display());
        Ok(outcome)
    }
}

/// Replace the file at `path` with `contents`.
///
/// Writes to a temporary file alongside, then renames it into place,
/// so readers see either the old page or the new one.
pub fn publish(path: &Path, contents: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .with_context(|| format!("writing {}", tmp.path().display()))?;

    // Temporary files are private; the published page should not be.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .with_context(|| format!("setting permissions on {}", tmp.path().display()))?;
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/index.html");
        publish(&path, "first").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
        publish(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        // No temporary files left behind.
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn published_page_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        publish(&path, "page").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
