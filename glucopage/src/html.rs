//! Rendering routines for the page.

use crate::engine::RenderFields;

/// Page-level settings, independent of the reading.
#[derive(Clone, Debug)]
pub struct PageSettings {
    pub title: String,
    /// Viewers reload the page this often.
    pub refresh_secs: u64,
}

impl Default for PageSettings {
    fn default() -> Self {
        PageSettings {
            title: "Glucose".to_owned(),
            refresh_secs: 60,
        }
    }
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;background:#111;color:#eee;\
text-align:center;margin:2em}\
.value{font-size:6em;font-weight:bold;margin:0}\
.unit{font-size:.3em;font-weight:normal;color:#aaa}\
.trend{font-size:.7em}\
.delta{font-size:2em;margin:0}\
.meta{color:#aaa}\
.error{color:#f66}";

/// Escape text for an HTML element or attribute.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn head(title: &str, refresh_secs: u64) -> String {
    format!(
        "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<meta http-equiv=\"refresh\" content=\"{refresh_secs}\">\n\
<title>{title}</title>\n\
<style>{STYLE}</style>\n\
</head>\n"
    )
}

/// Render the live page.
pub fn render_page(fields: &RenderFields, settings: &PageSettings) -> String {
    let title = [
        fields.display_value.as_str(),
        fields.trend_symbol.as_str(),
        settings.title.as_str(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ");
    let mut page = head(&escape(&title), settings.refresh_secs);
    page.push_str(&format!(
        "<body>\n\
<p class=\"value\">{value} <span class=\"trend\">{trend}</span> <span class=\"unit\">{unit}</span></p>\n\
<p class=\"delta\">{delta}</p>\n\
<p class=\"meta\">{age} &middot; battery {battery}</p>\n\
<p class=\"meta\">Last reading: {stamp} ({zone})</p>\n\
<p class=\"meta\">Generated {generated}</p>\n\
</body>\n\
</html>\n",
        value = escape(&fields.display_value),
        trend = escape(&fields.trend_symbol),
        unit = escape(&fields.unit_label),
        delta = escape(&fields.display_delta),
        age = escape(&fields.age_label),
        battery = escape(&fields.battery_label),
        stamp = escape(&fields.timestamp_label),
        zone = escape(&fields.timezone_label),
        generated = escape(&fields.generated_label),
    ));
    page
}

/// Render the diagnostic page shown when a build fails.
pub fn render_fallback(reason: &str, source: &str, settings: &PageSettings) -> String {
    let mut page = head("Build error", settings.refresh_secs);
    page.push_str(&format!(
        "<body>\n\
<h1 class=\"error\">Build error</h1>\n\
<p>{reason}</p>\n\
<p class=\"meta\">Data source: {source}</p>\n\
</body>\n\
</html>\n",
        reason = escape(reason),
        source = escape(source),
    ));
    page
}
