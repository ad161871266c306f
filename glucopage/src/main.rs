use chrono::Utc;
use clap::Parser;
use glucopage::{config::Config, Engine, Outcome, Renderer};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    if config.site.trim().is_empty() {
        tracing::error!("no site configured; set NIGHTSCOUT_URL or pass --site");
        std::process::exit(2);
    }

    let local_tz = iana_time_zone::get_timezone()
        .map_err(|e| tracing::debug!("no local timezone: {}", e))
        .ok();
    let renderer = Renderer::new(Engine::new(config.preferences()), config.page_settings());
    let now = Utc::now();

    let outcome = match feed::Client::new(&config.site, config.client_settings()) {
        Ok(client) => renderer.render_to(&client, now, local_tz.as_deref(), &config.output)?,
        Err(e) => {
            tracing::error!("{}", e);
            let page = renderer.fallback(&e.to_string(), &feed::redact_site(&config.site));
            glucopage::publish(&config.output, &page)?;
            Outcome::Fallback
        }
    };

    if outcome == Outcome::Fallback {
        tracing::warn!("published a diagnostic page; exiting successfully anyway");
    }
    tracing::info!("done");
    Ok(())
}
