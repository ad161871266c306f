//! Helper module for HTTP communication with the site.

use crate::{redact_site, ClientSettings, Error};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde_json::Value;

/// Wrapper for the site's request mechanism, including the credential header.
pub(crate) struct HttpComm {
    /// Site root, always ending in `/`. May carry credentials in userinfo or query.
    base: Url,
    /// `base` with credentials removed; the only form that is logged or shown.
    display: String,
    token: Option<String>,
    client: Client,
}

impl HttpComm {
    pub fn new(site: &str, settings: ClientSettings) -> Result<Self, Error> {
        let invalid = || Error::InvalidUrl(redact_site(site));
        let mut base = Url::parse(site.trim()).map_err(|_| invalid())?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(invalid());
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_fragment(None);
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(Error::Request)?;
        Ok(HttpComm {
            display: redact_site(base.as_str()),
            base,
            token: settings.token,
            client,
        })
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Full URL of a document on the site.
    ///
    /// The path goes under the site root; a query on the site URL is kept.
    pub fn url_for(&self, path: &str) -> Result<Url, Error> {
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|_| Error::InvalidUrl(self.display.clone()))?;
        url.set_query(self.base.query());
        Ok(url)
    }

    fn display_for(&self, path: &str) -> String {
        format!("{}/{}", self.display, path.trim_start_matches('/'))
    }

    /// Prepares a GET for the document, with credentials attached.
    pub fn request(&self, path: &str) -> Result<RequestBuilder, Error> {
        let req = self
            .client
            .get(self.url_for(path)?)
            .header(reqwest::header::ACCEPT, "application/json");
        Ok(match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        })
    }

    /// Fetch and decode a JSON document.
    /// Non-success statuses are errors; the body is not inspected.
    ///
    /// Errors never carry the request URL as sent, only its redacted form.
    pub fn get_json(&self, path: &str) -> Result<Value, Error> {
        let shown = self.display_for(path);
        tracing::debug!("fetching {}", shown);
        let resp = self
            .request(path)?
            .send()
            .map_err(|e| Error::Request(e.without_url()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: shown,
                code: status.as_u16(),
            });
        }
        resp.json::<Value>()
            .map_err(|e| Error::Decode(e.without_url()))
    }
}
