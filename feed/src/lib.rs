//! Client for the JSON API of a Nightscout-style glucose site.
//!
//! Two documents are read from the site:
//! - the reading payload (`/pebble`), whose `bgs` list starts with the latest reading;
//! - the status payload (`/api/v1/status.json`), which carries the site settings.
//!
//! The payloads are handed back as untyped JSON; interpreting them is left to the caller,
//! since upstream sites disagree on field types (numbers vs. numeric strings) and key names.

use serde_json::Value;
use std::time::Duration;

mod http;

/// An error in reading from the site.
///
/// URLs held here are redacted: no userinfo, no query.
pub enum Error {
    InvalidUrl(String),
    Request(reqwest::Error),
    Status { url: String, code: u16 },
    Decode(reqwest::Error),
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidUrl(s) => write!(f, "Error::InvalidUrl({:?})", s),
            Error::Request(e) => write!(f, "Error::Request({:?})", e),
            Error::Status { url, code } => write!(f, "Error::Status({:?}, {})", url, code),
            Error::Decode(e) => write!(f, "Error::Decode({:?})", e),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidUrl(s) => write!(f, "invalid site URL: {}", s),
            Error::Request(e) => write!(f, "in request to site: {}", e),
            Error::Status { url, code } => write!(f, "HTTP {} from {}", code, url),
            Error::Decode(e) => write!(f, "in decoding JSON from site: {}", e),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Request(e) => Some(e),
            Error::Decode(e) => Some(e),
            _ => None,
        }
    }
}

/// Settings when connecting to a site.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ClientSettings {
    /// Credential sent as `Authorization: Bearer <token>`, verbatim.
    pub token: Option<String>,

    /// Overall timeout of each request.
    /// Defaults to 20 seconds.
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            token: None,
            timeout: Duration::from_secs(20),
        }
    }
}

impl ClientSettings {
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Handle to a glucose site.
pub struct Client {
    comm: http::HttpComm,
}

impl Client {
    /// Attach to the site at the given base URL.
    ///
    /// Does not contact the site; only validates the URL.
    pub fn new(site: &str, settings: ClientSettings) -> Result<Self, Error> {
        Ok(Client {
            comm: http::HttpComm::new(site, settings)?,
        })
    }

    /// The base URL of the site, without any trailing slash.
    ///
    /// Credentials (userinfo and query) are removed, so this is safe to show.
    pub fn site(&self) -> &str {
        self.comm.display()
    }

    /// Fetch the reading payload.
    pub fn reading_payload(&self) -> Result<Value, Error> {
        self.comm.get_json(Endpoint::Readings.path())
    }

    /// Fetch the status payload.
    pub fn status_payload(&self) -> Result<Value, Error> {
        self.comm.get_json(Endpoint::Status.path())
    }
}

/// Strip credentials from a site URL so it can be logged or published:
/// userinfo, query, and fragment are dropped, as is a trailing slash.
///
/// Works on strings that don't parse as URLs too, as far as they can be split.
pub fn redact_site(site: &str) -> String {
    let site = site.trim();
    if let Ok(mut url) = reqwest::Url::parse(site) {
        // "user:pw@host" parses with "user" as the scheme.
        if !url.cannot_be_a_base() {
            // Only fails for URLs that cannot carry userinfo.
            let _ = url.set_username("");
            let _ = url.set_password(None);
            url.set_query(None);
            url.set_fragment(None);
            return url.as_str().trim_end_matches('/').to_owned();
        }
    }
    let site = &site[..site.find(|c| c == '?' || c == '#').unwrap_or(site.len())];
    let (scheme, rest) = match site.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, site),
    };
    let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let path = path.trim_end_matches('/');
    match scheme {
        Some(scheme) => format!("{scheme}://{host}{path}"),
        None => format!("{host}{path}"),
    }
}

/// Documents served by the site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Latest readings, with delta and trend already computed by the site.
    Readings,
    /// Site settings: units, timezone, and so on.
    Status,
}

impl Endpoint {
    /// Path of this document, relative to the site root.
    pub const fn path(&self) -> &'static str {
        match self {
            Endpoint::Readings => "pebble",
            Endpoint::Status => "api/v1/status.json",
        }
    }
}
