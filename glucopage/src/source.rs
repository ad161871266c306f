//! Where payloads come from.

use serde_json::Value;

/// A type that can fetch the two payloads a page is built from.
///
/// Must be `Sync`: both payloads are fetched at the same time.
pub trait FeedSource: Sync {
    /// Get the reading payload. Required for a live page.
    fn reading_payload(&self) -> Result<Value, feed::Error>;

    /// Get the status payload. Optional; failures are tolerated.
    fn status_payload(&self) -> Result<Value, feed::Error>;

    /// Where the data comes from, for diagnostics.
    /// Must not include credentials.
    fn origin(&self) -> String;
}

impl FeedSource for feed::Client {
    fn reading_payload(&self) -> Result<Value, feed::Error> {
        feed::Client::reading_payload(self)
    }

    fn status_payload(&self) -> Result<Value, feed::Error> {
        feed::Client::status_payload(self)
    }

    fn origin(&self) -> String {
        self.site().to_owned()
    }
}

/// Fake source: repeatedly provides the indicated payloads,
/// or fails with an HTTP status where a payload is `None`.
pub struct FakeFeed {
    pub reading: Option<Value>,
    pub status: Option<Value>,
}

impl FakeFeed {
    const ORIGIN: &'static str = "https://fake.invalid";

    fn respond(v: &Option<Value>, path: &str) -> Result<Value, feed::Error> {
        v.clone().ok_or_else(|| feed::Error::Status {
            url: format!("{}/{}", Self::ORIGIN, path),
            code: 503,
        })
    }
}

impl FeedSource for FakeFeed {
    fn reading_payload(&self) -> Result<Value, feed::Error> {
        Self::respond(&self.reading, feed::Endpoint::Readings.path())
    }

    fn status_payload(&self) -> Result<Value, feed::Error> {
        Self::respond(&self.status, feed::Endpoint::Status.path())
    }

    fn origin(&self) -> String {
        Self::ORIGIN.to_owned()
    }
}
