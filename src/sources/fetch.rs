//! Blocking HTTP text fetching.
use std::time::Duration;

use log::debug;

use crate::error::Error;

/// Default request timeout.
pub const TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches the body of a URL as text.
pub trait Fetch {
    fn fetch_text(&self, url: &str) -> Result<String, Error>;
}

/// [reqwest] blocking client with a fixed timeout. Errors are not retried.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, Error> {
        debug!("GET {url}");
        let resp = self.client.get(url).send()?.error_for_status()?;
        Ok(resp.text()?)
    }
}
