//! Page fetching over HTTP.
//!
//! The crawler and the article cache only talk to the network through the
//! [`Fetch`] trait, so tests can swap in scripted responses.
//!
//! [`HttpFetcher`] issues one plain GET per call with the configured
//! `User-Agent`. There is no retry: a failed request is reported once and the
//! caller decides whether to skip it.

use crate::config::CrawlConfig;
use crate::error::FetchError;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Something that can turn a URL into a response body.
pub trait Fetch {
    /// Fetch `url` and return the raw body bytes of a 2xx response.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`Fetch`] implementation backed by a shared `reqwest` client.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client that sends `config.user_agent` with every request and
    /// applies `config.request_timeout_secs` when set.
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let t0 = Instant::now();
        let request_failed = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_failed)?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Non-success response");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(request_failed)?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body.to_vec())
    }
}
