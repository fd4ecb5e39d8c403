//! HTTP transport used by the registry loader.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, instrument};

use crate::io::config::RegistryConfig;

/// Fetches a URL and returns its body.
///
/// Non-success responses are errors; no retries.
pub trait Transport {
    fn get(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP client.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .user_agent(concat!("genome/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self))]
    fn get(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {url}"))?;
        let status = response.status();
        debug!(%status, "response received");
        if !status.is_success() {
            bail!("GET {url}: HTTP {status}");
        }
        response
            .text()
            .with_context(|| format!("read body of {url}"))
    }
}
