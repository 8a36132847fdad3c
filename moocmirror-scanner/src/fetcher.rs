use crate::config::{CrawlerConfig, Headers};
use crate::error::{FetchError, Result, ScanError};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// Retrieves a resource and hands back its raw body, undecoded.
///
/// Implementations must not retry; a failure is reported once with the URL
/// that caused it.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, headers: &Headers) -> std::result::Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, max_redirects: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .cookie_store(true)
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .build()
            .map_err(|e| ScanError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Self::new(config.timeout_secs, config.max_redirects)
    }
}

fn header_map(url: &str, headers: &Headers) -> std::result::Result<HeaderMap, FetchError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let invalid = |reason: String| FetchError::InvalidHeader {
            url: url.to_string(),
            name: name.to_string(),
            reason,
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &Headers) -> std::result::Result<Vec<u8>, FetchError> {
        let headers = header_map(url, headers)?;
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!("{} -> {} bytes", url, body.len());
        Ok(body.to_vec())
    }
}
