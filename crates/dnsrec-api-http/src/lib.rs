// # HTTP Zone API
//
// `ZoneApi` implementation for DNS servers that expose their zones over a
// small REST surface.
//
// ## Behaviour
//
// - One HTTP request per trait call, awaited to completion
// - No retries, no caching, no background tasks
// - Request timeout configured on the client (30 seconds by default)
// - Non-2xx answers carry the status code and the response body
//
// ## API Reference
//
// - List zones: GET `/zones`
// - Read zone: GET `/zones/:zone` (`{"<ip>": ["<name>", ...]}`)
// - Add record: POST `/zones/:zone/:ip/:name`
// - Remove record: DELETE `/zones/:zone/:ip/:name`
// - Remove every name of an address: DELETE `/zones/:zone/:ip`
// - Remove zone: DELETE `/zones/:zone`

use async_trait::async_trait;
use dnsrec_core::config::ApiConfig;
use dnsrec_core::model::{NativeMapping, Zone};
use dnsrec_core::traits::{ZoneApi, ZoneListing};
use dnsrec_core::{Error, Result};
use reqwest::{Method, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Zone API client over HTTP
pub struct HttpZoneApi {
    /// Base URL, without trailing slash
    base: Url,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Per-request timeout the client was built with
    timeout: Duration,
}

impl std::fmt::Debug for HttpZoneApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpZoneApi")
            .field("base", &self.base.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpZoneApi {
    /// Create a client for the zone API at `base_url`
    ///
    /// Trailing slashes on `base_url` are ignored.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed)
            .map_err(|e| Error::config(format!("Invalid API URL '{}': {}", base_url, e)))?;

        if base.cannot_be_a_base() {
            return Err(Error::config(format!(
                "API URL cannot be used as a base: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base,
            client,
            timeout,
        })
    }

    /// Create a client from validated connection settings
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        config.validate()?;
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// `GET /zones` or `GET /zones/:zone`, classified by response shape
    pub async fn fetch(&self, zone: Option<&str>) -> Result<ZoneListing> {
        let url = match zone {
            Some(zone) => self.endpoint(&[zone])?,
            None => self.endpoint(&[])?,
        };

        let response = self.send(Method::GET, url).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::unknown(format!("Failed to parse response: {}", e)))?;

        classify(body)
    }

    /// Build `{base}/zones/{segments...}` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("API URL cannot be used as a base: {}", self.base)))?
            .pop_if_empty()
            .push("zones")
            .extend(segments);
        Ok(url)
    }

    /// Issue one request and turn non-2xx answers into `HttpStatus`
    async fn send(&self, method: Method, url: Url) -> Result<reqwest::Response> {
        debug!("{} {}", method, url);

        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::http_status(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

/// Decide between a zone list and a zone's native mapping
fn classify(body: Value) -> Result<ZoneListing> {
    match body {
        Value::Array(_) => serde_json::from_value::<Vec<Zone>>(body)
            .map(ZoneListing::Zones)
            .map_err(|e| Error::unknown(format!("Invalid zone list: {}", e))),
        Value::Object(_) => serde_json::from_value::<NativeMapping>(body)
            .map(ZoneListing::Records)
            .map_err(|e| Error::unknown(format!("Invalid zone mapping: {}", e))),
        other => Err(Error::unknown(format!(
            "Unexpected response, neither a zone list nor a mapping: {}",
            other
        ))),
    }
}

/// Map a reqwest failure that happened before a status was received
fn request_error(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        Error::transport(format!("HTTP request failed: {}", err))
    } else {
        Error::unknown(format!("HTTP request failed: {}", err))
    }
}

#[async_trait]
impl ZoneApi for HttpZoneApi {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.fetch(None).await?.into_zones()
    }

    async fn discover(&self) -> Result<ZoneListing> {
        self.fetch(None).await
    }

    async fn get_zone(&self, zone: &str) -> Result<NativeMapping> {
        self.fetch(Some(zone)).await?.into_records()
    }

    async fn add_record(&self, zone: &str, ip: &str, name: &str) -> Result<()> {
        let url = self.endpoint(&[zone, ip, name])?;
        self.send(Method::POST, url).await?;
        Ok(())
    }

    async fn remove_record(&self, zone: &str, ip: &str, name: &str) -> Result<()> {
        let url = self.endpoint(&[zone, ip, name])?;
        self.send(Method::DELETE, url).await?;
        Ok(())
    }

    async fn remove_ip(&self, zone: &str, ip: &str) -> Result<()> {
        let url = self.endpoint(&[zone, ip])?;
        self.send(Method::DELETE, url).await?;
        Ok(())
    }

    async fn remove_zone(&self, zone: &str) -> Result<()> {
        let url = self.endpoint(&[zone])?;
        self.send(Method::DELETE, url).await?;
        Ok(())
    }

    fn api_name(&self) -> &'static str {
        "http"
    }
}
