//! Zone page fetcher for the zone listing API
//!
//! Each call retrieves one page of `GET <base>/zones?match=all&per_page=50&page=<n>`
//! using a bearer token. There is no retry here: a failed page ends the
//! refresh cycle it belongs to.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
};
use std::time::Duration;
use url::Url;

use crate::config::{ApiConfig, DEFAULT_API_BASE_URL, MAX_PER_PAGE};
use crate::models::{RawZone, ZonesResponse};
use crate::utils::error::{DirectoryError, FetchError};

/// One page of zone records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZonePage {
    /// 1-based page index this page was requested with
    pub page: u32,

    /// Records in remote listing order
    pub records: Vec<RawZone>,

    /// Mirrors the payload's top-level `success` flag
    pub had_success: bool,

    /// Remote error messages reported alongside `success: false`
    pub errors: Vec<String>,

    /// Total page count when the remote reports one (informational)
    pub total_pages: Option<u32>,
}

impl ZonePage {
    /// Successful page with the given records
    pub fn new(page: u32, records: Vec<RawZone>) -> Self {
        Self {
            page,
            records,
            had_success: true,
            errors: Vec::new(),
            total_pages: None,
        }
    }

    /// Page whose payload reported `success: false`
    pub fn unsuccessful(page: u32, errors: Vec<String>) -> Self {
        Self {
            page,
            records: Vec::new(),
            had_success: false,
            errors,
            total_pages: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Retrieves single pages of zone records
#[async_trait]
pub trait ZonePageFetcher: Send + Sync {
    /// Fetch the page with 1-based index `page`
    async fn fetch_page(&self, page: u32) -> Result<ZonePage, FetchError>;
}

/// Fetcher for the Cloudflare v4 zone listing API
pub struct CloudflareFetcher {
    /// HTTP client with the request timeout and auth headers applied
    client: Client,

    /// Base URL without the `/zones` suffix
    base_url: String,

    per_page: u32,
}

impl CloudflareFetcher {
    /// Create a fetcher against the public API with default settings
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::ClientBuild` if the HTTP client cannot be created
    pub fn new(api_token: &str) -> Result<Self, DirectoryError> {
        Self::with_config(
            DEFAULT_API_BASE_URL,
            api_token,
            MAX_PER_PAGE,
            Duration::from_secs(30),
        )
    }

    /// Create a fetcher from configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self, DirectoryError> {
        Self::with_config(
            &config.base_url,
            &config.api_token,
            config.per_page,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Create a fetcher with a custom base URL, page size and timeout
    ///
    /// `per_page` is clamped to 1..=50.
    pub fn with_config(
        base_url: &str,
        api_token: &str,
        per_page: u32,
        timeout: Duration,
    ) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(Self::build_headers(api_token)?)
            .build()
            .map_err(|e| DirectoryError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        })
    }

    /// Build the default headers: JSON content type and bearer auth
    fn build_headers(api_token: &str) -> Result<HeaderMap, DirectoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_token}"))
            .map_err(|e| DirectoryError::ClientBuild(format!("invalid api token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        Ok(headers)
    }

    /// Build the listing URL for a page
    pub fn page_url(&self, page: u32) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!("{}/zones", self.base_url))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.base_url)))?;

        url.query_pairs_mut()
            .append_pair("match", "all")
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", &page.to_string());

        Ok(url)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Decode a listing payload into a page
    fn decode_page(page: u32, body: &[u8]) -> Result<ZonePage, FetchError> {
        let mut response: ZonesResponse =
            serde_json::from_slice(body).map_err(|e| FetchError::Protocol(e.to_string()))?;

        if !response.success {
            let errors = response.errors.iter().map(ToString::to_string).collect();
            return Ok(ZonePage::unsuccessful(page, errors));
        }

        let mut zone_page = ZonePage::new(page, response.take_records());
        zone_page.total_pages = response.result_info.and_then(|info| info.total_pages);
        Ok(zone_page)
    }
}

#[async_trait]
impl ZonePageFetcher for CloudflareFetcher {
    async fn fetch_page(&self, page: u32) -> Result<ZonePage, FetchError> {
        let url = self.page_url(page)?;

        tracing::trace!(url = %url, "Fetching zone page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;
        Self::decode_page(page, &body)
    }
}
