//! HTTP fetcher implementation
//!
//! This module handles all requests to the registration listing, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Building page URLs from the term code and page number
//! - Classifying transport failures
//!
//! There is no retry: any failure aborts the run before anything is written.

use crate::codes::TermCode;
use crate::config::{EndpointConfig, UserAgentConfig};
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Query parameter carrying the term code
pub const TERM_PARAM: &str = "SinhvienLmh[term_id]";

/// Query parameter carrying the 1-based page number
pub const PAGE_PARAM: &str = "SinhvienLmh_page";

/// Query parameter carrying the number of rows per page
pub const PAGE_SIZE_PARAM: &str = "pageSize";

/// A source of listing page bodies, addressed by 1-based page number
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, page: u32) -> Result<String, HarvestError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use dkmh_harvest::config::Config;
/// use dkmh_harvest::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.endpoint).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    endpoint: &EndpointConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", user_agent.crawler_name, user_agent.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(endpoint.request_timeout_secs))
        .connect_timeout(Duration::from_secs(endpoint.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages of one term over HTTP
pub struct HttpPageSource {
    client: Client,
    base_url: Url,
    term_code: TermCode,
    page_size: u32,
}

impl HttpPageSource {
    pub fn new(
        client: Client,
        endpoint: &EndpointConfig,
        term_code: TermCode,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            client,
            base_url: Url::parse(&endpoint.base_url)?,
            term_code,
            page_size: endpoint.page_size,
        })
    }

    /// Returns the URL of the given page
    pub fn page_url(&self, page: u32) -> Url {
        page_url(&self.base_url, &self.term_code, page, self.page_size)
    }
}

/// Builds the URL of one listing page
pub fn page_url(base_url: &Url, term_code: &TermCode, page: u32, page_size: u32) -> Url {
    let mut url = base_url.clone();
    url.query_pairs_mut()
        .append_pair(TERM_PARAM, term_code.as_str())
        .append_pair(PAGE_PARAM, &page.to_string())
        .append_pair(PAGE_SIZE_PARAM, &page_size.to_string());
    url
}

impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: u32) -> Result<String, HarvestError> {
        let url = self.page_url(page);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })
    }
}
