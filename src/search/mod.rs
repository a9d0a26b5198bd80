//! Search fetching with rate limiting and proxy support
//!
//! One rate-limited, optionally proxied search query is issued per
//! (site, time-window) pair. Request construction is deterministic: the
//! query parameters are encoded in a fixed order so the same pair always
//! produces the same URL. Failures normalize to [`FetchError`] and are
//! never propagated as panics; a failed pair simply yields zero hits.
//! There is no internal retry.

pub mod extract;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client,
};
use std::num::NonZeroU32;
use url::form_urlencoded;

use crate::config::SearchConfig;
use crate::models::TimeWindow;
use crate::utils::error::FetchError;

/// Default search endpoint
const SEARCH_BASE_URL: &str = "https://www.google.com";

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Rate-limited search page fetcher
pub struct SearchFetcher {
    /// HTTP client with configured timeout, compression, and proxy
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Result count requested per page
    result_count: u32,

    /// Base URL override for testing with mock servers
    base_url: String,
}

impl SearchFetcher {
    /// Create a new fetcher from the scrape-stage configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created,
    /// or `FetchError::InvalidProxy` if the proxy address is rejected.
    pub fn new(config: &SearchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .cookie_store(true);

        // One proxy for both transport schemes
        if let Some(proxy_url) = config.proxy_url() {
            let proxy = reqwest::Proxy::all(&proxy_url)
                .map_err(|_| FetchError::InvalidProxy(proxy_url))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        let rate = NonZeroU32::new(config.requests_per_second)
            .unwrap_or_else(|| NonZeroU32::new(1).expect("1 is non-zero"));
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            result_count: config.result_count,
            base_url: SEARCH_BASE_URL.to_string(),
        })
    }

    /// Create a fetcher pointed at a custom base URL for testing
    pub fn with_base_url(config: &SearchConfig, base_url: &str) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(config)?;
        fetcher.base_url = base_url.trim_end_matches('/').to_string();
        Ok(fetcher)
    }

    /// Build the search path for a (site, window) pair
    ///
    /// Parameters are encoded in a fixed order (q, tbs, num) so request
    /// construction is reproducible.
    pub fn build_search_path(&self, site: &str, window: TimeWindow) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("q", &format!("site:{site}"))
            .append_pair("tbs", window.query_modifier())
            .append_pair("num", &self.result_count.to_string())
            .finish();

        format!("/search?{query}")
    }

    /// Fetch the raw result page for one (site, window) pair
    ///
    /// # Errors
    ///
    /// Non-2xx responses return `FetchError::Status`; transport errors
    /// return `FetchError::Http` or `FetchError::Timeout`. No retry is
    /// attempted here — retry policy, if any, belongs to the caller.
    pub async fn fetch(&self, site: &str, window: TimeWindow) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, self.build_search_path(site, window));
        let headers = self.build_headers();

        tracing::debug!(site = %site, window = %window, url = %url, "Fetching search page");

        let response = match self.client.get(&url).headers(headers).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(FetchError::Timeout),
            Err(e) => return Err(FetchError::Http(e)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Build browser-like HTTP headers with a rotated User-Agent
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(self.random_user_agent()));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        headers
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}
