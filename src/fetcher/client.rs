use crate::config::FetcherConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// Redirects are not followed by the client; [`fetch_page`](super::fetch_page)
/// follows them itself so that the chain can be recorded and bounded.
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use seo_audit::config::FetcherConfig;
/// use seo_audit::fetcher::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .user_agent(config.user_agent())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}
