use crate::fetcher::error::{classify_reqwest_error, FetchError};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Limits applied to one fetch
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Bound on the whole fetch, redirects and body included
    pub timeout: Duration,
    pub max_redirects: usize,
}

/// Everything learned from fetching one URL
///
/// `status` is `Ok` only for a 2xx response. Failures carry whatever was
/// learned before the failure (final URL, redirect chain, timing).
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The URL that was requested
    pub url: Url,

    /// The URL the response came from, after redirects
    pub final_url: Url,

    pub status: Result<u16, FetchError>,
    pub body: String,

    /// Response headers with lower-cased names; repeated headers are joined with ", "
    pub headers: BTreeMap<String, String>,

    /// URLs that answered with a redirect, in order
    pub redirect_chain: Vec<String>,

    pub elapsed: Duration,
    pub fetched_at: DateTime<Utc>,
}

impl FetchResult {
    /// HTTP status code of the final response, if one was received
    pub fn status_code(&self) -> Option<u16> {
        match &self.status {
            Ok(code) => Some(*code),
            Err(FetchError::HttpError { status }) => Some(*status),
            Err(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_ok()
    }

    /// Looks up a header by (case-insensitive) name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// True if the page was finally served over HTTPS
    pub fn is_https(&self) -> bool {
        self.final_url.scheme() == "https"
    }
}

/// Fetches a URL, following redirects manually
///
/// # Request Flow
///
/// 1. Send GET request
/// 2. On 301/302/303/307/308 resolve `Location` against the current URL and
///    repeat, recording each hop
///    - A URL seen twice in the chain is a loop → `TooManyRedirects`
///    - More than `max_redirects` hops → `TooManyRedirects`
/// 3. Read the body of the final response
/// 4. Non-2xx final status → `HttpError { status }` (body is still kept)
///
/// The whole sequence is bounded by `options.timeout`.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `options` - Timeout and redirect bound
///
/// # Returns
///
/// A FetchResult; transport failures are returned inside it, never as `Err`
pub async fn fetch_page(client: &Client, url: &Url, options: FetchOptions) -> FetchResult {
    let started = Instant::now();
    let fetched_at = Utc::now();

    let mut state = RedirectState {
        current: url.clone(),
        chain: Vec::new(),
    };

    let outcome =
        match tokio::time::timeout(options.timeout, follow(client, &mut state, options)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout),
        };

    let elapsed = started.elapsed();
    let RedirectState { current, chain } = state;

    match outcome {
        Ok(response) => {
            debug!(
                "Fetched {} -> {} ({}, {} bytes, {:?})",
                url,
                current,
                response.status,
                response.body.len(),
                elapsed
            );
            let status = if (200..300).contains(&response.status) {
                Ok(response.status)
            } else {
                Err(FetchError::HttpError {
                    status: response.status,
                })
            };
            FetchResult {
                url: url.clone(),
                final_url: current,
                status,
                body: response.body,
                headers: response.headers,
                redirect_chain: chain,
                elapsed,
                fetched_at,
            }
        }
        Err(err) => {
            debug!("Fetch of {} failed: {}", url, err);
            FetchResult {
                url: url.clone(),
                final_url: current,
                status: Err(err),
                body: String::new(),
                headers: BTreeMap::new(),
                redirect_chain: chain,
                elapsed,
                fetched_at,
            }
        }
    }
}

struct RedirectState {
    current: Url,
    chain: Vec<String>,
}

struct RawResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: String,
}

async fn follow(
    client: &Client,
    state: &mut RedirectState,
    options: FetchOptions,
) -> Result<RawResponse, FetchError> {
    let mut visited = HashSet::new();
    visited.insert(state.current.to_string());

    loop {
        let response = client
            .get(state.current.clone())
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();

        if is_followed_redirect(status) {
            if let Some(location) = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
            {
                let next = state.current.join(location).map_err(|e| {
                    FetchError::Other(format!("invalid redirect location '{}': {}", location, e))
                })?;

                state.chain.push(state.current.to_string());
                debug!("Redirect {} -> {} ({})", state.current, next, status);

                if state.chain.len() > options.max_redirects || !visited.insert(next.to_string()) {
                    return Err(FetchError::TooManyRedirects {
                        hops: state.chain.len(),
                    });
                }

                state.current = next;
                continue;
            }
        }

        let headers = collect_headers(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        return Ok(RawResponse {
            status: status.as_u16(),
            headers,
            body,
        });
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn collect_headers(map: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}
