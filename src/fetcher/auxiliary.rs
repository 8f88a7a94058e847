use crate::fetcher::error::FetchError;
use crate::fetcher::page::{fetch_page, FetchOptions, FetchResult};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Outcome of fetching one site-level resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxiliaryFetch {
    /// The resource exists and has the expected shape
    Present { status: u16, body: String },

    /// The server answered, but the resource is absent (4xx/5xx or a
    /// soft-404 HTML page)
    Missing { status: u16 },

    /// The request itself failed
    Failed(FetchError),
}

impl AuxiliaryFetch {
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Present { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// The site-level resources fetched alongside the audited page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryResources {
    pub robots_txt: AuxiliaryFetch,
    pub sitemap: AuxiliaryFetch,

    /// Where the sitemap was found, when present
    pub sitemap_url: Option<String>,

    pub llms_txt: AuxiliaryFetch,
}

impl AuxiliaryResources {
    /// Resources for an audit where none could be retrieved
    pub fn unavailable(err: FetchError) -> Self {
        Self {
            robots_txt: AuxiliaryFetch::Failed(err.clone()),
            sitemap: AuxiliaryFetch::Failed(err.clone()),
            sitemap_url: None,
            llms_txt: AuxiliaryFetch::Failed(err),
        }
    }
}

/// Well-known locations relative to the site origin
const ROBOTS_PATH: &str = "/robots.txt";
const SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml"];
const LLMS_PATH: &str = "/llms.txt";

/// Fetches robots.txt, the XML sitemap and llms.txt concurrently
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - Any URL on the site; only its origin is used
/// * `options` - Per-resource timeout and redirect bound
pub async fn fetch_auxiliary(
    client: &Client,
    origin: &Url,
    options: FetchOptions,
) -> AuxiliaryResources {
    let robots_url = resolve(origin, ROBOTS_PATH);
    let llms_url = resolve(origin, LLMS_PATH);

    let (robots_txt, (sitemap, sitemap_url), llms_txt) = tokio::join!(
        fetch_text_resource(client, robots_url, options),
        fetch_sitemap(client, origin, options),
        fetch_text_resource(client, llms_url, options),
    );

    debug!(
        "Auxiliary resources for {}: robots={} sitemap={} llms={}",
        origin,
        describe(&robots_txt),
        describe(&sitemap),
        describe(&llms_txt)
    );

    AuxiliaryResources {
        robots_txt,
        sitemap,
        sitemap_url,
        llms_txt,
    }
}

fn resolve(origin: &Url, path: &str) -> Result<Url, FetchError> {
    origin
        .join(path)
        .map_err(|e| FetchError::Other(format!("cannot resolve {}: {}", path, e)))
}

/// Fetches a plain-text resource such as robots.txt or llms.txt
///
/// A 2xx answer with an HTML body is a soft-404 and counts as missing.
async fn fetch_text_resource(
    client: &Client,
    url: Result<Url, FetchError>,
    options: FetchOptions,
) -> AuxiliaryFetch {
    let url = match url {
        Ok(url) => url,
        Err(e) => return AuxiliaryFetch::Failed(e),
    };
    let result = fetch_page(client, &url, options).await;
    classify(&result, |r| !looks_like_html(r))
}

/// Tries each sitemap location in turn and keeps the first real sitemap
async fn fetch_sitemap(
    client: &Client,
    origin: &Url,
    options: FetchOptions,
) -> (AuxiliaryFetch, Option<String>) {
    let mut last = AuxiliaryFetch::Missing { status: 404 };

    for path in SITEMAP_PATHS {
        let url = match resolve(origin, path) {
            Ok(url) => url,
            Err(e) => return (AuxiliaryFetch::Failed(e), None),
        };
        let result = fetch_page(client, &url, options).await;
        let fetch = classify(&result, |r| is_sitemap_xml(&r.body));
        if fetch.is_present() {
            return (fetch, Some(result.final_url.to_string()));
        }
        if let AuxiliaryFetch::Failed(err) = &fetch {
            warn!("Sitemap fetch {} failed: {}", url, err);
        }
        last = fetch;
    }

    (last, None)
}

fn classify(result: &FetchResult, accept: impl Fn(&FetchResult) -> bool) -> AuxiliaryFetch {
    match &result.status {
        Ok(status) if accept(result) => AuxiliaryFetch::Present {
            status: *status,
            body: result.body.clone(),
        },
        Ok(status) => AuxiliaryFetch::Missing { status: *status },
        Err(FetchError::HttpError { status }) => AuxiliaryFetch::Missing { status: *status },
        Err(err) => AuxiliaryFetch::Failed(err.clone()),
    }
}

fn looks_like_html(result: &FetchResult) -> bool {
    if let Some(ct) = result.content_type() {
        if ct.to_ascii_lowercase().contains("text/html") {
            return true;
        }
    }
    let head: String = result
        .body
        .trim_start()
        .chars()
        .take(64)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

fn is_sitemap_xml(body: &str) -> bool {
    body.contains("<urlset") || body.contains("<sitemapindex")
}

fn describe(fetch: &AuxiliaryFetch) -> String {
    match fetch {
        AuxiliaryFetch::Present { status, body } => format!("present({}, {}b)", status, body.len()),
        AuxiliaryFetch::Missing { status } => format!("missing({})", status),
        AuxiliaryFetch::Failed(err) => format!("failed({})", err.kind_str()),
    }
}
