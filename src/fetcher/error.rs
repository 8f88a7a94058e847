use std::error::Error as StdError;
use thiserror::Error;

/// Classified transport failure
///
/// Returned as a value inside [`FetchResult`](super::FetchResult). It is only
/// fatal to an audit when the primary page fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("DNS resolution failed: {0}")]
    DnsFailure(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("HTTP error status {status}")]
    HttpError { status: u16 },

    #[error("too many redirects after {hops} hops")]
    TooManyRedirects { hops: usize },

    #[error("transport error: {0}")]
    Other(String),
}

impl FetchError {
    /// Short machine-readable name of the failure kind
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::DnsFailure(_) => "dns_failure",
            Self::ConnectionRefused(_) => "connection_refused",
            Self::HttpError { .. } => "http_error",
            Self::TooManyRedirects { .. } => "too_many_redirects",
            Self::Other(_) => "other",
        }
    }
}

/// Maps a reqwest error onto a [`FetchError`]
///
/// | Condition | Classification |
/// |-----------|----------------|
/// | Request or connect timeout | `Timeout` |
/// | Resolver error anywhere in the source chain | `DnsFailure` |
/// | `ECONNREFUSED` or other connect failure | `ConnectionRefused` |
/// | Anything else (TLS, body decode) | `Other` |
pub fn classify_reqwest_error(err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout;
    }

    let chain = source_chain(err);
    let lowered = chain.to_lowercase();

    if lowered.contains("dns error")
        || lowered.contains("failed to lookup address")
        || lowered.contains("name or service not known")
        || lowered.contains("nodename nor servname")
    {
        return FetchError::DnsFailure(chain);
    }

    if has_io_kind(err, std::io::ErrorKind::ConnectionRefused)
        || lowered.contains("connection refused")
        || err.is_connect()
    {
        return FetchError::ConnectionRefused(chain);
    }

    FetchError::Other(chain)
}

/// Joins the error and all of its sources into one message
fn source_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

fn has_io_kind(err: &(dyn StdError + 'static), kind: std::io::ErrorKind) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == kind {
                return true;
            }
        }
        current = e.source();
    }
    false
}
