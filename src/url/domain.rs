use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use seo_audit::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Removes a leading `www.` label from a host
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Returns true if both URLs point at the same site
///
/// Hosts are compared case-insensitively and a leading `www.` is ignored on
/// either side, so `https://www.example.com/a` and `http://example.com/b` are
/// the same site. Scheme and port are not considered.
pub fn is_same_site(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(ha), Some(hb)) => strip_www(&ha) == strip_www(&hb),
        _ => false,
    }
}
