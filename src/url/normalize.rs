use crate::UrlError;
use url::Url;

/// Query parameters that only carry campaign or click tracking
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
    "ref",
    "source",
];

/// Normalizes an audit target into an absolute HTTP(S) URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. A target without a scheme (`example.com/page`) is given `https://`
/// 3. Parse the URL; reject if malformed
/// 4. Only `http` and `https` are accepted. `http` is kept as-is so that the
///    transport security of the page can be audited.
/// 5. Require a host
/// 6. Remove the fragment
///
/// # Arguments
///
/// * `input` - The URL or bare host given by the caller
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - The target cannot be audited
///
/// # Examples
///
/// ```
/// use seo_audit::url::normalize_target_url;
///
/// let url = normalize_target_url("example.com/pricing#plans").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/pricing");
/// ```
pub fn normalize_target_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Malformed("empty URL".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else if let Some(scheme) = non_web_scheme(trimmed) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            scheme
        )));
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    url.set_fragment(None);

    Ok(url)
}

/// Detects a `scheme:` prefix on input that has no `://`
///
/// `example.com:8080/page` and `localhost:3000` are bare hosts with a port;
/// `mailto:a@b.com` and `tel:12345` carry a scheme.
fn non_web_scheme(input: &str) -> Option<&str> {
    let (prefix, rest) = input.split_once(':')?;

    let mut chars = prefix.chars();
    let scheme_syntax = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_syntax {
        return None;
    }

    let port = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let has_port = !port.is_empty() && port.chars().all(|c| c.is_ascii_digit());
    let host_like = prefix.contains('.') || prefix.eq_ignore_ascii_case("localhost");
    if has_port && host_like {
        return None;
    }

    Some(prefix)
}

/// Returns the `scheme://host[:port]` origin of a URL
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Checks if a query parameter is a tracking parameter
pub fn is_tracking_param(key: &str) -> bool {
    if TRACKING_PARAMS.contains(&key) {
        return true;
    }

    // Catches any utm parameter
    key.starts_with("utm_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_https() {
        let result = normalize_target_url("example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_http_is_preserved() {
        let result = normalize_target_url("http://example.com/page").unwrap();
        assert_eq!(result.scheme(), "http");
    }

    #[test]
    fn test_fragment_removed() {
        let result = normalize_target_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_whitespace_trimmed() {
        let result = normalize_target_url("  https://example.com/  ").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_reject_ftp_scheme() {
        let result = normalize_target_url("ftp://example.com/file");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_reject_scheme_without_slashes() {
        for input in [
            "mailto:someone@example.com",
            "tel:12345",
            "javascript:void(0)",
            "data:text/html,hi",
        ] {
            assert!(
                matches!(normalize_target_url(input), Err(UrlError::InvalidScheme(_))),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_bare_host_with_port() {
        let result = normalize_target_url("example.com:8080/page").unwrap();
        assert_eq!(result.as_str(), "https://example.com:8080/page");

        let result = normalize_target_url("localhost:3000").unwrap();
        assert_eq!(result.as_str(), "https://localhost:3000/");
    }

    #[test]
    fn test_reject_empty() {
        assert!(matches!(
            normalize_target_url("   "),
            Err(UrlError::Malformed(_))
        ));
    }

    #[test]
    fn test_reject_garbage() {
        assert!(normalize_target_url("http://").is_err());
    }

    #[test]
    fn test_origin_of() {
        let url = Url::parse("https://example.com:8443/a/b?c=d").unwrap();
        assert_eq!(origin_of(&url), "https://example.com:8443");

        let url = Url::parse("http://example.com/").unwrap();
        assert_eq!(origin_of(&url), "http://example.com");
    }

    #[test]
    fn test_tracking_params() {
        assert!(is_tracking_param("utm_source"));
        assert!(is_tracking_param("utm_whatever"));
        assert!(is_tracking_param("gclid"));
        assert!(!is_tracking_param("page"));
        assert!(!is_tracking_param("id"));
    }
}
