use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Kind of page being audited; selects the word-count minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Homepage,
    Blog,
    Service,
    Product,
    Other,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Homepage => "homepage",
            Self::Blog => "blog",
            Self::Service => "service",
            Self::Product => "product",
            Self::Other => "other",
        }
    }

    /// Guesses the page type from the URL path and the page's JSON-LD types
    ///
    /// # Inference Order
    ///
    /// 1. Root path → Homepage
    /// 2. `Product` schema or a shop-like path → Product
    /// 3. Article schema or a blog-like path → Blog
    /// 4. `Service` schema or a services path → Service
    /// 5. Otherwise → Other
    pub fn infer(url: &Url, schema_types: &BTreeSet<String>) -> Self {
        let path = url.path().to_ascii_lowercase();
        let has_type = |names: &[&str]| names.iter().any(|n| schema_types.contains(*n));
        let path_has = |segments: &[&str]| path.split('/').any(|s| segments.contains(&s));

        if path.trim_end_matches('/').is_empty() {
            Self::Homepage
        } else if has_type(&["Product"])
            || path_has(&["product", "products", "shop", "store", "p"])
        {
            Self::Product
        } else if has_type(&["Article", "BlogPosting", "NewsArticle"])
            || path_has(&["blog", "news", "articles", "article", "posts", "post"])
        {
            Self::Blog
        } else if has_type(&["Service"]) || path_has(&["services", "service", "solutions"]) {
            Self::Service
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "homepage" | "home" => Ok(Self::Homepage),
            "blog" | "article" | "post" => Ok(Self::Blog),
            "service" | "services" => Ok(Self::Service),
            "product" => Ok(Self::Product),
            "other" => Ok(Self::Other),
            other => Err(format!(
                "unknown page type '{}' (expected homepage, blog, service, product or other)",
                other
            )),
        }
    }
}

/// One audit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRequest {
    /// Absolute HTTP(S) URL, or a bare host that will be given `https://`
    pub url: String,

    /// Page type hint; inferred from the page when absent
    pub page_type: Option<PageType>,
}

impl AuditRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_type: None,
        }
    }

    pub fn with_page_type(mut self, page_type: PageType) -> Self {
        self.page_type = Some(page_type);
        self
    }
}
