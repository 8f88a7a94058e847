//! HTML parsing into a single immutable document
//!
//! The fetched page is parsed exactly once per audit. Everything the
//! analyzers need is extracted up front into owned data, so the resulting
//! [`ParsedDocument`] is `Send + Sync` and can be shared behind an `Arc`.
//!
//! Parsing is best-effort: html5ever recovers from malformed markup the way
//! browsers do. The only parse failures are an empty body and a response
//! that is not HTML.

mod html;
mod structured;
mod text;

use crate::fetcher::FetchResult;
use scraper::Html;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub use html::resolve_link;
pub use structured::{any_object, entity_nodes, has_property, node_types, JsonLdBlock};
pub use text::{flesch_reading_ease, normalize_whitespace, sentences, syllables, word_count, words};

/// Errors that make a fetched page unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response body is empty")]
    EmptyBody,

    #[error("response is not HTML (content type: {content_type})")]
    NotHtml { content_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Absolute URL
    pub href: String,
    pub is_internal: bool,
    pub anchor_text: String,
    pub nofollow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub src: String,

    /// `None` when the attribute is absent, `Some("")` for an empty alt
    pub alt: Option<String>,

    pub width: Option<String>,
    pub height: Option<String>,
    pub loading_attr: Option<String>,
    pub fetch_priority: Option<String>,

    /// Inside a `<picture>` that offers an AVIF or WebP source
    pub has_modern_source: bool,
}

impl Image {
    pub fn has_dimensions(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    pub fn is_lazy(&self) -> bool {
        self.loading_attr.as_deref() == Some("lazy")
    }

    /// Lower-cased file extension of the image path, if any
    pub fn extension(&self) -> Option<String> {
        let path = match Url::parse(&self.src) {
            Ok(url) => url.path().to_string(),
            Err(_) => self
                .src
                .split(['?', '#'].as_ref())
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        let file = path.rsplit('/').next()?;
        let (_, ext) = file.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }

    /// JPEG, PNG, GIF or BMP without a modern `<picture>` alternative
    pub fn is_legacy_format(&self) -> bool {
        if self.has_modern_source {
            return false;
        }
        matches!(
            self.extension().as_deref(),
            Some("jpg" | "jpeg" | "png" | "gif" | "bmp")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Script {
    pub src: String,
    pub is_async: bool,
    pub defer: bool,
    pub is_module: bool,
    pub in_head: bool,
}

impl Script {
    /// Classic scripts without `async` or `defer` block rendering
    pub fn is_blocking(&self) -> bool {
        !(self.is_async || self.defer || self.is_module)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hreflang {
    pub lang: String,
    pub href: String,
}

/// Everything the analyzers read from the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    /// Final URL of the page; relative references were resolved against it
    pub url: Url,

    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_robots: Option<String>,
    pub viewport: Option<String>,

    /// Raw `href` of the canonical link
    pub canonical: Option<String>,

    /// `lang` attribute of the root element
    pub language: Option<String>,

    pub headings: Vec<Heading>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub scripts: Vec<Script>,
    pub stylesheets: Vec<String>,
    pub structured_data: Vec<JsonLdBlock>,
    pub og_tags: BTreeMap<String, String>,
    pub twitter_tags: BTreeMap<String, String>,
    pub hreflang: Vec<Hreflang>,
    pub paragraphs: Vec<String>,
    pub list_count: usize,
    pub table_count: usize,
    pub video_count: usize,
    pub embeds_without_dimensions: usize,
    pub element_count: usize,
    pub has_author_byline: bool,
    pub word_count: usize,
    pub raw_text: String,
}

impl ParsedDocument {
    pub fn headings_at(&self, level: u8) -> impl Iterator<Item = &Heading> {
        self.headings.iter().filter(move |h| h.level == level)
    }

    pub fn has_heading_level(&self, level: u8) -> bool {
        self.headings_at(level).next().is_some()
    }

    pub fn internal_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| l.is_internal)
    }

    pub fn external_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| !l.is_internal)
    }

    /// Entity nodes from every valid JSON-LD block, `@graph` and arrays flattened
    pub fn schema_nodes(&self) -> Vec<&serde_json::Map<String, serde_json::Value>> {
        self.structured_data
            .iter()
            .filter_map(|block| block.value.as_ref())
            .flat_map(entity_nodes)
            .collect()
    }

    /// Every `@type` declared by a top-level entity node
    pub fn schema_types(&self) -> BTreeSet<String> {
        self.schema_nodes()
            .into_iter()
            .flat_map(node_types)
            .map(str::to_string)
            .collect()
    }

    /// True if any JSON-LD object at any depth satisfies `pred`
    pub fn any_schema_object(
        &self,
        pred: &dyn Fn(&serde_json::Map<String, serde_json::Value>) -> bool,
    ) -> bool {
        self.structured_data
            .iter()
            .filter_map(|block| block.value.as_ref())
            .any(|value| any_object(value, pred))
    }
}

/// Parses a fetched page into a [`ParsedDocument`]
///
/// # Arguments
///
/// * `fetch` - The fetch result of the primary page
///
/// # Returns
///
/// * `Ok(ParsedDocument)` - The extracted document
/// * `Err(ParseError)` - The body is empty or not HTML
///
/// # Example
///
/// ```no_run
/// # use seo_audit::fetcher::FetchResult;
/// # fn example(fetch: &FetchResult) {
/// use seo_audit::parser::parse_document;
///
/// let document = parse_document(fetch).unwrap();
/// println!("{} words", document.word_count);
/// # }
/// ```
pub fn parse_document(fetch: &FetchResult) -> Result<ParsedDocument, ParseError> {
    check_content(fetch)?;
    let document = parse_html(&fetch.body, &fetch.final_url);
    debug!(
        "Parsed {}: {} words, {} links, {} images, {} JSON-LD blocks",
        document.url,
        document.word_count,
        document.links.len(),
        document.images.len(),
        document.structured_data.len()
    );
    Ok(document)
}

/// Extracts a [`ParsedDocument`] from HTML text
///
/// Relative references are resolved against `base_url`.
pub fn parse_html(body: &str, base_url: &Url) -> ParsedDocument {
    let document = Html::parse_document(body);
    let meta = html::meta_tags(&document);
    let raw_text = html::body_text(&document);

    ParsedDocument {
        url: base_url.clone(),
        title: html::title(&document),
        meta_description: meta.description,
        meta_robots: meta.robots,
        viewport: meta.viewport,
        canonical: html::canonical(&document),
        language: html::language(&document),
        headings: html::headings(&document),
        links: html::links(&document, base_url),
        images: html::images(&document, base_url),
        scripts: html::scripts(&document, base_url),
        stylesheets: html::stylesheets(&document, base_url),
        structured_data: html::json_ld_blocks(&document),
        og_tags: meta.og,
        twitter_tags: meta.twitter,
        hreflang: html::hreflang(&document, base_url),
        paragraphs: html::paragraphs(&document),
        list_count: html::list_count(&document),
        table_count: html::table_count(&document),
        video_count: html::video_count(&document),
        embeds_without_dimensions: html::embeds_without_dimensions(&document),
        element_count: html::element_count(&document),
        has_author_byline: html::has_author_byline(&document),
        word_count: word_count(&raw_text),
        raw_text,
    }
}

/// Rejects bodies that cannot be treated as an HTML page
///
/// A missing content type is accepted when the body sniffs as HTML.
fn check_content(fetch: &FetchResult) -> Result<(), ParseError> {
    if fetch.body.trim().is_empty() {
        return Err(ParseError::EmptyBody);
    }

    match fetch.content_type() {
        Some(ct) => {
            let lowered = ct.to_ascii_lowercase();
            if lowered.contains("text/html") || lowered.contains("application/xhtml+xml") {
                Ok(())
            } else {
                Err(ParseError::NotHtml {
                    content_type: ct.to_string(),
                })
            }
        }
        None if sniffs_as_html(&fetch.body) => Ok(()),
        None => Err(ParseError::NotHtml {
            content_type: "unknown".to_string(),
        }),
    }
}

fn sniffs_as_html(body: &str) -> bool {
    let head: String = body.chars().take(1024).collect::<String>().to_ascii_lowercase();
    ["<!doctype html", "<html", "<head", "<body"]
        .iter()
        .any(|marker| head.contains(marker))
}
