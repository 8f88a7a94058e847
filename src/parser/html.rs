//! Element extractors over a parsed HTML tree

use crate::parser::structured::JsonLdBlock;
use crate::parser::text::{normalize_whitespace, visible_text, NON_CONTENT_TAGS};
use crate::parser::{Heading, Hreflang, Image, Link, Script};
use crate::url::is_same_site;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => document.select(&sel).collect(),
        None => Vec::new(),
    }
}

fn count(document: &Html, css: &str) -> usize {
    match selector(css) {
        Some(sel) => document.select(&sel).count(),
        None => 0,
    }
}

fn attr(element: &ElementRef, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn element_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// True if the element sits below an element with one of the given names
fn has_ancestor(element: &ElementRef, names: &[&str]) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map(|el| names.contains(&el.name()))
            .unwrap_or(false)
    })
}

/// Extracts the page title, preferring the one in `<head>`
pub fn title(document: &Html) -> Option<String> {
    select_all(document, "head > title")
        .into_iter()
        .chain(select_all(document, "title"))
        .map(|el| element_text(&el))
        .find(|t| !t.is_empty())
}

pub fn language(document: &Html) -> Option<String> {
    attr(&document.root_element(), "lang")
}

/// Meta tags of interest, keyed by lower-cased `name` or `property`
#[derive(Debug, Default)]
pub struct MetaTags {
    pub description: Option<String>,
    pub robots: Option<String>,
    pub viewport: Option<String>,
    pub og: BTreeMap<String, String>,
    pub twitter: BTreeMap<String, String>,
}

pub fn meta_tags(document: &Html) -> MetaTags {
    let mut tags = MetaTags::default();

    for meta in select_all(document, "meta") {
        let name = meta
            .value()
            .attr("name")
            .or_else(|| meta.value().attr("property"))
            .map(|n| n.trim().to_ascii_lowercase());
        let content = meta.value().attr("content").map(|c| c.trim().to_string());

        let (Some(name), Some(content)) = (name, content) else {
            continue;
        };

        match name.as_str() {
            "description" => {
                tags.description.get_or_insert(content);
            }
            "robots" => {
                tags.robots.get_or_insert(content);
            }
            "viewport" => {
                tags.viewport.get_or_insert(content);
            }
            n if n.starts_with("og:") => {
                tags.og.entry(name).or_insert(content);
            }
            n if n.starts_with("twitter:") => {
                tags.twitter.entry(name).or_insert(content);
            }
            _ => {}
        }
    }

    tags
}

pub fn canonical(document: &Html) -> Option<String> {
    select_all(document, "link[rel~='canonical'][href]")
        .first()
        .and_then(|el| attr(el, "href"))
}

pub fn hreflang(document: &Html, base: &Url) -> Vec<Hreflang> {
    select_all(document, "link[rel~='alternate'][hreflang][href]")
        .iter()
        .filter_map(|el| {
            let lang = attr(el, "hreflang")?;
            let href = attr(el, "href")?;
            let href = base.join(&href).map(|u| u.to_string()).unwrap_or(href);
            Some(Hreflang { lang, href })
        })
        .collect()
}

/// Headings in document order; empty headings are skipped
pub fn headings(document: &Html) -> Vec<Heading> {
    select_all(document, "h1, h2, h3, h4, h5, h6")
        .iter()
        .filter_map(|el| {
            let level = el.value().name()[1..].parse::<u8>().ok()?;
            let text = element_text(el);
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect()
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    matches!(absolute.scheme(), "http" | "https").then_some(absolute)
}

pub fn links(document: &Html, base: &Url) -> Vec<Link> {
    select_all(document, "a[href]")
        .iter()
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let resolved = resolve_link(href, base)?;

            let mut anchor_text = element_text(el);
            if anchor_text.is_empty() {
                anchor_text = attr(el, "aria-label")
                    .or_else(|| {
                        select_first_in(el, "img[alt]").and_then(|img| attr(&img, "alt"))
                    })
                    .unwrap_or_default();
            }

            let nofollow = el
                .value()
                .attr("rel")
                .map(|rel| {
                    rel.split_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("nofollow"))
                })
                .unwrap_or(false);

            Some(Link {
                is_internal: is_same_site(&resolved, base),
                href: resolved.to_string(),
                anchor_text,
                nofollow,
            })
        })
        .collect()
}

fn select_first_in<'a>(element: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    element.select(&sel).next()
}

pub fn images(document: &Html, base: &Url) -> Vec<Image> {
    select_all(document, "img")
        .iter()
        .map(|el| {
            let raw_src = attr(el, "src")
                .or_else(|| attr(el, "data-src"))
                .unwrap_or_default();
            let src = if raw_src.starts_with("data:") || raw_src.is_empty() {
                raw_src
            } else {
                base.join(&raw_src)
                    .map(|u| u.to_string())
                    .unwrap_or(raw_src)
            };

            let has_modern_source = el
                .parent()
                .and_then(ElementRef::wrap)
                .filter(|parent| parent.value().name() == "picture")
                .map(|picture| {
                    select_first_in(
                        &picture,
                        "source[type='image/avif'], source[type='image/webp']",
                    )
                    .is_some()
                })
                .unwrap_or(false);

            Image {
                src,
                // An empty alt is kept as Some("") so decorative images can be told apart
                alt: el.value().attr("alt").map(|a| a.trim().to_string()),
                width: attr(el, "width"),
                height: attr(el, "height"),
                loading_attr: attr(el, "loading").map(|l| l.to_ascii_lowercase()),
                fetch_priority: attr(el, "fetchpriority").map(|p| p.to_ascii_lowercase()),
                has_modern_source,
            }
        })
        .collect()
}

/// External scripts (those with a `src`)
pub fn scripts(document: &Html, base: &Url) -> Vec<Script> {
    select_all(document, "script[src]")
        .iter()
        .filter_map(|el| {
            let src = attr(el, "src")?;
            let src = base.join(&src).map(|u| u.to_string()).unwrap_or(src);
            let is_module = el
                .value()
                .attr("type")
                .map(|t| t.trim().eq_ignore_ascii_case("module"))
                .unwrap_or(false);
            Some(Script {
                src,
                is_async: el.value().attr("async").is_some(),
                defer: el.value().attr("defer").is_some(),
                is_module,
                in_head: has_ancestor(el, &["head"]),
            })
        })
        .collect()
}

pub fn stylesheets(document: &Html, base: &Url) -> Vec<String> {
    select_all(document, "link[rel~='stylesheet'][href]")
        .iter()
        .filter_map(|el| attr(el, "href"))
        .map(|href| base.join(&href).map(|u| u.to_string()).unwrap_or(href))
        .collect()
}

pub fn json_ld_blocks(document: &Html) -> Vec<JsonLdBlock> {
    select_all(document, "script[type]")
        .iter()
        .filter(|el| {
            el.value()
                .attr("type")
                .map(|t| t.trim().to_ascii_lowercase().starts_with("application/ld+json"))
                .unwrap_or(false)
        })
        .map(|el| JsonLdBlock::parse(&el.text().collect::<String>()))
        .collect()
}

/// Paragraph texts outside of navigation and page chrome
pub fn paragraphs(document: &Html) -> Vec<String> {
    select_all(document, "p")
        .iter()
        .filter(|el| !has_ancestor(el, NON_CONTENT_TAGS))
        .map(|el| element_text(el))
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn list_count(document: &Html) -> usize {
    count(document, "ul, ol")
}

pub fn table_count(document: &Html) -> usize {
    count(document, "table")
}

/// Native videos plus embeds from the common video hosts
pub fn video_count(document: &Html) -> usize {
    count(document, "video")
        + select_all(document, "iframe[src]")
            .iter()
            .filter(|el| {
                el.value()
                    .attr("src")
                    .map(|src| {
                        let src = src.to_ascii_lowercase();
                        src.contains("youtube.com")
                            || src.contains("youtube-nocookie.com")
                            || src.contains("youtu.be")
                            || src.contains("vimeo.com")
                            || src.contains("wistia")
                    })
                    .unwrap_or(false)
            })
            .count()
}

/// Iframes, videos and embeds that reserve no space before they load
pub fn embeds_without_dimensions(document: &Html) -> usize {
    select_all(document, "iframe, video, embed")
        .iter()
        .filter(|el| attr(el, "width").is_none() || attr(el, "height").is_none())
        .count()
}

pub fn element_count(document: &Html) -> usize {
    count(document, "*")
}

/// Detects a visible author attribution in the markup
pub fn has_author_byline(document: &Html) -> bool {
    count(
        document,
        "[rel~='author'], [itemprop='author'], [class*='author'], [class*='byline'], \
         a[href*='/author/'], meta[name='author']",
    ) > 0
}

/// Text of `<body>` (or the whole document when there is none)
pub fn body_text(document: &Html) -> String {
    match select_all(document, "body").first() {
        Some(body) => visible_text(*body),
        None => visible_text(document.root_element()),
    }
}
