//! Robots.txt handling module
//!
//! This module parses the robots.txt fetched alongside the audited page and
//! answers the questions the Technical and GEO analyzers ask of it: is the
//! page crawlable, is everything blocked, which AI crawlers are shut out.

mod parser;

pub use parser::ParsedRobots;

use crate::fetcher::AuxiliaryFetch;
use std::collections::BTreeMap;

/// AI crawlers whose access is reported, by product token
pub const AI_CRAWLERS: &[&str] = &[
    "GPTBot",
    "ChatGPT-User",
    "ClaudeBot",
    "PerplexityBot",
    "Google-Extended",
    "Amazonbot",
    "Meta-ExternalAgent",
    "Bytespider",
    "Applebot-Extended",
];

/// The crawlers whose absence costs the most AI-search visibility
pub const KEY_AI_CRAWLERS: &[&str] = &["GPTBot", "ClaudeBot", "PerplexityBot"];

/// Whether a crawler may fetch the site root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlerAccess {
    Allowed,
    /// Blocked by a group naming the crawler
    Blocked,
    /// Blocked only through the `*` group
    BlockedByWildcard,
}

impl CrawlerAccess {
    pub fn is_blocked(&self) -> bool {
        !matches!(self, Self::Allowed)
    }
}

/// Builds a ParsedRobots from an auxiliary fetch
///
/// A missing or failed robots.txt imposes no restrictions.
pub fn robots_from_fetch(fetch: &AuxiliaryFetch) -> ParsedRobots {
    match fetch.body() {
        Some(body) => ParsedRobots::from_content(body),
        None => ParsedRobots::allow_all(),
    }
}

/// Reports each known AI crawler's access to the site root
pub fn ai_crawler_access(
    robots: &ParsedRobots,
    origin: &str,
) -> BTreeMap<&'static str, CrawlerAccess> {
    let wildcard_block = robots.blocks_everything(origin);

    AI_CRAWLERS
        .iter()
        .map(|crawler| {
            let access = if robots.explicitly_blocks(origin, crawler) {
                CrawlerAccess::Blocked
            } else if wildcard_block && !robots.has_group_for(crawler) {
                CrawlerAccess::BlockedByWildcard
            } else {
                CrawlerAccess::Allowed
            };
            (*crawler, access)
        })
        .collect()
}
