use crate::analyzers::{AnalysisContext, Analyzer, AnalyzerError, Scorecard};
use crate::fetcher::AuxiliaryFetch;
use crate::parser::resolve_link;
use crate::report::{Category, CategoryResult, Severity};
use crate::robots::{ai_crawler_access, KEY_AI_CRAWLERS};
use crate::url::is_same_site;
use async_trait::async_trait;
use tracing::debug;

/// Agent whose view of robots.txt decides page crawlability
const SEARCH_AGENT: &str = "Googlebot";

/// Response headers checked for hardening, with their cost and severity
const SECURITY_HEADERS: &[(&str, f64, Severity)] = &[
    ("content-security-policy", 2.0, Severity::Low),
    ("strict-transport-security", 3.0, Severity::Medium),
    ("x-frame-options", 2.0, Severity::Low),
    ("x-content-type-options", 2.0, Severity::Low),
    ("referrer-policy", 2.0, Severity::Low),
];

/// Crawlability, indexability and transport checks
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalAnalyzer;

#[async_trait]
impl Analyzer for TechnicalAnalyzer {
    fn category(&self) -> Category {
        Category::Technical
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        let mut card = Scorecard::new(Category::Technical);

        check_title(ctx, &mut card);
        check_meta_description(ctx, &mut card);
        check_canonical(ctx, &mut card);
        check_indexability(ctx, &mut card);
        check_transport(ctx, &mut card);
        check_security_headers(ctx, &mut card);
        check_robots(ctx, &mut card);
        check_sitemap(ctx, &mut card);
        check_ai_crawlers(ctx, &mut card);

        debug!(
            "Technical analysis of {}: {} findings",
            ctx.document.url,
            card.findings().len()
        );
        Ok(card.finish(ctx.weight(Category::Technical)))
    }
}

fn check_title(ctx: &AnalysisContext, card: &mut Scorecard) {
    let thresholds = &ctx.config.thresholds;
    let title = ctx.document.title.as_deref().map(str::trim).unwrap_or("");
    let len = title.chars().count();

    if len == 0 {
        card.flag(
            15.0,
            "tech-missing-title",
            Severity::Critical,
            "Page has no <title> tag",
            format!(
                "Add a unique title of {}-{} characters that names the page topic",
                thresholds.title_min, thresholds.title_max
            ),
        );
    } else if len < thresholds.title_min {
        let finding = card
            .finding(
                "tech-short-title",
                Severity::High,
                format!(
                    "Title is {} characters, shorter than the {} minimum",
                    len, thresholds.title_min
                ),
                "Expand the title with the primary keyword and a distinguishing detail",
            )
            .with_element(title);
        card.penalize(8.0, finding);
    } else if len > thresholds.title_max {
        let finding = card
            .finding(
                "tech-long-title",
                Severity::Medium,
                format!(
                    "Title is {} characters and will be truncated in results (max {})",
                    len, thresholds.title_max
                ),
                "Shorten the title and put the primary keyword first",
            )
            .with_element(title);
        card.penalize(5.0, finding);
    }
}

fn check_meta_description(ctx: &AnalysisContext, card: &mut Scorecard) {
    let thresholds = &ctx.config.thresholds;
    let description = ctx
        .document
        .meta_description
        .as_deref()
        .map(str::trim)
        .unwrap_or("");
    let len = description.chars().count();

    if len == 0 {
        card.flag(
            10.0,
            "tech-missing-meta-description",
            Severity::High,
            "Page has no meta description",
            format!(
                "Add a meta description of {}-{} characters summarizing the page",
                thresholds.meta_description_min, thresholds.meta_description_max
            ),
        );
    } else if len < thresholds.meta_description_min {
        card.flag(
            5.0,
            "tech-short-meta-description",
            Severity::Medium,
            format!(
                "Meta description is {} characters, shorter than the {} minimum",
                len, thresholds.meta_description_min
            ),
            "Expand the description with the page's value proposition",
        );
    } else if len > thresholds.meta_description_max {
        card.flag(
            3.0,
            "tech-long-meta-description",
            Severity::Low,
            format!(
                "Meta description is {} characters and will be truncated (max {})",
                len, thresholds.meta_description_max
            ),
            "Trim the description so the key message fits",
        );
    }
}

fn check_canonical(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;
    let canonical = match document.canonical.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => {
            card.flag(
                8.0,
                "tech-missing-canonical",
                Severity::High,
                "Page has no canonical link",
                "Add <link rel=\"canonical\"> pointing at the preferred URL of this page",
            );
            return;
        }
    };

    match resolve_link(canonical, &document.url) {
        None => {
            let finding = card
                .finding(
                    "tech-invalid-canonical",
                    Severity::High,
                    "Canonical link is not a valid HTTP(S) URL",
                    "Point the canonical link at an absolute HTTPS URL",
                )
                .with_element(canonical);
            card.penalize(6.0, finding);
        }
        Some(target) if !is_same_site(&target, &document.url) => {
            let finding = card
                .finding(
                    "tech-cross-domain-canonical",
                    Severity::Medium,
                    "Canonical link points to a different host",
                    "Only canonicalize across hosts when this page duplicates that content",
                )
                .with_element(target.to_string());
            card.penalize(4.0, finding);
        }
        Some(_) => {}
    }
}

fn check_indexability(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;

    let noindex = document
        .meta_robots
        .as_deref()
        .map(|r| r.to_ascii_lowercase().contains("noindex"))
        .unwrap_or(false)
        || ctx
            .page
            .header("x-robots-tag")
            .map(|r| r.to_ascii_lowercase().contains("noindex"))
            .unwrap_or(false);

    if noindex {
        card.flag(
            20.0,
            "tech-noindex",
            Severity::Critical,
            "Page is marked noindex and will be dropped from search results",
            "Remove the noindex directive if this page should rank",
        );
    }

    if document.viewport.is_none() {
        card.flag(
            10.0,
            "tech-missing-viewport",
            Severity::High,
            "Page has no viewport meta tag",
            "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
        );
    }
}

fn check_transport(ctx: &AnalysisContext, card: &mut Scorecard) {
    let page = &ctx.page;

    if !page.is_https() {
        let finding = card
            .finding(
                "tech-no-https",
                Severity::Critical,
                "Page is served over plain HTTP",
                "Serve the site over HTTPS and redirect HTTP requests to it",
            )
            .with_element(page.final_url.to_string());
        card.penalize(15.0, finding);
    }

    let hops = page.redirect_chain.len();
    if hops > 1 {
        let finding = card
            .finding(
                "tech-redirect-chain",
                Severity::Medium,
                format!("Page is reached through a chain of {} redirects", hops),
                "Link to the final URL directly and collapse the chain to one hop",
            )
            .with_element(page.redirect_chain.join(" -> "));
        card.penalize(5.0, finding);
    }
}

fn check_security_headers(ctx: &AnalysisContext, card: &mut Scorecard) {
    for (header, points, severity) in SECURITY_HEADERS {
        if ctx.page.header(header).is_none() {
            let finding = card
                .finding(
                    &format!("tech-missing-{}", header),
                    *severity,
                    format!("Response has no {} header", header),
                    format!("Send a {} header from the server or CDN", header),
                )
                .with_element(*header);
            card.penalize(*points, finding);
        }
    }
}

fn check_robots(ctx: &AnalysisContext, card: &mut Scorecard) {
    let thresholds = &ctx.config.thresholds;

    match &ctx.auxiliary.robots_txt {
        AuxiliaryFetch::Missing { status } => {
            card.flag(
                5.0,
                "tech-missing-robots-txt",
                Severity::Medium,
                format!("No robots.txt found (HTTP {})", status),
                "Publish a robots.txt at the site root that lists the sitemap",
            );
        }
        AuxiliaryFetch::Failed(err) => {
            card.flag(
                5.0,
                "tech-robots-txt-unreachable",
                Severity::Medium,
                format!("robots.txt could not be fetched: {}", err),
                "Make sure robots.txt responds quickly with HTTP 200",
            );
        }
        AuxiliaryFetch::Present { .. } => {
            let robots = ctx.robots();
            let origin = ctx.origin();

            if robots.blocks_everything(&origin) {
                card.flag(
                    20.0,
                    "tech-robots-blocks-all",
                    Severity::Critical,
                    "robots.txt disallows the whole site for all crawlers",
                    "Remove the site-wide `Disallow: /` from the `User-agent: *` group",
                );
            } else if !robots.is_allowed(ctx.document.url.as_str(), SEARCH_AGENT) {
                let finding = card
                    .finding(
                        "tech-robots-blocks-page",
                        Severity::High,
                        "robots.txt disallows this page for search crawlers",
                        "Adjust the Disallow rules so this URL can be crawled",
                    )
                    .with_element(ctx.document.url.path());
                card.penalize(12.0, finding);
            }

            if let Some(delay) = robots.crawl_delay(SEARCH_AGENT) {
                if delay > thresholds.max_crawl_delay_secs {
                    card.flag(
                        3.0,
                        "tech-excessive-crawl-delay",
                        Severity::Low,
                        format!(
                            "robots.txt sets a crawl-delay of {}s (over {}s)",
                            delay, thresholds.max_crawl_delay_secs
                        ),
                        "Lower or remove the Crawl-delay directive",
                    );
                }
            }
        }
    }
}

fn check_sitemap(ctx: &AnalysisContext, card: &mut Scorecard) {
    if ctx.auxiliary.sitemap.is_present() {
        return;
    }
    // A sitemap advertised in robots.txt at a custom location still counts
    if !ctx.robots().sitemaps().is_empty() {
        return;
    }
    card.flag(
        5.0,
        "tech-missing-sitemap",
        Severity::Medium,
        "No XML sitemap found at the default locations or in robots.txt",
        "Publish /sitemap.xml and reference it from robots.txt",
    );
}

fn check_ai_crawlers(ctx: &AnalysisContext, card: &mut Scorecard) {
    if !ctx.auxiliary.robots_txt.is_present() {
        return;
    }
    let access = ai_crawler_access(&ctx.robots(), &ctx.origin());
    let blocked: Vec<&str> = KEY_AI_CRAWLERS
        .iter()
        .copied()
        .filter(|crawler| access.get(crawler).map(|a| a.is_blocked()).unwrap_or(false))
        .collect();

    if !blocked.is_empty() {
        // Informational here; the GEO category carries the cost
        let finding = card
            .finding(
                "tech-ai-crawlers-blocked",
                Severity::Low,
                format!("robots.txt blocks AI crawlers: {}", blocked.join(", ")),
                "Allow AI crawlers if the site should appear in AI-generated answers",
            )
            .with_element(blocked.join(", "));
        card.penalize(0.0, finding);
    }
}
