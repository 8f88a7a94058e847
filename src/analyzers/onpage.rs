use crate::analyzers::{first_heading_skip, AnalysisContext, Analyzer, AnalyzerError, Scorecard};
use crate::parser::words;
use crate::report::{Category, CategoryResult, Severity};
use crate::url::is_tracking_param;
use async_trait::async_trait;

/// Anchor texts that say nothing about the link target
const GENERIC_ANCHORS: &[&str] = &[
    "click here",
    "here",
    "click",
    "read more",
    "learn more",
    "more",
    "link",
    "this",
    "this page",
    "go",
    "continue",
];

/// Open Graph properties every shareable page needs
const REQUIRED_OPEN_GRAPH: &[&str] = &["og:title", "og:description", "og:image"];

/// Title words too common to count as keywords
const STOP_WORDS: &[&str] = &[
    "about", "after", "best", "from", "have", "into", "more", "other", "that", "their", "there",
    "these", "this", "what", "when", "where", "which", "will", "with", "your",
];

/// Headings, links, social metadata and URL shape
#[derive(Debug, Clone, Copy, Default)]
pub struct OnPageAnalyzer;

#[async_trait]
impl Analyzer for OnPageAnalyzer {
    fn category(&self) -> Category {
        Category::OnPage
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        let mut card = Scorecard::new(Category::OnPage);

        check_headings(ctx, &mut card);
        check_links(ctx, &mut card);
        check_social_tags(ctx, &mut card);
        check_url(ctx, &mut card);

        Ok(card.finish(ctx.weight(Category::OnPage)))
    }
}

fn check_headings(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;
    let h1_count = document.headings_at(1).count();

    if h1_count == 0 {
        card.flag(
            15.0,
            "onpage-missing-h1",
            Severity::Critical,
            "Page has no H1 heading",
            "Add one H1 that states the page's main topic",
        );
    } else if h1_count > 1 {
        card.flag(
            6.0,
            "onpage-multiple-h1",
            Severity::Medium,
            format!("Page has {} H1 headings", h1_count),
            "Keep a single H1 and demote the others to H2",
        );
    }

    if let Some((before, after)) = first_heading_skip(&document.headings) {
        let finding = card
            .finding(
                "onpage-heading-skip",
                Severity::Medium,
                format!(
                    "Heading hierarchy skips from H{} to H{}",
                    before.level, after.level
                ),
                "Nest headings one level at a time (H1 → H2 → H3)",
            )
            .with_element(format!("h{}: {}", after.level, after.text));
        card.penalize(5.0, finding);
    }
}

fn check_links(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;
    let minimum = ctx.config.thresholds.min_internal_links;
    let internal = document.internal_links().count();

    if internal == 0 {
        card.flag(
            10.0,
            "onpage-no-internal-links",
            Severity::High,
            "Page links to no other page on the site",
            "Link to related pages with descriptive anchor text",
        );
    } else if internal < minimum {
        card.flag(
            5.0,
            "onpage-few-internal-links",
            Severity::Medium,
            format!("Only {} internal links (minimum {})", internal, minimum),
            "Add contextual links to related pages on the site",
        );
    }

    let poor: Vec<&str> = document
        .links
        .iter()
        .map(|link| link.anchor_text.trim())
        .filter(|text| is_poor_anchor(text))
        .collect();

    if !poor.is_empty() {
        let mut examples: Vec<&str> = poor.iter().copied().filter(|t| !t.is_empty()).collect();
        examples.dedup();
        examples.truncate(3);

        let mut finding = card.finding(
            "onpage-poor-anchor-text",
            Severity::Low,
            format!("{} links have empty or generic anchor text", poor.len()),
            "Use anchor text that describes the target page",
        );
        if !examples.is_empty() {
            finding = finding.with_element(examples.join(", "));
        }
        card.penalize(3.0, finding);
    }
}

fn is_poor_anchor(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    let lower = text.to_lowercase();
    let lower = lower.trim_end_matches(|c: char| !c.is_alphanumeric());
    GENERIC_ANCHORS.contains(&lower)
}

fn check_social_tags(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;

    let missing: Vec<&str> = REQUIRED_OPEN_GRAPH
        .iter()
        .copied()
        .filter(|tag| !document.og_tags.contains_key(*tag))
        .collect();
    if !missing.is_empty() {
        let finding = card
            .finding(
                "onpage-incomplete-open-graph",
                Severity::Medium,
                format!("Open Graph tags missing: {}", missing.join(", ")),
                "Add og:title, og:description and og:image for rich link previews",
            )
            .with_element(missing.join(", "));
        card.penalize(5.0, finding);
    }

    if !document.twitter_tags.contains_key("twitter:card") {
        card.flag(
            3.0,
            "onpage-missing-twitter-card",
            Severity::Low,
            "No twitter:card meta tag",
            "Add <meta name=\"twitter:card\" content=\"summary_large_image\">",
        );
    }

    let has_lang = document
        .language
        .as_deref()
        .map(|l| !l.trim().is_empty())
        .unwrap_or(false);
    if !has_lang {
        card.flag(
            4.0,
            "onpage-missing-lang",
            Severity::Medium,
            "The <html> element has no lang attribute",
            "Declare the page language, e.g. <html lang=\"en\">",
        );
    }
}

fn check_url(ctx: &AnalysisContext, card: &mut Scorecard) {
    let thresholds = &ctx.config.thresholds;
    let url = &ctx.document.url;
    let path = url.path();

    if path.len() > thresholds.max_url_path_length {
        let finding = card
            .finding(
                "onpage-long-url",
                Severity::Low,
                format!(
                    "URL path is {} characters (max {})",
                    path.len(),
                    thresholds.max_url_path_length
                ),
                "Use a short, descriptive slug",
            )
            .with_element(path);
        card.penalize(3.0, finding);
    }

    if path.chars().any(|c| c.is_ascii_uppercase()) {
        let finding = card
            .finding(
                "onpage-uppercase-url",
                Severity::Low,
                "URL path contains uppercase letters",
                "Use lowercase URLs and redirect the mixed-case variants",
            )
            .with_element(path);
        card.penalize(2.0, finding);
    }

    if path.contains('_') {
        let finding = card
            .finding(
                "onpage-underscore-url",
                Severity::Low,
                "URL path separates words with underscores",
                "Separate words with hyphens",
            )
            .with_element(path);
        card.penalize(2.0, finding);
    }

    let params: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    let tracking: Vec<&str> = params
        .iter()
        .map(String::as_str)
        .filter(|k| is_tracking_param(k))
        .collect();
    if params.len() > thresholds.max_query_params || !tracking.is_empty() {
        let finding = card
            .finding(
                "onpage-url-parameters",
                Severity::Low,
                format!("URL carries {} query parameters", params.len()),
                "Keep indexable URLs free of tracking and session parameters",
            )
            .with_element(params.join(", "));
        card.penalize(2.0, finding);
    }

    if let Some(title) = ctx.document.title.as_deref() {
        let keywords = title_keywords(title);
        let slug = path.to_lowercase();
        let has_keyword = keywords.iter().any(|k| slug.contains(k.as_str()));
        if !path.trim_matches('/').is_empty() && !keywords.is_empty() && !has_keyword {
            let finding = card
                .finding(
                    "onpage-url-missing-keywords",
                    Severity::Low,
                    "URL slug shares no words with the page title",
                    "Include the page's primary keyword in the slug",
                )
                .with_element(path);
            card.penalize(2.0, finding);
        }
    }
}

/// Lower-cased title words long and specific enough to expect in a slug
fn title_keywords(title: &str) -> Vec<String> {
    words(title)
        .map(str::to_lowercase)
        .filter(|w| w.len() >= 4 && w.chars().all(char::is_alphabetic))
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;
    use crate::config::AuditConfig;

    const SOCIAL: &str = r#"
        <meta property="og:title" content="SEO Basics">
        <meta property="og:description" content="Learn the basics">
        <meta property="og:image" content="https://example.com/og.png">
        <meta name="twitter:card" content="summary_large_image">"#;

    const LINKS: &str = r#"
        <a href="/guides/keywords">Keyword research guide</a>
        <a href="/guides/links">Link building guide</a>
        <a href="/guides/speed">Page speed guide</a>"#;

    fn page_html(title: &str, head_extra: &str, body: &str) -> String {
        format!(
            r#"<html lang="en"><head><title>{}</title>{}</head><body>{}</body></html>"#,
            title, head_extra, body
        )
    }

    async fn run_at(url: &str, html: &str) -> CategoryResult {
        let ctx = context_with(page(url, html, &[]), missing_auxiliary(), AuditConfig::default());
        OnPageAnalyzer.analyze(&ctx).await.unwrap()
    }

    async fn run(html: &str) -> CategoryResult {
        run_at(PAGE_URL, html).await
    }

    #[tokio::test]
    async fn test_well_formed_page() {
        let html = page_html(
            "SEO Basics for Beginners",
            SOCIAL,
            &format!("<h1>SEO Basics</h1><h2>Why</h2><h3>Detail</h3><h2>How</h2>{}", LINKS),
        );
        let result = run(&html).await;
        assert_eq!(result.score, 100, "{:?}", rules(&result));
    }

    #[tokio::test]
    async fn test_h1_rules() {
        let none = run(&page_html("SEO Basics", SOCIAL, &format!("<h2>Sub</h2>{}", LINKS))).await;
        assert_eq!(rules(&none), vec!["onpage-missing-h1"]);
        assert_eq!(none.findings[0].severity, Severity::Critical);

        let two = run(&page_html(
            "SEO Basics",
            SOCIAL,
            &format!("<h1>One</h1><h1>Two</h1>{}", LINKS),
        ))
        .await;
        assert_eq!(rules(&two), vec!["onpage-multiple-h1"]);
    }

    #[tokio::test]
    async fn test_heading_skip() {
        let html = page_html(
            "SEO Basics",
            SOCIAL,
            &format!("<h1>Top</h1><h3>Deep</h3>{}", LINKS),
        );
        let result = run(&html).await;
        assert_eq!(rules(&result), vec!["onpage-heading-skip"]);
        assert_eq!(result.findings[0].affected_element.as_deref(), Some("h3: Deep"));
    }

    #[tokio::test]
    async fn test_internal_links_and_anchor_quality() {
        let none = run(&page_html("SEO Basics", SOCIAL, "<h1>Top</h1>")).await;
        assert_eq!(rules(&none), vec!["onpage-no-internal-links"]);

        let few = run(&page_html(
            "SEO Basics",
            SOCIAL,
            r#"<h1>Top</h1><a href="/a">Click here</a><a href="https://other.org/">Read more...</a>"#,
        ))
        .await;
        assert_eq!(
            rules(&few),
            vec!["onpage-few-internal-links", "onpage-poor-anchor-text"]
        );
        let anchors = few.findings.last().unwrap();
        assert_eq!(anchors.affected_element.as_deref(), Some("Click here, Read more..."));
    }

    #[tokio::test]
    async fn test_social_tags_and_lang() {
        let html = format!(
            r#"<html><head><title>SEO Basics</title>
            <meta property="og:title" content="SEO Basics"></head>
            <body><h1>Top</h1>{}</body></html>"#,
            LINKS
        );
        let result = run(&html).await;
        assert_eq!(
            rules(&result),
            vec![
                "onpage-incomplete-open-graph",
                "onpage-missing-twitter-card",
                "onpage-missing-lang"
            ]
        );
        assert_eq!(
            result.findings[0].affected_element.as_deref(),
            Some("og:description, og:image")
        );
        assert_eq!(result.score, 88);
    }

    #[tokio::test]
    async fn test_url_structure() {
        let html = page_html("Keyword Research", SOCIAL, &format!("<h1>Top</h1>{}", LINKS));
        let result = run_at(
            "https://example.com/Blog_Posts/item?utm_source=x&id=4",
            &html,
        )
        .await;
        assert_eq!(
            rules(&result),
            vec![
                "onpage-uppercase-url",
                "onpage-underscore-url",
                "onpage-url-parameters",
                "onpage-url-missing-keywords"
            ]
        );
    }

    #[tokio::test]
    async fn test_homepage_skips_keyword_check() {
        let html = page_html("Acme Widgets", SOCIAL, &format!("<h1>Top</h1>{}", LINKS));
        let result = run_at("https://example.com/", &html).await;
        assert!(result.findings.is_empty(), "{:?}", rules(&result));
    }

    #[test]
    fn test_title_keywords() {
        assert_eq!(
            title_keywords("The Best SEO Guide for 2025: What Works"),
            vec!["guide".to_string(), "works".to_string()]
        );
    }
}
