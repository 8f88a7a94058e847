//! Generative-engine optimization: how well AI answer engines can find,
//! quote and attribute the page.
//!
//! The category score is split over five areas. Every deduction lands on
//! one area, so the area sub-scores always sum to the category score.

use crate::analyzers::{
    first_heading_skip, has_schema_dates, has_schema_type, AnalysisContext, Analyzer,
    AnalyzerError, Scorecard,
};
use crate::parser::word_count;
use crate::report::{Category, CategoryResult, Finding, Severity, SubScore};
use crate::robots::{ai_crawler_access, CrawlerAccess, AI_CRAWLERS, KEY_AI_CRAWLERS};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Phrases that mark a definition-style opening
const DIRECT_ANSWER_MARKERS: &[&str] = &[" is ", " refers to ", " defined as ", " means ", " are "];

/// How much of the text counts as the opening
const OPENING_CHARS: usize = 500;

/// Question words that open a heading
const QUESTION_WORDS: &[&str] = &["what", "how", "why", "when", "where", "which", "who"];

/// Blocking scripts beyond which the page depends on JavaScript to render
const MAX_BLOCKING_SCRIPTS: usize = 10;

/// Average paragraph length that reads as a wall of text
const WALL_OF_TEXT_WORDS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Area {
    Citability,
    Structure,
    MultiModal,
    Authority,
    TechnicalAccess,
}

impl Area {
    const ALL: [Area; 5] = [
        Area::Citability,
        Area::Structure,
        Area::MultiModal,
        Area::Authority,
        Area::TechnicalAccess,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Citability => "citability",
            Self::Structure => "structure",
            Self::MultiModal => "multi_modal",
            Self::Authority => "authority",
            Self::TechnicalAccess => "technical_access",
        }
    }

    fn max_score(self) -> f64 {
        match self {
            Self::Citability => 25.0,
            Self::Structure => 20.0,
            Self::MultiModal => 15.0,
            Self::Authority => 20.0,
            Self::TechnicalAccess => 20.0,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Scorecard that also tracks the loss per area
struct GeoCard {
    card: Scorecard,
    lost: [f64; 5],
    details: [Option<String>; 5],
}

impl GeoCard {
    fn new() -> Self {
        Self {
            card: Scorecard::new(Category::Geo),
            lost: [0.0; 5],
            details: Default::default(),
        }
    }

    fn finding(
        &self,
        rule: &str,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Finding {
        self.card.finding(rule, severity, message, recommendation)
    }

    fn penalize(&mut self, area: Area, points: f64, finding: Finding) {
        self.lost[area.index()] += points;
        self.card.penalize(points, finding);
    }

    fn flag(
        &mut self,
        area: Area,
        points: f64,
        rule: &str,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) {
        let finding = self.finding(rule, severity, message, recommendation);
        self.penalize(area, points, finding);
    }

    fn detail(&mut self, area: Area, detail: String) {
        self.details[area.index()] = Some(detail);
    }

    fn finish(mut self, weight: f64) -> CategoryResult {
        for area in Area::ALL {
            let max = area.max_score();
            let score = (max - self.lost[area.index()]).clamp(0.0, max);
            let mut sub = SubScore::ok(area.name(), score, max);
            if let Some(detail) = self.details[area.index()].take() {
                sub = sub.with_detail(detail);
            }
            self.card.sub_score(sub);
        }
        self.card.finish(weight)
    }
}

/// AI search readiness across five weighted areas
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoAnalyzer;

#[async_trait]
impl Analyzer for GeoAnalyzer {
    fn category(&self) -> Category {
        Category::Geo
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        let mut geo = GeoCard::new();

        check_citability(ctx, &mut geo);
        check_structure(ctx, &mut geo);
        check_multi_modal(ctx, &mut geo);
        check_authority(ctx, &mut geo);
        check_technical_access(ctx, &mut geo);

        Ok(geo.finish(ctx.weight(Category::Geo)))
    }
}

fn statistics_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)\d+%|\d+\.\d+|\$\d+|[\d,]+\s*(users|customers|companies|revenue|growth)")
                .ok()
        })
        .as_ref()
}

fn check_citability(ctx: &AnalysisContext, geo: &mut GeoCard) {
    let document = &ctx.document;
    let thresholds = &ctx.config.thresholds;
    let words = document.word_count;

    let citable = document
        .paragraphs
        .iter()
        .map(|p| word_count(p))
        .filter(|n| (thresholds.citable_min_words..=thresholds.citable_max_words).contains(n))
        .count();
    geo.detail(
        Area::Citability,
        format!("{} citable passages", citable),
    );

    if citable == 0 && words > 200 {
        geo.flag(
            Area::Citability,
            12.0,
            "geo-no-citable-passages",
            Severity::High,
            format!(
                "No self-contained passages of {}-{} words that an AI answer could quote",
                thresholds.citable_min_words, thresholds.citable_max_words
            ),
            "Write paragraphs that answer one question completely in 50-200 words",
        );
    } else if citable < 3 && words > 500 {
        geo.flag(
            Area::Citability,
            6.0,
            "geo-few-citable-passages",
            Severity::Medium,
            format!("Only {} citable passages in {} words", citable, words),
            "Break long sections into focused, quotable paragraphs",
        );
    }

    if words > 200 {
        let opening: String = document
            .raw_text
            .chars()
            .take(OPENING_CHARS)
            .collect::<String>()
            .to_lowercase();
        let opening = format!(" {} ", opening);
        if !DIRECT_ANSWER_MARKERS.iter().any(|m| opening.contains(m)) {
            geo.flag(
                Area::Citability,
                5.0,
                "geo-no-direct-answer",
                Severity::Medium,
                "The opening does not answer or define the topic directly",
                "Open with a one or two sentence answer (\"X is ...\") before the detail",
            );
        }

        let has_statistics = statistics_pattern()
            .map(|re| re.is_match(&document.raw_text))
            .unwrap_or(true);
        if !has_statistics {
            geo.flag(
                Area::Citability,
                4.0,
                "geo-no-statistics",
                Severity::Low,
                "No statistics or concrete figures in the text",
                "Support claims with specific numbers and their sources",
            );
        }
    }
}

fn is_question_heading(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    lower.ends_with('?')
        || QUESTION_WORDS
            .iter()
            .any(|q| lower.strip_prefix(q).map(|rest| rest.starts_with(' ')).unwrap_or(false))
}

fn check_structure(ctx: &AnalysisContext, geo: &mut GeoCard) {
    let document = &ctx.document;
    let words = document.word_count;

    let questions = document
        .headings
        .iter()
        .filter(|h| h.level >= 2 && is_question_heading(&h.text))
        .count();
    geo.detail(Area::Structure, format!("{} question headings", questions));

    if questions == 0 && words > 500 {
        geo.flag(
            Area::Structure,
            6.0,
            "geo-no-question-headings",
            Severity::Medium,
            "No headings phrased as the questions readers ask",
            "Phrase some H2/H3 headings as questions and answer them right below",
        );
    }

    if first_heading_skip(&document.headings).is_some() {
        geo.flag(
            Area::Structure,
            5.0,
            "geo-broken-heading-hierarchy",
            Severity::Medium,
            "Heading levels skip, which hides the outline from AI parsers",
            "Nest headings one level at a time",
        );
    }

    if words > 300 && document.list_count == 0 && document.table_count == 0 {
        geo.flag(
            Area::Structure,
            4.0,
            "geo-no-lists-or-tables",
            Severity::Low,
            "No lists or tables in long-form content",
            "Present steps, options and comparisons as lists or tables",
        );
    }

    if words > 300 && !document.paragraphs.is_empty() {
        let total: usize = document.paragraphs.iter().map(|p| word_count(p)).sum();
        let average = total as f64 / document.paragraphs.len() as f64;
        if average > WALL_OF_TEXT_WORDS {
            geo.flag(
                Area::Structure,
                5.0,
                "geo-wall-of-text",
                Severity::Medium,
                format!("Paragraphs average {:.0} words", average),
                "Keep paragraphs under 100 words",
            );
        }
    }
}

fn check_multi_modal(ctx: &AnalysisContext, geo: &mut GeoCard) {
    let document = &ctx.document;
    let images = document.images.len();

    geo.detail(
        Area::MultiModal,
        format!("{} images, {} videos", images, document.video_count),
    );

    if images == 0 && document.word_count > 300 {
        geo.flag(
            Area::MultiModal,
            8.0,
            "geo-no-images",
            Severity::Medium,
            "Long-form content without any images",
            "Add diagrams, screenshots or photos that support the text",
        );
    }

    if document.video_count == 0 {
        geo.flag(
            Area::MultiModal,
            4.0,
            "geo-no-video",
            Severity::Low,
            "No video content",
            "Embed a short video that covers the topic",
        );
    }

    if images > 0 {
        let without_alt = document
            .images
            .iter()
            .filter(|img| img.alt.as_deref().map(str::trim).unwrap_or("").is_empty())
            .count();
        if without_alt as f64 / images as f64 > 0.5 {
            geo.flag(
                Area::MultiModal,
                3.0,
                "geo-images-without-alt",
                Severity::Low,
                format!("{} of {} images have no alt text", without_alt, images),
                "Describe images in alt text so AI systems can interpret them",
            );
        }
    }
}

fn check_authority(ctx: &AnalysisContext, geo: &mut GeoCard) {
    let document = &ctx.document;
    let long = document.word_count > 300;

    let has_author = document.has_author_byline
        || has_schema_type(document, &["Person", "ProfilePage"])
        || document.any_schema_object(&|node| node.contains_key("author"));
    if long && !has_author {
        geo.flag(
            Area::Authority,
            6.0,
            "geo-no-author",
            Severity::Medium,
            "No identifiable author",
            "Add a visible byline and Person schema for the author",
        );
    }

    if long && !has_schema_dates(document) {
        geo.flag(
            Area::Authority,
            5.0,
            "geo-no-dates",
            Severity::Medium,
            "No publication or update date in structured data",
            "Add datePublished and dateModified so answers can judge freshness",
        );
    }

    if !has_schema_type(document, &["Organization", "LocalBusiness", "Corporation"]) {
        geo.flag(
            Area::Authority,
            4.0,
            "geo-no-organization",
            Severity::Low,
            "No Organization schema identifying the publisher",
            "Add Organization schema with name, logo and url",
        );
    }

    let external = document.external_links().count();
    if long && external < 2 {
        geo.flag(
            Area::Authority,
            3.0,
            "geo-few-citations",
            Severity::Low,
            format!("Only {} outbound links to sources", external),
            "Cite authoritative external sources for key claims",
        );
    }

    if !document.any_schema_object(&|node| node.contains_key("sameAs")) {
        geo.flag(
            Area::Authority,
            2.0,
            "geo-no-same-as",
            Severity::Low,
            "No sameAs links connecting the entity to its other profiles",
            "Add sameAs URLs (Wikipedia, LinkedIn, social profiles) to Organization or Person schema",
        );
    }
}

fn check_technical_access(ctx: &AnalysisContext, geo: &mut GeoCard) {
    let access = ai_crawler_access(&ctx.robots(), &ctx.origin());
    let allowed = access.values().filter(|a| !a.is_blocked()).count();
    let wildcard = access
        .values()
        .any(|a| *a == CrawlerAccess::BlockedByWildcard);

    let llms = if ctx.auxiliary.llms_txt.is_present() {
        "present"
    } else {
        "missing"
    };
    geo.detail(
        Area::TechnicalAccess,
        format!(
            "{}/{} AI crawlers allowed; llms.txt {}",
            allowed,
            AI_CRAWLERS.len(),
            llms
        ),
    );

    let key_blocked: Vec<&str> = KEY_AI_CRAWLERS
        .iter()
        .copied()
        .filter(|c| access.get(c) == Some(&CrawlerAccess::Blocked))
        .collect();

    if wildcard {
        geo.flag(
            Area::TechnicalAccess,
            10.0,
            "geo-ai-crawlers-wildcard-blocked",
            Severity::Critical,
            "robots.txt blocks every crawler, AI crawlers included",
            "Allow crawling of the site root, or add explicit Allow groups for AI crawlers",
        );
    } else if !key_blocked.is_empty() {
        let finding = geo
            .finding(
                "geo-ai-crawlers-blocked",
                Severity::High,
                format!("robots.txt blocks {}", key_blocked.join(", ")),
                "Remove the Disallow rules for AI crawlers you want to be cited by",
            )
            .with_element(key_blocked.join(", "));
        geo.penalize(Area::TechnicalAccess, 8.0, finding);
    }

    if !ctx.auxiliary.llms_txt.is_present() {
        geo.flag(
            Area::TechnicalAccess,
            5.0,
            "geo-no-llms-txt",
            Severity::Medium,
            "No /llms.txt file",
            "Publish /llms.txt summarizing the site and its key pages for language models",
        );
    }

    let blocking = ctx
        .document
        .scripts
        .iter()
        .filter(|s| s.is_blocking())
        .count();
    if blocking > MAX_BLOCKING_SCRIPTS {
        geo.flag(
            Area::TechnicalAccess,
            5.0,
            "geo-javascript-dependent",
            Severity::Medium,
            format!("{} blocking scripts; content may depend on JavaScript", blocking),
            "Server-render the main content so crawlers without JavaScript can read it",
        );
    }
}
