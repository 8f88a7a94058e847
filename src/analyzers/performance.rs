use crate::analyzers::{graduated, AnalysisContext, Analyzer, AnalyzerError, Scorecard};
use crate::report::{Category, CategoryResult, Severity};
use async_trait::async_trait;

/// Hosts serving external web fonts
const FONT_HOSTS: &[&str] = &[
    "fonts.googleapis.com",
    "use.typekit.net",
    "use.fontawesome.com",
    "fonts.bunny.net",
];

/// Response headers that reveal a CDN or edge cache
const CDN_HEADERS: &[&str] = &["cf-ray", "x-cache", "x-cdn", "x-served-by", "x-amz-cf-id"];

/// Lab-side signals for the Core Web Vitals
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceAnalyzer;

#[async_trait]
impl Analyzer for PerformanceAnalyzer {
    fn category(&self) -> Category {
        Category::Performance
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        let mut card = Scorecard::new(Category::Performance);

        check_render_blocking(ctx, &mut card);
        check_page_weight(ctx, &mut card);
        check_layout_shift(ctx, &mut card);
        check_delivery(ctx, &mut card);

        Ok(card.finish(ctx.weight(Category::Performance)))
    }
}

fn check_render_blocking(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;
    let thresholds = &ctx.config.thresholds;

    let blocking: Vec<&str> = document
        .scripts
        .iter()
        .filter(|s| s.in_head && s.is_blocking())
        .map(|s| s.src.as_str())
        .collect();
    let count = blocking.len();

    if count > 0 {
        let (severity, cap) = if count > 3 {
            (Severity::High, 15)
        } else {
            (Severity::Medium, 9)
        };
        let finding = card
            .finding(
                "perf-render-blocking-scripts",
                severity,
                format!("{} render-blocking scripts in <head>", count),
                "Add defer or async to scripts, or move them to the end of <body>",
            )
            .with_element(blocking.first().copied().unwrap_or_default());
        card.penalize((count * 3).min(cap) as f64, finding);
    }

    let stylesheets = document.stylesheets.len();
    if stylesheets > thresholds.max_stylesheets {
        card.flag(
            5.0,
            "perf-too-many-stylesheets",
            Severity::Medium,
            format!(
                "{} stylesheets (max {})",
                stylesheets, thresholds.max_stylesheets
            ),
            "Bundle stylesheets and inline the critical CSS",
        );
    }

    let fonts: Vec<&str> = document
        .stylesheets
        .iter()
        .map(String::as_str)
        .filter(|href| FONT_HOSTS.iter().any(|host| href.contains(host)))
        .collect();
    if let Some(first) = fonts.first() {
        let finding = card
            .finding(
                "perf-external-web-fonts",
                Severity::Low,
                format!("{} external web font stylesheets", fonts.len()),
                "Self-host fonts with font-display: swap and preload the main face",
            )
            .with_element(*first);
        card.penalize(2.0, finding);
    }
}

fn check_page_weight(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;
    let thresholds = &ctx.config.thresholds;

    let elements = document.element_count;
    let max = thresholds.max_dom_elements;
    if elements > max {
        let excess = (elements - max) as f64 / max as f64;
        card.flag(
            graduated(4.0, 8.0, excess),
            "perf-large-dom",
            Severity::Medium,
            format!(
                "DOM has {} elements (max {}); large DOMs slow interactions past the {}ms INP target",
                elements, max, thresholds.core_web_vitals.inp_ms
            ),
            "Simplify markup and paginate or virtualize long lists",
        );
    }

    let images = document.images.len();
    if images > 0 {
        let legacy = document.images.iter().filter(|i| i.is_legacy_format()).count();
        if legacy as f64 / images as f64 > 0.5 {
            card.flag(
                8.0,
                "perf-legacy-image-formats",
                Severity::Medium,
                format!("{} of {} images use JPEG/PNG/GIF", legacy, images),
                "Serve WebP or AVIF images",
            );
        }
    }
}

fn check_layout_shift(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;
    let unsized_images = document.images.iter().filter(|i| !i.has_dimensions()).count();
    let unsized_total = unsized_images + document.embeds_without_dimensions;

    if unsized_total == 0 {
        return;
    }

    let (severity, cap) = if unsized_total > 5 {
        (Severity::High, 12)
    } else {
        (Severity::Medium, 6)
    };
    card.flag(
        (unsized_total * 2).min(cap) as f64,
        "perf-layout-shift-risk",
        severity,
        format!(
            "{} images and {} embeds have no width/height, risking CLS above {}",
            unsized_images,
            document.embeds_without_dimensions,
            ctx.config.thresholds.core_web_vitals.cls
        ),
        "Set width and height (or aspect-ratio) on every image, video and iframe",
    );
}

fn check_delivery(ctx: &AnalysisContext, card: &mut Scorecard) {
    let page = &ctx.page;

    if !CDN_HEADERS.iter().any(|h| page.header(h).is_some()) {
        card.flag(
            3.0,
            "perf-no-cdn",
            Severity::Low,
            "No CDN or edge cache detected in the response headers",
            "Serve the site through a CDN",
        );
    }

    let lcp = ctx.config.thresholds.core_web_vitals.lcp_seconds;
    let response = page.elapsed.as_secs_f64();
    if response > lcp {
        card.flag(
            graduated(6.0, 6.0, (response - lcp) / lcp),
            "perf-slow-response",
            Severity::High,
            format!(
                "Server took {:.2}s to deliver the page, above the {:.1}s LCP target on its own",
                response, lcp
            ),
            "Cache rendered pages and reduce server processing time",
        );
    }
}
