use crate::analyzers::{AnalysisContext, Analyzer, AnalyzerError, Scorecard};
use crate::parser::Image;
use crate::report::{Category, CategoryResult, Severity};
use async_trait::async_trait;

/// Alt texts shorter than this say too little
const MIN_ALT_CHARS: usize = 10;

/// Image accessibility, formats and loading behavior
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageAnalyzer;

#[async_trait]
impl Analyzer for ImageAnalyzer {
    fn category(&self) -> Category {
        Category::Images
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        let mut card = Scorecard::new(Category::Images);
        let images = &ctx.document.images;

        if !images.is_empty() {
            check_alt_text(images, &mut card);
            check_formats(images, &mut card);
            check_dimensions(images, &mut card);
            check_loading(images, ctx.config.thresholds.above_fold_images, &mut card);
        }

        Ok(card.finish(ctx.weight(Category::Images)))
    }
}

/// Alt text that looks like a file name or a placeholder
fn is_placeholder_alt(alt: &str) -> bool {
    let lower = alt.to_ascii_lowercase();
    let file_like = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".avif", ".svg"]
        .iter()
        .any(|ext| lower.ends_with(ext));
    file_like || matches!(lower.as_str(), "image" | "photo" | "picture" | "img" | "logo")
}

fn check_alt_text(images: &[Image], card: &mut Scorecard) {
    // alt="" marks a decorative image and is fine
    let missing: Vec<&Image> = images.iter().filter(|i| i.alt.is_none()).collect();
    if let Some(first) = missing.first() {
        let count = missing.len();
        let (severity, cap) = if count > 3 {
            (Severity::High, 20)
        } else {
            (Severity::Medium, 12)
        };
        let finding = card
            .finding(
                "img-missing-alt",
                severity,
                format!("{} of {} images have no alt attribute", count, images.len()),
                "Describe each meaningful image in its alt attribute; use alt=\"\" for decoration",
            )
            .with_element(first.src.as_str());
        card.penalize((count * 4).min(cap) as f64, finding);
    }

    let poor: Vec<&str> = images
        .iter()
        .filter_map(|i| i.alt.as_deref())
        .map(str::trim)
        .filter(|alt| {
            !alt.is_empty() && (alt.chars().count() < MIN_ALT_CHARS || is_placeholder_alt(alt))
        })
        .collect();
    if let Some(first) = poor.first() {
        let finding = card
            .finding(
                "img-poor-alt",
                Severity::Low,
                format!("{} images have very short or placeholder alt text", poor.len()),
                "Write alt text that says what the image shows and why it matters",
            )
            .with_element(*first);
        card.penalize(5.0, finding);
    }
}

fn check_formats(images: &[Image], card: &mut Scorecard) {
    let legacy = images.iter().filter(|i| i.is_legacy_format()).count();
    let ratio = legacy as f64 / images.len() as f64;
    if ratio > 0.5 {
        card.flag(
            (ratio * 10.0).round().min(10.0),
            "img-legacy-formats",
            Severity::Medium,
            format!("{} of {} images are JPEG/PNG/GIF", legacy, images.len()),
            "Convert images to WebP or AVIF, or offer them through <picture>",
        );
    }
}

fn check_dimensions(images: &[Image], card: &mut Scorecard) {
    let unsized_images: Vec<&Image> = images.iter().filter(|i| !i.has_dimensions()).collect();
    if let Some(first) = unsized_images.first() {
        let count = unsized_images.len();
        let (severity, cap) = if count > 5 {
            (Severity::High, 15)
        } else {
            (Severity::Medium, 6)
        };
        let finding = card
            .finding(
                "img-missing-dimensions",
                severity,
                format!("{} images have no explicit width and height", count),
                "Set width and height attributes so the browser reserves space",
            )
            .with_element(first.src.as_str());
        card.penalize((count * 2).min(cap) as f64, finding);
    }
}

fn check_loading(images: &[Image], above_fold: usize, card: &mut Scorecard) {
    let eager_below_fold = images
        .iter()
        .skip(above_fold)
        .filter(|i| !i.is_lazy())
        .count();
    if eager_below_fold > 3 {
        card.flag(
            ((eager_below_fold as f64) / 2.0).round().min(10.0),
            "img-no-lazy-loading",
            Severity::Medium,
            format!("{} images below the fold load eagerly", eager_below_fold),
            "Add loading=\"lazy\" to images below the fold",
        );
    }

    if let Some(hero) = images.first() {
        if hero.is_lazy() {
            let finding = card
                .finding(
                    "img-hero-lazy",
                    Severity::High,
                    "The first (hero) image is lazy-loaded, delaying LCP",
                    "Remove loading=\"lazy\" from the hero image and add fetchpriority=\"high\"",
                )
                .with_element(hero.src.as_str());
            card.penalize(10.0, finding);
        } else if hero.fetch_priority.as_deref() != Some("high") {
            let finding = card
                .finding(
                    "img-hero-not-prioritized",
                    Severity::Low,
                    "The hero image is not marked fetchpriority=\"high\"",
                    "Add fetchpriority=\"high\" to the hero image",
                )
                .with_element(hero.src.as_str());
            card.penalize(3.0, finding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;

    async fn run(images: &str) -> CategoryResult {
        let body = format!("<html><body>{}</body></html>", images);
        ImageAnalyzer.analyze(&context(&body)).await.unwrap()
    }

    #[tokio::test]
    async fn test_no_images_scores_100() {
        let result = run("<p>text only</p>").await;
        assert_eq!(result.score, 100);
        assert!(result.findings.is_empty());
    }

    #[tokio::test]
    async fn test_optimized_images() {
        let result = run(
            r#"<img src="/hero.avif" alt="Team reviewing a search report" width="1200" height="600" fetchpriority="high">
               <img src="/chart.webp" alt="Traffic growth chart for 2025" width="600" height="400" loading="lazy">
               <img src="/divider.svg" alt="" width="600" height="4" loading="lazy">"#,
        )
        .await;
        assert_eq!(result.score, 100, "{:?}", rules(&result));
    }

    #[tokio::test]
    async fn test_missing_and_poor_alt() {
        let result = run(
            r#"<img src="/a.webp" width="1" height="1" fetchpriority="high">
               <img src="/b.webp" alt="IMG_0042.jpg" width="1" height="1" loading="lazy">
               <img src="/c.webp" alt="dog" width="1" height="1" loading="lazy">"#,
        )
        .await;
        assert_eq!(rules(&result), vec!["img-missing-alt", "img-poor-alt"]);
        assert_eq!(result.findings[0].severity, Severity::Medium);
        assert_eq!(result.findings[1].affected_element.as_deref(), Some("IMG_0042.jpg"));
        assert_eq!(result.score, 91);
    }

    #[tokio::test]
    async fn test_many_missing_alts_is_high() {
        let imgs: String = (0..5)
            .map(|i| format!(r#"<img src="/{}.webp" width="1" height="1" loading="lazy">"#, i))
            .collect();
        let result = run(&imgs).await;
        let alt = &result.findings[0];
        assert_eq!(alt.rule, "img-missing-alt");
        assert_eq!(alt.severity, Severity::High);
        assert!(rules(&result).contains(&"img-hero-lazy"));
        // 20 for alts, 10 for the lazy hero
        assert_eq!(result.score, 70);
    }

    #[tokio::test]
    async fn test_formats_dimensions_and_loading() {
        let imgs: String = (0..6)
            .map(|i| format!(r#"<img src="/photo{}.jpg" alt="Product photo number {}">"#, i, i))
            .collect();
        let result = run(&imgs).await;
        assert_eq!(
            rules(&result),
            vec![
                "img-legacy-formats",
                "img-missing-dimensions",
                "img-no-lazy-loading",
                "img-hero-not-prioritized"
            ]
        );
        // 10 + 12 + 3 + 3
        assert_eq!(result.score, 72);
    }

    #[test]
    fn test_placeholder_alt() {
        assert!(is_placeholder_alt("hero-banner.png"));
        assert!(is_placeholder_alt("Image"));
        assert!(!is_placeholder_alt("Graph of organic traffic"));
    }
}
