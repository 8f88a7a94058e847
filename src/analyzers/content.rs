use crate::analyzers::{
    graduated, has_schema_dates, has_schema_type, AnalysisContext, Analyzer, AnalyzerError,
    Scorecard,
};
use crate::eeat::{
    truncate_words, AiContentRisk, ClassifierError, EeatAssessment, EeatClassifier, EeatRequest,
};
use crate::parser::flesch_reading_ease;
use crate::report::{Category, CategoryResult, CategoryStatus, Severity, SubScore};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Below this fraction of the page-type minimum, content counts as thin
const THIN_CONTENT_RATIO: f64 = 0.4;

/// Word count above which missing sub-headings are flagged
const SUBHEADING_WORDS: usize = 300;

/// Word count above which a missing publication date is flagged
const DATED_CONTENT_WORDS: usize = 500;

/// Content depth, readability and E-E-A-T
pub struct ContentAnalyzer {
    classifier: Arc<dyn EeatClassifier>,
}

impl ContentAnalyzer {
    pub fn new(classifier: Arc<dyn EeatClassifier>) -> Self {
        Self { classifier }
    }

    /// Runs the classifier under the configured AI timeout
    async fn classify(&self, ctx: &AnalysisContext) -> Result<EeatAssessment, ClassifierError> {
        let ai = &ctx.config.ai;
        let document = &ctx.document;

        let chars = document.raw_text.chars().count();
        if chars < ai.min_text_chars {
            return Err(ClassifierError::InsufficientText { chars });
        }

        let request = EeatRequest {
            url: document.url.to_string(),
            title: document.title.clone(),
            text: truncate_words(&document.raw_text, ai.max_words),
        };

        let timeout = Duration::from_secs(ai.timeout_secs);
        match tokio::time::timeout(timeout, self.classifier.classify(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout),
        }
    }
}

#[async_trait]
impl Analyzer for ContentAnalyzer {
    fn category(&self) -> Category {
        Category::Content
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        let mut card = Scorecard::new(Category::Content);

        check_word_count(ctx, &mut card);
        check_readability(ctx, &mut card);
        check_structure(ctx, &mut card);

        let rules_score = card.score().clamp(0.0, 100.0);
        card.sub_score(SubScore::ok("rules", rules_score.round(), 100.0));

        let share = ctx.config.ai.eeat_share / 100.0;
        match self.classify(ctx).await {
            Ok(assessment) => {
                let eeat = assessment.weighted_score(&ctx.config.ai.eeat_weights);
                debug!(
                    "E-E-A-T for {} via {}: {:.1} (ai risk {})",
                    ctx.document.url,
                    self.classifier.name(),
                    eeat,
                    assessment.ai_content_risk
                );
                card.sub_score(
                    SubScore::ok("eeat", eeat.round(), 100.0).with_detail(describe(&assessment)),
                );
                card.blend(eeat, share);
                flag_weak_eeat(&mut card, eeat, true);
                flag_ai_risk(&mut card, assessment.ai_content_risk);
            }
            Err(err) => {
                match &err {
                    ClassifierError::Disabled(_) | ClassifierError::InsufficientText { .. } => {
                        debug!("E-E-A-T classification skipped for {}: {}", ctx.document.url, err)
                    }
                    _ => warn!(
                        "E-E-A-T classification failed for {}: {}; using rule-based estimate",
                        ctx.document.url, err
                    ),
                }
                let estimate = estimate_eeat(ctx).min(ctx.config.ai.fallback_cap);
                card.sub_score(
                    SubScore::ok("eeat", estimate.round(), 100.0)
                        .with_status(CategoryStatus::Failed {
                            reason: err.to_string(),
                        })
                        .with_detail("rule-based estimate"),
                );
                card.blend(estimate, share);
                flag_weak_eeat(&mut card, estimate, false);
            }
        }

        Ok(card.finish(ctx.weight(Category::Content)))
    }
}

fn check_word_count(ctx: &AnalysisContext, card: &mut Scorecard) {
    let words = ctx.document.word_count;
    let minimum = ctx.config.thresholds.word_count.for_page_type(ctx.page_type);
    if words >= minimum {
        return;
    }

    let shortfall = (minimum - words) as f64 / minimum as f64;
    if (words as f64) < minimum as f64 * THIN_CONTENT_RATIO {
        card.flag(
            20.0,
            "content-thin",
            Severity::Critical,
            format!(
                "Thin content: {} words, far below the {} expected for a {} page",
                words, minimum, ctx.page_type
            ),
            "Expand the page with substantive, original material that answers the visitor's question",
        );
    } else {
        card.flag(
            graduated(6.0, 10.0, shortfall),
            "content-short",
            Severity::High,
            format!(
                "Content is {} words, below the {} expected for a {} page",
                words, minimum, ctx.page_type
            ),
            "Add depth: examples, data, and answers to related questions",
        );
    }
}

fn check_readability(ctx: &AnalysisContext, card: &mut Scorecard) {
    if ctx.document.word_count == 0 {
        return;
    }
    let ease = flesch_reading_ease(&ctx.document.raw_text);

    if ease < 30.0 {
        card.flag(
            8.0,
            "content-very-hard-to-read",
            Severity::Medium,
            format!("Flesch reading ease is {:.0} (very difficult)", ease),
            "Use shorter sentences and plainer words",
        );
    } else if ease < 50.0 {
        card.flag(
            4.0,
            "content-hard-to-read",
            Severity::Low,
            format!("Flesch reading ease is {:.0} (difficult)", ease),
            "Break up long sentences to reach a reading ease of 50 or more",
        );
    }
}

fn check_structure(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;

    if document.word_count > SUBHEADING_WORDS && !document.has_heading_level(2) {
        card.flag(
            6.0,
            "content-no-subheadings",
            Severity::Medium,
            format!("{} words with no H2 sub-headings", document.word_count),
            "Split the content into sections with descriptive H2 headings",
        );
    }

    if document.word_count > DATED_CONTENT_WORDS && !has_schema_dates(document) {
        card.flag(
            3.0,
            "content-no-date",
            Severity::Low,
            "No datePublished or dateModified signal for long-form content",
            "Add datePublished and dateModified to the page's Article schema",
        );
    }
}

fn flag_weak_eeat(card: &mut Scorecard, eeat: f64, classified: bool) {
    // The blend already carries the cost; these findings make it visible
    if eeat < 40.0 {
        card.flag(
            0.0,
            "content-weak-eeat",
            Severity::High,
            format!("Weak E-E-A-T signals (score {:.0})", eeat),
            "Show first-hand experience, author credentials, sources and contact details",
        );
    } else if classified && eeat < 60.0 {
        card.flag(
            0.0,
            "content-moderate-eeat",
            Severity::Medium,
            format!("Moderate E-E-A-T signals (score {:.0})", eeat),
            "Strengthen author bios and cite authoritative sources",
        );
    }
}

fn flag_ai_risk(card: &mut Scorecard, risk: AiContentRisk) {
    match risk {
        AiContentRisk::High => card.flag(
            12.0,
            "content-ai-generated-risk",
            Severity::High,
            "Text reads as unedited AI-generated content",
            "Rewrite with original insight, specific examples and a clear human voice",
        ),
        AiContentRisk::Medium => card.flag(
            6.0,
            "content-ai-generated-risk",
            Severity::Medium,
            "Parts of the text read as generic AI-generated content",
            "Add first-hand detail and remove boilerplate phrasing",
        ),
        AiContentRisk::Low => {}
    }
}

fn describe(assessment: &EeatAssessment) -> String {
    format!(
        "experience {:.0}, expertise {:.0}, authoritativeness {:.0}, trustworthiness {:.0}; ai risk {}",
        assessment.experience.score,
        assessment.expertise.score,
        assessment.authoritativeness.score,
        assessment.trustworthiness.score,
        assessment.ai_content_risk
    )
}

/// Rule-based E-E-A-T estimate used when no classifier verdict is available
fn estimate_eeat(ctx: &AnalysisContext) -> f64 {
    let document = &ctx.document;
    let mut score = 20.0;

    if document.has_author_byline || has_schema_type(document, &["Person", "ProfilePage"]) {
        score += 10.0;
    }
    if has_schema_dates(document) {
        score += 10.0;
    }
    if document.external_links().count() >= 2 {
        score += 10.0;
    }
    if has_schema_type(document, &["Organization", "LocalBusiness"]) {
        score += 5.0;
    }
    if ctx.page.is_https() {
        score += 5.0;
    }
    if document.word_count >= ctx.config.thresholds.word_count.for_page_type(ctx.page_type) {
        score += 10.0;
    }
    let trust_pages = document.internal_links().any(|link| {
        let href = link.href.to_ascii_lowercase();
        href.contains("about") || href.contains("contact")
    });
    if trust_pages {
        score += 10.0;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;
    use crate::eeat::{DimensionScore, DisabledClassifier};

    struct FixedClassifier(EeatAssessment);

    #[async_trait]
    impl EeatClassifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn classify(
            &self,
            _request: &EeatRequest,
        ) -> Result<EeatAssessment, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    struct SlowClassifier;

    #[async_trait]
    impl EeatClassifier for SlowClassifier {
        fn name(&self) -> &str {
            "slow"
        }

        async fn classify(
            &self,
            _request: &EeatRequest,
        ) -> Result<EeatAssessment, ClassifierError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ClassifierError::Timeout)
        }
    }

    fn assessment(score: f64, risk: AiContentRisk) -> EeatAssessment {
        let dim = DimensionScore {
            score,
            signals: Vec::new(),
        };
        EeatAssessment {
            experience: dim.clone(),
            expertise: dim.clone(),
            authoritativeness: dim.clone(),
            trustworthiness: dim,
            overall_score: Some(score),
            summary: String::new(),
            ai_content_risk: risk,
        }
    }

    /// A well-structured 600-word page with plain sentences
    fn long_page() -> String {
        let sentence = "The dog ran to the park and back. ";
        let mut body = String::from("<html><body><h1>Guide</h1>");
        for section in 0..3 {
            body.push_str(&format!("<h2>Part {}</h2><p>", section));
            body.push_str(&sentence.repeat(26));
            body.push_str("</p>");
        }
        body.push_str(
            r#"<script type="application/ld+json">{"@context":"https://schema.org","@type":"Article","datePublished":"2025-01-01"}</script>"#,
        );
        body.push_str("</body></html>");
        body
    }

    async fn run(body: &str, classifier: Arc<dyn EeatClassifier>) -> CategoryResult {
        ContentAnalyzer::new(classifier)
            .analyze(&context(body))
            .await
            .unwrap()
    }

    fn eeat_sub(result: &CategoryResult) -> &SubScore {
        result.sub_scores.iter().find(|s| s.name == "eeat").unwrap()
    }

    #[tokio::test]
    async fn test_classified_page_blends_scores() {
        let result = run(
            &long_page(),
            Arc::new(FixedClassifier(assessment(90.0, AiContentRisk::Low))),
        )
        .await;
        assert!(result.is_ok());
        assert!(result.findings.is_empty(), "{:?}", rules(&result));
        // 100 * 0.7 + 90 * 0.3
        assert_eq!(result.score, 97);
        assert!(eeat_sub(&result).status.is_ok());
    }

    #[tokio::test]
    async fn test_fallback_when_classifier_unavailable() {
        let classified = run(
            &long_page(),
            Arc::new(FixedClassifier(assessment(90.0, AiContentRisk::Low))),
        )
        .await;
        let fallback = run(&long_page(), Arc::new(DisabledClassifier::new("off"))).await;

        assert!(fallback.is_ok());
        assert!(fallback.score < classified.score);
        let sub = eeat_sub(&fallback);
        assert!(sub.status.is_failed());
        assert!(sub.score <= 60.0);
    }

    #[tokio::test]
    async fn test_classifier_timeout_degrades() {
        let mut config = crate::config::AuditConfig::default();
        config.ai.timeout_secs = 1;
        let body = long_page();
        let ctx = context_with(page(PAGE_URL, &body, &[]), missing_auxiliary(), config);
        let result = ContentAnalyzer::new(Arc::new(SlowClassifier))
            .analyze(&ctx)
            .await
            .unwrap();
        assert!(result.is_ok());
        match &eeat_sub(&result).status {
            CategoryStatus::Failed { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected failed sub-score, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ai_risk_penalty() {
        let result = run(
            &long_page(),
            Arc::new(FixedClassifier(assessment(90.0, AiContentRisk::High))),
        )
        .await;
        assert_eq!(rules(&result), vec!["content-ai-generated-risk"]);
        assert_eq!(result.score, 85);
    }

    #[tokio::test]
    async fn test_thin_content() {
        let body = format!("<html><body><p>{}</p></body></html>", prose(50));
        let result = run(&body, Arc::new(DisabledClassifier::new("off"))).await;
        let found = rules(&result);
        assert!(found.contains(&"content-thin"));
        let thin = &result.findings[0];
        assert_eq!(thin.severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_short_content_is_graduated() {
        // 400 of the 500 words expected for an unspecified page
        let body = format!("<html><body><p>{}</p></body></html>", prose(400));
        let result = run(&body, Arc::new(DisabledClassifier::new("off"))).await;
        let short = result
            .findings
            .iter()
            .find(|f| f.rule == "content-short")
            .unwrap();
        assert_eq!(short.severity, Severity::High);
        let rules_sub = result.sub_scores.iter().find(|s| s.name == "rules").unwrap();
        // 6 + 10 * 0.2 = 8 points for the word count, 6 for missing H2s
        assert_eq!(rules_sub.score, 86.0);
    }

    #[tokio::test]
    async fn test_long_unstructured_content() {
        let body = format!("<html><body><p>{}</p></body></html>", prose(700));
        let result = run(&body, Arc::new(DisabledClassifier::new("off"))).await;
        let found = rules(&result);
        assert!(found.contains(&"content-no-subheadings"));
        assert!(found.contains(&"content-no-date"));
        assert!(!found.contains(&"content-short"));
    }
}
