//! Integration tests for the audit pipeline
//!
//! These tests use wiremock to serve pages and site resources and run the
//! full fetch, parse, analyze and aggregate cycle end-to-end.

use async_trait::async_trait;
use seo_audit::analyzers::{AnalysisContext, Analyzer, AnalyzerError, TechnicalAnalyzer};
use seo_audit::config::{AiConfig, AuditConfig};
use seo_audit::eeat::{
    AiContentRisk, AnthropicClassifier, ClassifierError, DimensionScore, EeatAssessment,
    EeatClassifier, EeatRequest,
};
use seo_audit::report::{AuditReport, Category, CategoryResult, Severity};
use seo_audit::{AuditError, AuditRequest, Auditor, ErrorKind, FetchError, PageType};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_PATH: &str = "/guides/seo-basics";

/// Classifier returning the same verdict for every page
struct StubClassifier {
    score: f64,
}

#[async_trait]
impl EeatClassifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    async fn classify(&self, _request: &EeatRequest) -> Result<EeatAssessment, ClassifierError> {
        let dimension = DimensionScore {
            score: self.score,
            signals: vec!["named author".to_string()],
        };
        Ok(EeatAssessment {
            experience: dimension.clone(),
            expertise: dimension.clone(),
            authoritativeness: dimension.clone(),
            trustworthiness: dimension,
            overall_score: Some(self.score),
            summary: "Solid guide".to_string(),
            ai_content_risk: AiContentRisk::Low,
        })
    }
}

/// Classifier whose service is down
struct FailingClassifier;

#[async_trait]
impl EeatClassifier for FailingClassifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn classify(&self, _request: &EeatRequest) -> Result<EeatAssessment, ClassifierError> {
        Err(ClassifierError::Status {
            status: 503,
            body: "overloaded".to_string(),
        })
    }
}

struct PanickingAnalyzer;

#[async_trait]
impl Analyzer for PanickingAnalyzer {
    fn category(&self) -> Category {
        Category::Images
    }

    async fn analyze(&self, _ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        panic!("image decoder exploded");
    }
}

struct FailingAnalyzer(Category);

#[async_trait]
impl Analyzer for FailingAnalyzer {
    fn category(&self) -> Category {
        self.0
    }

    async fn analyze(&self, _ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        Err(AnalyzerError::Failed("rule data unavailable".to_string()))
    }
}

struct SlowAnalyzer;

#[async_trait]
impl Analyzer for SlowAnalyzer {
    fn category(&self) -> Category {
        Category::Performance
    }

    async fn analyze(&self, _ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(AnalyzerError::Failed("unreachable".to_string()))
    }
}

/// Creates a test configuration with short timeouts and a fixed rule date
fn create_test_config() -> AuditConfig {
    let mut config = AuditConfig::default();
    config.fetcher.agent_name = "TestAuditor".to_string();
    config.fetcher.timeout_secs = 5;
    config.fetcher.auxiliary_timeout_secs = 2;
    config.pipeline.timeout_secs = 20;
    config.pipeline.reference_date = chrono::NaiveDate::from_ymd_opt(2026, 1, 1);
    config
}

/// Short sentences of common words, ten words each
fn prose(words: usize) -> String {
    const WORDS: &[&str] = &[
        "the", "team", "will", "help", "you", "find", "the", "best", "plan", "now",
    ];
    let mut text = String::new();
    for i in 0..words {
        if i > 0 {
            text.push(' ');
        }
        text.push_str(WORDS[i % WORDS.len()]);
        if (i + 1) % WORDS.len() == 0 {
            text.push('.');
        }
    }
    text
}

/// A long-form guide that follows every rule the analyzers check
fn rich_page(base_url: &str) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<title>SEO Basics: A Practical Guide for Beginners</title>
<meta name="description" content="Learn how search engines crawl, index and rank pages, and which technical, content and on-page fixes matter most when you are starting out.">
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="canonical" href="{base}{page}">
<meta property="og:title" content="SEO Basics">
<meta property="og:description" content="A practical guide for beginners">
<meta property="og:image" content="{base}/img/og.webp">
<meta name="twitter:card" content="summary_large_image">
<script type="application/ld+json">{{"@context":"https://schema.org","@graph":[
  {{"@type":"Organization","name":"Example","url":"{base}/","sameAs":["https://www.linkedin.com/company/example"]}},
  {{"@type":"WebSite","name":"Example","url":"{base}/"}},
  {{"@type":"BreadcrumbList","itemListElement":[{{"@type":"ListItem","position":1,"name":"Guides","item":"{base}/guides"}}]}},
  {{"@type":"Article","headline":"SEO basics","datePublished":"2025-06-01","dateModified":"2025-09-01","author":{{"@type":"Person","name":"Jane Doe"}}}}
]}}</script>
</head>
<body>
<h1>SEO Basics</h1>
<p class="byline">By Jane Doe</p>
<img src="/img/hero.webp" alt="Search results page with annotated ranking factors" width="1200" height="630" fetchpriority="high">
<p>SEO is the practice of earning search traffic. About 68% of online experiences begin with a search.</p>
<h2>What is a citable passage?</h2>
<ul><li>Answer one question</li><li>Stay under two hundred words</li></ul>
<iframe src="https://www.youtube.com/embed/abc123" width="560" height="315"></iframe>
<p>Read the <a href="/guides/keyword-research">keyword research guide</a>, the
<a href="/guides/link-building">link building guide</a> and
<a href="/about">who writes these guides</a>.</p>
<p>Sources: <a href="https://developers.google.com/search">Google Search Central</a> and
<a href="https://www.w3.org/">the W3C</a>.</p>
<h2>How do search engines rank pages?</h2>
"#,
        base = base_url,
        page = PAGE_PATH
    );
    for _ in 0..22 {
        html.push_str(&format!("<p>{}</p>\n", prose(90)));
    }
    html.push_str("</body></html>");
    html
}

/// Mounts the rich page with hardened headers and every site resource
async fn mount_rich_site(server: &MockServer) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-security-policy", "default-src 'self'")
                .insert_header("strict-transport-security", "max-age=63072000")
                .insert_header("x-frame-options", "DENY")
                .insert_header("x-content-type-options", "nosniff")
                .insert_header("referrer-policy", "strict-origin-when-cross-origin")
                .insert_header("x-cache", "HIT")
                .set_body_raw(rich_page(&base), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n", base),
            "text/plain",
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>{}{}</loc></url></urlset>"#,
                base, PAGE_PATH
            ),
            "application/xml",
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/llms.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("# Example\n> Guides to search optimization\n", "text/plain"),
        )
        .mount(server)
        .await;
}

fn stub_auditor(config: AuditConfig, score: f64) -> Auditor {
    Auditor::with_classifier(config, Arc::new(StubClassifier { score }))
        .expect("Failed to create auditor")
}

fn rules(report: &AuditReport, category: Category) -> Vec<String> {
    report.category_results[&category]
        .findings
        .iter()
        .map(|f| f.rule.clone())
        .collect()
}

#[tokio::test]
async fn test_bare_page_reports_missing_title_and_meta() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body><p>Hello there</p></body></html>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let auditor = stub_auditor(create_test_config(), 70.0);
    let report = auditor
        .audit(&AuditRequest::new(format!("{}/", mock_server.uri())))
        .await
        .expect("Audit should succeed");

    assert_eq!(report.audit_completeness.successful, 7);
    assert!(report.audit_completeness.is_complete());
    assert_eq!(report.page_type, PageType::Homepage);
    assert_eq!(report.page_title, None);

    let technical = rules(&report, Category::Technical);
    for rule in [
        "tech-missing-title",
        "tech-missing-meta-description",
        "tech-no-https",
        "tech-missing-robots-txt",
        "tech-missing-sitemap",
    ] {
        assert!(technical.iter().any(|r| r == rule), "missing {}", rule);
    }

    let title = report
        .findings()
        .find(|f| f.rule == "tech-missing-title")
        .expect("Missing-title finding");
    assert_eq!(title.severity, Severity::Critical);

    // Critical findings lead the priority list
    assert!(!report.priority_fixes.is_empty());
    assert_eq!(report.priority_fixes[0].severity, Severity::Critical);
    assert!(report.priority_fixes.len() <= 10);
    assert!(report.overall_score < 70.0);
}

#[tokio::test]
async fn test_rich_page_scores_high_in_every_category() {
    let mock_server = MockServer::start().await;
    mount_rich_site(&mock_server).await;

    let auditor = stub_auditor(create_test_config(), 90.0);
    let report = auditor
        .audit(&AuditRequest::new(format!("{}{}", mock_server.uri(), PAGE_PATH)))
        .await
        .expect("Audit should succeed");

    assert!(report.audit_completeness.is_complete());
    assert_eq!(report.page_type, PageType::Blog);
    assert_eq!(
        report.page_title.as_deref(),
        Some("SEO Basics: A Practical Guide for Beginners")
    );
    assert_eq!(report.domain, "127.0.0.1");

    for (category, result) in &report.category_results {
        assert!(result.is_ok(), "{} failed", category);
        assert!(
            result.score > 80,
            "{} scored {}: {:?}",
            category,
            result.score,
            rules(&report, *category)
        );
    }

    // Plain HTTP is the only thing the mock server cannot fix
    assert_eq!(rules(&report, Category::Technical), vec!["tech-no-https"]);
    assert_eq!(report.category_results[&Category::Geo].score, 100);

    let geo = &report.category_results[&Category::Geo];
    let area_total: f64 = geo.sub_scores.iter().map(|s| s.score).sum();
    assert_eq!(area_total, geo.score as f64);

    assert!(report.overall_score > 90.0, "overall {}", report.overall_score);
    assert_eq!(report.config_fingerprint, auditor.fingerprint());
}

#[tokio::test]
async fn test_slow_page_is_a_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>late</body></html>", "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.fetcher.timeout_secs = 1;
    config.fetcher.auxiliary_timeout_secs = 1;

    let auditor = stub_auditor(config, 70.0);
    let err = auditor
        .audit(&AuditRequest::new(format!("{}/slow", mock_server.uri())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportError);
    assert!(err.to_string().contains("timed out"), "{}", err);
}

#[tokio::test]
async fn test_classifier_failure_degrades_content_only() {
    let mock_server = MockServer::start().await;
    mount_rich_site(&mock_server).await;
    let url = format!("{}{}", mock_server.uri(), PAGE_PATH);

    let classified = stub_auditor(create_test_config(), 90.0)
        .audit(&AuditRequest::new(url.clone()))
        .await
        .expect("Audit should succeed");

    let degraded = Auditor::with_classifier(create_test_config(), Arc::new(FailingClassifier))
        .expect("Failed to create auditor")
        .audit(&AuditRequest::new(url))
        .await
        .expect("Audit should succeed");

    let content = &degraded.category_results[&Category::Content];
    assert!(content.is_ok());
    assert!(content.score < classified.category_results[&Category::Content].score);

    let eeat = content
        .sub_scores
        .iter()
        .find(|s| s.name == "eeat")
        .expect("E-E-A-T sub-score");
    assert!(eeat.status.is_failed());
    assert!(eeat.score <= 60.0);

    // Every other category is unaffected
    for category in Category::ALL {
        if category != Category::Content {
            assert_eq!(
                degraded.category_results[&category].score,
                classified.category_results[&category].score
            );
        }
    }
}

#[tokio::test]
async fn test_repeated_audits_are_identical() {
    let mock_server = MockServer::start().await;
    mount_rich_site(&mock_server).await;
    let request = AuditRequest::new(format!("{}{}", mock_server.uri(), PAGE_PATH));

    let auditor = stub_auditor(create_test_config(), 85.0);
    let first = auditor.audit(&request).await.expect("First audit");
    let mut second = auditor.audit(&request).await.expect("Second audit");

    second.generated_at = first.generated_at;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_page_type_hint_overrides_inference() {
    let mock_server = MockServer::start().await;
    mount_rich_site(&mock_server).await;

    let auditor = stub_auditor(create_test_config(), 90.0);
    let report = auditor
        .audit(
            &AuditRequest::new(format!("{}{}", mock_server.uri(), PAGE_PATH))
                .with_page_type(PageType::Service),
        )
        .await
        .expect("Audit should succeed");

    assert_eq!(report.page_type, PageType::Service);
}

#[tokio::test]
async fn test_redirect_chain_is_followed_and_reported() {
    let mock_server = MockServer::start().await;
    mount_rich_site(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/older"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/older"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", PAGE_PATH))
        .mount(&mock_server)
        .await;

    let auditor = stub_auditor(create_test_config(), 90.0);
    let report = auditor
        .audit(&AuditRequest::new(format!("{}/old", mock_server.uri())))
        .await
        .expect("Audit should succeed");

    assert!(report.url.ends_with("/old"));
    assert!(report.final_url.ends_with(PAGE_PATH));

    let chain = report
        .findings()
        .find(|f| f.rule == "tech-redirect-chain")
        .expect("Redirect chain finding");
    assert_eq!(chain.severity, Severity::Medium);
}

#[tokio::test]
async fn test_redirect_loop_is_a_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/b"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/a"))
        .mount(&mock_server)
        .await;

    let auditor = stub_auditor(create_test_config(), 70.0);
    let err = auditor
        .audit(&AuditRequest::new(format!("{}/a", mock_server.uri())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportError);
    assert!(
        matches!(
            err,
            AuditError::Transport {
                source: FetchError::TooManyRedirects { hops: 2 },
                ..
            }
        ),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_redirects_beyond_limit_are_a_transport_error() {
    let mock_server = MockServer::start().await;
    mount_rich_site(&mock_server).await;

    for (from, to) in [("/r1", "/r2"), ("/r2", "/r3"), ("/r3", PAGE_PATH)] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(301).insert_header("location", to))
            .mount(&mock_server)
            .await;
    }

    let mut config = create_test_config();
    config.fetcher.max_redirects = 2;
    let auditor = stub_auditor(config, 70.0);
    let err = auditor
        .audit(&AuditRequest::new(format!("{}/r1", mock_server.uri())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportError);
    assert!(
        matches!(
            err,
            AuditError::Transport {
                source: FetchError::TooManyRedirects { hops: 3 },
                ..
            }
        ),
        "{:?}",
        err
    );

    // The same chain fits within a limit of three hops
    let mut config = create_test_config();
    config.fetcher.max_redirects = 3;
    let report = stub_auditor(config, 70.0)
        .audit(&AuditRequest::new(format!("{}/r1", mock_server.uri())))
        .await
        .expect("Audit should succeed");
    assert!(report.final_url.ends_with(PAGE_PATH));
}

#[tokio::test]
async fn test_not_found_page_is_a_transport_error() {
    let mock_server = MockServer::start().await;

    let auditor = stub_auditor(create_test_config(), 70.0);
    let err = auditor
        .audit(&AuditRequest::new(format!("{}/missing", mock_server.uri())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportError);
    assert!(err.to_string().contains("404"), "{}", err);
}

#[tokio::test]
async fn test_non_html_response_is_a_content_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "application/json"))
        .mount(&mock_server)
        .await;

    let auditor = stub_auditor(create_test_config(), 70.0);
    let err = auditor
        .audit(&AuditRequest::new(format!("{}/data", mock_server.uri())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ContentError);
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind and release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let auditor = stub_auditor(create_test_config(), 70.0);
    let err = auditor
        .audit(&AuditRequest::new(format!("http://127.0.0.1:{}/", port)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportError);
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_fetching() {
    let auditor = stub_auditor(create_test_config(), 70.0);
    let err = auditor
        .audit(&AuditRequest::new("mailto:someone@example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_failed_and_panicking_analyzers_are_isolated() {
    let mock_server = MockServer::start().await;
    mount_rich_site(&mock_server).await;

    let analyzers: Vec<Arc<dyn Analyzer>> = vec![
        Arc::new(TechnicalAnalyzer),
        Arc::new(FailingAnalyzer(Category::Schema)),
        Arc::new(PanickingAnalyzer),
    ];
    let auditor =
        Auditor::with_analyzers(create_test_config(), analyzers).expect("Failed to create auditor");

    let report = auditor
        .audit(&AuditRequest::new(format!("{}{}", mock_server.uri(), PAGE_PATH)))
        .await
        .expect("Audit should succeed");

    assert_eq!(report.audit_completeness.successful, 1);
    assert_eq!(report.audit_completeness.total, 3);
    assert!(!report.audit_completeness.is_complete());

    let schema = &report.category_results[&Category::Schema];
    assert!(!schema.is_ok());
    assert_eq!(schema.score, 0);

    let images = &report.category_results[&Category::Images];
    assert!(!images.is_ok());

    // Only the surviving category counts toward the overall score
    let technical = &report.category_results[&Category::Technical];
    assert!(technical.is_ok());
    assert_eq!(report.overall_score, technical.score as f64);
}

#[tokio::test]
async fn test_all_analyzers_failing_is_an_analysis_error() {
    let mock_server = MockServer::start().await;
    mount_rich_site(&mock_server).await;

    let analyzers: Vec<Arc<dyn Analyzer>> = vec![
        Arc::new(FailingAnalyzer(Category::Technical)),
        Arc::new(FailingAnalyzer(Category::Content)),
    ];
    let auditor =
        Auditor::with_analyzers(create_test_config(), analyzers).expect("Failed to create auditor");

    let err = auditor
        .audit(&AuditRequest::new(format!("{}{}", mock_server.uri(), PAGE_PATH)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AnalysisError);
}

#[tokio::test]
async fn test_pipeline_deadline_fails_slow_analyzers() {
    let mock_server = MockServer::start().await;
    mount_rich_site(&mock_server).await;

    let mut config = create_test_config();
    config.pipeline.timeout_secs = 2;

    let analyzers: Vec<Arc<dyn Analyzer>> =
        vec![Arc::new(TechnicalAnalyzer), Arc::new(SlowAnalyzer)];
    let auditor = Auditor::with_analyzers(config, analyzers).expect("Failed to create auditor");

    let report = auditor
        .audit(&AuditRequest::new(format!("{}{}", mock_server.uri(), PAGE_PATH)))
        .await
        .expect("Audit should succeed");

    assert!(report.category_results[&Category::Technical].is_ok());
    let performance = &report.category_results[&Category::Performance];
    assert!(!performance.is_ok());
    assert_eq!(report.audit_completeness.successful, 1);
}

#[tokio::test]
async fn test_anthropic_classifier_request_and_reply() {
    let mock_server = MockServer::start().await;

    let assessment = r#"{"experience":{"score":70,"signals":["first-hand photos"]},
        "expertise":{"score":80},"authoritativeness":{"score":60},
        "trustworthiness":{"score":90},"overallScore":76,"summary":"Good",
        "aiContentRisk":"medium"}"#;
    let reply = serde_json::json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": format!("```json\n{}\n```", assessment)}]
    });

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = AiConfig {
        endpoint: format!("{}/v1/messages", mock_server.uri()),
        ..AiConfig::default()
    };
    let classifier = AnthropicClassifier::new(reqwest::Client::new(), &config, "test-key");

    let result = classifier
        .classify(&EeatRequest {
            url: "https://example.com/guide".to_string(),
            title: Some("Guide".to_string()),
            text: prose(200),
        })
        .await
        .expect("Classification should succeed");

    assert_eq!(result.trustworthiness.score, 90.0);
    assert_eq!(result.ai_content_risk, AiContentRisk::Medium);
    assert_eq!(result.experience.signals, vec!["first-hand photos".to_string()]);
}

#[tokio::test]
async fn test_anthropic_classifier_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let config = AiConfig {
        endpoint: format!("{}/v1/messages", mock_server.uri()),
        ..AiConfig::default()
    };
    let classifier = AnthropicClassifier::new(reqwest::Client::new(), &config, "test-key");

    let err = classifier
        .classify(&EeatRequest {
            url: "https://example.com/guide".to_string(),
            title: None,
            text: prose(200),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClassifierError::Status {
            status: 503,
            body: "overloaded".to_string()
        }
    );
}
