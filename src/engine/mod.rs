//! Audit engine - single-page audit orchestration
//!
//! This module drives one audit end to end:
//! - Starting the auxiliary fetches (robots.txt, sitemap, llms.txt)
//! - Fetching and parsing the primary page
//! - Running every category analyzer concurrently over the parsed document
//! - Aggregating the results into an [`AuditReport`]
//!
//! The whole audit is bounded by the pipeline deadline. Analyzers still
//! running when it passes are aborted and reported as failed.

mod request;
mod stage;

pub use request::{AuditRequest, PageType};
pub use stage::AuditStage;

use crate::analyzers::{default_analyzers, AnalysisContext, Analyzer};
use crate::config::{compute_config_fingerprint, validate, AuditConfig};
use crate::eeat::{classifier_from_config, EeatClassifier};
use crate::fetcher::{
    build_http_client, fetch_auxiliary, fetch_page, AuxiliaryResources, FetchError, FetchOptions,
    FetchResult,
};
use crate::parser::parse_document;
use crate::report::{AuditReport, Category, CategoryResult};
use crate::scoring::aggregate;
use crate::url::{extract_domain, normalize_target_url};
use crate::{AuditError, Result};
use chrono::Utc;
use futures::FutureExt;
use reqwest::Client;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

/// Runs audits with one configuration
///
/// An `Auditor` is cheap to share: audits only read from it, so one
/// instance can serve many concurrent [`Auditor::audit`] calls.
pub struct Auditor {
    config: Arc<AuditConfig>,
    client: Client,
    analyzers: Vec<Arc<dyn Analyzer>>,
    fingerprint: String,
}

impl Auditor {
    /// Creates an auditor with the default analyzers
    ///
    /// The E-E-A-T classifier is chosen from the `[ai]` configuration; a
    /// missing API key degrades to the rule-based estimate.
    ///
    /// # Returns
    ///
    /// * `Ok(Auditor)` - Ready to audit
    /// * `Err(AuditError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: AuditConfig) -> Result<Self> {
        validate(&config)?;
        let api_client = Client::builder()
            .user_agent(config.fetcher.user_agent())
            .build()?;
        let classifier = classifier_from_config(&api_client, &config.ai);
        Self::with_classifier(config, classifier)
    }

    /// Creates an auditor with the default analyzers and a given classifier
    pub fn with_classifier(
        config: AuditConfig,
        classifier: Arc<dyn EeatClassifier>,
    ) -> Result<Self> {
        Self::with_analyzers(config, default_analyzers(classifier))
    }

    /// Creates an auditor running exactly the given analyzers
    pub fn with_analyzers(config: AuditConfig, analyzers: Vec<Arc<dyn Analyzer>>) -> Result<Self> {
        validate(&config)?;
        let client = build_http_client(&config.fetcher)?;
        let fingerprint = compute_config_fingerprint(&config)?;

        tracing::debug!(
            "Auditor ready: {} analyzers, config {}",
            analyzers.len(),
            &fingerprint[..12.min(fingerprint.len())]
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            analyzers,
            fingerprint,
        })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Hex SHA-256 of the effective configuration
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Audits one page
    ///
    /// # Pipeline
    ///
    /// 1. Normalize the target URL (`InvalidUrl` on failure)
    /// 2. Spawn the auxiliary fetches, then fetch the primary page
    ///    (`Transport` on failure; the auxiliary task is aborted)
    /// 3. Parse the page once (`Content` on failure)
    /// 4. Run every analyzer concurrently over the shared document
    /// 5. Aggregate (`NoCategoriesCompleted` if every analyzer failed)
    pub async fn audit(&self, request: &AuditRequest) -> Result<AuditReport> {
        let target = normalize_target_url(&request.url)?;
        let deadline = Instant::now() + Duration::from_secs(self.config.pipeline.timeout_secs);
        let mut stage = AuditStage::Fetching;

        tracing::info!("Auditing {}", target);

        let fetcher = &self.config.fetcher;
        let aux_options = FetchOptions {
            timeout: Duration::from_secs(fetcher.auxiliary_timeout_secs),
            max_redirects: fetcher.max_redirects,
        };
        let aux_client = self.client.clone();
        let aux_origin = target.clone();
        let mut aux_task = tokio::spawn(async move {
            fetch_auxiliary(&aux_client, &aux_origin, aux_options).await
        });

        let page_options = FetchOptions {
            timeout: Duration::from_secs(fetcher.timeout_secs),
            max_redirects: fetcher.max_redirects,
        };
        let page = match timeout_at(deadline, fetch_page(&self.client, &target, page_options)).await
        {
            Ok(page) => page,
            Err(_) => deadline_fetch_result(&target),
        };

        if let Err(err) = &page.status {
            aux_task.abort();
            let failed = stage.transition(AuditStage::FetchFailed)?;
            tracing::error!("Audit of {} stopped ({}): {}", target, failed, err);
            return Err(AuditError::Transport {
                url: target.to_string(),
                source: err.clone(),
            });
        }

        stage = stage.transition(AuditStage::Parsing)?;
        let document = match parse_document(&page) {
            Ok(document) => document,
            Err(err) => {
                aux_task.abort();
                let failed = stage.transition(AuditStage::ParseFailed)?;
                tracing::error!("Audit of {} stopped ({}): {}", target, failed, err);
                return Err(AuditError::Content {
                    url: page.final_url.to_string(),
                    source: err,
                });
            }
        };

        let auxiliary = match timeout_at(deadline, &mut aux_task).await {
            Ok(Ok(resources)) => resources,
            Ok(Err(join_err)) => {
                tracing::warn!("Auxiliary fetches for {} failed: {}", target, join_err);
                AuxiliaryResources::unavailable(FetchError::Other(join_err.to_string()))
            }
            Err(_) => {
                aux_task.abort();
                tracing::warn!("Auxiliary fetches for {} hit the audit deadline", target);
                AuxiliaryResources::unavailable(FetchError::Timeout)
            }
        };

        let page_type = request
            .page_type
            .unwrap_or_else(|| PageType::infer(&document.url, &document.schema_types()));
        let as_of = self
            .config
            .pipeline
            .reference_date
            .unwrap_or_else(|| Utc::now().date_naive());

        tracing::debug!(
            "{} parsed as {} page ({} words); rules as of {}",
            document.url,
            page_type,
            document.word_count,
            as_of
        );

        let context = AnalysisContext {
            document: Arc::new(document),
            page: Arc::new(page),
            auxiliary: Arc::new(auxiliary),
            config: Arc::clone(&self.config),
            page_type,
            as_of,
        };

        stage = stage.transition(AuditStage::Analyzing)?;
        let results = self.run_analyzers(&context, deadline).await;

        stage = stage.transition(AuditStage::Aggregating)?;
        let summary = aggregate(
            results.into_values().collect(),
            &self.config.weights,
            self.config.pipeline.max_priority_fixes,
        );

        if summary.audit_completeness.successful == 0 {
            tracing::error!("Audit of {}: no category analysis completed", target);
            return Err(AuditError::NoCategoriesCompleted {
                url: target.to_string(),
            });
        }

        let document = &context.document;
        let page = &context.page;
        let report = AuditReport {
            url: target.to_string(),
            final_url: page.final_url.to_string(),
            domain: extract_domain(&page.final_url).unwrap_or_default(),
            page_type,
            page_title: document.title.clone(),
            meta_description: document.meta_description.clone(),
            overall_score: summary.overall_score,
            category_results: summary.category_results,
            priority_fixes: summary.priority_fixes,
            audit_completeness: summary.audit_completeness,
            config_fingerprint: self.fingerprint.clone(),
            rules_version: self.config.schema.rules_version.clone(),
            generated_at: Utc::now(),
        };

        stage = stage.transition(AuditStage::Done)?;
        tracing::info!(
            "Audit of {} {}: overall {:.1}, {}/{} categories, {} findings",
            target,
            stage,
            report.overall_score,
            report.audit_completeness.successful,
            report.audit_completeness.total,
            report.finding_count()
        );

        Ok(report)
    }

    /// Runs every analyzer in its own task and gathers the results
    ///
    /// Errors and panics become `Failed` results. When the deadline passes,
    /// the remaining tasks are aborted and their categories marked `Failed`.
    async fn run_analyzers(
        &self,
        context: &AnalysisContext,
        deadline: Instant,
    ) -> BTreeMap<Category, CategoryResult> {
        let mut tasks = JoinSet::new();
        let mut pending = BTreeSet::new();

        for analyzer in &self.analyzers {
            let analyzer = Arc::clone(analyzer);
            let context = context.clone();
            let category = analyzer.category();
            pending.insert(category);

            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(analyzer.analyze(&context))
                    .catch_unwind()
                    .await;
                let result = match outcome {
                    Ok(Ok(result)) => Ok(result),
                    Ok(Err(err)) => Err(err.to_string()),
                    Err(panic) => Err(format!("analyzer panicked: {}", panic_reason(&*panic))),
                };
                (category, result)
            });
        }

        let mut results = BTreeMap::new();
        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((category, outcome)))) => {
                    pending.remove(&category);
                    let result = match outcome {
                        Ok(result) => {
                            tracing::debug!("{} scored {}", category, result.score);
                            result
                        }
                        Err(reason) => {
                            tracing::warn!("{} analysis failed: {}", category, reason);
                            CategoryResult::failed(
                                category,
                                self.config.weights.get(category),
                                reason,
                            )
                        }
                    };
                    results.insert(category, result);
                }
                Ok(Some(Err(join_err))) => {
                    tracing::warn!("Analyzer task ended abnormally: {}", join_err);
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        "Audit deadline passed with {} analyzers still running",
                        pending.len()
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        for category in pending {
            results.insert(
                category,
                CategoryResult::failed(
                    category,
                    self.config.weights.get(category),
                    "analysis did not complete before the audit deadline",
                ),
            );
        }

        results
    }
}

/// Result for a primary fetch cut off by the audit deadline
fn deadline_fetch_result(target: &url::Url) -> FetchResult {
    FetchResult {
        url: target.clone(),
        final_url: target.clone(),
        status: Err(FetchError::Timeout),
        body: String::new(),
        headers: BTreeMap::new(),
        redirect_chain: Vec::new(),
        elapsed: Duration::ZERO,
        fetched_at: Utc::now(),
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
