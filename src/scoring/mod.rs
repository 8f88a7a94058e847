//! Score aggregation and priority ranking
//!
//! Combines the per-category results into the overall score, the
//! completeness ratio and the ranked list of fixes.

use crate::config::CategoryWeights;
use crate::report::{AuditCompleteness, Category, CategoryResult, Finding};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The aggregated part of an audit report
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub overall_score: f64,
    pub category_results: BTreeMap<Category, CategoryResult>,
    pub priority_fixes: Vec<Finding>,
    pub audit_completeness: AuditCompleteness,
}

/// Aggregates category results into a [`ScoreSummary`]
///
/// # Arguments
///
/// * `results` - One result per analyzed category, in any order
/// * `weights` - Configured category weights
/// * `max_fixes` - How many priority fixes to keep
pub fn aggregate(
    results: Vec<CategoryResult>,
    weights: &CategoryWeights,
    max_fixes: usize,
) -> ScoreSummary {
    let category_results: BTreeMap<Category, CategoryResult> = results
        .into_iter()
        .map(|result| (result.category_name, result))
        .collect();

    let successful = category_results.values().filter(|r| r.is_ok()).count();

    ScoreSummary {
        overall_score: overall_score(&category_results, weights),
        priority_fixes: priority_fixes(&category_results, weights, max_fixes),
        audit_completeness: AuditCompleteness::new(successful, category_results.len()),
        category_results,
    }
}

/// Weighted mean of the successful category scores
///
/// Failed categories are excluded and the remaining weights renormalized.
/// When every successful category has zero weight the plain mean is used;
/// with no successful category the score is 0.
pub fn overall_score(
    results: &BTreeMap<Category, CategoryResult>,
    weights: &CategoryWeights,
) -> f64 {
    let ok: Vec<(f64, f64)> = results
        .values()
        .filter(|r| r.is_ok())
        .map(|r| (r.score as f64, weights.get(r.category_name)))
        .collect();

    if ok.is_empty() {
        return 0.0;
    }

    let total_weight: f64 = ok.iter().map(|(_, w)| w).sum();
    let score = if total_weight > 0.0 {
        ok.iter().map(|(s, w)| s * w).sum::<f64>() / total_weight
    } else {
        ok.iter().map(|(s, _)| s).sum::<f64>() / ok.len() as f64
    };

    score.clamp(0.0, 100.0)
}

/// Ranks every finding and keeps the top `max_fixes`
///
/// # Ordering
///
/// 1. Severity (Critical first)
/// 2. Weight of the owning category, heaviest first
/// 3. Category declaration order
/// 4. Order within the category (stable)
pub fn priority_fixes(
    results: &BTreeMap<Category, CategoryResult>,
    weights: &CategoryWeights,
    max_fixes: usize,
) -> Vec<Finding> {
    let mut ranked: Vec<&Finding> = results.values().flat_map(|r| r.findings.iter()).collect();

    ranked.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| {
                weights
                    .get(b.category)
                    .partial_cmp(&weights.get(a.category))
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.category.cmp(&b.category))
    });

    ranked.into_iter().take(max_fixes).cloned().collect()
}
