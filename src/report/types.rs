use crate::engine::PageType;
use crate::{AuditError, ErrorKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the seven scored audit categories
///
/// The declaration order is the canonical order used for ties when ranking
/// priority fixes and for iteration over category maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Technical,
    Content,
    OnPage,
    Geo,
    Schema,
    Performance,
    Images,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 7] = [
        Category::Technical,
        Category::Content,
        Category::OnPage,
        Category::Geo,
        Category::Schema,
        Category::Performance,
        Category::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Content => "content",
            Self::OnPage => "on-page",
            Self::Geo => "geo",
            Self::Schema => "schema",
            Self::Performance => "performance",
            Self::Images => "images",
        }
    }

    /// Human-readable label used in rendered reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Technical => "Technical SEO",
            Self::Content => "Content Quality",
            Self::OnPage => "On-Page SEO",
            Self::Geo => "AI Search (GEO)",
            Self::Schema => "Schema & Structured Data",
            Self::Performance => "Performance",
            Self::Images => "Image Optimization",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a finding
///
/// Ordering follows urgency: `Critical < High < Medium < Low`, so an
/// ascending sort puts the most urgent findings first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violated rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,

    /// Stable identifier of the rule that produced this finding
    pub rule: String,

    pub severity: Severity,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_element: Option<String>,

    pub recommendation: String,
}

impl Finding {
    pub fn new(
        category: Category,
        rule: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            category,
            rule: rule.into(),
            severity,
            message: message.into(),
            affected_element: None,
            recommendation: recommendation.into(),
        }
    }

    /// Attaches the offending element (a URL, tag or header name)
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.affected_element = Some(element.into());
        self
    }
}

/// Completion status of a category or sub-score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CategoryStatus {
    Ok,
    Failed { reason: String },
}

impl CategoryStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A named part of a category score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    pub status: CategoryStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SubScore {
    pub fn ok(name: impl Into<String>, score: f64, max_score: f64) -> Self {
        Self {
            name: name.into(),
            score,
            max_score,
            status: CategoryStatus::Ok,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_status(mut self, status: CategoryStatus) -> Self {
        self.status = status;
        self
    }
}

/// Outcome of one category analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category_name: Category,

    /// Category score in 0..=100; zero for a failed category
    pub score: u8,

    /// Configured weight (percent) of the category
    pub weight: f64,

    pub findings: Vec<Finding>,
    pub status: CategoryStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_scores: Vec<SubScore>,
}

impl CategoryResult {
    /// Builds the result reported for an analyzer that errored, panicked or
    /// ran past the deadline
    pub fn failed(category: Category, weight: f64, reason: impl Into<String>) -> Self {
        Self {
            category_name: category,
            score: 0,
            weight,
            findings: Vec::new(),
            status: CategoryStatus::Failed {
                reason: reason.into(),
            },
            sub_scores: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// How many categories contributed to the overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditCompleteness {
    pub successful: usize,
    pub total: usize,
    pub ratio: f64,
}

impl AuditCompleteness {
    pub fn new(successful: usize, total: usize) -> Self {
        let ratio = if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64
        };
        Self {
            successful,
            total,
            ratio,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.successful == self.total
    }
}

/// Complete result of auditing one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// The URL the audit was requested for (after normalization)
    pub url: String,

    /// The URL the page was finally served from, after redirects
    pub final_url: String,

    pub domain: String,
    pub page_type: PageType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,

    /// Weighted score over the categories that completed, in 0..=100
    pub overall_score: f64,

    pub category_results: BTreeMap<Category, CategoryResult>,
    pub priority_fixes: Vec<Finding>,
    pub audit_completeness: AuditCompleteness,

    /// SHA-256 of the effective configuration
    pub config_fingerprint: String,
    pub rules_version: String,

    pub generated_at: DateTime<Utc>,
}

impl AuditReport {
    /// Total number of findings across all categories
    pub fn finding_count(&self) -> usize {
        self.category_results
            .values()
            .map(|r| r.findings.len())
            .sum()
    }

    /// Iterates all findings in category order
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.category_results.values().flat_map(|r| r.findings.iter())
    }
}

/// Error envelope returned to the caller instead of a report
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                kind,
                message: message.into(),
            },
        }
    }
}

impl From<&AuditError> for ErrorResponse {
    fn from(err: &AuditError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}
