//! Category analyzers
//!
//! Each analyzer reads the shared, immutable [`AnalysisContext`] and turns it
//! into one [`CategoryResult`]. Analyzers never see each other's output, so
//! the engine runs them concurrently and a failure in one leaves the others
//! untouched.

mod content;
mod geo;
mod images;
mod onpage;
mod performance;
mod schema;
mod scorecard;
mod technical;

pub use content::ContentAnalyzer;
pub use geo::GeoAnalyzer;
pub use images::ImageAnalyzer;
pub use onpage::OnPageAnalyzer;
pub use performance::PerformanceAnalyzer;
pub use schema::SchemaAnalyzer;
pub use scorecard::{graduated, Scorecard};
pub use technical::TechnicalAnalyzer;

use crate::config::AuditConfig;
use crate::eeat::EeatClassifier;
use crate::engine::PageType;
use crate::fetcher::{AuxiliaryResources, FetchResult};
use crate::parser::{Heading, ParsedDocument};
use crate::report::{Category, CategoryResult};
use crate::robots::{robots_from_fetch, ParsedRobots};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// An analyzer could not produce a result for its category
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("{0}")]
    Failed(String),
}

/// Everything an analyzer may read
///
/// Cloning is cheap; every field is shared.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub document: Arc<ParsedDocument>,
    pub page: Arc<FetchResult>,
    pub auxiliary: Arc<AuxiliaryResources>,
    pub config: Arc<AuditConfig>,
    pub page_type: PageType,

    /// Date used for effective-dated schema rules
    pub as_of: NaiveDate,
}

impl AnalysisContext {
    /// Configured weight of a category
    pub fn weight(&self, category: Category) -> f64 {
        self.config.weights.get(category)
    }

    /// Scheme, host and port of the audited page
    pub fn origin(&self) -> String {
        crate::url::origin_of(&self.document.url)
    }

    pub fn robots(&self) -> ParsedRobots {
        robots_from_fetch(&self.auxiliary.robots_txt)
    }
}

/// Turns an [`AnalysisContext`] into the result for one category
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn category(&self) -> Category;

    async fn analyze(&self, context: &AnalysisContext) -> Result<CategoryResult, AnalyzerError>;
}

/// The seven analyzers, in report order
pub fn default_analyzers(classifier: Arc<dyn EeatClassifier>) -> Vec<Arc<dyn Analyzer>> {
    vec![
        Arc::new(TechnicalAnalyzer),
        Arc::new(ContentAnalyzer::new(classifier)),
        Arc::new(OnPageAnalyzer),
        Arc::new(GeoAnalyzer),
        Arc::new(SchemaAnalyzer),
        Arc::new(PerformanceAnalyzer),
        Arc::new(ImageAnalyzer),
    ]
}

/// First place the heading outline jumps down more than one level
///
/// Returns the heading before the jump and the heading after it.
pub(crate) fn first_heading_skip(headings: &[Heading]) -> Option<(&Heading, &Heading)> {
    headings
        .windows(2)
        .find(|pair| pair[1].level > pair[0].level + 1)
        .map(|pair| (&pair[0], &pair[1]))
}

/// True if any JSON-LD object carries a publication or modification date
pub(crate) fn has_schema_dates(document: &ParsedDocument) -> bool {
    document.any_schema_object(&|node| {
        node.contains_key("datePublished") || node.contains_key("dateModified")
    })
}

/// True if any JSON-LD object has one of the given `@type`s
pub(crate) fn has_schema_type(document: &ParsedDocument, types: &[&str]) -> bool {
    document.any_schema_object(&|node| {
        crate::parser::node_types(node)
            .iter()
            .any(|t| types.contains(t))
    })
}
