//! E-E-A-T classification
//!
//! Experience, Expertise, Authoritativeness and Trustworthiness cannot be
//! judged from markup alone, so the Content analyzer asks an external model.
//! The [`EeatClassifier`] trait is the seam: the engine holds an
//! `Arc<dyn EeatClassifier>` and tests substitute their own.

mod anthropic;
mod prompt;

pub use anthropic::AnthropicClassifier;
pub use prompt::{build_prompt, extract_json, parse_assessment, truncate_words};

use crate::config::{AiConfig, EeatWeights};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from an E-E-A-T classification attempt
///
/// None of these abort an audit; the Content analyzer falls back to a
/// rule-based estimate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("classifier disabled: {0}")]
    Disabled(String),

    #[error("page text too short to classify ({chars} characters)")]
    InsufficientText { chars: usize },

    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),

    #[error("classifier request timed out")]
    Timeout,

    #[error("classifier request failed: {0}")]
    Transport(String),

    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("classifier response was not a valid assessment: {0}")]
    InvalidResponse(String),
}

/// The text handed to a classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EeatRequest {
    pub url: String,
    pub title: Option<String>,

    /// Visible page text, already truncated to the configured word limit
    pub text: String,
}

/// Score and evidence for one E-E-A-T dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: f64,
    #[serde(default)]
    pub signals: Vec<String>,
}

/// Likelihood that the page is unedited machine-generated text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiContentRisk {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for AiContentRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// A classifier's verdict, in the JSON shape the prompt asks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EeatAssessment {
    pub experience: DimensionScore,
    pub expertise: DimensionScore,
    pub authoritativeness: DimensionScore,
    pub trustworthiness: DimensionScore,

    /// The model's own overall figure; informational only
    #[serde(default)]
    pub overall_score: Option<f64>,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub ai_content_risk: AiContentRisk,
}

impl EeatAssessment {
    /// Combines the four dimensions with the configured weights
    ///
    /// Dimension scores are clamped to 0..=100 first, so the result is too.
    pub fn weighted_score(&self, weights: &EeatWeights) -> f64 {
        let total = weights.total();
        if total <= 0.0 {
            return 0.0;
        }
        let weighted = clamp_score(self.experience.score) * weights.experience
            + clamp_score(self.expertise.score) * weights.expertise
            + clamp_score(self.authoritativeness.score) * weights.authoritativeness
            + clamp_score(self.trustworthiness.score) * weights.trustworthiness;
        weighted / total
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Judges the E-E-A-T qualities of a page's text
#[async_trait]
pub trait EeatClassifier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn classify(&self, request: &EeatRequest) -> Result<EeatAssessment, ClassifierError>;
}

/// A classifier that always declines, used when no model is configured
#[derive(Debug, Clone)]
pub struct DisabledClassifier {
    reason: String,
}

impl DisabledClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl EeatClassifier for DisabledClassifier {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn classify(&self, _request: &EeatRequest) -> Result<EeatAssessment, ClassifierError> {
        Err(ClassifierError::Disabled(self.reason.clone()))
    }
}

/// Picks the classifier for a configuration
///
/// Falls back to [`DisabledClassifier`] when AI is switched off or the API
/// key is missing from the environment.
pub fn classifier_from_config(
    client: &reqwest::Client,
    config: &AiConfig,
) -> Arc<dyn EeatClassifier> {
    if !config.enabled {
        info!("E-E-A-T classification disabled; using rule-based estimate");
        return Arc::new(DisabledClassifier::new("disabled in configuration"));
    }

    match AnthropicClassifier::from_env(client.clone(), config) {
        Ok(classifier) => {
            info!("E-E-A-T classification via {} ({})", classifier.name(), config.model);
            Arc::new(classifier)
        }
        Err(e) => {
            warn!("{}; using rule-based E-E-A-T estimate", e);
            Arc::new(DisabledClassifier::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dimension(score: f64) -> DimensionScore {
        DimensionScore {
            score,
            signals: Vec::new(),
        }
    }

    fn assessment(scores: [f64; 4]) -> EeatAssessment {
        EeatAssessment {
            experience: dimension(scores[0]),
            expertise: dimension(scores[1]),
            authoritativeness: dimension(scores[2]),
            trustworthiness: dimension(scores[3]),
            overall_score: None,
            summary: String::new(),
            ai_content_risk: AiContentRisk::Low,
        }
    }

    #[test]
    fn test_weighted_score_uses_weights() {
        let weights = EeatWeights::default();
        let a = assessment([100.0, 0.0, 0.0, 0.0]);
        assert!((a.weighted_score(&weights) - 20.0).abs() < 1e-9);

        let a = assessment([0.0, 0.0, 0.0, 100.0]);
        assert!((a.weighted_score(&weights) - 30.0).abs() < 1e-9);

        let a = assessment([80.0, 80.0, 80.0, 80.0]);
        assert!((a.weighted_score(&weights) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_dimensions_are_clamped() {
        let a = assessment([150.0, -20.0, f64::NAN, 100.0]);
        let score = a.weighted_score(&EeatWeights::default());
        assert!((0.0..=100.0).contains(&score));
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_ai_risk_defaults_to_low() {
        let json = r#"{
            "experience": {"score": 50},
            "expertise": {"score": 50, "signals": ["cites sources"]},
            "authoritativeness": {"score": 50},
            "trustworthiness": {"score": 50}
        }"#;
        let a: EeatAssessment = serde_json::from_str(json).unwrap();
        assert_eq!(a.ai_content_risk, AiContentRisk::Low);
        assert_eq!(a.expertise.signals, vec!["cites sources".to_string()]);
    }

    #[tokio::test]
    async fn test_disabled_classifier_declines() {
        let classifier = DisabledClassifier::new("no key");
        let request = EeatRequest {
            url: "https://example.com/".to_string(),
            title: None,
            text: "text".to_string(),
        };
        let err = classifier.classify(&request).await.unwrap_err();
        assert_eq!(err, ClassifierError::Disabled("no key".to_string()));
    }

    #[test]
    fn test_disabled_config_selects_disabled_classifier() {
        let config = AiConfig {
            enabled: false,
            ..AiConfig::default()
        };
        let classifier = classifier_from_config(&reqwest::Client::new(), &config);
        assert_eq!(classifier.name(), "disabled");
    }
}
