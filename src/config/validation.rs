use crate::config::types::{
    AiConfig, AuditConfig, CategoryWeights, FetcherConfig, PipelineConfig, SchemaRules, Thresholds,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Tolerance used when checking that percentages add up to 100
const WEIGHT_EPSILON: f64 = 1e-6;

/// Validates the entire configuration
pub fn validate(config: &AuditConfig) -> Result<(), ConfigError> {
    validate_weights(&config.weights)?;
    validate_thresholds(&config.thresholds)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_ai_config(&config.ai)?;
    validate_schema_rules(&config.schema)?;
    validate_pipeline_config(&config.pipeline)?;
    Ok(())
}

/// Category weights must be non-negative and sum to exactly 100
fn validate_weights(weights: &CategoryWeights) -> Result<(), ConfigError> {
    for category in crate::report::Category::ALL {
        let weight = weights.get(category);
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::Validation(format!(
                "weight for {} must be a non-negative number, got {}",
                category, weight
            )));
        }
    }

    let total = weights.total();
    if (total - 100.0).abs() > WEIGHT_EPSILON {
        return Err(ConfigError::Validation(format!(
            "category weights must sum to 100, got {}",
            total
        )));
    }

    Ok(())
}

fn validate_thresholds(thresholds: &Thresholds) -> Result<(), ConfigError> {
    if thresholds.title_min == 0 || thresholds.title_min > thresholds.title_max {
        return Err(ConfigError::Validation(format!(
            "title bounds must satisfy 0 < min <= max, got {}..{}",
            thresholds.title_min, thresholds.title_max
        )));
    }

    if thresholds.meta_description_min == 0
        || thresholds.meta_description_min > thresholds.meta_description_max
    {
        return Err(ConfigError::Validation(format!(
            "meta description bounds must satisfy 0 < min <= max, got {}..{}",
            thresholds.meta_description_min, thresholds.meta_description_max
        )));
    }

    let wc = &thresholds.word_count;
    if [wc.homepage, wc.blog, wc.service, wc.product, wc.other]
        .iter()
        .any(|&n| n == 0)
    {
        return Err(ConfigError::Validation(
            "word count minimums must all be >= 1".to_string(),
        ));
    }

    let cwv = &thresholds.core_web_vitals;
    if !(cwv.lcp_seconds > 0.0 && cwv.inp_ms > 0.0 && cwv.cls > 0.0) {
        return Err(ConfigError::Validation(
            "Core Web Vitals targets must be positive".to_string(),
        ));
    }

    if thresholds.citable_min_words > thresholds.citable_max_words {
        return Err(ConfigError::Validation(format!(
            "citable passage range is empty: {}..{}",
            thresholds.citable_min_words, thresholds.citable_max_words
        )));
    }

    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    // Agent name: non-empty, alphanumeric + hyphens only
    if config.agent_name.is_empty() {
        return Err(ConfigError::Validation(
            "agent_name cannot be empty".to_string(),
        ));
    }

    if !config
        .agent_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "agent_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.agent_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    if config.timeout_secs == 0
        || config.auxiliary_timeout_secs == 0
        || config.connect_timeout_secs == 0
    {
        return Err(ConfigError::Validation(
            "fetcher timeouts must be >= 1 second".to_string(),
        ));
    }

    if config.max_redirects < 1 || config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be between 1 and 20, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

fn validate_ai_config(config: &AiConfig) -> Result<(), ConfigError> {
    if config.enabled {
        Url::parse(&config.endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid ai endpoint: {}", e)))?;

        if config.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ai model cannot be empty".to_string(),
            ));
        }
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "ai timeout must be >= 1 second".to_string(),
        ));
    }

    if !(0.0..=100.0).contains(&config.eeat_share) {
        return Err(ConfigError::Validation(format!(
            "eeat_share must be within 0..=100, got {}",
            config.eeat_share
        )));
    }

    if !(0.0..=100.0).contains(&config.fallback_cap) {
        return Err(ConfigError::Validation(format!(
            "fallback_cap must be within 0..=100, got {}",
            config.fallback_cap
        )));
    }

    let w = &config.eeat_weights;
    if [w.experience, w.expertise, w.authoritativeness, w.trustworthiness]
        .iter()
        .any(|v| !v.is_finite() || *v < 0.0)
    {
        return Err(ConfigError::Validation(
            "E-E-A-T weights must be non-negative numbers".to_string(),
        ));
    }

    if (w.total() - 100.0).abs() > WEIGHT_EPSILON {
        return Err(ConfigError::Validation(format!(
            "E-E-A-T weights must sum to 100, got {}",
            w.total()
        )));
    }

    Ok(())
}

fn validate_schema_rules(rules: &SchemaRules) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for rule in rules.deprecated.iter().chain(rules.restricted.iter()) {
        if rule.type_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "schema rule type cannot be empty".to_string(),
            ));
        }
        if !seen.insert(rule.type_name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "schema type '{}' is listed more than once",
                rule.type_name
            )));
        }
    }
    Ok(())
}

fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "pipeline timeout must be >= 1 second".to_string(),
        ));
    }

    if config.max_priority_fixes == 0 {
        return Err(ConfigError::Validation(
            "max_priority_fixes must be >= 1".to_string(),
        ));
    }

    Ok(())
}
