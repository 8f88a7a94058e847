use crate::config::types::AuditConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(AuditConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use seo_audit::config::load_config;
///
/// let config = load_config(Path::new("audit.toml")).unwrap();
/// println!("Title bounds: {}..{}", config.thresholds.title_min, config.thresholds.title_max);
/// ```
pub fn load_config(path: &Path) -> Result<AuditConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<AuditConfig, ConfigError> {
    let config: AuditConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 fingerprint of the effective configuration
///
/// The fingerprint covers defaults as well as explicit settings, so two
/// audits with the same fingerprint ran against the same thresholds, weights
/// and schema rules.
pub fn compute_config_fingerprint(config: &AuditConfig) -> Result<String, ConfigError> {
    let canonical = serde_json::to_vec(config)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}
