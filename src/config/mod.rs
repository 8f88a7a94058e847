//! Configuration module for seo-audit
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to the built-in
//! defaults (weights, thresholds, schema rules, timeouts).
//!
//! # Example
//!
//! ```no_run
//! use seo_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Technical weight: {}", config.weights.technical);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AiConfig, AuditConfig, CategoryWeights, CoreWebVitals, EeatWeights, FetcherConfig,
    PipelineConfig, SchemaRules, SchemaTypeRule, Thresholds, WordCountMinimums,
};

// Re-export parser functions
pub use parser::{compute_config_fingerprint, load_config, parse_config};
pub use validation::validate;
