//! seo-audit: single-page SEO and AI-search readiness auditing
//!
//! This crate fetches a page together with its site-level resources (robots.txt,
//! sitemap, llms.txt), parses it once into an immutable document, runs seven
//! independent category analyzers over it concurrently and aggregates their
//! findings into one weighted, severity-ranked report.

pub mod analyzers;
pub mod config;
pub mod eeat;
pub mod engine;
pub mod fetcher;
pub mod parser;
pub mod report;
pub mod robots;
pub mod scoring;
pub mod url;

use serde::Serialize;
use thiserror::Error;

pub use fetcher::FetchError;
pub use parser::ParseError;

/// Main error type for audit operations
///
/// Only the variants in here abort an audit. Per-category failures and a
/// failed E-E-A-T call are reported inside the [`report::AuditReport`] instead.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid audit target: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Failed to fetch {url}: {source}")]
    Transport { url: String, source: FetchError },

    #[error("Unusable content at {url}: {source}")]
    Content { url: String, source: ParseError },

    #[error("No category analysis completed for {url}")]
    NoCategoriesCompleted { url: String },

    #[error("Invalid audit stage transition: {from} -> {to}")]
    InvalidTransition {
        from: engine::AuditStage,
        to: engine::AuditStage,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl AuditError {
    /// Classifies the error for the caller-facing error envelope
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Client(_) => ErrorKind::ConfigError,
            Self::InvalidUrl(_) => ErrorKind::InvalidRequest,
            Self::Transport { .. } => ErrorKind::TransportError,
            Self::Content { .. } => ErrorKind::ContentError,
            Self::NoCategoriesCompleted { .. } | Self::InvalidTransition { .. } => {
                ErrorKind::AnalysisError
            }
        }
    }
}

/// Caller-visible classification of a fatal audit error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TransportError,
    ContentError,
    ConfigError,
    InvalidRequest,
    AnalysisError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransportError => "transport_error",
            Self::ContentError => "content_error",
            Self::ConfigError => "config_error",
            Self::InvalidRequest => "invalid_request",
            Self::AnalysisError => "analysis_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::AuditConfig;
pub use engine::{AuditRequest, Auditor, PageType};
pub use report::{AuditReport, Category, CategoryResult, Finding, Severity};
