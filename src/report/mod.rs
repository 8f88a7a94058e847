//! Report types and rendering
//!
//! The types in here are the caller-facing output of an audit. They
//! serialize to JSON with snake_case field names.

mod markdown;
mod types;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use types::{
    AuditCompleteness, AuditReport, Category, CategoryResult, CategoryStatus, ErrorBody,
    ErrorResponse, Finding, Severity, SubScore,
};
