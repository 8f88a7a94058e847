//! Markdown report generation
//!
//! This module renders an [`AuditReport`] as a human-readable markdown
//! document: overview, per-category scores, priority fixes and the full
//! finding list.

use crate::report::types::{AuditReport, CategoryStatus};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown rendering of the report to a file
///
/// # Arguments
///
/// * `report` - The audit report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(std::io::Error)` - Failed to create or write the file
pub fn write_markdown_report(report: &AuditReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an audit report as markdown
pub fn format_markdown_report(report: &AuditReport) -> String {
    let mut md = String::new();

    // Title
    md.push_str("# SEO Audit Report\n\n");

    // Overview
    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **URL**: {}\n", report.url));
    if report.final_url != report.url {
        md.push_str(&format!("- **Final URL**: {}\n", report.final_url));
    }
    md.push_str(&format!("- **Domain**: {}\n", report.domain));
    md.push_str(&format!("- **Page Type**: {}\n", report.page_type));
    if let Some(title) = &report.page_title {
        md.push_str(&format!("- **Title**: {}\n", title));
    }
    md.push_str(&format!(
        "- **Overall Score**: {:.1}/100\n",
        report.overall_score
    ));
    md.push_str(&format!(
        "- **Completeness**: {}/{} categories\n",
        report.audit_completeness.successful, report.audit_completeness.total
    ));
    md.push_str(&format!("- **Generated**: {}\n", report.generated_at.to_rfc3339()));
    md.push_str(&format!("- **Rules Version**: {}\n", report.rules_version));
    md.push_str(&format!(
        "- **Config Fingerprint**: {}\n\n",
        report.config_fingerprint
    ));

    // Category breakdown
    md.push_str("## Category Scores\n\n");
    md.push_str("| Category | Score | Weight | Findings | Status |\n");
    md.push_str("|----------|-------|--------|----------|--------|\n");
    for (category, result) in &report.category_results {
        let status = match &result.status {
            CategoryStatus::Ok => "ok".to_string(),
            CategoryStatus::Failed { reason } => format!("failed: {}", reason),
        };
        md.push_str(&format!(
            "| {} | {} | {}% | {} | {} |\n",
            category.label(),
            result.score,
            result.weight,
            result.findings.len(),
            status
        ));
    }
    md.push('\n');

    // Sub-scores
    let with_sub_scores: Vec<_> = report
        .category_results
        .values()
        .filter(|r| !r.sub_scores.is_empty())
        .collect();
    if !with_sub_scores.is_empty() {
        md.push_str("## Sub-Scores\n\n");
        for result in with_sub_scores {
            md.push_str(&format!("### {}\n\n", result.category_name.label()));
            for sub in &result.sub_scores {
                md.push_str(&format!(
                    "- **{}**: {:.0}/{:.0}",
                    sub.name, sub.score, sub.max_score
                ));
                if let CategoryStatus::Failed { reason } = &sub.status {
                    md.push_str(&format!(" (fallback: {})", reason));
                }
                if let Some(detail) = &sub.detail {
                    md.push_str(&format!(" - {}", detail));
                }
                md.push('\n');
            }
            md.push('\n');
        }
    }

    // Priority fixes
    if !report.priority_fixes.is_empty() {
        md.push_str("## Priority Fixes\n\n");
        for (i, fix) in report.priority_fixes.iter().enumerate() {
            md.push_str(&format!(
                "{}. **[{}]** {} ({})\n   - {}\n",
                i + 1,
                fix.severity,
                fix.message,
                fix.category.label(),
                fix.recommendation
            ));
        }
        md.push('\n');
    }

    // All findings
    if report.finding_count() > 0 {
        md.push_str("## All Findings\n\n");
        md.push_str("| Category | Severity | Rule | Message |\n");
        md.push_str("|----------|----------|------|---------|\n");
        for finding in report.findings() {
            md.push_str(&format!(
                "| {} | {} | `{}` | {} |\n",
                finding.category,
                finding.severity,
                finding.rule,
                finding.message.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md
}
