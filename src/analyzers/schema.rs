use crate::analyzers::{has_schema_type, AnalysisContext, Analyzer, AnalyzerError, Scorecard};
use crate::parser::{has_property, node_types};
use crate::report::{Category, CategoryResult, Severity};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// JSON-LD validity, vocabulary currency and coverage
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaAnalyzer;

#[async_trait]
impl Analyzer for SchemaAnalyzer {
    fn category(&self) -> Category {
        Category::Schema
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Result<CategoryResult, AnalyzerError> {
        let mut card = Scorecard::new(Category::Schema);
        let weight = ctx.weight(Category::Schema);
        let document = &ctx.document;

        if document.structured_data.is_empty() {
            card.flag(
                25.0,
                "schema-missing",
                Severity::High,
                "Page has no JSON-LD structured data",
                "Add JSON-LD describing the page (Article, Product, Organization, BreadcrumbList)",
            );
            return Ok(card.finish(weight));
        }

        let invalid = document.structured_data.iter().filter(|b| b.invalid).count();
        if invalid > 0 {
            card.flag(
                (8 * invalid).min(16) as f64,
                "schema-invalid-json-ld",
                Severity::High,
                format!("{} JSON-LD block(s) are not valid JSON", invalid),
                "Fix the syntax so search engines can read the block",
            );
        }

        if document.schema_nodes().is_empty() {
            return Ok(card.finish(weight));
        }

        check_context(ctx, &mut card);
        check_type_rules(ctx, &mut card);
        check_required_properties(ctx, &mut card);
        check_coverage(ctx, &mut card);

        Ok(card.finish(weight))
    }
}

/// Root objects of every valid block; nodes inside `@graph` inherit their context
fn root_objects(ctx: &AnalysisContext) -> Vec<&Map<String, Value>> {
    ctx.document
        .structured_data
        .iter()
        .filter_map(|block| block.value.as_ref())
        .flat_map(|value| match value {
            Value::Object(map) => vec![map],
            Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        })
        .collect()
}

fn context_is_insecure(context: &Value) -> bool {
    match context {
        Value::String(s) => s.trim_end_matches('/').eq_ignore_ascii_case("http://schema.org"),
        Value::Array(items) => items.iter().any(context_is_insecure),
        _ => false,
    }
}

fn check_context(ctx: &AnalysisContext, card: &mut Scorecard) {
    let roots = root_objects(ctx);

    let missing = roots.iter().filter(|r| !r.contains_key("@context")).count();
    if missing > 0 {
        card.flag(
            8.0,
            "schema-missing-context",
            Severity::High,
            format!("{} JSON-LD object(s) have no @context", missing),
            "Add \"@context\": \"https://schema.org\" to every JSON-LD block",
        );
    }

    let insecure = roots
        .iter()
        .filter(|r| r.get("@context").map(context_is_insecure).unwrap_or(false))
        .count();
    if insecure > 0 {
        card.flag(
            3.0,
            "schema-http-context",
            Severity::Medium,
            format!("{} JSON-LD object(s) use the http:// schema.org context", insecure),
            "Use \"https://schema.org\" as the @context",
        );
    }
}

fn check_type_rules(ctx: &AnalysisContext, card: &mut Scorecard) {
    let types = ctx.document.schema_types();
    let rules = &ctx.config.schema;

    for rule in &rules.deprecated {
        if types.contains(&rule.type_name) && rule.is_effective(ctx.as_of) {
            let finding = card
                .finding(
                    "schema-deprecated-type",
                    Severity::High,
                    format!(
                        "{} is no longer supported for rich results (since {}): {}",
                        rule.type_name, rule.effective, rule.note
                    ),
                    format!("Remove {} markup or replace it with a supported type", rule.type_name),
                )
                .with_element(rule.type_name.as_str());
            card.penalize(10.0, finding);
        }
    }

    for rule in &rules.restricted {
        if types.contains(&rule.type_name) && rule.is_effective(ctx.as_of) {
            let finding = card
                .finding(
                    "schema-restricted-type",
                    Severity::Medium,
                    format!("{} rich results are restricted: {}", rule.type_name, rule.note),
                    format!("Keep {} markup only if the site qualifies", rule.type_name),
                )
                .with_element(rule.type_name.as_str());
            card.penalize(5.0, finding);
        }
    }
}

fn check_required_properties(ctx: &AnalysisContext, card: &mut Scorecard) {
    let required = &ctx.config.schema.required_properties;
    let mut reported = BTreeSet::new();

    for node in ctx.document.schema_nodes() {
        for type_name in node_types(node) {
            let Some(properties) = required.get(type_name) else {
                continue;
            };
            if reported.contains(type_name) {
                continue;
            }
            let missing: Vec<&str> = properties
                .iter()
                .map(String::as_str)
                .filter(|p| !has_property(node, p))
                .collect();
            if missing.is_empty() {
                continue;
            }
            reported.insert(type_name);

            let finding = card
                .finding(
                    "schema-missing-required-properties",
                    Severity::Medium,
                    format!("{} is missing required properties: {}", type_name, missing.join(", ")),
                    format!("Add {} to the {} node", missing.join(", "), type_name),
                )
                .with_element(type_name);
            card.penalize(5.0, finding);
        }
    }
}

fn check_coverage(ctx: &AnalysisContext, card: &mut Scorecard) {
    let document = &ctx.document;

    if !has_schema_type(document, &["Organization", "LocalBusiness", "Corporation"]) {
        card.flag(
            5.0,
            "schema-missing-organization",
            Severity::Medium,
            "No Organization or LocalBusiness schema",
            "Describe the publisher with Organization schema (name, url, logo, sameAs)",
        );
    }

    if !has_schema_type(document, &["BreadcrumbList"]) {
        card.flag(
            3.0,
            "schema-missing-breadcrumbs",
            Severity::Low,
            "No BreadcrumbList schema",
            "Add BreadcrumbList schema matching the visible breadcrumb trail",
        );
    }

    if !has_schema_type(document, &["WebSite"]) {
        card.flag(
            3.0,
            "schema-missing-website",
            Severity::Low,
            "No WebSite schema",
            "Add WebSite schema with the site name and url",
        );
    }
}
