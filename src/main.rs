//! seo-audit main entry point
//!
//! This is the command-line interface for the single-page SEO auditor.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use seo_audit::config::{compute_config_fingerprint, load_config, AuditConfig};
use seo_audit::report::{
    format_markdown_report, write_markdown_report, AuditReport, ErrorResponse,
};
use seo_audit::{AuditError, AuditRequest, Auditor, ErrorKind, PageType};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// seo-audit: SEO and AI-search readiness audit for a single page
///
/// Fetches the page with its robots.txt, sitemap and llms.txt, scores it in
/// seven categories and prints a report with prioritized fixes.
#[derive(Parser, Debug)]
#[command(name = "seo-audit")]
#[command(version)]
#[command(about = "Single-page SEO and AI-search audit", long_about = None)]
struct Cli {
    /// Page to audit; a bare domain is audited over HTTPS
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page type hint (homepage, blog, service, product, other)
    #[arg(long, value_name = "TYPE")]
    page_type: Option<PageType>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate config and show the effective settings without auditing
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_effective_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    if cli.dry_run {
        return match handle_dry_run(&config, &cli.url) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&e),
        };
    }

    let auditor = match Auditor::new(config) {
        Ok(auditor) => auditor,
        Err(e) => return fail(&e),
    };

    let mut request = AuditRequest::new(cli.url.clone());
    if let Some(page_type) = cli.page_type {
        request = request.with_page_type(page_type);
    }

    let report = match auditor.audit(&request).await {
        Ok(report) => report,
        Err(e) => return fail(&e),
    };

    match emit_report(&report, cli.format, cli.output.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Failed to write report: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seo_audit=info,warn"),
            1 => EnvFilter::new("seo_audit=debug,info"),
            2 => EnvFilter::new("seo_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load_effective_config(path: Option<&Path>) -> Result<AuditConfig, AuditError> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = load_config(path)?;
            tracing::info!("Configuration loaded successfully");
            Ok(config)
        }
        None => {
            tracing::debug!("No configuration file given; using defaults");
            Ok(AuditConfig::default())
        }
    }
}

/// Handles the --dry-run mode: validates inputs and shows the effective settings
fn handle_dry_run(config: &AuditConfig, url: &str) -> Result<(), AuditError> {
    let target = seo_audit::url::normalize_target_url(url)?;
    let fingerprint = compute_config_fingerprint(config)?;

    println!("=== seo-audit Dry Run ===\n");
    println!("Target: {}", target);
    println!("Config fingerprint: {}", fingerprint);
    println!("Rules version: {}", config.schema.rules_version);

    println!("\nCategory Weights:");
    for category in seo_audit::report::Category::ALL {
        println!("  {:<12} {:>5.1}", category.as_str(), config.weights.get(category));
    }

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent());
    println!("  Page timeout: {}s", config.fetcher.timeout_secs);
    println!("  Auxiliary timeout: {}s", config.fetcher.auxiliary_timeout_secs);
    println!("  Max redirects: {}", config.fetcher.max_redirects);

    println!("\nE-E-A-T Classifier:");
    if config.ai.enabled {
        println!("  Model: {}", config.ai.model);
        println!("  Endpoint: {}", config.ai.endpoint);
        let key_present = std::env::var(&config.ai.api_key_env).is_ok();
        println!(
            "  API key ({}): {}",
            config.ai.api_key_env,
            if key_present { "present" } else { "missing, rule-based estimate" }
        );
    } else {
        println!("  Disabled, rule-based estimate");
    }

    println!("\nPipeline:");
    println!("  Deadline: {}s", config.pipeline.timeout_secs);
    println!("  Max priority fixes: {}", config.pipeline.max_priority_fixes);
    if let Some(date) = config.pipeline.reference_date {
        println!("  Reference date: {}", date);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

fn emit_report(
    report: &AuditReport,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    match (format, output) {
        (OutputFormat::Markdown, Some(path)) => {
            write_markdown_report(report, path)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Report written to: {}", path.display());
        }
        (OutputFormat::Markdown, None) => println!("{}", format_markdown_report(report)),
        (OutputFormat::Json, output) => {
            let json = serde_json::to_string_pretty(report).context("serializing report")?;
            match output {
                Some(path) => {
                    std::fs::write(path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!("Report written to: {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

/// Prints the error envelope to stdout and maps the error to an exit code
fn fail(err: &AuditError) -> ExitCode {
    tracing::error!("{}", err);

    let envelope = ErrorResponse::from(err);
    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize error response: {}", e),
    }

    ExitCode::from(exit_code(err.kind()))
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::ConfigError => 2,
        ErrorKind::InvalidRequest => 3,
        ErrorKind::TransportError => 4,
        ErrorKind::ContentError => 5,
        ErrorKind::AnalysisError => 6,
    }
}
