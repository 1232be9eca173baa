//! scrape command: Build the Fabric identity support matrix
//!
//! Expands the API navigation tree, visits every endpoint page in turn,
//! reads its "Microsoft Entra supported identities" table, then prints a
//! summary and writes two timestamped CSV files.

use crate::browser::BrowserSession;
use crate::driver::PageDriver;
use crate::error::SkipReason;
use crate::extract::{parse_support_table, SUPPORT_TABLE_LABEL};
use crate::report::{self, CsvPaths};
use crate::support::{aggregate, Aggregation, EndpointRef, EndpointSet, IdentityRecord};
use crate::toc::{self, ClickErrorPolicy, ExpandConfig, ExpandReport, Site};
use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

/// Longest error message logged for a skipped endpoint
const SKIP_MESSAGE_CHARS: usize = 100;

#[derive(Args)]
pub struct ScrapeArgs {
    /// Articles index page holding the navigation tree
    #[arg(long, env = "FABRIC_IDS_URL", default_value = toc::ARTICLES_URL)]
    pub url: String,

    /// Directory the CSV files are written to
    #[arg(short, long, env = "FABRIC_IDS_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum tree expansion passes (1-20)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u8).range(1..=20))]
    pub max_passes: u8,

    /// What to do when a tree node cannot be clicked open
    #[arg(long, value_enum, default_value_t = ClickErrorPolicy::Skip)]
    pub on_click_error: ClickErrorPolicy,

    /// Navigation timeout per endpoint page in milliseconds
    #[arg(long, env = "FABRIC_IDS_NAV_TIMEOUT", default_value = "30000")]
    pub nav_timeout: u64,

    /// Time allowed for a page to finish loading after navigation in milliseconds
    #[arg(long, default_value = "15000")]
    pub load_timeout: u64,

    /// Delay between endpoint pages in milliseconds
    #[arg(long, env = "FABRIC_IDS_DELAY", default_value = "500")]
    pub delay: u64,

    /// Also print a compact JSON run report to stdout, after the tables
    #[arg(long)]
    pub json: bool,
}

/// Configuration for scrape
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub site: Site,
    pub expand: ExpandConfig,
    pub table_label: String,
    pub index_timeout_ms: u64,
    pub nav_timeout_ms: u64,
    pub load_timeout_ms: u64,
    pub delay_ms: u64,
    pub output_dir: PathBuf,
    pub json: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            site: Site::default(),
            expand: ExpandConfig::default(),
            table_label: SUPPORT_TABLE_LABEL.to_string(),
            index_timeout_ms: 30_000,
            nav_timeout_ms: 30_000,
            load_timeout_ms: 15_000,
            delay_ms: 500,
            output_dir: PathBuf::from("."),
            json: false,
        }
    }
}

impl ScrapeConfig {
    pub fn from_args(args: ScrapeArgs) -> Result<Self> {
        let index =
            Url::parse(&args.url).with_context(|| format!("Invalid --url: {}", args.url))?;
        let defaults = Self::default();

        Ok(Self {
            site: Site {
                host: index.origin().ascii_serialization(),
                articles_url: args.url,
                ..defaults.site
            },
            expand: ExpandConfig {
                max_passes: args.max_passes as usize,
                on_click_error: args.on_click_error,
                ..defaults.expand
            },
            nav_timeout_ms: args.nav_timeout,
            load_timeout_ms: args.load_timeout,
            delay_ms: args.delay,
            output_dir: args.output_dir,
            json: args.json,
            ..defaults
        })
    }
}

/// An endpoint whose page could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEndpoint {
    pub name: String,
    pub url: String,
    pub reason: String,
}

/// Everything the crawl gathered, before any output
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub expansion: ExpandReport,
    pub endpoints: EndpointSet,
    pub records: Vec<IdentityRecord>,
    /// Endpoints that loaded but had no support table
    pub without_table: Vec<EndpointRef>,
    pub skipped: Vec<SkippedEndpoint>,
}

/// Run summary (compact)
#[derive(Debug, Serialize)]
pub struct ScrapeReport {
    pub endpoints: usize,
    pub with_table: usize,
    pub without_table: usize,
    pub records: usize,
    pub expansion: ExpandReport,
    #[serde(flatten)]
    pub aggregation: Aggregation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEndpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<CsvPaths>,
}

/// Run the scrape command
pub async fn run_scrape(args: ScrapeArgs) -> Result<()> {
    let config = ScrapeConfig::from_args(args)?;

    let session = BrowserSession::launch().await?;
    let outcome = crawl(&session, &config).await;
    // Chrome is closed before the crawl result is inspected
    if let Err(e) = session.close().await {
        warn!("Failed to close browser: {}", e);
    }
    let outcome = outcome.context("Scrape failed")?;

    let timestamp = report::file_timestamp(&Local::now());
    let report = emit(&outcome, &config, &timestamp).await?;
    print!("{}", console_output(&outcome, &report, config.json)?);

    info!(
        "Done: {}/{} endpoints with identity tables, {} skipped",
        report.with_table,
        report.endpoints,
        report.skipped.len()
    );

    Ok(())
}

/// Open the index, expand the tree and collect endpoint links
pub async fn discover_endpoints<D: PageDriver>(
    driver: &D,
    config: &ScrapeConfig,
) -> Result<(EndpointSet, ExpandReport)> {
    driver
        .navigate(&config.site.articles_url, config.index_timeout_ms)
        .await
        .with_context(|| format!("Failed to open {}", config.site.articles_url))?;
    driver
        .wait_for_load(config.index_timeout_ms)
        .await
        .context("Index page did not finish loading")?;

    let expansion = toc::expand_tree(driver, &config.expand).await;

    let html = driver.content().await?;
    let endpoints = toc::collect_endpoints(&html, &config.site);

    Ok((endpoints, expansion))
}

/// Fetch one endpoint page and extract its support table records.
///
/// `Ok(vec![])` when the page has no support table.
pub async fn fetch_endpoint<D: PageDriver>(
    driver: &D,
    endpoint: &EndpointRef,
    config: &ScrapeConfig,
) -> std::result::Result<Vec<IdentityRecord>, SkipReason> {
    driver
        .navigate(&endpoint.url, config.nav_timeout_ms)
        .await
        .map_err(|e| SkipReason::Navigation(e.to_string()))?;
    driver
        .wait_for_load(config.load_timeout_ms)
        .await
        .map_err(|e| SkipReason::Load(e.to_string()))?;
    let html = driver
        .content()
        .await
        .map_err(|e| SkipReason::Content(e.to_string()))?;

    let rows = parse_support_table(&html, &config.table_label).unwrap_or_default();

    Ok(rows
        .into_iter()
        .map(|row| IdentityRecord {
            endpoint_name: endpoint.name.clone(),
            endpoint_url: endpoint.url.clone(),
            identity_type: row.identity_type,
            support_text: row.support_text,
        })
        .collect())
}

/// Discover endpoints, then visit each in order. Per-endpoint failures are
/// logged and recorded; only a failure to load the index is an error.
pub async fn crawl<D: PageDriver>(driver: &D, config: &ScrapeConfig) -> Result<CrawlOutcome> {
    let (endpoints, expansion) = discover_endpoints(driver, config).await?;
    info!("Found {} API endpoints to check", endpoints.len());

    let mut outcome = CrawlOutcome {
        expansion,
        ..CrawlOutcome::default()
    };

    let total = endpoints.len();
    for (i, endpoint) in endpoints.iter().enumerate() {
        info!("Checking {}/{}: {}", i + 1, total, endpoint.name);

        match fetch_endpoint(driver, endpoint, config).await {
            Ok(records) if records.is_empty() => {
                debug!("no support table on {}", endpoint.url);
                outcome.without_table.push(endpoint.clone());
            }
            Ok(records) => outcome.records.extend(records),
            Err(reason) => {
                let message = report::truncate(&reason.to_string(), SKIP_MESSAGE_CHARS);
                warn!("Error checking {}: {}", endpoint.name, message);
                outcome.skipped.push(SkippedEndpoint {
                    name: endpoint.name.clone(),
                    url: endpoint.url.clone(),
                    reason: message,
                });
            }
        }

        driver.pause(config.delay_ms).await;
    }

    outcome.endpoints = endpoints;
    Ok(outcome)
}

/// Write both CSV files. Nothing is written when no record was found.
pub async fn emit(
    outcome: &CrawlOutcome,
    config: &ScrapeConfig,
    timestamp: &str,
) -> Result<ScrapeReport> {
    let aggregation = aggregate(&outcome.records);
    let with_table = outcome
        .records
        .iter()
        .map(|r| r.endpoint_name.as_str())
        .collect::<HashSet<_>>()
        .len();

    for row in &aggregation.unclassified {
        warn!(
            "Unrecognised identity type on {}: {:?}",
            row.endpoint, row.identity_type
        );
    }

    let mut files = None;
    if !outcome.records.is_empty() {
        let paths = CsvPaths::new(&config.output_dir, timestamp);

        tokio::fs::write(&paths.summary, report::summary_csv(&aggregation.summaries)?)
            .await
            .with_context(|| format!("Failed to write {}", paths.summary.display()))?;
        tokio::fs::write(&paths.detailed, report::detailed_csv(&outcome.records)?)
            .await
            .with_context(|| format!("Failed to write {}", paths.detailed.display()))?;

        files = Some(paths);
    }

    Ok(ScrapeReport {
        endpoints: outcome.endpoints.len(),
        with_table,
        without_table: outcome.without_table.len(),
        records: outcome.records.len(),
        expansion: outcome.expansion.clone(),
        aggregation,
        skipped: outcome.skipped.clone(),
        files,
    })
}

/// Stdout text for a finished run: the tables and saved-file lines, then
/// the compact JSON report on its own last line when `json` is set.
pub fn console_output(
    outcome: &CrawlOutcome,
    run: &ScrapeReport,
    json: bool,
) -> Result<String> {
    let mut out = String::new();

    match &run.files {
        None => out.push_str("No identity support tables found\n"),
        Some(paths) => {
            let _ = writeln!(
                out,
                "\n✓ Found identity support information for {} endpoints\n",
                run.with_table
            );
            out.push_str(&report::format_summary_table(&run.aggregation.summaries));
            let _ = writeln!(out, "\n✓ CSV file saved as: {}", paths.summary.display());
            let _ = writeln!(
                out,
                "  Contains {} endpoints with identity support information",
                run.aggregation.summaries.len()
            );
            let _ = writeln!(out, "✓ Detailed CSV file saved as: {}", paths.detailed.display());
            let _ = writeln!(
                out,
                "  Contains {} individual identity support entries\n",
                run.records
            );
            out.push_str(&report::format_details(&outcome.records));
        }
    }

    if json {
        let _ = writeln!(out, "{}", serde_json::to_string(run)?);
    }
    Ok(out)
}
