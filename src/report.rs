//! Console tables and CSV artifacts

use crate::support::{group_by_endpoint, EndpointSummary, IdentityRecord};
use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const SUMMARY_HEADER: [&str; 4] = [
    "Endpoint",
    "URL",
    "User_Support",
    "Service_Principal_Support",
];
pub const DETAILED_HEADER: [&str; 4] = ["Endpoint", "URL", "Identity_Type", "Support_Details"];

const RULE_WIDTH: usize = 120;
const ENDPOINT_WIDTH: usize = 40;
const USER_WIDTH: usize = 8;
const SP_WIDTH: usize = 50;

#[derive(Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "Endpoint")]
    endpoint: &'a str,
    #[serde(rename = "URL")]
    url: &'a str,
    #[serde(rename = "User_Support")]
    user_support: &'a str,
    #[serde(rename = "Service_Principal_Support")]
    service_principal_support: &'a str,
}

#[derive(Serialize)]
struct DetailedRow<'a> {
    #[serde(rename = "Endpoint")]
    endpoint: &'a str,
    #[serde(rename = "URL")]
    url: &'a str,
    #[serde(rename = "Identity_Type")]
    identity_type: &'a str,
    #[serde(rename = "Support_Details")]
    support_details: &'a str,
}

/// Output file locations for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvPaths {
    pub summary: PathBuf,
    pub detailed: PathBuf,
}

impl CsvPaths {
    pub fn new(dir: &Path, timestamp: &str) -> Self {
        Self {
            summary: dir.join(format!("fabric_identity_support_{}.csv", timestamp)),
            detailed: dir.join(format!("fabric_identity_support_detailed_{}.csv", timestamp)),
        }
    }
}

/// `YYYYMMDD_HHMMSS`
pub fn file_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Shorten to `max` characters, ending in `...` when cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Fixed-width summary table
pub fn format_summary_table(summaries: &[EndpointSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "MICROSOFT ENTRA IDENTITY SUPPORT TABLE");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(
        out,
        "{:<ew$} | {:<uw$} | Service Principal & Managed Identities",
        "Endpoint",
        "User",
        ew = ENDPOINT_WIDTH,
        uw = USER_WIDTH
    );
    let _ = writeln!(
        out,
        "{} | {} | {}",
        "-".repeat(ENDPOINT_WIDTH),
        "-".repeat(USER_WIDTH),
        "-".repeat(SP_WIDTH)
    );

    for s in summaries {
        let _ = writeln!(
            out,
            "{:<ew$} | {:<uw$} | {}",
            truncate(&s.endpoint, ENDPOINT_WIDTH),
            truncate(&s.user_support, USER_WIDTH),
            truncate(&s.service_principal_support, SP_WIDTH),
            ew = ENDPOINT_WIDTH,
            uw = USER_WIDTH
        );
    }
    out
}

/// Every record, grouped by endpoint
pub fn format_details(records: &[IdentityRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "DETAILED IDENTITY SUPPORT DATA:");
    let _ = writeln!(out, "{}", rule());

    for (endpoint, items) in group_by_endpoint(records) {
        let _ = writeln!(out, "\n{}:", endpoint);
        let _ = writeln!(out, "  URL: {}", items[0].endpoint_url);
        for item in items {
            let _ = writeln!(out, "  {}: {}", item.identity_type, item.support_text);
        }
    }
    out
}

/// Summary CSV bytes, header included even with no rows
pub fn summary_csv(summaries: &[EndpointSummary]) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(SUMMARY_HEADER)?;
    for s in summaries {
        wtr.serialize(SummaryRow {
            endpoint: &s.endpoint,
            url: &s.url,
            user_support: &s.user_support,
            service_principal_support: &s.service_principal_support,
        })?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow!("Failed to flush summary CSV: {}", e))
}

/// Detailed CSV bytes, one line per record in crawl order
pub fn detailed_csv(records: &[IdentityRecord]) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(DETAILED_HEADER)?;
    for r in records {
        wtr.serialize(DetailedRow {
            endpoint: &r.endpoint_name,
            url: &r.endpoint_url,
            identity_type: &r.identity_type,
            support_details: &r.support_text,
        })?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow!("Failed to flush detailed CSV: {}", e))
}
