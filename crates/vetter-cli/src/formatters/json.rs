//! JSON formatter for analysis reports.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use vetter_core::Report;

pub struct JsonFormatter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEnvelope<'a> {
    tool: &'static str,
    version: &'static str,
    generated_at: DateTime<Utc>,
    report: &'a Report,
    /// Space-separated fix specs, ready for `npm install`
    fixes: String,
}

pub fn render(report: &Report) -> Result<String> {
    render_at(report, Utc::now())
}

fn render_at(report: &Report, generated_at: DateTime<Utc>) -> Result<String> {
    let envelope = JsonEnvelope {
        tool: "vetter",
        version: env!("CARGO_PKG_VERSION"),
        generated_at,
        report,
        fixes: report.fixes_joined(),
    };
    serde_json::to_string_pretty(&envelope).context("Failed to serialize report")
}
