//! Output formatters for analysis reports.

pub mod human;
pub mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use anyhow::Result;
use vetter_core::Report;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for rendering an analysis report
pub trait Formatter {
    /// Render the report as printable text
    fn format(&self, report: &Report) -> Result<String>;
}

impl Formatter for HumanFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        Ok(human::render(report))
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        json::render(report)
    }
}

/// Formatter for an output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Human => Box::new(HumanFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
