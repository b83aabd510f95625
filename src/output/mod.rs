//! Report rendering and artifact archiving.

pub mod archive;
pub mod json;
pub mod log;
pub mod terminal;

use clap::ValueEnum;

use crate::models::AnalysisReport;

/// Trait for rendering an analysis report to text.
pub trait ReportRenderer {
    fn render(&self, report: &AnalysisReport) -> String;
}

/// Console dump formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum ConsoleFormat {
    #[default]
    Terminal,
    Json,
}

impl ConsoleFormat {
    /// Render a report using the renderer for this format.
    pub fn render(&self, report: &AnalysisReport) -> String {
        match self {
            ConsoleFormat::Terminal => terminal::TerminalRenderer.render(report),
            ConsoleFormat::Json => json::JsonRenderer.render(report),
        }
    }
}
