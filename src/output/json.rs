//! JSON output renderer.
//!
//! Outputs `{"target", "qualified_name", "findings", "summary", ...}`.

use crate::models::AnalysisReport;
use crate::output::ReportRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &AnalysisReport) -> String {
        let output = serde_json::json!({
            "target": report.target.display_name(),
            "qualified_name": report.target.qualified_name(),
            "file": report.target.source,
            "findings": report.findings,
            "summary": report.summary(),
            "results": report.results,
            "exit_code": report.exit_code,
            "timed_out": report.timed_out,
            "elapsed_ms": report.elapsed.as_millis() as u64,
        });

        let mut rendered =
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string());
        rendered.push('\n');
        rendered
    }
}
