//! Terminal renderer: styled findings grouped by file.

use colored::Colorize;

use crate::models::finding::Severity;
use crate::models::AnalysisReport;
use crate::output::ReportRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl ReportRenderer for TerminalRenderer {
    fn render(&self, report: &AnalysisReport) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            " {} {}\n\n",
            "▸".cyan().bold(),
            report.target.qualified_name().bold()
        ));

        if report.results.is_empty() {
            output.push_str(&format!("{}", "  ✔ No results.\n".green()));
        }

        let mut sorted = report.findings.clone();
        sorted.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));

        let mut current_file = "";
        for finding in &sorted {
            if finding.file != current_file {
                if !current_file.is_empty() {
                    output.push('\n');
                }
                current_file = &finding.file;
            }

            let (icon, severity_str) = match finding.severity {
                Severity::Error => ("✖".red().bold(), "error".red().bold()),
                Severity::Warning => ("⚠".yellow().bold(), "warning".yellow().bold()),
                Severity::Info => ("ℹ".blue().bold(), "info".blue().bold()),
            };
            let location = format!("{}:{}", finding.file, finding.line);

            output.push_str(&format!(" {icon} {severity_str} in {}\n", location.bold()));
            output.push_str(&format!("   {}\n\n", finding.message));
        }

        // Lines the tool printed that are not located messages
        let unparsed = report.results.len().saturating_sub(report.findings.len());
        if unparsed > 0 {
            for line in report
                .results
                .iter()
                .filter(|l| crate::analysis::parser::parse_line(l).is_none())
            {
                output.push_str(&format!("   {}\n", line.dimmed()));
            }
            output.push('\n');
        }

        if report.timed_out {
            output.push_str(&format!(
                " {} {}\n",
                "⚠".yellow().bold(),
                "analysis timed out; results are partial".yellow()
            ));
        }

        let summary = report.summary();
        output.push_str(&format!("{}\n", "───────────────────────────────────".dimmed()));
        output.push_str(&format!(
            " {} findings: {} {}, {} {}, {} {} {}\n",
            summary.total.to_string().bold(),
            summary.errors.to_string().red().bold(),
            if summary.errors == 1 { "error" } else { "errors" },
            summary.warnings.to_string().yellow().bold(),
            if summary.warnings == 1 { "warning" } else { "warnings" },
            summary.info.to_string().blue().bold(),
            if summary.info == 1 { "info" } else { "infos" },
            format!("({:.1}s)", report.elapsed.as_secs_f64()).dimmed(),
        ));

        output
    }
}
