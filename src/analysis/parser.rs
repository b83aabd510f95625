//! Parse the analysis tool's textual output.
//!
//! Messages look like `path/to/file.py:12: error: false when calling f(0)`.
//! Anything else (tracebacks, progress chatter) is kept verbatim in the
//! results but produces no [`Finding`].

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Finding;

static MESSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>.+?):(?P<line>\d+):\s*(?P<severity>error|warning|info):\s*(?P<message>.*)$")
        .unwrap()
});

/// Split stdout into non-empty result lines and the findings among them.
pub fn parse_output(stdout: &str) -> (Vec<String>, Vec<Finding>) {
    let results: Vec<String> = stdout
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect();
    let findings = results.iter().filter_map(|l| parse_line(l)).collect();
    (results, findings)
}

/// Parse a single located message.
pub fn parse_line(line: &str) -> Option<Finding> {
    let caps = MESSAGE_RE.captures(line.trim())?;
    Some(Finding {
        file: caps["file"].to_string(),
        line: caps["line"].parse().ok()?,
        severity: caps["severity"].parse().ok()?,
        message: caps["message"].to_string(),
    })
}
