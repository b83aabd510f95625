//! Open a generated report in the default browser.
//!
//! Uses the platform's opener command and does not wait for the browser.

use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
#[error("failed to open {url} with {program}: {source}")]
pub struct BrowserError {
    pub url: String,
    pub program: &'static str,
    pub source: std::io::Error,
}

/// `file://` URL for a local path.
pub fn file_url(path: &Path) -> String {
    let display = path.display().to_string().replace('\\', "/");
    if display.starts_with('/') {
        format!("file://{display}")
    } else {
        format!("file:///{display}")
    }
}

/// Opener program and leading arguments for this platform.
fn opener() -> (&'static str, Vec<&'static str>) {
    if cfg!(target_os = "macos") {
        ("open", Vec::new())
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/C", "start", ""])
    } else {
        ("xdg-open", Vec::new())
    }
}

/// Launch the default browser on `path`.
pub fn open(path: &Path) -> Result<(), BrowserError> {
    let url = file_url(path);
    let (program, lead) = opener();
    tracing::debug!(%url, program, "opening report");

    Command::new(program)
        .args(lead)
        .arg(&url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_child| ())
        .map_err(|source| BrowserError {
            url,
            program,
            source,
        })
}
