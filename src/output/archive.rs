//! Naming and placement of run artifacts.
//!
//! Logs go to `<logs_dir>/log_<name>_<timestamp>.txt` and coverage reports
//! to `<coverage_dir>/coverage_<name>_<timestamp>/`. A numeric suffix is
//! appended when a name is already taken, so earlier runs are never
//! overwritten.

use std::path::{Path, PathBuf};

use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::constants::{COVERAGE_PREFIX, LOG_PREFIX};

/// Errors while creating artifact directories or files.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Current local time as `YYYYmmddHHMMSS`, falling back to UTC when the
/// local offset is unavailable.
pub fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_timestamp(now)
}

pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year][month][day][hour][minute][second]"
    ))
    .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Pick an unused log file path, creating `logs_dir` if needed.
pub fn log_path(logs_dir: &Path, name: &str, timestamp: &str) -> Result<PathBuf, ArchiveError> {
    ensure_dir(logs_dir)?;
    let stem = format!("{LOG_PREFIX}_{}_{timestamp}", sanitize(name));
    Ok(unique(logs_dir, &stem, Some("txt")))
}

/// Pick an unused coverage report directory, creating its parent if needed.
///
/// The report directory itself is left for the coverage tool to create.
pub fn coverage_dir(
    coverage_root: &Path,
    name: &str,
    timestamp: &str,
) -> Result<PathBuf, ArchiveError> {
    ensure_dir(coverage_root)?;
    let stem = format!("{COVERAGE_PREFIX}_{}_{timestamp}", sanitize(name));
    Ok(unique(coverage_root, &stem, None))
}

fn ensure_dir(dir: &Path) -> Result<(), ArchiveError> {
    std::fs::create_dir_all(dir).map_err(|e| ArchiveError::CreateDir {
        path: dir.to_path_buf(),
        source: e,
    })
}

fn unique(dir: &Path, stem: &str, ext: Option<&str>) -> PathBuf {
    let build = |suffix: Option<usize>| {
        let base = match suffix {
            Some(n) => format!("{stem}_{n}"),
            None => stem.to_string(),
        };
        match ext {
            Some(ext) => dir.join(format!("{base}.{ext}")),
            None => dir.join(base),
        }
    };

    let mut candidate = build(None);
    let mut n = 1;
    while candidate.exists() {
        candidate = build(Some(n));
        n += 1;
    }
    candidate
}

/// Keep artifact names filesystem-safe.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}
