//! Batch file loading.
//!
//! A batch file is a JSON array of objects with a required `file` and an
//! optional `function` or `class`:
//!
//! ```json
//! [
//!   { "file": "dataset/bisect/bisect.py", "function": "bisect_right" },
//!   { "file": "dataset/encoder/encoder.py", "class": "Encoder" }
//! ]
//! ```
//!
//! Problems with the file as a whole are fatal ([`BatchError`]). Problems
//! with a single element are carried per entry ([`EntryError`]) so the
//! rest of the batch still runs.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Selector, TargetDescriptor};

/// Errors that prevent the batch from running at all.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("batch file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read batch file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse batch file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("batch file must contain a list of target objects, found {found}")]
    NotAList { found: &'static str },
}

/// Problems with a single batch element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("target is not an object (found {found})")]
    NotAnObject { found: &'static str },

    #[error("target is missing a required key: '{0}'")]
    MissingKey(&'static str),

    #[error("target key '{key}' must be a string (found {found})")]
    InvalidField {
        key: &'static str,
        found: &'static str,
    },

    #[error("target names both a function and a class; choose one")]
    ConflictingSelectors,
}

/// One element of a batch, numbered from 1 in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub index: usize,
    pub target: Result<TargetDescriptor, EntryError>,
}

/// Load and parse a batch file.
///
/// Relative `file` paths are kept as written; they are resolved against
/// the working directory when the target runs.
pub fn load_batch(path: &Path) -> Result<Vec<BatchEntry>, BatchError> {
    if !path.exists() {
        return Err(BatchError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| BatchError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| BatchError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_batch(value)
}

/// Turn a parsed JSON document into batch entries.
pub fn parse_batch(value: Value) -> Result<Vec<BatchEntry>, BatchError> {
    let Value::Array(items) = value else {
        return Err(BatchError::NotAList {
            found: kind_of(&value),
        });
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(i, item)| BatchEntry {
            index: i + 1,
            target: parse_entry(&item),
        })
        .collect())
}

fn parse_entry(item: &Value) -> Result<TargetDescriptor, EntryError> {
    let Value::Object(obj) = item else {
        return Err(EntryError::NotAnObject {
            found: kind_of(item),
        });
    };

    let file = optional_string(obj, "file")?.ok_or(EntryError::MissingKey("file"))?;
    let function = optional_string(obj, "function")?;
    let class = optional_string(obj, "class")?;
    let selector =
        Selector::from_parts(function, class).ok_or(EntryError::ConflictingSelectors)?;

    Ok(TargetDescriptor::new(file, selector))
}

/// Read an optional string field; `null` counts as absent.
fn optional_string(
    obj: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, EntryError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(EntryError::InvalidField {
            key,
            found: kind_of(other),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
