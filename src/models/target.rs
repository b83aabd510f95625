//! Target descriptors: a file plus an optional function or class.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// What part of a module to analyse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Selector {
    /// The whole module.
    Module,
    /// A single top-level function.
    Function(String),
    /// A single top-level class.
    Class(String),
}

impl Selector {
    /// Build a selector from the optional function/class pair.
    ///
    /// Returns `None` when both are set; the two are mutually exclusive.
    pub fn from_parts(function: Option<String>, class: Option<String>) -> Option<Self> {
        match (function, class) {
            (Some(_), Some(_)) => None,
            (Some(f), None) => Some(Selector::Function(f)),
            (None, Some(c)) => Some(Selector::Class(c)),
            (None, None) => Some(Selector::Module),
        }
    }

    /// Selected symbol name, if any.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Selector::Module => None,
            Selector::Function(name) | Selector::Class(name) => Some(name),
        }
    }

    /// Selected function name, if this selects a function.
    pub fn function(&self) -> Option<&str> {
        match self {
            Selector::Function(name) => Some(name),
            _ => None,
        }
    }

    /// Selected class name, if this selects a class.
    pub fn class(&self) -> Option<&str> {
        match self {
            Selector::Class(name) => Some(name),
            _ => None,
        }
    }
}

/// A file to analyse and the part of it to select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDescriptor {
    pub file: PathBuf,
    pub selector: Selector,
}

impl TargetDescriptor {
    pub fn new(file: impl Into<PathBuf>, selector: Selector) -> Self {
        Self {
            file: file.into(),
            selector,
        }
    }

    /// Whole-module target.
    pub fn module(file: impl Into<PathBuf>) -> Self {
        Self::new(file, Selector::Module)
    }

    /// Module name derived from the file stem.
    pub fn module_name(&self) -> Option<&str> {
        module_name_of(&self.file)
    }

    /// Name used for log and coverage artifacts: the selected symbol, or
    /// the module name for whole-module targets.
    pub fn display_name(&self) -> String {
        match self.selector.symbol() {
            Some(name) => name.to_string(),
            None => self.module_name().unwrap_or("module").to_string(),
        }
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (function: {}, class: {})",
            self.file.display(),
            self.selector.function().unwrap_or("None"),
            self.selector.class().unwrap_or("None"),
        )
    }
}

/// A descriptor that has been checked against the filesystem and source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    pub descriptor: TargetDescriptor,
    /// Canonical path of the source file.
    pub source: PathBuf,
    /// Importable module name (the file stem).
    pub module: String,
    /// Directory placed on the tool's import path.
    pub import_root: PathBuf,
}

impl ResolvedTarget {
    /// Dotted name handed to the tool: `module` or `module.symbol`.
    pub fn qualified_name(&self) -> String {
        match self.descriptor.selector.symbol() {
            Some(symbol) => format!("{}.{symbol}", self.module),
            None => self.module.clone(),
        }
    }

    pub fn display_name(&self) -> String {
        self.descriptor.display_name()
    }
}

pub(crate) fn module_name_of(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}
