//! Check a target descriptor against the filesystem and its source text.
//!
//! The tool imports the module by name, so the file stem must be a valid
//! Python identifier and the file's directory goes on the import path.
//! Selected functions and classes are looked up by scanning the source
//! rather than importing the module. A name counts as defined when a
//! top-level `def`/`class` of the right kind declares it, or when a
//! top-level `import` or assignment binds it. Names bound only inside
//! indented blocks (`if`, `try`) are not recognised.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{ResolvedTarget, Selector, TargetDescriptor};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static TOP_LEVEL_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*[\(\[]").unwrap());

static TOP_LEVEL_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^class\s+([A-Za-z_]\w*)\s*[\(\[:]").unwrap());

/// `name = ...` or `name: T = ...` at column 0.
static ASSIGNMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([A-Za-z_]\w*)\s*(?::[^=\n]+)?=(?:[^=]|$)").unwrap());

/// `import a.b as c, d` or `from m import (x as y, z)` at column 0.
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:from\s+[\w.]+\s+)?import\s+(\([^)]*\)|[^\n]*)").unwrap()
});

/// Errors raised while resolving a target.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("not a Python source file: {}", .0.display())]
    NotPythonSource(PathBuf),

    #[error("'{name}' is not an importable module name ({})", path.display())]
    InvalidModuleName { name: String, path: PathBuf },

    #[error(
        "the module does not define a top-level {kind} named '{name}' ({}); only top-level def, class, import and assignment statements are recognised",
        path.display()
    )]
    SymbolNotFound {
        kind: &'static str,
        name: String,
        path: PathBuf,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Validate `descriptor` and work out how the tool should import it.
pub fn resolve(descriptor: &TargetDescriptor) -> Result<ResolvedTarget, ResolveError> {
    let path = &descriptor.file;
    if !path.is_file() {
        return Err(ResolveError::FileNotFound(path.clone()));
    }
    if path.extension().and_then(|e| e.to_str()) != Some("py") {
        return Err(ResolveError::NotPythonSource(path.clone()));
    }

    let module = descriptor.module_name().unwrap_or_default().to_string();
    if !is_identifier(&module) {
        return Err(ResolveError::InvalidModuleName {
            name: module,
            path: path.clone(),
        });
    }

    let source = std::fs::canonicalize(path).map_err(|e| read_error(path, e))?;
    let import_root = source
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let lookup = match &descriptor.selector {
        Selector::Module => None,
        Selector::Function(name) => Some(("function", &*TOP_LEVEL_DEF_RE, name)),
        Selector::Class(name) => Some(("class", &*TOP_LEVEL_CLASS_RE, name)),
    };
    if let Some((kind, re, name)) = lookup {
        let text = std::fs::read_to_string(&source).map_err(|e| read_error(path, e))?;
        if !defines(re, &text, name) && !binds(&text, name) {
            return Err(ResolveError::SymbolNotFound {
                kind,
                name: name.to_string(),
                path: path.clone(),
            });
        }
    }

    tracing::debug!(
        module = %module,
        import_root = %import_root.display(),
        "resolved target"
    );

    Ok(ResolvedTarget {
        descriptor: descriptor.clone(),
        source,
        module,
        import_root,
    })
}

fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

fn defines(re: &Regex, text: &str, name: &str) -> bool {
    re.captures_iter(text).any(|caps| &caps[1] == name)
}

/// Whether a top-level import or assignment binds `name`.
fn binds(text: &str, name: &str) -> bool {
    let assigned = ASSIGNMENT_RE
        .captures_iter(text)
        .any(|caps| &caps[1] == name);
    assigned
        || IMPORT_RE
            .captures_iter(text)
            .flat_map(|caps| imported_names(&caps[1]))
            .any(|bound| bound == name)
}

/// Names an import clause binds: the alias when given, otherwise the first
/// dotted segment.
fn imported_names(clause: &str) -> Vec<String> {
    let clause = clause
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ");
    clause
        .trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace())
        .split(',')
        .filter_map(|item| {
            let item = item.trim();
            let bound = match item.split_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => item.split('.').next().unwrap_or_default(),
            };
            (!bound.is_empty() && bound != "*").then(|| bound.to_string())
        })
        .collect()
}

fn read_error(path: &Path, source: std::io::Error) -> ResolveError {
    ResolveError::Read {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
from typing import List

class EgyptianAlgorithm(Enum):
    GREEDY = 1

def egyptian_fraction(numerator: int, denominator: int):
    def inner(x):
        return x
    return inner(numerator)

async def fetch(url):
    pass

class Encoder:
    def encode(self, text):
        pass
"#;

    fn write_sample(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn resolves_whole_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "egyptian_fraction.py");
        let resolved = resolve(&TargetDescriptor::module(&path)).unwrap();
        assert_eq!(resolved.module, "egyptian_fraction");
        assert_eq!(resolved.qualified_name(), "egyptian_fraction");
        assert_eq!(
            resolved.import_root,
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn resolves_top_level_function_and_class() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "sample.py");

        let func = TargetDescriptor::new(&path, Selector::Function("egyptian_fraction".into()));
        assert_eq!(resolve(&func).unwrap().qualified_name(), "sample.egyptian_fraction");

        let async_func = TargetDescriptor::new(&path, Selector::Function("fetch".into()));
        assert!(resolve(&async_func).is_ok());

        let class = TargetDescriptor::new(&path, Selector::Class("Encoder".into()));
        assert_eq!(resolve(&class).unwrap().qualified_name(), "sample.Encoder");
    }

    #[test]
    fn nested_and_method_definitions_are_not_top_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "sample.py");

        for name in ["inner", "encode"] {
            let t = TargetDescriptor::new(&path, Selector::Function(name.into()));
            assert!(matches!(
                resolve(&t),
                Err(ResolveError::SymbolNotFound { kind: "function", .. })
            ));
        }
    }

    #[test]
    fn function_selector_does_not_match_class() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "sample.py");
        let t = TargetDescriptor::new(&path, Selector::Function("Encoder".into()));
        let err = resolve(&t).unwrap_err();
        assert!(err.to_string().contains("function named 'Encoder'"), "got: {err}");
    }

    #[test]
    fn imports_and_assignments_count_as_definitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.py");
        std::fs::write(
            &path,
            "import os.path\n\
             from bisect import bisect_right as br, insort\n\
             from json import (\n    dumps,\n    loads as parse,  # decode\n)\n\
             search = br\n\
             Alias: type = dict\n\
             if True:\n    def hidden():\n        pass\n",
        )
        .unwrap();

        for name in ["os", "br", "insort", "dumps", "parse", "search"] {
            let t = TargetDescriptor::new(&path, Selector::Function(name.into()));
            assert!(resolve(&t).is_ok(), "{name} should resolve");
        }
        let class = TargetDescriptor::new(&path, Selector::Class("Alias".into()));
        assert!(resolve(&class).is_ok());

        for name in ["bisect_right", "loads", "path", "hidden"] {
            let t = TargetDescriptor::new(&path, Selector::Function(name.into()));
            let err = resolve(&t).unwrap_err();
            assert!(err.to_string().contains("only top-level"), "got: {err}");
        }
    }

    #[test]
    fn comparison_is_not_an_assignment() {
        assert!(!binds("x == 1\n", "x"));
        assert!(binds("x = 1\n", "x"));
    }

    #[test]
    fn missing_file() {
        let t = TargetDescriptor::module("/tmp/crossrun_missing_target.py");
        assert!(matches!(resolve(&t), Err(ResolveError::FileNotFound(_))));
    }

    #[test]
    fn rejects_non_python_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "notes.txt");
        assert!(matches!(
            resolve(&TargetDescriptor::module(&path)),
            Err(ResolveError::NotPythonSource(_))
        ));
    }

    #[test]
    fn rejects_unimportable_module_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "egyptian-fraction.py");
        assert!(matches!(
            resolve(&TargetDescriptor::module(&path)),
            Err(ResolveError::InvalidModuleName { .. })
        ));
    }
}
