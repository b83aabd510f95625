//! End-to-end tests for the analysis pipeline.
//!
//! The Python interpreter is replaced by a shell script that imitates
//! `python -m crosshair check` and `python -m coverage run|html`, so these
//! tests exercise process spawning, log writing and coverage layout without
//! needing CrossHair installed.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crossrun::config::Config;
use crossrun::models::{Selector, Severity, TargetDescriptor};
use crossrun::output::ConsoleFormat;
use crossrun::runner::{RunError, RunOptions, Runner};
use crossrun::targets::{self, EntryError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const FAKE_PYTHON: &str = r#"#!/bin/sh
# Stand-in for `python -m crosshair` / `python -m coverage`.
qual=""
data=""
outdir=""
prev=""
for a in "$@"; do
  case "$a" in
    --data-file=*) data="${a#--data-file=}" ;;
  esac
  if [ "$prev" = "check" ]; then qual="$a"; fi
  if [ "$prev" = "-d" ]; then outdir="$a"; fi
  prev="$a"
done

if [ "$2" = "coverage" ] && [ "$3" = "html" ]; then
  [ -f "$data" ] || { echo "No data to report." >&2; exit 1; }
  mkdir -p "$outdir" && echo "<html>coverage</html>" > "$outdir/index.html"
  exit 0
fi

if [ "$2" = "coverage" ] && [ "$3" = "run" ]; then
  echo "!coverage.py data" > "$data"
fi

mod="${qual%%.*}"
case "$qual" in
  *slow*)
    echo "$PWD/$mod.py:1: info: started"
    exec sleep 30
    ;;
  *clean*)
    exit 0
    ;;
esac
echo "$PWD/$mod.py:3: error: false when calling $qual(0)"
echo "$PWD/$mod.py:1: info: pythonpath=$PYTHONPATH"
echo "tool chatter on stderr" >&2
exit 1
"#;

/// An interpreter that has CrossHair but not coverage.py.
const PYTHON_WITHOUT_COVERAGE: &str = r#"#!/bin/sh
if [ "$2" = "coverage" ]; then
  echo "$0: No module named coverage" >&2
  exit 1
fi
exit 0
"#;

fn install(script: &str) -> (tempfile::TempDir, PathBuf) {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake-python");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    (dir, path)
}

/// Fake interpreters, written once per test binary before any test spawns them.
static FAKE: LazyLock<(tempfile::TempDir, PathBuf)> = LazyLock::new(|| install(FAKE_PYTHON));
static NO_COVERAGE: LazyLock<(tempfile::TempDir, PathBuf)> =
    LazyLock::new(|| install(PYTHON_WITHOUT_COVERAGE));

const SAMPLE: &str = "\
def bisect_right(a, x):
    return 0

class Encoder:
    pass

def slow_search(a):
    return a

def clean_search(a):
    return a
";

struct Workspace {
    dir: tempfile::TempDir,
    source: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("dataset");
        std::fs::create_dir_all(&data).unwrap();
        let source = data.join("bisect.py");
        std::fs::write(&source, SAMPLE).unwrap();
        Self { dir, source }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self, coverage: bool) -> Config {
        let mut config = Config::default();
        config.tool.python = FAKE.1.display().to_string();
        config.tool.coverage = coverage;
        config
    }

    fn runner(&self, config: &Config) -> Runner {
        let options = RunOptions {
            announce: false,
            ..RunOptions::default()
        };
        Runner::new(config, self.root(), options)
    }

    fn target(&self, selector: Selector) -> TargetDescriptor {
        TargetDescriptor::new(&self.source, selector)
    }

    fn files_in(&self, sub: &str) -> Vec<PathBuf> {
        let dir = self.root().join(sub);
        if !dir.exists() {
            return Vec::new();
        }
        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        entries.sort();
        entries
    }
}

// ---------------------------------------------------------------------------
// single target
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_target_writes_log_and_coverage() {
    let ws = Workspace::new();
    let runner = ws.runner(&ws.config(true));

    let outcome = runner
        .run_target(&ws.target(Selector::Function("bisect_right".into())))
        .await
        .unwrap();

    let report = &outcome.report;
    assert_eq!(report.exit_code, Some(1));
    assert!(!report.timed_out);
    assert_eq!(report.findings.len(), 2);
    assert_eq!(report.findings[0].severity, Severity::Error);
    assert!(report.findings[0].message.contains("bisect.bisect_right(0)"));
    assert!(report.stderr.contains("tool chatter"));

    let name = outcome.log_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("log_bisect_right_"), "got: {name}");
    assert!(name.ends_with(".txt"));
    assert_eq!(outcome.log_path.parent().unwrap(), ws.root().join("logs"));

    let log = std::fs::read_to_string(&outcome.log_path).unwrap();
    assert!(log.starts_with("CrossHair Analysis Results for bisect_right:\n"));
    assert!(log.contains("error: false when calling bisect.bisect_right(0)"));
    assert!(log.contains("[stderr]\ntool chatter on stderr"));

    let index = outcome.coverage_index().unwrap();
    assert!(index.is_file());
    let cov_name = outcome.coverage_dir.as_ref().unwrap().file_name().unwrap();
    assert!(cov_name.to_string_lossy().starts_with("coverage_bisect_right_"));

    // Only the report directory remains; the data file is erased.
    assert_eq!(ws.files_in("coverage").len(), 1);
}

#[tokio::test]
async fn tool_runs_from_import_root() {
    let ws = Workspace::new();
    let runner = ws.runner(&ws.config(false));

    let outcome = runner
        .run_target(&ws.target(Selector::Class("Encoder".into())))
        .await
        .unwrap();

    let import_root = std::fs::canonicalize(ws.root().join("dataset")).unwrap();
    let info = &outcome.report.findings[1];
    assert_eq!(info.severity, Severity::Info);
    assert!(
        info.message
            .starts_with(&format!("pythonpath={}", import_root.display())),
        "got: {}",
        info.message
    );
    assert_eq!(
        PathBuf::from(&info.file),
        import_root.join("bisect.py")
    );
}

#[tokio::test]
async fn no_coverage_skips_report() {
    let ws = Workspace::new();
    let runner = ws.runner(&ws.config(false));

    let outcome = runner.run_target(&ws.target(Selector::Module)).await.unwrap();

    assert!(outcome.coverage_dir.is_none());
    assert!(ws.files_in("coverage").is_empty());
    let name = outcome.log_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("log_bisect_"), "got: {name}");
}

#[tokio::test]
async fn empty_output_logs_no_results() {
    let ws = Workspace::new();
    let runner = ws.runner(&ws.config(false));

    let outcome = runner
        .run_target(&ws.target(Selector::Function("clean_search".into())))
        .await
        .unwrap();

    assert_eq!(outcome.report.exit_code, Some(0));
    let log = std::fs::read_to_string(&outcome.log_path).unwrap();
    assert_eq!(log, "CrossHair Analysis Results for clean_search:\nNo results.\n");
}

#[tokio::test]
async fn timeout_kills_tool_and_keeps_partial_output() {
    let ws = Workspace::new();
    let mut config = ws.config(true);
    config.analysis.timeout = 1;
    let runner = ws.runner(&config);

    let started = std::time::Instant::now();
    let outcome = runner
        .run_target(&ws.target(Selector::Function("slow_search".into())))
        .await
        .unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(20));
    assert!(outcome.report.timed_out);
    assert_eq!(outcome.report.exit_code, None);
    assert!(outcome.report.results[0].ends_with("info: started"));
    assert!(outcome.coverage_dir.is_none());

    let log = std::fs::read_to_string(&outcome.log_path).unwrap();
    assert!(log.contains("timed out"));
}

#[tokio::test]
async fn repeated_runs_never_overwrite_logs() {
    let ws = Workspace::new();
    let runner = ws.runner(&ws.config(false));
    let target = ws.target(Selector::Function("bisect_right".into()));

    let first = runner.run_target(&target).await.unwrap();
    let second = runner.run_target(&target).await.unwrap();

    assert_ne!(first.log_path, second.log_path);
    assert_eq!(ws.files_in("logs").len(), 2);
}

#[tokio::test]
async fn missing_coverage_module_fails_the_target() {
    let ws = Workspace::new();
    let mut config = ws.config(true);
    config.tool.python = NO_COVERAGE.1.display().to_string();
    let runner = ws.runner(&config);

    let err = runner
        .run_target(&ws.target(Selector::Function("bisect_right".into())))
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::CoverageRun { .. }), "got: {err}");
    assert!(err.to_string().contains("No module named coverage"), "got: {err}");
    assert!(ws.files_in("logs").is_empty());
    assert!(ws.files_in("coverage").is_empty());
}

#[tokio::test]
async fn missing_coverage_module_counts_as_batch_failure() {
    let ws = Workspace::new();
    let batch = ws.root().join("targets.json");
    std::fs::write(
        &batch,
        format!(r#"[{{ "file": "{}", "function": "bisect_right" }}]"#, ws.source.display()),
    )
    .unwrap();

    let mut config = ws.config(true);
    config.tool.python = NO_COVERAGE.1.display().to_string();
    let summary = ws
        .runner(&config)
        .run_batch(targets::load_batch(&batch).unwrap())
        .await;

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn console_dump_and_open_without_report_still_succeed() {
    let ws = Workspace::new();
    let options = RunOptions {
        console_dump: true,
        format: ConsoleFormat::Json,
        open_coverage: true,
        announce: false,
        ..RunOptions::default()
    };
    let runner = Runner::new(&ws.config(false), ws.root(), options);

    let outcome = runner
        .run_target(&ws.target(Selector::Function("bisect_right".into())))
        .await
        .unwrap();

    assert!(outcome.coverage_index().is_none());
    assert!(outcome.log_path.is_file());
}

// ---------------------------------------------------------------------------
// batch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_of_two_produces_two_logs_and_two_coverage_dirs() {
    let ws = Workspace::new();
    let batch = ws.root().join("targets.json");
    std::fs::write(
        &batch,
        format!(
            r#"[
  {{ "file": "{src}", "function": "bisect_right" }},
  {{ "file": "{src}", "class": "Encoder" }}
]"#,
            src = ws.source.display()
        ),
    )
    .unwrap();

    let entries = targets::load_batch(&batch).unwrap();
    let runner = ws.runner(&ws.config(true));
    let summary = runner.run_batch(entries).await;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);

    let logs = ws.files_in("logs");
    assert_eq!(logs.len(), 2);
    let coverage = ws.files_in("coverage");
    assert_eq!(coverage.len(), 2);
    assert!(coverage.iter().all(|d| d.join("index.html").is_file()));

    let names: Vec<String> = logs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().any(|n| n.starts_with("log_bisect_right_")));
    assert!(names.iter().any(|n| n.starts_with("log_Encoder_")));
}

#[tokio::test]
async fn batch_isolates_bad_entries() {
    let ws = Workspace::new();
    let batch = ws.root().join("targets.json");
    std::fs::write(
        &batch,
        format!(
            r#"[
  {{ "function": "orphan" }},
  {{ "file": "{src}", "function": "not_defined_anywhere" }},
  {{ "file": "{missing}" }},
  {{ "file": "{src}", "function": "bisect_right" }}
]"#,
            src = ws.source.display(),
            missing = ws.root().join("missing.py").display(),
        ),
    )
    .unwrap();

    let entries = targets::load_batch(&batch).unwrap();
    assert_eq!(entries[0].target, Err(EntryError::MissingKey("file")));

    let runner = ws.runner(&ws.config(false));
    let summary = runner.run_batch(entries).await;

    assert_eq!(summary.total, 4);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 3);
    assert_eq!(ws.files_in("logs").len(), 1);
}
