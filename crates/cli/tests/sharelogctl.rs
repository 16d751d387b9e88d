//! Integration tests for `sharelogctl`.
//!
//! Every invocation attaches a fresh logger to the same region file inside a
//! temporary directory, the way separate tool runs share one machine-wide
//! registry.

use std::fs;
use std::sync::Arc;

use cli::{EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE, run_with};
use logging::Options;
use logging_sink::MemorySink;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

struct Tool {
    _dir: TempDir,
    options: Options,
    sink: Arc<MemorySink>,
}

struct Outcome {
    code: i32,
    stdout: String,
    stderr: String,
}

impl Tool {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = Options::in_dir(dir.path());
        fs::create_dir_all(&options.config.config_dir).expect("config dir");
        Self {
            _dir: dir,
            options,
            sink: Arc::new(MemorySink::new()),
        }
    }

    fn run(&self, args: &[&str]) -> Outcome {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run_with(
            std::iter::once("sharelogctl").chain(args.iter().copied()),
            self.options.clone(),
            Arc::clone(&self.sink),
            &mut stdout,
            &mut stderr,
        );
        Outcome {
            code,
            stdout: String::from_utf8(stdout).expect("utf8 stdout"),
            stderr: String::from_utf8(stderr).expect("utf8 stderr"),
        }
    }

    fn lines(&self) -> Vec<String> {
        self.sink.syslog_lines().into_iter().map(|(_, line)| line).collect()
    }
}

// ============================================================================
// Context Administration
// ============================================================================

/// Levels can only be set on contexts that exist.
#[test]
fn set_requires_existing_context() {
    let tool = Tool::new();

    let missing = tool.run(&["set", "APP", "err"]);
    assert_eq!(missing.code, EXIT_FAILURE);
    assert_eq!(missing.stderr, "sharelogctl: APP: context not found\n");

    assert_eq!(tool.run(&["log", "-c", "APP", "-m", "BOOT", "err", "hello"]).code, EXIT_SUCCESS);
    let set = tool.run(&["set", "APP", "warning"]);
    assert_eq!(set.code, EXIT_SUCCESS);
    assert_eq!(set.stdout, "APP: level warning\n");

    let show = tool.run(&["show", "APP"]);
    assert_eq!(show.code, EXIT_SUCCESS);
    let row = show.stdout.lines().nth(1).expect("row");
    assert!(row.contains("APP"), "{row}");
    assert!(row.contains("warning"), "{row}");
}

#[test]
fn show_lists_global_and_default_contexts() {
    let tool = Tool::new();

    let show = tool.run(&["show"]);
    assert_eq!(show.code, EXIT_SUCCESS);
    assert!(show.stdout.contains("<global>"));
    assert!(show.stdout.contains("<default-lib>"));
    assert!(show.stdout.contains("dev-mode: on"));
}

#[test]
fn flag_marks_context_overridden() {
    let tool = Tool::new();
    tool.run(&["log", "-c", "APP", "-m", "BOOT", "err", "x"]);

    let flag = tool.run(&["flag", "APP", "console", "on"]);
    assert_eq!(flag.code, EXIT_SUCCESS);
    assert_eq!(flag.stdout, "APP: flags console,overridden\n");
}

#[test]
fn dev_mode_switch_is_shared() {
    let tool = Tool::new();

    assert_eq!(tool.run(&["dev-mode", "off"]).stdout, "dev-mode: off\n");
    assert!(tool.run(&["show"]).stdout.contains("dev-mode: off"));
}

// ============================================================================
// Emission
// ============================================================================

#[test]
fn log_writes_through_pipeline() {
    let tool = Tool::new();

    let outcome = tool.run(&["log", "-c", "APP", "-m", "BOOT", "-k", r#"{"n":1}"#, "err", "hello"]);
    assert_eq!(outcome.code, EXIT_SUCCESS);
    assert!(tool.lines().contains(&r#"[] sharelog APP BOOT {"n":1} hello"#.to_owned()));
}

#[test]
fn rejected_log_exits_with_failure() {
    let tool = Tool::new();

    let disabled = tool.run(&["log", "-c", "APP", "debug", "quiet"]);
    assert_eq!(disabled.code, EXIT_FAILURE);
    assert_eq!(disabled.stderr, "sharelogctl: level disabled\n");

    let bad_id = tool.run(&["log", "-c", "APP", "-m", "A B", "err", "x"]);
    assert_eq!(bad_id.code, EXIT_FAILURE);
    assert_eq!(bad_id.stderr, "sharelogctl: invalid message id\n");
}

#[test]
fn dump_reads_file() {
    let tool = Tool::new();
    let file = tool.options.config.config_dir.join("blob.bin");
    fs::write(&file, (0u8..20).collect::<Vec<_>>()).expect("write blob");

    let outcome = tool.run(&["dump", "-c", "APP", "err", file.to_str().expect("utf8 path")]);
    assert_eq!(outcome.code, EXIT_SUCCESS);
    let dumped = tool
        .lines()
        .into_iter()
        .filter(|line| line.starts_with("[] sharelog APP  0000"))
        .count();
    assert_eq!(dumped, 2);

    let missing = tool.run(&["dump", "err", "/nonexistent/blob.bin"]);
    assert_eq!(missing.code, EXIT_FAILURE);
    assert!(missing.stderr.starts_with("sharelogctl: failed to read /nonexistent/blob.bin"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn reload_applies_new_configuration() {
    let tool = Tool::new();
    tool.run(&["log", "-c", "APP", "-m", "BOOT", "err", "x"]);
    fs::write(
        tool.options.config.default_path(),
        r#"{"contexts":[{"name":"APP","level":"crit"}]}"#,
    )
    .expect("write config");

    let reload = tool.run(&["reload"]);
    assert_eq!(reload.code, EXIT_SUCCESS);
    assert!(reload.stdout.starts_with("configuration reloaded from "));

    let row = tool.run(&["show", "APP"]).stdout;
    assert!(row.contains("crit"), "{row}");
}

// ============================================================================
// Usage
// ============================================================================

#[test]
fn usage_errors_exit_with_usage_code() {
    let tool = Tool::new();

    let outcome = tool.run(&["set", "APP", "loud"]);
    assert_eq!(outcome.code, EXIT_USAGE);
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.contains("unknown level 'loud'"));

    assert_eq!(tool.run(&[]).code, EXIT_USAGE);
    assert_eq!(tool.run(&["frobnicate"]).code, EXIT_USAGE);
}

#[test]
fn help_goes_to_stdout() {
    let tool = Tool::new();

    let outcome = tool.run(&["--help"]);
    assert_eq!(outcome.code, EXIT_SUCCESS);
    assert!(outcome.stdout.contains("Usage"));
    assert!(outcome.stderr.is_empty());
}

#[test]
fn errors_needs_no_registry() {
    let tool = Tool::new();

    let outcome = tool.run(&["errors"]);
    assert_eq!(outcome.code, EXIT_SUCCESS);
    assert!(outcome.stdout.contains("  13  ContextNotFound"));
    assert!(!tool.options.registry.region_path.exists());
}
