//! Integration tests for the emission pipeline.
//!
//! Each test drives a [`Logger`] over a process-local registry and a
//! [`MemorySink`], then inspects the exact lines that reached the sink.

use std::fs;
use std::sync::Arc;

use logging::{
    ContextFlags, ContextHandle, DumpFormat, FormatFlags, KeyedMessage, Level, LogError, Logger, Options,
    log_debug, log_kv, log_kv_with_clock, log_print,
};
use logging_sink::{ConsoleStream, MemorySink, SyslogPriority, process};
use registry::ValidationMode;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

struct Harness {
    dir: TempDir,
    sink: Arc<MemorySink>,
    logger: Logger,
}

impl Harness {
    fn new() -> Self {
        Self::with_mode(ValidationMode::Strict)
    }

    fn with_mode(mode: ValidationMode) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = Arc::new(MemorySink::new());
        let options = Options {
            mode,
            ..Options::in_dir(dir.path())
        };
        let logger = Logger::local(options, Arc::clone(&sink));
        logger.registry().set_dev_mode(false);
        Self { dir, sink, logger }
    }

    fn context(&self, name: &str) -> ContextHandle {
        self.logger.context(Some(name)).expect("context")
    }

    fn lines(&self) -> Vec<String> {
        self.sink.syslog_lines().into_iter().map(|(_, line)| line).collect()
    }

    fn write_default_config(&self, text: &str) {
        let config_dir = &self.logger.options().config.config_dir;
        fs::create_dir_all(config_dir).expect("config dir");
        fs::write(self.logger.options().config.default_path(), text).expect("write config");
    }
}

// ============================================================================
// Line Layout
// ============================================================================

/// A keyed message renders its keys as a JSON object ahead of the text.
#[test]
fn keyed_line_layout() {
    let h = Harness::new();
    let app = h.context("APP");

    log_kv!(h.logger, app, Level::Error, "LOGIN_FAIL", { "USER" => "ada", "TRIES" => 3 }, "locked out")
        .expect("logged");

    assert_eq!(
        h.sink.syslog_lines(),
        vec![(
            SyslogPriority::Error,
            r#"[] sharelog APP LOGIN_FAIL {"USER":"ada","TRIES":3} locked out"#.to_owned()
        )]
    );
}

/// A message without keys gets an empty object.
#[test]
fn keyless_message_gets_empty_object() {
    let h = Harness::new();
    let app = h.context("APP");

    log_kv!(h.logger, app, Level::Warning, "SHUTDOWN", "bye {}", 42).expect("logged");

    assert_eq!(h.lines(), vec!["[] sharelog APP SHUTDOWN {} bye 42"]);
}

/// The clock variant puts a `CLOCK` value first.
#[test]
fn clock_precedes_keys() {
    let h = Harness::new();
    let app = h.context("APP");

    log_kv_with_clock!(h.logger, app, Level::Notice, "TICK", { "N" => 1 }, "tick").expect("logged");

    let lines = h.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(r#"[] sharelog APP TICK {"CLOCK":""#), "{}", lines[0]);
    assert!(lines[0].ends_with(r#"","N":1} tick"#), "{}", lines[0]);
}

/// Process ids appear once the context asks for them.
#[test]
fn process_id_tag_follows_flags() {
    let h = Harness::new();
    let app = h.context("APP");
    h.logger
        .registry()
        .set_flags(app, ContextFlags::LOG_PROCESS_IDS, true)
        .expect("flags");

    log_kv!(h.logger, app, Level::Error, "ID", "x").expect("logged");

    assert_eq!(h.lines(), vec![format!("[{}] sharelog APP ID {{}} x", process::pid())]);
}

// ============================================================================
// Level Gate
// ============================================================================

/// A child context inherits its parent's level and filters accordingly.
#[test]
fn inherited_level_filters_child() {
    let h = Harness::new();
    let app = h.context("APP");
    h.logger.registry().set_level(app, Level::Warning).expect("set level");
    let ui = h.context("APP.UI");

    assert!(!h.logger.is_enabled(ui, Level::Info));
    assert_eq!(
        log_kv!(h.logger, ui, Level::Info, "STARTED", "ready"),
        Err(LogError::LevelDisabled)
    );
    assert!(h.sink.records().is_empty());

    log_kv!(h.logger, ui, Level::Warning, "SLOW", "frame").expect("logged");
    assert_eq!(h.lines(), vec!["[] sharelog APP.UI SLOW {} frame"]);
}

/// Bad levels and unregistered handles fail before any output.
#[test]
fn gate_rejects_bad_level_and_handle() {
    let h = Harness::new();
    let app = h.context("APP");

    assert_eq!(
        h.logger.log_string(app, Level::None, Some("ID"), None, Some("x")),
        Err(LogError::InvalidLevel)
    );
    assert_eq!(
        h.logger
            .log_string(ContextHandle::from_index(200), Level::Error, Some("ID"), None, Some("x")),
        Err(LogError::InvalidContext)
    );
    assert!(h.sink.records().is_empty());
}

/// The gate runs before content checks, so a filtered call with a bad
/// message-id reports nothing.
#[test]
fn gate_precedes_validation() {
    let h = Harness::new();
    let app = h.context("APP");

    assert_eq!(
        h.logger.log_string(app, Level::Debug, Some("BAD ID"), None, Some("x")),
        Err(LogError::LevelDisabled)
    );
    assert!(h.sink.records().is_empty());
}

// ============================================================================
// Message-id Checks
// ============================================================================

#[test]
fn missing_msgid_is_reported() {
    let h = Harness::new();
    let app = h.context("APP");

    assert_eq!(
        h.logger.log_string(app, Level::Error, None, None, Some("x")),
        Err(LogError::InvalidMsgId)
    );
    assert_eq!(
        h.sink.syslog_lines(),
        vec![(
            SyslogPriority::Error,
            "[] sharelog APP NULL_MSGID {} NULL MSGID provided for non-debug log".to_owned()
        )]
    );
}

#[test]
fn long_and_forbidden_msgids_are_reported() {
    let h = Harness::new();
    let app = h.context("APP");
    let long = "M".repeat(32);

    assert_eq!(
        h.logger.log_string(app, Level::Error, Some(&long), None, Some("x")),
        Err(LogError::InvalidMsgId)
    );
    assert_eq!(
        h.logger.log_string(app, Level::Error, Some("A B"), None, Some("x")),
        Err(LogError::InvalidMsgId)
    );

    let lines = h.lines();
    assert_eq!(
        lines[0],
        format!(
            r#"[] sharelog APP LONG_MSGID {{"MSGID":"{long}"}} MSGID's length is restricted within 32 characters"#
        )
    );
    assert_eq!(
        lines[1],
        r#"[] sharelog APP INVALID_MSGID {"MSGID":"A B"} MSGID contains space, { or }."#
    );
    assert_eq!(lines.len(), 2);
}

/// An empty message-id is reported with the rendered message quoted.
#[test]
fn empty_msgid_quotes_message() {
    let h = Harness::new();
    let app = h.context("APP");

    assert_eq!(
        h.logger.log_string(app, Level::Error, Some(""), None, Some("hello")),
        Err(LogError::EmptyMsgId)
    );
    assert_eq!(
        h.lines(),
        vec![r#"[] sharelog APP EMPTY_MSGID {"MESSAGE":"{} hello ..."} MSGID must not be empty"#]
    );
}

/// Lenient mode writes lines that strict mode would reject.
#[test]
fn lenient_mode_skips_content_checks() {
    let h = Harness::with_mode(ValidationMode::Lenient);
    let app = h.context("APP");

    h.logger
        .log_string(app, Level::Error, Some("A B"), Some("{not json"), Some("x"))
        .expect("logged");

    assert_eq!(h.lines(), vec!["[] sharelog APP A B {not json x"]);
}

// ============================================================================
// Debug Level
// ============================================================================

#[test]
fn debug_lines_carry_fixed_msgid() {
    let h = Harness::new();
    let app = h.context("APP");
    h.logger.registry().set_level(app, Level::Debug).expect("set level");

    log_debug!(h.logger, app, "x={}", 1).expect("logged");
    h.logger
        .log_string(app, Level::Debug, None, None, Some("plain"))
        .expect("logged");

    assert_eq!(
        h.sink.syslog_lines(),
        vec![
            (SyslogPriority::Debug, "[] sharelog APP DBGMSG {} x=1".to_owned()),
            (SyslogPriority::Debug, "[] sharelog APP DBGMSG {} plain".to_owned()),
        ]
    );
}

#[test]
fn debug_rules_are_enforced() {
    let h = Harness::new();
    let app = h.context("APP");
    h.logger.registry().set_level(app, Level::Debug).expect("set level");

    assert_eq!(
        h.logger.log_string(app, Level::Debug, Some("ID"), None, Some("x")),
        Err(LogError::InvalidFormat)
    );
    assert_eq!(
        h.logger.log_string(app, Level::Debug, None, Some("{}"), Some("x")),
        Err(LogError::InvalidFormat)
    );
    assert_eq!(
        h.logger.log_string(app, Level::Debug, None, None, None),
        Err(LogError::InvalidFormat)
    );
    assert_eq!(
        log_kv!(h.logger, app, Level::Debug, None::<&str>, { "K" => 1 }, "x"),
        Err(LogError::InvalidFormat)
    );

    let lines = h.lines();
    assert_eq!(
        lines,
        vec![
            r#"[] sharelog APP DBGLVL_MSGID {"MSGID":"ID"} MSGID should be NULL for debug level"#,
            "[] sharelog APP DBGLVL_KVPAIRS {} kvpairs should be NULL for DEBUG level",
            "[] sharelog APP INVALID_FREESTRING {} ",
            "[] sharelog APP DBGLVL_KVCOUNT {} kv_count should be 0 for DEBUG level",
        ]
    );
}

// ============================================================================
// JSON and Keyed Checks
// ============================================================================

#[test]
fn json_fragment_is_validated() {
    let h = Harness::new();
    let app = h.context("APP");

    h.logger
        .log_string(app, Level::Error, Some("ID"), Some(r#"{"a":1}"#), Some("text"))
        .expect("logged");
    assert_eq!(
        h.logger
            .log_string(app, Level::Error, Some("ID"), Some(r#"{"a":}"#), Some("text")),
        Err(LogError::InvalidFormat)
    );

    assert_eq!(
        h.lines(),
        vec![
            r#"[] sharelog APP ID {"a":1} text"#,
            r#"[] sharelog APP INVALID_JSON {"MSGID":"ID", "CAUSE":"The json string is wrong.","JSON":"{\"a\":} ..."}"#,
        ]
    );
}

#[test]
fn key_count_mismatch_reports_format() {
    let h = Harness::new();
    let app = h.context("APP");
    let message = KeyedMessage {
        msgid: Some("ID"),
        kv_count: 2,
        keys: Some("A\u{1}B\u{1}C"),
        formats: Some("%s%s"),
        flags: FormatFlags::empty(),
        args: format_args!(r#"{{"A":1,"B":2,"C":3}} x"#),
    };

    assert_eq!(h.logger.log_kv(app, Level::Error, &message), Err(LogError::InvalidFormat));
    assert_eq!(h.lines(), vec![r#"[] sharelog APP MISMATCHED_FMT {"MSGID":"ID"}"#]);
}

#[test]
fn invalid_key_character_is_named() {
    let h = Harness::new();
    let app = h.context("APP");
    let message = KeyedMessage {
        msgid: Some("ID"),
        kv_count: 2,
        keys: Some("A\u{1}B\u{7}"),
        formats: Some("%s%s"),
        flags: FormatFlags::empty(),
        args: format_args!(r#"{{"A":1}} x"#),
    };

    assert_eq!(h.logger.log_kv(app, Level::Error, &message), Err(LogError::InvalidFormat));
    assert_eq!(
        h.lines(),
        vec![
            "[] sharelog APP INVALID_KEY {\"MSGID\":\"ID\",\"KEY\":2,\"INVALID_CHAR\":\"\u{7}\"}".to_owned(),
            r#"[] sharelog APP MISMATCHED_FMT {"MSGID":"ID"}"#.to_owned(),
        ]
    );
}

#[test]
fn descriptor_must_match_clock_flag() {
    let h = Harness::new();
    let app = h.context("APP");
    let message = KeyedMessage {
        msgid: Some("ID"),
        kv_count: 1,
        keys: Some("A"),
        formats: Some("%s"),
        flags: FormatFlags::WITH_CLOCK,
        args: format_args!(r#"{{"A":1}} x"#),
    };

    assert_eq!(h.logger.log_kv(app, Level::Error, &message), Err(LogError::InvalidFormat));
}

#[test]
fn rendered_keyed_payload_must_open_with_json() {
    let h = Harness::new();
    let app = h.context("APP");
    let message = KeyedMessage {
        msgid: Some("ID"),
        kv_count: 1,
        keys: Some("A"),
        formats: Some("%s"),
        flags: FormatFlags::empty(),
        args: format_args!(r#"{{"A":}} x"#),
    };

    assert_eq!(h.logger.log_kv(app, Level::Error, &message), Err(LogError::InvalidFormat));
    let lines = h.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(r#"[] sharelog APP INVALID_JSON {"MSGID":"ID""#), "{}", lines[0]);
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn payload_at_capacity_is_written_whole() {
    let h = Harness::new();
    let app = h.context("APP");
    let text = "a".repeat(1024 - 3);

    h.logger
        .log_string(app, Level::Error, Some("ID"), None, Some(&text))
        .expect("logged");

    let lines = h.lines();
    assert_eq!(lines, vec![format!("[] sharelog APP ID {{}} {text}")]);
}

#[test]
fn oversized_payload_is_cut_and_reported() {
    let h = Harness::new();
    let app = h.context("APP");
    let text = "a".repeat(1024 - 2);

    h.logger
        .log_string(app, Level::Error, Some("ID"), None, Some(&text))
        .expect("logged");

    let lines = h.sink.syslog_lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].0, SyslogPriority::Warning);
    assert!(
        lines[0].1.starts_with(
            r#"[] sharelog APP MSG_TRUNCATED {"MSGID":"ID","CAUSE":"Log message exceeded 1024 bytes","TRUNCATED_MSG":"{} aaa"#
        ),
        "{}",
        lines[0].1
    );
    let prefix = "[] sharelog APP ID ";
    assert!(lines[1].1.starts_with(prefix));
    assert_eq!(lines[1].1.len() - prefix.len(), 1024);
}

/// The empty-object prefix of a keyless message does not count against the
/// capacity.
#[test]
fn keyless_prefix_is_outside_capacity() {
    let h = Harness::new();
    let app = h.context("APP");
    let text = "b".repeat(1024);

    log_kv!(h.logger, app, Level::Error, "ID", "{text}").expect("logged");

    assert_eq!(h.lines(), vec![format!("[] sharelog APP ID {{}} {text}")]);
}

// ============================================================================
// Legacy Output and Commands
// ============================================================================

#[test]
fn print_routes_to_legacy_context() {
    let h = Harness::new();
    let app = h.context("APP");

    log_print!(h.logger, app, Level::Error, "legacy {}", 7).expect("logged");

    assert_eq!(h.lines(), vec!["[] sharelog LegacyLog  legacy 7"]);
    assert!(h.logger.registry().find("LegacyLog").is_ok());
    assert_eq!(
        h.logger.print(app, Level::Error, format_args!("")),
        Err(LogError::InvalidFormat)
    );
}

/// The reload command re-reads configuration and writes nothing.
#[test]
fn reload_command_applies_configuration() {
    let h = Harness::new();
    let app = h.context("APP");
    h.write_default_config(r#"{"contexts":[{"name":"APP","level":"err"}]}"#);
    assert_eq!(h.logger.registry().level(app), Ok(Level::Info));

    log_print!(h.logger, app, Level::Error, "!loglib loadconf").expect("handled");

    assert_eq!(h.logger.registry().level(app), Ok(Level::Error));
    assert!(h.lines().is_empty());
}

// ============================================================================
// Console Echo
// ============================================================================

#[test]
fn console_echo_needs_flag_and_range() {
    let h = Harness::new();
    let app = h.context("APP");

    log_kv!(h.logger, app, Level::Error, "ID", "quiet").expect("logged");
    assert!(h.sink.console_lines(ConsoleStream::Stderr).is_empty());

    h.logger
        .registry()
        .set_flags(app, ContextFlags::LOG_TO_CONSOLE, true)
        .expect("flags");
    log_kv!(h.logger, app, Level::Error, "ID", "boom").expect("logged");
    log_kv!(h.logger, app, Level::Warning, "ID", "careful\n").expect("logged");

    let stderr = h.sink.console_lines(ConsoleStream::Stderr);
    let stdout = h.sink.console_lines(ConsoleStream::Stdout);
    assert_eq!(stderr, vec![format!("{}[] APP {{}} boom\n", process::program_name())]);
    assert_eq!(stdout, vec![format!("{}[] APP {{}} careful\n", process::program_name())]);
}

// ============================================================================
// Hex Dumps
// ============================================================================

#[test]
fn dump_writes_one_line_per_sixteen_bytes() {
    let h = Harness::new();
    let app = h.context("APP");
    let data: Vec<u8> = (0..20).collect();

    h.logger
        .dump_data(app, Level::Error, Some(&data), DumpFormat::default())
        .expect("dumped");

    let lines = h.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[] sharelog APP  00000000  00 01 02"), "{}", lines[0]);
    assert!(lines[1].starts_with("[] sharelog APP  00000010  10 11 12 13"), "{}", lines[1]);
}

#[test]
fn dump_rejects_missing_and_empty_data() {
    let h = Harness::new();
    let app = h.context("APP");

    assert_eq!(
        h.logger.dump_data(app, Level::Error, None, DumpFormat::default()),
        Err(LogError::InvalidData)
    );
    assert_eq!(
        h.logger.dump_data(app, Level::Error, Some(&[]), DumpFormat::default()),
        Err(LogError::NoData)
    );
    assert_eq!(
        h.logger.dump_data(app, Level::Debug, None, DumpFormat::default()),
        Err(LogError::LevelDisabled)
    );
    assert!(h.sink.records().is_empty());
}

// ============================================================================
// Library Context
// ============================================================================

#[test]
fn lib_context_defaults_and_updates() {
    let h = Harness::new();
    assert_eq!(h.logger.lib_context(), ContextHandle::DEFAULT_LIB);

    let app = h.context("APP");
    h.logger.set_lib_context(app).expect("registered");
    assert_eq!(h.logger.lib_context(), app);
}

#[test]
fn unregistered_lib_context_is_reported() {
    let h = Harness::new();
    let bogus = ContextHandle::from_index(200);

    assert_eq!(h.logger.set_lib_context(bogus), Err(LogError::InvalidContext));
    assert_eq!(h.logger.lib_context(), ContextHandle::DEFAULT_LIB);

    let lines = h.sink.syslog_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, SyslogPriority::Warning);
    assert!(
        lines[0]
            .1
            .starts_with("[] sharelog UNKNOWN Invalid context was passed to set_lib_context. Value: #200. Process: "),
        "{}",
        lines[0].1
    );
}

// ============================================================================
// Shared Region
// ============================================================================

/// Only the attacher that creates the region applies configuration.
#[test]
fn first_attacher_applies_configuration() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = Options::in_dir(dir.path());
    fs::create_dir_all(&options.config.config_dir).expect("config dir");
    fs::write(
        options.config.default_path(),
        r#"{"contexts":[{"name":"APP","level":"err"}]}"#,
    )
    .expect("write config");

    let first = Logger::with_sink(options.clone(), MemorySink::new());
    let app = first.registry().find("APP").expect("configured");
    assert_eq!(first.registry().level(app), Ok(Level::Error));

    fs::write(
        options.config.default_path(),
        r#"{"contexts":[{"name":"APP","level":"debug"}]}"#,
    )
    .expect("rewrite config");
    let second = Logger::with_sink(options, MemorySink::new());
    let app = second.registry().find("APP").expect("visible");
    assert_eq!(second.registry().level(app), Ok(Level::Error));
}

/// The harness keeps its directory alive for the whole test.
#[test]
fn harness_options_live_in_tempdir() {
    let h = Harness::new();
    assert!(h.logger.options().config.config_dir.starts_with(h.dir.path()));
}
