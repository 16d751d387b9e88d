//! crates/logging/src/logger.rs
//!
//! The emission pipeline: level gate, message-id and payload checks,
//! fixed-capacity formatting, command interception and dispatch to the
//! system log and console.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use config::ConfigApplier;
use logging_sink::{
    ConsoleStream, Diagnostics, ErrnoGuard, FALLBACK_SYSLOG_TAG, LineMode, LogSink, SyslogPriority,
    SystemSink, process,
};
use registry::{
    Attached, ContextFlags, ContextHandle, ContextInfo, LEGACY_CONTEXT_NAME, Level, LogError,
    LogResult, Registry,
};

use crate::command::AdminCommand;
use crate::dump::{self, DumpFormat};
use crate::line::{self, FormattedLine, PAYLOAD_CAPACITY};
use crate::message::KeyedMessage;
use crate::msgid::{self, DEBUG_MSGID, MsgIdProblem};
use crate::options::Options;
use crate::payload::{self, JsonBoundary, KeyProblem};

const LIB_CONTEXT_UNSET: usize = usize::MAX;
const UNKNOWN_COMPONENT: &str = "UNKNOWN";
const COMMAND_LINE_LIMIT: usize = 1023;

/// A context resolved for one call: what the line will be tagged with.
struct Target {
    component: String,
    flags: ContextFlags,
    pidtid: String,
}

impl Target {
    fn new(info: ContextInfo) -> Self {
        let pidtid = process::pid_tid_tag(
            info.flags.contains(ContextFlags::LOG_PROCESS_IDS),
            info.flags.contains(ContextFlags::LOG_THREAD_IDS),
        );
        Self {
            component: info.name,
            flags: info.flags,
            pidtid,
        }
    }
}

/// Entry point for emitting lines against a registry.
///
/// A `Logger` owns its registry attachment and its sink. All methods take
/// `&self` and may be called from any thread.
pub struct Logger {
    registry: Registry,
    sink: Box<dyn LogSink>,
    options: Options,
    lib_context: AtomicUsize,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("lib_context", &self.lib_context())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Attaches to the shared registry and writes to the system log and the
    /// real console streams.
    pub fn new(options: Options) -> Self {
        let ident = match process::program_name() {
            "" => FALLBACK_SYSLOG_TAG,
            name => name,
        };
        let sink = SystemSink::new(options.facility, ident);
        Self::with_sink(options, sink)
    }

    /// Attaches to the shared registry and writes to `sink`.
    ///
    /// The process that initialises the region also applies the
    /// configuration files.
    pub fn with_sink(options: Options, sink: impl LogSink + 'static) -> Self {
        let Attached { registry, created } = Registry::attach(options.registry.clone());
        let logger = Self::assemble(registry, options, Box::new(sink));
        if created {
            let found_default = logger
                .applier()
                .discover_and_apply(&logger.options.config, logger.options.mode);
            if !found_default {
                tracing::debug!(
                    file = %logger.options.config.default_path().display(),
                    "default configuration file not found"
                );
            }
        }
        logger
    }

    /// A logger over a process-local registry that reads no configuration.
    pub fn local(options: Options, sink: impl LogSink + 'static) -> Self {
        let registry = Registry::local(options.registry.clone());
        Self::assemble(registry, options, Box::new(sink))
    }

    fn assemble(registry: Registry, options: Options, sink: Box<dyn LogSink>) -> Self {
        Self {
            registry,
            sink,
            options,
            lib_context: AtomicUsize::new(LIB_CONTEXT_UNSET),
        }
    }

    /// The registry this logger writes against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The options the logger was started with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Resolves `name`, creating the context if needed. `None` is global.
    pub fn context(&self, name: Option<&str>) -> LogResult<ContextHandle> {
        self.registry.get_or_create(name)
    }

    /// Reports whether a line at `level` would pass the gate of `context`.
    pub fn is_enabled(&self, context: ContextHandle, level: Level) -> bool {
        self.registry.is_registered(context)
            && self
                .registry
                .level(context)
                .is_ok_and(|enabled| enabled.admits(level))
    }

    /// Re-reads configuration and re-syncs un-overridden flags with the
    /// global flags. Returns whether the default file was found.
    pub fn reload(&self) -> bool {
        self.applier().reload(&self.options.config, self.options.mode)
    }

    /// Sets the per-process library context. An unregistered handle is
    /// rejected and reported together with the process command line.
    pub fn set_lib_context(&self, context: ContextHandle) -> LogResult<()> {
        if !self.registry.is_registered(context) {
            self.diagnostics().warning(
                UNKNOWN_COMPONENT,
                "[]",
                format_args!(
                    "Invalid context was passed to set_lib_context. Value: {context}. Process: {}",
                    process::command_line(COMMAND_LINE_LIMIT)
                ),
            );
            return Err(LogError::InvalidContext);
        }
        self.lib_context.store(context.index(), Ordering::Relaxed);
        Ok(())
    }

    /// The per-process library context; the pre-registered default-library
    /// context until [`set_lib_context`](Self::set_lib_context) is called.
    pub fn lib_context(&self) -> ContextHandle {
        match self.lib_context.load(Ordering::Relaxed) {
            LIB_CONTEXT_UNSET => ContextHandle::DEFAULT_LIB,
            index => ContextHandle::from_index(index),
        }
    }

    /// Logs a JSON fragment and free text.
    ///
    /// At debug level `msgid` and `kvpairs` must be absent and `message`
    /// present. Otherwise the message-id is validated and `kvpairs`, when
    /// given, must open with a complete JSON value. The line is
    /// `"<kvpairs or {}> <message>"`.
    pub fn log_string(
        &self,
        context: ContextHandle,
        level: Level,
        msgid: Option<&str>,
        kvpairs: Option<&str>,
        message: Option<&str>,
    ) -> LogResult<()> {
        let target = self.target(context, level)?;
        let mut empty_msgid = false;

        let dispatched_msgid = if level == Level::Debug {
            self.reject_debug_msgid(&target, msgid)?;
            if kvpairs.is_some() {
                self.report(
                    &target,
                    format_args!("DBGLVL_KVPAIRS {{}} kvpairs should be NULL for DEBUG level"),
                );
                return Err(LogError::InvalidFormat);
            }
            if message.is_none() {
                self.report(&target, format_args!("INVALID_FREESTRING {{}} "));
                return Err(LogError::InvalidFormat);
            }
            Some(DEBUG_MSGID)
        } else {
            if self.options.mode.is_strict() {
                empty_msgid = self.check_msgid(&target, msgid)?;
                if let Some(kvpairs) = kvpairs {
                    self.check_json(&target, msgid, kvpairs, JsonBoundary::Brace)?;
                }
            }
            msgid
        };

        let line = self.render(
            &target,
            msgid,
            format_args!("{} {}", kvpairs.unwrap_or("{}"), message.unwrap_or("")),
        )?;
        if empty_msgid {
            return Err(self.report_empty_msgid(&target, &line.text));
        }
        self.dispatch(&target, level, dispatched_msgid, &line.text)
    }

    /// Logs a keyed message.
    ///
    /// For non-debug levels the key list and format descriptor must agree
    /// with `kv_count` and the rendered payload must open with a complete
    /// JSON object followed by a space. A message without keys is prefixed
    /// with `"{} "`.
    pub fn log_kv(&self, context: ContextHandle, level: Level, message: &KeyedMessage<'_>) -> LogResult<()> {
        let target = self.target(context, level)?;
        let strict = self.options.mode.is_strict();
        let mut empty_msgid = false;

        let dispatched_msgid = if level == Level::Debug {
            self.reject_debug_msgid(&target, message.msgid)?;
            if message.kv_count != 0 {
                self.report(
                    &target,
                    format_args!("DBGLVL_KVCOUNT {{}} kv_count should be 0 for DEBUG level"),
                );
                return Err(LogError::InvalidFormat);
            }
            Some(DEBUG_MSGID)
        } else {
            if strict {
                empty_msgid = self.check_msgid(&target, message.msgid)?;
                if message.kv_count != 0 {
                    self.check_keys(&target, message)?;
                }
            }
            message.msgid
        };

        let body = self.render(&target, message.msgid, message.args)?;
        if empty_msgid {
            return Err(self.report_empty_msgid(&target, &body.text));
        }

        let line = if message.kv_count == 0 {
            format!("{{}} {}", body.text)
        } else {
            body.text
        };
        if level != Level::Debug && strict && message.kv_count != 0 {
            self.check_json(&target, message.msgid, &line, JsonBoundary::BraceSpace)?;
        }
        self.dispatch(&target, level, dispatched_msgid, &line)
    }

    /// Logs unstructured text through the legacy context.
    ///
    /// The legacy context is created on demand; if that fails the caller's
    /// context is used. An empty format is rejected.
    pub fn print(&self, context: ContextHandle, level: Level, args: fmt::Arguments<'_>) -> LogResult<()> {
        let context = match self.registry.get_or_create(Some(LEGACY_CONTEXT_NAME)) {
            Ok(legacy) => legacy,
            Err(error) => {
                tracing::debug!(%error, "legacy context unavailable");
                context
            }
        };
        let target = self.target(context, level)?;
        if args.as_str().is_some_and(str::is_empty) {
            return Err(LogError::InvalidFormat);
        }
        let line = self.render(&target, None, args)?;
        self.dispatch(&target, level, None, &line.text)
    }

    /// Logs `data` as a hex dump, one line per 16 bytes.
    ///
    /// `None` stands for a missing buffer and is [`LogError::InvalidData`];
    /// an empty buffer is [`LogError::NoData`].
    pub fn dump_data(
        &self,
        context: ContextHandle,
        level: Level,
        data: Option<&[u8]>,
        format: DumpFormat,
    ) -> LogResult<()> {
        let target = self.target(context, level)?;
        let data = data.ok_or(LogError::InvalidData)?;
        if data.is_empty() {
            return Err(LogError::NoData);
        }
        match format {
            DumpFormat::OffsetHexAscii => {
                for line in dump::lines(data) {
                    self.dispatch(&target, level, None, &line)?;
                }
            }
        }
        Ok(())
    }

    fn applier(&self) -> ConfigApplier<'_> {
        ConfigApplier::new(&self.registry, self.diagnostics())
    }

    fn diagnostics(&self) -> Diagnostics<'_> {
        Diagnostics::new(self.sink.as_ref(), &self.options.identifier)
    }

    fn report(&self, target: &Target, text: fmt::Arguments<'_>) {
        self.diagnostics().error(&target.component, &target.pidtid, text);
    }

    /// Level gate. The level read is lock-free.
    fn target(&self, context: ContextHandle, level: Level) -> LogResult<Target> {
        if !level.is_message_level() {
            return Err(LogError::InvalidLevel);
        }
        if !self.registry.is_registered(context) {
            return Err(LogError::InvalidContext);
        }
        let enabled = self.registry.level(context)?;
        if !enabled.admits(level) {
            return Err(LogError::LevelDisabled);
        }
        self.registry.info(context).map(Target::new)
    }

    /// Returns `Ok(true)` for an empty message-id, which is reported only
    /// once the line has been rendered.
    fn check_msgid(&self, target: &Target, msgid: Option<&str>) -> LogResult<bool> {
        let shown = msgid.unwrap_or_default();
        match msgid::check(msgid) {
            Ok(()) => return Ok(false),
            Err(MsgIdProblem::Empty) => return Ok(true),
            Err(MsgIdProblem::Missing) => self.report(
                target,
                format_args!("NULL_MSGID {{}} NULL MSGID provided for non-debug log"),
            ),
            Err(MsgIdProblem::TooLong) => self.report(
                target,
                format_args!(
                    "LONG_MSGID {{\"MSGID\":\"{shown}\"}} MSGID's length is restricted within 32 characters"
                ),
            ),
            Err(MsgIdProblem::ForbiddenChar) => self.report(
                target,
                format_args!("INVALID_MSGID {{\"MSGID\":\"{shown}\"}} MSGID contains space, {{ or }}."),
            ),
        }
        Err(LogError::InvalidMsgId)
    }

    fn reject_debug_msgid(&self, target: &Target, msgid: Option<&str>) -> LogResult<()> {
        match msgid {
            None => Ok(()),
            Some(msgid) => {
                self.report(
                    target,
                    format_args!(
                        "DBGLVL_MSGID {{\"MSGID\":\"{msgid}\"}} MSGID should be NULL for debug level"
                    ),
                );
                Err(LogError::InvalidFormat)
            }
        }
    }

    fn report_empty_msgid(&self, target: &Target, text: &str) -> LogError {
        self.report(
            target,
            format_args!(
                "EMPTY_MSGID {{\"MESSAGE\":\"{} ...\"}} MSGID must not be empty",
                line::escaped_snippet(text)
            ),
        );
        LogError::EmptyMsgId
    }

    fn check_json(&self, target: &Target, msgid: Option<&str>, text: &str, boundary: JsonBoundary) -> LogResult<()> {
        let Err(problem) = payload::validate_json_prefix(text, boundary) else {
            return Ok(());
        };
        self.report(
            target,
            format_args!(
                "INVALID_JSON {{\"MSGID\":\"{}\", \"CAUSE\":\"{}\",\"JSON\":\"{} ...\"}}",
                msgid.unwrap_or("NULL"),
                problem.cause(),
                line::escaped_snippet(text)
            ),
        );
        Err(LogError::InvalidFormat)
    }

    fn check_keys(&self, target: &Target, message: &KeyedMessage<'_>) -> LogResult<()> {
        let msgid = message.msgid.unwrap_or("NULL");
        let keys_ok = match payload::validate_keys(message.kv_count, message.keys) {
            Ok(()) => true,
            Err(KeyProblem::InvalidChar { key, ch }) => {
                self.diagnostics().error(
                    &target.component,
                    "[]",
                    format_args!(
                        "INVALID_KEY {{\"MSGID\":\"{msgid}\",\"KEY\":{key},\"INVALID_CHAR\":\"{ch}\"}}"
                    ),
                );
                false
            }
            Err(KeyProblem::NoKeys) => {
                self.diagnostics().error(
                    &target.component,
                    "[]",
                    format_args!("MISSING_KV {{\"MSGID\":\"{msgid}\"}}"),
                );
                false
            }
            Err(KeyProblem::Missing | KeyProblem::CountMismatch { .. }) => false,
        };
        if keys_ok && payload::validate_format(message.flags, message.kv_count, message.formats) {
            return Ok(());
        }
        self.report(target, format_args!("MISMATCHED_FMT {{\"MSGID\":\"{msgid}\"}}"));
        Err(LogError::InvalidFormat)
    }

    /// Renders a payload into the fixed-capacity buffer, warning when it
    /// had to be cut.
    fn render(&self, target: &Target, msgid: Option<&str>, args: fmt::Arguments<'_>) -> LogResult<FormattedLine> {
        let shown = msgid.unwrap_or("NULL");
        let Ok(line) = line::format_capped(args, PAYLOAD_CAPACITY) else {
            self.report(
                target,
                format_args!("VSNPRN_ERR {{\"MSGID\":\"{shown}\",\"ERR_STR\":\"formatting failed\"}}"),
            );
            return Err(LogError::FormatStringFailed);
        };
        if line.truncated {
            self.diagnostics().warning(
                &target.component,
                &target.pidtid,
                format_args!(
                    "MSG_TRUNCATED {{\"MSGID\":\"{shown}\",\"CAUSE\":\"Log message exceeded 1024 bytes\",\"TRUNCATED_MSG\":\"{} ...\"}}",
                    line::escaped_snippet(&line.text)
                ),
            );
        }
        Ok(line)
    }

    /// Writes one accepted line. A payload that is a library command runs
    /// the command instead. `errno` is restored on return.
    fn dispatch(&self, target: &Target, level: Level, msgid: Option<&str>, payload: &str) -> LogResult<()> {
        let _errno = ErrnoGuard::save();

        if let Some(command) = AdminCommand::parse(payload) {
            self.run(command);
            return Ok(());
        }

        let priority = SyslogPriority::from_severity(level.as_i32()).ok_or(LogError::InvalidLevel)?;
        let line = format!(
            "{} {} {} {} {}",
            target.pidtid,
            self.options.identifier,
            target.component,
            msgid.unwrap_or_default(),
            payload
        );
        self.sink.syslog(priority, &line);

        if target.flags.contains(ContextFlags::LOG_TO_CONSOLE) {
            let ranges = self.registry.console_ranges();
            let echo = format!(
                "{}{} {} {}",
                process::program_name(),
                target.pidtid,
                target.component,
                payload
            );
            let line_mode = LineMode::for_line(payload);
            if ranges.stderr_contains(level) {
                self.sink.console(ConsoleStream::Stderr, &echo, line_mode);
            }
            if ranges.stdout_contains(level) {
                self.sink.console(ConsoleStream::Stdout, &echo, line_mode);
            }
        }
        Ok(())
    }

    fn run(&self, command: AdminCommand) {
        match command {
            AdminCommand::ReloadConfig => {
                let found_default = self.reload();
                tracing::debug!(found_default, "configuration reloaded on request");
            }
        }
    }
}
