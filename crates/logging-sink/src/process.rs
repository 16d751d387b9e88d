//! crates/logging-sink/src/process.rs
//!
//! Process identity helpers used when tagging lines: pid/tid tags, the
//! program name, the full command line and a monotonic timestamp.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use nix::time::{ClockId, clock_gettime};
use nix::unistd::{getpid, gettid};

/// Returns the current process id.
pub fn pid() -> i32 {
    getpid().as_raw()
}

/// Returns the kernel thread id of the calling thread.
pub fn tid() -> i32 {
    gettid().as_raw()
}

/// Builds the bracketed pid/tid tag that prefixes every line.
///
/// `[pid:tid]` when thread ids are requested and the caller is not the main
/// thread, `[pid]` when either id is requested, `[]` otherwise.
///
/// # Examples
///
/// ```
/// use logging_sink::process::pid_tid_tag;
///
/// assert_eq!(pid_tid_tag(false, false), "[]");
/// assert!(pid_tid_tag(true, false).starts_with('['));
/// ```
pub fn pid_tid_tag(log_process_ids: bool, log_thread_ids: bool) -> String {
    if !log_process_ids && !log_thread_ids {
        return String::from("[]");
    }

    let pid = pid();
    let tid = tid();
    if log_thread_ids && tid != pid {
        format!("[{pid}:{tid}]")
    } else {
        format!("[{pid}]")
    }
}

/// Returns the short program name (basename of `argv[0]`).
pub fn program_name() -> &'static str {
    static NAME: OnceLock<String> = OnceLock::new();
    NAME.get_or_init(|| {
        std::env::args_os()
            .next()
            .as_deref()
            .map(Path::new)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    })
}

/// Reads the process command line with argument separators turned into
/// spaces, capped at `max_len` bytes. Returns an empty string when
/// `/proc/self/cmdline` is unavailable.
pub fn command_line(max_len: usize) -> String {
    let Ok(mut raw) = fs::read("/proc/self/cmdline") else {
        return String::new();
    };
    raw.truncate(max_len);
    for byte in &mut raw {
        if *byte == 0 {
            *byte = b' ';
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

/// Monotonic clock reading as `(seconds, nanoseconds)`.
pub fn monotonic_clock() -> (i64, i64) {
    clock_gettime(ClockId::CLOCK_MONOTONIC)
        .map(|now| (now.tv_sec(), now.tv_nsec()))
        .unwrap_or((0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_empty_brackets_without_flags() {
        assert_eq!(pid_tid_tag(false, false), "[]");
    }

    #[test]
    fn tag_contains_pid_when_requested() {
        assert_eq!(pid_tid_tag(true, false), format!("[{}]", pid()));
    }

    #[test]
    fn tag_contains_tid_on_spawned_thread() {
        let pid = pid();
        let tag = std::thread::spawn(|| (tid(), pid_tid_tag(false, true)))
            .join()
            .expect("thread joins");
        assert_eq!(tag.1, format!("[{pid}:{}]", tag.0));
    }

    #[test]
    fn command_line_respects_cap() {
        let line = command_line(8);
        assert!(line.len() <= 8);
    }

    #[test]
    fn monotonic_clock_advances() {
        let first = monotonic_clock();
        let second = monotonic_clock();
        assert!(second >= first);
    }
}
