//! crates/logging-sink/src/syslog.rs
//!
//! Syslog backend for the system-log sink.
//!
//! Uses libc `openlog`/`syslog`/`closelog` directly rather than pulling in a
//! dedicated syslog crate. The connection is opened lazily on the first write
//! with the program name as ident, so every attached process tags its lines
//! with its own identity while sharing one registry.
#![allow(unsafe_code)]

use std::ffi::CString;
use std::fmt;
use std::sync::OnceLock;

/// Syslog facility codes matching the POSIX syslog(3) constants.
///
/// Each variant corresponds to a `LOG_*` facility from `<syslog.h>`.
/// Configuration maps string names (e.g., `"daemon"`, `"local0"`) to these
/// constants via [`SyslogFacility::from_name`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum SyslogFacility {
    /// Kernel messages (LOG_KERN).
    Kern = libc::LOG_KERN,
    /// User-level messages (LOG_USER), the default for library logging.
    User = libc::LOG_USER,
    /// Mail system (LOG_MAIL).
    Mail = libc::LOG_MAIL,
    /// System daemons (LOG_DAEMON).
    Daemon = libc::LOG_DAEMON,
    /// Security/authorization messages (LOG_AUTH).
    Auth = libc::LOG_AUTH,
    /// Messages generated internally by syslogd (LOG_SYSLOG).
    Syslog = libc::LOG_SYSLOG,
    /// Line printer subsystem (LOG_LPR).
    Lpr = libc::LOG_LPR,
    /// Network news subsystem (LOG_NEWS).
    News = libc::LOG_NEWS,
    /// UUCP subsystem (LOG_UUCP).
    Uucp = libc::LOG_UUCP,
    /// Clock daemon (LOG_CRON).
    Cron = libc::LOG_CRON,
    /// Private security/authorization messages (LOG_AUTHPRIV).
    Authpriv = libc::LOG_AUTHPRIV,
    /// FTP daemon (LOG_FTP).
    Ftp = libc::LOG_FTP,
    /// Reserved for local use (LOG_LOCAL0).
    Local0 = libc::LOG_LOCAL0,
    /// Reserved for local use (LOG_LOCAL1).
    Local1 = libc::LOG_LOCAL1,
    /// Reserved for local use (LOG_LOCAL2).
    Local2 = libc::LOG_LOCAL2,
    /// Reserved for local use (LOG_LOCAL3).
    Local3 = libc::LOG_LOCAL3,
    /// Reserved for local use (LOG_LOCAL4).
    Local4 = libc::LOG_LOCAL4,
    /// Reserved for local use (LOG_LOCAL5).
    Local5 = libc::LOG_LOCAL5,
    /// Reserved for local use (LOG_LOCAL6).
    Local6 = libc::LOG_LOCAL6,
    /// Reserved for local use (LOG_LOCAL7).
    Local7 = libc::LOG_LOCAL7,
}

const FACILITIES: [SyslogFacility; 20] = [
    SyslogFacility::Kern,
    SyslogFacility::User,
    SyslogFacility::Mail,
    SyslogFacility::Daemon,
    SyslogFacility::Auth,
    SyslogFacility::Syslog,
    SyslogFacility::Lpr,
    SyslogFacility::News,
    SyslogFacility::Uucp,
    SyslogFacility::Cron,
    SyslogFacility::Authpriv,
    SyslogFacility::Ftp,
    SyslogFacility::Local0,
    SyslogFacility::Local1,
    SyslogFacility::Local2,
    SyslogFacility::Local3,
    SyslogFacility::Local4,
    SyslogFacility::Local5,
    SyslogFacility::Local6,
    SyslogFacility::Local7,
];

impl SyslogFacility {
    /// Parses a facility label into the corresponding constant.
    ///
    /// Labels are the lowercase names used by syslog.conf(5). Matching is
    /// exact; `None` is returned for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging_sink::SyslogFacility;
    ///
    /// assert_eq!(SyslogFacility::from_name("local3"), Some(SyslogFacility::Local3));
    /// assert_eq!(SyslogFacility::from_name("LOCAL3"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        FACILITIES.into_iter().find(|facility| facility.as_str() == name)
    }

    /// Maps a raw `LOG_*` facility code back to its variant.
    pub fn from_code(code: i32) -> Option<Self> {
        FACILITIES.into_iter().find(|facility| *facility as i32 == code)
    }

    /// Returns the facility label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kern => "kern",
            Self::User => "user",
            Self::Mail => "mail",
            Self::Daemon => "daemon",
            Self::Auth => "auth",
            Self::Syslog => "syslog",
            Self::Lpr => "lpr",
            Self::News => "news",
            Self::Uucp => "uucp",
            Self::Cron => "cron",
            Self::Authpriv => "authpriv",
            Self::Ftp => "ftp",
            Self::Local0 => "local0",
            Self::Local1 => "local1",
            Self::Local2 => "local2",
            Self::Local3 => "local3",
            Self::Local4 => "local4",
            Self::Local5 => "local5",
            Self::Local6 => "local6",
            Self::Local7 => "local7",
        }
    }
}

impl Default for SyslogFacility {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for SyslogFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longest ident handed to `openlog`.
///
/// RFC 3164 keeps the tag short; longer program names are cut so the message
/// body is never pushed out of the datagram.
pub const MAX_IDENT_LEN: usize = 255;

/// Ident used when the program name cannot be represented as a C string.
pub const FALLBACK_SYSLOG_TAG: &str = "sharelog";

/// Configuration for the system-log connection.
///
/// Encapsulates the facility and tag (ident) parameters passed to
/// [`openlog(3)`](libc::openlog). Constructing a [`SyslogConfig`] does not
/// itself open the connection; call [`open`](SyslogConfig::open).
///
/// # Examples
///
/// ```
/// use logging_sink::{SyslogConfig, SyslogFacility};
///
/// let config = SyslogConfig::new(SyslogFacility::Local5, "my-service");
/// assert_eq!(config.facility(), SyslogFacility::Local5);
/// assert_eq!(config.tag(), "my-service");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyslogConfig {
    facility: SyslogFacility,
    tag: String,
}

impl SyslogConfig {
    /// Creates a new syslog configuration with the given facility and tag.
    pub fn new(facility: SyslogFacility, tag: impl Into<String>) -> Self {
        let mut tag = tag.into();
        if tag.len() > MAX_IDENT_LEN {
            let mut end = MAX_IDENT_LEN;
            while !tag.is_char_boundary(end) {
                end -= 1;
            }
            tag.truncate(end);
        }
        Self { facility, tag }
    }

    /// Returns the configured syslog facility.
    pub const fn facility(&self) -> SyslogFacility {
        self.facility
    }

    /// Returns the configured syslog tag (ident string).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Opens the syslog connection with the configured facility and tag.
    ///
    /// The ident pointer must outlive the connection, so the first tag is
    /// stored in a process-wide static and later calls reuse it. Returns a
    /// [`SyslogGuard`] that closes the connection when dropped.
    pub fn open(&self) -> SyslogGuard {
        static IDENT: OnceLock<CString> = OnceLock::new();
        let ident = IDENT.get_or_init(|| {
            CString::new(self.tag.as_str())
                .or_else(|_| CString::new(FALLBACK_SYSLOG_TAG))
                .unwrap_or_default()
        });

        // SAFETY: the ident pointer is valid for the process lifetime because
        // it is stored in a static `OnceLock<CString>`.
        unsafe {
            libc::openlog(ident.as_ptr(), 0, self.facility as libc::c_int);
        }

        SyslogGuard { _private: () }
    }
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self::new(SyslogFacility::default(), FALLBACK_SYSLOG_TAG)
    }
}

/// Syslog priority levels matching POSIX syslog(3) severity constants.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(i32)]
pub enum SyslogPriority {
    /// System is unusable (LOG_EMERG).
    Emergency = libc::LOG_EMERG,
    /// Action must be taken immediately (LOG_ALERT).
    Alert = libc::LOG_ALERT,
    /// Critical conditions (LOG_CRIT).
    Critical = libc::LOG_CRIT,
    /// Error conditions (LOG_ERR).
    Error = libc::LOG_ERR,
    /// Warning conditions (LOG_WARNING).
    Warning = libc::LOG_WARNING,
    /// Normal but significant condition (LOG_NOTICE).
    Notice = libc::LOG_NOTICE,
    /// Informational messages (LOG_INFO).
    Info = libc::LOG_INFO,
    /// Debug-level messages (LOG_DEBUG).
    Debug = libc::LOG_DEBUG,
}

impl SyslogPriority {
    /// Maps a numeric severity (`0..=7`) onto a priority.
    pub const fn from_severity(severity: i32) -> Option<Self> {
        match severity {
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }
}

/// Sends a message to syslog(3) with the given priority.
///
/// The message is sent using the facility configured by the most recent
/// [`SyslogConfig::open`] call; syslog(3) opens a default connection itself
/// when none exists. Messages with embedded NUL bytes are dropped.
pub fn syslog_message(priority: SyslogPriority, message: &str) {
    // syslog(3) interprets `%` as a format specifier, so the message always
    // travels as the argument of a fixed "%s" format.
    let Ok(c_message) = CString::new(message) else {
        return;
    };

    // SAFETY: syslog is safe to call from multiple threads. The format string
    // and message are valid NUL-terminated C strings.
    unsafe {
        libc::syslog(priority as libc::c_int, c"%s".as_ptr(), c_message.as_ptr());
    }
}

/// RAII guard that closes the syslog connection when dropped.
///
/// Created by [`SyslogConfig::open`]. The system sink keeps its guard in a
/// process-wide static so the connection lives as long as the process.
#[derive(Debug)]
pub struct SyslogGuard {
    _private: (),
}

impl Drop for SyslogGuard {
    fn drop(&mut self) {
        // SAFETY: closelog has no preconditions beyond a previous openlog,
        // which the guard construction guarantees.
        unsafe {
            libc::closelog();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_facility_is_user() {
        assert_eq!(SyslogFacility::default(), SyslogFacility::User);
    }

    #[test]
    fn from_name_recognises_every_label() {
        for facility in FACILITIES {
            assert_eq!(
                SyslogFacility::from_name(facility.as_str()),
                Some(facility),
                "failed for facility {facility:?}"
            );
        }
    }

    #[test]
    fn from_name_is_case_sensitive() {
        assert_eq!(SyslogFacility::from_name("DAEMON"), None);
        assert_eq!(SyslogFacility::from_name("Local0"), None);
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(SyslogFacility::from_name("unknown"), None);
        assert_eq!(SyslogFacility::from_name(""), None);
        assert_eq!(SyslogFacility::from_name("local8"), None);
        assert_eq!(SyslogFacility::from_name("LOG_DAEMON"), None);
    }

    #[test]
    fn from_code_matches_libc_constants() {
        assert_eq!(
            SyslogFacility::from_code(libc::LOG_AUTHPRIV),
            Some(SyslogFacility::Authpriv)
        );
        assert_eq!(SyslogFacility::from_code(libc::LOG_FTP), Some(SyslogFacility::Ftp));
        assert_eq!(
            SyslogFacility::from_code(libc::LOG_LOCAL7),
            Some(SyslogFacility::Local7)
        );
        assert_eq!(SyslogFacility::from_code(-1), None);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", SyslogFacility::Local3), "local3");
    }

    #[test]
    fn config_truncates_long_tags() {
        let config = SyslogConfig::new(SyslogFacility::User, "x".repeat(400));
        assert_eq!(config.tag().len(), MAX_IDENT_LEN);
    }

    #[test]
    fn config_default_uses_fallback_tag() {
        let config = SyslogConfig::default();
        assert_eq!(config.facility(), SyslogFacility::User);
        assert_eq!(config.tag(), FALLBACK_SYSLOG_TAG);
    }

    #[test]
    fn priority_from_severity_covers_syslog_range() {
        assert_eq!(SyslogPriority::from_severity(0), Some(SyslogPriority::Emergency));
        assert_eq!(SyslogPriority::from_severity(3), Some(SyslogPriority::Error));
        assert_eq!(SyslogPriority::from_severity(7), Some(SyslogPriority::Debug));
        assert_eq!(SyslogPriority::from_severity(-1), None);
        assert_eq!(SyslogPriority::from_severity(8), None);
    }

    #[test]
    fn priority_values_match_libc_constants() {
        assert_eq!(SyslogPriority::Emergency as i32, libc::LOG_EMERG);
        assert_eq!(SyslogPriority::Warning as i32, libc::LOG_WARNING);
        assert_eq!(SyslogPriority::Debug as i32, libc::LOG_DEBUG);
    }

    #[test]
    fn syslog_message_handles_nul_bytes_gracefully() {
        syslog_message(SyslogPriority::Debug, "before\0after");
    }
}
