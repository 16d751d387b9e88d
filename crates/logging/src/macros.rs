//! crates/logging/src/macros.rs
//! Call-site macros for the keyed, debug and legacy APIs.
//!
//! Each macro expands to a single method call so the key list, format
//! descriptor and rendered values live exactly as long as the call.

/// Logs a keyed message through [`Logger::log_kv`](crate::Logger::log_kv).
///
/// Keys are string literals; values are anything implementing
/// `serde::Serialize` and are rendered as JSON. Without a key block the
/// payload becomes `{} text`.
///
/// # Example
/// ```
/// use logging::{Level, Logger, Options, log_kv};
/// use logging_sink::MemorySink;
///
/// let logger = Logger::local(Options::default(), MemorySink::new());
/// let ctx = logger.context(Some("APP")).unwrap();
/// let user = "ada";
/// log_kv!(logger, ctx, Level::Error, "LOGIN_FAIL", { "USER" => user, "TRIES" => 3 }, "locked out")
///     .unwrap();
/// log_kv!(logger, ctx, Level::Error, "SHUTDOWN", "bye {}", 42).unwrap();
/// ```
#[macro_export]
macro_rules! log_kv {
    ($logger:expr, $ctx:expr, $level:expr, $msgid:expr, { $($key:literal => $value:expr),+ $(,)? }, $($fmt:tt)+) => {
        $crate::__keyed!($logger, $ctx, $level, $msgid, $crate::FormatFlags::empty(), { $($key => $value),+ }, $($fmt)+)
    };
    ($logger:expr, $ctx:expr, $level:expr, $msgid:expr, $($fmt:tt)+) => {
        $logger.log_kv(
            $ctx,
            $level,
            &$crate::KeyedMessage::plain(
                ::core::convert::Into::<::core::option::Option<&str>>::into($msgid),
                ::core::format_args!($($fmt)+),
            ),
        )
    };
}

/// Like [`log_kv!`] but prefixes the keys with a monotonic `CLOCK` value.
///
/// # Example
/// ```
/// use logging::{Level, Logger, Options, log_kv_with_clock};
/// use logging_sink::MemorySink;
///
/// let logger = Logger::local(Options::default(), MemorySink::new());
/// let ctx = logger.context(Some("APP")).unwrap();
/// log_kv_with_clock!(logger, ctx, Level::Notice, "TICK", { "N" => 1 }, "tick").unwrap();
/// ```
#[macro_export]
macro_rules! log_kv_with_clock {
    ($logger:expr, $ctx:expr, $level:expr, $msgid:expr, { $($key:literal => $value:expr),+ $(,)? }, $($fmt:tt)+) => {
        $crate::__keyed!($logger, $ctx, $level, $msgid, $crate::FormatFlags::WITH_CLOCK, { $($key => $value),+ }, $($fmt)+)
    };
}

/// Logs free text at debug level. Debug lines carry no message-id and no
/// keys.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $ctx:expr, $($fmt:tt)+) => {
        $logger.log_kv(
            $ctx,
            $crate::Level::Debug,
            &$crate::KeyedMessage::plain(::core::option::Option::None, ::core::format_args!($($fmt)+)),
        )
    };
}

/// Logs unstructured text through the legacy context, see
/// [`Logger::print`](crate::Logger::print).
#[macro_export]
macro_rules! log_print {
    ($logger:expr, $ctx:expr, $level:expr, $($fmt:tt)+) => {
        $logger.print($ctx, $level, ::core::format_args!($($fmt)+))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __keyed {
    ($logger:expr, $ctx:expr, $level:expr, $msgid:expr, $flags:expr, { $($key:literal => $value:expr),+ }, $($fmt:tt)+) => {
        $logger.log_kv(
            $ctx,
            $level,
            &$crate::KeyedMessage {
                msgid: ::core::convert::Into::<::core::option::Option<&str>>::into($msgid),
                kv_count: <[&str]>::len(&[$($key),+]),
                keys: ::core::option::Option::Some($crate::key_list(&[$($key),+]).as_str()),
                formats: ::core::option::Option::Some(
                    $crate::format_descriptor(<[&str]>::len(&[$($key),+]), $flags).as_str(),
                ),
                flags: $flags,
                args: ::core::format_args!(
                    "{}",
                    $crate::KeyValueBody::new(
                        &[$($key),+],
                        &[$(&$crate::JsonValue(&($value)) as &dyn ::core::fmt::Display),+],
                        $flags,
                        ::core::format_args!($($fmt)+),
                    )
                ),
            },
        )
    };
}
