//! crates/logging/src/msgid.rs
//! Message-id rules for non-debug lines.

/// Longest accepted message-id, in bytes.
pub const MAX_MSGID_LEN: usize = 31;

/// Message-id stamped on every debug-level line.
pub const DEBUG_MSGID: &str = "DBGMSG";

const FORBIDDEN: [char; 3] = [' ', '{', '}'];

/// Why a message-id was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MsgIdProblem {
    /// No message-id was supplied.
    Missing,
    /// Longer than [`MAX_MSGID_LEN`].
    TooLong,
    /// Contains a space, `{` or `}`.
    ForbiddenChar,
    /// Zero length.
    Empty,
}

/// Classifies `msgid`, scanning left to right; the first offending
/// position decides between [`MsgIdProblem::TooLong`] and
/// [`MsgIdProblem::ForbiddenChar`].
pub(crate) fn check(msgid: Option<&str>) -> Result<(), MsgIdProblem> {
    let msgid = msgid.ok_or(MsgIdProblem::Missing)?;
    for (position, ch) in msgid.char_indices() {
        if position >= MAX_MSGID_LEN {
            return Err(MsgIdProblem::TooLong);
        }
        if FORBIDDEN.contains(&ch) {
            return Err(MsgIdProblem::ForbiddenChar);
        }
    }
    if msgid.is_empty() {
        return Err(MsgIdProblem::Empty);
    }
    Ok(())
}
