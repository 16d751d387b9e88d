//! crates/logging/src/command.rs
//! Administrative commands embedded in log payloads.

/// Prefix that marks a payload as a library command.
pub const COMMAND_PREFIX: &str = "!loglib ";

/// A recognised library command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdminCommand {
    /// Re-read configuration (`!loglib loadconf`).
    ReloadConfig,
}

impl AdminCommand {
    /// Recognises `payload` as a command. Anything else, including an
    /// unknown command after the prefix, is an ordinary payload.
    pub fn parse(payload: &str) -> Option<Self> {
        match payload.strip_prefix(COMMAND_PREFIX)? {
            "loadconf" => Some(Self::ReloadConfig),
            _ => None,
        }
    }

    /// The payload that triggers this command.
    pub const fn payload(self) -> &'static str {
        match self {
            Self::ReloadConfig => "!loglib loadconf",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_reload() {
        assert_eq!(AdminCommand::parse("!loglib loadconf"), Some(AdminCommand::ReloadConfig));
        assert_eq!(
            AdminCommand::parse(AdminCommand::ReloadConfig.payload()),
            Some(AdminCommand::ReloadConfig)
        );
    }

    #[test]
    fn near_misses_are_payloads() {
        assert_eq!(AdminCommand::parse("!loglib loadconf "), None);
        assert_eq!(AdminCommand::parse("!loglib unknown"), None);
        assert_eq!(AdminCommand::parse("loadconf"), None);
        assert_eq!(AdminCommand::parse("{} !loglib loadconf"), None);
    }
}
