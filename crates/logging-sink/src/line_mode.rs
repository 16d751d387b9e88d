//! crates/logging-sink/src/line_mode.rs

/// Controls whether a console write is terminated with a newline.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum LineMode {
    /// Append `\n` after the line.
    #[default]
    WithNewline,
    /// Write the line verbatim.
    WithoutNewline,
}

impl LineMode {
    /// Picks the mode that leaves `line` ending in exactly one newline of its
    /// own making: lines that already end with `\n` are written verbatim.
    ///
    /// ```
    /// use logging_sink::LineMode;
    ///
    /// assert_eq!(LineMode::for_line("done"), LineMode::WithNewline);
    /// assert_eq!(LineMode::for_line("done\n"), LineMode::WithoutNewline);
    /// ```
    pub fn for_line(line: &str) -> Self {
        if line.ends_with('\n') {
            Self::WithoutNewline
        } else {
            Self::WithNewline
        }
    }

    /// Reports whether this mode appends a newline.
    pub const fn append_newline(self) -> bool {
        matches!(self, Self::WithNewline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_appends_newline() {
        assert!(LineMode::default().append_newline());
        assert!(!LineMode::WithoutNewline.append_newline());
    }

    #[test]
    fn empty_line_gets_newline() {
        assert_eq!(LineMode::for_line(""), LineMode::WithNewline);
    }
}
