//! crates/logging/src/dump.rs
//!
//! Offset/hex/ASCII rendering of binary data, one line per 16 bytes:
//!
//! ```text
//! 000030C0  02 02 00 00 06 00 00 00  02 06 00 00 06 00 00 41  |...............A|
//! ```

/// Bytes shown per dump line.
pub const BYTES_PER_LINE: usize = 16;

/// Length of a full dump line: offset, gap, hex columns with the middle
/// gap, gap and the delimited ASCII column.
pub const FULL_LINE_LEN: usize = 8 + 2 + BYTES_PER_LINE * 3 + 2 + 1 + BYTES_PER_LINE + 1;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Layout of [`Logger::dump_data`](crate::Logger::dump_data) output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DumpFormat {
    /// `hexdump -C` style offset, hex and ASCII columns.
    #[default]
    OffsetHexAscii,
}

/// Renders the dump line for `chunk` starting at `offset`.
///
/// # Panics
///
/// Panics if a full chunk does not render to exactly [`FULL_LINE_LEN`]
/// bytes, which would mean the layout constants are inconsistent.
pub(crate) fn render_line(offset: usize, chunk: &[u8]) -> String {
    let mut line = String::with_capacity(FULL_LINE_LEN);
    line.push_str(&format!("{offset:08X}"));
    line.push_str("  ");

    for index in 0..BYTES_PER_LINE {
        if index == 8 {
            line.push(' ');
        }
        match chunk.get(index) {
            Some(&byte) => {
                line.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
                line.push(char::from(HEX_DIGITS[usize::from(byte & 0x0f)]));
            }
            None => line.push_str("  "),
        }
        line.push(' ');
    }

    line.push(' ');
    line.push('|');
    line.extend(chunk.iter().map(|&byte| {
        if (0x20..=0x7e).contains(&byte) {
            char::from(byte)
        } else {
            '.'
        }
    }));
    line.push('|');

    assert!(
        chunk.len() < BYTES_PER_LINE || line.len() == FULL_LINE_LEN,
        "dump line has length {} instead of {FULL_LINE_LEN}",
        line.len()
    );
    line
}

/// Dump lines for `data`, in order.
pub(crate) fn lines(data: &[u8]) -> impl Iterator<Item = String> + '_ {
    data.chunks(BYTES_PER_LINE)
        .enumerate()
        .map(|(index, chunk)| render_line(index * BYTES_PER_LINE, chunk))
}
