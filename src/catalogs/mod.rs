//! # Catalog readers
//!
//! Sequential readers for the two fixed-width ASCII catalog formats:
//!
//! - [`ssc_reader`] — SSC coordinate/velocity catalogs (header + two lines
//!   per station), and linear extrapolation to a target epoch.
//! - [`psd_reader`] — post-seismic deformation catalogs (three lines per
//!   station, one per East/North/Up component), and correction accumulation.
//!
//! ## Drifting offsets
//!
//! Both formats mix nominal fixed columns with **free-width numeric tokens**:
//! only the first few anchor fields sit at fixed offsets, after which each
//! numeric field starts wherever the previous one actually ended. The shared
//! [`FieldCursor`] therefore tracks the characters *consumed* by each
//! conversion (leading blanks plus the token itself) and accumulates the line
//! position from that, never from nominal column boundaries.

pub mod psd_reader;
pub mod ssc_reader;

use std::io::BufRead;

use crate::terrapos_errors::TerraposError;

/// Read one physical line, stripping the trailing newline. `Ok(None)` at end
/// of stream.
pub(crate) fn next_line<R: BufRead>(stream: &mut R) -> Result<Option<String>, TerraposError> {
    let mut line = String::with_capacity(160);
    if stream.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Cursor-based decoder for a sequence of free-width numeric fields.
///
/// Mirrors the consume-and-advance contract of C-style string-to-number
/// conversion: each successful read advances the cursor past the leading
/// whitespace and the digits it consumed, so subsequent fields are located
/// relative to the real end of the previous one.
pub(crate) struct FieldCursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    /// A cursor over `line`, starting at byte offset `start`.
    pub(crate) fn new(line: &'a str, start: usize) -> Self {
        Self { line, pos: start }
    }

    /// Current byte offset into the line. Only the consumed-width assertions
    /// need it.
    #[cfg(test)]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Reposition the cursor to an absolute byte offset.
    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Byte offset of the next occurrence of `c` at or after the cursor.
    pub(crate) fn find(&self, c: char) -> Option<usize> {
        self.line.get(self.pos..)?.find(c).map(|i| self.pos + i)
    }

    /// Read the next whitespace-delimited token as an `f64`, advancing the
    /// cursor past it. Returns the offending token text on parse failure and
    /// `Err("")` when the line is exhausted.
    pub(crate) fn next_f64(&mut self) -> Result<f64, &'a str> {
        let token = self.next_token().ok_or("")?;
        token.parse::<f64>().map_err(|_| token)
    }

    /// Next whitespace-delimited token, or `None` at end of line.
    fn next_token(&mut self) -> Option<&'a str> {
        let rest = self.line.get(self.pos..)?;
        let skip = rest.len() - rest.trim_start().len();
        let start = self.pos + skip;
        let trimmed = &self.line[start..];
        if trimmed.is_empty() {
            return None;
        }
        let len = trimmed
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(trimmed.len());
        self.pos = start + len;
        Some(&trimmed[..len])
    }
}

/// The maximal run of ASCII digits starting at `start` (empty when `start`
/// is out of bounds or the first character is not a digit).
pub(crate) fn digit_run(line: &str, start: usize) -> &str {
    let Some(rest) = line.get(start..) else {
        return "";
    };
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    &rest[..len]
}
