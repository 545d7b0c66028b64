//! Character-level scanning.
//!
//! The scanner owns the cursor over the source bytes and the character
//! classes of the grammar:
//! - Indentation characters (tab, space)
//! - String literal delimiters (`'`, `"`)
//! - Identifier characters (ASCII alphanumerics and `_`)
//! - Digit-leading number tokens
//!
//! Every syntactic character is ASCII, so the engine walks bytes and only
//! ever slices the source at ASCII boundaries.

use crate::error::Location;

pub const HINT_CHAR: u8 = b':';
pub const ASSIGN_CHAR: u8 = b'=';
pub const OBJECT_CHAR: u8 = b'#';
pub const COMMENT_CHAR: u8 = b';';

/// Position of the engine in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    /// Byte offset into the source.
    pub pos: usize,
    /// 1-based line number.
    pub row: usize,
    /// 1-based character column.
    pub col: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            pos: 0,
            row: 1,
            col: 1,
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.row, self.col)
    }

    /// Step over `count` bytes on the current line.
    pub fn advance(&mut self, bytes: &[u8], count: usize) {
        for _ in 0..count {
            self.pos += 1;
            // UTF-8 continuation bytes belong to the character already counted.
            if bytes.get(self.pos).map_or(true, |&b| !is_continuation(b)) {
                self.col += 1;
            }
        }
    }

    /// Step over a line feed at the cursor onto the next line.
    pub fn next_line(&mut self) {
        self.pos += 1;
        self.row += 1;
        self.col = 1;
    }

    /// Move to the byte offset `pos` on the current line without counting
    /// columns. Used when discarding a comment.
    pub fn skip_to(&mut self, pos: usize) {
        self.pos = pos;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

pub fn is_indent_char(b: u8) -> bool {
    b == b'\t' || b == b' '
}

pub fn is_quote_char(b: u8) -> bool {
    b == b'\'' || b == b'"'
}

pub fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0B
}

/// Offset of the next line feed at or after `from`.
pub fn find_line_end(bytes: &[u8], from: usize) -> Option<usize> {
    bytes[from..].iter().position(|&b| b == b'\n').map(|i| from + i)
}

/// Length of the digit-leading number token at the start of `s`.
///
/// Accepts `digits [. digits*] [(e|E) [+|-] digits+]` and consumes the
/// longest valid prefix, so an exponent marker without digits is left in
/// place. Returns 0 when `s` does not start with a digit.
pub fn number_len(s: &[u8]) -> usize {
    let digits = |from: usize| s[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut len = digits(0);
    if len == 0 {
        return 0;
    }
    if s.get(len) == Some(&b'.') {
        len += 1 + digits(len + 1);
    }
    if matches!(s.get(len), Some(b'e' | b'E')) {
        let mut exp = len + 1;
        if matches!(s.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            len = exp + exp_digits;
        }
    }
    len
}
