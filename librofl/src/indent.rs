//! Indentation tracking.
//!
//! The first indented line fixes both the indent character (tab or space)
//! and the indent factor, the number of characters per nesting level. Every
//! later line must use the same character and a width that is a multiple
//! of the factor. Depth moves by at most one level deeper per line but may
//! drop any number of levels.

use std::cmp::Ordering;

use crate::error::SyntaxError;

/// How the depth of a line relates to the previous non-blank line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Same,
    /// One level deeper. The object at the new depth must be declared.
    Deeper,
    Shallower,
}

#[derive(Clone, Debug, Default)]
pub struct Indentation {
    /// Indent characters seen so far on the current line.
    width: usize,
    /// Depth of the last non-blank line.
    depth: usize,
    /// Characters per nesting level; 0 until the first indented line.
    factor: usize,
    /// The document's indent character, once seen.
    ch: Option<u8>,
}

impl Indentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Count one indent character at the start of the current line.
    pub fn push(&mut self, c: u8) -> Result<(), SyntaxError> {
        match self.ch {
            None => self.ch = Some(c),
            Some(ch) if ch != c => return Err(SyntaxError::MixedIndentation),
            Some(_) => {}
        }
        self.width += 1;
        Ok(())
    }

    /// The first non-indent character of the line was reached: derive the
    /// line's depth from the measured width.
    pub fn settle(&mut self) -> Result<Step, SyntaxError> {
        if self.width > 0 && self.factor == 0 {
            self.factor = self.width;
            tracing::debug!(factor = self.factor, "indent factor fixed");
        }

        let depth = if self.width == 0 {
            0
        } else if self.width % self.factor != 0 {
            return Err(SyntaxError::InvalidIndentation);
        } else {
            self.width / self.factor
        };

        let step = match depth.cmp(&self.depth) {
            Ordering::Equal => Step::Same,
            Ordering::Less => Step::Shallower,
            Ordering::Greater if depth == self.depth + 1 => Step::Deeper,
            Ordering::Greater => return Err(SyntaxError::SkippedNestingLevel),
        };
        self.depth = depth;
        Ok(step)
    }

    /// Forget the width measured on the current line. Blank lines end here
    /// without settling, so they never move the depth.
    pub fn reset_line(&mut self) {
        self.width = 0;
    }
}
