//! Error types for ROFL parsing.

use std::fmt;

use thiserror::Error;

use crate::member::{Rejection, RejectionKind};

/// Result type for ROFL parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// A 1-based row/column position in the source text.
///
/// Columns count characters, so a multi-byte character advances the column
/// by one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, col {}", self.row, self.col)
    }
}

/// Malformed input. Always fatal; parsing never resynchronizes.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SyntaxError {
    /// Indent width is not a multiple of the document's indent factor.
    #[error("Invalid indentation.")]
    InvalidIndentation,

    /// Tabs and spaces used for indentation in the same document.
    #[error("Mixed indentation.")]
    MixedIndentation,

    /// Indentation grew by more than one level at once.
    #[error("Indentation skips a nesting level.")]
    SkippedNestingLevel,

    /// Member at a depth with no `#name` declaration.
    #[error("Object is yet to be defined.")]
    ObjectUndefined,

    #[error("Invalid character for an object name.")]
    InvalidObjectChar,

    #[error("There can only be one object name.")]
    MultipleObjectNames,

    #[error("Object name is left blank.")]
    BlankObjectName,

    #[error("Invalid character for a member name.")]
    InvalidMemberChar,

    #[error("There can only be one member name.")]
    MultipleMemberNames,

    /// `:` or `=` before any member name.
    #[error("Expecting a member name.")]
    MissingMemberName,

    #[error("Invalid character for a hint.")]
    InvalidHintChar,

    #[error("There can only be one hint.")]
    MultipleHints,

    /// `=` directly after the hint separator.
    #[error("Expecting a hint.")]
    MissingHint,

    /// Line ended before `=`, or `=` was followed by no values.
    #[error("Member without value is forbidden.")]
    MissingValue,

    /// String after numbers within one member.
    #[error("Member already assigned with number(s).")]
    HoldsNumbers,

    /// Number after strings within one member.
    #[error("Member already assigned with string(s).")]
    HoldsStrings,

    #[error("Unexpected character.")]
    UnexpectedChar,

    #[error("Unterminated string literal.")]
    UnterminatedString,

    /// A scanned number token that `f64` rejects. The number scanner only
    /// yields `digits[.digits][e[+-]digits]`, which always parses.
    #[error("Invalid number.")]
    InvalidNumber,
}

/// A configured bound was exceeded.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CapacityError {
    #[error("Too many nestings (limit {limit}).")]
    TooManyNestings { limit: usize },

    #[error("Too many values (limit {limit}).")]
    TooManyValues { limit: usize },
}

/// Coarse classification of a [`ParseError`], matching the three failure
/// statuses of the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    /// Capacity exceeded (nesting depth or value count).
    Internal,
    /// The member callback aborted the parse.
    Callback(RejectionKind),
}

/// Error type for ROFL parsing.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParseError {
    #[error("{kind} [{at}]")]
    Syntax { kind: SyntaxError, at: Location },

    #[error("{kind} [{at}]")]
    Capacity { kind: CapacityError, at: Location },

    /// Forwarded verbatim from a failing callback.
    #[error("{rejection} [{at}]")]
    Rejected { rejection: Rejection, at: Location },
}

impl ParseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ParseError::Syntax { .. } => ErrorCategory::Syntax,
            ParseError::Capacity { .. } => ErrorCategory::Internal,
            ParseError::Rejected { rejection, .. } => ErrorCategory::Callback(rejection.kind),
        }
    }

    /// Where parsing stopped.
    pub fn location(&self) -> Location {
        match self {
            ParseError::Syntax { at, .. }
            | ParseError::Capacity { at, .. }
            | ParseError::Rejected { at, .. } => *at,
        }
    }
}

/// An error raised by the engine before a location is attached.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Fault {
    Syntax(SyntaxError),
    Capacity(CapacityError),
    Rejected(Rejection),
}

impl Fault {
    /// Attach the position at which parsing stopped.
    pub(crate) fn with_location(self, at: Location) -> ParseError {
        match self {
            Fault::Syntax(kind) => ParseError::Syntax { kind, at },
            Fault::Capacity(kind) => ParseError::Capacity { kind, at },
            Fault::Rejected(rejection) => ParseError::Rejected { rejection, at },
        }
    }
}

impl From<SyntaxError> for Fault {
    fn from(kind: SyntaxError) -> Self {
        Fault::Syntax(kind)
    }
}

impl From<CapacityError> for Fault {
    fn from(kind: CapacityError) -> Self {
        Fault::Capacity(kind)
    }
}

impl From<Rejection> for Fault {
    fn from(rejection: Rejection) -> Self {
        Fault::Rejected(rejection)
    }
}
