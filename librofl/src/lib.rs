//! ROFL parser implementation.
//!
//! ROFL is a small configuration format in which indentation nests named
//! objects and every other line assigns one or more values to a member:
//!
//! ```text
//! # Window              ; an object
//! title = 'Main'
//! size : Vec2 = 640 480 ; a member with a hint
//!   # Border            ; nested one level deeper
//!   width = 2
//! ```
//!
//! # Parsing Model
//!
//! The parser makes a single pass over the text and never builds a tree.
//! Each member line is delivered to a callback as soon as it is complete,
//! together with the chain of objects it belongs to. Aggregating the data
//! is up to the caller.
//!
//! - **Scanner**: cursor and character classes of the grammar.
//! - **Indentation**: nesting depth derived from a per-document indent
//!   factor and indent character.
//! - **Engine**: the line-oriented state machine that reads object names,
//!   member names, hints and values and dispatches members.
//!
//! Names, hints and strings are slices of the input. A member's value
//! slices and object chain are only valid for the duration of the callback.

mod error;
mod indent;
mod member;
mod options;
mod parser;
mod scanner;

pub use error::{CapacityError, ErrorCategory, Location, ParseError, Result, SyntaxError};
pub use member::{Member, Rejection, RejectionKind, Values};
pub use options::{ParseOptions, DEFAULT_MAX_NESTING, DEFAULT_MAX_VALUES};

/// Parse a ROFL document with the default limits, calling `callback` once
/// per member in document order.
///
/// When `quiet` is false, a failure is also emitted as a `tracing` error
/// event. Returning a [`Rejection`] from the callback stops the parse and
/// surfaces it as [`ParseError::Rejected`].
///
/// # Example
///
/// ```
/// let mut sizes = Vec::new();
/// librofl::parse("#Window\nsize = 640 480\n", |member| {
///     sizes.extend_from_slice(member.numbers());
///     Ok(())
/// }, true)
/// .unwrap();
/// assert_eq!(sizes, vec![640.0, 480.0]);
/// ```
pub fn parse<'a, F>(text: &'a str, callback: F, quiet: bool) -> Result<()>
where
    F: FnMut(&Member<'_, 'a>) -> std::result::Result<(), Rejection>,
{
    parse_with_options(text, &ParseOptions::new().with_quiet(quiet), callback)
}

/// Parse a ROFL document with explicit limits.
///
/// ```
/// use librofl::{ErrorCategory, ParseOptions};
///
/// let options = ParseOptions::new().with_max_values(2).quiet();
/// let err = librofl::parse_with_options("#A\nv = 1 2 3\n", &options, |_| Ok(())).unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Internal);
/// ```
pub fn parse_with_options<'a, F>(text: &'a str, options: &ParseOptions, callback: F) -> Result<()>
where
    F: FnMut(&Member<'_, 'a>) -> std::result::Result<(), Rejection>,
{
    parser::parse(text, options, callback)
}
