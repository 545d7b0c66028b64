//! Members as delivered to the callback, and the value accumulator behind
//! them.

use std::fmt;

use thiserror::Error;

use crate::error::{CapacityError, Fault, SyntaxError};

/// Caller-defined reason for aborting a parse from the callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// The member name is not one the caller accepts.
    UnexpectedMember,
    /// The values or hint do not fit what the caller expects.
    UnexpectedValue,
    Other,
}

/// Returned by a callback to stop the parse. The engine forwards it
/// unchanged inside [`ParseError::Rejected`](crate::ParseError::Rejected).
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct Rejection {
    pub kind: RejectionKind,
    pub message: String,
}

impl Rejection {
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unexpected_member(message: impl Into<String>) -> Self {
        Self::new(RejectionKind::UnexpectedMember, message)
    }

    pub fn unexpected_value(message: impl Into<String>) -> Self {
        Self::new(RejectionKind::UnexpectedValue, message)
    }
}

/// The values of one member: all numbers or all strings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Values<'m, 'a> {
    Numbers(&'m [f64]),
    Strings(&'m [&'a str]),
}

impl Values<'_, '_> {
    pub fn len(&self) -> usize {
        match self {
            Values::Numbers(n) => n.len(),
            Values::Strings(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One parsed member line.
///
/// Names, hints and strings borrow the input text (`'a`) and may be kept
/// for as long as the input lives. The object chain and value slices borrow
/// engine storage (`'m`) that is reused on the next line; copy them during
/// the callback if they are needed afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Member<'m, 'a> {
    pub(crate) objects: &'m [&'a str],
    pub(crate) name: &'a str,
    pub(crate) hint: Option<&'a str>,
    pub(crate) numbers: &'m [f64],
    pub(crate) strings: &'m [&'a str],
}

impl<'m, 'a> Member<'m, 'a> {
    /// Declared objects in scope, outermost first. Always `depth() + 1`
    /// entries long.
    pub fn objects(&self) -> &'m [&'a str] {
        self.objects
    }

    /// Nest count: the number of ancestor objects above the innermost one.
    pub fn depth(&self) -> usize {
        self.objects.len() - 1
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn hint(&self) -> Option<&'a str> {
        self.hint
    }

    /// Empty when the member holds strings.
    pub fn numbers(&self) -> &'m [f64] {
        self.numbers
    }

    /// Empty when the member holds numbers.
    pub fn strings(&self) -> &'m [&'a str] {
        self.strings
    }

    pub fn values(&self) -> Values<'m, 'a> {
        if self.strings.is_empty() {
            Values::Numbers(self.numbers)
        } else {
            Values::Strings(self.strings)
        }
    }
}

/// Canonical one-line form: `A.B.name: Hint = 1 2 'three'`.
impl fmt::Display for Member<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for object in self.objects {
            write!(f, "{}.", object)?;
        }
        f.write_str(self.name)?;
        if let Some(hint) = self.hint {
            write!(f, ": {}", hint)?;
        }
        f.write_str(" =")?;
        for n in self.numbers {
            write!(f, " {}", n)?;
        }
        for s in self.strings {
            let quote = if s.contains('\'') { '"' } else { '\'' };
            write!(f, " {quote}{s}{quote}")?;
        }
        Ok(())
    }
}

/// Bounded per-line value storage. Buffers are kept across lines so a
/// parse allocates at most up to the configured limit.
#[derive(Debug)]
pub(crate) struct ValueSet<'a> {
    limit: usize,
    numbers: Vec<f64>,
    strings: Vec<&'a str>,
}

impl<'a> ValueSet<'a> {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            numbers: Vec::new(),
            strings: Vec::new(),
        }
    }

    pub(crate) fn numbers(&self) -> &[f64] {
        &self.numbers
    }

    pub(crate) fn strings(&self) -> &[&'a str] {
        &self.strings
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.numbers.is_empty() && self.strings.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.numbers.clear();
        self.strings.clear();
    }

    fn reserve_slot(&self, len: usize) -> Result<(), Fault> {
        if len >= self.limit {
            return Err(CapacityError::TooManyValues { limit: self.limit }.into());
        }
        Ok(())
    }

    pub(crate) fn push_number(&mut self, n: f64) -> Result<(), Fault> {
        if !self.strings.is_empty() {
            return Err(SyntaxError::HoldsStrings.into());
        }
        self.reserve_slot(self.numbers.len())?;
        self.numbers.push(n);
        Ok(())
    }

    /// Check that a string may be opened, before its content is read.
    pub(crate) fn check_string(&self) -> Result<(), Fault> {
        if !self.numbers.is_empty() {
            return Err(SyntaxError::HoldsNumbers.into());
        }
        self.reserve_slot(self.strings.len())
    }

    pub(crate) fn push_string(&mut self, s: &'a str) {
        self.strings.push(s);
    }
}
