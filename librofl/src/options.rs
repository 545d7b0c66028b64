//! Parser configuration.
//!
//! ```rust
//! use librofl::ParseOptions;
//!
//! let options = ParseOptions::new().with_max_nesting(8).with_max_values(3).quiet();
//! assert_eq!(options.max_nesting, 8);
//! assert!(options.quiet);
//! ```

/// Default bound on the object chain length.
pub const DEFAULT_MAX_NESTING: usize = 100;

/// Default bound on the number of values in one member.
pub const DEFAULT_MAX_VALUES: usize = 100;

/// Limits and diagnostics settings for a single parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum number of entries in the object chain. A line at depth
    /// `max_nesting` or deeper fails with a capacity error.
    pub max_nesting: usize,
    /// Maximum number of values a single member may hold.
    pub max_values: usize,
    /// Suppress diagnostic emission. The returned error is unaffected.
    pub quiet: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_nesting: DEFAULT_MAX_NESTING,
            max_values: DEFAULT_MAX_VALUES,
            quiet: false,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    #[must_use]
    pub fn with_max_values(mut self, max_values: usize) -> Self {
        self.max_values = max_values;
        self
    }

    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Shorthand for `with_quiet(true)`.
    #[must_use]
    pub fn quiet(self) -> Self {
        self.with_quiet(true)
    }
}
