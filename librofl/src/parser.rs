//! The parse engine.
//!
//! A single left-to-right pass over the source drives a five-mode state
//! machine. Each line starts in [`Mode::Indent`]; the first non-indent
//! character settles the nesting depth and selects object-declaration or
//! member reading. At every line boundary (line feed, comment marker, end
//! of input) the line is finalized: a completed member is handed to the
//! callback, an object declaration is committed to the object chain.
//!
//! Errors are raised as [`Fault`]s without a position and get the cursor's
//! location attached in [`Engine::run`].

use crate::error::{CapacityError, Fault, Result, SyntaxError};
use crate::indent::{Indentation, Step};
use crate::member::{Member, Rejection, ValueSet};
use crate::options::ParseOptions;
use crate::scanner::{self, Cursor, ASSIGN_CHAR, COMMENT_CHAR, HINT_CHAR, OBJECT_CHAR};

/// What the engine expects next on the current line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Counting indent characters.
    Indent,
    /// After `#`.
    ObjectName,
    MemberName,
    /// After `:`.
    Hint,
    /// After `=`.
    Value,
}

/// An identifier accumulated on the current line.
#[derive(Clone, Copy, Debug, Default)]
struct Word {
    start: usize,
    len: usize,
    /// Whitespace followed the identifier; no more identifier characters
    /// may appear.
    completed: bool,
}

impl Word {
    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.start + self.len]
    }

    /// Feed the byte `c` found at offset `pos`. Leading whitespace is
    /// skipped, trailing whitespace completes the word.
    fn accept(
        &mut self,
        c: u8,
        pos: usize,
        invalid: SyntaxError,
        repeated: SyntaxError,
    ) -> std::result::Result<(), SyntaxError> {
        if scanner::is_space(c) {
            if self.len != 0 {
                self.completed = true;
            }
            return Ok(());
        }
        if !scanner::is_name_char(c) {
            return Err(invalid);
        }
        if self.completed {
            return Err(repeated);
        }
        if self.len == 0 {
            self.start = pos;
        }
        self.len += 1;
        Ok(())
    }
}

/// Parse `text`, delivering every member to `callback` in document order.
pub(crate) fn parse<'a, F>(text: &'a str, options: &ParseOptions, callback: F) -> Result<()>
where
    F: FnMut(&Member<'_, 'a>) -> std::result::Result<(), Rejection>,
{
    let result = Engine::new(text, options, callback).run();
    if let Err(err) = &result {
        if !options.quiet {
            tracing::error!("ROFL Error: {}", err);
        }
    }
    result
}

/// Per-invocation parser state.
struct Engine<'a, F> {
    text: &'a str,
    bytes: &'a [u8],
    max_nesting: usize,
    callback: F,
    cursor: Cursor,
    mode: Mode,
    indent: Indentation,
    /// Declared objects in scope, outermost first.
    objects: Vec<&'a str>,
    object: Word,
    name: Word,
    hint: Word,
    values: ValueSet<'a>,
    /// Opening quote character and content start of an open string literal.
    quote: Option<(u8, usize)>,
}

impl<'a, F> Engine<'a, F>
where
    F: FnMut(&Member<'_, 'a>) -> std::result::Result<(), Rejection>,
{
    fn new(text: &'a str, options: &ParseOptions, callback: F) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            max_nesting: options.max_nesting,
            callback,
            cursor: Cursor::new(),
            mode: Mode::Indent,
            indent: Indentation::new(),
            objects: Vec::new(),
            object: Word::default(),
            name: Word::default(),
            hint: Word::default(),
            values: ValueSet::new(options.max_values),
            quote: None,
        }
    }

    fn run(mut self) -> Result<()> {
        while let Some(&c) = self.bytes.get(self.cursor.pos) {
            self.step(c)
                .map_err(|fault| fault.with_location(self.cursor.location()))?;
        }
        // The last line may end without a line feed.
        self.finish_line()
            .map_err(|fault| fault.with_location(self.cursor.location()))
    }

    fn step(&mut self, c: u8) -> std::result::Result<(), Fault> {
        if self.quote.is_none() {
            if c == COMMENT_CHAR {
                return self.comment();
            }
            if c == b'\r' && self.bytes.get(self.cursor.pos + 1) == Some(&b'\n') {
                self.cursor.skip_to(self.cursor.pos + 1);
                return Ok(());
            }
        }
        if c == b'\n' {
            self.finish_line()?;
            self.next_line();
            return Ok(());
        }
        match self.mode {
            Mode::Indent => self.read_indent(c),
            Mode::ObjectName => self.read_object_name(c),
            Mode::MemberName => self.read_member_name(c),
            Mode::Hint => self.read_hint(c),
            Mode::Value => self.read_value(c),
        }
    }

    /// The line ends at the comment marker; the rest of it is discarded.
    fn comment(&mut self) -> std::result::Result<(), Fault> {
        self.finish_line()?;
        match scanner::find_line_end(self.bytes, self.cursor.pos) {
            Some(end) => {
                self.cursor.skip_to(end);
                self.next_line();
            }
            None => {
                self.cursor.skip_to(self.bytes.len());
                self.reset_line();
            }
        }
        Ok(())
    }

    fn read_indent(&mut self, c: u8) -> std::result::Result<(), Fault> {
        if scanner::is_indent_char(c) {
            self.indent.push(c)?;
            self.cursor.advance(self.bytes, 1);
            return Ok(());
        }

        let step = self.indent.settle()?;
        let depth = self.indent.depth();
        if step == Step::Shallower {
            self.objects.truncate(depth + 1);
        }
        if depth >= self.max_nesting {
            return Err(CapacityError::TooManyNestings {
                limit: self.max_nesting,
            }
            .into());
        }

        if c == OBJECT_CHAR {
            // A declaration at depth d extends a chain of exactly d parents.
            if self.objects.len() < depth {
                return Err(SyntaxError::ObjectUndefined.into());
            }
            self.mode = Mode::ObjectName;
            self.cursor.advance(self.bytes, 1);
            return Ok(());
        }
        if self.objects.len() <= depth {
            return Err(SyntaxError::ObjectUndefined.into());
        }
        // `c` is read again as the start of the member name.
        self.mode = Mode::MemberName;
        Ok(())
    }

    fn read_object_name(&mut self, c: u8) -> std::result::Result<(), Fault> {
        self.object.accept(
            c,
            self.cursor.pos,
            SyntaxError::InvalidObjectChar,
            SyntaxError::MultipleObjectNames,
        )?;
        self.cursor.advance(self.bytes, 1);
        Ok(())
    }

    fn read_member_name(&mut self, c: u8) -> std::result::Result<(), Fault> {
        match c {
            HINT_CHAR | ASSIGN_CHAR => {
                if self.name.is_empty() {
                    return Err(SyntaxError::MissingMemberName.into());
                }
                self.mode = if c == HINT_CHAR {
                    Mode::Hint
                } else {
                    Mode::Value
                };
            }
            _ => self.name.accept(
                c,
                self.cursor.pos,
                SyntaxError::InvalidMemberChar,
                SyntaxError::MultipleMemberNames,
            )?,
        }
        self.cursor.advance(self.bytes, 1);
        Ok(())
    }

    fn read_hint(&mut self, c: u8) -> std::result::Result<(), Fault> {
        if c == ASSIGN_CHAR {
            if self.hint.is_empty() {
                return Err(SyntaxError::MissingHint.into());
            }
            self.mode = Mode::Value;
        } else {
            self.hint.accept(
                c,
                self.cursor.pos,
                SyntaxError::InvalidHintChar,
                SyntaxError::MultipleHints,
            )?;
        }
        self.cursor.advance(self.bytes, 1);
        Ok(())
    }

    fn read_value(&mut self, c: u8) -> std::result::Result<(), Fault> {
        if let Some((quote, start)) = self.quote {
            // Only the opening character closes; backslash is plain content.
            if c == quote {
                self.values.push_string(&self.text[start..self.cursor.pos]);
                self.quote = None;
            }
            self.cursor.advance(self.bytes, 1);
            return Ok(());
        }

        if scanner::is_quote_char(c) {
            self.values.check_string()?;
            self.quote = Some((c, self.cursor.pos + 1));
            self.cursor.advance(self.bytes, 1);
            return Ok(());
        }

        if c.is_ascii_digit() {
            let start = self.cursor.pos;
            let len = scanner::number_len(&self.bytes[start..]);
            let number = self.text[start..start + len]
                .parse::<f64>()
                .map_err(|_| SyntaxError::InvalidNumber)?;
            self.values.push_number(number)?;
            self.cursor.advance(self.bytes, len);
            return Ok(());
        }

        if scanner::is_space(c) {
            self.cursor.advance(self.bytes, 1);
            return Ok(());
        }

        Err(SyntaxError::UnexpectedChar.into())
    }

    fn finish_line(&mut self) -> std::result::Result<(), Fault> {
        if self.quote.is_some() {
            return Err(SyntaxError::UnterminatedString.into());
        }
        match self.mode {
            // Blank or comment-only line.
            Mode::Indent => Ok(()),
            Mode::ObjectName => {
                if self.object.is_empty() {
                    return Err(SyntaxError::BlankObjectName.into());
                }
                let depth = self.indent.depth();
                self.objects.truncate(depth);
                self.objects.push(self.object.slice(self.text));
                Ok(())
            }
            Mode::Value => self.dispatch(),
            Mode::MemberName | Mode::Hint => Err(SyntaxError::MissingValue.into()),
        }
    }

    /// Hand the completed member to the callback.
    fn dispatch(&mut self) -> std::result::Result<(), Fault> {
        if self.values.is_empty() {
            return Err(SyntaxError::MissingValue.into());
        }
        let hint = if self.hint.is_empty() {
            None
        } else {
            Some(self.hint.slice(self.text))
        };
        let member = Member {
            objects: &self.objects,
            name: self.name.slice(self.text),
            hint,
            numbers: self.values.numbers(),
            strings: self.values.strings(),
        };
        tracing::trace!(%member, "member parsed");
        (self.callback)(&member)?;
        Ok(())
    }

    fn reset_line(&mut self) {
        self.indent.reset_line();
        self.mode = Mode::Indent;
        self.object = Word::default();
        self.name = Word::default();
        self.hint = Word::default();
        self.values.clear();
    }

    fn next_line(&mut self) {
        self.reset_line();
        self.cursor.next_line();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCategory, Location, ParseError};
    use crate::member::RejectionKind;

    fn members_with(text: &str, options: &ParseOptions) -> Result<Vec<String>> {
        let mut out = Vec::new();
        parse(text, options, |m| {
            out.push(m.to_string());
            Ok(())
        })?;
        Ok(out)
    }

    fn members(text: &str) -> Vec<String> {
        members_with(text, &ParseOptions::new().quiet()).unwrap()
    }

    fn syntax_error(text: &str) -> (SyntaxError, Location) {
        match members_with(text, &ParseOptions::new().quiet()) {
            Err(ParseError::Syntax { kind, at }) => (kind, at),
            other => panic!("expected syntax error for {:?}, got {:?}", text, other),
        }
    }

    #[test]
    fn test_sample_document() {
        let text = "# Object\n\
                    number = 1\n\
                    string = 'Hello world'\n\
                    array = 1 2 3\n\
                    array_to_convert_to_color : Color = 128 128 128\n    \n  # NestedObject\n  position : Vector3 = 200 200 200\n";
        assert_eq!(
            members(text),
            vec![
                "Object.number = 1",
                "Object.string = 'Hello world'",
                "Object.array = 1 2 3",
                "Object.array_to_convert_to_color: Color = 128 128 128",
                "Object.NestedObject.position: Vector3 = 200 200 200",
            ]
        );
    }

    #[test]
    fn test_nested_object_chain() {
        let mut chains = Vec::new();
        parse(
            "#A\nn = 1\n  #B\n  m = 2\n",
            &ParseOptions::new().quiet(),
            |m| {
                chains.push((m.objects().to_vec(), m.depth(), m.name(), m.numbers().to_vec()));
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(
            chains,
            vec![
                (vec!["A"], 0, "n", vec![1.0]),
                (vec!["A", "B"], 1, "m", vec![2.0]),
            ]
        );
    }

    #[test]
    fn test_quotes_are_symmetric() {
        assert_eq!(members("#A\ns = 'abc'\n"), vec!["A.s = 'abc'"]);
        assert_eq!(members("#A\ns = \"abc\"\n"), vec!["A.s = 'abc'"]);
        assert_eq!(
            members("#A\ns = 'it\"s' \"don't\"\n"),
            vec!["A.s = 'it\"s' \"don't\""]
        );
    }

    #[test]
    fn test_backslash_is_literal() {
        let mut strings = Vec::new();
        parse("#A\ns = 'a\\b'\n", &ParseOptions::new().quiet(), |m| {
            strings.extend(m.strings().iter().map(|s| s.to_string()));
            Ok(())
        })
        .unwrap();
        assert_eq!(strings, vec!["a\\b"]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(members("#A\nv = 1 2 ; trailing\n"), vec!["A.v = 1 2"]);
        assert_eq!(members("#A\ns = 'a;b' ; c\n"), vec!["A.s = 'a;b'"]);
        assert_eq!(
            members("; header\n#A ; obj\nv = 1 ; c\n  ; indented comment\n"),
            vec!["A.v = 1"]
        );
        assert_eq!(members("#A\nv = 1 ; no line feed"), vec!["A.v = 1"]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            members("#A\nv = 1.5 2e3 7. 0.25E1\n"),
            vec!["A.v = 1.5 2000 7 2.5"]
        );
    }

    #[test]
    fn test_hint_is_optional() {
        let mut hints = Vec::new();
        parse(
            "#A\nplain = 1\ntyped:Color=1\n",
            &ParseOptions::new().quiet(),
            |m| {
                hints.push(m.hint());
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(hints, vec![None, Some("Color")]);
    }

    #[test]
    fn test_last_line_without_line_feed() {
        assert_eq!(members("#A\nv = 'x'"), vec!["A.v = 'x'"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(members("#A\r\nv = 1\r\n\r\n"), vec!["A.v = 1"]);
    }

    #[test]
    fn test_tab_indentation() {
        assert_eq!(members("#A\n\t#B\n\tv = 1\n"), vec!["A.B.v = 1"]);
    }

    #[test]
    fn test_blank_lines_keep_depth() {
        assert_eq!(
            members("#A\n  #B\n  x = 1\n\n  y = 2\n"),
            vec!["A.B.x = 1", "A.B.y = 2"]
        );
    }

    #[test]
    fn test_dedent_resumes_ancestor() {
        assert_eq!(
            members("#A\n  #B\n  x = 1\ny = 2\n"),
            vec!["A.B.x = 1", "A.y = 2"]
        );
        assert_eq!(
            members("#A\n  #B\n#C\n  #D\n  v = 1\n"),
            vec!["C.D.v = 1"]
        );
    }

    #[test]
    fn test_deeper_scope_must_be_redeclared() {
        assert_eq!(
            syntax_error("#A\n  #B\n  x = 1\nz = 0\n  w = 1\n"),
            (SyntaxError::ObjectUndefined, Location::new(5, 3))
        );
    }

    #[test]
    fn test_indented_first_object() {
        assert_eq!(
            syntax_error("  #A\n    #B\n  y = 1\n"),
            (SyntaxError::ObjectUndefined, Location::new(1, 3))
        );
        assert_eq!(
            syntax_error("  #A\n"),
            (SyntaxError::ObjectUndefined, Location::new(1, 3))
        );
        assert_eq!(
            syntax_error("#A\n  #B\n#C\n      #D\n"),
            (SyntaxError::SkippedNestingLevel, Location::new(4, 7))
        );
    }

    #[test]
    fn test_member_before_object() {
        assert_eq!(
            syntax_error("x = 1\n"),
            (SyntaxError::ObjectUndefined, Location::new(1, 1))
        );
    }

    #[test]
    fn test_invalid_indentation() {
        let err = members_with("#A\n  x = 1\n   y = 2\n", &ParseOptions::new().quiet());
        assert_eq!(err.unwrap_err().category(), ErrorCategory::Syntax);
        assert_eq!(
            syntax_error("#A\n  #B\n  x = 1\n   y = 2\n"),
            (SyntaxError::InvalidIndentation, Location::new(4, 4))
        );
    }

    #[test]
    fn test_mixed_indentation() {
        let err = members_with("#A\n  x = 1\n\tx = 2\n", &ParseOptions::new().quiet());
        assert_eq!(err.unwrap_err().category(), ErrorCategory::Syntax);
        assert_eq!(
            syntax_error("#A\n  #B\n  x = 1\n\tx = 2\n"),
            (SyntaxError::MixedIndentation, Location::new(4, 1))
        );
    }

    #[test]
    fn test_skipped_level() {
        assert_eq!(
            syntax_error("#A\n #B\n   #C\n"),
            (SyntaxError::SkippedNestingLevel, Location::new(3, 4))
        );
    }

    #[test]
    fn test_type_mixing() {
        assert_eq!(
            syntax_error("#A\nv = 1 'two'\n"),
            (SyntaxError::HoldsNumbers, Location::new(2, 7))
        );
        assert_eq!(
            syntax_error("#A\nv = 'one' 2\n"),
            (SyntaxError::HoldsStrings, Location::new(2, 11))
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            syntax_error("#A\ns = 'abc\n"),
            (SyntaxError::UnterminatedString, Location::new(2, 9))
        );
        assert_eq!(
            syntax_error("#A\nv = 'x"),
            (SyntaxError::UnterminatedString, Location::new(2, 7))
        );
        assert_eq!(
            syntax_error("#A\nv = 'x\"\n"),
            (SyntaxError::UnterminatedString, Location::new(2, 8))
        );
    }

    #[test]
    fn test_member_without_value() {
        assert_eq!(
            syntax_error("#A\nname\n"),
            (SyntaxError::MissingValue, Location::new(2, 5))
        );
        assert_eq!(
            syntax_error("#A\nname =\n"),
            (SyntaxError::MissingValue, Location::new(2, 7))
        );
        assert_eq!(
            syntax_error("#A\nn: T ; no value\n"),
            (SyntaxError::MissingValue, Location::new(2, 6))
        );
    }

    #[test]
    fn test_object_name_errors() {
        assert_eq!(
            syntax_error("#\n"),
            (SyntaxError::BlankObjectName, Location::new(1, 2))
        );
        assert_eq!(
            syntax_error("# A B\n"),
            (SyntaxError::MultipleObjectNames, Location::new(1, 5))
        );
        assert_eq!(
            syntax_error("#A-B\n"),
            (SyntaxError::InvalidObjectChar, Location::new(1, 3))
        );
    }

    #[test]
    fn test_member_name_errors() {
        assert_eq!(
            syntax_error("#A\na b = 1\n"),
            (SyntaxError::MultipleMemberNames, Location::new(2, 3))
        );
        assert_eq!(
            syntax_error("#A\n= 1\n"),
            (SyntaxError::MissingMemberName, Location::new(2, 1))
        );
        assert_eq!(
            syntax_error("#A\n: T = 1\n"),
            (SyntaxError::MissingMemberName, Location::new(2, 1))
        );
        assert_eq!(
            syntax_error("#A\na.b = 1\n"),
            (SyntaxError::InvalidMemberChar, Location::new(2, 2))
        );
    }

    #[test]
    fn test_hint_errors() {
        assert_eq!(
            syntax_error("#A\nc : = 1\n"),
            (SyntaxError::MissingHint, Location::new(2, 5))
        );
        assert_eq!(
            syntax_error("#A\nc : A B = 1\n"),
            (SyntaxError::MultipleHints, Location::new(2, 7))
        );
        assert_eq!(
            syntax_error("#A\nc : A:B = 1\n"),
            (SyntaxError::InvalidHintChar, Location::new(2, 6))
        );
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            syntax_error("#A\nv = -1\n"),
            (SyntaxError::UnexpectedChar, Location::new(2, 5))
        );
        assert_eq!(
            syntax_error("#A\nv = 12abc\n"),
            (SyntaxError::UnexpectedChar, Location::new(2, 7))
        );
        assert_eq!(
            syntax_error("#A\nv = 0x10\n"),
            (SyntaxError::UnexpectedChar, Location::new(2, 6))
        );
    }

    #[test]
    fn test_columns_count_characters() {
        assert_eq!(
            syntax_error("#A\ns = 'é' x\n"),
            (SyntaxError::UnexpectedChar, Location::new(2, 9))
        );
    }

    #[test]
    fn test_too_many_values() {
        let err = members_with("#A\nv = 1 2 3\n", &ParseOptions::new().with_max_values(2).quiet())
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::Capacity {
                kind: CapacityError::TooManyValues { limit: 2 },
                at: Location::new(2, 9),
            }
        );
        assert_eq!(err.category(), ErrorCategory::Internal);

        let err = members_with(
            "#A\nv = 'a' 'b' 'c'\n",
            &ParseOptions::new().with_max_values(2).quiet(),
        )
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_too_many_nestings() {
        let err = members_with(
            "#A\n #B\n  #C\n",
            &ParseOptions::new().with_max_nesting(2).quiet(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::Capacity {
                kind: CapacityError::TooManyNestings { limit: 2 },
                at: Location::new(3, 3),
            }
        );
    }

    #[test]
    fn test_callback_rejection_stops_parse() {
        let mut seen = Vec::new();
        let err = parse(
            "#A\nok = 1\nbad = 2\nlater = 3\n",
            &ParseOptions::new().quiet(),
            |m| {
                seen.push(m.name());
                if m.name() == "bad" {
                    return Err(Rejection::unexpected_member("unknown member"));
                }
                Ok(())
            },
        )
        .unwrap_err();
        assert_eq!(seen, vec!["ok", "bad"]);
        assert_eq!(err.to_string(), "unknown member [row 3, col 8]");
        assert_eq!(
            err.category(),
            ErrorCategory::Callback(RejectionKind::UnexpectedMember)
        );
    }

    #[test]
    fn test_quiet_keeps_error() {
        let loud = members_with("x = 1\n", &ParseOptions::new());
        let quiet = members_with("x = 1\n", &ParseOptions::new().quiet());
        assert_eq!(loud, quiet);
        assert!(quiet.is_err());
    }

    #[test]
    fn test_empty_document() {
        assert!(members("").is_empty());
        assert!(members("\n\n  \n; only comments\n").is_empty());
    }
}
