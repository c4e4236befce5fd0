//! Command line tokenizer.
//!
//! Splits one line of text into argument tokens on runs of spaces and tabs,
//! honouring single and double quotes and backslash escapes.
//!
//! ```text
//!  input ──▶ Initial ──▶ Text ──▶ (Double|Single)Quote ──▶ AfterQuote ──▶ Done
//!               │          │             │                                ▲
//!               └── \r ────┴── \r ──▶ CarriageReturn* ──── \n ────────────┘
//! ```
//!
//! The scanner is a byte-at-a-time state machine with no look-ahead, so it
//! never reads outside the given `&str`, even when that slice is a window
//! into a larger buffer. Every special character is ASCII, which keeps all
//! span boundaries on UTF-8 character boundaries.
//!
//! Tokens that map onto one contiguous run of the input are borrowed from
//! it. Tokens that needed an escape decoded, or that were glued together
//! from more than one run (`abc"def"`), are materialized into a `String`.

use std::borrow::Cow;
use core::cell::Cell;
use core::ops::Range;

use crate::error::ParserError;

/// One parsed argument: a view into the input, or an owned string when the
/// token had to be built up.
pub type Token<'a> = Cow<'a, str>;

/// Owned argument list handed to command handlers.
pub type Argv = Vec<String>;

/// Result of a single tokenizer run.
///
/// On any error `tokens` is empty and `remaining` is the untouched input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub tokens: Vec<Token<'a>>,
    /// Input following the line terminator of the parsed line.
    pub remaining: &'a str,
    pub error: ParserError,
}

impl<'a> ParsedLine<'a> {
    fn failed(input: &'a str, error: ParserError) -> Self {
        Self {
            tokens: Vec::new(),
            remaining: input,
            error,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_ok()
    }

    /// Number of tokens that are backed by their own allocation.
    pub fn owned_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|token| matches!(token, Cow::Owned(_)))
            .count()
    }

    /// Token text at `index`.
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(AsRef::as_ref)
    }

    /// Promote every token to an owned string.
    ///
    /// Already materialized tokens are moved out, only borrowed views are
    /// copied.
    pub fn into_argv(self) -> Argv {
        self.tokens.into_iter().map(Cow::into_owned).collect()
    }
}

/// Whether input that runs out mid-line is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// The line must contain its own `\n` or `\r\n`.
    Exact,
    /// A missing line feed is synthesized at the end of the input.
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    Text,
    CarriageReturn,
    CarriageReturnAfterText,
    EscapedText,
    EscapedByteLhs,
    EscapedByteRhs,
    SingleQuote,
    EscapedQuote,
    DoubleQuote,
    AfterQuote,
    Done,
}

impl State {
    /// Error reported when the input is exhausted in this state.
    const fn exhausted(self) -> ParserError {
        match self {
            Self::Done => ParserError::Ok,
            Self::Initial | Self::Text | Self::CarriageReturn | Self::CarriageReturnAfterText => {
                ParserError::UnexpectedLineEnd
            }
            Self::EscapedText | Self::EscapedByteLhs | Self::EscapedByteRhs | Self::EscapedQuote => {
                ParserError::InvalidEscape
            }
            Self::SingleQuote | Self::DoubleQuote => ParserError::UnterminatedQuote,
            Self::AfterQuote => ParserError::NoSpaceAfterQuote,
        }
    }

    /// States that may be completed with a synthetic line feed.
    const fn accepts_implicit_line_end(self) -> bool {
        matches!(
            self,
            Self::Initial | Self::Text | Self::CarriageReturn | Self::CarriageReturnAfterText
        )
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|digit| digit as u8)
}

fn unescape(byte: u8) -> u8 {
    match byte {
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'b' => 0x08,
        b'a' => 0x07,
        other => other,
    }
}

/// Token storage for one run of the state machine.
struct Values<'a> {
    input: &'a str,
    /// Contiguous run of input bytes belonging to the current token.
    span: Option<Range<usize>>,
    /// Set once the current token can no longer be a plain view.
    chunk: Option<Vec<u8>>,
    byte_lhs: u8,
    tokens: Vec<Token<'a>>,
}

impl<'a> Values<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            span: None,
            chunk: None,
            byte_lhs: 0,
            tokens: Vec::new(),
        }
    }

    fn append_span(&mut self, at: usize) {
        match &mut self.span {
            Some(span) if span.end == at => span.end = at + 1,
            Some(_) => {
                self.flush_span();
                self.span = Some(at..at + 1);
            }
            None => self.span = Some(at..at + 1),
        }
    }

    fn flush_span(&mut self) {
        if let Some(span) = self.span.take() {
            self.chunk
                .get_or_insert_with(Vec::new)
                .extend_from_slice(&self.input.as_bytes()[span]);
        }
    }

    fn append_byte(&mut self, byte: u8) {
        self.flush_span();
        self.chunk.get_or_insert_with(Vec::new).push(byte);
    }

    fn push_token(&mut self) -> Result<(), ParserError> {
        let token = match self.chunk.take() {
            Some(mut chunk) => {
                if let Some(span) = self.span.take() {
                    chunk.extend_from_slice(&self.input.as_bytes()[span]);
                }
                // \xHH may assemble bytes that do not form UTF-8.
                let text = String::from_utf8(chunk).map_err(|_| ParserError::InvalidEscape)?;
                Cow::Owned(text)
            }
            None => match self.span.take() {
                Some(span) => Cow::Borrowed(&self.input[span]),
                None => Cow::Borrowed(""),
            },
        };

        self.tokens.push(token);
        Ok(())
    }

    /// Advance the state machine by one input byte located at `at`.
    fn step(&mut self, state: State, byte: u8, at: usize) -> Result<State, ParserError> {
        let next = match state {
            State::Initial => match byte {
                b' ' | b'\t' => State::Initial,
                b'\r' => State::CarriageReturn,
                b'\n' => State::Done,
                _ => return self.step(State::Text, byte, at),
            },

            State::Text => match byte {
                b' ' | b'\t' => {
                    self.push_token()?;
                    State::Initial
                }
                b'"' => State::DoubleQuote,
                b'\'' => State::SingleQuote,
                b'\r' => State::CarriageReturnAfterText,
                b'\n' => {
                    self.push_token()?;
                    State::Done
                }
                _ => {
                    self.append_span(at);
                    State::Text
                }
            },

            State::CarriageReturn => match byte {
                b'\n' => State::Done,
                _ => return Err(ParserError::UnexpectedLineEnd),
            },

            State::CarriageReturnAfterText => match byte {
                b'\n' => {
                    self.push_token()?;
                    State::Done
                }
                _ => return Err(ParserError::UnexpectedLineEnd),
            },

            State::DoubleQuote => match byte {
                b'"' => State::AfterQuote,
                b'\\' => State::EscapedText,
                b'\r' | b'\n' => return Err(ParserError::UnterminatedQuote),
                _ => {
                    self.append_span(at);
                    State::DoubleQuote
                }
            },

            State::EscapedText => match byte {
                b'\r' | b'\n' => return Err(ParserError::UnexpectedLineEnd),
                b'x' => State::EscapedByteLhs,
                other => {
                    self.append_byte(unescape(other));
                    State::DoubleQuote
                }
            },

            State::EscapedByteLhs => {
                self.byte_lhs = hex_value(byte).ok_or(ParserError::InvalidEscape)?;
                State::EscapedByteRhs
            }

            State::EscapedByteRhs => {
                let rhs = hex_value(byte).ok_or(ParserError::InvalidEscape)?;
                self.append_byte((self.byte_lhs << 4) | rhs);
                State::DoubleQuote
            }

            State::SingleQuote => match byte {
                b'\'' => State::AfterQuote,
                b'\\' => State::EscapedQuote,
                b'\r' | b'\n' => return Err(ParserError::UnterminatedQuote),
                _ => {
                    self.append_span(at);
                    State::SingleQuote
                }
            },

            State::EscapedQuote => match byte {
                b'\'' => {
                    self.append_byte(b'\'');
                    State::SingleQuote
                }
                _ => return Err(ParserError::InvalidEscape),
            },

            State::AfterQuote => match byte {
                b' ' | b'\t' => {
                    self.push_token()?;
                    State::Initial
                }
                b'\n' => {
                    self.push_token()?;
                    State::Done
                }
                b'\r' => State::CarriageReturnAfterText,
                _ => return Err(ParserError::NoSpaceAfterQuote),
            },

            State::Done => State::Done,
        };

        Ok(next)
    }
}

/// Scoped hold on the parser's busy flag, released on drop.
struct ReentryGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> ReentryGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }

        Some(Self { flag })
    }
}

impl Drop for ReentryGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Non-reentrant tokenizer.
///
/// One long-lived instance is meant to be shared by reference between every
/// caller in the process. A parse requested while another one is still
/// running on the same instance fails with [`ParserError::Busy`].
#[derive(Debug, Default)]
pub struct Parser {
    parsing: Cell<bool>,
}

impl Parser {
    pub const fn new() -> Self {
        Self {
            parsing: Cell::new(false),
        }
    }

    /// Whether a parse is currently running on this instance.
    pub fn is_busy(&self) -> bool {
        self.parsing.get()
    }

    /// Parse the first line of `input`, which must end with `\n` or `\r\n`.
    pub fn parse_line<'a>(&self, input: &'a str) -> ParsedLine<'a> {
        self.run(input, Mode::Exact)
    }

    /// Parse the first line of `input`, treating the end of the input as a
    /// line feed when the line is otherwise complete.
    ///
    /// Input that ends inside a quote or an escape still fails.
    pub fn parse_terminated<'a>(&self, input: &'a str) -> ParsedLine<'a> {
        self.run(input, Mode::Terminated)
    }

    fn run<'a>(&self, input: &'a str, mode: Mode) -> ParsedLine<'a> {
        let Some(_guard) = ReentryGuard::acquire(&self.parsing) else {
            return ParsedLine::failed(input, ParserError::Busy);
        };

        let mut values = Values::new(input);
        let mut state = State::Initial;
        let mut consumed = input.len();

        for (at, &byte) in input.as_bytes().iter().enumerate() {
            state = match values.step(state, byte, at) {
                Ok(next) => next,
                Err(error) => return ParsedLine::failed(input, error),
            };

            if state == State::Done {
                consumed = at + 1;
                break;
            }
        }

        if mode == Mode::Terminated && state.accepts_implicit_line_end() {
            state = match values.step(state, b'\n', input.len()) {
                Ok(next) => next,
                Err(error) => return ParsedLine::failed(input, error),
            };
        }

        if state != State::Done {
            return ParsedLine::failed(input, state.exhausted());
        }

        ParsedLine {
            tokens: values.tokens,
            remaining: &input[consumed..],
            error: ParserError::Ok,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tokens_are_borrowed() {
        let parser = Parser::new();
        let result = parser.parse_line("relay 0 on\n");
        assert!(result.is_ok());
        assert_eq!(result.tokens, ["relay", "0", "on"]);
        assert_eq!(result.owned_count(), 0);
        assert!(result.remaining.is_empty());
    }

    #[test]
    fn quoted_span_stays_borrowed() {
        let parser = Parser::new();
        let result = parser.parse_line("say \"hello world\"\n");
        assert_eq!(result.tokens, ["say", "hello world"]);
        assert_eq!(result.owned_count(), 0);
    }

    #[test]
    fn glued_spans_are_owned() {
        let parser = Parser::new();
        let result = parser.parse_line("abc\"def\"\n");
        assert!(result.is_ok());
        assert_eq!(result.tokens, ["abcdef"]);
        assert_eq!(result.owned_count(), 1);
    }

    #[test]
    fn escapes_inside_double_quotes() {
        let parser = Parser::new();
        let result = parser.parse_line("x \"a\\tb\\n\\q\\\"\"\n");
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.token(1), Some("a\tb\nq\""));
    }

    #[test]
    fn escaped_apostrophe_inside_single_quotes() {
        let parser = Parser::new();
        let result = parser.parse_line("x 'it\\'s'\n");
        assert_eq!(result.token(1), Some("it's"));

        let result = parser.parse_line("x 'it\\s'\n");
        assert_eq!(result.error, ParserError::InvalidEscape);
        assert!(result.tokens.is_empty());
    }

    #[test]
    fn hex_escape_must_form_utf8() {
        let parser = Parser::new();
        let result = parser.parse_line("x \"\\xc3\\xa9\"\n");
        assert_eq!(result.token(1), Some("\u{e9}"));

        let result = parser.parse_line("x \"\\xff\"\n");
        assert_eq!(result.error, ParserError::InvalidEscape);
    }

    #[test]
    fn non_hex_digit_is_invalid_escape() {
        let parser = Parser::new();
        assert_eq!(
            parser.parse_line("x \"\\xg0\"\n").error,
            ParserError::InvalidEscape
        );
        assert_eq!(
            parser.parse_line("x \"\\x0g\"\n").error,
            ParserError::InvalidEscape
        );
    }

    #[test]
    fn escape_at_line_end_is_unexpected() {
        let parser = Parser::new();
        assert_eq!(
            parser.parse_line("x \"abc\\\n").error,
            ParserError::UnexpectedLineEnd
        );
    }

    #[test]
    fn bare_carriage_return_mid_line() {
        let parser = Parser::new();
        assert_eq!(
            parser.parse_line("a\rb\n").error,
            ParserError::UnexpectedLineEnd
        );
        assert_eq!(
            parser.parse_line("\rb\n").error,
            ParserError::UnexpectedLineEnd
        );
    }

    #[test]
    fn closing_quote_then_carriage_return() {
        let parser = Parser::new();
        let result = parser.parse_line("x 'y'\r\n");
        assert_eq!(result.tokens, ["x", "y"]);
    }

    #[test]
    fn empty_line_has_no_tokens() {
        let parser = Parser::new();
        let result = parser.parse_line("   \r\nnext\n");
        assert!(result.is_ok());
        assert!(result.tokens.is_empty());
        assert_eq!(result.remaining, "next\n");
    }

    #[test]
    fn terminated_mode_completes_open_line() {
        let parser = Parser::new();
        let result = parser.parse_terminated("relay 0");
        assert!(result.is_ok());
        assert_eq!(result.tokens, ["relay", "0"]);
        assert!(result.remaining.is_empty());

        let result = parser.parse_terminated("");
        assert!(result.is_ok());
        assert!(result.tokens.is_empty());
    }

    #[test]
    fn terminated_mode_keeps_quote_errors() {
        let parser = Parser::new();
        assert_eq!(
            parser.parse_terminated("x \"open").error,
            ParserError::UnterminatedQuote
        );
        assert_eq!(
            parser.parse_terminated("x \"\\x4").error,
            ParserError::InvalidEscape
        );
        assert_eq!(
            parser.parse_terminated("x 'done'").error,
            ParserError::NoSpaceAfterQuote
        );
    }

    #[test]
    fn busy_while_guard_is_held() {
        let parser = Parser::new();
        let guard = ReentryGuard::acquire(&parser.parsing);
        assert!(guard.is_some());
        assert!(parser.is_busy());

        let result = parser.parse_line("relay\n");
        assert_eq!(result.error, ParserError::Busy);
        assert!(result.tokens.is_empty());
        assert_eq!(result.remaining, "relay\n");
        // The rejected call must not release the outer hold.
        assert!(parser.is_busy());

        drop(guard);
        assert!(!parser.is_busy());
        assert!(parser.parse_line("relay\n").is_ok());
    }

    #[test]
    fn guard_released_after_error() {
        let parser = Parser::new();
        assert!(!parser.parse_line("x \"open\n").is_ok());
        assert!(!parser.is_busy());
    }

    #[test]
    fn into_argv_preserves_order() {
        let parser = Parser::new();
        let argv = parser
            .parse_line("set \"a\\x62c\" plain 'q'\n")
            .into_argv();
        assert_eq!(argv, ["set", "abc", "plain", "q"]);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let parser = Parser::new();
        let result = parser.parse_line("name \u{00fc}ber \"\\\u{00e9}t\u{00e9}\"\n");
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.tokens, ["name", "\u{00fc}ber", "\u{00e9}t\u{00e9}"]);
    }
}
