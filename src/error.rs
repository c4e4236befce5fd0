//! Error types for the console engine.
//!
//! Parser errors travel as data inside [`ParsedLine`](crate::parser::ParsedLine),
//! dispatch errors come back as `Result`. Both are `Copy` so they can be
//! logged and formatted without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Parser errors
// ---------------------------------------------------------------------------

/// Outcome of a single tokenizer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserError {
    /// The line was parsed successfully.
    Ok,
    /// No parse attempted yet.
    #[default]
    Uninitialized,
    /// Another parse was already in progress.
    Busy,
    /// A quote was opened but the line ended before it was closed.
    UnterminatedQuote,
    /// Something other than whitespace or a line ending followed a closing quote.
    NoSpaceAfterQuote,
    /// Malformed backslash escape.
    InvalidEscape,
    /// Input ended, or a bare `\r` was found, before the line was complete.
    UnexpectedLineEnd,
}

impl ParserError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::Uninitialized => "Uninitialized",
            Self::Busy => "Busy",
            Self::UnterminatedQuote => "UnterminatedQuote",
            Self::NoSpaceAfterQuote => "NoSpaceAfterQuote",
            Self::InvalidEscape => "InvalidEscape",
            Self::UnexpectedLineEnd => "UnexpectedLineEnd",
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Why a dispatch did not invoke a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The line could not be tokenized.
    Parse(ParserError),
    /// The line held no tokens.
    NoInput,
    /// Token 0 did not match any registered command.
    CommandNotFound,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::NoInput => write!(f, "no input"),
            Self::CommandNotFound => write!(f, "Command not found"),
        }
    }
}

impl std::error::Error for ParserError {}

impl std::error::Error for DispatchError {}

impl From<ParserError> for DispatchError {
    fn from(e: ParserError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The module tag is empty.
    EmptyTag,
    /// `read_chunk` is zero.
    ZeroReadChunk,
    /// `max_lines_per_poll` is zero.
    ZeroLinesPerPoll,
    /// The serialized blob could not be encoded or decoded.
    Codec,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTag => write!(f, "module tag is empty"),
            Self::ZeroReadChunk => write!(f, "read chunk must be non-zero"),
            Self::ZeroLinesPerPoll => write!(f, "lines per poll must be non-zero"),
            Self::Codec => write!(f, "config codec failed"),
        }
    }
}

impl std::error::Error for ConfigError {}
