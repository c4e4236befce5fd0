//! Command dispatch.
//!
//! Glues the [`Parser`] to the [`Registry`]: a line is tokenized, token 0
//! is looked up, the tokens are promoted to an owned [`Argv`](crate::Argv)
//! and the handler runs synchronously with the caller's sinks.
//!
//! ```text
//!  "relay 0 on\n" ──▶ Parser ──▶ ["relay","0","on"] ──▶ Registry::find("relay")
//!                                                              │
//!                          handler(CommandContext { argv, output, error }) ◀┘
//! ```
//!
//! Failures are reported twice: as one `-ERROR: ...` line on the error sink
//! and as a [`DispatchError`] to the caller.

use core::fmt;

use log::{debug, warn};

use crate::commands::{self, CommandContext, Registry};
use crate::error::DispatchError;
use crate::output::log_lines;
use crate::parser::{ParsedLine, Parser};

/// Tag placed in front of parser errors, e.g. `TERMINAL: InvalidEscape`.
pub const DEFAULT_TAG: &str = "TERMINAL";

/// Result of a dispatch. `Ok` means the handler ran.
pub type DispatchResult = Result<(), DispatchError>;

/// Runs command lines against a registry.
///
/// Holds the process-wide registry and parser by reference, so any number
/// of dispatchers (serial console, scheduler actions, ...) share them.
#[derive(Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
    parser: &'r Parser,
    tag: &'r str,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r Registry, parser: &'r Parser) -> Self {
        Self {
            registry,
            parser,
            tag: DEFAULT_TAG,
        }
    }

    /// Use `tag` in front of parser errors instead of [`DEFAULT_TAG`].
    #[must_use]
    pub fn with_tag(mut self, tag: &'r str) -> Self {
        self.tag = tag;
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn parser(&self) -> &'r Parser {
        self.parser
    }

    fn report_parse_error(&self, parsed: &ParsedLine<'_>, error: &mut dyn fmt::Write) {
        debug!("Dispatcher: parse failed: {}", parsed.error);
        let _ = commands::error(error, format_args!("{}: {}", self.tag, parsed.error));
    }

    /// Invoke the handler for an already parsed line.
    pub fn call(
        &self,
        parsed: ParsedLine<'_>,
        output: &mut dyn fmt::Write,
        error: &mut dyn fmt::Write,
    ) -> DispatchResult {
        if !parsed.is_ok() {
            self.report_parse_error(&parsed, error);
            return Err(DispatchError::Parse(parsed.error));
        }

        let Some(name) = parsed.tokens.first() else {
            return Err(DispatchError::NoInput);
        };

        let Some(command) = self.registry.find(name) else {
            warn!("Dispatcher: command not found: {}", name);
            let _ = commands::error(error, "Command not found");
            return Err(DispatchError::CommandNotFound);
        };

        let func = command.func;
        debug!("Dispatcher: calling '{}'", command.name);
        func(CommandContext {
            argv: parsed.into_argv(),
            output,
            error,
        });

        Ok(())
    }

    /// Parse `line` as one command and run it.
    ///
    /// A missing line ending is implied. Anything after the first line is
    /// ignored.
    pub fn find_and_call(
        &self,
        line: &str,
        output: &mut dyn fmt::Write,
        error: &mut dyn fmt::Write,
    ) -> DispatchResult {
        let parsed = self.parser.parse_terminated(line);
        if !parsed.is_ok() {
            self.report_parse_error(&parsed, error);
            return Err(DispatchError::Parse(parsed.error));
        }

        if parsed.tokens.is_empty() {
            return Err(DispatchError::NoInput);
        }

        self.call(parsed, output, error)
    }

    /// Run every line of `text` in order.
    ///
    /// Stops at the first line that fails to parse, is empty, or names an
    /// unknown command. Succeeds only when all of `text` was consumed.
    pub fn api_find_and_call(
        &self,
        text: &str,
        output: &mut dyn fmt::Write,
        error: &mut dyn fmt::Write,
    ) -> DispatchResult {
        let mut input = text;
        let mut result = Err(DispatchError::NoInput);

        while !input.is_empty() {
            let parsed = self.parser.parse_terminated(input);
            if !parsed.is_ok() {
                self.report_parse_error(&parsed, error);
                return Err(DispatchError::Parse(parsed.error));
            }

            if parsed.tokens.is_empty() {
                return Err(DispatchError::NoInput);
            }

            input = parsed.remaining;
            self.call(parsed, output, error)?;
            result = Ok(());
        }

        result
    }

    /// Run a stored action string as if it was typed at the console.
    ///
    /// Error lines go to the log at warn level.
    pub fn execute_action(&self, action: &str, output: &mut dyn fmt::Write) -> DispatchResult {
        let mut errors = log_lines(log::Level::Warn);
        let result = self.api_find_and_call(action, output, &mut errors);
        if let Err(e) = result {
            warn!("Dispatcher: action '{}' failed: {}", action.trim_end(), e);
        }
        result
    }
}

// ── Tests ────────────────────────────────────────────────────
