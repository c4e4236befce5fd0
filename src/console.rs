//! Interactive console session.
//!
//! Bridges a byte [`Transport`] to the [`Dispatcher`]:
//!
//! ```text
//!  Transport::read ──▶ DelimiterBuffer<N> ──▶ next_line() ──▶ Dispatcher::find_and_call
//!                         │ overflow                           │
//!                         ▼                                    ▼
//!               "-ERROR: Terminal buffer overflow"      output / error sinks
//! ```
//!
//! Nothing here blocks. Each [`Console::poll`] reads at most one chunk and
//! runs at most `max_lines_per_poll` lines, the caller decides how often
//! to poll.

use core::fmt;

use log::{debug, warn};

use crate::commands;
use crate::config::ConsoleConfig;
use crate::delimiter::DelimiterBuffer;
use crate::dispatcher::Dispatcher;
use crate::transport::Transport;

/// Counters for a single poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Bytes pulled from the transport.
    pub read: usize,
    /// Lines whose handler ran.
    pub executed: usize,
    /// Lines rejected by the parser, the registry or the console itself.
    pub failed: usize,
}

/// One console session with an `N`-byte line buffer.
pub struct Console<const N: usize> {
    /// Lines keep their `\n` so the parser sees a terminated line.
    buffer: DelimiterBuffer<N>,
    config: ConsoleConfig,
    /// A wrap discarded input, the next overflowed line lost its head.
    truncated: bool,
}

impl<const N: usize> Console<N> {
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            buffer: DelimiterBuffer::new(b"\n"),
            config,
            truncated: false,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Bytes buffered but not yet terminated by a line feed.
    pub fn pending(&self) -> &[u8] {
        self.buffer.get()
    }

    /// Drop buffered input, e.g. after the transport reconnected.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.truncated = false;
    }

    /// Buffer raw input without running anything.
    pub fn feed(&mut self, data: &[u8]) {
        self.before_append(data.len());
        self.buffer.append(data);
    }

    /// An append that loses bytes truncates the first line that follows.
    /// A wrap out of an exactly full buffer keeps the new data whole.
    fn before_append(&mut self, length: usize) {
        if self.buffer.discarded_by(length) > 0 {
            self.truncated = true;
        }
    }

    /// Read one chunk from `transport` and run the complete lines.
    pub fn poll<T: Transport>(
        &mut self,
        transport: &mut T,
        dispatcher: &Dispatcher<'_>,
        output: &mut dyn fmt::Write,
        error: &mut dyn fmt::Write,
    ) -> Result<PollSummary, T::Error> {
        let want = transport.available().min(usize::from(self.config.read_chunk));
        let read = if want > 0 {
            self.before_append(want);
            self.buffer.append_from(transport, want)?
        } else {
            0
        };

        let mut summary = self.process(dispatcher, output, error);
        summary.read = read;
        Ok(summary)
    }

    /// Run buffered complete lines, at most `max_lines_per_poll` of them.
    pub fn process(
        &mut self,
        dispatcher: &Dispatcher<'_>,
        output: &mut dyn fmt::Write,
        error: &mut dyn fmt::Write,
    ) -> PollSummary {
        let dispatcher = dispatcher.with_tag(self.config.tag.as_str());
        let mut summary = PollSummary::default();

        for _ in 0..self.config.max_lines_per_poll {
            let Some(line) = self.buffer.next_line() else {
                break;
            };

            if line.overflow && self.truncated {
                // Head of this line was discarded, never run what is left.
                self.truncated = false;
                warn!("Console: dropped {} byte(s) of overflowed input", line.value.len());
                if self.config.report_overflow {
                    let _ = commands::error(error, "Terminal buffer overflow");
                }
                summary.failed += 1;
                continue;
            }

            let Ok(text) = core::str::from_utf8(line.value) else {
                debug!("Console: rejected non UTF-8 line");
                let _ = commands::error(error, "Invalid UTF-8 input");
                summary.failed += 1;
                continue;
            };

            let typed = text.trim_end_matches(['\r', '\n']);
            if typed.is_empty() {
                continue;
            }

            if self.config.echo {
                let _ = writeln!(output, "{typed}");
            }

            match dispatcher.find_and_call(text, output, error) {
                Ok(()) => summary.executed += 1,
                Err(_) => summary.failed += 1,
            }
        }

        summary
    }
}

// ── Tests ────────────────────────────────────────────────────
