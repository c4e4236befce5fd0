//! termcore: command-console engine for small devices.
//!
//! Turns a raw byte stream, or a complete string, into command invocations:
//!
//! ```text
//!  Transport ──▶ LineBuffer / LineView ──▶ Parser ──▶ Dispatcher ──▶ Registry ──▶ handler
//! ```
//!
//! Everything is single-threaded and synchronous. The registry and the
//! parser are created once at startup and shared by reference.

#![deny(unused_must_use)]

pub mod commands;
pub mod config;
pub mod console;
pub mod delimiter;
pub mod dispatcher;
pub mod error;
pub mod output;
pub mod parser;
pub mod transport;

pub use commands::{Command, CommandContext, CommandFunc, CommandGroup, Registry};
pub use config::ConsoleConfig;
pub use console::{Console, PollSummary};
pub use delimiter::{BufferedLine, DelimiterBuffer, DelimiterView, LineBuffer, LineView};
pub use dispatcher::{DispatchResult, Dispatcher};
pub use error::{ConfigError, DispatchError, ParserError};
pub use parser::{Argv, ParsedLine, Parser, Token};
pub use transport::Transport;
