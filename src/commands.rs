//! Command registry.
//!
//! Commands are registered in groups. A group is either a statically
//! declared table (no allocation per command) or a single boxed entry.
//! Lookup is case-insensitive and walks the groups newest first, so a
//! later registration shadows an earlier one with the same name.
//!
//! ```text
//!   groups: [ core table ][ relay table ][ "test" ][ "TEST" ]
//!                                                       ▲
//!                                  find("Test") starts here, walks left
//! ```

use core::fmt;

use log::debug;

use crate::parser::Argv;

/// Handler invoked with the promoted argument list and the caller's sinks.
pub type CommandFunc = fn(CommandContext<'_>);

#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub func: CommandFunc,
}

impl Command {
    pub const fn new(name: &'static str, func: CommandFunc) -> Self {
        Self { name, func }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish()
    }
}

/// Per-dispatch state handed to a [`CommandFunc`].
pub struct CommandContext<'a> {
    /// `argv[0]` is the command name as typed.
    pub argv: Argv,
    pub output: &'a mut dyn fmt::Write,
    pub error: &'a mut dyn fmt::Write,
}

impl CommandContext<'_> {
    pub fn argc(&self) -> usize {
        self.argv.len()
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.argv.get(index).map(String::as_str)
    }

    /// Write the `+OK` marker to the output sink.
    pub fn ok(&mut self) {
        let _ = ok(self.output);
    }

    /// Write an `-ERROR: <message>` line to the error sink.
    pub fn error_line(&mut self, message: impl fmt::Display) {
        let _ = error(self.error, message);
    }
}

/// Canonical success marker.
pub fn ok(out: &mut dyn fmt::Write) -> fmt::Result {
    out.write_str("+OK\n")
}

/// Canonical failure marker.
pub fn error(out: &mut dyn fmt::Write, message: impl fmt::Display) -> fmt::Result {
    writeln!(out, "-ERROR: {message}")
}

/// Commands registered together as one unit.
#[derive(Debug)]
pub enum CommandGroup {
    Static(&'static [Command]),
    Single(Box<Command>),
}

impl CommandGroup {
    pub fn commands(&self) -> &[Command] {
        match self {
            Self::Static(commands) => commands,
            Self::Single(command) => core::slice::from_ref(&**command),
        }
    }
}

/// Append-only collection of command groups.
///
/// Built once at startup and then shared by reference.
#[derive(Debug, Default)]
pub struct Registry {
    groups: Vec<CommandGroup>,
}

impl Registry {
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Register a statically declared table as one group.
    pub fn add(&mut self, commands: &'static [Command]) {
        debug!("Registry: added group of {} command(s)", commands.len());
        self.groups.push(CommandGroup::Static(commands));
    }

    /// Register a single command.
    pub fn add_command(&mut self, name: &'static str, func: CommandFunc) {
        debug!("Registry: added '{}'", name);
        self.groups
            .push(CommandGroup::Single(Box::new(Command::new(name, func))));
    }

    /// Case-insensitive lookup, most recently registered group first.
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.groups.iter().rev().find_map(|group| {
            group
                .commands()
                .iter()
                .find(|command| command.name.eq_ignore_ascii_case(name))
        })
    }

    /// Total number of registered commands, duplicates included.
    pub fn size(&self) -> usize {
        self.groups.iter().map(|group| group.commands().len()).sum()
    }

    /// Every registered name, in lookup order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut out = Vec::with_capacity(self.size());
        for group in self.groups.iter().rev() {
            out.extend(group.commands().iter().map(|command| command.name));
        }
        out
    }

    pub fn groups(&self) -> usize {
        self.groups.len()
    }
}

// ── Tests ────────────────────────────────────────────────────
