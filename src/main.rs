//! termcore-console: interactive console on stdin/stdout.
//!
//! Lines typed on stdin go through the same `Console` path a device would
//! use for its serial port. Logs go to stderr via env_logger, filter with
//! `RUST_LOG`.

use std::io::{self, BufRead, Write as _};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use log::{info, warn};

use termcore::{Command, CommandContext, Console, ConsoleConfig, Dispatcher, Parser, Registry};

const LINE_BUFFER_SIZE: usize = 256;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

// ── Commands ──────────────────────────────────────────────────

fn cmd_help(mut ctx: CommandContext<'_>) {
    let Some(registry) = REGISTRY.get() else {
        ctx.error_line("registry unavailable");
        return;
    };
    for name in registry.names() {
        let _ = writeln!(ctx.output, "  {name}");
    }
    ctx.ok();
}

fn cmd_echo(mut ctx: CommandContext<'_>) {
    let _ = writeln!(ctx.output, "{}", ctx.argv[1..].join(" "));
    ctx.ok();
}

fn cmd_version(mut ctx: CommandContext<'_>) {
    let _ = writeln!(ctx.output, "termcore {}", env!("CARGO_PKG_VERSION"));
    ctx.ok();
}

fn cmd_config(mut ctx: CommandContext<'_>) {
    match serde_json::to_string_pretty(&ConsoleConfig::default()) {
        Ok(json) => {
            let _ = writeln!(ctx.output, "{json}");
            ctx.ok();
        }
        Err(e) => ctx.error_line(e),
    }
}

static CORE_COMMANDS: &[Command] = &[
    Command::new("help", cmd_help),
    Command::new("echo", cmd_echo),
    Command::new("version", cmd_version),
    Command::new("config", cmd_config),
];

// ── Stdout sink ───────────────────────────────────────────────

struct Stdout(io::Stdout);

impl core::fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.write_all(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut registry = Registry::new();
    registry.add(CORE_COMMANDS);
    let registry = REGISTRY.get_or_init(|| registry);
    info!("termcore v{} ({} commands)", env!("CARGO_PKG_VERSION"), registry.size());

    let config = ConsoleConfig::default();
    config.validate().context("invalid console config")?;

    let parser = Parser::new();
    let dispatcher = Dispatcher::new(registry, &parser);
    let mut console = Console::<LINE_BUFFER_SIZE>::new(config);

    let mut out = Stdout(io::stdout());
    let mut err = Stdout(io::stdout());

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        let read = stdin.lock().read_line(&mut line).context("reading stdin")?;
        if read == 0 {
            break;
        }

        console.feed(line.as_bytes());
        let summary = console.process(&dispatcher, &mut out, &mut err);
        if summary.failed > 0 {
            warn!("{} line(s) failed", summary.failed);
        }
        out.0.flush().context("flushing stdout")?;
    }

    info!("stdin closed, exiting");
    Ok(())
}
