//! Output sinks for command handlers.
//!
//! Handlers write through `core::fmt::Write`, so a `String` already works as
//! a sink. The adapters here cover the other destinations a console has:
//! nowhere, the logger, and the transport the command came in on.

use core::fmt;

use crate::transport::Transport;

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl fmt::Write for NullSink {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Ok(())
    }
}

/// Buffers text and hands every complete line (without its `\n`) to `F`.
///
/// Whatever is left without a line ending is handed over on drop.
pub struct LineSink<F: FnMut(&str)> {
    buffer: String,
    on_line: F,
}

impl<F: FnMut(&str)> LineSink<F> {
    pub fn new(on_line: F) -> Self {
        Self {
            buffer: String::new(),
            on_line,
        }
    }

    /// Text written since the last complete line.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    fn send_lines(&mut self) {
        while let Some(eol) = self.buffer.find('\n') {
            let line = self.buffer[..eol].trim_end_matches('\r');
            (self.on_line)(line);
            self.buffer.drain(..=eol);
        }
    }
}

impl<F: FnMut(&str)> fmt::Write for LineSink<F> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        if s.contains('\n') {
            self.send_lines();
        }
        Ok(())
    }
}

impl<F: FnMut(&str)> Drop for LineSink<F> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            (self.on_line)(&self.buffer);
        }
    }
}

/// Line sink that forwards every line to the `log` facade at `level`.
pub fn log_lines(level: log::Level) -> LineSink<impl FnMut(&str)> {
    LineSink::new(move |line: &str| log::log!(level, "{}", line))
}

/// `fmt::Write` adapter over a [`Transport`].
pub struct TransportWriter<'a, T: Transport> {
    transport: &'a mut T,
}

impl<'a, T: Transport> TransportWriter<'a, T> {
    pub fn new(transport: &'a mut T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> fmt::Write for TransportWriter<'_, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut data = s.as_bytes();
        while !data.is_empty() {
            match self.transport.write(data) {
                Ok(0) | Err(_) => return Err(fmt::Error),
                Ok(written) => data = &data[written..],
            }
        }
        Ok(())
    }
}
