//! Transport abstraction: any byte-oriented channel.
//!
//! Concrete implementations live with the caller:
//! - UART serial (USB CDC)
//! - TCP socket
//! - stdin/stdout on the host
//!
//! The delimiter buffers and the console are generic over `Transport`, so
//! adding a new byte source requires zero changes to the parsing logic.

use std::collections::VecDeque;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Number of bytes that can be read without blocking.
    fn available(&self) -> usize;
}

/// A null transport that discards all writes and never reads.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> usize {
        0
    }
}

/// In-memory loopback: bytes pushed in come out of `read`, bytes written
/// are collected for inspection.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for subsequent reads.
    pub fn push(&mut self, data: &[u8]) {
        self.input.extend(data);
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.output
    }

    pub fn take_written(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.output)
    }
}

impl Transport for MemoryTransport {
    type Error = core::convert::Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let count = buf.len().min(self.input.len());
        for (slot, byte) in buf.iter_mut().zip(self.input.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn available(&self) -> usize {
        self.input.len()
    }
}
