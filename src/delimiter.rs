//! Delimiter-based line assembly.
//!
//! Two flavours that split input on a delimiter (a byte or a short byte
//! string):
//!
//! - [`DelimiterBuffer`] owns a fixed `N`-byte arena and accumulates chunks
//!   of arbitrary size, e.g. whatever a UART read returned. When an append
//!   does not fit, everything unread is discarded, writing restarts at
//!   offset 0 and the sticky `overflow` flag is raised.
//! - [`DelimiterView`] walks an already complete string without copying.
//!
//! [`LineBuffer`] and [`LineView`] split on `\n` and also drop one `\r`
//! in front of it, so `\r\n` and `\n` yield the same line.
//!
//! ```text
//!  storage: [ consumed | pending ......... | free ]
//!           0        cursor              size    N
//! ```

use crate::transport::Transport;

/// Slice yielded by a buffer, valid until the next `append`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferedLine<'a> {
    pub value: &'a [u8],
    /// Data was discarded since the buffer was last fully drained.
    pub overflow: bool,
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn strip_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

// ═══════════════════════════════════════════════════════════════
//  Buffered
// ═══════════════════════════════════════════════════════════════

/// Fixed-capacity ring of bytes yielding delimiter-terminated slices.
///
/// Invariant: `cursor <= size <= N`.
pub struct DelimiterBuffer<const N: usize> {
    storage: [u8; N],
    size: usize,
    cursor: usize,
    delimiter: &'static [u8],
    overflow: bool,
}

impl<const N: usize> DelimiterBuffer<N> {
    pub const fn new(delimiter: &'static [u8]) -> Self {
        const { assert!(N > 0, "DelimiterBuffer needs a non-zero capacity") };

        Self {
            storage: [0; N],
            size: 0,
            cursor: 0,
            delimiter,
            overflow: false,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn overflow(&self) -> bool {
        self.overflow
    }

    pub const fn delimiter(&self) -> &'static [u8] {
        self.delimiter
    }

    /// Appended bytes not yet returned by [`next`](Self::next).
    pub fn get(&self) -> &[u8] {
        &self.storage[self.cursor..self.size]
    }

    pub fn reset(&mut self) {
        self.size = 0;
        self.cursor = 0;
        self.overflow = false;
    }

    /// Drop all content and restart writing at offset 0.
    fn wrap(&mut self) {
        self.size = 0;
        self.cursor = 0;
        self.overflow = true;
    }

    /// Bytes of an append of `length` that the wrap throws away.
    ///
    /// Zero when the data fits, or when the buffer is exactly full and the
    /// data fits once the wrap restarts at offset 0.
    pub const fn discarded_by(&self, length: usize) -> usize {
        let free = N - self.size;
        if length <= free {
            return 0;
        }

        // Whole capacities are skipped until the rest fits at offset 0.
        let rest = length - free;
        free + (rest - 1) / N * N
    }

    pub fn append(&mut self, data: &[u8]) {
        let mut data = data;
        let mut capacity = N - self.size;

        while data.len() > capacity {
            data = &data[capacity..];
            capacity = N;
            self.wrap();
        }

        self.storage[self.size..self.size + data.len()].copy_from_slice(data);
        self.size += data.len();
    }

    pub fn append_byte(&mut self, byte: u8) {
        self.append(&[byte]);
    }

    /// Pull `length` bytes out of `source`.
    ///
    /// The whole `length` is drained from the source even when most of it
    /// has to be discarded. Returns the number of bytes read, which is less
    /// than `length` only when the source ran dry.
    pub fn append_from<T: Transport>(
        &mut self,
        source: &mut T,
        length: usize,
    ) -> Result<usize, T::Error> {
        let mut length = length;
        let mut capacity = N - self.size;
        let mut total = 0;

        while length > capacity {
            // Read through the free tail, then throw everything away.
            let read = self.fill_from(source, capacity)?;
            total += read;
            if read < capacity {
                // Source ran dry, what was read still fits.
                return Ok(total);
            }

            self.wrap();
            length -= capacity;
            capacity = N;
        }

        Ok(total + self.fill_from(source, length)?)
    }

    /// Pull everything the source reports as available.
    pub fn append_available<T: Transport>(&mut self, source: &mut T) -> Result<usize, T::Error> {
        match source.available() {
            0 => Ok(0),
            available => self.append_from(source, available),
        }
    }

    /// Read up to `count` bytes into the free tail. `count` must fit.
    fn fill_from<T: Transport>(&mut self, source: &mut T, count: usize) -> Result<usize, T::Error> {
        let start = self.size;
        let end = start + count;
        let mut filled = start;

        while filled < end {
            match source.read(&mut self.storage[filled..end]) {
                Ok(0) => break,
                Ok(read) => filled += read,
                Err(e) => {
                    self.size = filled;
                    return Err(e);
                }
            }
        }

        self.size = filled;
        Ok(filled - start)
    }

    /// Next delimiter-terminated slice, delimiter included.
    pub fn next_line(&mut self) -> Option<BufferedLine<'_>> {
        let begin = self.cursor;
        let found = find(&self.storage[begin..self.size], self.delimiter)?;
        let after = begin + found + self.delimiter.len();
        let overflow = self.overflow;

        if after == self.size {
            self.reset();
        } else {
            self.cursor = after;
        }

        Some(BufferedLine {
            value: &self.storage[begin..after],
            overflow,
        })
    }

    /// Same as [`next_line`](Self::next_line), with an empty value when no
    /// delimiter is pending. The overflow flag is reported either way.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> BufferedLine<'_> {
        let overflow = self.overflow;
        self.next_line().unwrap_or(BufferedLine {
            value: &[],
            overflow,
        })
    }
}

/// [`DelimiterBuffer`] splitting on `\n`, yielding lines without their
/// `\n` / `\r\n` ending.
pub struct LineBuffer<const N: usize> {
    inner: DelimiterBuffer<N>,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            inner: DelimiterBuffer::new(b"\n"),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub const fn size(&self) -> usize {
        self.inner.size()
    }

    pub const fn overflow(&self) -> bool {
        self.inner.overflow()
    }

    pub fn get(&self) -> &[u8] {
        self.inner.get()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub const fn discarded_by(&self, length: usize) -> usize {
        self.inner.discarded_by(length)
    }

    pub fn append(&mut self, data: &[u8]) {
        self.inner.append(data);
    }

    pub fn append_byte(&mut self, byte: u8) {
        self.inner.append_byte(byte);
    }

    pub fn append_from<T: Transport>(
        &mut self,
        source: &mut T,
        length: usize,
    ) -> Result<usize, T::Error> {
        self.inner.append_from(source, length)
    }

    pub fn append_available<T: Transport>(&mut self, source: &mut T) -> Result<usize, T::Error> {
        self.inner.append_available(source)
    }

    pub fn next_line(&mut self) -> Option<BufferedLine<'_>> {
        self.inner.next_line().map(|line| BufferedLine {
            value: strip_line_end(line.value),
            overflow: line.overflow,
        })
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> BufferedLine<'_> {
        let overflow = self.inner.overflow();
        self.next_line().unwrap_or(BufferedLine {
            value: &[],
            overflow,
        })
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Unbuffered
// ═══════════════════════════════════════════════════════════════

/// Cursor over a complete string, yielding delimiter-terminated slices.
///
/// Invariant: `cursor <= view.len()`.
#[derive(Debug, Clone)]
pub struct DelimiterView<'a> {
    view: &'a str,
    delimiter: &'static str,
    cursor: usize,
}

impl<'a> DelimiterView<'a> {
    pub const fn new(view: &'a str, delimiter: &'static str) -> Self {
        Self {
            view,
            delimiter,
            cursor: 0,
        }
    }

    /// Whether unconsumed input remains.
    pub const fn has_remaining(&self) -> bool {
        self.cursor != self.view.len()
    }

    /// Input not yet returned by [`next`](Self::next).
    pub fn get(&self) -> &'a str {
        &self.view[self.cursor..]
    }

    pub fn next_slice(&mut self) -> Option<&'a str> {
        if self.delimiter.is_empty() {
            return None;
        }

        let rest = self.get();
        let found = rest.find(self.delimiter)?;
        let after = found + self.delimiter.len();
        self.cursor += after;

        Some(&rest[..after])
    }

    /// Next slice, delimiter included, or `""` when none is pending.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> &'a str {
        self.next_slice().unwrap_or("")
    }
}

/// [`DelimiterView`] splitting on `\n`, yielding lines without their
/// `\n` / `\r\n` ending.
#[derive(Debug, Clone)]
pub struct LineView<'a> {
    inner: DelimiterView<'a>,
}

impl<'a> LineView<'a> {
    pub const fn new(view: &'a str) -> Self {
        Self {
            inner: DelimiterView::new(view, "\n"),
        }
    }

    pub const fn has_remaining(&self) -> bool {
        self.inner.has_remaining()
    }

    pub fn get(&self) -> &'a str {
        self.inner.get()
    }

    pub fn next_slice(&mut self) -> Option<&'a str> {
        self.inner.next_slice().map(|line| {
            let line = line.strip_suffix('\n').unwrap_or(line);
            line.strip_suffix('\r').unwrap_or(line)
        })
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> &'a str {
        self.next_slice().unwrap_or("")
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    #[test]
    fn substring_delimiter() {
        let mut buffer = DelimiterBuffer::<32>::new(b"\r\n");
        buffer.append(b"one\ntwo\r\nthree");

        let line = buffer.next();
        assert_eq!(line.value, b"one\ntwo\r\n");
        assert!(!line.overflow);

        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.get(), b"three");
    }

    #[test]
    fn delimiter_split_across_appends() {
        let mut buffer = DelimiterBuffer::<32>::new(b"\r\n");
        buffer.append(b"abc\r");
        assert!(buffer.next_line().is_none());
        buffer.append(b"\n");
        assert_eq!(buffer.next().value, b"abc\r\n");
        assert_eq!(buffer.size(), 0);
    }

    #[test]
    fn overflow_is_sticky_until_drained() {
        let mut buffer = DelimiterBuffer::<8>::new(b"\n");
        buffer.append(b"0123456789");
        assert!(buffer.overflow());
        assert_eq!(buffer.get(), b"89");

        // No delimiter yet, the flag is still reported.
        let pending = buffer.next();
        assert!(pending.value.is_empty());
        assert!(pending.overflow);

        buffer.append(b"\nab\n");
        let first = buffer.next();
        assert_eq!(first.value, b"89\n");
        assert!(first.overflow);
        assert!(buffer.overflow());

        let second = buffer.next();
        assert_eq!(second.value, b"ab\n");
        assert!(second.overflow);
        assert!(!buffer.overflow());
        assert_eq!(buffer.size(), 0);
    }

    #[test]
    fn wrap_from_exactly_full_keeps_incoming_data() {
        let mut buffer = DelimiterBuffer::<4>::new(b"\n");
        assert_eq!(buffer.delimiter(), b"\n");
        buffer.append(b"abcd");
        assert_eq!(buffer.discarded_by(3), 0);

        buffer.append(b"ok\n");
        assert!(buffer.overflow());
        assert_eq!(buffer.next().value, b"ok\n");
    }

    #[test]
    fn discarded_by_counts_skipped_input() {
        let mut buffer = DelimiterBuffer::<8>::new(b"\n");
        assert_eq!(buffer.discarded_by(8), 0);
        assert_eq!(buffer.discarded_by(9), 8);
        assert_eq!(buffer.discarded_by(17), 16);

        buffer.append(b"abc");
        assert_eq!(buffer.discarded_by(5), 0);
        assert_eq!(buffer.discarded_by(6), 5);
        assert_eq!(buffer.discarded_by(14), 13);

        // Same result the append itself produces.
        buffer.append(&[b'x'; 14]);
        assert_eq!(buffer.size(), 1);
    }

    #[test]
    fn exact_fit_does_not_overflow() {
        let mut buffer = DelimiterBuffer::<4>::new(b"\n");
        buffer.append(b"abc\n");
        assert!(!buffer.overflow());
        assert_eq!(buffer.size(), 4);
        assert_eq!(buffer.next().value, b"abc\n");
    }

    #[test]
    fn reset_clears_everything() {
        let mut buffer = DelimiterBuffer::<4>::new(b"\n");
        buffer.append(b"abcdef");
        assert!(buffer.overflow());
        buffer.reset();
        assert!(!buffer.overflow());
        assert_eq!(buffer.size(), 0);
        assert!(buffer.get().is_empty());
    }

    #[test]
    fn append_from_drains_discarded_bytes() {
        let mut source = MemoryTransport::new();
        source.push(&[b'x'; 20]);
        source.push(b"ok\n");

        let mut buffer = LineBuffer::<8>::new();
        let read = buffer.append_available(&mut source).unwrap();
        assert_eq!(read, 23);
        assert_eq!(source.available(), 0);
        assert!(buffer.overflow());

        let line = buffer.next();
        assert!(line.overflow);
        assert_eq!(line.value, b"xxxxok");
    }

    #[test]
    fn append_from_short_source() {
        let mut source = MemoryTransport::new();
        source.push(b"ab");

        let mut buffer = LineBuffer::<8>::new();
        assert_eq!(buffer.append_from(&mut source, 5).unwrap(), 2);
        assert_eq!(buffer.get(), b"ab");
        assert!(!buffer.overflow());
    }

    #[test]
    fn view_keeps_unterminated_tail() {
        let mut view = DelimiterView::new("a;b;c", ";");
        assert_eq!(view.next(), "a;");
        assert_eq!(view.next(), "b;");
        assert!(view.has_remaining());
        assert_eq!(view.next(), "");
        assert_eq!(view.get(), "c");
    }

    #[test]
    fn view_exhausted_after_last_delimiter() {
        let mut view = DelimiterView::new("a\n", "\n");
        assert_eq!(view.next(), "a\n");
        assert!(!view.has_remaining());
    }

    #[test]
    fn line_view_keeps_empty_lines() {
        let mut view = LineView::new("\r\n\nend\n");
        assert_eq!(view.next_slice(), Some(""));
        assert_eq!(view.next_slice(), Some(""));
        assert_eq!(view.next_slice(), Some("end"));
        assert_eq!(view.next_slice(), None);
    }
}
