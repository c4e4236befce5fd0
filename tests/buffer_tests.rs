//! Line assembly from chunked input and from complete strings.

use termcore::transport::MemoryTransport;
use termcore::{DelimiterBuffer, DelimiterView, LineBuffer, LineView};

#[test]
fn overflow_keeps_only_the_tail() {
    let mut buffer = LineBuffer::<16>::new();

    let mut input = vec![b'd'; 33];
    input.push(b'\n');
    buffer.append(&input);
    assert!(buffer.overflow());

    let line = buffer.next();
    assert_eq!(line.value, b"d");
    assert!(line.overflow);

    // Fully drained, the flag goes away with the data.
    assert_eq!(buffer.size(), 0);
    assert!(!buffer.overflow());
}

#[test]
fn long_line_within_capacity() {
    let mut buffer = LineBuffer::<128>::new();
    let text = "a".repeat(68);

    buffer.append(text.as_bytes());
    assert!(buffer.next_line().is_none());

    buffer.append(b"\r\n");
    let line = buffer.next();
    assert_eq!(line.value, text.as_bytes());
    assert!(!line.overflow);
}

#[test]
fn multiple_lines_in_one_append() {
    let mut buffer = LineBuffer::<64>::new();
    buffer.append(b"one\r\ntwo\nthree\r\nfour");

    let mut lines = Vec::new();
    while let Some(line) = buffer.next_line() {
        lines.push(String::from_utf8(line.value.to_vec()).unwrap());
    }
    assert_eq!(lines, ["one", "two", "three"]);
    assert_eq!(buffer.get(), b"four");

    buffer.append(b"\n");
    assert_eq!(buffer.next().value, b"four");
    assert_eq!(buffer.next().value, b"");
}

#[test]
fn custom_delimiter_is_kept_in_the_slice() {
    let mut buffer = DelimiterBuffer::<32>::new(b"\r\n");
    buffer.append(b"a\nb\r\nc");

    let line = buffer.next();
    assert_eq!(line.value, b"a\nb\r\n");
    assert_eq!(buffer.get(), b"c");
}

#[test]
fn transport_reads_in_chunks() {
    let mut transport = MemoryTransport::new();
    transport.push(b"relay 0 on\nrelay 1 ");

    let mut buffer = LineBuffer::<32>::new();
    assert_eq!(buffer.append_from(&mut transport, 4).unwrap(), 4);
    assert!(buffer.next_line().is_none());

    assert_eq!(buffer.append_available(&mut transport).unwrap(), 15);
    assert_eq!(buffer.next().value, b"relay 0 on");
    assert_eq!(buffer.get(), b"relay 1 ");
}

#[test]
fn transport_read_past_capacity_drains_the_source() {
    let mut transport = MemoryTransport::new();
    let mut input = vec![b'x'; 40];
    input.extend_from_slice(b"ok\n");
    transport.push(&input);

    let mut buffer = LineBuffer::<16>::new();
    assert_eq!(buffer.append_available(&mut transport).unwrap(), 43);

    let line = buffer.next();
    assert!(line.overflow);
    assert!(line.value.ends_with(b"ok"));
    assert!(!buffer.overflow());
}

#[test]
fn reset_clears_data_and_overflow() {
    let mut buffer = LineBuffer::<8>::new();
    buffer.append(b"0123456789");
    assert!(buffer.overflow());

    buffer.reset();
    assert!(!buffer.overflow());
    assert_eq!(buffer.size(), 0);
    assert!(buffer.get().is_empty());
}

#[test]
fn line_view_normalizes_endings() {
    let mut view = LineView::new("first\r\nsecond\nthird");
    assert!(view.has_remaining());
    assert_eq!(view.next(), "first");
    assert_eq!(view.next(), "second");

    // No line feed, nothing yielded and nothing consumed.
    assert_eq!(view.next(), "");
    assert!(view.has_remaining());
    assert_eq!(view.get(), "third");
}

#[test]
fn line_view_empty_lines() {
    let mut view = LineView::new("\n\r\n");
    assert_eq!(view.next_slice(), Some(""));
    assert_eq!(view.next_slice(), Some(""));
    assert_eq!(view.next_slice(), None);
    assert!(!view.has_remaining());
}

#[test]
fn delimiter_view_multi_byte_delimiter() {
    let mut view = DelimiterView::new("key=1;;key=2;;", ";;");
    assert_eq!(view.next(), "key=1;;");
    assert_eq!(view.next(), "key=2;;");
    assert!(!view.has_remaining());
}

#[test]
fn two_chunks_drained_one_by_one() {
    let mut buffer = LineBuffer::<32>::new();
    buffer.append(b"first\n");
    buffer.append(b"second\n");

    assert_eq!(buffer.next().value, b"first");
    assert!(buffer.size() > 0);

    assert_eq!(buffer.next().value, b"second");
    assert_eq!(buffer.size(), 0);
}

#[test]
fn full_buffer_wraps_without_losing_the_next_line() {
    let mut buffer = LineBuffer::<16>::new();
    buffer.append(b"0123456789abcdef");
    assert_eq!(buffer.discarded_by(8), 0);
    assert_eq!(buffer.discarded_by(20), 16);

    buffer.append(b"echo ok\n");
    let line = buffer.next();
    assert_eq!(line.value, b"echo ok");
    assert!(line.overflow);
}
