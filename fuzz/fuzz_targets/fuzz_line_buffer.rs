//! Fuzz target: `LineBuffer::append` / `LineBuffer::next_line`
//!
//! Splits arbitrary bytes into chunks and feeds them into a small line
//! buffer, which must never yield more than fits and must always accept
//! input again after a reset.
//!
//! cargo fuzz run fuzz_line_buffer

#![no_main]

use libfuzzer_sys::fuzz_target;
use termcore::LineBuffer;

fuzz_target!(|data: &[u8]| {
    let Some((&split, data)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(split).max(1);

    let mut buffer = LineBuffer::<64>::new();
    for part in data.chunks(chunk) {
        buffer.append(part);
        assert!(buffer.size() <= buffer.capacity());

        while let Some(line) = buffer.next_line() {
            assert!(line.value.len() < 64);
        }
    }

    buffer.reset();
    assert!(!buffer.overflow());
    buffer.append(b"ok\n");
    assert_eq!(buffer.next().value, b"ok");
});
