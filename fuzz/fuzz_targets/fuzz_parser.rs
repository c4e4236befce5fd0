//! Fuzz target: `Parser::parse_line` / `Parser::parse_terminated`
//!
//! Drives arbitrary text through both parse modes and checks that a failed
//! parse leaves no tokens behind and that the parser is always released.
//!
//! cargo fuzz run fuzz_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use termcore::{Parser, ParserError};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = core::str::from_utf8(data) else {
        return;
    };

    let parser = Parser::new();
    let mut rest = input;
    while !rest.is_empty() {
        let result = parser.parse_terminated(rest);
        if result.error != ParserError::Ok {
            assert!(result.tokens.is_empty());
            break;
        }
        assert!(result.remaining.len() < rest.len(), "parser must make progress");
        rest = result.remaining;
    }

    let _ = parser.parse_line(input);
    assert!(!parser.is_busy());
});
