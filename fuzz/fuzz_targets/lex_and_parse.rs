#![no_main]

//! Arbitrary text through the lexer and the import parser.
//!
//! Every token and statement span must lie on char boundaries inside the
//! input, and tokens must not overlap.

use importfix_domain::{ParsedSource, insertion_offset, lexer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else { return };

    let tokens = lexer::tokenize(src);
    let mut last_end = 0;
    for tok in &tokens {
        assert!(tok.span.start >= last_end);
        assert!(tok.span.end <= src.len());
        assert!(src.is_char_boundary(tok.span.start) && src.is_char_boundary(tok.span.end));
        last_end = tok.span.end;
    }

    let parsed = ParsedSource::parse(src);
    for stmt in parsed.statements() {
        assert!(stmt.span.end <= src.len());
        let _ = stmt.span.slice(src);
    }
    for record in parsed.records() {
        let _ = record.span.slice(src);
    }

    let at = insertion_offset(&parsed);
    assert!(src.is_char_boundary(at));
});
