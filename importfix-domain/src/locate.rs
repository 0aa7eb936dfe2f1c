//! Where new lines go: after the file's prologue and its leading import block.

use crate::lexer::{Token, TokenKind, bom_len};
use crate::parser::{ImportStatement, ParsedSource, line_start};

/// Byte offset just past the line containing `pos`.
pub(crate) fn next_line(text: &str, pos: usize) -> usize {
    text[pos..]
        .find('\n')
        .map(|i| pos + i + 1)
        .unwrap_or(text.len())
}

fn line_tokens(tokens: &[Token], start: usize, end: usize) -> impl Iterator<Item = &Token> {
    let first = tokens.partition_point(|t| t.span.end <= start);
    tokens[first..].iter().take_while(move |t| t.span.start < end)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    /// Blank, or nothing but comments (a `#!` line included).
    Trivia,
    /// A lone string statement; the value is the string's contents.
    Directive(&'a str),
    Code,
}

fn classify<'a>(parsed: &ParsedSource<'a>, start: usize) -> LineKind<'a> {
    let text = parsed.text();
    let end = next_line(text, start);
    let code: Vec<&Token> = line_tokens(parsed.tokens(), start, end)
        .filter(|t| !t.is_comment())
        .collect();
    match code.as_slice() {
        [] => LineKind::Trivia,
        [s] | [s, _]
            if s.span.start >= start
                && matches!(s.kind, TokenKind::Str { terminated: true }) =>
        {
            let terminated = code.get(1).is_none_or(|t| t.is_punct(';'));
            match (terminated, s.str_value(text)) {
                (true, Some(value)) => LineKind::Directive(value),
                _ => LineKind::Code,
            }
        }
        _ => LineKind::Code,
    }
}

/// Start of the first line after leading trivia and directive lines, plus
/// every directive value found on the way.
fn prologue<'a>(parsed: &ParsedSource<'a>) -> (usize, Vec<&'a str>) {
    let text = parsed.text();
    let mut pos = 0;
    let mut directives = Vec::new();
    while pos < text.len() {
        match classify(parsed, pos) {
            LineKind::Trivia => {}
            LineKind::Directive(value) => directives.push(value),
            LineKind::Code => break,
        }
        pos = next_line(text, pos);
    }
    (pos, directives)
}

fn statement_starting_on_line<'p>(
    parsed: &'p ParsedSource<'_>,
    pos: usize,
) -> Option<&'p ImportStatement> {
    let text = parsed.text();
    parsed
        .statements()
        .iter()
        .find(|s| line_start(text, s.span.start) == pos)
}

/// Offset where a new import line belongs.
///
/// Leading blank and comment lines and the directive prologue are skipped.
/// If an import statement follows immediately, the contiguous import block is
/// skipped too, including blank lines between its statements. Blank lines
/// after the last import stay below the insertion point. The result is the
/// start of a line (past a leading byte order mark) or the end of the text.
pub fn insertion_offset(parsed: &ParsedSource<'_>) -> usize {
    let text = parsed.text();
    let (mut pos, _) = prologue(parsed);

    while let Some(stmt) = statement_starting_on_line(parsed, pos) {
        pos = next_line(text, stmt.span.end.max(pos));
        let mut ahead = pos;
        while ahead < text.len() && text[ahead..next_line(text, ahead)].trim().is_empty() {
            ahead = next_line(text, ahead);
        }
        if statement_starting_on_line(parsed, ahead).is_none() {
            break;
        }
        pos = ahead;
    }
    pos.max(bom_len(text))
}

/// Does the directive prologue already contain `directive`?
pub fn directive_present(parsed: &ParsedSource<'_>, directive: &str) -> bool {
    prologue(parsed).1.contains(&directive)
}

/// Where a new directive goes: the top of the file, or after a `#!` line.
/// A leading byte order mark stays first.
pub fn directive_offset(text: &str) -> usize {
    let start = bom_len(text);
    if text[start..].starts_with("#!") {
        next_line(text, start)
    } else {
        start
    }
}
