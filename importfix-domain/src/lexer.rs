//! A small JavaScript/TypeScript tokenizer.
//!
//! It knows just enough to tell code from strings, template text, regular
//! expression literals and comments. Whitespace is dropped. Scanning is
//! byte-based; every token boundary falls on an ASCII byte, so spans are
//! always valid `str` boundaries.
//!
//! Quoted strings never cross a line break. An apostrophe in JSX text
//! therefore swallows at most the rest of its line.

use importfix_types::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    /// `'...'` or `"..."`. Unterminated when the line (or input) ended first.
    Str { terminated: bool },
    /// Literal text of a template, from a backtick or `}` up to `${` or a backtick.
    Template,
    Regex,
    Punct(char),
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        self.span.slice(src)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn is_ident(&self, src: &str, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(src) == name
    }

    /// Contents of a terminated string literal, without the quotes.
    pub fn str_value<'a>(&self, src: &'a str) -> Option<&'a str> {
        match self.kind {
            TokenKind::Str { terminated: true } => {
                Some(&src[self.span.start + 1..self.span.end - 1])
            }
            _ => None,
        }
    }

    /// Span of a terminated string's contents.
    pub fn str_inner_span(&self) -> Option<Span> {
        match self.kind {
            TokenKind::Str { terminated: true } => {
                Some(Span::new(self.span.start + 1, self.span.end - 1))
            }
            _ => None,
        }
    }
}

/// Keywords after which a `/` starts a regular expression.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Byte length of a leading UTF-8 byte order mark, if any.
pub fn bom_len(src: &str) -> usize {
    if src.starts_with('\u{FEFF}') {
        '\u{FEFF}'.len_utf8()
    } else {
        0
    }
}

/// Tokens of `src`. A leading byte order mark is skipped.
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        src,
        bytes: src.as_bytes(),
        pos: bom_len(src),
        tokens: Vec::new(),
        templates: Vec::new(),
    };
    lexer.run();
    lexer.tokens
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
    /// Brace depth inside each open `${ ... }`, innermost last.
    templates: Vec<usize>,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

impl<'a> Lexer<'a> {
    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            let next = self.bytes.get(self.pos + 1).copied();
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => self.pos += 1,
                b'/' if next == Some(b'/') => self.line_comment(),
                b'/' if next == Some(b'*') => self.block_comment(),
                b'#' if self.pos == bom_len(self.src) && next == Some(b'!') => self.line_comment(),
                b'\'' | b'"' => self.string(b),
                b'`' => self.template_chunk(self.pos),
                b'/' if self.regex_allowed() => {
                    if !self.regex() {
                        self.punct(b);
                    }
                }
                b'{' => {
                    if let Some(depth) = self.templates.last_mut() {
                        *depth += 1;
                    }
                    self.punct(b);
                }
                b'}' => match self.templates.last().copied() {
                    Some(0) => {
                        self.templates.pop();
                        self.template_chunk(self.pos);
                    }
                    Some(depth) => {
                        if let Some(top) = self.templates.last_mut() {
                            *top = depth - 1;
                        }
                        self.punct(b);
                    }
                    None => self.punct(b),
                },
                b'0'..=b'9' => self.number(),
                _ if is_ident_start(b) => self.ident(),
                _ => self.punct(b),
            }
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, end),
        });
    }

    fn punct(&mut self, b: u8) {
        let start = self.pos;
        self.pos += 1;
        self.push(TokenKind::Punct(b as char), start, self.pos);
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
        self.push(TokenKind::LineComment, start, self.pos);
    }

    fn block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let end = self.src[self.pos..]
            .find("*/")
            .map(|i| self.pos + i + 2)
            .unwrap_or(self.bytes.len());
        self.pos = end;
        self.push(TokenKind::BlockComment, start, end);
    }

    fn string(&mut self, quote: u8) {
        let start = self.pos;
        self.pos += 1;
        let mut terminated = false;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'\n' => break,
                b if b == quote => {
                    self.pos += 1;
                    terminated = true;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
        self.push(TokenKind::Str { terminated }, start, self.pos);
    }

    /// Scan template text starting at the backtick or `}` at `start`.
    fn template_chunk(&mut self, start: usize) {
        self.pos = start + 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    self.push(TokenKind::Template, start, self.pos);
                    return;
                }
                b'$' if self.bytes.get(self.pos + 1) == Some(&b'{') => {
                    self.pos += 2;
                    self.push(TokenKind::Template, start, self.pos);
                    self.templates.push(0);
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.bytes.len();
        self.push(TokenKind::Template, start, self.pos);
    }

    fn number(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && (is_ident_byte(self.bytes[self.pos]) || self.bytes[self.pos] == b'.')
        {
            self.pos += 1;
        }
        self.push(TokenKind::Number, start, self.pos);
    }

    fn ident(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        self.push(TokenKind::Ident, start, self.pos);
    }

    fn regex_allowed(&self) -> bool {
        let Some(prev) = self.tokens.iter().rev().find(|t| !t.is_comment()) else {
            return true;
        };
        match prev.kind {
            TokenKind::Ident => REGEX_PREFIX_KEYWORDS.contains(&prev.text(self.src)),
            TokenKind::Number | TokenKind::Str { .. } | TokenKind::Regex => false,
            TokenKind::Template => prev.text(self.src).ends_with("${"),
            // `</tag>` closes a JSX element.
            TokenKind::Punct(')' | ']' | '}' | '<') => false,
            TokenKind::Punct(_) => true,
            TokenKind::LineComment | TokenKind::BlockComment => true,
        }
    }

    /// Try to scan a regex literal at `pos`. Leaves `pos` untouched on failure.
    fn regex(&mut self) -> bool {
        let start = self.pos;
        let mut i = start + 1;
        let mut in_class = false;
        loop {
            match self.bytes.get(i) {
                None | Some(b'\n') => return false,
                Some(b'\\') => i += 2,
                Some(b'[') => {
                    in_class = true;
                    i += 1;
                }
                Some(b']') => {
                    in_class = false;
                    i += 1;
                }
                Some(b'/') if !in_class => {
                    i += 1;
                    break;
                }
                Some(_) => i += 1,
            }
        }
        while i < self.bytes.len() && is_ident_byte(self.bytes[i]) {
            i += 1;
        }
        self.pos = i.min(self.bytes.len());
        self.push(TokenKind::Regex, start, self.pos);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, &str)> {
        tokenize(src)
            .into_iter()
            .map(|t| (t.kind, t.text(src)))
            .collect()
    }

    #[test]
    fn leading_byte_order_mark_is_skipped() {
        let src = "\u{FEFF}import a from 'a';";
        let toks = kinds(src);
        assert_eq!(toks[0], (TokenKind::Ident, "import"));
        assert_eq!(tokenize(src)[0].span.start, 3);
        assert_eq!(bom_len(src), 3);
        assert_eq!(bom_len("import"), 0);

        let shebang = "\u{FEFF}#!/usr/bin/env node\nrun();";
        assert_eq!(kinds(shebang)[0].0, TokenKind::LineComment);
    }

    #[test]
    fn import_statement_tokens() {
        let src = "import React, { useState } from 'react';";
        let toks = kinds(src);
        assert_eq!(toks[0], (TokenKind::Ident, "import"));
        assert_eq!(toks[1], (TokenKind::Ident, "React"));
        assert_eq!(toks[2], (TokenKind::Punct(','), ","));
        assert_eq!(toks[3], (TokenKind::Punct('{'), "{"));
        assert_eq!(
            toks[toks.len() - 2],
            (TokenKind::Str { terminated: true }, "'react'")
        );
        assert_eq!(toks[toks.len() - 1], (TokenKind::Punct(';'), ";"));
    }

    #[test]
    fn comments_and_strings_hide_identifiers() {
        let src = "// useState here\n/* useEffect */ const s = \"useRef\";";
        let idents: Vec<&str> = tokenize(src)
            .iter()
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text(src))
            .collect();
        assert_eq!(idents, vec!["const", "s"]);
    }

    #[test]
    fn template_expressions_are_code() {
        let src = "const s = `a ${useMemo(() => { return 1; })} b`;";
        let toks = tokenize(src);
        let idents: Vec<&str> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text(src))
            .collect();
        assert_eq!(idents, vec!["const", "s", "useMemo", "return"]);
        let templates = toks.iter().filter(|t| t.kind == TokenKind::Template).count();
        assert_eq!(templates, 2);
    }

    #[test]
    fn regex_versus_division() {
        let src = "const r = /it's/g; const d = a / b / c;";
        let toks = kinds(src);
        assert!(toks.contains(&(TokenKind::Regex, "/it's/g")));
        assert_eq!(
            toks.iter()
                .filter(|(k, _)| *k == TokenKind::Punct('/'))
                .count(),
            2
        );
    }

    #[test]
    fn jsx_closing_tag_is_not_a_regex() {
        let src = "<a>x</a><b>y</b>";
        let toks = kinds(src);
        assert!(!toks.iter().any(|(k, _)| *k == TokenKind::Regex));
        assert!(toks.contains(&(TokenKind::Ident, "y")));
    }

    #[test]
    fn unterminated_string_stops_at_line_end() {
        let src = "<p>Don't\nuseState(0)</p>";
        let toks = kinds(src);
        assert!(toks.contains(&(TokenKind::Str { terminated: false }, "'t")));
        assert!(toks.contains(&(TokenKind::Ident, "useState")));
    }

    #[test]
    fn shebang_is_a_comment() {
        let toks = kinds("#!/usr/bin/env node\nfoo()");
        assert_eq!(toks[0].0, TokenKind::LineComment);
        assert_eq!(toks[1], (TokenKind::Ident, "foo"));
    }

    #[test]
    fn non_ascii_text_keeps_boundaries() {
        let src = "const café = 'ü'; // ✓";
        let toks = tokenize(src);
        for t in &toks {
            assert!(src.is_char_boundary(t.span.start));
            assert!(src.is_char_boundary(t.span.end));
        }
        assert!(toks.iter().any(|t| t.text(src) == "café"));
    }

    #[test]
    fn str_value_strips_quotes() {
        let src = "\"@/data/x.json\"";
        let tok = tokenize(src)[0];
        assert_eq!(tok.str_value(src), Some("@/data/x.json"));
        assert_eq!(tok.str_inner_span(), Some(Span::new(1, 14)));
    }
}
