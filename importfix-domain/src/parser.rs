//! Import declarations, recovered from the token stream.
//!
//! Every top-level statement that starts with the `import` keyword becomes an
//! [`ImportStatement`]. Only the shapes
//!
//! ```text
//! import Default from 'm';
//! import { a, b as c } from 'm';
//! import Default, { a } from 'm';
//! ```
//!
//! additionally carry an [`ImportRecord`]. Everything else (namespace and
//! type-only imports, side-effect imports, declarations with comments inside)
//! is known to be an import but is never rewritten.

use crate::lexer::{Token, TokenKind, tokenize};
use importfix_types::{ImportRecord, QuoteStyle, Span};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub span: Span,
    /// Indices into [`ParsedSource::tokens`].
    pub tokens: Range<usize>,
    pub specifier: Option<String>,
    pub record: Option<ImportRecord>,
}

/// A file's text together with its tokens and top-level import statements.
#[derive(Debug, Clone)]
pub struct ParsedSource<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    statements: Vec<ImportStatement>,
}

impl<'a> ParsedSource<'a> {
    pub fn parse(text: &'a str) -> Self {
        let tokens = tokenize(text);
        let statements = scan_statements(text, &tokens);
        Self {
            text,
            tokens,
            statements,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn statements(&self) -> &[ImportStatement] {
        &self.statements
    }

    pub fn records(&self) -> impl Iterator<Item = &ImportRecord> {
        self.statements.iter().filter_map(|s| s.record.as_ref())
    }

    /// Recognized declarations of `specifier`, in file order.
    pub fn records_for(&self, specifier: &str) -> Vec<ImportRecord> {
        self.records()
            .filter(|r| r.specifier == specifier)
            .cloned()
            .collect()
    }

    /// Index of the next non-comment token at or after `from`.
    pub fn next_significant(&self, from: usize) -> Option<usize> {
        next_significant(&self.tokens, from)
    }

    /// Index of the closest non-comment token before `before`.
    pub fn prev_significant(&self, before: usize) -> Option<usize> {
        self.tokens[..before].iter().rposition(|t| !t.is_comment())
    }
}

/// Every recognized declaration of `specifier` in `text`, in file order.
pub fn parse_imports(text: &str, specifier: &str) -> Vec<ImportRecord> {
    ParsedSource::parse(text).records_for(specifier)
}

/// Every recognized declaration in `text`, in file order.
pub fn parse_all_imports(text: &str) -> Vec<ImportRecord> {
    ParsedSource::parse(text).records().cloned().collect()
}

pub(crate) fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Whitespace only, counting a byte order mark as whitespace.
pub(crate) fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c.is_whitespace() || c == '\u{FEFF}')
}

pub(crate) fn first_on_line(text: &str, offset: usize) -> bool {
    is_blank(&text[line_start(text, offset)..offset])
}

fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !tokens[i].is_comment())
}

fn scan_statements(text: &str, tokens: &[Token]) -> Vec<ImportStatement> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        match tok.kind {
            TokenKind::Punct('{') => depth += 1,
            TokenKind::Punct('}') => depth = depth.saturating_sub(1),
            TokenKind::Ident if depth == 0 && tok.text(text) == "import" => {
                let leading = first_on_line(text, tok.span.start);
                let after_semicolon = tokens[..i]
                    .iter()
                    .rposition(|t| !t.is_comment())
                    .is_some_and(|p| tokens[p].is_punct(';'));
                // A statement sharing its line with earlier code is kept
                // opaque so it is never rewritten.
                if (leading || after_semicolon)
                    && let Some(stmt) = statement_at(text, tokens, i, leading)
                {
                    i = stmt.tokens.end;
                    out.push(stmt);
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    out
}

fn statement_at(
    text: &str,
    tokens: &[Token],
    at: usize,
    recognize: bool,
) -> Option<ImportStatement> {
    let head = tokens[at];
    let next = next_significant(tokens, at + 1)?;

    // `import(...)` and `import.meta` are expressions.
    if tokens[next].is_punct('(') || tokens[next].is_punct('.') {
        return None;
    }

    let spec_idx = if matches!(tokens[next].kind, TokenKind::Str { .. }) {
        Some(next)
    } else {
        find_from_specifier(text, tokens, at, next)
    };

    let Some(spec_idx) = spec_idx else {
        // Unknown shape: the statement extends to the end of its line.
        let line_end = text[head.span.start..]
            .find('\n')
            .map(|o| head.span.start + o)
            .unwrap_or(text.len());
        let last = (at..tokens.len())
            .take_while(|&j| tokens[j].span.start < line_end)
            .last()
            .unwrap_or(at);
        return Some(ImportStatement {
            span: Span::new(head.span.start, tokens[last].span.end.max(head.span.end)),
            tokens: at..last + 1,
            specifier: None,
            record: None,
        });
    };

    let spec_tok = tokens[spec_idx];
    let mut end_idx = spec_idx;
    if let Some(n) = next_significant(tokens, spec_idx + 1)
        && tokens[n].is_punct(';')
        && !text[spec_tok.span.end..tokens[n].span.start].contains('\n')
    {
        end_idx = n;
    }

    let span = Span::new(head.span.start, tokens[end_idx].span.end);
    let specifier = spec_tok.str_value(text).map(str::to_string);
    let record = specifier
        .as_deref()
        .filter(|_| recognize)
        .and_then(|spec| parse_record(text, tokens, at, spec_idx, end_idx, spec, span));

    Some(ImportStatement {
        span,
        tokens: at..end_idx + 1,
        specifier,
        record,
    })
}

/// Find the string after `from`, stopping at `;` or the next import statement.
fn find_from_specifier(text: &str, tokens: &[Token], at: usize, from: usize) -> Option<usize> {
    let mut j = from;
    while j < tokens.len() {
        let t = tokens[j];
        if t.is_punct(';') {
            return None;
        }
        if t.is_ident(text, "import") && j != at && first_on_line(text, t.span.start) {
            return None;
        }
        if t.is_ident(text, "from") {
            let k = next_significant(tokens, j + 1)?;
            return match tokens[k].kind {
                TokenKind::Str { .. } => Some(k),
                _ => None,
            };
        }
        j += 1;
    }
    None
}

fn parse_record(
    text: &str,
    tokens: &[Token],
    at: usize,
    spec_idx: usize,
    end_idx: usize,
    specifier: &str,
    span: Span,
) -> Option<ImportRecord> {
    if tokens[at..=end_idx].iter().any(Token::is_comment) {
        return None;
    }
    // Side-effect import: `import 'm'`.
    if spec_idx == at + 1 {
        return None;
    }
    let from_idx = spec_idx - 1;
    if !tokens[from_idx].is_ident(text, "from") {
        return None;
    }

    let (default_binding, named) = parse_clause(text, &tokens[at + 1..from_idx])?;
    let quote = QuoteStyle::from_char(text[tokens[spec_idx].span.start..].chars().next()?)?;

    Some(ImportRecord {
        specifier: specifier.to_string(),
        span,
        default_binding,
        named,
        quote,
        semicolon: end_idx != spec_idx,
    })
}

fn parse_clause(text: &str, clause: &[Token]) -> Option<(Option<String>, Vec<String>)> {
    let mut default_binding = None;
    let mut rest = clause;

    if let Some(first) = rest.first()
        && first.kind == TokenKind::Ident
    {
        default_binding = Some(first.text(text).to_string());
        rest = &rest[1..];
        if rest.is_empty() {
            return Some((default_binding, Vec::new()));
        }
        if !rest[0].is_punct(',') || rest.len() == 1 {
            return None;
        }
        rest = &rest[1..];
    }

    let (open, rest) = rest.split_first()?;
    let (close, inner) = rest.split_last()?;
    if !open.is_punct('{') || !close.is_punct('}') {
        return None;
    }

    let items: Vec<&[Token]> = inner.split(|t| t.is_punct(',')).collect();
    let last = items.len() - 1;
    let mut named = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match item {
            [] if inner.is_empty() || (idx == last && idx > 0) => {}
            [name] if name.kind == TokenKind::Ident => named.push(name.text(text).to_string()),
            [name, kw, alias]
                if name.kind == TokenKind::Ident
                    && kw.is_ident(text, "as")
                    && alias.kind == TokenKind::Ident =>
            {
                named.push(format!("{} as {}", name.text(text), alias.text(text)));
            }
            _ => return None,
        }
    }

    Some((default_binding, named))
}
