//! Usage detection over code tokens.
//!
//! Strings, template text and comments never count as usages, and neither
//! do property accesses (`React.useState`) or identifiers inside import
//! statements.

use crate::lexer::{Token, TokenKind};
use crate::parser::ParsedSource;
use importfix_types::{DetectedSymbol, ModuleRule, SymbolRule, UsagePattern, UsageSet, Vocabulary};
use std::collections::{BTreeMap, BTreeSet};

const DECLARATION_KEYWORDS: &[&str] = &["const", "let", "var", "function", "class"];

/// Names a file already binds, either through imports or local declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    declared: BTreeSet<String>,
    imported: BTreeMap<String, BTreeSet<String>>,
    /// Identifiers of import statements that are never rewritten.
    opaque: BTreeSet<String>,
}

impl Bindings {
    pub fn collect(parsed: &ParsedSource<'_>) -> Self {
        let text = parsed.text();
        let tokens = parsed.tokens();
        let mut out = Bindings::default();

        for stmt in parsed.statements() {
            let Some(spec) = stmt.specifier.as_deref() else {
                continue;
            };
            match &stmt.record {
                Some(record) => {
                    let names = out.imported.entry(spec.to_string()).or_default();
                    names.extend(record.default_binding.iter().cloned());
                    names.extend(record.named.iter().map(|n| local_name(n).to_string()));
                }
                // Unrecognized shapes bind every identifier they contain.
                None => out.opaque.extend(
                    tokens[stmt.tokens.clone()]
                        .iter()
                        .filter(|t| t.kind == TokenKind::Ident)
                        .map(|t| t.text(text))
                        .filter(|n| !matches!(*n, "import" | "from" | "as" | "type"))
                        .map(str::to_string),
                ),
            }
        }

        let code: Vec<usize> = code_tokens(parsed).collect();
        for (pos, &idx) in code.iter().enumerate() {
            let tok = tokens[idx];
            if tok.kind != TokenKind::Ident || !DECLARATION_KEYWORDS.contains(&tok.text(text)) {
                continue;
            }
            let Some(&next) = code.get(pos + 1) else {
                continue;
            };
            let next_tok = tokens[next];
            match next_tok.kind {
                TokenKind::Ident => {
                    out.declared.insert(next_tok.text(text).to_string());
                }
                TokenKind::Punct(open @ ('{' | '[')) => {
                    out.declared
                        .extend(pattern_names(text, tokens, &code[pos + 1..], open));
                }
                _ => {}
            }
        }

        out
    }

    /// Is `name` bound by an import of a module other than `specifier`, or
    /// declared in the file?
    pub fn bound_elsewhere(&self, name: &str, specifier: &str) -> bool {
        self.declared.contains(name)
            || self.opaque.contains(name)
            || self
                .imported
                .iter()
                .any(|(spec, names)| spec != specifier && names.contains(name))
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.declared.contains(name)
            || self.opaque.contains(name)
            || self.imported.values().any(|n| n.contains(name))
    }
}

/// `a as b` binds `b`.
fn local_name(item: &str) -> &str {
    item.rsplit_once(" as ").map(|(_, b)| b).unwrap_or(item)
}

/// Identifiers of a destructuring pattern, skipping property keys.
fn pattern_names(text: &str, tokens: &[Token], code: &[usize], open: char) -> Vec<String> {
    let close = if open == '{' { '}' } else { ']' };
    let mut depth = 0usize;
    let mut names = Vec::new();
    for (pos, &idx) in code.iter().enumerate() {
        let tok = tokens[idx];
        match tok.kind {
            TokenKind::Punct(c) if c == open => depth += 1,
            TokenKind::Punct(c) if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            TokenKind::Ident => {
                let is_key = code
                    .get(pos + 1)
                    .is_some_and(|&n| tokens[n].is_punct(':'));
                if !is_key {
                    names.push(tok.text(text).to_string());
                }
            }
            _ => {}
        }
    }
    names
}

/// Indices of non-comment tokens outside import statements.
fn code_tokens<'p>(parsed: &'p ParsedSource<'_>) -> impl Iterator<Item = usize> + 'p {
    let statements = parsed.statements();
    let mut next_stmt = 0;
    parsed
        .tokens()
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_comment())
        .filter_map(move |(idx, _)| {
            while next_stmt < statements.len() && statements[next_stmt].tokens.end <= idx {
                next_stmt += 1;
            }
            match statements.get(next_stmt) {
                Some(stmt) if stmt.tokens.contains(&idx) => None,
                _ => Some(idx),
            }
        })
}

/// Identifier occurrences in code that are not property accesses. Yields
/// (index into code, token index).
fn bare_identifiers<'p>(
    parsed: &'p ParsedSource<'_>,
    code: &'p [usize],
) -> impl Iterator<Item = (usize, usize)> + 'p {
    let tokens = parsed.tokens();
    code.iter().enumerate().filter_map(move |(pos, &idx)| {
        if tokens[idx].kind != TokenKind::Ident {
            return None;
        }
        let after_dot = pos > 0 && tokens[code[pos - 1]].is_punct('.');
        (!after_dot).then_some((pos, idx))
    })
}

fn pattern_matches(pattern: UsagePattern, tokens: &[Token], code: &[usize], pos: usize) -> bool {
    let next_is = |c| code.get(pos + 1).is_some_and(|&n| tokens[n].is_punct(c));
    let prev_is = |c| pos > 0 && tokens[code[pos - 1]].is_punct(c);
    match pattern {
        UsagePattern::Reference => true,
        UsagePattern::Call => next_is('('),
        UsagePattern::Element => next_is('(') || prev_is('<'),
    }
}

/// Vocabulary symbols the file uses but does not bind from elsewhere.
pub fn detect_usages(parsed: &ParsedSource<'_>, vocab: &Vocabulary) -> UsageSet {
    let mut by_name: BTreeMap<&str, Vec<(&ModuleRule, &SymbolRule)>> = BTreeMap::new();
    for module in &vocab.modules {
        for symbol in &module.symbols {
            by_name
                .entry(symbol.name.as_str())
                .or_default()
                .push((module, symbol));
        }
    }
    if by_name.is_empty() {
        return UsageSet::new();
    }

    let text = parsed.text();
    let tokens = parsed.tokens();
    let bindings = Bindings::collect(parsed);
    let code: Vec<usize> = code_tokens(parsed).collect();

    let mut out = UsageSet::new();
    for (pos, idx) in bare_identifiers(parsed, &code) {
        let Some(rules) = by_name.get(tokens[idx].text(text)) else {
            continue;
        };
        for (module, symbol) in rules {
            if bindings.bound_elsewhere(&symbol.name, &module.specifier) {
                continue;
            }
            if pattern_matches(symbol.pattern, tokens, &code, pos) {
                out.insert(DetectedSymbol {
                    module: module.specifier.clone(),
                    name: symbol.name.clone(),
                    binding: symbol.binding,
                });
            }
        }
    }
    out
}

/// Does the file reference `name` in code without binding it anywhere?
pub fn is_unbound_reference(parsed: &ParsedSource<'_>, name: &str) -> bool {
    let text = parsed.text();
    let tokens = parsed.tokens();
    let code: Vec<usize> = code_tokens(parsed).collect();
    let referenced = bare_identifiers(parsed, &code).any(|(_, idx)| tokens[idx].text(text) == name);
    referenced && !Bindings::collect(parsed).is_bound(name)
}
