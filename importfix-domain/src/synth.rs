//! Canonical import synthesis.

use importfix_types::{
    BindingKind, CanonicalImport, ImportRecord, RenderStyle, UsageSet, Warning,
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    /// `None` when neither records nor usages bind anything.
    pub canonical: Option<CanonicalImport>,
    /// Punctuation of the first record in file order, or the defaults.
    pub style: RenderStyle,
    /// `DefaultConflict` warnings.
    pub conflicts: Vec<Warning>,
}

impl Synthesis {
    pub fn render(&self) -> Option<String> {
        self.canonical
            .as_ref()
            .and_then(|c| render_import(c, self.style))
    }
}

/// Merge `records` (all declarations of `specifier`) with the usages detected
/// for it. The result does not depend on the order of `records`.
pub fn synthesize(specifier: &str, records: &[ImportRecord], usages: &UsageSet) -> Synthesis {
    let mut sorted: Vec<&ImportRecord> = records
        .iter()
        .filter(|r| r.specifier == specifier)
        .collect();
    sorted.sort_by_key(|r| (r.span.start, r.span.end));

    let style = sorted.first().map(|r| r.style()).unwrap_or_default();
    let mut conflicts = Vec::new();
    let mut default_binding: Option<String> = None;
    let mut named: BTreeSet<String> = BTreeSet::new();

    for record in &sorted {
        named.extend(record.named.iter().cloned());
        let Some(d) = &record.default_binding else {
            continue;
        };
        match &default_binding {
            None => default_binding = Some(d.clone()),
            Some(kept) if kept != d => conflicts.push(conflict(specifier, kept, d)),
            Some(_) => {}
        }
    }

    for symbol in usages.for_module(specifier) {
        match symbol.binding {
            BindingKind::Named => {
                named.insert(symbol.name.clone());
            }
            BindingKind::Default => {
                if binds_locally(&named, &symbol.name) {
                    continue;
                }
                match &default_binding {
                    None => default_binding = Some(symbol.name.clone()),
                    Some(kept) if *kept != symbol.name => {
                        conflicts.push(conflict(specifier, kept, &symbol.name))
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let canonical = (default_binding.is_some() || !named.is_empty()).then(|| CanonicalImport {
        specifier: specifier.to_string(),
        default_binding,
        named,
    });

    Synthesis {
        canonical,
        style,
        conflicts,
    }
}

fn conflict(module: &str, kept: &str, discarded: &str) -> Warning {
    Warning::DefaultConflict {
        module: module.to_string(),
        kept: kept.to_string(),
        discarded: discarded.to_string(),
    }
}

fn binds_locally(named: &BTreeSet<String>, name: &str) -> bool {
    named
        .iter()
        .any(|item| item == name || item.rsplit_once(" as ").is_some_and(|(_, b)| b == name))
}

/// `import <clause> from "<specifier>";` in the given style.
pub fn render_import(canonical: &CanonicalImport, style: RenderStyle) -> Option<String> {
    let clause = canonical.clause()?;
    let q = style.quote.as_char();
    let semi = if style.semicolon { ";" } else { "" };
    Some(format!(
        "import {clause} from {q}{}{q}{semi}",
        canonical.specifier
    ))
}

/// Usages of `specifier` the synthesized import fails to bind, excluding
/// those already reported as conflicts.
pub fn check_consistency(
    specifier: &str,
    synthesis: &Synthesis,
    usages: &UsageSet,
) -> Vec<Warning> {
    usages
        .for_module(specifier)
        .filter(|s| {
            let bound = synthesis.canonical.as_ref().is_some_and(|c| {
                c.binds(&s.name) || binds_locally(&c.named, &s.name)
            });
            let explained = synthesis.conflicts.iter().any(|w| {
                matches!(w, Warning::DefaultConflict { discarded, .. } if *discarded == s.name)
            });
            !bound && !explained
        })
        .map(|s| Warning::Inconsistency {
            module: specifier.to_string(),
            symbol: s.name.clone(),
        })
        .collect()
}
