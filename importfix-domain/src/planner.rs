use crate::lexer::bom_len;
use crate::locate::{directive_offset, directive_present, insertion_offset, next_line};
use crate::parser::{ParsedSource, is_blank, line_start};
use crate::ports::ProjectView;
use crate::rewrite::{DataContext, rewrite_data_paths};
use crate::synth::{check_consistency, synthesize};
use crate::usage::{detect_usages, is_unbound_reference};
use camino::{Utf8Path, Utf8PathBuf};
use importfix_types::{Change, ChangeKind, ImportRecord, ModuleRule, Span, Vocabulary, Warning};

#[derive(Debug, Clone)]
pub struct PlanContext {
    pub project_root: Utf8PathBuf,
    /// Absolute, or relative to `project_root`.
    pub data_dir: Utf8PathBuf,
    pub vocabulary: Vocabulary,
}

impl PlanContext {
    pub fn new(project_root: Utf8PathBuf) -> Self {
        Self {
            project_root,
            data_dir: Utf8PathBuf::from("data"),
            vocabulary: Vocabulary::default(),
        }
    }

    fn data(&self) -> DataContext<'_> {
        DataContext {
            project_root: &self.project_root,
            data_dir: &self.data_dir,
            alias: &self.vocabulary.data.alias,
        }
    }
}

/// Candidate text for one file and what went into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePlan {
    pub text: String,
    pub changes: Vec<Change>,
    pub warnings: Vec<Warning>,
}

impl FilePlan {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Compute the normalized text of `path` (absolute, or relative to the
/// project root).
///
/// Vocabulary modules are handled first, in specifier order, then data-file
/// imports are added, then data specifiers are rewritten. Each step re-reads
/// the text produced by the previous one.
pub fn plan_file(
    ctx: &PlanContext,
    view: &dyn ProjectView,
    path: &Utf8Path,
    text: &str,
) -> FilePlan {
    let eol = line_ending(text);
    let mut plan = FilePlan {
        text: text.to_string(),
        ..FilePlan::default()
    };

    for module in ctx.vocabulary.modules_sorted() {
        normalize_module(&ctx.vocabulary, module, eol, &mut plan);
    }

    let rel = path.strip_prefix(&ctx.project_root).unwrap_or(path);
    add_data_imports(ctx, view, rel, eol, &mut plan);

    let parsed = ParsedSource::parse(&plan.text);
    let rewrite = rewrite_data_paths(&parsed, path, &ctx.data(), view);
    plan.warnings.extend(rewrite.warnings);
    if !rewrite.rewritten.is_empty() {
        plan.changes
            .extend(rewrite.rewritten.into_iter().map(|r| Change {
                kind: ChangeKind::Rewritten,
                module: r.from,
                detail: r.to,
            }));
        plan.text = rewrite.text;
    }

    plan
}

fn normalize_module(vocab: &Vocabulary, module: &ModuleRule, eol: &str, plan: &mut FilePlan) {
    let specifier = module.specifier.as_str();
    let parsed = ParsedSource::parse(&plan.text);
    let records = parsed.records_for(specifier);
    let usages = detect_usages(&parsed, vocab);
    if records.is_empty() && usages.for_module(specifier).next().is_none() {
        return;
    }

    let synthesis = synthesize(specifier, &records, &usages);
    plan.warnings.extend(synthesis.conflicts.iter().cloned());
    plan.warnings
        .extend(check_consistency(specifier, &synthesis, &usages));

    let (Some(canonical), Some(rendered)) = (&synthesis.canonical, synthesis.render()) else {
        return;
    };

    let text = parsed.text();
    let mut edits = Vec::new();
    let kind = match records.as_slice() {
        [] => {
            if module.requires_directive && !directive_present(&parsed, &vocab.client_directive) {
                let offset = directive_offset(text);
                edits.push(Edit::insert(
                    offset,
                    format!("'{}';{eol}{eol}", vocab.client_directive),
                ));
            }
            edits.push(insert_line(text, insertion_offset(&parsed), &rendered, eol));
            ChangeKind::Inserted
        }
        [record] if canonical.matches_record(record) => return,
        [record] => {
            edits.push(Edit::replace(record.span, rendered.clone()));
            ChangeKind::Patched
        }
        many => {
            edits.push(insert_line(text, insertion_offset(&parsed), &rendered, eol));
            edits.extend(many.iter().map(|r| remove_record(text, r)));
            ChangeKind::Merged
        }
    };

    tracing::debug!(module = specifier, kind = kind.as_str(), "normalize module import");
    let detail = match kind {
        ChangeKind::Merged => format!("{} declarations -> {rendered}", records.len()),
        _ => rendered,
    };
    plan.text = apply_edits(text, edits);
    plan.changes.push(Change {
        kind,
        module: specifier.to_string(),
        detail,
    });
}

fn add_data_imports(
    ctx: &PlanContext,
    view: &dyn ProjectView,
    rel: &Utf8Path,
    eol: &str,
    plan: &mut FilePlan,
) {
    let data = ctx.data();
    for rule in &ctx.vocabulary.data.rules {
        if !rule.matches_path(rel.as_str()) {
            continue;
        }
        let parsed = ParsedSource::parse(&plan.text);
        if !is_unbound_reference(&parsed, &rule.binding) {
            continue;
        }

        let specifier = format!("{}{}", data.alias, rule.file);
        let target = data.data_root().join(&rule.file);
        if !view.exists(&target) {
            plan.warnings.push(Warning::MissingDataFile {
                specifier,
                target: data.display(&target),
            });
            continue;
        }

        let line = format!("import {} from \"{specifier}\";", rule.binding);
        let edit = insert_line(parsed.text(), insertion_offset(&parsed), &line, eol);
        plan.text = apply_edits(parsed.text(), vec![edit]);
        plan.changes.push(Change {
            kind: ChangeKind::Inserted,
            module: specifier,
            detail: line,
        });
    }
}

/// `\r\n` when the file already uses it, otherwise `\n`.
fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    span: Span,
    replacement: String,
}

impl Edit {
    fn insert(at: usize, text: String) -> Self {
        Self::replace(Span::new(at, at), text)
    }

    fn replace(span: Span, replacement: String) -> Self {
        Self { span, replacement }
    }
}

fn insert_line(text: &str, offset: usize, line: &str, eol: &str) -> Edit {
    let lead = if offset == text.len() && !text.is_empty() && !text.ends_with('\n') {
        eol
    } else {
        ""
    };
    Edit::insert(offset, format!("{lead}{line}{eol}"))
}

/// Remove a record's whole line when nothing else is on it, otherwise just
/// the declaration.
fn remove_record(text: &str, record: &ImportRecord) -> Edit {
    let start = line_start(text, record.span.start).max(bom_len(text));
    let end = next_line(text, record.span.end);
    let alone =
        is_blank(&text[start..record.span.start]) && is_blank(&text[record.span.end..end]);
    let span = if alone {
        Span::new(start, end)
    } else {
        record.span
    };
    Edit::replace(span, String::new())
}

/// Apply non-overlapping edits. Insertions at the same offset keep their
/// order and come before a removal starting there.
fn apply_edits(text: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| (e.span.start, e.span.end));
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for edit in &edits {
        let start = edit.span.start.max(last);
        out.push_str(&text[last..start]);
        out.push_str(&edit.replacement);
        last = edit.span.end.max(start);
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_imports;
    use crate::ports::MemoryProjectView;
    use pretty_assertions::assert_eq;

    fn plan(text: &str) -> FilePlan {
        let ctx = PlanContext::new(Utf8PathBuf::from("/proj"));
        let view = MemoryProjectView::new("/proj");
        plan_file(&ctx, &view, Utf8Path::new("app/page.js"), text)
    }

    #[test]
    fn apply_edits_orders_inserts_before_removals() {
        let text = "abc\ndef\n";
        let out = apply_edits(
            text,
            vec![
                Edit::replace(Span::new(4, 8), String::new()),
                Edit::insert(4, "X\n".to_string()),
                Edit::insert(0, "0\n".to_string()),
            ],
        );
        assert_eq!(out, "0\nabc\nX\n");
    }

    #[test]
    fn insert_line_adds_leading_newline_at_unterminated_end() {
        let edit = insert_line("import a from 'a'", 17, "import b from 'b';", "\n");
        assert_eq!(edit.replacement, "\nimport b from 'b';\n");
    }

    #[test]
    fn remove_record_keeps_other_code_on_the_line() {
        let text = "import a from 'react'; foo();\n";
        let record = ParsedSource::parse(text).records_for("react").remove(0);
        let edit = remove_record(text, &record);
        assert_eq!(edit.span, record.span);

        let alone = "import a from 'react';\nfoo();\n";
        let record = ParsedSource::parse(alone).records_for("react").remove(0);
        assert_eq!(remove_record(alone, &record).span, Span::new(0, 23));
    }

    #[test]
    fn canonical_single_record_is_untouched() {
        let text = "import React, { useState } from 'react'\nuseState(0)\n";
        let p = plan(text);
        assert!(p.is_noop());
        assert_eq!(p.text, text);
    }

    #[test]
    fn single_record_is_patched_in_place_keeping_its_style() {
        let text = "// top\nimport { useState, useEffect } from 'react'\nuseRef();\n";
        let p = plan(text);
        assert_eq!(
            p.text,
            "// top\nimport { useEffect, useRef, useState } from 'react'\nuseRef();\n"
        );
        assert_eq!(p.changes[0].kind, ChangeKind::Patched);
    }

    #[test]
    fn directive_follows_shebang() {
        let text = "#!/usr/bin/env node\nuseState();\n";
        assert_eq!(
            plan(text).text,
            "#!/usr/bin/env node\n'use client';\n\nimport { useState } from \"react\";\nuseState();\n"
        );
    }

    #[test]
    fn existing_directive_is_not_duplicated() {
        let text = "\"use client\";\n\nexport default () => useRef(null);\n";
        assert_eq!(
            plan(text).text,
            "\"use client\";\n\nimport { useRef } from \"react\";\nexport default () => useRef(null);\n"
        );
    }

    #[test]
    fn crlf_files_stay_crlf() {
        let text = "import Link from 'next/link';\r\nuseMemo(f);\r\n";
        let p = plan(text);
        assert_eq!(
            p.text,
            "'use client';\r\n\r\nimport Link from 'next/link';\r\nimport { useMemo } from \"react\";\r\nuseMemo(f);\r\n"
        );
    }

    #[test]
    fn merged_import_lands_at_end_of_import_block() {
        let text = "'use client';\n\nimport { useEffect } from 'react';\nimport Link from 'next/link';\nimport React from 'react';\n\nexport default function P() {}\n";
        let p = plan(text);
        assert_eq!(
            p.text,
            "'use client';\n\nimport Link from 'next/link';\nimport React, { useEffect } from 'react';\n\nexport default function P() {}\n"
        );
        assert_eq!(p.changes.len(), 1);
        assert_eq!(p.changes[0].kind, ChangeKind::Merged);
    }

    #[test]
    fn link_usage_inserts_default_import_without_directive() {
        let text = "export default () => <Link href=\"/\">x</Link>;\n";
        let p = plan(text);
        assert_eq!(
            p.text,
            "import Link from \"next/link\";\nexport default () => <Link href=\"/\">x</Link>;\n"
        );
    }

    #[test]
    fn data_import_is_inserted_then_made_relative() {
        let ctx = PlanContext::new(Utf8PathBuf::from("/proj"));
        let view = MemoryProjectView::new("/proj").with_file("data/jobs.json", "[]");
        let text = "export default () => jobs.length;\n";
        let p = plan_file(&ctx, &view, Utf8Path::new("app/jobs/page.js"), text);
        assert_eq!(
            p.text,
            "import jobs from \"../../data/jobs.json\";\nexport default () => jobs.length;\n"
        );
        let kinds: Vec<ChangeKind> = p.changes.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Inserted, ChangeKind::Rewritten]);

        let again = plan_file(&ctx, &view, Utf8Path::new("app/jobs/page.js"), &p.text);
        assert!(again.is_noop());
    }

    #[test]
    fn missing_data_file_for_rule_is_a_warning() {
        let ctx = PlanContext::new(Utf8PathBuf::from("/proj"));
        let view = MemoryProjectView::new("/proj");
        let text = "malwareData.map(x => x);\n";
        let p = plan_file(&ctx, &view, Utf8Path::new("app/malware/page.js"), text);
        assert_eq!(p.text, text);
        assert_eq!(
            p.warnings,
            vec![Warning::MissingDataFile {
                specifier: "@/data/malware.json".to_string(),
                target: "data/malware.json".to_string(),
            }]
        );
    }

    #[test]
    fn empty_duplicate_imports_are_left_alone() {
        let text = "import {} from 'react';\nimport {} from 'react';\n";
        assert!(plan(text).is_noop());
    }

    #[test]
    fn byte_order_mark_file_is_patched_in_place() {
        let text = "\u{FEFF}import React from \"react\";\nuseState(0);\n";
        let p = plan(text);
        assert_eq!(
            p.text,
            "\u{FEFF}import React, { useState } from \"react\";\nuseState(0);\n"
        );
        assert_eq!(p.changes[0].kind, ChangeKind::Patched);
        assert_eq!(parse_imports(&p.text, "react").len(), 1);
        assert!(plan(&p.text).is_noop());
    }

    #[test]
    fn byte_order_mark_stays_first_when_inserting() {
        let p = plan("\u{FEFF}useState(0);\n");
        assert_eq!(
            p.text,
            "\u{FEFF}'use client';\n\nimport { useState } from \"react\";\nuseState(0);\n"
        );

        let merged =
            plan("\u{FEFF}import { useEffect } from 'react';\nimport React from 'react';\nuseEffect();\n");
        assert_eq!(
            merged.text,
            "\u{FEFF}import React, { useEffect } from 'react';\nuseEffect();\n"
        );
    }

    #[test]
    fn second_import_on_a_line_is_left_alone_and_binds_its_names() {
        let text = "import React from 'react'; import { useState } from 'react';\nuseState(0);\n";
        let p = plan(text);
        assert!(p.is_noop(), "{:?}", p.changes);
        assert_eq!(p.text, text);
    }
}
