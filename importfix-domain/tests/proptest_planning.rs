//! Property-based tests for the synthesizer and the file planner.
//!
//! These tests verify that:
//! - Synthesis does not depend on the order records are supplied in
//! - Canonical named bindings are sorted and duplicate-free
//! - A planned file leaves at most one declaration per vocabulary module
//! - Planning an already planned file changes nothing

use camino::{Utf8Path, Utf8PathBuf};
use importfix_domain::{
    MemoryProjectView, ParsedSource, PlanContext, detect_usages, parse_imports, plan_file,
    synthesize,
};
use importfix_types::{ImportRecord, QuoteStyle, REACT_HOOKS, Span, UsageSet, Vocabulary};
use proptest::prelude::*;

fn arb_record(index: usize) -> impl Strategy<Value = ImportRecord> {
    (
        prop::option::of(prop::sample::select(vec!["React", "R", "Preact"])),
        prop::sample::subsequence(REACT_HOOKS.to_vec(), 0..4),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(move |(default, named, single, semicolon)| ImportRecord {
            specifier: "react".to_string(),
            span: Span::new(index * 100, index * 100 + 50),
            default_binding: default.map(str::to_string),
            named: named.into_iter().map(str::to_string).collect(),
            quote: if single {
                QuoteStyle::Single
            } else {
                QuoteStyle::Double
            },
            semicolon,
        })
}

fn arb_records() -> impl Strategy<Value = Vec<ImportRecord>> {
    (0usize..5).prop_flat_map(|n| (0..n).map(arb_record).collect::<Vec<_>>())
}

/// Lines a page component might contain.
const SNIPPETS: &[&str] = &[
    "import React from \"react\";",
    "import { useEffect } from 'react';",
    "import { useState, useRef } from \"react\"",
    "import Link from \"next/link\";",
    "import * as Icons from './icons';",
    "import './styles.css';",
    "'use client';",
    "// useMemo in a comment",
    "const label = \"useCallback\";",
    "const [v, setV] = useState(0);",
    "useEffect(() => {}, []);",
    "const ref = useRef(null);",
    "export const nav = <Link href=\"/\">home</Link>;",
    "const total = items.reduce((a, b) => a + b, 0) / 2;",
    "",
];

fn arb_source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(SNIPPETS.to_vec()), 0..12)
        .prop_map(|lines| lines.join("\n") + "\n")
}

fn plan(text: &str) -> importfix_domain::FilePlan {
    let ctx = PlanContext::new(Utf8PathBuf::from("/proj"));
    let view = MemoryProjectView::new("/proj");
    plan_file(&ctx, &view, Utf8Path::new("app/page.js"), text)
}

proptest! {
    /// Shuffling the input records never changes the rendered import.
    #[test]
    fn synthesis_is_order_independent(
        (records, shuffled) in arb_records()
            .prop_flat_map(|r| (Just(r.clone()), Just(r).prop_shuffle()))
    ) {
        let usages = UsageSet::new();
        let a = synthesize("react", &records, &usages);
        let b = synthesize("react", &shuffled, &usages);
        prop_assert_eq!(a.render(), b.render());
        prop_assert_eq!(a.conflicts, b.conflicts);
    }

    /// Named bindings come out strictly increasing.
    #[test]
    fn canonical_named_bindings_are_sorted(records in arb_records()) {
        let synthesis = synthesize("react", &records, &UsageSet::new());
        if let Some(canonical) = synthesis.canonical {
            let named: Vec<&String> = canonical.named.iter().collect();
            prop_assert!(named.windows(2).all(|w| w[0] < w[1]));
        }
    }

    /// After planning, each vocabulary module has at most one declaration.
    #[test]
    fn planned_files_have_unique_module_imports(text in arb_source()) {
        let planned = plan(&text);
        for module in &Vocabulary::default().modules {
            let records = parse_imports(&planned.text, &module.specifier);
            let bound = records.iter().any(|r| r.default_binding.is_some() || !r.named.is_empty());
            prop_assert!(!bound || records.len() == 1, "{}: {:?}", module.specifier, records);
        }
    }

    /// Every detected usage is bound by the planned text.
    #[test]
    fn planned_files_bind_every_usage(text in arb_source()) {
        let planned = plan(&text);
        let vocab = Vocabulary::default();
        let parsed = ParsedSource::parse(&planned.text);
        for symbol in detect_usages(&parsed, &vocab).iter() {
            let records = parse_imports(&planned.text, &symbol.module);
            prop_assert!(
                records.iter().any(|r| r.default_binding.as_deref() == Some(symbol.name.as_str())
                    || r.named.iter().any(|n| n == &symbol.name)),
                "{} not bound in:\n{}", symbol.name, planned.text
            );
        }
    }

    /// Planning is idempotent.
    #[test]
    fn planning_twice_changes_nothing(text in arb_source()) {
        let first = plan(&text);
        let second = plan(&first.text);
        prop_assert!(second.is_noop(), "{:?}\n{}", second.changes, first.text);
        prop_assert_eq!(second.text, first.text);
    }
}
