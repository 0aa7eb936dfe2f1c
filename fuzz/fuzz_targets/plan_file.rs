#![no_main]

//! Structured sources through the file planner.

use camino::Utf8Path;
use importfix_domain::{MemoryProjectView, ParsedSource, PlanContext, plan_file};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
struct PlanInput {
    /// Free-form source text.
    source: String,
    /// Pieces drawn from the recognized vocabulary, appended to `source`.
    fragments: Vec<Fragment>,
    crlf: bool,
}

#[derive(Debug, arbitrary::Arbitrary)]
enum Fragment {
    ReactDefault,
    ReactNamed(u8),
    LinkImport,
    DataAlias,
    Directive,
    HookCall(u8),
    LinkElement,
    Code(String),
}

const HOOKS: &[&str] = &["useState", "useEffect", "useMemo", "useRef"];

impl Fragment {
    fn render(&self) -> String {
        match self {
            Fragment::ReactDefault => "import React from \"react\";".to_string(),
            Fragment::ReactNamed(i) => {
                format!("import {{ {} }} from 'react'", HOOKS[*i as usize % HOOKS.len()])
            }
            Fragment::LinkImport => "import Link from \"next/link\";".to_string(),
            Fragment::DataAlias => "import x from \"@/data/x.json\";".to_string(),
            Fragment::Directive => "'use client';".to_string(),
            Fragment::HookCall(i) => format!("{}();", HOOKS[*i as usize % HOOKS.len()]),
            Fragment::LinkElement => "const el = <Link href=\"/\" />;".to_string(),
            Fragment::Code(s) => s.clone(),
        }
    }
}

fuzz_target!(|input: PlanInput| {
    let eol = if input.crlf { "\r\n" } else { "\n" };
    let mut text = input.source.clone();
    for fragment in &input.fragments {
        text.push_str(eol);
        text.push_str(&fragment.render());
    }

    let view = MemoryProjectView::new("/proj").with_file("data/x.json", "[]");
    let ctx = PlanContext::new("/proj".into());
    let plan = plan_file(&ctx, &view, Utf8Path::new("app/page.js"), &text);

    // The planned text must still parse.
    let _ = ParsedSource::parse(&plan.text).records().count();
    let _ = plan_file(&ctx, &view, Utf8Path::new("app/page.js"), &plan.text);
});
