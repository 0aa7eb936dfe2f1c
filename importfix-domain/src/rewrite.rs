//! Data-file specifier rewriting.
//!
//! A specifier is rewritten when it uses the data alias (`@/data/x.json`) or
//! when it is a relative path that no longer resolves but still names the
//! data directory (`../data/x.json` after the importer moved). Either way the
//! new specifier is the path from the importer's directory to the data file.

use crate::lexer::TokenKind;
use crate::parser::ParsedSource;
use crate::ports::ProjectView;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use importfix_types::{Span, Warning};

/// Where data files live and how they are addressed.
#[derive(Debug, Clone, Copy)]
pub struct DataContext<'a> {
    pub project_root: &'a Utf8Path,
    /// Absolute, or relative to `project_root`.
    pub data_dir: &'a Utf8Path,
    pub alias: &'a str,
}

impl DataContext<'_> {
    pub fn data_root(&self) -> Utf8PathBuf {
        normalize(&self.project_root.join(self.data_dir))
    }

    /// `target` relative to the project root when it lies inside it.
    pub fn display(&self, target: &Utf8Path) -> String {
        target
            .strip_prefix(self.project_root)
            .unwrap_or(target)
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifierRewrite {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub rewritten: Vec<SpecifierRewrite>,
    pub warnings: Vec<Warning>,
}

/// Resolve `.` and `..` without touching the file system.
pub fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Utf8Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_str()),
        }
    }
    out
}

/// Module specifier for `target` as seen from a file in `from_dir`.
pub fn relative_specifier(target: &Utf8Path, from_dir: &Utf8Path) -> Option<String> {
    let diff = pathdiff::diff_paths(target.as_std_path(), from_dir.as_std_path())?;
    let diff = Utf8PathBuf::from_path_buf(diff).ok()?;
    let joined = diff
        .components()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/");
    if joined.starts_with("./") || joined.starts_with("../") {
        Some(joined)
    } else {
        Some(format!("./{joined}"))
    }
}

/// Specifier string tokens: the string after `from`, or directly after a
/// leading `import`.
fn specifier_spans(parsed: &ParsedSource<'_>) -> Vec<(Span, String)> {
    let text = parsed.text();
    let tokens = parsed.tokens();
    let mut out = Vec::new();
    for (idx, tok) in tokens.iter().enumerate() {
        if !matches!(tok.kind, TokenKind::Str { terminated: true }) {
            continue;
        }
        let Some(prev) = parsed.prev_significant(idx) else {
            continue;
        };
        let is_specifier = tokens[prev].is_ident(text, "from")
            || parsed
                .statements()
                .iter()
                .any(|s| s.tokens.start == prev && s.tokens.contains(&idx));
        if let (true, Some(inner), Some(value)) =
            (is_specifier, tok.str_inner_span(), tok.str_value(text))
        {
            out.push((inner, value.to_string()));
        }
    }
    out
}

/// The part of `specifier` below the data directory, if it addresses one.
fn data_remainder(
    specifier: &str,
    ctx: &DataContext<'_>,
    file_dir: &Utf8Path,
    view: &dyn ProjectView,
) -> Option<String> {
    if let Some(rest) = specifier.strip_prefix(ctx.alias) {
        return Some(rest.to_string());
    }
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return None;
    }
    // Extensionless specifiers go through module resolution, which a plain
    // existence check cannot follow.
    if Utf8Path::new(specifier).extension().is_none() {
        return None;
    }
    if view.exists(&normalize(&file_dir.join(specifier))) {
        return None;
    }
    let data_name = ctx.data_root().file_name()?.to_string();
    let segments: Vec<&str> = specifier.split('/').collect();
    let at = segments.iter().rposition(|s| *s == data_name)?;
    Some(segments[at + 1..].join("/"))
}

/// Rewrite every data specifier in `parsed`. `file` is absolute or relative
/// to the project root.
pub fn rewrite_data_paths(
    parsed: &ParsedSource<'_>,
    file: &Utf8Path,
    ctx: &DataContext<'_>,
    view: &dyn ProjectView,
) -> Rewrite {
    let text = parsed.text();
    let file_abs = normalize(&ctx.project_root.join(file));
    let file_dir = file_abs.parent().unwrap_or(ctx.project_root).to_path_buf();
    let data_root = ctx.data_root();

    let mut edits: Vec<(Span, String)> = Vec::new();
    let mut rewritten = Vec::new();
    let mut warnings = Vec::new();

    for (span, specifier) in specifier_spans(parsed) {
        let Some(remainder) = data_remainder(&specifier, ctx, &file_dir, view) else {
            continue;
        };
        if remainder.is_empty() || remainder.split('/').any(|s| s == "..") {
            continue;
        }
        let target = normalize(&data_root.join(&remainder));
        if !view.exists(&target) {
            tracing::debug!(%specifier, target = %target, "data file missing");
            warnings.push(Warning::MissingDataFile {
                specifier: specifier.clone(),
                target: ctx.display(&target),
            });
            continue;
        }
        let Some(new_spec) = relative_specifier(&target, &file_dir) else {
            continue;
        };
        if new_spec != specifier {
            tracing::debug!(from = %specifier, to = %new_spec, "rewrite data specifier");
            edits.push((span, new_spec.clone()));
            rewritten.push(SpecifierRewrite {
                from: specifier,
                to: new_spec,
            });
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (span, replacement) in &edits {
        out.push_str(&text[last..span.start]);
        out.push_str(replacement);
        last = span.end;
    }
    out.push_str(&text[last..]);

    Rewrite {
        text: out,
        rewritten,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryProjectView;
    use pretty_assertions::assert_eq;

    fn ctx() -> DataContext<'static> {
        DataContext {
            project_root: Utf8Path::new("/proj"),
            data_dir: Utf8Path::new("data"),
            alias: "@/data/",
        }
    }

    fn run(file: &str, text: &str, view: &MemoryProjectView) -> Rewrite {
        rewrite_data_paths(&ParsedSource::parse(text), Utf8Path::new(file), &ctx(), view)
    }

    #[test]
    fn normalize_resolves_dots() {
        assert_eq!(normalize(Utf8Path::new("/a/b/../c/./d")), Utf8PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Utf8Path::new("../x")), Utf8PathBuf::from("../x"));
    }

    #[test]
    fn relative_specifier_forms() {
        let dir = Utf8Path::new("/proj/app/a/b");
        assert_eq!(
            relative_specifier(Utf8Path::new("/proj/data/x.json"), dir).as_deref(),
            Some("../../../data/x.json")
        );
        assert_eq!(
            relative_specifier(Utf8Path::new("/proj/app/a/b/x.json"), dir).as_deref(),
            Some("./x.json")
        );
    }

    #[test]
    fn alias_specifier_becomes_relative() {
        let view = MemoryProjectView::new("/proj").with_file("data/x.json", "[]");
        let text = "import x from \"@/data/x.json\";\nexport default x;\n";
        let out = run("app/a/b/Page.js", text, &view);
        assert_eq!(
            out.text,
            "import x from \"../../../data/x.json\";\nexport default x;\n"
        );
        assert_eq!(out.rewritten.len(), 1);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn missing_target_is_left_alone_with_a_warning() {
        let view = MemoryProjectView::new("/proj");
        let text = "import y from '@/data/y.json';\n";
        let out = run("app/page.js", text, &view);
        assert_eq!(out.text, text);
        assert_eq!(
            out.warnings,
            vec![Warning::MissingDataFile {
                specifier: "@/data/y.json".to_string(),
                target: "data/y.json".to_string(),
            }]
        );
    }

    #[test]
    fn broken_relative_data_path_is_repaired() {
        let view = MemoryProjectView::new("/proj").with_file("data/jobs.json", "[]");
        let text = "import jobs from '../data/jobs.json';\n";
        let out = run("app/careers/jobs/page.js", text, &view);
        assert_eq!(out.text, "import jobs from '../../../data/jobs.json';\n");
    }

    #[test]
    fn resolving_relative_paths_are_untouched() {
        let view = MemoryProjectView::new("/proj").with_file("data/jobs.json", "[]");
        let text = "import jobs from '../data/jobs.json';\n";
        let out = run("app/page.js", text, &view);
        assert_eq!(out.text, text);
        assert!(out.rewritten.is_empty());
    }

    #[test]
    fn strings_that_are_not_specifiers_are_ignored() {
        let view = MemoryProjectView::new("/proj").with_file("data/x.json", "[]");
        let text = "const p = '@/data/x.json';\n// from '@/data/x.json'\n";
        assert_eq!(run("app/page.js", text, &view).text, text);
    }

    #[test]
    fn export_from_and_side_effect_imports_are_rewritten() {
        let view = MemoryProjectView::new("/proj").with_file("data/x.json", "[]");
        let text = "export { default } from '@/data/x.json';\nimport '@/data/x.json';\n";
        let out = run("app/page.js", text, &view);
        assert_eq!(
            out.text,
            "export { default } from '../data/x.json';\nimport '../data/x.json';\n"
        );
    }

    #[test]
    fn parent_segments_in_remainder_are_skipped() {
        let view = MemoryProjectView::new("/proj").with_file("secret.json", "{}");
        let text = "import s from '@/data/../secret.json';\n";
        let out = run("app/page.js", text, &view);
        assert_eq!(out.text, text);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn extensionless_relative_specifiers_are_untouched() {
        let view = MemoryProjectView::new("/proj")
            .with_file("app/x/data/columns.js", "export const columns = [];")
            .with_file("data/columns.json", "[]");
        let text = "import { columns } from './data/columns';\n";
        let out = run("app/x/page.js", text, &view);
        assert_eq!(out.text, text);
        assert!(out.rewritten.is_empty());
        assert!(out.warnings.is_empty());
    }
}
