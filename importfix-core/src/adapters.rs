//! Default implementations of the port traits.

use crate::discover::discover_sources;
use crate::ports::{Reporter, SourceDiscovery};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use importfix_types::{Change, ChangeKind, RunEvent, RunSummary, schema};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Walks the scan directory on disk.
#[derive(Debug, Clone)]
pub struct FsSourceDiscovery {
    root: Utf8PathBuf,
    extensions: Vec<String>,
}

impl FsSourceDiscovery {
    pub fn new(root: Utf8PathBuf, extensions: Vec<String>) -> Self {
        Self { root, extensions }
    }
}

impl SourceDiscovery for FsSourceDiscovery {
    fn discover(&self) -> anyhow::Result<Vec<Utf8PathBuf>> {
        discover_sources(&self.root, &self.extensions)
    }
}

fn label(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Merged => "Merged imports in:",
        ChangeKind::Patched => "Patched:",
        ChangeKind::Inserted => "Inserted imports in:",
        ChangeKind::Rewritten => "Rewrote data imports in:",
    }
}

fn kinds(changes: &[Change]) -> BTreeSet<ChangeKind> {
    changes.iter().map(|c| c.kind).collect()
}

fn done_line(summary: &RunSummary) -> String {
    let verb = if summary.dry_run { "would change" } else { "changed" };
    format!(
        "Done. {} file(s) scanned, {} {verb}, {} backup(s) created, {} warning(s).",
        summary.files_scanned, summary.files_changed, summary.backups_created, summary.warnings
    )
}

/// Human-readable lines: progress on `out`, warnings on `err`.
pub struct ConsoleReporter<O, E> {
    out: O,
    err: E,
}

impl ConsoleReporter<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn file_lines(&mut self, path: &Utf8Path, changes: &[Change]) -> io::Result<()> {
        for kind in kinds(changes) {
            writeln!(self.out, "{} {path}", label(kind))?;
        }
        Ok(())
    }
}

impl<O: Write, E: Write> Reporter for ConsoleReporter<O, E> {
    fn report(&mut self, event: &RunEvent) -> anyhow::Result<()> {
        match event {
            RunEvent::Started { .. } => {}
            RunEvent::FilePatched { path, changes, .. } => {
                self.file_lines(path, changes).context("write report")?;
            }
            RunEvent::FilePreview { path, changes, diff } => {
                self.file_lines(path, changes).context("write report")?;
                self.out.write_all(diff.as_bytes()).context("write report")?;
            }
            RunEvent::Warning { path, warning } => {
                writeln!(self.err, "warning: {path}: {warning}").context("write report")?;
            }
            RunEvent::Completed { summary } => {
                writeln!(self.out, "{}", done_line(summary)).context("write report")?;
                self.out.flush().context("flush report")?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    schema: &'static str,
    #[serde(flatten)]
    event: &'a RunEvent,
}

/// One JSON object per event, newline separated.
pub struct JsonLinesReporter<W> {
    out: W,
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonLinesReporter<W> {
    fn report(&mut self, event: &RunEvent) -> anyhow::Result<()> {
        let envelope = Envelope {
            schema: schema::IMPORTFIX_EVENT_V1,
            event,
        };
        serde_json::to_writer(&mut self.out, &envelope).context("serialize event")?;
        self.out.write_all(b"\n").context("write event")?;
        if matches!(event, RunEvent::Completed { .. }) {
            self.out.flush().context("flush events")?;
        }
        Ok(())
    }
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    pub events: Vec<RunEvent>,
}

impl RecordingReporter {
    /// Paths of patched or previewed files that carry a change of `kind`.
    pub fn paths_with(&self, kind: ChangeKind) -> Vec<&Utf8Path> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::FilePatched { path, changes, .. }
                | RunEvent::FilePreview { path, changes, .. }
                    if changes.iter().any(|c| c.kind == kind) =>
                {
                    Some(path.as_path())
                }
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<&importfix_types::Warning> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Warning { warning, .. } => Some(warning),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: &RunEvent) -> anyhow::Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use importfix_types::Warning;
    use pretty_assertions::assert_eq;

    fn change(kind: ChangeKind, module: &str) -> Change {
        Change {
            kind,
            module: module.to_string(),
            detail: String::new(),
        }
    }

    fn summary() -> RunSummary {
        RunSummary {
            files_scanned: 3,
            files_changed: 1,
            backups_created: 1,
            warnings: 1,
            ..RunSummary::default()
        }
    }

    #[test]
    fn console_prints_one_line_per_change_kind() {
        let mut rep = ConsoleReporter::new(Vec::new(), Vec::new());
        rep.report(&RunEvent::FilePatched {
            path: "app/page.js".into(),
            changes: vec![
                change(ChangeKind::Rewritten, "@/data/x.json"),
                change(ChangeKind::Merged, "react"),
                change(ChangeKind::Inserted, "next/link"),
                change(ChangeKind::Rewritten, "@/data/y.json"),
            ],
            backup_created: true,
        })
        .unwrap();
        rep.report(&RunEvent::Warning {
            path: "app/page.js".into(),
            warning: Warning::MissingDataFile {
                specifier: "@/data/z.json".to_string(),
                target: "data/z.json".to_string(),
            },
        })
        .unwrap();
        rep.report(&RunEvent::Completed { summary: summary() }).unwrap();

        let (out, err) = rep.into_inner();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Merged imports in: app/page.js\n\
             Inserted imports in: app/page.js\n\
             Rewrote data imports in: app/page.js\n\
             Done. 3 file(s) scanned, 1 changed, 1 backup(s) created, 1 warning(s).\n"
        );
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "warning: app/page.js: data file missing: @/data/z.json (expected at data/z.json)\n"
        );
    }

    #[test]
    fn console_preview_includes_diff() {
        let mut rep = ConsoleReporter::new(Vec::new(), Vec::new());
        rep.report(&RunEvent::FilePreview {
            path: "app/a.js".into(),
            changes: vec![change(ChangeKind::Patched, "react")],
            diff: "--- a/app/a.js\n+++ b/app/a.js\n".to_string(),
        })
        .unwrap();
        let (out, _) = rep.into_inner();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Patched: app/a.js\n--- a/app/a.js\n"));
    }

    #[test]
    fn done_line_mentions_dry_run() {
        let s = RunSummary {
            dry_run: true,
            ..summary()
        };
        assert!(done_line(&s).contains("1 would change"));
    }

    #[test]
    fn json_lines_carry_schema_and_event_tag() {
        let mut rep = JsonLinesReporter::new(Vec::new());
        rep.report(&RunEvent::FilePatched {
            path: "app/page.js".into(),
            changes: vec![change(ChangeKind::Patched, "react")],
            backup_created: false,
        })
        .unwrap();
        rep.report(&RunEvent::Completed { summary: summary() }).unwrap();

        let text = String::from_utf8(rep.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["schema"], "importfix.event.v1");
        assert_eq!(lines[0]["event"], "file_patched");
        assert_eq!(lines[0]["path"], "app/page.js");
        assert_eq!(lines[1]["event"], "completed");
        assert_eq!(lines[1]["summary"]["files_scanned"], 3);
    }

    #[test]
    fn recording_reporter_filters_by_kind() {
        let mut rep = RecordingReporter::default();
        rep.report(&RunEvent::FilePatched {
            path: "app/a.js".into(),
            changes: vec![change(ChangeKind::Merged, "react")],
            backup_created: true,
        })
        .unwrap();
        rep.report(&RunEvent::FilePatched {
            path: "app/b.js".into(),
            changes: vec![change(ChangeKind::Inserted, "react")],
            backup_created: true,
        })
        .unwrap();
        assert_eq!(rep.paths_with(ChangeKind::Merged), vec![Utf8Path::new("app/a.js")]);
        assert!(rep.paths_with(ChangeKind::Rewritten).is_empty());
        assert!(rep.warnings().is_empty());
    }
}
