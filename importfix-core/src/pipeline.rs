//! The normalization pipeline, extracted from the CLI.
//!
//! Files are processed one at a time in discovery order. Each file is read
//! fresh, planned, then handed to the patch applier, which re-checks the
//! content hash before writing.

use crate::adapters::FsSourceDiscovery;
use crate::ports::{Reporter, SourceDiscovery};
use crate::settings::RunSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use importfix_domain::{FsProjectView, PlanContext, ProjectView, plan_file};
use importfix_edit::{
    PatchError, PatchOptions, PatchOutcome, PreconditionError, apply_patch, plan_patch,
};
use importfix_types::{RunEvent, RunSummary, ToolInfo, Warning};
use tracing::{debug, warn};

/// Error type for pipeline results. Exit code 2 = precondition mismatch,
/// 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Precondition(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

impl From<PatchError> for ToolError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::Precondition(e) => ToolError::Precondition(e),
            PatchError::Runtime(e) => ToolError::Internal(e),
        }
    }
}

pub fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "importfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

/// Normalize every source file under the scan directory using the file
/// system adapters.
pub fn run(settings: &RunSettings, reporter: &mut dyn Reporter) -> Result<RunSummary, ToolError> {
    let discovery = FsSourceDiscovery::new(settings.scan_root(), settings.extensions.clone());
    let view = FsProjectView::new(settings.project_root.clone());
    run_with(settings, &discovery, &view, reporter)
}

fn relative<'p>(root: &Utf8Path, path: &'p Utf8Path) -> &'p Utf8Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Run the pipeline against explicit ports.
///
/// Recoverable conditions become [`RunEvent::Warning`]s and never stop the
/// run. A file that changed between read and write aborts it with
/// [`ToolError::Precondition`].
pub fn run_with(
    settings: &RunSettings,
    sources: &dyn SourceDiscovery,
    view: &dyn ProjectView,
    reporter: &mut dyn Reporter,
) -> Result<RunSummary, ToolError> {
    let root = settings.project_root.as_path();
    let mut summary = RunSummary {
        dry_run: settings.dry_run,
        started_at: Some(Utc::now()),
        ..RunSummary::default()
    };

    reporter.report(&RunEvent::Started {
        tool: tool_info(),
        scan_root: relative(root, &settings.scan_root()).to_path_buf(),
    })?;

    let files = sources.discover().context("discover sources")?;

    let ctx = PlanContext {
        project_root: settings.project_root.clone(),
        data_dir: settings.data_dir.clone(),
        vocabulary: settings.vocabulary.clone(),
    };
    let opts = PatchOptions {
        dry_run: settings.dry_run,
        backup_suffix: settings.backup_suffix.clone(),
    };

    for path in files {
        summary.files_scanned += 1;
        let rel: Utf8PathBuf = relative(root, &path).to_path_buf();
        let Ok(text) = String::from_utf8(view.read(&path)?) else {
            warn!(path = %rel, "not valid UTF-8; skipping");
            summary.warnings += 1;
            reporter.report(&RunEvent::Warning {
                path: rel,
                warning: Warning::NotUtf8,
            })?;
            continue;
        };

        let planned = plan_file(&ctx, view, &rel, &text);
        for warning in planned.warnings.iter() {
            warn!(path = %rel, "{warning}");
            summary.warnings += 1;
            reporter.report(&RunEvent::Warning {
                path: rel.clone(),
                warning: warning.clone(),
            })?;
        }
        if planned.is_noop() {
            debug!(path = %rel, "already canonical");
            continue;
        }

        let patch = plan_patch(rel.clone(), text, planned.text, planned.changes);
        match apply_patch(root, &patch, &opts)? {
            PatchOutcome::Unchanged => {}
            PatchOutcome::Preview { diff } => {
                summary.files_changed += 1;
                reporter.report(&RunEvent::FilePreview {
                    path: rel,
                    changes: patch.changes,
                    diff,
                })?;
            }
            PatchOutcome::Written { backup_created } => {
                summary.files_changed += 1;
                if backup_created {
                    summary.backups_created += 1;
                }
                reporter.report(&RunEvent::FilePatched {
                    path: rel,
                    changes: patch.changes,
                    backup_created,
                })?;
            }
        }
    }

    summary.ended_at = Some(Utc::now());
    debug!(
        scanned = summary.files_scanned,
        changed = summary.files_changed,
        "run complete"
    );
    reporter.report(&RunEvent::Completed {
        summary: summary.clone(),
    })?;
    Ok(summary)
}
