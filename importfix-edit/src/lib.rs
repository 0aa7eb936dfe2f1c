//! Patch applier for importfix.
//!
//! Responsibilities:
//! - Build a [`PatchPlan`] (original text, its sha256, proposed text).
//! - Check that the file still holds the planned original before writing.
//! - Create the `<path><suffix>` backup exactly once, atomically.
//! - Generate a unified diff preview for dry runs.

mod error;

pub use error::{PatchError, PatchResult, PreconditionError};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use fs_err as fs;
use importfix_types::{Change, PatchPlan};
use sha2::{Digest, Sha256};
use std::io::{ErrorKind, Write};

pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

#[derive(Debug, Clone)]
pub struct PatchOptions {
    pub dry_run: bool,
    pub backup_suffix: String,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// New text equals the original; nothing was touched.
    Unchanged,
    /// Dry run: the diff that would have been written.
    Preview { diff: String },
    Written { backup_created: bool },
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn abs_path(root: &Utf8Path, rel: &Utf8Path) -> Utf8PathBuf {
    if rel.is_absolute() {
        rel.to_path_buf()
    } else {
        root.join(rel)
    }
}

pub fn backup_path(path: &Utf8Path, suffix: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}{suffix}"))
}

pub fn plan_patch(
    path: impl Into<Utf8PathBuf>,
    original: String,
    new_text: String,
    changes: Vec<Change>,
) -> PatchPlan {
    PatchPlan {
        path: path.into(),
        original_sha256: sha256_hex(original.as_bytes()),
        changed: original != new_text,
        original,
        new_text,
        changes,
    }
}

/// Unified diff of one file, with `a/` and `b/` prefixed headers.
pub fn render_patch(path: &Utf8Path, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(before, after);
    let formatter = PatchFormatter::new();
    let body = formatter.fmt_patch(&patch).to_string();
    // The formatter repeats its own file headers; keep only the hunks.
    let hunks = body.find("@@").map(|i| &body[i..]).unwrap_or(&body);
    out.push_str(hunks);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn check_precondition(abs: &Utf8Path, plan: &PatchPlan) -> PatchResult<Vec<u8>> {
    let bytes = match fs::read(abs) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PreconditionError::Missing {
                path: plan.path.clone(),
            }
            .into());
        }
        Err(e) => return Err(anyhow::Error::new(e).context(format!("read {}", abs)).into()),
    };

    let actual = sha256_hex(&bytes);
    if actual != plan.original_sha256 {
        return Err(PreconditionError::Sha256Mismatch {
            path: plan.path.clone(),
            expected: plan.original_sha256.clone(),
            actual,
        }
        .into());
    }
    Ok(bytes)
}

/// Create the backup unless one exists. Returns whether it was created.
fn create_backup_once(backup: &Utf8Path, contents: &[u8]) -> anyhow::Result<bool> {
    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(backup)
    {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(anyhow::Error::new(e).context(format!("create {}", backup))),
    };
    file.write_all(contents)
        .with_context(|| format!("write {}", backup))?;
    file.sync_all()
        .with_context(|| format!("sync {}", backup))?;
    Ok(true)
}

/// Apply `plan` to the file at `root`/`plan.path`.
///
/// The file must still hash to `plan.original_sha256`. On a real run the
/// backup is written before the file is overwritten, and an existing backup
/// is never touched.
pub fn apply_patch(
    root: &Utf8Path,
    plan: &PatchPlan,
    opts: &PatchOptions,
) -> PatchResult<PatchOutcome> {
    if !plan.changed {
        return Ok(PatchOutcome::Unchanged);
    }

    let abs = abs_path(root, &plan.path);
    let on_disk = check_precondition(&abs, plan)?;

    if opts.dry_run {
        return Ok(PatchOutcome::Preview {
            diff: render_patch(&plan.path, &plan.original, &plan.new_text),
        });
    }

    let backup = backup_path(&abs, &opts.backup_suffix);
    let backup_created = create_backup_once(&backup, &on_disk)?;
    fs::write(&abs, &plan.new_text).with_context(|| format!("write {}", abs))?;

    tracing::info!(path = %plan.path, backup_created, "patched");
    Ok(PatchOutcome::Written { backup_created })
}
