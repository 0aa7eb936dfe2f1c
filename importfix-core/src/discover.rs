//! Recursive source discovery.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Every file under `root` whose extension is in `extensions`, in a stable
/// order (directory entries sorted by name).
///
/// Symbolic links are followed. A missing or unreadable root is an error;
/// broken links and link cycles below it are skipped with a warning. Backups
/// such as `page.js.bak` never match because their extension is `bak`.
pub fn discover_sources(
    root: &Utf8Path,
    extensions: &[String],
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let meta = fs_err::metadata(root).with_context(|| format!("scan root {root}"))?;
    if !meta.is_dir() {
        anyhow::bail!("scan root {root} is not a directory");
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() > 0 => {
                tracing::warn!("skipping unreadable entry under {root}: {err}");
                continue;
            }
            Err(err) => return Err(err).with_context(|| format!("walk {root}")),
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            tracing::warn!("skipping non-UTF-8 path under {root}");
            continue;
        };
        let matches = path
            .extension()
            .is_some_and(|ext| extensions.iter().any(|e| e == ext));
        if matches {
            files.push(path);
        }
    }
    tracing::debug!(root = %root, count = files.len(), "discovered sources");
    Ok(files)
}
