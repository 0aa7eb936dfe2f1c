use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;

/// Read-only project access.
///
/// Paths may be absolute or relative to [`ProjectView::root`].
pub trait ProjectView {
    fn root(&self) -> &Utf8Path;

    /// Raw file contents. Source files are not guaranteed to be UTF-8.
    fn read(&self, path: &Utf8Path) -> anyhow::Result<Vec<u8>>;

    fn exists(&self, path: &Utf8Path) -> bool;
}

/// File-system backed `ProjectView`.
#[derive(Debug, Clone)]
pub struct FsProjectView {
    root: Utf8PathBuf,
}

impl FsProjectView {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    fn abs(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ProjectView for FsProjectView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read(&self, path: &Utf8Path) -> anyhow::Result<Vec<u8>> {
        let abs = self.abs(path);
        fs::read(&abs).with_context(|| format!("read {}", abs))
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        self.abs(path).is_file()
    }
}

/// In-memory `ProjectView`, keyed by root-relative path.
#[derive(Debug, Clone, Default)]
pub struct MemoryProjectView {
    root: Utf8PathBuf,
    files: BTreeMap<Utf8PathBuf, String>,
}

impl MemoryProjectView {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, rel: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(rel.into(), contents.into());
        self
    }

    fn rel<'p>(&self, path: &'p Utf8Path) -> &'p Utf8Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

impl ProjectView for MemoryProjectView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read(&self, path: &Utf8Path) -> anyhow::Result<Vec<u8>> {
        self.files
            .get(self.rel(path))
            .map(|s| s.as_bytes().to_vec())
            .with_context(|| format!("no such file: {path}"))
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        self.files.contains_key(self.rel(path))
    }
}
