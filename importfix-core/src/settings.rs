//! Clap-free settings for a run.

use crate::discover::DEFAULT_EXTENSIONS;
use camino::{Utf8Path, Utf8PathBuf};
use importfix_edit::DEFAULT_BACKUP_SUFFIX;
use importfix_types::Vocabulary;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub project_root: Utf8PathBuf,
    /// Absolute, or relative to `project_root`.
    pub scan_dir: Utf8PathBuf,
    /// Absolute, or relative to `project_root`.
    pub data_dir: Utf8PathBuf,
    pub extensions: Vec<String>,

    // Backups
    pub backup_suffix: String,

    pub dry_run: bool,
    pub vocabulary: Vocabulary,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            scan_dir: Utf8PathBuf::from("app"),
            data_dir: Utf8PathBuf::from("data"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            dry_run: false,
            vocabulary: Vocabulary::default(),
        }
    }
}

impl RunSettings {
    pub fn for_project(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            project_root: root.into(),
            ..Self::default()
        }
    }

    pub fn scan_root(&self) -> Utf8PathBuf {
        join(&self.project_root, &self.scan_dir)
    }

    pub fn data_root(&self) -> Utf8PathBuf {
        join(&self.project_root, &self.data_dir)
    }
}

fn join(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_scan_app_and_data() {
        let s = RunSettings::for_project("/proj");
        assert_eq!(s.scan_root(), Utf8PathBuf::from("/proj/app"));
        assert_eq!(s.data_root(), Utf8PathBuf::from("/proj/data"));
        assert_eq!(s.backup_suffix, ".bak");
        assert_eq!(s.extensions, vec!["js", "jsx", "ts", "tsx"]);
        assert!(!s.dry_run);
    }

    #[test]
    fn absolute_dirs_are_kept() {
        let s = RunSettings {
            scan_dir: Utf8PathBuf::from("/elsewhere/src"),
            ..RunSettings::for_project("/proj")
        };
        assert_eq!(s.scan_root(), Utf8PathBuf::from("/elsewhere/src"));
    }
}
