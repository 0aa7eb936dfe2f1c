//! Configuration file loading for importfix.
//!
//! Discovers and loads `importfix.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use importfix_core::RunSettings;
use importfix_types::{DataRule, ModuleRule, Vocabulary};
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "importfix.toml";

/// Top-level configuration from importfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportfixConfig {
    pub scan: ScanConfig,
    pub data: DataConfig,
    pub backups: BackupsConfig,
    pub directive: DirectiveConfig,

    /// Module rules. An entry whose specifier matches a built-in rule
    /// replaces it; others are added.
    pub modules: Vec<ModuleRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory to walk, relative to the project root.
    pub dir: Option<Utf8PathBuf>,

    /// File extensions to process, without the dot.
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: Option<Utf8PathBuf>,
    pub alias: Option<String>,

    /// Keyword rules. A rule with the same binding as a built-in one
    /// replaces it.
    pub rules: Vec<DataRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DirectiveConfig {
    /// The client directive, without quotes.
    pub name: Option<String>,
}

/// Discover the importfix.toml config file.
///
/// Returns `None` if the project root has no config file.
pub fn discover_config(project_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<ImportfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<ImportfixConfig> {
    let config: ImportfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load an explicit config file, or the project's own, or the defaults.
pub fn load_or_default(
    project_root: &Utf8Path,
    explicit: Option<&Utf8Path>,
) -> anyhow::Result<ImportfixConfig> {
    match explicit.map(Utf8Path::to_path_buf).or_else(|| discover_config(project_root)) {
        Some(path) => load_config(&path),
        None => Ok(ImportfixConfig::default()),
    }
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub project_root: Utf8PathBuf,
    pub scan_dir: Option<Utf8PathBuf>,
    pub data_dir: Option<Utf8PathBuf>,
    pub dry_run: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ImportfixConfig,
}

impl ConfigMerger {
    pub fn new(config: ImportfixConfig) -> Self {
        Self { config }
    }

    /// The effective vocabulary: built-ins overlaid with the file's rules.
    pub fn vocabulary(&self) -> Vocabulary {
        let mut vocab = Vocabulary::default();
        if let Some(name) = &self.config.directive.name {
            vocab.client_directive = name.clone();
        }
        if let Some(alias) = &self.config.data.alias {
            vocab.data.alias = alias.clone();
        }
        for rule in &self.config.modules {
            match vocab.modules.iter_mut().find(|m| m.specifier == rule.specifier) {
                Some(existing) => *existing = rule.clone(),
                None => vocab.modules.push(rule.clone()),
            }
        }
        for rule in &self.config.data.rules {
            match vocab.data.rules.iter_mut().find(|r| r.binding == rule.binding) {
                Some(existing) => *existing = rule.clone(),
                None => vocab.data.rules.push(rule.clone()),
            }
        }
        vocab
    }

    /// Flags win over the file, the file wins over built-in defaults.
    pub fn merge(self, cli: CliOverrides) -> RunSettings {
        let vocabulary = self.vocabulary();
        let defaults = RunSettings::for_project(cli.project_root);
        let ImportfixConfig {
            scan, data, backups, ..
        } = self.config;

        RunSettings {
            scan_dir: cli.scan_dir.or(scan.dir).unwrap_or(defaults.scan_dir),
            data_dir: cli.data_dir.or(data.dir).unwrap_or(defaults.data_dir),
            extensions: scan.extensions.unwrap_or(defaults.extensions),
            backup_suffix: backups.suffix.unwrap_or(defaults.backup_suffix),
            dry_run: cli.dry_run,
            vocabulary,
            project_root: defaults.project_root,
        }
    }
}
