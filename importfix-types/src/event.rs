use crate::patch::{Change, Warning};
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Counters for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_scanned: u64,
    pub files_changed: u64,
    pub backups_created: u64,
    pub warnings: u64,
    pub dry_run: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Everything a reporter gets to see. Paths are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        tool: ToolInfo,
        scan_root: Utf8PathBuf,
    },
    FilePatched {
        path: Utf8PathBuf,
        changes: Vec<Change>,
        backup_created: bool,
    },
    FilePreview {
        path: Utf8PathBuf,
        changes: Vec<Change>,
        diff: String,
    },
    Warning {
        path: Utf8PathBuf,
        warning: Warning,
    },
    Completed {
        summary: RunSummary,
    },
}
