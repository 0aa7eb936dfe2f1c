use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// What happened to a file's imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Several declarations of one module collapsed into one.
    Merged,
    /// A single existing declaration gained bindings or was normalized in place.
    Patched,
    /// A new declaration (and possibly the client directive) was added.
    Inserted,
    /// A data-file specifier was recomputed relative to the importer.
    Rewritten,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Merged => "merged",
            ChangeKind::Patched => "patched",
            ChangeKind::Inserted => "inserted",
            ChangeKind::Rewritten => "rewritten",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    /// Module specifier (or data specifier) the change concerns.
    pub module: String,
    pub detail: String,
}

/// Recoverable conditions. None of these stop a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Warning {
    /// A data import points at a file that does not exist; left unchanged.
    MissingDataFile { specifier: String, target: String },

    /// Two defaults competed for one module; `discarded` is no longer bound.
    DefaultConflict {
        module: String,
        kept: String,
        discarded: String,
    },

    /// A detected usage did not survive synthesis.
    Inconsistency { module: String, symbol: String },

    /// The file is not valid UTF-8 and was skipped.
    NotUtf8,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MissingDataFile { specifier, target } => {
                write!(f, "data file missing: {specifier} (expected at {target})")
            }
            Warning::DefaultConflict {
                module,
                kept,
                discarded,
            } => write!(
                f,
                "conflicting default imports from {module}: kept `{kept}`, discarded `{discarded}`"
            ),
            Warning::Inconsistency { module, symbol } => write!(
                f,
                "`{symbol}` detected but absent from the synthesized import of {module}"
            ),
            Warning::NotUtf8 => f.write_str("not valid UTF-8; file skipped"),
        }
    }
}

/// Proposed full-text replacement for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchPlan {
    pub path: Utf8PathBuf,
    pub original: String,
    pub original_sha256: String,
    pub new_text: String,
    pub changed: bool,
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_display_names_the_specifier() {
        let w = Warning::MissingDataFile {
            specifier: "@/data/y.json".to_string(),
            target: "data/y.json".to_string(),
        };
        assert!(w.to_string().contains("@/data/y.json"));
    }

    #[test]
    fn warning_serializes_with_type_tag() {
        let w = Warning::Inconsistency {
            module: "react".to_string(),
            symbol: "useState".to_string(),
        };
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["type"], "inconsistency");
        assert_eq!(v["symbol"], "useState");

        let v = serde_json::to_value(Warning::NotUtf8).unwrap();
        assert_eq!(v, serde_json::json!({ "type": "not_utf8" }));
    }
}
