//! The recognized vocabulary: which symbols come from which module, and which
//! file-name keywords map to which data file.

use crate::imports::BindingKind;
use serde::{Deserialize, Serialize};

/// How a symbol has to appear in code to count as used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsagePattern {
    /// Any identifier occurrence in code.
    #[default]
    Reference,
    /// Identifier immediately followed by `(`.
    Call,
    /// `<Name` (element) or `Name(`.
    Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRule {
    pub name: String,

    #[serde(default)]
    pub binding: BindingKind,

    #[serde(default)]
    pub pattern: UsagePattern,
}

impl SymbolRule {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            binding: BindingKind::Named,
            pattern: UsagePattern::Reference,
        }
    }

    pub fn default_element(name: &str) -> Self {
        Self {
            name: name.to_string(),
            binding: BindingKind::Default,
            pattern: UsagePattern::Element,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRule {
    pub specifier: String,

    /// A newly created import of this module also needs the client directive.
    #[serde(default)]
    pub requires_directive: bool,

    #[serde(default)]
    pub symbols: Vec<SymbolRule>,
}

/// Files whose project-relative path contains one of `keywords` are expected
/// to import `file` from the data directory as `binding`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRule {
    pub keywords: Vec<String>,
    pub binding: String,
    pub file: String,
}

impl DataRule {
    pub fn matches_path(&self, rel_path: &str) -> bool {
        let lower = rel_path.to_ascii_lowercase();
        self.keywords
            .iter()
            .any(|k| lower.contains(&k.to_ascii_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataRules {
    /// Module-specifier prefix that denotes the data directory, e.g. `@/data/`.
    pub alias: String,
    pub rules: Vec<DataRule>,
}

impl Default for DataRules {
    fn default() -> Self {
        let rule = |keywords: &[&str], binding: &str, file: &str| DataRule {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            binding: binding.to_string(),
            file: file.to_string(),
        };
        Self {
            alias: "@/data/".to_string(),
            rules: vec![
                rule(
                    &["vulnerabilities"],
                    "vulnerabilitiesData",
                    "vulnerabilities.json",
                ),
                rule(&["malware"], "malwareData", "malware.json"),
                rule(
                    &["zero-days", "zerodays", "zero_days"],
                    "zeroDaysData",
                    "zero-days.json",
                ),
                rule(&["jobs"], "jobs", "jobs.json"),
            ],
        }
    }
}

/// Hook names recognized in the built-in `react` rule.
pub const REACT_HOOKS: &[&str] = &[
    "useState",
    "useEffect",
    "useMemo",
    "useCallback",
    "useRef",
    "useLayoutEffect",
    "useImperativeHandle",
    "useReducer",
    "useContext",
    "useDebugValue",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Pragma directive added in front of new imports of modules that require it.
    pub client_directive: String,
    pub modules: Vec<ModuleRule>,
    pub data: DataRules,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            client_directive: "use client".to_string(),
            modules: vec![
                ModuleRule {
                    specifier: "react".to_string(),
                    requires_directive: true,
                    symbols: REACT_HOOKS.iter().map(|h| SymbolRule::named(h)).collect(),
                },
                ModuleRule {
                    specifier: "next/link".to_string(),
                    requires_directive: false,
                    symbols: vec![SymbolRule::default_element("Link")],
                },
            ],
            data: DataRules::default(),
        }
    }
}

impl Vocabulary {
    pub fn module(&self, specifier: &str) -> Option<&ModuleRule> {
        self.modules.iter().find(|m| m.specifier == specifier)
    }

    /// Module rules ordered by specifier.
    pub fn modules_sorted(&self) -> Vec<&ModuleRule> {
        let mut out: Vec<&ModuleRule> = self.modules.iter().collect();
        out.sort_by(|a, b| a.specifier.cmp(&b.specifier));
        out
    }
}
