//! Shared DTOs for the importfix workspace.
//!
//! # Design constraints
//! - Records carry byte spans into the text they were parsed from; they are
//!   only meaningful together with that exact text.
//! - Everything a reporter can observe is serializable, so a run can be
//!   replayed as JSON lines.
//! - The recognized vocabulary is data ([`vocab::Vocabulary`]), never logic.

pub mod event;
pub mod imports;
pub mod patch;
pub mod vocab;

pub use event::{RunEvent, RunSummary, ToolInfo};
pub use imports::{
    BindingKind, CanonicalImport, DetectedSymbol, ImportRecord, QuoteStyle, RenderStyle, Span,
    UsageSet,
};
pub use patch::{Change, ChangeKind, PatchPlan, Warning};
pub use vocab::{
    DataRule, DataRules, ModuleRule, REACT_HOOKS, SymbolRule, UsagePattern, Vocabulary,
};

/// Schema identifiers.
pub mod schema {
    pub const IMPORTFIX_EVENT_V1: &str = "importfix.event.v1";
}
