//! Domain logic: turn a source file's text into its normalized text.
//!
//! This crate owns *what* a file should look like and why. It does not own
//! *how* the new text reaches the disk; that's the `importfix-edit` crate.
//!
//! Everything here works on tokens from [`lexer`], never on raw lines, so
//! occurrences inside strings, comments and template text cannot be mistaken
//! for code.

pub mod lexer;
mod locate;
mod parser;
mod planner;
mod ports;
mod rewrite;
mod synth;
mod usage;

pub use locate::{directive_offset, directive_present, insertion_offset};
pub use parser::{ImportStatement, ParsedSource, parse_all_imports, parse_imports};
pub use planner::{FilePlan, PlanContext, plan_file};
pub use ports::{FsProjectView, MemoryProjectView, ProjectView};
pub use rewrite::{
    DataContext, Rewrite, SpecifierRewrite, normalize, relative_specifier, rewrite_data_paths,
};
pub use synth::{Synthesis, check_consistency, render_import, synthesize};
pub use usage::{Bindings, detect_usages, is_unbound_reference};
