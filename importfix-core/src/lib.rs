//! Embeddable core library for importfix.
//!
//! Provides a clap-free entry point that walks a scan directory, plans each
//! source file and applies the result.
//!
//! # Port traits
//!
//! I/O at the edges is abstracted behind the traits in [`ports`]:
//! - [`SourceDiscovery`](ports::SourceDiscovery): which files a run visits
//! - [`Reporter`](ports::Reporter): where run events go
//!
//! The [`adapters`] module provides the file-system, console and JSON Lines
//! implementations.
//!
//! # Entry points
//!
//! - [`run`](pipeline::run): normalize everything under the scan directory
//! - [`run_with`](pipeline::run_with): same, with explicit ports

pub mod adapters;
pub mod discover;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use importfix_domain::{FsProjectView, ProjectView};
pub use pipeline::{ToolError, run, run_with};
pub use settings::RunSettings;
