//! Port traits abstracting I/O away from the pipeline.

use camino::Utf8PathBuf;
use importfix_types::RunEvent;

/// Yields the source files of one run, in processing order.
pub trait SourceDiscovery {
    fn discover(&self) -> anyhow::Result<Vec<Utf8PathBuf>>;
}

/// Receives everything a run has to say.
pub trait Reporter {
    fn report(&mut self, event: &RunEvent) -> anyhow::Result<()>;
}
