//! Plugin flagging long modules.

use codemark_core::{Config, IssueCandidate, Plugin, PluginFault, StructuredCandidate};
use std::path::Path;
use tracing::debug;

/// Issue code for long-file.
pub const CODE: &str = "LongFile";

/// Plugin name for long-file.
pub const NAME: &str = "long-file";

/// Default line threshold.
pub const DEFAULT_MAX_LINES: usize = 50;

/// Reports files with more than a number of lines, at line 1.
#[derive(Debug, Clone, Copy)]
pub struct LongFile {
    max_lines: usize,
}

impl Default for LongFile {
    fn default() -> Self {
        Self::new()
    }
}

impl LongFile {
    /// Creates the plugin with the default threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
        }
    }

    /// Sets the line threshold.
    #[must_use]
    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }
}

impl Plugin for LongFile {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Flags files with more than 50 lines"
    }

    fn run(&self, path: &Path, _config: &Config) -> Result<Vec<IssueCandidate>, PluginFault> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PluginFault::Other(e.to_string()))?;
        let lines = content.lines().count();
        debug!("{} has {} lines", path.display(), lines);

        if lines <= self.max_lines {
            return Ok(Vec::new());
        }
        Ok(vec![StructuredCandidate::new(
            CODE,
            format!("File has more than {} lines.", self.max_lines),
        )
        .file(path.display().to_string())
        .line(1)
        .into()])
    }
}
