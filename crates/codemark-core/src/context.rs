//! Context types threaded through one invocation.

use crate::config::Config;
use std::path::Path;
use tracing::Span;

/// Per-invocation context.
///
/// Created once by the caller and passed explicitly to the analyzer,
/// advisory adapter, fixer and renderers. It carries the invocation's
/// tracing span and the console preferences; nothing in the pipeline
/// reaches for a global logger or console.
#[derive(Debug, Clone)]
pub struct RunContext {
    span: Span,
    color: bool,
}

impl RunContext {
    /// Creates a context for the named command.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            span: tracing::info_span!("codemark", command),
            color: false,
        }
    }

    /// Enables or disables colored console output.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// The span every component logs under.
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Whether console output may use colors.
    #[must_use]
    pub fn color(&self) -> bool {
        self.color
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new("review")
    }
}

/// Context provided to rules for one source file.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    /// Path of the file as discovered.
    pub path: &'a Path,
    /// File contents.
    pub content: &'a str,
    /// Run configuration.
    pub config: &'a Config,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, config: &'a Config) -> Self {
        Self {
            path,
            content,
            config,
        }
    }

    /// The file path as it appears in issues.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path.display().to_string()
    }

    /// Number of physical lines in the file.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context() {
        let config = Config::default();
        let ctx = FileContext::new(Path::new("pkg/mod.py"), "a = 1\nb = 2\n", &config);
        assert_eq!(ctx.file_name(), "pkg/mod.py");
        assert_eq!(ctx.line_count(), 2);
    }

    #[test]
    fn test_run_context_color() {
        let ctx = RunContext::new("review");
        assert!(!ctx.color());
        assert!(ctx.with_color(true).color());
    }
}
