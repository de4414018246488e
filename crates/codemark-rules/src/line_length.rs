//! Rule limiting physical line length.
//!
//! Length is counted in characters after stripping trailing whitespace, so
//! a line of exactly `max_line_length` characters is accepted.

use codemark_core::{FileContext, Issue, LineRule};

/// Issue code for line-length.
pub const CODE: &str = "LineLength";

/// Flags lines longer than the configured maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineLength {
    max: Option<usize>,
}

impl LineLength {
    /// Creates the rule using the configured maximum.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the configured maximum.
    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }
}

impl LineRule for LineLength {
    fn name(&self) -> &'static str {
        "line-length"
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags lines longer than max_line_length"
    }

    fn check_lines(&self, ctx: &FileContext<'_>) -> Vec<Issue> {
        let max = self.max.unwrap_or_else(|| ctx.config.max_line_length());
        ctx.content
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let len = line.trim_end().chars().count();
                (len > max).then(|| self.issue(ctx, index + 1, format!("Line too long ({len} > {max})")))
            })
            .collect()
    }
}
