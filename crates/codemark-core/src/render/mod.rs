//! Report renderers.
//!
//! Every renderer takes the ordered issue sequence as-is and writes it to a
//! sink; none of them sorts, filters or mutates the issues.

mod json;
mod sarif;
mod table;

pub use json::render_json;
pub use sarif::{render_sarif, SarifLog, TOOL_INFORMATION_URI, TOOL_NAME};
pub use table::render_table;

use crate::context::RunContext;
use crate::types::Issue;
use std::io::{self, Write};

/// Output representation of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Human-readable table.
    #[default]
    Terminal,
    /// Structured JSON dump.
    Json,
    /// SARIF 2.1.0 interchange document.
    Sarif,
}

impl Format {
    /// Returns the lowercase name of this format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::Json => "json",
            Self::Sarif => "sarif",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders issues in the given format.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render(
    issues: &[Issue],
    format: Format,
    out: &mut dyn Write,
    ctx: &RunContext,
) -> io::Result<()> {
    match format {
        Format::Terminal => render_table(issues, out, ctx.color()),
        Format::Json => render_json(issues, out),
        Format::Sarif => render_sarif(issues, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;

    fn issues() -> Vec<Issue> {
        vec![
            Issue::new("z.py", 9, "LineLength", "Line too long (90 > 88)", Level::Warning),
            Issue::new("a.py", 1, "MissingDocstring", "Missing file docstring", Level::Warning),
            Issue::new("m.py", 0, "PluginError", "Plugin 'x' failed: boom", Level::Error),
        ]
    }

    fn rendered(format: Format) -> String {
        let mut out = Vec::new();
        render(&issues(), format, &mut out, &RunContext::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_names() {
        assert_eq!(Format::default().to_string(), "terminal");
        assert_eq!(Format::Sarif.as_str(), "sarif");
    }

    #[test]
    fn test_every_format_preserves_order() {
        for format in [Format::Terminal, Format::Json, Format::Sarif] {
            let text = rendered(format);
            let z = text.find("z.py").unwrap();
            let a = text.find("a.py").unwrap();
            let m = text.find("m.py").unwrap();
            assert!(z < a && a < m, "{format} reordered issues");
        }
    }
}
