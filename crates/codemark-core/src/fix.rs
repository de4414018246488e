//! Automatic fixes and their recording.
//!
//! The fixer never decides whether an issue exists; it only attempts the
//! fixes it knows about and records the outcome on each issue as
//! `autoFixed`.

use crate::config::{Config, FixConfig};
use crate::context::RunContext;
use crate::syntax::SyntaxTree;
use crate::types::Issue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Message of the file-level missing docstring issue.
pub const MODULE_DOCSTRING_MESSAGE: &str = "Missing file docstring";

/// Template inserted at the top of a module without a docstring.
pub const MODULE_DOCSTRING_TEMPLATE: &str = "\"\"\"Module description.\"\"\"\n\n";

const MISSING_DOCSTRING: &str = "MissingDocstring";
const LINE_LENGTH: &str = "LineLength";

/// Errors from a fix attempt.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    /// Reading or writing the file failed.
    #[error("Failed to update {path}: {source}")]
    Io {
        /// File being fixed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The formatter could not be run or reported failure.
    #[error("Formatter {program} failed: {message}")]
    Formatter {
        /// Formatter program.
        program: String,
        /// Failure description.
        message: String,
    },

    /// No formatter command is configured.
    #[error("No formatter configured")]
    NoFormatter,
}

/// Reformats a file to a line length.
pub trait CodeFormatter {
    /// Formats `path` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the file could not be formatted.
    fn format(&self, path: &Path, max_line_length: usize) -> Result<(), FixError>;
}

/// A formatter run as `<command> --line-length <n> <file>`.
#[derive(Debug, Clone)]
pub struct ExternalFormatter {
    command: Vec<String>,
}

impl ExternalFormatter {
    /// Creates a formatter from the fix configuration.
    #[must_use]
    pub fn from_config(config: &FixConfig) -> Self {
        Self {
            command: config.formatter.clone(),
        }
    }
}

impl CodeFormatter for ExternalFormatter {
    fn format(&self, path: &Path, max_line_length: usize) -> Result<(), FixError> {
        let (program, args) = self.command.split_first().ok_or(FixError::NoFormatter)?;
        let output = Command::new(program)
            .args(args)
            .arg("--line-length")
            .arg(max_line_length.to_string())
            .arg(path)
            .output()
            .map_err(|e| FixError::Formatter {
                program: program.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(FixError::Formatter {
                program: program.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Applies fixes for fixable issues.
pub struct Fixer<'a, F> {
    config: &'a Config,
    formatter: F,
}

impl<'a, F: CodeFormatter> Fixer<'a, F> {
    /// Creates a fixer.
    #[must_use]
    pub fn new(config: &'a Config, formatter: F) -> Self {
        Self { config, formatter }
    }

    /// Attempts fixes and returns every issue, in order.
    ///
    /// Issues a fix was attempted for carry `autoFixed`. The formatter runs
    /// at most once per file and its outcome is shared by that file's
    /// `LineLength` issues.
    #[must_use]
    pub fn apply(&self, issues: Vec<Issue>, ctx: &RunContext) -> Vec<Issue> {
        let _guard = ctx.span().enter();
        let mut formatted: HashMap<String, bool> = HashMap::new();

        issues
            .into_iter()
            .map(|issue| {
                if issue.code == LINE_LENGTH {
                    let fixed = *formatted
                        .entry(issue.file.clone())
                        .or_insert_with(|| self.format(Path::new(&issue.file)));
                    issue.with_auto_fixed(fixed)
                } else if is_module_docstring(&issue) && self.config.insert_docstrings {
                    let fixed = self.insert_docstring(Path::new(&issue.file));
                    issue.with_auto_fixed(fixed)
                } else {
                    issue
                }
            })
            .collect()
    }

    fn format(&self, path: &Path) -> bool {
        match self.formatter.format(path, self.config.max_line_length()) {
            Ok(()) => {
                info!("Formatted {}", path.display());
                true
            }
            Err(e) => {
                warn!("Failed to format {}: {}", path.display(), e);
                false
            }
        }
    }

    fn insert_docstring(&self, path: &Path) -> bool {
        match insert_module_docstring(path) {
            Ok(true) => {
                info!("Inserted template docstring in {}", path.display());
                true
            }
            Ok(false) => {
                debug!("Module already documented: {}", path.display());
                false
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }
}

fn is_module_docstring(issue: &Issue) -> bool {
    issue.code == MISSING_DOCSTRING && issue.message == MODULE_DOCSTRING_MESSAGE
}

/// Inserts the template docstring unless the module has one.
///
/// The docstring goes after a leading shebang and encoding declaration,
/// which must stay on the first two lines. Returns whether the file was
/// changed.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn insert_module_docstring(path: &Path) -> Result<bool, FixError> {
    let io_error = |source| FixError::Io {
        path: path.to_path_buf(),
        source,
    };
    let content = std::fs::read_to_string(path).map_err(io_error)?;

    let documented = SyntaxTree::parse(&content)
        .ok()
        .and_then(|tree| tree.docstring(tree.root()))
        .is_some_and(|doc| !doc.trim().is_empty());
    if documented {
        return Ok(false);
    }

    let (header, body) = content.split_at(header_len(&content));
    let newline = if header.is_empty() || header.ends_with('\n') { "" } else { "\n" };
    let fixed = format!("{header}{newline}{MODULE_DOCSTRING_TEMPLATE}{body}");
    std::fs::write(path, fixed).map_err(io_error)?;
    Ok(true)
}

/// Byte length of the leading shebang and encoding declaration lines.
fn header_len(content: &str) -> usize {
    let mut len = 0;
    for (index, line) in content.split_inclusive('\n').take(2).enumerate() {
        let shebang = index == 0 && line.starts_with("#!");
        if !shebang && !is_encoding_declaration(line) {
            break;
        }
        len += line.len();
    }
    len
}

fn is_encoding_declaration(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('#') && (line.contains("coding:") || line.contains("coding="))
}
