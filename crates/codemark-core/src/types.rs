//! Canonical issue types and report outcome.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Placeholder file name for issues that cannot be attributed to a file.
pub const UNKNOWN_FILE: &str = "unknown";

/// Placeholder code for issues whose producer did not supply one.
pub const UNKNOWN_CODE: &str = "Unknown";

/// Placeholder message for issues whose producer did not supply one.
pub const EMPTY_MESSAGE: &str = "(no message)";

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Informational message.
    Info,
    /// Something that should be addressed.
    #[default]
    Warning,
    /// Something that must be fixed.
    Error,
}

impl Level {
    /// Returns the lowercase name of this level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown level: {0}")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "info" | "note" => Ok(Self::Info),
            other => Err(UnknownLevel(other.to_string())),
        }
    }
}

/// One canonical finding.
///
/// Key order in serialized form is `file, line, code, message, level`
/// followed by the optional fields, which are omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Path of the file the issue belongs to.
    pub file: String,
    /// 1-based line, `0` for file-level issues.
    pub line: usize,
    /// Stable issue code (e.g. `MissingDocstring`).
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
    /// Severity level.
    pub level: Level,
    /// Outcome of an automatic fix, present only when one was attempted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_fixed: Option<bool>,
    /// Remediation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    /// Creates a new issue without fix outcome or suggestion.
    #[must_use]
    pub fn new(
        file: impl Into<String>,
        line: usize,
        code: impl Into<String>,
        message: impl Into<String>,
        level: Level,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            code: code.into(),
            message: message.into(),
            level,
            auto_fixed: None,
            suggestion: None,
        }
    }

    /// Attaches a remediation hint.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Records the outcome of a fix attempt.
    #[must_use]
    pub fn with_auto_fixed(mut self, fixed: bool) -> Self {
        self.auto_fixed = Some(fixed);
        self
    }

    /// Identity used for deduplication: `(file, line, code)`.
    #[must_use]
    pub fn key(&self) -> (&str, usize, &str) {
        (&self.file, self.line, &self.code)
    }

    /// Whether a fix was attempted and succeeded.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.auto_fixed == Some(true)
    }

    /// Formats the issue location the way every renderer shows it.
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}:{} – {}", self.file, self.line, self.code)
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} [{}]", self.location(), self.message, self.level)
    }
}

/// Binary outcome of a run, the basis for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No outstanding issues.
    Clean,
    /// At least one outstanding issue.
    IssuesFound,
}

impl Outcome {
    /// Exit code used for an unexpected internal fault.
    pub const FATAL_EXIT_CODE: i32 = 2;

    /// Derives the outcome from a set of issues, ignoring fixed ones.
    #[must_use]
    pub fn of(issues: &[Issue]) -> Self {
        if issues.iter().all(Issue::is_fixed) {
            Self::Clean
        } else {
            Self::IssuesFound
        }
    }

    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::IssuesFound => 1,
        }
    }
}

/// Counts issues per level as `(errors, warnings, infos)`.
#[must_use]
pub fn count_by_level(issues: &[Issue]) -> (usize, usize, usize) {
    issues
        .iter()
        .fold((0, 0, 0), |(e, w, i), issue| match issue.level {
            Level::Error => (e + 1, w, i),
            Level::Warning => (e, w + 1, i),
            Level::Info => (e, w, i + 1),
        })
}
