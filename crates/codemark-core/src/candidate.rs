//! Issue candidates as they arrive from producers, before normalization.
//!
//! Built-in rules, plugins and the advisory producer do not agree on a
//! single shape. Each shape is one variant of [`IssueCandidate`] and is
//! turned into a canonical [`Issue`](crate::Issue) by
//! [`normalize`](crate::normalize).

use crate::types::{Issue, Level};
use serde_json::Value;

/// An issue candidate in one of the accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueCandidate {
    /// Named fields, some possibly missing.
    Structured(StructuredCandidate),
    /// A `(summary, suggestion)` pair with `"path:line – code"` in the summary.
    LegacyPair(LegacyPairCandidate),
    /// Anything else; kept only as text.
    Opaque(OpaqueCandidate),
}

/// A candidate with named, optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredCandidate {
    /// File path.
    pub file: Option<String>,
    /// 1-based line.
    pub line: Option<usize>,
    /// Issue code.
    pub code: Option<String>,
    /// Message text.
    pub message: Option<String>,
    /// Level.
    pub level: Option<Level>,
    /// Fix outcome.
    pub auto_fixed: Option<bool>,
    /// Remediation hint.
    pub suggestion: Option<String>,
}

impl StructuredCandidate {
    /// Creates a candidate carrying only a code and a message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sets the file.
    #[must_use]
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the line.
    #[must_use]
    pub fn line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the level.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }
}

/// Legacy `(summary, suggestion)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyPairCandidate {
    /// Display string of the form `"path:line – code"`.
    pub summary: String,
    /// Becomes the issue message.
    pub suggestion: String,
}

/// A candidate of unrecognized shape, kept as its textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueCandidate(pub String);

impl IssueCandidate {
    /// Builds a legacy pair candidate.
    #[must_use]
    pub fn legacy_pair(summary: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::LegacyPair(LegacyPairCandidate {
            summary: summary.into(),
            suggestion: suggestion.into(),
        })
    }

    /// Builds an opaque candidate.
    #[must_use]
    pub fn opaque(text: impl Into<String>) -> Self {
        Self::Opaque(OpaqueCandidate(text.into()))
    }

    /// Returns the code this candidate declares, if it declares one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Structured(s) => s.code.as_deref(),
            Self::LegacyPair(_) | Self::Opaque(_) => None,
        }
    }

    /// Classifies an untyped JSON value produced by an external tool.
    ///
    /// Objects become [`Structured`](Self::Structured) with every field read
    /// leniently (a field of the wrong type counts as absent). A 4-element
    /// array is read as `[file, line, code, message]`, a 2-element array of
    /// strings as a legacy pair. Anything else is opaque.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Structured(StructuredCandidate {
                file: map.get("file").and_then(string_field),
                line: map.get("line").and_then(line_field),
                code: map.get("code").and_then(string_field),
                message: map.get("message").and_then(string_field),
                level: map
                    .get("level")
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse().ok()),
                auto_fixed: map
                    .get("autoFixed")
                    .or_else(|| map.get("auto_fixed"))
                    .and_then(Value::as_bool),
                suggestion: map.get("suggestion").and_then(string_field),
            }),
            Value::Array(items) => match items.as_slice() {
                [Value::String(summary), Value::String(suggestion)] => {
                    Self::legacy_pair(summary.clone(), suggestion.clone())
                }
                [file, line, code, message] => Self::Structured(StructuredCandidate {
                    file: string_field(file),
                    line: line_field(line),
                    code: string_field(code),
                    message: string_field(message),
                    ..StructuredCandidate::default()
                }),
                _ => Self::opaque(serde_json::to_string(&items).unwrap_or_default()),
            },
            Value::String(text) => Self::opaque(text),
            other => Self::opaque(other.to_string()),
        }
    }
}

fn string_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn line_field(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<StructuredCandidate> for IssueCandidate {
    fn from(candidate: StructuredCandidate) -> Self {
        Self::Structured(candidate)
    }
}

impl From<Issue> for IssueCandidate {
    fn from(issue: Issue) -> Self {
        Self::Structured(StructuredCandidate {
            file: Some(issue.file),
            line: Some(issue.line),
            code: Some(issue.code),
            message: Some(issue.message),
            level: Some(issue.level),
            auto_fixed: issue.auto_fixed,
            suggestion: issue.suggestion,
        })
    }
}
