//! SARIF 2.1.0 interchange document.
//!
//! Downstream tools diff this output, so the nesting, key order and key
//! set below are fixed. Field order in each struct is the serialized order.

use crate::types::Issue;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// SARIF version written in every document.
pub const SARIF_VERSION: &str = "2.1.0";

/// Tool name reported in the run.
pub const TOOL_NAME: &str = "Codemark";

/// Tool information URI reported in the run.
pub const TOOL_INFORMATION_URI: &str = "https://github.com/your/codemark";

/// Top-level SARIF document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarifLog {
    /// Always `"2.1.0"`.
    pub version: String,
    /// Exactly one run.
    pub runs: Vec<Run>,
}

/// One analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Tool identity.
    pub tool: Tool,
    /// One result per issue, in issue order.
    pub results: Vec<SarifResult>,
}

/// Tool wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// Driver component.
    pub driver: Driver,
}

/// Tool driver identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    /// Tool name.
    pub name: String,
    /// Tool homepage.
    pub information_uri: String,
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    /// Issue code.
    pub rule_id: String,
    /// Issue message.
    pub message: Message,
    /// Exactly one location.
    pub locations: Vec<Location>,
}

/// Message wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message text.
    pub text: String,
}

/// Location wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Physical location.
    pub physical_location: PhysicalLocation,
}

/// File and region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocation {
    /// Artifact.
    pub artifact_location: ArtifactLocation,
    /// Region in the artifact.
    pub region: Region,
}

/// Artifact reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocation {
    /// File path.
    pub uri: String,
}

/// Region reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Issue line, `0` for file-level issues.
    pub start_line: usize,
}

impl SarifLog {
    /// Builds the document for an issue sequence.
    #[must_use]
    pub fn from_issues(issues: &[Issue]) -> Self {
        Self {
            version: SARIF_VERSION.to_string(),
            runs: vec![Run {
                tool: Tool {
                    driver: Driver {
                        name: TOOL_NAME.to_string(),
                        information_uri: TOOL_INFORMATION_URI.to_string(),
                    },
                },
                results: issues.iter().map(SarifResult::from_issue).collect(),
            }],
        }
    }
}

impl SarifResult {
    fn from_issue(issue: &Issue) -> Self {
        Self {
            rule_id: issue.code.clone(),
            message: Message {
                text: issue.message.clone(),
            },
            locations: vec![Location {
                physical_location: PhysicalLocation {
                    artifact_location: ArtifactLocation {
                        uri: issue.file.clone(),
                    },
                    region: Region {
                        start_line: issue.line,
                    },
                },
            }],
        }
    }
}

/// Writes the SARIF document for the issues, pretty-printed.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_sarif(issues: &[Issue], out: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &SarifLog::from_issues(issues))?;
    writeln!(out)
}
