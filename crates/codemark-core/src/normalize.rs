//! Issue normalization.
//!
//! Converts every [`IssueCandidate`] into exactly one canonical [`Issue`],
//! filling defaults for whatever the producer left out. Order is preserved;
//! nothing is deduplicated, sorted or filtered here.

use crate::candidate::{IssueCandidate, LegacyPairCandidate, OpaqueCandidate, StructuredCandidate};
use crate::types::{Issue, Level, EMPTY_MESSAGE, UNKNOWN_CODE, UNKNOWN_FILE};

/// Separator between the location and the code in legacy summaries.
const LEGACY_SEPARATOR: &str = " – ";

/// Normalizes a sequence of candidates, preserving order.
#[must_use]
pub fn normalize<I>(candidates: I) -> Vec<Issue>
where
    I: IntoIterator<Item = IssueCandidate>,
{
    candidates.into_iter().map(normalize_one).collect()
}

/// Normalizes a single candidate.
#[must_use]
pub fn normalize_one(candidate: IssueCandidate) -> Issue {
    match candidate {
        IssueCandidate::Structured(s) => from_structured(s),
        IssueCandidate::LegacyPair(p) => from_legacy_pair(p),
        IssueCandidate::Opaque(o) => from_opaque(o),
    }
}

fn from_structured(candidate: StructuredCandidate) -> Issue {
    Issue {
        file: non_empty(candidate.file).unwrap_or_else(|| UNKNOWN_FILE.to_string()),
        line: candidate.line.unwrap_or(0),
        code: non_empty(candidate.code.map(|c| c.trim().to_string()))
            .unwrap_or_else(|| UNKNOWN_CODE.to_string()),
        message: non_empty(candidate.message).unwrap_or_else(|| EMPTY_MESSAGE.to_string()),
        level: candidate.level.unwrap_or_default(),
        auto_fixed: candidate.auto_fixed,
        suggestion: candidate.suggestion,
    }
}

/// Lossy adapter for `"path:line – code"` summaries.
fn from_legacy_pair(pair: LegacyPairCandidate) -> Issue {
    let (location, code) = match pair.summary.split_once(LEGACY_SEPARATOR) {
        Some((location, code)) => (Some(location), Some(code.trim())),
        None => (None, None),
    };

    let (file, line) = location
        .and_then(|loc| loc.rsplit_once(':'))
        .and_then(|(path, line)| {
            let line = line.trim().parse::<usize>().ok()?;
            let path = path.trim();
            (!path.is_empty()).then(|| (path.to_string(), line))
        })
        .unwrap_or_else(|| (UNKNOWN_FILE.to_string(), 0));

    let code = code
        .filter(|c| !c.is_empty())
        .map_or_else(|| UNKNOWN_CODE.to_string(), str::to_string);

    Issue::new(
        file,
        line,
        code,
        non_empty(Some(pair.suggestion)).unwrap_or_else(|| EMPTY_MESSAGE.to_string()),
        Level::default(),
    )
}

fn from_opaque(opaque: OpaqueCandidate) -> Issue {
    Issue::new(
        UNKNOWN_FILE,
        0,
        UNKNOWN_CODE,
        non_empty(Some(opaque.0)).unwrap_or_else(|| EMPTY_MESSAGE.to_string()),
        Level::default(),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
