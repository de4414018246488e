//! Structured JSON dump.

use crate::types::Issue;
use std::io::{self, Write};

/// Writes the issues as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_json(issues: &[Issue], out: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, issues)?;
    writeln!(out)
}
