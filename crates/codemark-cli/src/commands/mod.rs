//! Subcommand implementations.

pub mod init;
pub mod list_rules;
pub mod review;
pub mod smart_review;

use anyhow::{Context, Result};
use codemark_core::{render, Format, Issue, RunContext};
use std::io::Write;

/// Renders the report to stdout.
fn emit(issues: &[Issue], format: Format, ctx: &RunContext) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(issues, format, &mut out, ctx).context("Failed to write report")?;
    out.flush().context("Failed to write report")
}
