//! Smart-review command implementation.

use anyhow::{Context, Result};
use codemark_core::{
    review_sources, CommandAdvisor, Config, Format, Outcome, RunContext, SourceLoader,
};
use std::path::Path;

/// Runs the smart-review command.
pub fn run(path: &Path, format: Format, config: &Config, ctx: &RunContext) -> Result<Outcome> {
    let advisor = CommandAdvisor::from_config(config).context(
        "No advisory reviewer configured. Set [advisory] command in codemark.toml.",
    )?;
    let loader = SourceLoader::new(&config.source).context("Invalid [source] configuration")?;

    let issues =
        review_sources(&advisor, &loader, path, config, ctx).context("Smart review failed")?;

    super::emit(&issues, format, ctx)?;
    Ok(Outcome::of(&issues))
}
