//! Review command implementation.

use anyhow::{Context, Result};
use codemark_core::{Config, ExternalFormatter, Fixer, Format, Outcome, RunContext};
use std::path::Path;

/// Runs the review command.
pub fn run(
    path: &Path,
    format: Format,
    fix: bool,
    config: &Config,
    ctx: &RunContext,
) -> Result<Outcome> {
    let analyzer = codemark_rules::analyzer_builder(config)
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Reviewing {} with {} rules and {} plugins",
        path.display(),
        analyzer.rule_count(),
        analyzer.plugins().len()
    );

    let mut issues = analyzer.analyze(path, ctx).context("Review failed")?;

    if fix {
        let formatter = ExternalFormatter::from_config(&config.fix);
        issues = Fixer::new(config, formatter).apply(issues, ctx);
        let fixed = issues.iter().filter(|i| i.is_fixed()).count();
        tracing::info!("Fixed {} of {} issues", fixed, issues.len());
    }

    super::emit(&issues, format, ctx)?;
    Ok(Outcome::of(&issues))
}
