//! # codemark-core
//!
//! Analysis and reporting pipeline for Python sources, built on
//! `tree-sitter` syntax trees.
//!
//! Data flows one way through the crate:
//!
//! - [`SourceLoader`] resolves a path to an ordered list of files
//! - [`Analyzer`] parses each file and runs [`Rule`]s, [`LineRule`]s and
//!   [`Plugin`]s from a [`PluginRegistry`]
//! - [`normalize`] turns every [`IssueCandidate`] into a canonical [`Issue`]
//! - [`render`] writes the issues as a table, JSON or SARIF
//!
//! Per-file and per-rule failures never abort a run; they are reported as
//! issues of their own.
//!
//! ## Example
//!
//! ```ignore
//! use codemark_core::{render, Analyzer, Format, RunContext};
//!
//! let analyzer = Analyzer::builder()
//!     .rule(MyRule::new())
//!     .config(config)
//!     .build()?;
//!
//! let ctx = RunContext::new("review");
//! let issues = analyzer.analyze(Path::new("src"), &ctx)?;
//! render(&issues, Format::Sarif, &mut std::io::stdout(), &ctx)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod advisory;
mod analyzer;
mod candidate;
mod config;
mod context;
mod fix;
mod normalize;
mod plugin;
mod rule;
mod source;
mod syntax;
mod types;

/// Report renderers.
pub mod render;

pub use advisory::{
    review_sources, AdvisoryError, AdvisoryProducer, AdvisoryResponse, CommandAdvisor,
    AI_REVIEW_CODE, INVALID_PATH_CODE,
};
pub use analyzer::{
    Analyzer, AnalyzerBuilder, AnalyzerError, SuggestionFn, READ_ERROR_CODE, RULE_ERROR_CODE,
    SYNTAX_ERROR_CODE,
};
pub use candidate::{IssueCandidate, LegacyPairCandidate, OpaqueCandidate, StructuredCandidate};
pub use config::{
    AdvisoryConfig, CommandPluginConfig, Config, ConfigError, FixConfig, PluginsConfig, Profile,
    SourceConfig,
};
pub use context::{FileContext, RunContext};
pub use fix::{
    insert_module_docstring, CodeFormatter, ExternalFormatter, FixError, Fixer,
    MODULE_DOCSTRING_MESSAGE, MODULE_DOCSTRING_TEMPLATE,
};
pub use normalize::{normalize, normalize_one};
pub use plugin::{
    CommandPlugin, Plugin, PluginBox, PluginFault, PluginHandle, PluginRegistry, PLUGIN_ERROR_CODE,
};
pub use render::{render, Format};
pub use rule::{LineRule, LineRuleBox, Rule, RuleBox};
pub use source::{SourceError, SourceLoader};
pub use syntax::{SyntaxError, SyntaxTree};
pub use types::{count_by_level, Issue, Level, Outcome, UNKNOWN_CODE, UNKNOWN_FILE};
