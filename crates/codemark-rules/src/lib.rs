//! # codemark-rules
//!
//! Built-in review rules and plugins for codemark.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | `MissingDocstring` | `missing-module-docstring` | Module without a docstring (line 1) |
//! | `MissingDocstring` | `missing-function-docstring` | Function or method without a docstring |
//! | `BareTry` | `bare-try` | `try` block without `except` clauses |
//! | `LineLength` | `line-length` | Line longer than `max_line_length` |
//!
//! ## Built-in Plugins
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | `LongFile` | `long-file` | File with more than 50 lines |
//!
//! ## Usage
//!
//! ```ignore
//! use codemark_core::{Config, RunContext};
//!
//! let config = Config::default();
//! let analyzer = codemark_rules::analyzer_builder(&config).build()?;
//! let issues = analyzer.analyze(Path::new("src"), &RunContext::new("review"))?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bare_try;
mod line_length;
mod long_file;
mod missing_docstring;
mod presets;
mod suggestions;

pub use bare_try::BareTry;
pub use line_length::LineLength;
pub use long_file::LongFile;
pub use missing_docstring::{MissingFunctionDocstring, MissingModuleDocstring};
pub use presets::{analyzer_builder, builtin_line_rules, builtin_plugins, builtin_rules};
pub use suggestions::suggestion_for;

/// Re-export core types for convenience.
pub use codemark_core::{Issue, Level, LineRule, Plugin, Rule};
