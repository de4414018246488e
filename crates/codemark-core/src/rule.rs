//! Rule traits for defining review rules.

use crate::context::FileContext;
use crate::syntax::SyntaxTree;
use crate::types::{Issue, Level};

/// A structural rule evaluated against the syntax tree of one file.
///
/// Rules are pure: they read the file context and tree and return the
/// issues they find. They never touch the file on disk.
///
/// # Example
///
/// ```ignore
/// use codemark_core::{FileContext, Issue, Rule, SyntaxTree};
///
/// pub struct NoPrint;
///
/// impl Rule for NoPrint {
///     fn name(&self) -> &'static str { "no-print" }
///     fn code(&self) -> &'static str { "NoPrint" }
///
///     fn check(&self, ctx: &FileContext<'_>, tree: &SyntaxTree) -> Vec<Issue> {
///         tree.nodes_of_kind("call")
///             .into_iter()
///             .filter(|call| tree.text(*call).starts_with("print("))
///             .map(|call| self.issue(ctx, call.start_position().row + 1, "print() call".into()))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "bare-try").
    fn name(&self) -> &'static str;

    /// Returns the issue code (e.g., "BareTry").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the level for issues from this rule.
    fn default_level(&self) -> Level {
        Level::Warning
    }

    /// Checks a parsed file and returns any issues found.
    fn check(&self, ctx: &FileContext<'_>, tree: &SyntaxTree) -> Vec<Issue>;

    /// Builds an issue for this rule in the given file.
    fn issue(&self, ctx: &FileContext<'_>, line: usize, message: String) -> Issue {
        Issue::new(ctx.file_name(), line, self.code(), message, self.default_level())
    }
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// A rule evaluated against the raw text of one file.
///
/// Line rules run only for files that parsed successfully, after every
/// structural rule.
pub trait LineRule: Send + Sync {
    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str;

    /// Returns the issue code.
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the level for issues from this rule.
    fn default_level(&self) -> Level {
        Level::Warning
    }

    /// Checks the file text and returns any issues found.
    fn check_lines(&self, ctx: &FileContext<'_>) -> Vec<Issue>;

    /// Builds an issue for this rule in the given file.
    fn issue(&self, ctx: &FileContext<'_>, line: usize, message: String) -> Issue {
        Issue::new(ctx.file_name(), line, self.code(), message, self.default_level())
    }
}

/// Type alias for boxed `LineRule` trait objects.
pub type LineRuleBox = Box<dyn LineRule>;
