//! Rule flagging `try` blocks that handle no exception.
//!
//! # Detected Patterns
//!
//! ```python
//! try:
//!     release()
//! finally:
//!     cleanup()
//! ```
//!
//! A `try` with no clause at all (`try: pass`) is flagged the same way.

use codemark_core::{FileContext, Issue, Rule, SyntaxTree};

/// Issue code for bare-try.
pub const CODE: &str = "BareTry";

/// Rule name for bare-try.
pub const NAME: &str = "bare-try";

const HANDLER_KINDS: &[&str] = &["except_clause", "except_group_clause"];

/// Flags `try` statements with zero `except` clauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareTry;

impl BareTry {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for BareTry {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags try blocks without exception handlers"
    }

    fn check(&self, ctx: &FileContext<'_>, tree: &SyntaxTree) -> Vec<Issue> {
        tree.nodes_of_kind("try_statement")
            .into_iter()
            .filter(|node| {
                let mut cursor = node.walk();
                let handled = node
                    .named_children(&mut cursor)
                    .any(|child| HANDLER_KINDS.contains(&child.kind()));
                !handled
            })
            .map(|node| {
                self.issue(
                    ctx,
                    node.start_position().row + 1,
                    "Try block without exception handlers.".to_string(),
                )
            })
            .collect()
    }
}
