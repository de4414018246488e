//! Rules requiring docstrings on modules and functions.
//!
//! # Detected Patterns
//!
//! - A module whose first statement is not a string literal
//! - A `def` or `async def` (including methods) whose body does not start
//!   with a string literal
//!
//! A docstring containing only whitespace counts as missing. Comments before
//! the docstring are allowed.
//!
//! # Good Patterns
//!
//! ```python
//! """Helpers for parsing invoices."""
//!
//! def total(lines):
//!     """Sum the line amounts."""
//!     return sum(line.amount for line in lines)
//! ```

use codemark_core::{FileContext, Issue, Rule, SyntaxTree, MODULE_DOCSTRING_MESSAGE};
use tracing::debug;

/// Issue code shared by both docstring rules.
pub const CODE: &str = "MissingDocstring";

/// Requires a module-level docstring.
///
/// Reported at line 1. Modules without any statement are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingModuleDocstring;

impl MissingModuleDocstring {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for MissingModuleDocstring {
    fn name(&self) -> &'static str {
        "missing-module-docstring"
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires a docstring at the top of every module"
    }

    fn check(&self, ctx: &FileContext<'_>, tree: &SyntaxTree) -> Vec<Issue> {
        if tree.is_empty_module() {
            debug!("Skipping empty module {}", ctx.path.display());
            return Vec::new();
        }
        if has_text(tree.docstring(tree.root())) {
            return Vec::new();
        }
        vec![self.issue(ctx, 1, MODULE_DOCSTRING_MESSAGE.to_string())]
    }
}

/// Requires a docstring on every function and method.
///
/// Reported at the line of the `def` keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingFunctionDocstring;

impl MissingFunctionDocstring {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for MissingFunctionDocstring {
    fn name(&self) -> &'static str {
        "missing-function-docstring"
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires a docstring on every function and method"
    }

    fn check(&self, ctx: &FileContext<'_>, tree: &SyntaxTree) -> Vec<Issue> {
        tree.nodes_of_kind("function_definition")
            .into_iter()
            .filter(|def| {
                let body = def.child_by_field_name("body");
                !body.is_some_and(|body| has_text(tree.docstring(body)))
            })
            .map(|def| {
                let name = def
                    .child_by_field_name("name")
                    .map_or("<anonymous>", |n| tree.text(n));
                self.issue(
                    ctx,
                    def.start_position().row + 1,
                    format!("Function '{name}' has no docstring."),
                )
            })
            .collect()
    }
}

fn has_text(docstring: Option<String>) -> bool {
    docstring.is_some_and(|doc| !doc.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemark_core::Config;
    use std::path::Path;

    fn check<R: Rule>(rule: &R, source: &str) -> Vec<Issue> {
        let config = Config::default();
        let ctx = FileContext::new(Path::new("m.py"), source, &config);
        let tree = SyntaxTree::parse(source).unwrap();
        rule.check(&ctx, &tree)
    }

    fn lines(issues: &[Issue]) -> Vec<usize> {
        issues.iter().map(|i| i.line).collect()
    }

    #[test]
    fn test_module_without_docstring() {
        let issues = check(&MissingModuleDocstring, "import os\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 1);
        assert_eq!(issues[0].code, CODE);
        assert_eq!(issues[0].message, MODULE_DOCSTRING_MESSAGE);
    }

    #[test]
    fn test_module_with_docstring() {
        assert!(check(&MissingModuleDocstring, "'''Doc.'''\nimport os\n").is_empty());
        assert!(check(&MissingModuleDocstring, "#!/usr/bin/env python\n\"\"\"Doc.\"\"\"\n").is_empty());
    }

    #[test]
    fn test_blank_module_docstring_counts_as_missing() {
        assert_eq!(check(&MissingModuleDocstring, "\"\"\"   \"\"\"\nx = 1\n").len(), 1);
    }

    #[test]
    fn test_empty_module_is_skipped() {
        assert!(check(&MissingModuleDocstring, "").is_empty());
        assert!(check(&MissingModuleDocstring, "# nothing here\n").is_empty());
    }

    #[test]
    fn test_string_prefix_is_not_enough() {
        // A string that is part of an assignment is not a docstring.
        assert_eq!(check(&MissingModuleDocstring, "x = \"\"\"text\"\"\"\n").len(), 1);
    }

    #[test]
    fn test_functions_without_docstrings() {
        let source = "\
def documented():
    \"\"\"Yes.\"\"\"

def bare():
    return 1

class Box:
    \"\"\"A box.\"\"\"

    def open(self):
        pass

async def fetch():
    pass
";
        let issues = check(&MissingFunctionDocstring, source);
        assert_eq!(lines(&issues), [4, 10, 13]);
        assert_eq!(issues[0].message, "Function 'bare' has no docstring.");
        assert_eq!(issues[1].message, "Function 'open' has no docstring.");
        assert_eq!(issues[2].message, "Function 'fetch' has no docstring.");
    }

    #[test]
    fn test_decorated_function_reports_def_line() {
        let source = "@cache\ndef f():\n    return 1\n";
        assert_eq!(lines(&check(&MissingFunctionDocstring, source)), [2]);
    }

    #[test]
    fn test_nested_functions_are_checked() {
        let source = "def outer():\n    \"\"\"Doc.\"\"\"\n    def inner():\n        pass\n    return inner\n";
        let issues = check(&MissingFunctionDocstring, source);
        assert_eq!(lines(&issues), [3]);
        assert!(issues[0].message.contains("'inner'"));
    }
}
