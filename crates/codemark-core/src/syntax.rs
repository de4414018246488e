//! Python syntax trees via Tree-sitter.
//!
//! [`SyntaxTree::parse`] turns source text into a tree or a
//! [`SyntaxError`]. Tree-sitter always produces a tree; a file is treated
//! as unparseable when that tree contains an `ERROR` or `MISSING` node.
//!
//! The grammar still accepts the Python 2 `print` and `exec` statements.
//! Those parse cleanly but are rejected here, since they are not valid
//! Python 3.

use tree_sitter::{Language, Node, Parser, Tree};

/// Longest excerpt of offending text quoted in a syntax error message.
const EXCERPT_LEN: usize = 20;

/// Python 2 statements the grammar parses without error.
const LEGACY_STATEMENTS: &[(&str, &str)] = &[
    ("print_statement", "print"),
    ("exec_statement", "exec"),
];

/// A parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (line {line})")]
pub struct SyntaxError {
    /// 1-based line of the failure, `0` if unknown.
    pub line: usize,
    /// Diagnostic text.
    pub message: String,
}

/// A parsed Python module.
pub struct SyntaxTree {
    tree: Tree,
    source: String,
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("root", &self.tree.root_node().kind())
            .finish_non_exhaustive()
    }
}

impl SyntaxTree {
    /// Parses Python source.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] pointing at the first error or missing
    /// node in pre-order, or at the first Python 2 `print`/`exec`
    /// statement.
    pub fn parse(source: &str) -> Result<Self, SyntaxError> {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();
        parser.set_language(&language).map_err(|e| SyntaxError {
            line: 0,
            message: format!("incompatible Python grammar: {e}"),
        })?;

        let tree = parser.parse(source, None).ok_or_else(|| SyntaxError {
            line: 0,
            message: "parser produced no syntax tree".to_string(),
        })?;

        let parsed = Self {
            tree,
            source: source.to_owned(),
        };
        if parsed.root().has_error() {
            return Err(parsed.first_error());
        }
        if let Some(err) = parsed.legacy_statement() {
            return Err(err);
        }
        Ok(parsed)
    }

    /// The `module` node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The source the tree was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source text covered by a node.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    /// All nodes in pre-order.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node<'_>> {
        let mut nodes = Vec::new();
        let mut cursor = self.tree.walk();
        loop {
            nodes.push(cursor.node());
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return nodes;
                }
            }
        }
    }

    /// All nodes of the given kind, in pre-order.
    #[must_use]
    pub fn nodes_of_kind(&self, kind: &str) -> Vec<Node<'_>> {
        self.nodes()
            .into_iter()
            .filter(|n| n.kind() == kind)
            .collect()
    }

    /// Docstring of a module or of a definition's body.
    ///
    /// Pass the `module` node or the `body` block of a function or class.
    /// The docstring is the first statement, ignoring comments, when it is
    /// an expression statement made of one plain string literal. Returns
    /// the literal's content without prefix and quotes.
    #[must_use]
    pub fn docstring(&self, body: Node<'_>) -> Option<String> {
        let first = first_statement(body)?;
        if first.kind() != "expression_statement" || first.named_child_count() != 1 {
            return None;
        }
        let literal = first.named_child(0)?;
        if literal.kind() != "string" {
            return None;
        }
        let mut cursor = literal.walk();
        if literal
            .named_children(&mut cursor)
            .any(|c| c.kind() == "interpolation")
        {
            return None;
        }
        string_content(self.text(literal))
    }

    /// Whether the module has no statements at all.
    #[must_use]
    pub fn is_empty_module(&self) -> bool {
        first_statement(self.root()).is_none()
    }

    fn legacy_statement(&self) -> Option<SyntaxError> {
        self.nodes().into_iter().find_map(|node| {
            let (_, keyword) = LEGACY_STATEMENTS
                .iter()
                .find(|(kind, _)| node.kind() == *kind)?;
            Some(SyntaxError {
                line: node.start_position().row + 1,
                message: format!("Python 2 '{keyword}' statement is not supported"),
            })
        })
    }

    fn first_error(&self) -> SyntaxError {
        let Some(node) = self
            .nodes()
            .into_iter()
            .find(|n| n.is_error() || n.is_missing())
        else {
            return SyntaxError {
                line: 0,
                message: "invalid syntax".to_string(),
            };
        };

        let line = node.start_position().row + 1;
        let message = if node.is_missing() {
            format!("expected '{}'", node.kind())
        } else {
            let excerpt: String = self
                .text(node)
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("")
                .chars()
                .take(EXCERPT_LEN)
                .collect();
            if excerpt.is_empty() {
                "invalid syntax".to_string()
            } else {
                format!("invalid syntax near '{excerpt}'")
            }
        };
        SyntaxError { line, message }
    }
}

/// First named child that is not a comment.
fn first_statement(body: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    first
}

/// Strips the prefix and quotes of a string literal.
///
/// Byte and f-string prefixes do not make docstrings.
fn string_content(literal: &str) -> Option<String> {
    let quote_at = literal.find(['"', '\''])?;
    let prefix = &literal[..quote_at];
    if prefix.chars().any(|c| matches!(c, 'b' | 'B' | 'f' | 'F')) {
        return None;
    }
    let body = &literal[quote_at..];
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if body.len() >= 2 * quote.len() && body.starts_with(quote) && body.ends_with(quote) {
            return Some(body[quote.len()..body.len() - quote.len()].to_string());
        }
    }
    None
}
