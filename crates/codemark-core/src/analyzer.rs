//! Rule engine orchestrating per-file analysis.

use crate::candidate::IssueCandidate;
use crate::config::Config;
use crate::context::{FileContext, RunContext};
use crate::normalize::normalize;
use crate::plugin::{isolate, PluginRegistry};
use crate::rule::{LineRule, LineRuleBox, Rule, RuleBox};
use crate::source::{SourceError, SourceLoader};
use crate::syntax::SyntaxTree;
use crate::types::{Issue, Level};

use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Code of the issue reported for an unparseable file.
pub const SYNTAX_ERROR_CODE: &str = "SyntaxError";

/// Code of the issue reported for an unreadable file.
pub const READ_ERROR_CODE: &str = "ReadError";

/// Code of the issue reported when a built-in rule panics.
pub const RULE_ERROR_CODE: &str = "RuleError";

/// Maps a built-in issue code to its remediation hint.
pub type SuggestionFn = fn(&str) -> Option<&'static str>;

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Source discovery failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    rules: Vec<RuleBox>,
    line_rules: Vec<LineRuleBox>,
    plugins: PluginRegistry,
    config: Option<Config>,
    suggestions: Option<SuggestionFn>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a structural rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed structural rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds a line rule.
    #[must_use]
    pub fn line_rule<R: LineRule + 'static>(mut self, rule: R) -> Self {
        self.line_rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed line rule.
    #[must_use]
    pub fn line_rule_box(mut self, rule: LineRuleBox) -> Self {
        self.line_rules.push(rule);
        self
    }

    /// Sets the plugin registry.
    #[must_use]
    pub fn plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the suggestion table for built-in codes.
    #[must_use]
    pub fn suggestions(mut self, suggestions: SuggestionFn) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if a source exclude pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let loader = SourceLoader::new(&config.source)?;
        Ok(Analyzer {
            rules: self.rules,
            line_rules: self.line_rules,
            plugins: self.plugins,
            config,
            loader,
            suggestions: self.suggestions,
        })
    }
}

/// The rule engine.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    rules: Vec<RuleBox>,
    line_rules: Vec<LineRuleBox>,
    plugins: PluginRegistry,
    config: Config,
    loader: SourceLoader,
    suggestions: Option<SuggestionFn>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the run configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the source loader.
    #[must_use]
    pub fn loader(&self) -> &SourceLoader {
        &self.loader
    }

    /// Returns the plugin registry.
    #[must_use]
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Returns the number of built-in rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len() + self.line_rules.len()
    }

    /// Analyzes a file or directory.
    ///
    /// Files are visited in loader order; within a file, structural rules
    /// run first, then line rules, then plugins. Per-file and per-rule
    /// failures are reported as issues.
    ///
    /// # Errors
    ///
    /// Returns an error only if `path` cannot be discovered.
    pub fn analyze(&self, path: &Path, ctx: &RunContext) -> Result<Vec<Issue>, AnalyzerError> {
        let _guard = ctx.span().enter();
        info!("Starting analysis at {}", path.display());

        let files = self.loader.discover(path)?;
        info!("Found {} files to analyze", files.len());

        let mut issues = Vec::new();
        for file in &files {
            issues.extend(self.analyze_file(file));
        }

        info!("Analysis finished with {} issues", issues.len());
        Ok(issues)
    }

    /// Analyzes one file.
    ///
    /// Never fails: read and parse failures become a single issue.
    #[must_use]
    pub fn analyze_file(&self, path: &Path) -> Vec<Issue> {
        debug!("Analyzing {}", path.display());
        let file_name = path.display().to_string();

        let content = match std::fs::read(path).map(String::from_utf8) {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                warn!("Failed to decode {}: {}", file_name, e);
                let issue = Issue::new(file_name, 0, READ_ERROR_CODE, e.to_string(), Level::Error);
                return self.finish(vec![issue], Vec::new());
            }
            Err(e) => {
                warn!("Failed to read {}: {}", file_name, e);
                let issue = Issue::new(file_name, 0, READ_ERROR_CODE, e.to_string(), Level::Error);
                return self.finish(vec![issue], Vec::new());
            }
        };

        let tree = match SyntaxTree::parse(&content) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Failed to parse {}: {}", file_name, e);
                let issue = Issue::new(file_name, e.line, SYNTAX_ERROR_CODE, e.message, Level::Error);
                return self.finish(vec![issue], Vec::new());
            }
        };

        let ctx = FileContext::new(path, &content, &self.config);
        let mut builtin = Vec::new();

        for rule in &self.rules {
            if self.config.is_ignored(rule.code()) {
                debug!("Skipping ignored rule: {}", rule.name());
                continue;
            }
            match isolate(|| rule.check(&ctx, &tree)) {
                Ok(found) => builtin.extend(found),
                Err(message) => builtin.push(rule_error(&file_name, rule.name(), &message)),
            }
        }

        for rule in &self.line_rules {
            if self.config.is_ignored(rule.code()) {
                debug!("Skipping ignored rule: {}", rule.name());
                continue;
            }
            match isolate(|| rule.check_lines(&ctx)) {
                Ok(found) => builtin.extend(found),
                Err(message) => builtin.push(rule_error(&file_name, rule.name(), &message)),
            }
        }

        let external = self
            .plugins
            .discover()
            .iter()
            .flat_map(|handle| self.plugins.invoke(handle, path, &self.config))
            .collect();

        self.finish(builtin, external)
    }

    /// Attaches suggestions to built-in issues, appends plugin
    /// candidates, normalizes, and drops ignored codes.
    fn finish(&self, builtin: Vec<Issue>, external: Vec<IssueCandidate>) -> Vec<Issue> {
        let builtin = builtin.into_iter().map(|issue| self.suggest(issue));
        normalize(builtin.map(IssueCandidate::from).chain(external))
            .into_iter()
            .filter(|issue| !self.config.is_ignored(&issue.code))
            .collect()
    }

    fn suggest(&self, mut issue: Issue) -> Issue {
        if issue.suggestion.is_none() {
            issue.suggestion = self
                .suggestions
                .and_then(|table| table(&issue.code))
                .map(str::to_string);
        }
        issue
    }
}

fn rule_error(file_name: &str, rule: &str, failure: &str) -> Issue {
    warn!("Rule {} panicked on {}: {}", rule, file_name, failure);
    Issue::new(
        file_name,
        0,
        RULE_ERROR_CODE,
        format!("Rule '{rule}' failed: {failure}"),
        Level::Error,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::StructuredCandidate;
    use crate::plugin::{Plugin, PluginFault};
    use std::fs;

    struct EveryFunction;

    impl Rule for EveryFunction {
        fn name(&self) -> &'static str {
            "every-function"
        }
        fn code(&self) -> &'static str {
            "EveryFunction"
        }
        fn check(&self, ctx: &FileContext<'_>, tree: &SyntaxTree) -> Vec<Issue> {
            tree.nodes_of_kind("function_definition")
                .into_iter()
                .map(|n| self.issue(ctx, n.start_position().row + 1, "function".to_string()))
                .collect()
        }
    }

    struct Exploding;

    impl Rule for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }
        fn code(&self) -> &'static str {
            "Exploding"
        }
        fn check(&self, _ctx: &FileContext<'_>, _tree: &SyntaxTree) -> Vec<Issue> {
            panic!("boom");
        }
    }

    struct FirstLine;

    impl LineRule for FirstLine {
        fn name(&self) -> &'static str {
            "first-line"
        }
        fn code(&self) -> &'static str {
            "FirstLine"
        }
        fn check_lines(&self, ctx: &FileContext<'_>) -> Vec<Issue> {
            vec![self.issue(ctx, 1, "first".to_string())]
        }
    }

    struct Tagging;

    impl Plugin for Tagging {
        fn name(&self) -> &str {
            "tagging"
        }
        fn run(&self, _path: &Path, _config: &Config) -> Result<Vec<IssueCandidate>, PluginFault> {
            Ok(vec![StructuredCandidate::new("Tagged", "tag").into()])
        }
    }

    fn suggestions(code: &str) -> Option<&'static str> {
        (code == "EveryFunction").then_some("Document it.")
    }

    fn analyzer(config: Config) -> Analyzer {
        Analyzer::builder()
            .rule(EveryFunction)
            .line_rule(FirstLine)
            .plugins(PluginRegistry::new().register(Tagging))
            .suggestions(suggestions)
            .config(config)
            .build()
            .unwrap()
    }

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_rule_order_within_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "m.py", "def a():\n    pass\n");

        let issues = analyzer(Config::default()).analyze_file(&file);
        let codes: Vec<_> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, ["EveryFunction", "FirstLine", "Tagged"]);
        assert_eq!(issues[0].suggestion.as_deref(), Some("Document it."));
        assert!(issues[2].suggestion.is_none());
        assert_eq!(issues[2].file, file.display().to_string());
    }

    #[test]
    fn test_syntax_error_stops_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "bad.py", "def broken(:\n    pass\n");

        let issues = analyzer(Config::default()).analyze_file(&file);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, SYNTAX_ERROR_CODE);
        assert_eq!(issues[0].line, 1);
        assert_eq!(issues[0].level, Level::Error);
    }

    #[test]
    fn test_unreadable_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("latin1.py");
        fs::write(&file, b"x = '\xe9'\n").unwrap();

        let issues = analyzer(Config::default()).analyze_file(&file);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, READ_ERROR_CODE);
    }

    #[test]
    fn test_panicking_rule_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "m.py", "def a():\n    pass\n");

        let analyzer = Analyzer::builder()
            .rule(Exploding)
            .rule(EveryFunction)
            .build()
            .unwrap();
        let issues = analyzer.analyze_file(&file);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].code, RULE_ERROR_CODE);
        assert!(issues[0].message.contains("'exploding'"));
        assert!(issues[0].message.contains("boom"));
        assert_eq!(issues[1].code, "EveryFunction");
    }

    #[test]
    fn test_ignored_codes_never_appear() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "m.py", "def a():\n    pass\n");
        write(dir.path(), "bad.py", "def (\n");

        let mut config = Config::default();
        config.ignore_rules.extend(
            ["EveryFunction", "Tagged", SYNTAX_ERROR_CODE].map(String::from),
        );
        let issues = analyzer(config)
            .analyze(dir.path(), &RunContext::default())
            .unwrap();
        let codes: Vec<_> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, ["FirstLine"]);
    }

    #[test]
    fn test_directory_results_follow_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.py", "x = 1\n");
        write(dir.path(), "a.py", "x = 1\n");

        let issues = Analyzer::builder()
            .line_rule(FirstLine)
            .build()
            .unwrap()
            .analyze(dir.path(), &RunContext::default())
            .unwrap();
        let files: Vec<_> = issues
            .iter()
            .map(|i| Path::new(&i.file).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, ["a.py", "b.py"]);
    }

    #[test]
    fn test_missing_path_is_fatal() {
        let result = analyzer(Config::default())
            .analyze(Path::new("/no/such/dir"), &RunContext::default());
        assert!(matches!(result, Err(AnalyzerError::Source(SourceError::NotFound(_)))));
    }
}
