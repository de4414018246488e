//! Configuration types for codemark.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Check categories enabled by default.
const DEFAULT_CHECKS: &[&str] = &[
    "style",
    "clarity",
    "docstrings",
    "type_hints",
    "bugs",
    "best_practices",
    "ai_review",
];

/// Line-length profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Black-compatible 88 columns.
    #[default]
    Classic,
    /// Relaxed 120 columns.
    Extended,
}

impl Profile {
    /// Maximum line length implied by this profile.
    #[must_use]
    pub fn max_line_length(self) -> usize {
        match self {
            Self::Classic => 88,
            Self::Extended => 120,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Line-length profile (default: `classic`).
    #[serde(default)]
    pub profile: Profile,

    /// Explicit maximum line length, overriding the profile.
    #[serde(default)]
    pub max_line_length: Option<usize>,

    /// Issue codes to suppress.
    #[serde(default)]
    pub ignore_rules: BTreeSet<String>,

    /// Named check categories, mostly consulted by the advisory producer.
    #[serde(default = "default_checks")]
    pub checks: BTreeMap<String, bool>,

    /// Whether `--fix` may insert template module docstrings.
    #[serde(default = "default_true")]
    pub insert_docstrings: bool,

    /// Source discovery settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Plugin settings.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Auto-fix settings.
    #[serde(default)]
    pub fix: FixConfig,

    /// Advisory producer settings.
    #[serde(default)]
    pub advisory: AdvisoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            max_line_length: None,
            ignore_rules: BTreeSet::new(),
            checks: default_checks(),
            insert_docstrings: true,
            source: SourceConfig::default(),
            plugins: PluginsConfig::default(),
            fix: FixConfig::default(),
            advisory: AdvisoryConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// A file named `pyproject.toml` is read from its `[tool.codemark]`
    /// table; any other file is read as a whole.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if path.file_name().is_some_and(|n| n == "pyproject.toml") {
            Self::parse_pyproject(&content)
        } else {
            Self::parse(&content)
        }
    }

    /// Parses configuration from a TOML string.
    ///
    /// User `checks` entries are merged over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.merge_default_checks();
        Ok(config)
    }

    /// Parses the `[tool.codemark]` table of a `pyproject.toml` document.
    ///
    /// A document without that table yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse_pyproject(content: &str) -> Result<Self, ConfigError> {
        let doc: toml::Table = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        let Some(table) = doc
            .get("tool")
            .and_then(|t| t.get("codemark"))
            .cloned()
        else {
            return Ok(Self::default());
        };
        let mut config = table
            .try_into::<Self>()
            .map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            })?;
        config.merge_default_checks();
        Ok(config)
    }

    fn merge_default_checks(&mut self) {
        for (name, enabled) in default_checks() {
            self.checks.entry(name).or_insert(enabled);
        }
    }

    /// Effective maximum line length.
    #[must_use]
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
            .unwrap_or_else(|| self.profile.max_line_length())
    }

    /// Checks if an issue code is suppressed.
    #[must_use]
    pub fn is_ignored(&self, code: &str) -> bool {
        self.ignore_rules.contains(code)
    }

    /// Looks up a check category, case-insensitively. Unknown categories
    /// are enabled.
    #[must_use]
    pub fn is_check_enabled(&self, category: &str) -> bool {
        let key = category.to_lowercase();
        self.checks
            .iter()
            .find(|(name, _)| name.to_lowercase() == key)
            .map_or(true, |(_, enabled)| *enabled)
    }
}

/// Source discovery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Recognized file extensions, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// Plugin configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Built-in plugins to enable by name; none are enabled when absent.
    #[serde(default)]
    pub builtin: Option<Vec<String>>,

    /// Subprocess plugins.
    #[serde(default)]
    pub command: Vec<CommandPluginConfig>,
}

impl PluginsConfig {
    /// Whether the named built-in plugin is enabled.
    #[must_use]
    pub fn is_builtin_enabled(&self, name: &str) -> bool {
        self.builtin
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == name))
    }
}

/// A plugin implemented by an external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPluginConfig {
    /// Plugin name used in reports.
    pub name: String,
    /// Program to execute.
    pub command: PathBuf,
    /// Arguments placed before the file path.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Auto-fix configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixConfig {
    /// Formatter command line; `--line-length <n> <file>` is appended.
    #[serde(default = "default_formatter")]
    pub formatter: Vec<String>,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            formatter: default_formatter(),
        }
    }
}

/// Advisory producer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// Command line of the advisory producer.
    #[serde(default)]
    pub command: Vec<String>,

    /// Model name forwarded to the producer.
    #[serde(default)]
    pub model: Option<String>,
}

fn default_checks() -> BTreeMap<String, bool> {
    DEFAULT_CHECKS
        .iter()
        .map(|name| ((*name).to_string(), true))
        .collect()
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_formatter() -> Vec<String> {
    vec!["black".to_string()]
}

fn default_true() -> bool {
    true
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_line_length(), 88);
        assert!(config.insert_docstrings);
        assert!(config.ignore_rules.is_empty());
        assert!(config.is_check_enabled("ai_review"));
        assert_eq!(config.source.extensions, vec!["py"]);
        assert_eq!(config.fix.formatter, vec!["black"]);
    }

    #[test]
    fn test_empty_document_matches_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
profile = "extended"
ignore_rules = ["LineLength"]
insert_docstrings = false

[checks]
docstrings = false
security = true

[source]
exclude = ["**/migrations/**"]

[[plugins.command]]
name = "todo-finder"
command = "./bin/todo-finder"
args = ["--strict"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.max_line_length(), 120);
        assert!(config.is_ignored("LineLength"));
        assert!(!config.insert_docstrings);
        assert!(!config.is_check_enabled("Docstrings"));
        assert!(config.is_check_enabled("security"));
        // defaults survive a partial [checks] table
        assert!(config.is_check_enabled("bugs"));
        assert_eq!(config.source.exclude, vec!["**/migrations/**"]);
        assert_eq!(config.plugins.command[0].name, "todo-finder");
        assert_eq!(config.plugins.command[0].args, vec!["--strict"]);
    }

    #[test]
    fn test_explicit_length_overrides_profile() {
        let config = Config::parse("profile = \"extended\"\nmax_line_length = 100").unwrap();
        assert_eq!(config.max_line_length(), 100);
    }

    #[test]
    fn test_parse_pyproject() {
        let toml = r#"
[project]
name = "demo"

[tool.codemark]
max_line_length = 79
ignore_rules = ["BareTry"]
"#;
        let config = Config::parse_pyproject(toml).unwrap();
        assert_eq!(config.max_line_length(), 79);
        assert!(config.is_ignored("BareTry"));
        assert!(config.is_check_enabled("style"));
    }

    #[test]
    fn test_pyproject_without_table_is_default() {
        let config = Config::parse_pyproject("[project]\nname = \"demo\"\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_builtin_plugin_selection() {
        let mut plugins = PluginsConfig::default();
        assert!(!plugins.is_builtin_enabled("long-file"));
        plugins.builtin = Some(vec![]);
        assert!(!plugins.is_builtin_enabled("long-file"));
        plugins.builtin = Some(vec!["long-file".to_string()]);
        assert!(plugins.is_builtin_enabled("long-file"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(matches!(
            Config::parse("max_line_length = \"wide\""),
            Err(ConfigError::Parse { .. })
        ));
    }
}
