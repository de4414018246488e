//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const CONFIG_NAME: &str = "codemark.toml";

const DEFAULT_CONFIG: &str = r#"# codemark configuration
# See https://github.com/your/codemark for documentation

# Line-length profile: "classic" (88) or "extended" (120)
profile = "classic"

# Explicit maximum line length, overriding the profile
# max_line_length = 100

# Issue codes to suppress
ignore_rules = []

# Let --fix insert a template module docstring
insert_docstrings = true

# Categories consulted by smart-review
[checks]
style = true
clarity = true
docstrings = true
type_hints = true
bugs = true
best_practices = true
ai_review = true

[source]
extensions = ["py"]
exclude = [
    "**/.venv/**",
    "**/migrations/**",
]
respect_gitignore = true

[plugins]
# Built-in plugins to enable (none when omitted)
# builtin = ["long-file"]

# External plugins: run with the file path as last argument, config as
# JSON on stdin, and print a JSON array of issues on stdout.
# [[plugins.command]]
# name = "todo-finder"
# command = "./tools/todo-finder"
# args = ["--strict"]

[fix]
# Formatter run as: <formatter> --line-length <n> <file>
formatter = ["black"]

[advisory]
# Reviewer run with the file path as last argument and the source on stdin.
# Exit status 75 signals rate limiting.
# command = ["codemark-reviewer"]
# model = "gpt-5"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = write_config(Path::new("."), force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure rules");
    println!("  2. Run: codemark review");

    Ok(())
}

/// Writes the default configuration into `dir`.
fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemark_core::Config;
    use tempfile::TempDir;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.max_line_length(), 88);
        assert!(config.insert_docstrings);
        assert_eq!(config.source.exclude.len(), 2);
        assert!(!config.plugins.is_builtin_enabled("long-file"));
        assert!(config.advisory.command.is_empty());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_NAME), "profile = \"extended\"\n").unwrap();

        assert!(write_config(tmp.path(), false).is_err());
        let kept = std::fs::read_to_string(tmp.path().join(CONFIG_NAME)).unwrap();
        assert_eq!(kept, "profile = \"extended\"\n");

        let path = write_config(tmp.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), DEFAULT_CONFIG);
    }
}
