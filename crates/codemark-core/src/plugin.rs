//! Plugin registry.
//!
//! A plugin is anything that, given a file path and the configuration,
//! produces issue candidates. Plugins are registered explicitly at startup
//! (statically linked implementations or subprocess adapters) and invoked
//! behind a fault barrier: an `Err`, a panic or malformed output becomes a
//! single `PluginError` issue instead of aborting the run.

use crate::candidate::IssueCandidate;
use crate::config::{CommandPluginConfig, Config};
use crate::types::{Issue, Level};
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Code of issues produced when a plugin fails.
pub const PLUGIN_ERROR_CODE: &str = "PluginError";

/// Failure reported by a plugin.
#[derive(Debug, thiserror::Error)]
pub enum PluginFault {
    /// The plugin could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The plugin exited unsuccessfully.
    #[error("exited with {status}: {stderr}")]
    Exit {
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The plugin returned something that is not a list of candidates.
    #[error("malformed output: {0}")]
    MalformedOutput(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// A rule implementation supplied outside the built-in rule set.
pub trait Plugin: Send + Sync {
    /// Unique plugin name (e.g., "long-file").
    fn name(&self) -> &str;

    /// Brief description of what the plugin checks.
    fn description(&self) -> &str {
        ""
    }

    /// Produces issue candidates for one file.
    ///
    /// An empty vector means the file is clean.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginFault`] when the plugin cannot produce a result.
    fn run(&self, path: &Path, config: &Config) -> Result<Vec<IssueCandidate>, PluginFault>;
}

/// Type alias for boxed Plugin trait objects.
pub type PluginBox = Box<dyn Plugin>;

/// Opaque reference to a registered plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginHandle {
    index: usize,
    name: String,
}

impl PluginHandle {
    /// Name of the referenced plugin.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Registry of plugins, in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginBox>,
    handles: OnceLock<Vec<PluginHandle>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry for a run.
    ///
    /// Statically linked `builtin` plugins are kept when enabled by
    /// `plugins.builtin`; every `[[plugins.command]]` entry is appended as
    /// a subprocess plugin.
    #[must_use]
    pub fn from_config(config: &Config, builtin: Vec<PluginBox>) -> Self {
        let mut registry = Self::new();
        for plugin in builtin {
            if config.plugins.is_builtin_enabled(plugin.name()) {
                registry = registry.register_box(plugin);
            } else {
                debug!("Built-in plugin disabled: {}", plugin.name());
            }
        }
        for command in &config.plugins.command {
            registry = registry.register(CommandPlugin::new(command.clone()));
        }
        registry
    }

    /// Registers a plugin.
    #[must_use]
    pub fn register<P: Plugin + 'static>(self, plugin: P) -> Self {
        self.register_box(Box::new(plugin))
    }

    /// Registers a boxed plugin.
    #[must_use]
    pub fn register_box(mut self, plugin: PluginBox) -> Self {
        self.plugins.push(plugin);
        self.handles = OnceLock::new();
        self
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Returns handles to every plugin, in registration order.
    ///
    /// The list is computed on first use and reused afterwards.
    pub fn discover(&self) -> &[PluginHandle] {
        self.handles.get_or_init(|| {
            self.plugins
                .iter()
                .enumerate()
                .map(|(index, p)| PluginHandle {
                    index,
                    name: p.name().to_string(),
                })
                .collect()
        })
    }

    /// Describes every plugin as `(name, description)`.
    #[must_use]
    pub fn describe(&self) -> Vec<(&str, &str)> {
        self.plugins
            .iter()
            .map(|p| (p.name(), p.description()))
            .collect()
    }

    /// Invokes one plugin on one file behind the fault barrier.
    ///
    /// Structured candidates without a file are attributed to `path`.
    /// Any failure yields exactly one `PluginError` candidate.
    #[must_use]
    pub fn invoke(&self, handle: &PluginHandle, path: &Path, config: &Config) -> Vec<IssueCandidate> {
        let Some(plugin) = self.plugins.get(handle.index) else {
            return vec![plugin_error(handle.name(), path, "plugin is not registered")];
        };

        match isolate(|| plugin.run(path, config)) {
            Ok(Ok(candidates)) => candidates
                .into_iter()
                .map(|c| attribute_to(c, path))
                .collect(),
            Ok(Err(fault)) => {
                warn!("Plugin {} failed on {}: {}", handle.name(), path.display(), fault);
                vec![plugin_error(handle.name(), path, &fault.to_string())]
            }
            Err(panic_message) => {
                warn!(
                    "Plugin {} panicked on {}: {}",
                    handle.name(),
                    path.display(),
                    panic_message
                );
                vec![plugin_error(handle.name(), path, &panic_message)]
            }
        }
    }
}

/// Runs `f`, converting a panic into its message.
pub(crate) fn isolate<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string())
    })
}

fn attribute_to(candidate: IssueCandidate, path: &Path) -> IssueCandidate {
    match candidate {
        IssueCandidate::Structured(mut s) if s.file.is_none() => {
            s.file = Some(path.display().to_string());
            IssueCandidate::Structured(s)
        }
        other => other,
    }
}

fn plugin_error(name: &str, path: &Path, failure: &str) -> IssueCandidate {
    Issue::new(
        path.display().to_string(),
        0,
        PLUGIN_ERROR_CODE,
        format!("Plugin '{name}' failed: {failure}"),
        Level::Error,
    )
    .into()
}

/// A plugin implemented by an external command.
///
/// The command runs with its configured arguments followed by the file
/// path. The configuration is written to its stdin as JSON and its stdout
/// must be a JSON array of candidates.
#[derive(Debug, Clone)]
pub struct CommandPlugin {
    config: CommandPluginConfig,
}

impl CommandPlugin {
    /// Creates a subprocess plugin.
    #[must_use]
    pub fn new(config: CommandPluginConfig) -> Self {
        Self { config }
    }
}

impl Plugin for CommandPlugin {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "external command"
    }

    fn run(&self, path: &Path, config: &Config) -> Result<Vec<IssueCandidate>, PluginFault> {
        let spawn_error = |source| PluginFault::Spawn {
            program: self.config.command.clone(),
            source,
        };

        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let payload =
            serde_json::to_vec(config).map_err(|e| PluginFault::Other(e.to_string()))?;
        if let Some(mut stdin) = child.stdin.take() {
            // A plugin that never reads its stdin closes the pipe early.
            if let Err(e) = stdin.write_all(&payload) {
                debug!("Plugin {} did not read its config: {}", self.name(), e);
            }
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(PluginFault::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_candidates(&output.stdout)
    }
}

/// Parses a JSON array of candidates.
fn parse_candidates(stdout: &[u8]) -> Result<Vec<IssueCandidate>, PluginFault> {
    let value: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| PluginFault::MalformedOutput(e.to_string()))?;
    match value {
        serde_json::Value::Array(items) => {
            Ok(items.into_iter().map(IssueCandidate::from_value).collect())
        }
        other => Err(PluginFault::MalformedOutput(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::StructuredCandidate;

    struct Fixed(&'static str);

    impl Plugin for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn run(&self, _path: &Path, _config: &Config) -> Result<Vec<IssueCandidate>, PluginFault> {
            Ok(vec![StructuredCandidate::new("Fixed", self.0).line(2).into()])
        }
    }

    struct Failing;

    impl Plugin for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn run(&self, _path: &Path, _config: &Config) -> Result<Vec<IssueCandidate>, PluginFault> {
            Err(PluginFault::Other("database unavailable".to_string()))
        }
    }

    struct Panicking;

    impl Plugin for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn run(&self, _path: &Path, _config: &Config) -> Result<Vec<IssueCandidate>, PluginFault> {
            panic!("index out of range");
        }
    }

    fn run_all(registry: &PluginRegistry) -> Vec<Issue> {
        let config = Config::default();
        let handles = registry.discover().to_vec();
        crate::normalize(
            handles
                .iter()
                .flat_map(|h| registry.invoke(h, Path::new("m.py"), &config)),
        )
    }

    #[test]
    fn test_discover_preserves_registration_order() {
        let registry = PluginRegistry::new().register(Fixed("b")).register(Fixed("a"));
        let names: Vec<_> = registry.discover().iter().map(PluginHandle::name).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(std::ptr::eq(registry.discover(), registry.discover()));
    }

    #[test]
    fn test_missing_file_is_attributed() {
        let issues = run_all(&PluginRegistry::new().register(Fixed("x")));
        assert_eq!(issues[0].key(), ("m.py", 2, "Fixed"));
    }

    #[test]
    fn test_fault_becomes_plugin_error() {
        let issues = run_all(&PluginRegistry::new().register(Failing));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key(), ("m.py", 0, PLUGIN_ERROR_CODE));
        assert_eq!(issues[0].level, Level::Error);
        assert!(issues[0].message.contains("'failing'"));
        assert!(issues[0].message.contains("database unavailable"));
    }

    #[test]
    fn test_panic_is_isolated_from_siblings() {
        let registry = PluginRegistry::new()
            .register(Fixed("before"))
            .register(Panicking)
            .register(Fixed("after"));
        let issues = run_all(&registry);
        let codes: Vec<_> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, ["Fixed", PLUGIN_ERROR_CODE, "Fixed"]);
        assert!(issues[1].message.contains("'panicking'"));
        assert!(issues[1].message.contains("index out of range"));
        assert_eq!(issues[2].message, "after");
    }

    #[test]
    fn test_from_config_filters_builtins() {
        let mut config = Config::default();
        config.plugins.builtin = Some(vec!["b".to_string()]);
        config.plugins.command.push(CommandPluginConfig {
            name: "ext".to_string(),
            command: PathBuf::from("ext-lint"),
            args: vec![],
        });
        let registry =
            PluginRegistry::from_config(&config, vec![Box::new(Fixed("a")), Box::new(Fixed("b"))]);
        let names: Vec<_> = registry.describe().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "ext"]);
    }

    #[test]
    fn test_parse_candidates() {
        let stdout = r#"[{"code": "X", "message": "m"}, ["a.py:1 – Y", "n"], 7]"#;
        let candidates = parse_candidates(stdout.as_bytes()).unwrap();
        assert_eq!(candidates.len(), 3);
        assert!(matches!(candidates[1], IssueCandidate::LegacyPair(_)));
        assert!(matches!(candidates[2], IssueCandidate::Opaque(_)));
    }

    #[test]
    fn test_parse_candidates_rejects_non_arrays() {
        assert!(matches!(
            parse_candidates(br#"{"code": "X"}"#),
            Err(PluginFault::MalformedOutput(m)) if m.contains("an object")
        ));
        assert!(matches!(
            parse_candidates(b"not json"),
            Err(PluginFault::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_missing_command_is_plugin_error() {
        let registry = PluginRegistry::new().register(CommandPlugin::new(CommandPluginConfig {
            name: "ghost".to_string(),
            command: PathBuf::from("codemark-test-no-such-program"),
            args: vec![],
        }));
        let issues = run_all(&registry);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, PLUGIN_ERROR_CODE);
        assert!(issues[0].message.contains("'ghost'"));
    }
}
