//! Advisory producer adapter.
//!
//! An advisory producer is an external reviewer that returns either
//! structured issue candidates or free-form text. This module turns those
//! responses, and the producer's failures, into canonical issues.

use crate::candidate::IssueCandidate;
use crate::config::Config;
use crate::context::RunContext;
use crate::normalize::normalize;
use crate::source::{SourceError, SourceLoader};
use crate::types::{Issue, Level};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Code of a free-form advisory response.
pub const AI_REVIEW_CODE: &str = "AIReview";

/// Code of the issue reported when nothing can be reviewed.
pub const INVALID_PATH_CODE: &str = "InvalidPath";

/// Check category gating the advisory producer.
const AI_REVIEW_CHECK: &str = "ai_review";

/// Exit status a producer uses to signal rate limiting (`EX_TEMPFAIL`).
pub const RATE_LIMIT_EXIT_CODE: i32 = 75;

/// Environment variable carrying the model name to the producer.
pub const MODEL_ENV: &str = "CODEMARK_MODEL";

/// Codes that keep warning level when the producer omits one.
const WARNING_CODES: &[&str] = &["LineLength", "MissingDocstring"];

/// What an advisory producer returned for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryResponse {
    /// Already structured candidates.
    Candidates(Vec<IssueCandidate>),
    /// Raw text.
    Text(String),
}

/// Advisory producer failures, one issue code per category.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    /// The producer refused the request for now.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The producer could not be reached or failed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The producer answered with something unusable.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl AdvisoryError {
    /// Issue code for this fault category.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimited(_) => "AIRateLimitError",
            Self::Transport(_) => "AITransportError",
            Self::Malformed(_) => "AIMalformedResponse",
        }
    }
}

/// An external reviewer.
pub trait AdvisoryProducer {
    /// Reviews one file.
    ///
    /// # Errors
    ///
    /// Returns an [`AdvisoryError`] describing why no review is available.
    fn review(
        &self,
        path: &Path,
        source: &str,
        config: &Config,
    ) -> Result<AdvisoryResponse, AdvisoryError>;
}

/// Reviews every source file under `path` with `producer`.
///
/// Returns nothing when the `ai_review` check is disabled, and a single
/// `InvalidPath` warning when no source file is found. A blank text
/// response yields no issue for that file.
///
/// # Errors
///
/// Returns an error only if `path` cannot be discovered.
pub fn review_sources(
    producer: &dyn AdvisoryProducer,
    loader: &SourceLoader,
    path: &Path,
    config: &Config,
    ctx: &RunContext,
) -> Result<Vec<Issue>, SourceError> {
    let _guard = ctx.span().enter();

    if !config.is_check_enabled(AI_REVIEW_CHECK) {
        info!("Advisory review disabled by configuration");
        return Ok(Vec::new());
    }

    let files = loader.discover(path)?;
    if files.is_empty() {
        let message = format!("No Python files found at path: {}", path.display());
        warn!("{}", message);
        return Ok(vec![Issue::new(
            path.display().to_string(),
            0,
            INVALID_PATH_CODE,
            message,
            Level::Warning,
        )]);
    }

    let mut issues = Vec::new();
    for file in &files {
        info!("Running advisory review on {}", file.display());
        issues.extend(review_file(producer, file, config));
    }

    if !issues.is_empty() {
        warn!("Found {} issue(s) from advisory review", issues.len());
    }
    Ok(issues)
}

fn review_file(producer: &dyn AdvisoryProducer, path: &Path, config: &Config) -> Vec<Issue> {
    let file_name = path.display().to_string();

    let response = std::fs::read_to_string(path)
        .map_err(|e| AdvisoryError::Transport(e.to_string()))
        .and_then(|source| producer.review(path, &source, config));

    let candidates = match response {
        Ok(AdvisoryResponse::Candidates(candidates)) => candidates,
        Ok(AdvisoryResponse::Text(text)) => match parse_text(&text) {
            Some(candidates) => candidates,
            None if text.trim().is_empty() => {
                debug!("Advisory response for {} is empty", file_name);
                return Vec::new();
            }
            None => {
                warn!("Advisory response for {} is not structured", file_name);
                let message = text.trim().to_string();
                return vec![Issue::new(file_name, 0, AI_REVIEW_CODE, message, Level::Error)];
            }
        },
        Err(e) => {
            warn!("Advisory review failed for {}: {}", file_name, e);
            return vec![Issue::new(file_name, 0, e.code(), e.to_string(), Level::Error)];
        }
    };

    let candidates = candidates.into_iter().map(|c| attribute(c, &file_name));
    normalize(candidates)
        .into_iter()
        .filter(|issue| config.is_check_enabled(&issue.code))
        .collect()
}

/// Reads a text response as a JSON array of candidates.
fn parse_text(text: &str) -> Option<Vec<IssueCandidate>> {
    match serde_json::from_str::<serde_json::Value>(text.trim()) {
        Ok(serde_json::Value::Array(items)) => {
            Some(items.into_iter().map(IssueCandidate::from_value).collect())
        }
        _ => None,
    }
}

/// Pins a structured candidate to the reviewed file and fills its level.
fn attribute(candidate: IssueCandidate, file_name: &str) -> IssueCandidate {
    match candidate {
        IssueCandidate::Structured(mut s) => {
            s.file = Some(file_name.to_string());
            if s.level.is_none() {
                let warning = s
                    .code
                    .as_deref()
                    .is_some_and(|code| WARNING_CODES.contains(&code));
                s.level = Some(if warning { Level::Warning } else { Level::Error });
            }
            IssueCandidate::Structured(s)
        }
        other => other,
    }
}

/// An advisory producer backed by an external command.
///
/// The file's source is written to the command's stdin and its stdout is
/// taken as the review text. The file path is passed as the last argument
/// and the configured model, if any, through `CODEMARK_MODEL`.
#[derive(Debug, Clone)]
pub struct CommandAdvisor {
    command: Vec<String>,
    model: Option<String>,
}

impl CommandAdvisor {
    /// Creates an adapter from the advisory configuration.
    ///
    /// Returns `None` when no command is configured.
    #[must_use]
    pub fn from_config(config: &Config) -> Option<Self> {
        if config.advisory.command.is_empty() {
            return None;
        }
        Some(Self {
            command: config.advisory.command.clone(),
            model: config.advisory.model.clone(),
        })
    }
}

impl AdvisoryProducer for CommandAdvisor {
    fn review(
        &self,
        path: &Path,
        source: &str,
        _config: &Config,
    ) -> Result<AdvisoryResponse, AdvisoryError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(AdvisoryError::Transport("no advisory command".to_string()));
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(model) = &self.model {
            command.env(MODEL_ENV, model);
        }

        let mut child = command
            .spawn()
            .map_err(|e| AdvisoryError::Transport(format!("failed to start {program}: {e}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(source.as_bytes()) {
                warn!("Advisory command did not read the source: {}", e);
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        match output.status.code() {
            Some(0) => {}
            Some(RATE_LIMIT_EXIT_CODE) => return Err(AdvisoryError::RateLimited(stderr)),
            _ => {
                return Err(AdvisoryError::Transport(format!(
                    "{program} exited with {}: {stderr}",
                    output.status
                )))
            }
        }

        String::from_utf8(output.stdout)
            .map(AdvisoryResponse::Text)
            .map_err(|e| AdvisoryError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::StructuredCandidate;
    use crate::config::SourceConfig;
    use std::fs;

    struct Canned(fn() -> Result<AdvisoryResponse, AdvisoryError>);

    impl AdvisoryProducer for Canned {
        fn review(
            &self,
            _path: &Path,
            _source: &str,
            _config: &Config,
        ) -> Result<AdvisoryResponse, AdvisoryError> {
            (self.0)()
        }
    }

    fn review(producer: &Canned, config: &Config) -> Vec<Issue> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("m.py"), "x = 1\n").unwrap();
        let loader = SourceLoader::new(&SourceConfig::default()).unwrap();
        review_sources(producer, &loader, dir.path(), config, &RunContext::new("smart-review"))
            .unwrap()
    }

    #[test]
    fn test_plain_text_becomes_ai_review() {
        let producer = Canned(|| Ok(AdvisoryResponse::Text("Looks good overall.".to_string())));
        let issues = review(&producer, &Config::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, AI_REVIEW_CODE);
        assert_eq!(issues[0].message, "Looks good overall.");
        assert_eq!(issues[0].level, Level::Error);
        assert_eq!(issues[0].line, 0);
        assert!(issues[0].file.ends_with("m.py"));
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        let producer = Canned(|| Ok(AdvisoryResponse::Text("   \n".to_string())));
        assert!(review(&producer, &Config::default()).is_empty());
    }

    #[test]
    fn test_text_message_is_trimmed() {
        let producer = Canned(|| Ok(AdvisoryResponse::Text("\n  Split main().\n".to_string())));
        let issues = review(&producer, &Config::default());
        assert_eq!(issues[0].message, "Split main().");
    }

    #[test]
    fn test_json_text_is_structured() {
        let producer = Canned(|| {
            Ok(AdvisoryResponse::Text(
                r#"[{"file": "elsewhere.py", "line": 1, "code": "MissingDocstring", "message": "m"},
                    {"line": 3, "code": "Bugs", "message": "off by one"}]"#
                    .to_string(),
            ))
        });
        let issues = review(&producer, &Config::default());
        assert_eq!(issues.len(), 2);
        assert!(issues[0].file.ends_with("m.py"));
        assert_eq!(issues[0].level, Level::Warning);
        assert_eq!(issues[1].level, Level::Error);
    }

    #[test]
    fn test_disabled_categories_are_dropped() {
        let producer = Canned(|| {
            Ok(AdvisoryResponse::Candidates(vec![
                StructuredCandidate::new("Style", "spacing").line(2).into(),
                StructuredCandidate::new("Bugs", "off by one").line(3).into(),
            ]))
        });
        let mut config = Config::default();
        config.checks.insert("style".to_string(), false);
        let issues = review(&producer, &config);
        let codes: Vec<_> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, ["Bugs"]);
    }

    #[test]
    fn test_faults_map_to_codes() {
        let producer = Canned(|| Err(AdvisoryError::RateLimited("slow down".to_string())));
        let issues = review(&producer, &Config::default());
        assert_eq!(issues[0].code, "AIRateLimitError");
        assert_eq!(issues[0].level, Level::Error);

        let producer = Canned(|| Err(AdvisoryError::Transport("offline".to_string())));
        assert_eq!(review(&producer, &Config::default())[0].code, "AITransportError");

        let producer = Canned(|| Err(AdvisoryError::Malformed("bad".to_string())));
        assert_eq!(review(&producer, &Config::default())[0].code, "AIMalformedResponse");
    }

    #[test]
    fn test_disabled_review_returns_nothing() {
        let producer = Canned(|| panic!("producer must not be called"));
        let mut config = Config::default();
        config.checks.insert("ai_review".to_string(), false);
        assert!(review(&producer, &config).is_empty());
    }

    #[test]
    fn test_no_sources_is_invalid_path() {
        let dir = tempfile::tempdir().unwrap();
        let producer = Canned(|| panic!("producer must not be called"));
        let loader = SourceLoader::new(&SourceConfig::default()).unwrap();
        let issues =
            review_sources(&producer, &loader, dir.path(), &Config::default(), &RunContext::default())
                .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, INVALID_PATH_CODE);
        assert_eq!(issues[0].level, Level::Warning);
    }

    #[test]
    fn test_command_advisor_requires_command() {
        assert!(CommandAdvisor::from_config(&Config::default()).is_none());
        let mut config = Config::default();
        config.advisory.command = vec!["reviewer".to_string()];
        assert!(CommandAdvisor::from_config(&config).is_some());
    }

    #[test]
    fn test_command_advisor_spawn_failure_is_transport() {
        let mut config = Config::default();
        config.advisory.command = vec!["codemark-test-no-such-reviewer".to_string()];
        let advisor = CommandAdvisor::from_config(&config).unwrap();
        let result = advisor.review(Path::new("m.py"), "x = 1\n", &config);
        assert!(matches!(result, Err(AdvisoryError::Transport(_))));
    }
}
