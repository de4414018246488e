//! Source discovery.
//!
//! Resolves an input path to the ordered list of files to analyze.
//! Directory entries are visited depth-first with siblings sorted by file
//! name, so the order is the same on every filesystem.

use crate::config::SourceConfig;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors that can occur during source discovery.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The input path does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Directory traversal failed.
    #[error("Failed to walk {path}: {message}")]
    Walk {
        /// Path being walked.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },

    /// An exclude pattern is not a valid glob.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Resolves paths to analyzable source files.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    extensions: Vec<String>,
    exclude: Vec<glob::Pattern>,
    respect_gitignore: bool,
}

impl SourceLoader {
    /// Creates a loader from source configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is not a valid glob.
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            exclude,
            respect_gitignore: config.respect_gitignore,
        })
    }

    /// Whether a path carries a recognized extension.
    #[must_use]
    pub fn is_recognized(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Discovers files under `path`.
    ///
    /// A single file is returned as-is when its extension is recognized,
    /// otherwise the result is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be walked.
    pub fn discover(&self, path: &Path) -> Result<Vec<PathBuf>, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }

        if path.is_file() {
            return Ok(if self.is_recognized(path) {
                vec![path.to_path_buf()]
            } else {
                debug!("Skipping unrecognized file: {}", path.display());
                Vec::new()
            });
        }

        let walker = WalkBuilder::new(path)
            .standard_filters(true)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| SourceError::Walk {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let entry_path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) || !self.is_recognized(entry_path) {
                continue;
            }
            if self.should_exclude(entry_path) {
                debug!("Excluding: {}", entry_path.display());
                continue;
            }
            files.push(entry_path.to_path_buf());
        }

        Ok(files)
    }

    fn should_exclude(&self, path: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(path))
    }
}
