//! Workspace configuration
//!
//! Everything a [`Workspace`](crate::frontend::workspace::Workspace) needs to know about a corpus
//! and how to process it. The CLI flags map onto these fields.

use std::path::PathBuf;

/// Workspace configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    /// Corpus root holding the repositories
    pub root: PathBuf,
    /// Name of each repository's document directory
    pub source_dir: String,
    /// Document file extension, without the dot
    pub extension: String,
    /// Worker threads for compiling and linking; `None` uses rayon's default
    pub jobs: Option<usize>,
    /// Where compiled units are persisted; `None` keeps them in memory only
    pub cache_dir: Option<PathBuf>,
    /// Minimum confidence for advisory hints
    pub advisory_threshold: f32,
    /// Skip hidden files and directories during discovery
    pub ignore_hidden: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            source_dir: "source".to_string(),
            extension: "tex".to_string(),
            jobs: None,
            cache_dir: None,
            advisory_threshold: 0.5,
            ignore_hidden: true,
        }
    }
}

impl WorkspaceConfig {
    /// Create a config for the corpus at `root` with default settings
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_source_dir(mut self, source_dir: impl Into<String>) -> Self {
        self.source_dir = source_dir.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the worker thread count; `0` means rayon's default
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = (jobs > 0).then_some(jobs);
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the advisory threshold, clamped to `0.0..=1.0`
    pub fn with_advisory_threshold(mut self, threshold: f32) -> Self {
        self.advisory_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_ignore_hidden(mut self, ignore: bool) -> Self {
        self.ignore_hidden = ignore;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.source_dir, "source");
        assert_eq!(config.extension, "tex");
        assert_eq!(config.jobs, None);
        assert_eq!(config.cache_dir, None);
        assert!((config.advisory_threshold - 0.5).abs() < f32::EPSILON);
        assert!(config.ignore_hidden);
    }

    #[test]
    fn test_builder_chain() {
        let config = WorkspaceConfig::new("/mh")
            .with_jobs(4)
            .with_cache_dir("/tmp/cache")
            .with_advisory_threshold(2.0)
            .with_ignore_hidden(false);
        assert_eq!(config.root, PathBuf::from("/mh"));
        assert_eq!(config.jobs, Some(4));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/cache")));
        assert!((config.advisory_threshold - 1.0).abs() < f32::EPSILON);
        assert!(!config.ignore_hidden);
    }

    #[test]
    fn test_zero_jobs_means_default() {
        assert_eq!(WorkspaceConfig::default().with_jobs(0).jobs, None);
    }
}
