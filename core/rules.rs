use crate::config::SnapshotConfig;
use crate::error::{AppError, Result};
use crate::pattern::PatternSet;
use log;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Patterns that remove a path from the snapshot entirely: the explicit
/// exclude list followed by the lines of the project's gitignore file.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    explicit: PatternSet,
    ignore_file: PatternSet,
}

impl ExclusionRules {
    pub fn load(project_root: &Path, config: &SnapshotConfig) -> Result<Self> {
        let explicit = PatternSet::compile(&config.explicit_excludes, config.loose_prefix_match)?;

        let ignore_lines = if config.use_gitignore {
            read_ignore_file(&project_root.join(&config.gitignore_file))
        } else {
            log::debug!("Gitignore rules disabled by configuration.");
            Vec::new()
        };
        let ignore_file = PatternSet::compile_lenient(
            &ignore_lines,
            config.loose_prefix_match,
            &config.gitignore_file.display().to_string(),
        );
        log::debug!(
            "Loaded {} explicit and {} gitignore exclusion rules.",
            explicit.len(),
            ignore_file.len()
        );

        Ok(Self {
            explicit,
            ignore_file,
        })
    }

    /// Returns the rule that excludes `relative_path`, if any.
    pub fn matching_rule(&self, relative_path: &str) -> Option<&str> {
        self.explicit
            .first_match(relative_path)
            .or_else(|| self.ignore_file.first_match(relative_path))
    }

    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.matching_rule(relative_path).is_some()
    }

    /// All rules, explicit ones first.
    pub fn patterns(&self) -> Vec<&str> {
        self.explicit.iter().chain(self.ignore_file.iter()).collect()
    }
}

/// Reads a gitignore-style file; a missing or unreadable file yields no rules.
fn read_ignore_file(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => parse_ignore_lines(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No ignore file at {}", path.display());
            Vec::new()
        }
        Err(e) => {
            let err = AppError::FileRead {
                path: path.to_path_buf(),
                source: e,
            };
            log::warn!("Ignoring unreadable ignore file: {}", err);
            Vec::new()
        }
    }
}

pub fn parse_ignore_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| {
            if line.starts_with('!') {
                log::warn!("Negated ignore pattern '{}' is not supported, skipping.", line);
                false
            } else {
                true
            }
        })
        .map(String::from)
        .collect()
}
