use crate::config::SnapshotConfig;
use crate::error::Result;
use crate::gather::{self, FileEntry};
use crate::pattern::PatternSet;
use crate::report::{self, SnapshotSummary};
use crate::rules::ExclusionRules;
use chrono::Local;
use log;
use std::path::{Path, PathBuf};

/// Produces snapshot reports for one project root. Configuration and
/// exclusion rules are fixed at construction.
#[derive(Debug, Clone)]
pub struct SnapshotGenerator {
    project_root: PathBuf,
    config: SnapshotConfig,
    rules: ExclusionRules,
    skip_content: PatternSet,
}

/// Collected files plus the counts reported for them.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub entries: Vec<FileEntry>,
    pub summary: SnapshotSummary,
}

impl SnapshotGenerator {
    pub fn new(project_root: &Path, config: SnapshotConfig) -> Result<Self> {
        config.validate()?;
        let skip_content =
            PatternSet::compile(&config.skip_content_patterns, config.loose_prefix_match)?;
        let rules = ExclusionRules::load(project_root, &config)?;
        log::debug!(
            "Snapshot generator ready for {} ({} extensions, {} exclusion rules)",
            project_root.display(),
            config.include_extensions.len(),
            rules.patterns().len()
        );
        Ok(Self {
            project_root: project_root.to_path_buf(),
            config,
            rules,
            skip_content,
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    pub fn skip_content(&self) -> &PatternSet {
        &self.skip_content
    }

    pub fn collect(&self) -> Result<Snapshot> {
        let entries = gather::collect_files(
            &self.project_root,
            &self.config,
            &self.rules,
            &self.skip_content,
        )?;
        let summary = SnapshotSummary::from_entries(&entries);
        Ok(Snapshot { entries, summary })
    }

    /// Generates the report stamped with the current local time.
    pub fn generate(&self) -> Result<String> {
        let timestamp = Local::now()
            .format(&self.config.timestamp_format)
            .to_string();
        self.generate_at(&timestamp)
    }

    pub fn generate_at(&self, timestamp: &str) -> Result<String> {
        let snapshot = self.collect()?;
        log::info!(
            "Rendering snapshot: {} files, {} with content",
            snapshot.summary.total_files,
            snapshot.summary.files_with_content
        );
        Ok(report::render_report(&snapshot.entries, timestamp))
    }
}

/// Convenience wrapper: generate a snapshot of `project_root` with the
/// built-in configuration.
pub fn generate(project_root: &Path) -> Result<String> {
    SnapshotGenerator::new(project_root, SnapshotConfig::default())?.generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::fs;

    #[test]
    fn construction_rejects_invalid_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let config = SnapshotConfig {
            skip_content_patterns: vec!["[oops".to_string()],
            ..SnapshotConfig::default()
        };
        let err = SnapshotGenerator::new(dir.path(), config).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn skip_content_patterns_are_compiled_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("fixtures")).unwrap();
        fs::write(dir.path().join("fixtures").join("big.json"), "{}").unwrap();
        let mut config = SnapshotConfig::default();
        config.skip_content_patterns.push("fixtures/".to_string());
        let generator = SnapshotGenerator::new(dir.path(), config).unwrap();

        let compiled: Vec<&str> = generator.skip_content().iter().collect();
        assert_eq!(compiled, vec!["assets/vendor/", "node_modules/", "fixtures/"]);
        let entries = generator.collect().unwrap().entries;
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].include_content);
    }

    #[test]
    fn generate_stamps_with_configured_format() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "hello").unwrap();
        let config = SnapshotConfig {
            timestamp_format: "%Y".to_string(),
            ..SnapshotConfig::default()
        };
        let text = SnapshotGenerator::new(dir.path(), config)
            .unwrap()
            .generate()
            .unwrap();
        let year = Local::now().format("%Y").to_string();
        assert!(text.contains(&format!("Generated: {}\n", year)));
    }

    #[test]
    fn missing_root_fails_at_generation() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = generate(&missing).unwrap_err();
        assert!(matches!(err, AppError::Filesystem { .. }));
    }
}
