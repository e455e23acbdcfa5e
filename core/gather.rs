use crate::config::SnapshotConfig;
use crate::error::{AppError, Result};
use crate::pattern::PatternSet;
use crate::rules::ExclusionRules;
use ignore::{DirEntry, WalkBuilder};
use log;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A file selected for the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
    #[serde(skip)]
    pub absolute_path: PathBuf,
    /// False for files listed in the tree whose content is replaced by a
    /// placeholder.
    pub include_content: bool,
}

/// Directories that are never descended into, at any depth. Bare names are
/// compared with the directory name, names containing `/` with the trailing
/// segments of its relative path.
#[derive(Debug, Clone)]
struct DirectoryFilter {
    names: Vec<String>,
    paths: Vec<String>,
}

impl DirectoryFilter {
    fn from_config(config: &SnapshotConfig) -> Self {
        let (paths, names): (Vec<String>, Vec<String>) = config
            .vcs_dirs
            .iter()
            .chain(config.excluded_dirs.iter())
            .map(|d| d.trim().trim_matches('/').to_string())
            .filter(|d| !d.is_empty())
            .partition(|d| d.contains('/'));
        Self { names, paths }
    }

    /// Checked for every directory before descending, so only the directory
    /// itself needs to be compared.
    fn is_excluded(&self, relative_dir: &str) -> bool {
        let name = relative_dir.rsplit('/').next().unwrap_or(relative_dir);
        self.names.iter().any(|n| n == name)
            || self.paths.iter().any(|p| {
                relative_dir
                    .strip_suffix(p.as_str())
                    .is_some_and(|head| head.is_empty() || head.ends_with('/'))
            })
    }
}

/// Converts `path` to a `/`-separated path relative to `root`.
pub fn relative_path_string(path: &Path, root: &Path) -> Option<String> {
    let relative = pathdiff::diff_paths(path, root)?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn ensure_readable_dir(project_root: &Path) -> Result<()> {
    let metadata = fs::metadata(project_root).map_err(|e| AppError::Filesystem {
        path: project_root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(AppError::Filesystem {
            path: project_root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    fs::read_dir(project_root).map_err(|e| AppError::Filesystem {
        path: project_root.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn is_regular_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => entry.path().is_file(),
        _ => false,
    }
}

/// Walks `project_root` and returns the files that belong in the snapshot,
/// sorted by relative path. Files matched by `skip_content` are kept but
/// flagged so their content is omitted.
pub fn collect_files(
    project_root: &Path,
    config: &SnapshotConfig,
    rules: &ExclusionRules,
    skip_content: &PatternSet,
) -> Result<Vec<FileEntry>> {
    ensure_readable_dir(project_root)?;
    let dir_filter = DirectoryFilter::from_config(config);

    let mut builder = WalkBuilder::new(project_root);
    builder.standard_filters(false);
    builder.hidden(false);
    builder.follow_links(false);

    let walk_root = project_root.to_path_buf();
    builder.filter_entry(move |entry| {
        if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            return true;
        }
        match relative_path_string(entry.path(), &walk_root) {
            Some(rel) if dir_filter.is_excluded(&rel) => {
                log::trace!("Skipping excluded directory: {}", rel);
                false
            }
            _ => true,
        }
    });

    log::info!("Walking project directory: {}", project_root.display());
    let mut entries = Vec::new();
    let mut excluded_count = 0usize;

    for entry_result in builder.build() {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error walking directory: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 || !is_regular_file(&entry) {
            continue;
        }

        let path = entry.path();
        let has_included_ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| config.includes_extension(ext));
        if !has_included_ext {
            continue;
        }

        let Some(relative_path) = relative_path_string(path, project_root) else {
            log::warn!("Could not get relative path for: {}", path.display());
            continue;
        };

        if let Some(rule) = rules.matching_rule(&relative_path) {
            log::trace!("Excluding {} (rule '{}')", relative_path, rule);
            excluded_count += 1;
            continue;
        }

        let include_content = !skip_content.is_match(&relative_path);
        if !include_content {
            log::trace!("Content omitted for {}", relative_path);
        }
        entries.push(FileEntry {
            relative_path,
            absolute_path: path.to_path_buf(),
            include_content,
        });
    }

    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    log::info!(
        "Collected {} files ({} excluded by rules).",
        entries.len(),
        excluded_count
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn collect(root: &Path) -> Vec<FileEntry> {
        let config = SnapshotConfig::default();
        let rules = ExclusionRules::load(root, &config).unwrap();
        let skip_content = PatternSet::compile(&config.skip_content_patterns, false).unwrap();
        collect_files(root, &config, &rules, &skip_content).unwrap()
    }

    fn paths(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.relative_path.as_str()).collect()
    }

    #[test]
    fn filters_by_extension_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "README.MD", "x");
        touch(dir.path(), "src/app.php", "x");
        touch(dir.path(), "src/lib.rs", "x");
        touch(dir.path(), "Makefile", "x");

        assert_eq!(paths(&collect(dir.path())), vec!["README.MD", "src/app.php"]);
    }

    #[test]
    fn skips_vcs_and_always_excluded_directories_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".git/config.json", "x");
        touch(dir.path(), "vendor/x.php", "x");
        touch(dir.path(), "lib/vendor/y.php", "x");
        touch(dir.path(), "var/cache.json", "x");
        touch(dir.path(), "public/builds/app.js", "x");
        touch(dir.path(), "web/public/builds/app.js", "x");
        touch(dir.path(), "public/index.html", "x");
        touch(dir.path(), "vendors.md", "x");

        assert_eq!(
            paths(&collect(dir.path())),
            vec!["public/index.html", "vendors.md"]
        );
    }

    #[test]
    fn includes_dotfiles_but_honours_explicit_excludes() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".github/workflows/ci.yml", "x");
        touch(dir.path(), ".idea/workspace.xml", "x");
        touch(dir.path(), "package-lock.json", "{}");
        touch(dir.path(), "package.json", "{}");

        assert_eq!(
            paths(&collect(dir.path())),
            vec![".github/workflows/ci.yml", "package.json"]
        );
    }

    #[test]
    fn flags_skip_content_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "node_modules/y.js", "x");
        touch(dir.path(), "node_modules/pkg/index.js", "x");
        touch(dir.path(), "assets/app.js", "x");

        let entries = collect(dir.path());
        let flags: Vec<(&str, bool)> = entries
            .iter()
            .map(|e| (e.relative_path.as_str(), e.include_content))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("assets/app.js", true),
                ("node_modules/pkg/index.js", false),
                ("node_modules/y.js", false),
            ]
        );
    }

    #[test]
    fn content_flag_follows_the_supplied_pattern_set() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "docs/guide.md", "x");
        touch(dir.path(), "node_modules/y.js", "x");
        touch(dir.path(), "src/app.php", "x");

        let config = SnapshotConfig::default();
        let skip_content = PatternSet::compile(&["docs/"], false).unwrap();
        let entries =
            collect_files(dir.path(), &config, &ExclusionRules::default(), &skip_content).unwrap();
        let flags: Vec<(&str, bool)> = entries
            .iter()
            .map(|e| (e.relative_path.as_str(), e.include_content))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("docs/guide.md", false),
                ("node_modules/y.js", true),
                ("src/app.php", true),
            ]
        );
    }

    #[test]
    fn vendor_directories_are_pruned_before_skip_content_applies() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "assets/vendor/lib.js", "x");
        touch(dir.path(), "assets/app.js", "x");
        assert_eq!(paths(&collect(dir.path())), vec!["assets/app.js"]);
    }

    #[test]
    fn output_is_sorted_bytewise() {
        let dir = tempfile::tempdir().unwrap();
        for rel in ["b.md", "a/z.md", "B.md", "a.md", "a-b.md"] {
            touch(dir.path(), rel, "x");
        }
        assert_eq!(
            paths(&collect(dir.path())),
            vec!["B.md", "a-b.md", "a.md", "a/z.md", "b.md"]
        );
    }

    #[test]
    fn missing_root_is_a_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let config = SnapshotConfig::default();
        let rules = ExclusionRules::default();
        let err = collect_files(&missing, &config, &rules, &PatternSet::default()).unwrap_err();
        assert!(matches!(err, AppError::Filesystem { .. }));
    }

    #[test]
    fn file_root_is_a_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.md", "x");
        let err = collect_files(
            &dir.path().join("a.md"),
            &SnapshotConfig::default(),
            &ExclusionRules::default(),
            &PatternSet::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Filesystem { .. }));
    }

    #[test]
    fn file_entry_serializes_without_absolute_path() {
        let entry = FileEntry {
            relative_path: "src/a.md".to_string(),
            absolute_path: PathBuf::from("/p/src/a.md"),
            include_content: false,
        };
        let text = toml::to_string(&entry).unwrap();
        assert!(text.contains("relativePath = \"src/a.md\""));
        assert!(text.contains("includeContent = false"));
        assert!(!text.contains("/p/src"));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/p");
        assert_eq!(
            relative_path_string(&root.join("a").join("b.md"), root).as_deref(),
            Some("a/b.md")
        );
        assert_eq!(relative_path_string(root, root), None);
    }
}
