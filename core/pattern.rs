//! Gitignore-style path matching.
//!
//! Paths are relative to the project root and always use `/` as separator.
//! A pattern falls into one of three shapes:
//!
//! * directory patterns (`node_modules/`) match the directory itself and
//!   everything below it;
//! * wildcard patterns (`*.log`, `build-?/`) are compiled with `globset`,
//!   where wildcards may cross `/`, and match either the whole path or the
//!   path as a directory prefix. As in gitignore, a wildcard pattern without
//!   a `/` may match at any depth (`notes-*.md` matches `docs/notes-1.md`);
//! * exact patterns (`composer.lock`, `docs`) match the path itself or
//!   anything below it.

use crate::error::{AppError, Result};
use globset::{GlobBuilder, GlobMatcher};
use log;

const GLOB_META: &[char] = &['*', '?', '['];

/// Returns whether `path` is matched by `pattern`, with segment-aware prefix
/// matching. Invalid patterns never match.
pub fn matches(path: &str, pattern: &str) -> bool {
    match CompiledPattern::new(pattern, false) {
        Ok(compiled) => compiled.is_match(path),
        Err(e) => {
            log::debug!("Pattern \"{}\" does not compile: {}", pattern, e);
            false
        }
    }
}

#[derive(Debug, Clone)]
enum PatternKind {
    /// Nothing left after trimming separators.
    Empty,
    Directory(String),
    DirectoryGlob(GlobMatcher),
    Wildcard {
        whole: GlobMatcher,
        prefix: GlobMatcher,
    },
    Exact(String),
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    kind: PatternKind,
    loose_prefix: bool,
}

impl CompiledPattern {
    /// Compiles a single pattern. `loose_prefix` makes exact patterns also
    /// match paths that merely start with the pattern text (`src` matching
    /// `src2/file.txt`).
    pub fn new(pattern: &str, loose_prefix: bool) -> Result<Self> {
        let is_dir_pattern = pattern.trim_end().ends_with('/');
        let trimmed = pattern.trim().trim_matches('/');

        let kind = if trimmed.is_empty() {
            PatternKind::Empty
        } else if is_dir_pattern {
            if trimmed.contains(GLOB_META) {
                PatternKind::DirectoryGlob(build_glob(&format!("{}/*", trimmed), pattern)?)
            } else {
                PatternKind::Directory(trimmed.to_string())
            }
        } else if trimmed.contains(GLOB_META) {
            let anchored = if trimmed.contains('/') {
                trimmed.to_string()
            } else {
                format!("**/{}", trimmed)
            };
            PatternKind::Wildcard {
                whole: build_glob(&anchored, pattern)?,
                prefix: build_glob(&format!("{}/*", anchored), pattern)?,
            }
        } else {
            PatternKind::Exact(trimmed.to_string())
        };

        Ok(Self {
            source: pattern.to_string(),
            kind,
            loose_prefix,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, path: &str) -> bool {
        match &self.kind {
            PatternKind::Empty => false,
            PatternKind::Directory(dir) => is_same_or_below(path, dir),
            PatternKind::DirectoryGlob(prefix) => prefix.is_match(path),
            PatternKind::Wildcard { whole, prefix } => {
                whole.is_match(path) || prefix.is_match(path)
            }
            PatternKind::Exact(exact) => {
                is_same_or_below(path, exact) || (self.loose_prefix && path.starts_with(exact))
            }
        }
    }
}

fn is_same_or_below(path: &str, dir: &str) -> bool {
    path.strip_prefix(dir)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn build_glob(glob: &str, original: &str) -> Result<GlobMatcher> {
    // Braces are alternation in globset but literal in gitignore.
    let escaped = glob.replace('{', "[{]").replace('}', "[}]");
    GlobBuilder::new(&escaped)
        .literal_separator(false)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| {
            AppError::Glob(format!(
                "Invalid glob pattern \"{}\" (processed as \"{}\"): {}",
                original, escaped, e
            ))
        })
}

/// An ordered list of compiled patterns; a path matches the set if any
/// member matches it.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    /// Compiles every pattern, failing on the first invalid one.
    pub fn compile<S: AsRef<str>>(patterns: &[S], loose_prefix: bool) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| CompiledPattern::new(p.as_ref(), loose_prefix))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Compiles what it can, logging and dropping invalid patterns.
    pub fn compile_lenient<S: AsRef<str>>(patterns: &[S], loose_prefix: bool, origin: &str) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match CompiledPattern::new(p.as_ref(), loose_prefix) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    log::warn!("Skipping pattern from {}: {}", origin, e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.first_match(path).is_some()
    }

    /// The first pattern matching `path`, for diagnostics.
    pub fn first_match(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.is_match(path))
            .map(CompiledPattern::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(CompiledPattern::as_str)
    }
}
