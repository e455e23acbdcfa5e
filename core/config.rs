use crate::defaults::get_builtin_defaults;
use crate::error::{AppError, Result};
use chrono::format::{Item, StrftimeItems};
use log;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".projsnap";
pub const DEFAULT_CONFIG_FILENAME: &str = "projsnap.toml";
pub const DEFAULT_OUTPUT_FILE: &str = "PROJECT_SNAPSHOT.txt";
pub const DEFAULT_GITIGNORE_FILE: &str = ".gitignore";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// On-disk configuration (`.projsnap/projsnap.toml`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    /// Replaces the built-in extension list when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub skip_content: Vec<String>,
    #[serde(default)]
    pub excluded_dirs: Vec<String>,
    #[serde(default = "default_true")]
    pub use_gitignore: bool,
    #[serde(default = "default_gitignore_file")]
    pub gitignore_file: PathBuf,
    #[serde(default)]
    pub loose_prefix_match: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_file")]
    pub file: PathBuf,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_true() -> bool {
    true
}
fn default_gitignore_file() -> PathBuf {
    PathBuf::from(DEFAULT_GITIGNORE_FILE)
}
fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}
fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            include_extensions: None,
            exclude: Vec::new(),
            skip_content: Vec::new(),
            excluded_dirs: Vec::new(),
            use_gitignore: default_true(),
            gitignore_file: default_gitignore_file(),
            loose_prefix_match: false,
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: default_output_file(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl Config {
    /// A fully spelled-out configuration, used as the starting point for a
    /// project's config file.
    pub fn template() -> Self {
        let mut config = Self::default();
        config.filters.include_extensions = Some(get_builtin_defaults().include_extensions.clone());
        config
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve
            .canonicalize()
            .map_err(|e| AppError::Filesystem {
                path: path_to_resolve.clone(),
                reason: format!("cannot resolve project root: {}", e),
            })
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let mut path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                if path.is_relative() {
                    path = project_root.join(path);
                }
                if !path.exists() && path.extension().is_none() {
                    path.set_extension("toml");
                }
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = project_root
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<Config>(content)
    }

    /// Merges this configuration over the built-in defaults.
    pub fn resolve(&self) -> Result<SnapshotConfig> {
        let defaults = get_builtin_defaults();
        let extensions = self
            .filters
            .include_extensions
            .as_ref()
            .unwrap_or(&defaults.include_extensions);

        let snapshot_config = SnapshotConfig {
            include_extensions: normalize_extensions(extensions),
            explicit_excludes: merged(&defaults.explicit_excludes, &self.filters.exclude),
            skip_content_patterns: merged(
                &defaults.skip_content_patterns,
                &self.filters.skip_content,
            ),
            excluded_dirs: merged(&defaults.excluded_dirs, &self.filters.excluded_dirs),
            vcs_dirs: defaults.vcs_dirs.clone(),
            use_gitignore: self.filters.use_gitignore,
            gitignore_file: self.filters.gitignore_file.clone(),
            loose_prefix_match: self.filters.loose_prefix_match,
            timestamp_format: self.output.timestamp_format.clone(),
        };
        snapshot_config.validate()?;
        Ok(snapshot_config)
    }
}

fn merged(base: &[String], extra: &[String]) -> Vec<String> {
    base.iter()
        .chain(extra.iter())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize_extensions(extensions: &[String]) -> BTreeSet<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Effective, validated settings for one snapshot run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotConfig {
    pub include_extensions: BTreeSet<String>,
    pub explicit_excludes: Vec<String>,
    pub skip_content_patterns: Vec<String>,
    pub excluded_dirs: Vec<String>,
    pub vcs_dirs: Vec<String>,
    pub use_gitignore: bool,
    pub gitignore_file: PathBuf,
    pub loose_prefix_match: bool,
    pub timestamp_format: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        let defaults = get_builtin_defaults();
        Self {
            include_extensions: normalize_extensions(&defaults.include_extensions),
            explicit_excludes: defaults.explicit_excludes.clone(),
            skip_content_patterns: defaults.skip_content_patterns.clone(),
            excluded_dirs: defaults.excluded_dirs.clone(),
            vcs_dirs: defaults.vcs_dirs.clone(),
            use_gitignore: true,
            gitignore_file: default_gitignore_file(),
            loose_prefix_match: false,
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl SnapshotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.include_extensions.is_empty() {
            return Err(AppError::Config(
                "At least one file extension must be included".to_string(),
            ));
        }
        if self.gitignore_file.as_os_str().is_empty() {
            return Err(AppError::Config(
                "gitignore_file must not be empty".to_string(),
            ));
        }
        if self.timestamp_format.trim().is_empty()
            || StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error))
        {
            return Err(AppError::Config(format!(
                "Invalid timestamp format '{}'",
                self.timestamp_format
            )));
        }
        Ok(())
    }

    /// Case-insensitive extension check; `ext` is given without the dot.
    pub fn includes_extension(&self, ext: &str) -> bool {
        self.include_extensions.contains(&ext.to_lowercase())
    }
}
