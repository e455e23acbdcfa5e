use once_cell::sync::Lazy;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct BuiltinDefaults {
    #[serde(default)]
    pub include_extensions: Vec<String>,
    #[serde(default)]
    pub explicit_excludes: Vec<String>,
    #[serde(default)]
    pub skip_content_patterns: Vec<String>,
    #[serde(default)]
    pub excluded_dirs: Vec<String>,
    #[serde(default)]
    pub vcs_dirs: Vec<String>,
}

static BUILTIN_DEFAULTS: Lazy<BuiltinDefaults> = Lazy::new(|| {
    let yaml_content = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../data/snapshot_defaults.yaml"
    ));
    serde_yml::from_str(yaml_content).expect("Failed to parse embedded data/snapshot_defaults.yaml")
});

pub fn get_builtin_defaults() -> &'static BuiltinDefaults {
    &BUILTIN_DEFAULTS
}
