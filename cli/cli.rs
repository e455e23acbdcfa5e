mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log;
use std::path::{Path, PathBuf};
use std::process;

use cli_args::{Cli, Commands, FilterOverrides, GenerateArgs, ProjectConfigOpts};
use projsnap_core::gather::relative_path_string;
use projsnap_core::{AppError, Config};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(core_err) if core_err.is_configuration_error() => 1,
        Some(AppError::Filesystem { .. })
        | Some(AppError::Io(_))
        | Some(AppError::FileRead { .. })
        | Some(AppError::FileWrite { .. }) => 2,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            log::debug!("No command given, running 'generate' with defaults...");
            commands::generate::handle_generate_command(GenerateArgs::default(), quiet)?;
        }
        Some(Commands::Generate(args)) => {
            log::debug!("Executing 'generate' command...");
            commands::generate::handle_generate_command(args, quiet)?;
        }
        Some(Commands::List(args)) => {
            log::debug!("Executing 'list' command...");
            commands::list::handle_list_command(args)?;
        }
        Some(Commands::Config(args)) => {
            log::debug!("Executing 'config' command...");
            commands::config::handle_config_command(&args, quiet)?;
        }
        Some(Commands::Completion(args)) => {
            log::debug!("Executing 'completion' command...");
            commands::completion::handle_completion_command(&args)?;
        }
    }
    Ok(())
}

fn apply_filter_overrides(mut config: Config, filters: &FilterOverrides) -> Config {
    log::trace!("Applying CLI filter overrides to config...");

    if !filters.extensions.is_empty() {
        config.filters.include_extensions = Some(filters.extensions.clone());
    }
    config.filters.exclude.extend(filters.exclude.iter().cloned());
    config
        .filters
        .skip_content
        .extend(filters.skip_content.iter().cloned());
    if filters.disable_gitignore {
        config.filters.use_gitignore = false;
    }
    if filters.loose_prefix_match {
        config.filters.loose_prefix_match = true;
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

/// Loads the project's config file (if any) and applies CLI overrides.
pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
    filters: &FilterOverrides,
) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.config_file.as_ref(),
        project_opts.disable_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    Ok(apply_filter_overrides(config, filters))
}

/// CLI output beats the configured file; relative paths land in the project root.
pub fn resolve_output_path(project_root: &Path, cli_output: Option<&Path>, config: &Config) -> PathBuf {
    let path = cli_output.unwrap_or(&config.output.file);
    if path.is_relative() {
        project_root.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Keeps a previous snapshot from showing up inside the next one.
pub fn exclude_output_file(config: &mut Config, project_root: &Path, output_path: &Path) {
    if !output_path.starts_with(project_root) {
        return;
    }
    match relative_path_string(output_path, project_root) {
        Some(rel) if !rel.contains(['*', '?', '[']) => {
            log::debug!("Excluding output file from snapshot: {}", rel);
            config.filters.exclude.push(rel);
        }
        _ => log::debug!(
            "Output file {} cannot be expressed as an exclusion rule",
            output_path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn overrides_replace_extensions_and_append_patterns() {
        let filters = FilterOverrides {
            extensions: vec!["rs".into()],
            exclude: vec!["target/".into()],
            skip_content: vec!["fixtures/".into()],
            disable_gitignore: true,
            loose_prefix_match: true,
        };
        let config = apply_filter_overrides(Config::default(), &filters);
        assert_eq!(config.filters.include_extensions, Some(vec!["rs".to_string()]));
        assert_eq!(config.filters.exclude, vec!["target/"]);
        assert_eq!(config.filters.skip_content, vec!["fixtures/"]);
        assert!(!config.filters.use_gitignore);
        assert!(config.filters.loose_prefix_match);
    }

    #[test]
    fn loads_project_config_file_before_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".projsnap");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("projsnap.toml"),
            "[filters]\nexclude = [\"docs/\"]\n[output]\nfile = \"snap.txt\"\n",
        )
        .unwrap();

        let filters = FilterOverrides {
            exclude: vec!["tmp/".into()],
            ..FilterOverrides::default()
        };
        let config =
            load_config_for_command(dir.path(), &ProjectConfigOpts::default(), &filters).unwrap();
        assert_eq!(config.filters.exclude, vec!["docs/", "tmp/"]);
        assert_eq!(config.output.file, Path::new("snap.txt"));
    }

    #[test]
    fn output_path_defaults_to_project_root() {
        let root = Path::new("/project");
        let config = Config::default();
        assert_eq!(
            resolve_output_path(root, None, &config),
            PathBuf::from("/project/PROJECT_SNAPSHOT.txt")
        );
        assert_eq!(
            resolve_output_path(root, Some(Path::new("out/snap.txt")), &config),
            PathBuf::from("/project/out/snap.txt")
        );
        assert_eq!(
            resolve_output_path(root, Some(Path::new("/tmp/snap.txt")), &config),
            PathBuf::from("/tmp/snap.txt")
        );
    }

    #[test]
    fn output_file_inside_root_is_excluded() {
        let root = Path::new("/project");
        let mut config = Config::default();
        exclude_output_file(&mut config, root, Path::new("/project/out/snap.txt"));
        exclude_output_file(&mut config, root, Path::new("/elsewhere/snap.txt"));
        assert_eq!(config.filters.exclude, vec!["out/snap.txt"]);
    }

    #[test]
    fn configuration_errors_map_to_exit_code_one() {
        let err = anyhow::Error::new(AppError::Config("bad".into()));
        assert_eq!(exit_code_for(&err), 1);
        let err = anyhow::Error::new(AppError::Filesystem {
            path: "/x".into(),
            reason: "missing".into(),
        })
        .context("Failed to generate snapshot");
        assert_eq!(exit_code_for(&err), 2);
        let err = anyhow::Error::new(AppError::FileWrite {
            path: "/out.txt".into(),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(exit_code_for(&err), 2);
        let err = anyhow::Error::new(AppError::TomlParse("bad".into()));
        assert_eq!(exit_code_for(&err), 1);
    }
}
