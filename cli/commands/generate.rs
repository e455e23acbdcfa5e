use crate::cli_args::GenerateArgs;
use crate::{exclude_output_file, load_config_for_command, resolve_output_path};
use crate::output;
use anyhow::{Context, Result};
use colored::Colorize;
use log;
use projsnap_core::{AppError, Config, SnapshotGenerator};
use std::fs;

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let mut config = load_config_for_command(&project_root, &args.project_config, &args.filters)
        .context("Failed to load configuration")?;
    let output_path = resolve_output_path(&project_root, args.output.as_deref(), &config);
    exclude_output_file(&mut config, &project_root, &output_path);
    let snapshot_config = config
        .resolve()
        .context("Invalid snapshot configuration")?;

    let generator = SnapshotGenerator::new(&project_root, snapshot_config)
        .context("Failed to prepare snapshot generator")?;

    log::info!("Starting snapshot generation for: {}", project_root.display());
    let report = generator
        .generate()
        .context("Failed to generate snapshot")?;

    if args.stdout {
        return output::write_to_stdout(&report);
    }

    output::write_to_file(&output_path, &report)
        .with_context(|| format!("Failed to save snapshot to {}", output_path.display()))?;
    log::info!("Snapshot written to {}", output_path.display());

    if !quiet {
        let size = fs::metadata(&output_path)
            .map_err(|e| AppError::FileRead {
                path: output_path.clone(),
                source: e,
            })
            .context("Failed to read size of written snapshot")?
            .len();
        println!(
            "{} Snapshot generated successfully.",
            "✅".green()
        );
        output::print_snapshot_table(&output_path, size);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_args::ProjectConfigOpts;

    #[test]
    fn generate_writes_and_overwrites_output_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "hello").unwrap();
        let output = dir.path().join("PROJECT_SNAPSHOT.txt");
        fs::write(&output, "stale content ".repeat(1000)).unwrap();

        let args = GenerateArgs {
            project_config: ProjectConfigOpts {
                project_root: Some(dir.path().to_path_buf()),
                config_file: None,
                disable_config_file: true,
            },
            ..GenerateArgs::default()
        };
        handle_generate_command(args, true).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("PROJECT SNAPSHOT\n"));
        assert!(written.contains("FILE: a.md\n"));
        assert!(!written.contains("stale content"));
        assert!(written.ends_with("================================================================================\n"));
    }

    #[test]
    fn invalid_config_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".projsnap")).unwrap();
        fs::write(
            dir.path().join(".projsnap").join("projsnap.toml"),
            "[filters]\ninclude_extensions = []\n",
        )
        .unwrap();

        let args = GenerateArgs {
            project_config: ProjectConfigOpts {
                project_root: Some(dir.path().to_path_buf()),
                ..ProjectConfigOpts::default()
            },
            ..GenerateArgs::default()
        };
        let err = handle_generate_command(args, true).unwrap_err();
        let core_err = err.downcast_ref::<AppError>().unwrap();
        assert!(core_err.is_configuration_error());
        assert!(!dir.path().join("PROJECT_SNAPSHOT.txt").exists());
    }
}
