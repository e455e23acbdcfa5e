use crate::cli_args::ListArgs;
use crate::{exclude_output_file, load_config_for_command, resolve_output_path};
use crate::output::print_structured;
use anyhow::{Context, Result};
use colored::*;
use log;
use projsnap_core::{Config, FileEntry, Snapshot, SnapshotConfig, SnapshotGenerator, SnapshotSummary};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListInfo<'a> {
    project_root: &'a Path,
    effective_config: &'a SnapshotConfig,
    exclusion_rules: Vec<&'a str>,
    files: &'a [FileEntry],
    summary: SnapshotSummary,
}

/// Builds the generator exactly as `generate` would and collects its files.
fn collect_for_list(args: &ListArgs) -> Result<(SnapshotGenerator, Snapshot)> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let mut config = load_config_for_command(&project_root, &args.project_config, &args.filters)
        .context("Failed to load configuration for list command")?;
    let output_path = resolve_output_path(&project_root, None, &config);
    exclude_output_file(&mut config, &project_root, &output_path);
    let snapshot_config = config
        .resolve()
        .context("Invalid snapshot configuration")?;
    let generator = SnapshotGenerator::new(&project_root, snapshot_config)
        .context("Failed to prepare snapshot generator")?;

    log::debug!("List: collecting files...");
    let snapshot = generator
        .collect()
        .context("Failed to collect project files")?;
    Ok((generator, snapshot))
}

pub fn handle_list_command(args: ListArgs) -> Result<()> {
    let (generator, snapshot) = collect_for_list(&args)?;

    let info = ListInfo {
        project_root: generator.project_root(),
        effective_config: generator.config(),
        exclusion_rules: generator.rules().patterns(),
        files: &snapshot.entries,
        summary: snapshot.summary,
    };

    match args.format.as_deref() {
        Some(format) => {
            log::debug!("List: printing structured output ({})", format);
            print_structured(&info, format)
        }
        None => print_list_pretty(&info),
    }
}

fn print_list_pretty(info: &ListInfo) -> Result<()> {
    println!(
        "{}",
        "\n--- Files In Snapshot ---".green().bold().underline()
    );
    if info.files.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        for entry in info.files {
            let suffix = if entry.include_content {
                "".normal()
            } else {
                " (content omitted)".dimmed()
            };
            println!("- {}{}", entry.relative_path.cyan(), suffix);
        }
    }

    println!(
        "\n{} {} ({} with content, {} referenced only)",
        "Total:".green(),
        info.summary.total_files.to_string().cyan(),
        info.summary.files_with_content,
        info.summary.files_without_content
    );

    println!("{}", "\n--- Exclusion Rules ---".green().bold().underline());
    if info.exclusion_rules.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        info.exclusion_rules
            .iter()
            .for_each(|rule| println!("- {}", rule.yellow()));
    }

    println!(
        "{}",
        "\n--- Effective Configuration ---".green().bold().underline()
    );
    let config_toml = toml::to_string_pretty(info.effective_config)
        .context("Failed to serialize effective config to TOML")?;
    println!("{}", config_toml);
    Ok(())
}
