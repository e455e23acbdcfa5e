use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use projsnap_core::AppError;
use std::io;

use crate::cli_args::{Cli, CompletionArgs};

fn parse_shell(shell: &str) -> Result<Shell> {
    match shell.to_lowercase().as_str() {
        "fish" => Ok(Shell::Fish),
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        _ => Err(AppError::InvalidArgument(format!(
            "Unsupported shell for completion: {}",
            shell
        ))
        .into()),
    }
}

pub fn handle_completion_command(args: &CompletionArgs) -> Result<()> {
    let shell = parse_shell(args.shell.as_deref().unwrap_or("fish"))?;
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    log::debug!("Generating {} completions for {}", shell, bin_name);
    generate(shell, &mut command, bin_name, &mut io::stdout());
    Ok(())
}
