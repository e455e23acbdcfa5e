use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the project directory to snapshot (default: $PROJECT_ROOT or current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path of the TOML config file (default: .projsnap/projsnap.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "disable_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub disable_config_file: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterOverrides {
    #[arg(long = "ext", value_name = "EXT", action = clap::ArgAction::Append, help = "Include files with this extension; replaces the configured list.", help_heading = "Filtering")]
    pub extensions: Vec<String>,

    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Add an exclusion pattern (gitignore style).", help_heading = "Filtering")]
    pub exclude: Vec<String>,

    #[arg(long = "skip-content", value_name = "PATTERN", action = clap::ArgAction::Append, help = "List matching files in the tree but omit their content.", help_heading = "Filtering")]
    pub skip_content: Vec<String>,

    #[arg(
        long,
        help = "Do not read exclusion rules from the project's .gitignore.",
        help_heading = "Filtering"
    )]
    pub disable_gitignore: bool,

    #[arg(
        long,
        help = "Let exact patterns match any path starting with the pattern text (e.g. 'src' also matches 'src2/').",
        help_heading = "Filtering"
    )]
    pub loose_prefix_match: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "projsnap",
    author,
    version,
    about = "Generate a plain-text snapshot of a project's source files.",
    long_about = "projsnap walks a project directory, applies gitignore-style exclusion rules and an \nextension filter, and writes a single annotated text report: a header, an ASCII \nfile tree, and the content of every included file.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  projsnap\n  projsnap generate -o snapshot.txt --ext rs --ext toml\n  projsnap list -f json\n  projsnap config --save"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Generate the snapshot file (default command)."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "ls",
        about = "Show the files the snapshot would contain and the effective configuration."
    )]
    List(ListArgs),

    #[command(about = "Show or save the default configuration file.")]
    Config(ConfigArgs),

    #[command(about = "Print shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub filters: FilterOverrides,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the snapshot here instead of the configured output file.",
        help_heading = "Output Control",
        conflicts_with = "stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Print the snapshot to standard output instead of writing a file.",
        help_heading = "Output Control"
    )]
    pub stdout: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub filters: FilterOverrides,

    #[arg(short = 'f', long, help = "Print structured output instead of a listing.", value_name = "FORMAT", value_parser = ["json", "yaml"], help_heading = "Output Formatting")]
    pub format: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        help = "Project directory to save the config into (default: $PROJECT_ROOT or current dir).",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Save the default config to .projsnap/projsnap.toml (prompts before overwriting)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
}
