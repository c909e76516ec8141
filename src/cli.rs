use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "repotext")]
#[command(
    about = "A lightweight CLI that turns a GitHub repository into a single LLM-ready text bundle"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a repository and bundle selected files into one text artifact
    Pack(PackArgs),

    /// Print the selected-files structure without fetching any content
    Tree(TreeArgs),

    /// Initialize a repotext.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser)]
pub struct PackArgs {
    /// GitHub repository URL (https://github.com/owner/repo[/tree/branch])
    pub url: String,

    /// Personal access token; overrides config and GITHUB_TOKEN
    #[arg(long)]
    pub pat: Option<String>,

    /// Restrict active type filters (e.g. ".rs,.toml,dockerfile"; default: all recognized)
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<String>,

    /// Additional exclude rules (trailing "/" for directories, "*.ext" for suffixes)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Deselect a file or directory path after the default select-all
    #[arg(long)]
    pub deselect: Vec<String>,

    /// Select a file or directory path (useful together with --none)
    #[arg(long)]
    pub select: Vec<String>,

    /// Start with nothing selected instead of everything
    #[arg(long)]
    pub none: bool,

    /// Output file path (default: <repo>-files-<timestamp>.txt)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the bundle to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Copy the bundle to the clipboard
    #[arg(long)]
    pub clipboard: bool,

    /// Override the maximum number of files to fetch
    #[arg(long)]
    pub max_files: Option<usize>,
}

#[derive(Parser)]
pub struct TreeArgs {
    /// GitHub repository URL (https://github.com/owner/repo[/tree/branch])
    pub url: String,

    /// Personal access token; overrides config and GITHUB_TOKEN
    #[arg(long)]
    pub pat: Option<String>,

    /// Restrict active type filters (e.g. ".rs,.toml,dockerfile")
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<String>,

    /// Additional exclude rules
    #[arg(long)]
    pub exclude: Vec<String>,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
