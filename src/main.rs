use anyhow::Result;
use clap::Parser;
use repotext::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays clean for --stdout bundles.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Pack(args) => repotext::pack_run(args, &ctx),
        Commands::Tree(args) => repotext::tree_run(args, &ctx),
        Commands::Init(args) => repotext::infra::config::init(args, &ctx),
        Commands::Completions(args) => repotext::completion::run(args, &ctx),
    }
}
