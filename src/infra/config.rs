//! Filepath: src/infra/config.rs
//! Layered configuration: `repotext.toml` (or `.repotext.toml`) merged with
//! `REPOTEXT_`-prefixed environment variables.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Exclude rules applied on top of the built-in list. Same grammar:
    /// trailing `/` for directory prefixes, `*.ext` for suffixes, otherwise
    /// an exact path or filename.
    pub exclude_patterns: Vec<String>,

    /// Default bundling ceilings
    pub pack: PackConfig,

    /// GitHub access settings
    pub github: GithubConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PackConfig {
    /// Hard ceiling on files fetched per bundle
    pub max_files: usize,

    /// Total content ceiling in MiB; files past it are skipped with a marker
    pub max_total_size_mb: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access token; `--pat` and `GITHUB_TOKEN` take precedence
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_patterns: Vec::new(),
            pack: PackConfig {
                max_files: 500,
                max_total_size_mb: 10,
            },
            github: GithubConfig::default(),
        }
    }
}

impl Default for PackConfig {
    fn default() -> Self {
        Config::default().pack
    }
}

pub fn load_config() -> Result<Config> {
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["repotext.toml", ".repotext.toml"];

    for path in &config_paths {
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with REPOTEXT_ prefix
    builder = builder.add_source(config::Environment::with_prefix("REPOTEXT").separator("_"));

    let cfg = builder.build().context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let config_path = args.path.join("repotext.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
