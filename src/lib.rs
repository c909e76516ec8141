//! **repotext** - Turn a GitHub repository into a single LLM-ready text bundle
//!
//! Fetches a repository's file listing, drives a tri-state selection over it
//! (type filters, per-path toggles), and bundles the selected files with a
//! deterministic ASCII structure header.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core pipeline - selection engine, rendering, and bundling
pub mod core {
    /// Extension allow-list, built-in excludes, and the listing pre-filter
    pub mod filters;
    pub use filters::{DEFAULT_EXCLUDES, ExcludeRules, classify};

    /// Tree building and tri-state selection over a flat repository listing
    pub mod session;
    pub use session::{EntryKind, Selection, SelectionSession, TreeEntry};

    /// Deterministic ASCII rendering of a selected-files structure
    pub mod structure;
    pub use structure::render_structure;

    /// Parallel content fetching and bundle assembly
    pub mod output;
    pub use output::{BundleLimits, FetchReport, assemble_bundle, fetch_contents};

    /// Whitespace-and-punctuation token estimate with capacity bands
    pub mod tokens;
    pub use tokens::{TokenBand, estimate_tokens};

    /// The `pack` command: end-to-end fetch, select, bundle, emit
    pub mod pack;
    pub use pack::run as pack_run;

    /// The `tree` command: structure preview without content fetches
    pub mod tree;
    pub use tree::run as tree_run;
}

/// Infrastructure - configuration and the GitHub fetch layer
pub mod infra {
    /// Configuration management with TOML support and env overrides
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Repository URL parsing, tree-listing API, raw content fetches
    pub mod github;
    pub use github::{GithubClient, GithubError, RepoLocator, TreeListing};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{pack_run, tree_run};
pub use infra::{Config, load_config};

// Core types for external consumers
pub use core::session::{EntryKind, Selection, SelectionSession, TreeEntry};
