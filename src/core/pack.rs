//! Filepath: src/core/pack.rs
//! The `pack` command: fetch a repository listing, drive a selection
//! session from CLI flags, fetch the selected files, and emit the bundle.

use std::collections::BTreeSet;
use std::env;
use std::fs;

use anyhow::{Context, Result, bail};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::cli::{AppContext, PackArgs};
use crate::core::filters::{self, DEFAULT_EXCLUDES, ExcludeRules};
use crate::core::output::{self, BundleLimits};
use crate::core::session::{EntryKind, SelectionSession};
use crate::core::structure::render_structure;
use crate::core::tokens::{TokenBand, estimate_tokens};
use crate::infra::config::Config;
use crate::infra::github::{GithubClient, RepoLocator};

/// A selection session bound to the remote repository it came from.
pub(crate) struct RemoteSession {
    pub locator: RepoLocator,
    pub client: GithubClient,
    pub session: SelectionSession,
}

/// Fetch the listing, run the upstream pre-filter, and build a session with
/// the requested type filters active. Shared between `pack` and `tree`.
pub(crate) fn open_session(
    url: &str,
    pat: Option<&str>,
    types: &[String],
    extra_excludes: &[String],
    config: &Config,
    ctx: &AppContext,
) -> Result<RemoteSession> {
    let locator = RepoLocator::parse(url)?;
    let token = pat
        .map(str::to_string)
        .or_else(|| config.github.token.clone())
        .or_else(|| env::var("GITHUB_TOKEN").ok());
    let client = GithubClient::new(token)?;

    let spinner = status_spinner(ctx, format!("Fetching structure of {}...", locator.slug()));
    let listing = client.fetch_tree(&locator);
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let listing = listing.with_context(|| format!("fetching tree of {}", locator.slug()))?;

    if listing.truncated && !ctx.quiet {
        eprintln!(
            "{}",
            "Warning: repository is large, the file list may be incomplete.".yellow()
        );
    }

    let mut patterns: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    patterns.extend(config.exclude_patterns.iter().cloned());
    patterns.extend(extra_excludes.iter().cloned());
    let rules = ExcludeRules::compile(&patterns).context("compiling exclude rules")?;

    let entries = filters::prefilter_entries(listing.entries, &rules);
    let mut session = SelectionSession::new(&entries);

    if !types.is_empty() {
        let requested: BTreeSet<String> = types.iter().map(|t| t.to_lowercase()).collect();
        for unknown in requested.difference(session.available_filters()) {
            if !ctx.quiet {
                eprintln!(
                    "{}",
                    format!("Note: no files of type '{unknown}' in this repository.").yellow()
                );
            }
        }
        let active: BTreeSet<String> = requested
            .intersection(session.available_filters())
            .cloned()
            .collect();
        session.set_active_filters(active);
    }

    if !ctx.quiet {
        let files = entries.iter().filter(|e| e.kind == EntryKind::File).count();
        let dirs = entries.len() - files;
        println!(
            "Found {files} bundleable files and {dirs} directories in {} ({} file types).",
            locator.slug(),
            session.available_filters().len()
        );
    }

    Ok(RemoteSession {
        locator,
        client,
        session,
    })
}

pub fn run(args: PackArgs, ctx: &AppContext) -> Result<()> {
    let config = crate::infra::config::load_config().unwrap_or_default();

    let mut remote = open_session(
        &args.url,
        args.pat.as_deref(),
        &args.types,
        &args.exclude,
        &config,
        ctx,
    )?;

    // Default state is everything visible selected; --none inverts that
    // before explicit per-path toggles apply.
    if args.none {
        remote.session.set_all(false);
    }
    for path in &args.select {
        remote.session.toggle(path, true);
    }
    for path in &args.deselect {
        remote.session.toggle(path, false);
    }

    let selected = remote.session.collect_selected();
    if selected.is_empty() {
        bail!("no files selected; adjust --types, --select, or --deselect and try again");
    }

    let limits = BundleLimits {
        max_files: args.max_files.unwrap_or(config.pack.max_files),
        max_total_size_mb: config.pack.max_total_size_mb,
    };
    if selected.len() > limits.max_files {
        bail!(
            "too many files selected ({}); the limit is {}. Narrow the selection or \
             raise --max-files.",
            selected.len(),
            limits.max_files
        );
    }

    let structure = render_structure(&selected);

    if ctx.dry_run {
        if !ctx.quiet {
            println!("{}", "DRY RUN: would fetch:".yellow());
            print!("{structure}");
            println!("  {} files from {}", selected.len(), remote.locator.slug());
        }
        return Ok(());
    }

    let progress = fetch_progress(ctx, selected.len() as u64);
    let report = output::fetch_contents(
        &remote.client,
        &remote.locator,
        &selected,
        &limits,
        progress.as_ref(),
    );
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    let bundle = output::assemble_bundle(&structure, &report, &limits);

    if !ctx.quiet {
        report_tokens(&bundle, ctx);
        if report.skipped_count() > 0 {
            eprintln!(
                "{}",
                format!(
                    "Skipped {} of {} files (see markers in the output).",
                    report.skipped_count(),
                    report.files.len()
                )
                .yellow()
            );
        }
    }

    emit_bundle(&args, ctx, &remote.locator, bundle)
}

/// Write the bundle to its destination: stdout, clipboard, and/or a file.
fn emit_bundle(
    args: &PackArgs,
    ctx: &AppContext,
    locator: &RepoLocator,
    bundle: String,
) -> Result<()> {
    if args.clipboard {
        let mut clipboard = arboard::Clipboard::new().context("opening clipboard")?;
        clipboard
            .set_text(bundle.clone())
            .context("copying bundle to clipboard")?;
        if !ctx.quiet {
            println!("Copied bundle to clipboard.");
        }
        if !args.stdout && args.output.is_none() {
            return Ok(());
        }
    }

    if args.stdout {
        print!("{bundle}");
        return Ok(());
    }

    let path = match &args.output {
        Some(path) => shellexpand::tilde(path).into_owned(),
        None => format!(
            "{}-files-{}.txt",
            locator.repo,
            Local::now().format("%Y-%m-%dT%H-%M-%S")
        ),
    };
    fs::write(&path, &bundle).with_context(|| format!("writing bundle to {path}"))?;
    if !ctx.quiet {
        println!("Wrote bundle to {path}");
    }
    Ok(())
}

fn report_tokens(bundle: &str, ctx: &AppContext) {
    let count = estimate_tokens(bundle);
    let label = format!("Estimated tokens: {count}");
    if ctx.no_color {
        eprintln!("{label}");
        return;
    }
    match TokenBand::of(count) {
        TokenBand::Comfortable => eprintln!("{}", label.green()),
        TokenBand::Tight => eprintln!("{}", label.yellow()),
        TokenBand::Oversized => eprintln!("{}", label.red()),
    }
}

fn status_spinner(ctx: &AppContext, message: String) -> Option<ProgressBar> {
    if ctx.quiet {
        return None;
    }
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(bar)
}

fn fetch_progress(ctx: &AppContext, len: u64) -> Option<ProgressBar> {
    if ctx.quiet {
        return None;
    }
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .expect("progress template is valid")
            .progress_chars("=> "),
    );
    bar.set_message("Fetching files");
    Some(bar)
}
