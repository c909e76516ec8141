//! Filepath: src/core/output.rs
//! Turns a selected file list into the final text bundle: parallel raw
//! content fetches under a total-size ceiling, then deterministic assembly
//! of the structure block and per-file sections.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::warn;

use crate::infra::github::{GithubClient, RepoLocator};

/// Ceilings enforced around the fetch, not inside the selection engine.
#[derive(Debug, Clone, Copy)]
pub struct BundleLimits {
    pub max_files: usize,
    pub max_total_size_mb: u64,
}

impl BundleLimits {
    pub fn max_total_bytes(&self) -> u64 {
        self.max_total_size_mb * 1024 * 1024
    }
}

impl Default for BundleLimits {
    fn default() -> Self {
        Self {
            max_files: 500,
            max_total_size_mb: 10,
        }
    }
}

/// Outcome of one file fetch. A failure carries the human-readable skip
/// reason that ends up in the bundle; it never aborts the run.
#[derive(Debug)]
pub struct FetchedFile {
    pub path: String,
    pub outcome: Result<String, String>,
}

/// Everything fetched for one bundle, in selection order.
#[derive(Debug)]
pub struct FetchReport {
    pub files: Vec<FetchedFile>,
    /// The total-size ceiling was hit; some files were skipped for it.
    pub size_limit_reached: bool,
}

impl FetchReport {
    pub fn fetched_count(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_ok()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.files.len() - self.fetched_count()
    }
}

/// Fetch the content of every selected file in parallel, preserving input
/// order in the result. Files that would push the running total past the
/// size ceiling are skipped with a marker; later files short-circuit
/// without fetching.
pub fn fetch_contents(
    client: &GithubClient,
    locator: &RepoLocator,
    paths: &[String],
    limits: &BundleLimits,
    progress: Option<&ProgressBar>,
) -> FetchReport {
    let ceiling = limits.max_total_bytes();
    let total = AtomicU64::new(0);
    let limit_hit = AtomicBool::new(false);

    let files: Vec<FetchedFile> = paths
        .par_iter()
        .map(|path| {
            let outcome = fetch_one(client, locator, path, ceiling, &total, &limit_hit, limits);
            if let Some(bar) = progress {
                bar.inc(1);
            }
            FetchedFile {
                path: path.clone(),
                outcome,
            }
        })
        .collect();

    let size_limit_reached = limit_hit.load(Ordering::Relaxed);
    if size_limit_reached {
        warn!(
            limit_mb = limits.max_total_size_mb,
            "total size ceiling reached; bundle is incomplete"
        );
    }

    FetchReport {
        files,
        size_limit_reached,
    }
}

fn fetch_one(
    client: &GithubClient,
    locator: &RepoLocator,
    path: &str,
    ceiling: u64,
    total: &AtomicU64,
    limit_hit: &AtomicBool,
    limits: &BundleLimits,
) -> Result<String, String> {
    if limit_hit.load(Ordering::Relaxed) {
        return Err(format!(
            "Skipped: total size limit ({}MB) already reached",
            limits.max_total_size_mb
        ));
    }

    let content = client
        .fetch_file(locator, path)
        .map_err(|e| format!("Error fetching: {e}"))?;

    let size = content.len() as u64;
    let fits = total
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
            (current + size <= ceiling).then_some(current + size)
        })
        .is_ok();

    if fits {
        Ok(content)
    } else {
        limit_hit.store(true, Ordering::Relaxed);
        Err(format!(
            "Skipped: exceeds total size limit ({}MB)",
            limits.max_total_size_mb
        ))
    }
}

/// Assemble the final bundle text: structure block, blank line, then one
/// section per file in selection order. Pure function of its inputs.
pub fn assemble_bundle(structure: &str, report: &FetchReport, limits: &BundleLimits) -> String {
    let mut content = String::new();

    for file in &report.files {
        match &file.outcome {
            Ok(body) => {
                content.push_str(&format!("--- File: {} ---\n\n{}\n\n", file.path, body));
            }
            Err(reason) => {
                content.push_str(&format!(
                    "--- Skipped File: {} ({}) ---\n\n",
                    file.path, reason
                ));
            }
        }
    }

    if report.size_limit_reached {
        content.push_str(&format!(
            "\n\n--- WARNING: Reached total size limit ({}MB). Output may be incomplete. \
             Processed {} files. ---\n",
            limits.max_total_size_mb,
            report.fetched_count()
        ));
    }

    format!("{structure}\n{content}")
}
