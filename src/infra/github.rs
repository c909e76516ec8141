//! Filepath: src/infra/github.rs
//! GitHub collaborators: repository URL parsing, the tree-listing API call,
//! and raw file content fetches. All HTTP lives here; the selection engine
//! never does I/O.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::session::{EntryKind, TreeEntry};

const API_ROOT: &str = "https://api.github.com";
const RAW_ROOT: &str = "https://raw.githubusercontent.com";
const USER_AGENT: &str = concat!("repotext/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Accepts `github.com/{owner}/{repo}` with optional scheme, optional
/// `/tree/{branch}`, and a tolerated trailing slash.
static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?github\.com/([^/]+)/([^/]+?)(?:/tree/([^/]+?))?/?$")
        .expect("repo URL pattern compiles")
});

/// Errors surfaced by the fetch layer. Messages are user-facing; the
/// calling command prints them as-is without retrying.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("invalid GitHub repository URL: {0} (expected https://github.com/owner/repo)")]
    InvalidUrl(String),

    #[error(
        "authentication failed: invalid GitHub token or PAT \
         (private repositories need the repo scope)"
    )]
    AuthFailed,

    #[error(
        "GitHub API rate limit exceeded; try again later or provide a \
         personal access token with --pat"
    )]
    RateLimited,

    #[error("access forbidden: check token permissions or repository access rights")]
    Forbidden,

    #[error("repository, branch, or tree not found: check the URL and branch name")]
    NotFound,

    #[error("GitHub returned an unexpected status {0}")]
    Status(u16),

    #[error("network error talking to GitHub: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Parsed repository coordinates. `branch` defaults to `HEAD`, which the
/// git data API resolves to the default branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocator {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepoLocator {
    pub fn parse(url: &str) -> Result<Self, GithubError> {
        let caps = REPO_URL
            .captures(url.trim())
            .ok_or_else(|| GithubError::InvalidUrl(url.trim().to_string()))?;
        Ok(Self {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            branch: caps
                .get(3)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "HEAD".to_string()),
        })
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// One raw repository listing plus GitHub's truncation flag. Truncation is
/// surfaced to the user, never worked around.
#[derive(Debug)]
pub struct TreeListing {
    pub entries: Vec<TreeEntry>,
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
struct ApiTree {
    tree: Vec<ApiTreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct ApiTreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    size: Option<u64>,
}

/// Blocking GitHub client with an optional bearer token.
pub struct GithubClient {
    http: Client,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self, GithubError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { http, token })
    }

    fn get(&self, url: &str, api: bool) -> reqwest::blocking::RequestBuilder {
        let mut req = self.http.get(url);
        if api {
            req = req.header("Accept", "application/vnd.github.v3+json");
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Fetch the full recursive tree listing for a repository branch.
    pub fn fetch_tree(&self, locator: &RepoLocator) -> Result<TreeListing, GithubError> {
        let url = format!(
            "{API_ROOT}/repos/{}/{}/git/trees/{}?recursive=1",
            locator.owner, locator.repo, locator.branch
        );
        debug!(url, "fetching repository tree");

        let response = self.get(&url, true).send()?;
        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(GithubError::AuthFailed),
            StatusCode::FORBIDDEN => {
                let body = response.text().unwrap_or_default();
                if body.contains("API rate limit exceeded") {
                    return Err(GithubError::RateLimited);
                }
                return Err(GithubError::Forbidden);
            }
            StatusCode::NOT_FOUND => return Err(GithubError::NotFound),
            other => return Err(GithubError::Status(other.as_u16())),
        }

        let api: ApiTree = response.json()?;
        if api.truncated {
            warn!(
                repo = %locator.slug(),
                "listing truncated by GitHub; the file list may be incomplete"
            );
        }

        let entries = api
            .tree
            .into_iter()
            .filter_map(|item| {
                let kind = match item.kind.as_str() {
                    "blob" => EntryKind::File,
                    "tree" => EntryKind::Directory,
                    // Submodule commits and other object types are skipped.
                    _ => return None,
                };
                let mut entry = TreeEntry::new(item.path, kind);
                if let Some(size) = item.size {
                    entry = entry.with_size(size);
                }
                Some(entry)
            })
            .collect();

        Ok(TreeListing {
            entries,
            truncated: api.truncated,
        })
    }

    /// Fetch one file's raw content. Callers treat failures per-file (a
    /// skipped file, not a fatal error).
    pub fn fetch_file(&self, locator: &RepoLocator, path: &str) -> Result<String, GithubError> {
        let url = format!(
            "{RAW_ROOT}/{}/{}/{}/{}",
            locator.owner,
            locator.repo,
            locator.branch,
            encode_path(path)
        );
        debug!(path, "fetching file content");

        let response = self.get(&url, false).send()?;
        let status = response.status();
        match status {
            StatusCode::OK => Ok(response.text()?),
            StatusCode::NOT_FOUND => Err(GithubError::NotFound),
            StatusCode::UNAUTHORIZED => Err(GithubError::AuthFailed),
            other => Err(GithubError::Status(other.as_u16())),
        }
    }
}

/// Percent-encode a repo-relative path for the raw host, preserving `/`
/// separators. Over-escaping is harmless here; unescaped `?`, `#`, or
/// spaces are not.
fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
