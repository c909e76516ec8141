//! Filepath: src/core/filters.rs
//! File-type classification and the upstream exclude rules applied to a
//! repository listing before the selection engine ever sees it.
//!
//! A *filter key* is either a lowercase extension including the leading dot
//! (".rs") or a full lowercase filename for recognized extension-less files
//! ("dockerfile"). Files that classify to no key are never selectable.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::core::session::{EntryKind, TreeEntry};

/// Extensions and special filenames the tool knows how to bundle.
/// Everything else is dropped from the listing up front.
static RECOGNIZED_TYPES: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    BTreeSet::from([
        ".js", ".jsx", ".ts", ".tsx", ".json", ".css", ".scss", ".less", ".html", ".htm",
        ".xml", ".yaml", ".yml", ".md", ".markdown", ".txt", ".py", ".java", ".c", ".cpp",
        ".h", ".hpp", ".cs", ".go", ".php", ".rb", ".swift", ".kt", ".kts", ".sh", ".bash",
        ".zsh", ".sql", ".dockerfile", "dockerfile", ".env", ".gitignore", ".gitattributes",
        ".toml", ".ini", ".cfg", ".conf", ".properties", ".gradle", ".lua", ".rs",
    ])
});

/// Paths excluded from every listing regardless of type filters.
/// A trailing slash marks a directory-prefix rule; `*.` marks a
/// filename-suffix rule; anything else is an exact path or filename.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules/",
    "dist/",
    "build/",
    "out/",
    ".git/",
    ".github/",
    "package-lock.json",
    "yarn.lock",
    ".DS_Store",
    ".vscode/",
    ".idea/",
    "venv/",
    "*.log",
    "*.lock",
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg",
    "*.mp3", "*.mp4", "*.avi", "*.mov",
    "*.pdf", "*.doc", "*.docx", "*.xls", "*.xlsx", "*.ppt", "*.pptx",
    "*.zip", "*.gz", "*.rar", "*.7z", "*.tar",
    "*.exe", "*.dll", "*.so", "*.dylib", "*.bin",
    "*.pyc", "*.class", "*.o",
];

/// Classify a repo-relative path into a filter key, if the file is of a
/// recognized type. Matching is case-insensitive; the extension (after the
/// last dot) is tried first, then the full filename for extension-less
/// special files.
pub fn classify(path: &str) -> Option<String> {
    let lower = path.to_lowercase();
    let filename = lower.rsplit('/').next().unwrap_or(&lower);

    if let Some(dot) = filename.rfind('.') {
        let ext = &filename[dot..];
        if RECOGNIZED_TYPES.contains(ext) {
            return Some(ext.to_string());
        }
    }

    if RECOGNIZED_TYPES.contains(filename) {
        return Some(filename.to_string());
    }

    None
}

/// Collect the set of filter keys present in a listing. This drives the
/// type-filter controls: only keys that actually occur are offered.
pub fn available_filter_keys(entries: &[TreeEntry]) -> BTreeSet<String> {
    entries
        .iter()
        .filter(|e| e.kind == EntryKind::File)
        .filter_map(|e| classify(&e.path))
        .collect()
}

/// Compiled exclude rules. Directory-prefix rules apply to every entry;
/// suffix and exact-name rules apply to files only, mirroring how the
/// listing pre-filter treats `*.lock` vs `.git/`.
pub struct ExcludeRules {
    dir_rules: GlobSet,
    file_rules: GlobSet,
}

impl ExcludeRules {
    /// Compile a rule list (see [`DEFAULT_EXCLUDES`] for the grammar).
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut dirs = GlobSetBuilder::new();
        let mut files = GlobSetBuilder::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().to_lowercase();
            if let Some(prefix) = pattern.strip_suffix('/') {
                // The directory entry itself and everything beneath it.
                dirs.add(Glob::new(prefix)?);
                dirs.add(Glob::new(&format!("{prefix}/**"))?);
            } else if let Some(suffix) = pattern.strip_prefix("*.") {
                files.add(Glob::new(&format!("**/*.{suffix}"))?);
                files.add(Glob::new(&format!("*.{suffix}"))?);
            } else {
                // Exact path or bare filename at any depth.
                files.add(Glob::new(&pattern)?);
                files.add(Glob::new(&format!("**/{pattern}"))?);
            }
        }

        Ok(Self {
            dir_rules: dirs.build()?,
            file_rules: files.build()?,
        })
    }

    /// Default rule set.
    pub fn standard() -> Self {
        // The built-in list is known-good; compilation cannot fail.
        Self::compile(DEFAULT_EXCLUDES).expect("built-in exclude rules compile")
    }

    /// Whether an entry should be dropped from the listing.
    pub fn is_excluded(&self, path: &str, kind: EntryKind) -> bool {
        let lower = path.to_lowercase();
        if self.dir_rules.is_match(&lower) {
            return true;
        }
        kind == EntryKind::File && self.file_rules.is_match(&lower)
    }
}

/// Apply the upstream pre-filter to a raw listing: drop excluded entries,
/// keep surviving directories, and keep only files of a recognized type.
pub fn prefilter_entries(entries: Vec<TreeEntry>, rules: &ExcludeRules) -> Vec<TreeEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            if rules.is_excluded(&entry.path, entry.kind) {
                return false;
            }
            match entry.kind {
                EntryKind::Directory => true,
                EntryKind::File => classify(&entry.path).is_some(),
            }
        })
        .collect()
}
