//! Filepath: src/core/session.rs
//! The selection engine: builds a node tree from a flat GitHub listing,
//! tracks per-node tri-state checkbox selection, applies type filters, and
//! collects the final file set.
//!
//! Design notes:
//! - One owned [`SelectionSession`] per fetched listing; discarded and
//!   rebuilt wholesale on the next fetch. No globals, no incremental patching.
//! - All transitions are synchronous, pure tree mutations. Presentation is a
//!   separate read-only pass, which is what makes the invariants testable.
//! - A directory's selection is always derived from its filter-visible
//!   children; it is never stored independently of them.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use itertools::Itertools;
use tracing::debug;

use crate::core::filters;

/// Whether a listing entry (or node) is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// One record from the repository listing, as returned by the tree API and
/// pre-filtered upstream. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Posix-separated path from the repo root, no leading slash.
    pub path: String,
    pub kind: EntryKind,
    /// Size hint from the API, when present. Informational only.
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
            size: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Tri-state checkbox selection. Files only ever hold the two binary
/// states; `Indeterminate` is produced for directories by upward
/// recomputation and is never cascaded downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    Checked,
    #[default]
    Unchecked,
    Indeterminate,
}

/// One node of the hierarchy. The synthetic root has `path = ""`, is never
/// selectable itself, and never appears in collected output.
#[derive(Debug)]
pub struct Node {
    /// Final path segment ("" for the root).
    pub name: String,
    /// Full path from the repo root; the node's identity.
    pub path: String,
    pub kind: EntryKind,
    /// Children keyed by segment name. Key order is lexicographic; display
    /// order (directories first) comes from [`Node::sorted_children`].
    pub children: BTreeMap<String, Node>,
    pub selection: Selection,
    /// Whether this node matches the active type filters, directly (files)
    /// or through at least one descendant (directories).
    pub filter_visible: bool,
}

impl Node {
    fn new(name: String, path: String, kind: EntryKind) -> Self {
        Self {
            name,
            path,
            kind,
            children: BTreeMap::new(),
            selection: Selection::Unchecked,
            filter_visible: false,
        }
    }

    fn root() -> Self {
        Self::new(String::new(), String::new(), EntryKind::Directory)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Children in display order: directories before files, then by name.
    pub fn sorted_children(&self) -> Vec<&Node> {
        self.children
            .values()
            .sorted_by_key(|n| (n.kind != EntryKind::Directory, n.name.clone()))
            .collect()
    }

    /// Derive a directory's selection from its filter-visible children.
    fn derived_selection(&self) -> Selection {
        let mut seen = 0usize;
        let mut all_checked = true;
        let mut any_checked = false;

        for child in self.children.values().filter(|c| c.filter_visible) {
            seen += 1;
            match child.selection {
                Selection::Checked => any_checked = true,
                Selection::Indeterminate => {
                    any_checked = true;
                    all_checked = false;
                }
                Selection::Unchecked => all_checked = false,
            }
        }

        if seen == 0 {
            Selection::Unchecked
        } else if all_checked {
            Selection::Checked
        } else if any_checked {
            Selection::Indeterminate
        } else {
            Selection::Unchecked
        }
    }
}

/// Owned selection state for one fetched listing: the node tree, the filter
/// keys present in the listing, and the currently active subset.
#[derive(Debug)]
pub struct SelectionSession {
    root: Node,
    available_filters: BTreeSet<String>,
    active_filters: BTreeSet<String>,
}

impl SelectionSession {
    /// Build a session from a pre-filtered listing. Every recognized filter
    /// key starts active, so every classifiable file starts visible and
    /// checked — the same initial state the checkbox tree presents.
    pub fn new(entries: &[TreeEntry]) -> Self {
        let available = filters::available_filter_keys(entries);
        let mut session = Self {
            root: build_root(entries),
            active_filters: BTreeSet::new(),
            available_filters: available.clone(),
        };
        session.set_active_filters(available);
        session
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Filter keys that occur anywhere in the listing.
    pub fn available_filters(&self) -> &BTreeSet<String> {
        &self.available_filters
    }

    pub fn active_filters(&self) -> &BTreeSet<String> {
        &self.active_filters
    }

    /// Look up a node by its full path. The empty path names the root.
    pub fn node(&self, path: &str) -> Option<&Node> {
        if path.is_empty() {
            return Some(&self.root);
        }
        let mut current = &self.root;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current.children.get(segment)?;
        }
        Some(current)
    }

    /// Replace the active filter set and reconcile the whole tree in one
    /// synchronous pass: file visibility is reclassified against the new
    /// set, files crossing the visibility boundary get their default state
    /// (visible → checked, hidden → unchecked — filters win over prior
    /// explicit choices), and every directory's visibility and selection are
    /// recomputed bottom-up.
    pub fn set_active_filters(&mut self, keys: BTreeSet<String>) {
        debug!(active = keys.len(), "reconciling type filters");
        self.active_filters = keys;
        reconcile(&mut self.root, &self.active_filters);
    }

    /// Handle one checkbox interaction: force `path` and all of its
    /// filter-visible descendants to the given binary state, then recompute
    /// every ancestor up to the root.
    ///
    /// Unknown paths (stale references) and nodes hidden by the current
    /// filters are ignored; the presentation layer should not issue such
    /// toggles, but they must not fault.
    pub fn toggle(&mut self, path: &str, checked: bool) {
        if path.is_empty() {
            return;
        }
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() || !toggle_in(&mut self.root, &segments, checked) {
            debug!(path, "ignoring toggle for unknown or hidden node");
        }
    }

    /// Select or deselect every filter-visible node uniformly. No
    /// indeterminate state survives this operation.
    pub fn set_all(&mut self, checked: bool) {
        let state = binary(checked);
        set_all_visible(&mut self.root, state);
        recompute_directories(&mut self.root);
    }

    /// Walk the tree and return the checked file paths. Unchecked
    /// directories are pruned outright — their descendants are guaranteed
    /// unchecked by the derivation invariant. Order follows the tree walk;
    /// the structure renderer re-sorts anyway.
    pub fn collect_selected(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        collect_into(&self.root, &mut out, &mut seen);
        out
    }
}

fn binary(checked: bool) -> Selection {
    if checked {
        Selection::Checked
    } else {
        Selection::Unchecked
    }
}

/// Build the node tree from a flat listing. Entries are sorted by depth,
/// then lexicographically, so ancestors materialize before the entries that
/// need them; intermediate nodes are created as directories and a later
/// entry for the exact same path overwrites the kind (last writer wins).
/// Empty path segments are normalized away.
fn build_root(entries: &[TreeEntry]) -> Node {
    let mut root = Node::root();

    let ordered = entries
        .iter()
        .sorted_by_key(|e| (e.path.matches('/').count(), e.path.as_str()));

    for entry in ordered {
        let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            continue;
        }

        let mut current = &mut root;
        let mut prefix = String::new();
        let last = segments.len() - 1;

        for (depth, segment) in segments.iter().enumerate() {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);

            let node = current
                .children
                .entry((*segment).to_string())
                .or_insert_with(|| {
                    Node::new((*segment).to_string(), prefix.clone(), EntryKind::Directory)
                });

            if depth == last {
                node.kind = entry.kind;
            }
            current = node;
        }
    }

    root
}

/// Post-order reconciliation after a filter change (and on construction).
/// Returns the node's new visibility.
fn reconcile(node: &mut Node, active: &BTreeSet<String>) -> bool {
    if !node.is_dir() {
        let was_visible = node.filter_visible;
        let visible = filters::classify(&node.path)
            .map(|key| active.contains(&key))
            .unwrap_or(false);
        node.filter_visible = visible;

        if !visible {
            node.selection = Selection::Unchecked;
        } else if !was_visible {
            node.selection = Selection::Checked;
        }
        return visible;
    }

    let mut any_visible = false;
    for child in node.children.values_mut() {
        if reconcile(child, active) {
            any_visible = true;
        }
    }
    node.filter_visible = any_visible;
    node.selection = node.derived_selection();
    any_visible
}

/// Descend along `segments`; at the target, cascade the binary state down
/// through filter-visible descendants. On the way back up, re-derive each
/// ancestor directory's selection. Returns false if the target is missing
/// or hidden, leaving the tree untouched.
fn toggle_in(node: &mut Node, segments: &[&str], checked: bool) -> bool {
    match segments {
        [] => {
            if !node.filter_visible {
                return false;
            }
            cascade(node, binary(checked));
            true
        }
        [head, rest @ ..] => {
            let Some(child) = node.children.get_mut(*head) else {
                return false;
            };
            if !toggle_in(child, rest, checked) {
                return false;
            }
            if node.is_dir() {
                node.selection = node.derived_selection();
            }
            true
        }
    }
}

/// Force a subtree to a uniform binary state, visiting only filter-visible
/// nodes. Indeterminate never travels downward.
fn cascade(node: &mut Node, state: Selection) {
    node.selection = state;
    for child in node.children.values_mut().filter(|c| c.filter_visible) {
        cascade(child, state);
    }
}

fn set_all_visible(node: &mut Node, state: Selection) {
    if node.filter_visible {
        node.selection = state;
    }
    for child in node.children.values_mut() {
        set_all_visible(child, state);
    }
}

/// Full bottom-up re-derivation of every directory's selection.
fn recompute_directories(node: &mut Node) {
    if !node.is_dir() {
        return;
    }
    for child in node.children.values_mut() {
        recompute_directories(child);
    }
    node.selection = node.derived_selection();
}

fn collect_into(node: &Node, out: &mut Vec<String>, seen: &mut HashSet<String>) {
    for child in node.children.values() {
        match child.kind {
            EntryKind::File => {
                if child.selection == Selection::Checked && seen.insert(child.path.clone()) {
                    out.push(child.path.clone());
                }
            }
            EntryKind::Directory => {
                if matches!(
                    child.selection,
                    Selection::Checked | Selection::Indeterminate
                ) {
                    collect_into(child, out, seen);
                }
            }
        }
    }
}
