//! Filepath: src/core/structure.rs
//! Renders a selected-file list as a deterministic ASCII tree with
//! box-drawing connectors. Pure string-in/string-out: input order never
//! matters because the node set is sorted before emission, which makes the
//! output safe for snapshot tests and byte-for-byte comparisons.

use std::collections::{BTreeMap, BTreeSet};

const HEADER: &str = "Selected Files Structure:";

#[derive(Debug)]
enum RenderNode {
    File,
    Dir(BTreeMap<String, RenderNode>),
}

/// Render the structure block for a set of selected file paths.
///
/// Empty input yields the header plus an explicit marker line, never an
/// empty string.
pub fn render_structure<S: AsRef<str>>(paths: &[S]) -> String {
    if paths.is_empty() {
        return format!("{HEADER}\n(No files selected)\n");
    }

    let node_set = normalize_path_set(paths);
    let tree = build_render_tree(&node_set);

    let mut out = format!("{HEADER}\n./\n");
    emit(&tree, "", &mut out);
    out.push('\n');
    out
}

/// Expand file paths into the full node set needed to draw the structure:
/// every file plus every proper ancestor directory. Directories carry a
/// trailing separator so a directory `x` and a file `x` at the same level
/// stay distinct in the flat set.
fn normalize_path_set<S: AsRef<str>>(paths: &[S]) -> BTreeSet<String> {
    let mut nodes = BTreeSet::new();

    for path in paths {
        let path = path.as_ref();
        nodes.insert(path.to_string());

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut prefix = String::new();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            nodes.insert(format!("{prefix}/"));
        }
    }

    nodes
}

/// Rebuild a nested structure from the sorted flat node set. The trailing
/// separator already disambiguates kinds, so this is the simple variant of
/// hierarchy building: later writes win on an exact segment, and a file
/// segment encountered as an ancestor is promoted to a directory.
fn build_render_tree(node_set: &BTreeSet<String>) -> BTreeMap<String, RenderNode> {
    let mut root = BTreeMap::new();

    for node_path in node_set {
        let is_dir = node_path.ends_with('/');
        let trimmed = node_path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            continue;
        }

        let mut current = &mut root;
        let last = segments.len() - 1;
        for (depth, segment) in segments.iter().enumerate() {
            if depth == last && !is_dir {
                current.insert((*segment).to_string(), RenderNode::File);
                break;
            }

            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| RenderNode::Dir(BTreeMap::new()));
            if matches!(entry, RenderNode::File) {
                *entry = RenderNode::Dir(BTreeMap::new());
            }
            let RenderNode::Dir(children) = entry else {
                unreachable!("just promoted to a directory");
            };
            current = children;
        }
    }

    root
}

/// Depth-first emission with connector glyphs. Sorted alphabetically at
/// each level (BTreeMap key order); the continuation prefix is carried down
/// to descendants.
fn emit(children: &BTreeMap<String, RenderNode>, prefix: &str, out: &mut String) {
    let count = children.len();
    for (index, (name, node)) in children.iter().enumerate() {
        let is_last = index + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(name);
        out.push('\n');

        if let RenderNode::Dir(grandchildren) = node {
            let continuation = if is_last { "    " } else { "│   " };
            let child_prefix = format!("{prefix}{continuation}");
            emit(grandchildren, &child_prefix, out);
        }
    }
}
