//! Integration tests for the tri-state selection engine: the documented
//! end-to-end scenarios plus property checks over random interaction
//! sequences.

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use repotext::core::session::{EntryKind, Node, Selection, SelectionSession, TreeEntry};

fn file(path: &str) -> TreeEntry {
    TreeEntry::new(path, EntryKind::File)
}

fn dir(path: &str) -> TreeEntry {
    TreeEntry::new(path, EntryKind::Directory)
}

fn filters(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

#[test]
fn unrecognized_files_never_participate_in_selection() {
    let session = SelectionSession::new(&[file("src/a.js"), file("src/b.png")]);

    assert_eq!(session.collect_selected(), vec!["src/a.js".to_string()]);
    let hidden = session.node("src/b.png").expect("entry kept in tree");
    assert!(!hidden.filter_visible);
    assert_eq!(hidden.selection, Selection::Unchecked);
}

#[test]
fn checking_a_directory_selects_only_filter_visible_descendants() {
    let mut session = SelectionSession::new(&[file("a/x.py"), file("a/b/y.py"), file("a/b/z.md")]);
    session.set_active_filters(filters(&[".py"]));
    session.set_all(false);
    session.toggle("a", true);

    let selected: BTreeSet<String> = session.collect_selected().into_iter().collect();
    assert_eq!(
        selected,
        BTreeSet::from(["a/x.py".to_string(), "a/b/y.py".to_string()])
    );
}

#[test]
fn unchecking_one_leaf_turns_mixed_ancestors_indeterminate() {
    // All filter keys active: a/b holds one checked and one unchecked child.
    let mut session = SelectionSession::new(&[file("a/x.py"), file("a/b/y.py"), file("a/b/z.md")]);
    session.toggle("a", true);
    session.toggle("a/b/y.py", false);

    assert_eq!(
        session.node("a/b").unwrap().selection,
        Selection::Indeterminate
    );
    assert_eq!(session.node("a").unwrap().selection, Selection::Indeterminate);
    let selected: BTreeSet<String> = session.collect_selected().into_iter().collect();
    assert_eq!(
        selected,
        BTreeSet::from(["a/x.py".to_string(), "a/b/z.md".to_string()])
    );
}

#[test]
fn unchecking_the_only_visible_leaf_empties_its_directory() {
    // With .md filtered out, y.py is a/b's only visible child, so a/b
    // derives Unchecked (not Indeterminate) and gets pruned from
    // collection while `a` stays mixed.
    let mut session = SelectionSession::new(&[file("a/x.py"), file("a/b/y.py"), file("a/b/z.md")]);
    session.set_active_filters(filters(&[".py"]));
    session.toggle("a", true);
    session.toggle("a/b/y.py", false);

    assert_eq!(session.node("a/b").unwrap().selection, Selection::Unchecked);
    assert_eq!(session.node("a").unwrap().selection, Selection::Indeterminate);
    assert_eq!(session.collect_selected(), vec!["a/x.py".to_string()]);
}

#[test]
fn select_none_then_individual_picks() {
    let mut session = SelectionSession::new(&[
        file("src/main.rs"),
        file("src/lib.rs"),
        file("README.md"),
    ]);
    session.set_all(false);
    assert!(session.collect_selected().is_empty());

    session.toggle("src/lib.rs", true);
    assert_eq!(session.collect_selected(), vec!["src/lib.rs".to_string()]);
    assert_eq!(
        session.node("src").unwrap().selection,
        Selection::Indeterminate
    );
}

#[test]
fn narrowing_filters_drops_hidden_selections_immediately() {
    let mut session = SelectionSession::new(&[file("a.rs"), file("b.md"), file("c.toml")]);
    session.set_active_filters(filters(&[".rs"]));

    assert_eq!(session.collect_selected(), vec!["a.rs".to_string()]);
    assert_eq!(session.node("b.md").unwrap().selection, Selection::Unchecked);
}

// --- property checks over random interaction sequences ---

#[derive(Debug, Clone)]
enum Op {
    Toggle(usize, bool),
    SetAll(bool),
    SetFilters(Vec<String>),
}

fn walk<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    for child in node.children.values() {
        out.push(child);
        walk(child, out);
    }
}

fn any_visible_file_descendant(node: &Node) -> bool {
    node.children.values().any(|child| match child.kind {
        EntryKind::File => child.filter_visible,
        EntryKind::Directory => any_visible_file_descendant(child),
    })
}

/// Directory visibility must mirror descendant file visibility exactly.
fn check_filter_monotonicity(session: &SelectionSession) {
    let mut nodes = Vec::new();
    walk(session.root(), &mut nodes);
    for node in nodes.iter().filter(|n| n.is_dir()) {
        assert_eq!(
            node.filter_visible,
            any_visible_file_descendant(node),
            "directory {} visibility out of sync",
            node.path
        );
    }
}

/// Every directory's state must equal the tri-state derivation from its
/// filter-visible children.
fn check_tristate_consistency(session: &SelectionSession) {
    let mut nodes = vec![session.root()];
    walk(session.root(), &mut nodes);

    for node in nodes.iter().filter(|n| n.is_dir()) {
        let visible: Vec<&Node> = node
            .children
            .values()
            .filter(|c| c.filter_visible)
            .collect();
        let expected = if visible.is_empty() {
            Selection::Unchecked
        } else if visible.iter().all(|c| c.selection == Selection::Checked) {
            Selection::Checked
        } else if visible
            .iter()
            .any(|c| matches!(c.selection, Selection::Checked | Selection::Indeterminate))
        {
            Selection::Indeterminate
        } else {
            Selection::Unchecked
        };
        assert_eq!(
            node.selection, expected,
            "directory '{}' holds a stale tri-state",
            node.path
        );
    }
}

/// Collection must return exactly the checked file nodes.
fn check_collection(session: &SelectionSession) {
    let collected: HashSet<String> = session.collect_selected().into_iter().collect();

    let mut nodes = Vec::new();
    walk(session.root(), &mut nodes);
    let checked: HashSet<String> = nodes
        .iter()
        .filter(|n| n.kind == EntryKind::File && n.selection == Selection::Checked)
        .map(|n| n.path.clone())
        .collect();

    assert_eq!(collected, checked);
}

fn arb_path() -> impl Strategy<Value = String> {
    let segment = prop::sample::select(vec!["a", "b", "src", "docs", "deep"]);
    let ext = prop::sample::select(vec![".rs", ".md", ".py", ".png"]);
    (prop::collection::vec(segment, 0..3), ext).prop_map(|(dirs, ext)| {
        let mut path = dirs.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str("leaf");
        path.push_str(ext);
        path
    })
}

fn arb_op(path_count: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..path_count, any::<bool>()).prop_map(|(i, c)| Op::Toggle(i, c)),
        any::<bool>().prop_map(Op::SetAll),
        prop::collection::vec(prop::sample::select(vec![".rs", ".md", ".py"]), 0..3)
            .prop_map(|keys| Op::SetFilters(keys.into_iter().map(str::to_string).collect())),
    ]
}

proptest! {
    #[test]
    fn rebuild_from_the_same_listing_is_identical(
        paths in prop::collection::vec(arb_path(), 1..12)
    ) {
        let entries: Vec<TreeEntry> = paths.iter().map(|p| file(p)).collect();
        let a = SelectionSession::new(&entries);
        let b = SelectionSession::new(&entries);

        let mut na = Vec::new();
        let mut nb = Vec::new();
        walk(a.root(), &mut na);
        walk(b.root(), &mut nb);

        let shape = |nodes: &[&Node]| -> Vec<(String, EntryKind)> {
            nodes.iter().map(|n| (n.path.clone(), n.kind)).collect()
        };
        prop_assert_eq!(shape(&na), shape(&nb));
    }

    #[test]
    fn invariants_hold_after_any_interaction_sequence(
        paths in prop::collection::vec(arb_path(), 1..12),
        ops in prop::collection::vec(arb_op(12), 0..20)
    ) {
        let entries: Vec<TreeEntry> = paths.iter().map(|p| file(p)).collect();
        let mut session = SelectionSession::new(&entries);

        for op in ops {
            match op {
                Op::Toggle(i, checked) => {
                    let path = &paths[i % paths.len()];
                    session.toggle(path, checked);
                }
                Op::SetAll(checked) => session.set_all(checked),
                Op::SetFilters(keys) => {
                    session.set_active_filters(keys.into_iter().collect());
                }
            }

            check_filter_monotonicity(&session);
            check_tristate_consistency(&session);
            check_collection(&session);
        }
    }
}

#[test]
fn explicit_directory_entries_merge_with_implicit_ancestors() {
    let session = SelectionSession::new(&[
        dir("src"),
        file("src/main.rs"),
        dir("src/core"),
        file("src/core/engine.rs"),
    ]);
    let selected: BTreeSet<String> = session.collect_selected().into_iter().collect();
    assert_eq!(
        selected,
        BTreeSet::from(["src/main.rs".to_string(), "src/core/engine.rs".to_string()])
    );
}
