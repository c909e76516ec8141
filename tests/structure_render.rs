//! Integration tests for the deterministic structure renderer.

use repotext::core::structure::render_structure;

#[test]
fn single_nested_file_renders_the_documented_shape() {
    let rendered = render_structure(&["a/b/c.txt"]);
    assert_eq!(
        rendered,
        "Selected Files Structure:\n\
         ./\n\
         └── a\n\
         \u{20}   └── b\n\
         \u{20}       └── c.txt\n\
         \n"
    );
}

#[test]
fn empty_selection_says_so_explicitly() {
    let rendered = render_structure(&[] as &[&str]);
    assert_eq!(rendered, "Selected Files Structure:\n(No files selected)\n");
    assert!(!rendered.trim().is_empty());
}

#[test]
fn rendering_is_independent_of_input_order() {
    let forward = render_structure(&["src/main.rs", "src/lib.rs", "README.md"]);
    let backward = render_structure(&["README.md", "src/lib.rs", "src/main.rs"]);
    assert_eq!(forward, backward);
}

#[test]
fn rendering_twice_is_byte_identical() {
    let paths = ["a/x.py", "a/b/y.py", "docs/guide.md"];
    assert_eq!(render_structure(&paths), render_structure(&paths));
}

#[test]
fn levels_sort_alphabetically() {
    let rendered = render_structure(&["zz.txt", "aa/inner.txt"]);
    insta::assert_snapshot!(rendered, @r"
    Selected Files Structure:
    ./
    ├── aa
    │   └── inner.txt
    └── zz.txt
    ");
}

#[test]
fn siblings_after_a_directory_keep_the_continuation_rail() {
    let rendered = render_structure(&[
        "src/core/session.rs",
        "src/core/structure.rs",
        "src/main.rs",
        "Cargo.toml",
    ]);
    insta::assert_snapshot!(rendered, @r"
    Selected Files Structure:
    ./
    ├── Cargo.toml
    └── src
        ├── core
        │   ├── session.rs
        │   └── structure.rs
        └── main.rs
    ");
}

#[test]
fn duplicate_paths_collapse_to_one_node() {
    assert_eq!(
        render_structure(&["a.txt", "a.txt"]),
        render_structure(&["a.txt"])
    );
}

#[test]
fn deep_single_chain_indents_once_per_level() {
    let rendered = render_structure(&["one/two/three/four.md"]);
    insta::assert_snapshot!(rendered, @r"
    Selected Files Structure:
    ./
    └── one
        └── two
            └── three
                └── four.md
    ");
}
