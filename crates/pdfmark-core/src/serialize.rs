//! Bookmark tree to tab-indented text
//!
//! Inverse of [`crate::parse`]: leaves emit one line each, groups emit
//! nothing themselves and only deepen the indentation of their children.

use std::fmt::Write;

use crate::tree::{Entry, OutlineTree};

/// Render an outline tree in the bookmark text format.
///
/// Ratios are written 1-based with two decimal digits, so a node at the top
/// of the first page comes out as `1.00`.
pub fn serialize_bookmarks(tree: &OutlineTree) -> String {
    let mut out = String::new();
    write_level(tree, 0, &mut out);
    out
}

fn write_level(tree: &OutlineTree, depth: usize, out: &mut String) {
    for entry in tree.entries() {
        match entry {
            Entry::Leaf(node) => {
                for _ in 0..depth {
                    out.push('\t');
                }
                let _ = writeln!(out, "{} {:.2}", node.title, node.ratio + 1.0);
            }
            Entry::Group(children) => write_level(children, depth + 1, out),
        }
    }
}
