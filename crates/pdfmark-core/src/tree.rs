//! Bookmark tree data model
//!
//! An outline level is an ordered list of entries. A `Group` entry holds the
//! children of the `Leaf` directly before it; nesting is positional rather
//! than stored on the node itself, mirroring the text format where a deeper
//! indented block follows its parent line.

use serde::{Deserialize, Serialize};

use crate::error::BookmarkError;

/// A single bookmark: a title plus its flattened location.
///
/// `ratio` is the internal page ratio: 0-based page index plus vertical
/// fraction, so 0.0 is the top of the first page. The text format carries
/// 1-based pages; the parser and serializer convert at that boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkNode {
    pub title: String,
    pub ratio: f64,
}

impl BookmarkNode {
    pub fn new(title: impl Into<String>, ratio: f64) -> Self {
        Self {
            title: title.into(),
            ratio,
        }
    }
}

/// One element of an outline level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    Leaf(BookmarkNode),
    Group(OutlineTree),
}

/// An ordered outline level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineTree {
    entries: Vec<Entry>,
}

impl OutlineTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Append a bookmark at this level.
    pub fn push_leaf(&mut self, node: BookmarkNode) {
        self.entries.push(Entry::Leaf(node));
    }

    /// Attach `children` to the most recently pushed leaf.
    ///
    /// Fails if this level has no trailing leaf to own the group, so an
    /// orphaned indent level cannot be constructed.
    pub fn push_group(&mut self, children: OutlineTree) -> Result<(), BookmarkError> {
        match self.entries.last() {
            Some(Entry::Leaf(_)) => {
                self.entries.push(Entry::Group(children));
                Ok(())
            }
            _ => Err(BookmarkError::Indentation(
                "nested bookmarks without a parent entry".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_attaches_to_preceding_leaf() {
        let mut tree = OutlineTree::new();
        tree.push_leaf(BookmarkNode::new("Chapter 1", 0.0));

        let mut children = OutlineTree::new();
        children.push_leaf(BookmarkNode::new("1.1", 0.5));
        tree.push_group(children).unwrap();

        assert_eq!(tree.entries().len(), 2);
        assert!(matches!(tree.entries()[1], Entry::Group(_)));
    }

    #[test]
    fn group_without_leaf_is_rejected() {
        let mut tree = OutlineTree::new();
        let result = tree.push_group(OutlineTree::new());
        assert!(matches!(result, Err(BookmarkError::Indentation(_))));
    }

    #[test]
    fn group_after_group_is_rejected() {
        let mut tree = OutlineTree::new();
        tree.push_leaf(BookmarkNode::new("A", 0.0));
        tree.push_group(OutlineTree::new()).unwrap();
        let result = tree.push_group(OutlineTree::new());
        assert!(matches!(result, Err(BookmarkError::Indentation(_))));
    }

    #[test]
    fn tree_serializes_to_json() {
        let mut tree = OutlineTree::new();
        tree.push_leaf(BookmarkNode::new("Intro", 0.0));
        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains("Intro"));

        let back: OutlineTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
