//! Tab-indented bookmark text parser
//!
//! Each non-blank line is `<tabs><title> <page.fraction>`: the number of
//! leading tabs is the nesting depth, the title may contain spaces, and the
//! last whitespace-separated decimal is the page ratio. Page numbers in the
//! file are 1-based; parsed nodes store `literal - 1` (see [`crate::tree`]).

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::BookmarkError;
use crate::tree::{BookmarkNode, OutlineTree};

lazy_static! {
    static ref LINE_RE: Regex = Regex::new(r"^\s*(.*?)\s+(\d+\.?\d*)\s*$").unwrap();
}

/// Parse bookmark text into an outline tree.
///
/// The whole input is parsed or nothing is: any malformed line aborts with
/// no partial tree.
pub fn parse_bookmarks(text: &str) -> Result<OutlineTree, BookmarkError> {
    // stack[d] is the outline level at depth d along the rightmost path;
    // popped levels are folded into their parent as groups
    let mut stack: Vec<OutlineTree> = vec![OutlineTree::new()];
    let mut last_level = 0usize;

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let caps = LINE_RE
            .captures(line)
            .ok_or_else(|| format_error(idx, line))?;
        let title = caps.get(1).map_or("", |m| m.as_str());
        if title.is_empty() {
            return Err(format_error(idx, line));
        }
        let literal: f64 = caps[2].parse().map_err(|_| format_error(idx, line))?;

        let level = line.chars().take_while(|&c| c == '\t').count();
        if level > last_level + 1 {
            return Err(BookmarkError::Indentation(format!(
                "line {}: jumped from level {} to {}: {:?}",
                idx + 1,
                last_level,
                level,
                line
            )));
        }

        if level == last_level + 1 {
            // start the child list of the node just pushed
            stack.push(OutlineTree::new());
        } else {
            ascend_to(&mut stack, level + 1)?;
        }

        let top = stack.last_mut().expect("parser stack is never empty");
        top.push_leaf(BookmarkNode::new(title, literal - 1.0));
        last_level = level;
    }

    ascend_to(&mut stack, 1)?;
    Ok(stack.pop().expect("parser stack is never empty"))
}

/// Fold completed levels back into their parents until `depth` levels remain.
fn ascend_to(stack: &mut Vec<OutlineTree>, depth: usize) -> Result<(), BookmarkError> {
    while stack.len() > depth {
        let group = stack.pop().expect("parser stack is never empty");
        stack
            .last_mut()
            .expect("parser stack is never empty")
            .push_group(group)?;
    }
    Ok(())
}

fn format_error(idx: usize, line: &str) -> BookmarkError {
    BookmarkError::Format(format!("line {}: {:?}", idx + 1, line))
}
