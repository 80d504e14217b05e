//! Export direction: native outline tree to a ratio-annotated bookmark tree
//!
//! Walks the document catalog's `/Outlines` chain (`/First` children,
//! `/Next` siblings), resolves every destination to a 1-based page number
//! through the [`PageIndex`], and folds the destination geometry into a page
//! ratio on each node.

use std::collections::HashSet;

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::BookmarkError;
use crate::pages::{self, PageIndex};
use crate::ratio;
use crate::tree::{BookmarkNode, OutlineTree};

/// Collect a document's bookmarks into an outline tree.
///
/// A document without an `/Outlines` entry yields an empty tree. Any entry
/// whose destination is missing or cannot be mapped to a page aborts the
/// whole export: nothing is returned on failure.
pub fn collect_bookmarks(doc: &Document) -> Result<OutlineTree, BookmarkError> {
    let index = PageIndex::build(doc);

    let Some(first) = first_outline_item(doc)? else {
        debug!("document has no outline tree");
        return Ok(OutlineTree::new());
    };
    let tree = collect_level(doc, &index, first)?;
    debug!(entries = tree.entries().len(), "collected outline tree");
    Ok(tree)
}

fn first_outline_item(doc: &Document) -> Result<Option<ObjectId>, BookmarkError> {
    let catalog = doc
        .catalog()
        .map_err(|e| BookmarkError::Parse(format!("document has no catalog: {e}")))?;
    let outlines = match catalog.get(b"Outlines") {
        Ok(obj) => pages::resolve(doc, obj)?,
        Err(_) => return Ok(None),
    };
    let dict = match outlines.as_dict() {
        Ok(dict) => dict,
        Err(_) => return Ok(None),
    };
    match dict.get(b"First") {
        Ok(Object::Reference(id)) => Ok(Some(*id)),
        _ => Ok(None),
    }
}

fn collect_level(
    doc: &Document,
    index: &PageIndex,
    first: ObjectId,
) -> Result<OutlineTree, BookmarkError> {
    let mut tree = OutlineTree::new();
    let mut current = Some(first);
    // guards against cyclic /Next chains in damaged files
    let mut visited = HashSet::new();

    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }

        let dict = doc
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| BookmarkError::Parse(format!("bad outline item {:?}: {}", id, e)))?;

        let title = outline_title(doc, dict)?;
        tree.push_leaf(bookmark_node(doc, index, dict, title)?);

        if let Ok(Object::Reference(child)) = dict.get(b"First") {
            let children = collect_level(doc, index, *child)?;
            if !children.is_empty() {
                tree.push_group(children)?;
            }
        }

        current = match dict.get(b"Next") {
            Ok(Object::Reference(next)) => Some(*next),
            _ => None,
        };
    }

    Ok(tree)
}

fn bookmark_node(
    doc: &Document,
    index: &PageIndex,
    dict: &lopdf::Dictionary,
    title: String,
) -> Result<BookmarkNode, BookmarkError> {
    let dest = destination_array(doc, dict)?
        .ok_or_else(|| BookmarkError::MissingDestination(title.clone()))?;

    let page_ref = match dest.first() {
        Some(Object::Reference(id)) => *id,
        _ => return Err(BookmarkError::MissingDestination(title)),
    };
    let page_number = index.page_number(page_ref).ok_or_else(|| {
        BookmarkError::UnresolvedPage(format!(
            "'{}' points at object ({} {}) which is not a page",
            title, page_ref.0, page_ref.1
        ))
    })?;
    let page_height = pages::page_height(doc, page_ref)?;

    let (top, zoom) = dest_top_and_zoom(&dest);
    let ratio = ratio::to_ratio(
        page_number,
        top.unwrap_or(page_height),
        zoom.unwrap_or(1.0),
        page_height,
    ) - 1.0;

    Ok(BookmarkNode::new(title, ratio))
}

fn outline_title(doc: &Document, dict: &lopdf::Dictionary) -> Result<String, BookmarkError> {
    match dict.get(b"Title") {
        Ok(obj) => match pages::resolve(doc, obj)? {
            Object::String(bytes, _) => Ok(decode_text(bytes)),
            _ => Ok(String::new()),
        },
        Err(_) => Ok(String::new()),
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
fn decode_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

/// Find an item's explicit destination array.
///
/// Checks `/Dest` first, then a `/A` GoTo action's `/D`. Named destinations
/// are looked up in the catalog before returning.
fn destination_array(
    doc: &Document,
    dict: &lopdf::Dictionary,
) -> Result<Option<Vec<Object>>, BookmarkError> {
    if let Ok(dest) = dict.get(b"Dest") {
        return dest_to_array(doc, dest);
    }

    if let Ok(action) = dict.get(b"A") {
        if let Ok(action) = pages::resolve(doc, action)?.as_dict() {
            let is_goto = matches!(action.get(b"S"), Ok(Object::Name(s)) if s == b"GoTo");
            if is_goto {
                if let Ok(dest) = action.get(b"D") {
                    return dest_to_array(doc, dest);
                }
            }
        }
    }

    Ok(None)
}

fn dest_to_array(doc: &Document, dest: &Object) -> Result<Option<Vec<Object>>, BookmarkError> {
    match pages::resolve(doc, dest)? {
        Object::Array(array) => Ok(Some(array.clone())),
        Object::String(bytes, _) => {
            let name = decode_text(bytes);
            named_destination(doc, name.as_bytes())
        }
        Object::Name(name) => named_destination(doc, name),
        _ => Ok(None),
    }
}

/// Resolve a named destination via the catalog's `/Names` → `/Dests` name
/// tree, falling back to the older flat `/Dests` dictionary.
fn named_destination(doc: &Document, name: &[u8]) -> Result<Option<Vec<Object>>, BookmarkError> {
    let catalog = doc
        .catalog()
        .map_err(|e| BookmarkError::Parse(format!("document has no catalog: {e}")))?;

    if let Ok(names) = catalog.get(b"Names") {
        if let Ok(names) = pages::resolve(doc, names)?.as_dict() {
            if let Ok(dests) = names.get(b"Dests") {
                if let Ok(dests) = pages::resolve(doc, dests)?.as_dict() {
                    if let Some(found) = lookup_name_tree(doc, dests, name)? {
                        return Ok(Some(found));
                    }
                }
            }
        }
    }

    if let Ok(dests) = catalog.get(b"Dests") {
        if let Ok(dests) = pages::resolve(doc, dests)?.as_dict() {
            if let Ok(value) = dests.get(name) {
                return named_value_to_array(doc, value);
            }
        }
    }

    Ok(None)
}

/// Search a name tree node: leaf `/Names` arrays hold `[key value ...]`
/// pairs, interior nodes delegate through `/Kids`.
fn lookup_name_tree(
    doc: &Document,
    node: &lopdf::Dictionary,
    name: &[u8],
) -> Result<Option<Vec<Object>>, BookmarkError> {
    if let Ok(entries) = node.get(b"Names") {
        if let Object::Array(entries) = pages::resolve(doc, entries)? {
            for pair in entries.chunks_exact(2) {
                let key = match pages::resolve(doc, &pair[0])? {
                    Object::String(bytes, _) => bytes.as_slice(),
                    Object::Name(bytes) => bytes.as_slice(),
                    _ => continue,
                };
                if key == name {
                    return named_value_to_array(doc, &pair[1]);
                }
            }
        }
    }

    if let Ok(kids) = node.get(b"Kids") {
        if let Object::Array(kids) = pages::resolve(doc, kids)? {
            for kid in kids {
                if let Ok(kid) = pages::resolve(doc, kid)?.as_dict() {
                    if let Some(found) = lookup_name_tree(doc, kid, name)? {
                        return Ok(Some(found));
                    }
                }
            }
        }
    }

    Ok(None)
}

/// A named destination's value is either the array itself or a dictionary
/// wrapping it under `/D`.
fn named_value_to_array(
    doc: &Document,
    value: &Object,
) -> Result<Option<Vec<Object>>, BookmarkError> {
    match pages::resolve(doc, value)? {
        Object::Array(array) => Ok(Some(array.clone())),
        Object::Dictionary(dict) => match dict.get(b"D") {
            Ok(inner) => match pages::resolve(doc, inner)? {
                Object::Array(array) => Ok(Some(array.clone())),
                _ => Ok(None),
            },
            Err(_) => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Vertical offset and zoom of a destination array, when its fit mode
/// carries them: `[page /XYZ left top zoom]`, `[page /FitH top]`,
/// `[page /FitBH top]`. Null entries and a zoom of 0 mean "unchanged" and
/// count as absent.
fn dest_top_and_zoom(dest: &[Object]) -> (Option<f64>, Option<f64>) {
    let fit = match dest.get(1) {
        Some(Object::Name(name)) => name.as_slice(),
        _ => return (None, None),
    };
    match fit {
        b"XYZ" => (
            pages::number_at(dest, 3),
            pages::number_at(dest, 4).filter(|zoom| *zoom != 0.0),
        ),
        b"FitH" | b"FitBH" => (pages::number_at(dest, 2), None),
        _ => (None, None),
    }
}
