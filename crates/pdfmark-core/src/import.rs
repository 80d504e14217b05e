//! Import direction: bookmark tree into a document's outline dictionaries
//!
//! Builds a fresh `/Outlines` object graph (items linked with `/Parent`,
//! `/Prev`/`/Next`, `/First`/`/Last`/`/Count`) and points the catalog at it,
//! replacing whatever outline the document had. Every destination is written
//! as `[page /FitH top]` so viewers fit the page width at the bookmark's
//! vertical offset.

use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};
use tracing::debug;

use crate::error::BookmarkError;
use crate::pages;
use crate::ratio;
use crate::tree::{BookmarkNode, Entry, OutlineTree};

/// Write `tree` into `doc` as its outline.
///
/// The whole tree is validated against the document's page count before any
/// object is created, so a failed import leaves the document untouched. An
/// empty tree is a no-op.
pub fn apply_bookmarks(doc: &mut Document, tree: &OutlineTree) -> Result<(), BookmarkError> {
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    validate_pages(tree, page_ids.len() as u32)?;

    let items = nest(tree);
    if items.is_empty() {
        debug!("bookmark tree is empty, leaving document outline untouched");
        return Ok(());
    }

    let root_id = doc.new_object_id();
    let (first, last) = write_level(doc, &items, root_id, &page_ids)?;
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => first,
            "Last" => last,
            "Count" => items.len() as i64,
        }),
    );

    let catalog_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => *id,
        _ => return Err(BookmarkError::Parse("document has no catalog".into())),
    };
    let catalog = doc
        .get_object_mut(catalog_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| BookmarkError::Parse(format!("bad catalog: {e}")))?;
    catalog.set("Outlines", root_id);
    catalog.set("PageMode", "UseOutlines");

    debug!(roots = items.len(), "wrote outline tree");
    Ok(())
}

/// A leaf joined with the group that follows it, ready for object creation.
struct OutlineItem {
    node: BookmarkNode,
    children: Vec<OutlineItem>,
}

fn nest(tree: &OutlineTree) -> Vec<OutlineItem> {
    let mut items: Vec<OutlineItem> = Vec::new();
    for entry in tree.entries() {
        match entry {
            Entry::Leaf(node) => items.push(OutlineItem {
                node: node.clone(),
                children: Vec::new(),
            }),
            Entry::Group(children) => {
                // construction guarantees a group follows its leaf
                if let Some(owner) = items.last_mut() {
                    owner.children = nest(children);
                }
            }
        }
    }
    items
}

fn validate_pages(tree: &OutlineTree, page_count: u32) -> Result<(), BookmarkError> {
    for entry in tree.entries() {
        match entry {
            Entry::Leaf(node) => {
                if node.ratio < 0.0 {
                    return Err(BookmarkError::PageRange {
                        page: 0,
                        page_count,
                    });
                }
                let page = node.ratio.floor() as u32;
                if page >= page_count {
                    return Err(BookmarkError::PageRange {
                        page: page + 1,
                        page_count,
                    });
                }
            }
            Entry::Group(children) => validate_pages(children, page_count)?,
        }
    }
    Ok(())
}

/// Create the outline item objects for one level and return the ids of the
/// first and last sibling.
fn write_level(
    doc: &mut Document,
    items: &[OutlineItem],
    parent_id: ObjectId,
    page_ids: &[ObjectId],
) -> Result<(ObjectId, ObjectId), BookmarkError> {
    // ids are assigned up front so sibling links can point forward
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, item) in items.iter().enumerate() {
        let page_index = item.node.ratio.floor() as usize;
        let page_id = page_ids[page_index];
        let page_height = pages::page_height(doc, page_id)?;
        let (_, top) = ratio::from_ratio(item.node.ratio, page_height);

        let mut dict = dictionary! {
            "Title" => Object::String(encode_outline_title(&item.node.title), StringFormat::Hexadecimal),
            "Parent" => parent_id,
            "Dest" => vec![
                Object::Reference(page_id),
                "FitH".into(),
                Object::Real(top as f32),
            ],
        };
        if i > 0 {
            dict.set("Prev", ids[i - 1]);
        }
        if i + 1 < items.len() {
            dict.set("Next", ids[i + 1]);
        }
        if !item.children.is_empty() {
            let (first, last) = write_level(doc, &item.children, ids[i], page_ids)?;
            dict.set("First", first);
            dict.set("Last", last);
            // negative count renders the level collapsed
            dict.set("Count", -(item.children.len() as i64));
        }
        doc.objects.insert(ids[i], Object::Dictionary(dict));
    }

    Ok((ids[0], *ids.last().expect("level is never empty")))
}

/// PDF 1.7 §3.8.1 text string encoding: byte order mark plus UTF-16BE, so
/// viewers render non-ASCII titles correctly.
fn encode_outline_title(title: &str) -> Vec<u8> {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in title.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_bookmarks;

    const HEIGHT: f32 = 792.0;

    fn test_document(num_pages: usize) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut page_ids = Vec::new();
        for _ in 0..num_pages {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), Object::Real(HEIGHT)],
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => num_pages as i64,
                "Kids" => kids,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn outline_root(doc: &Document) -> &lopdf::Dictionary {
        let catalog = doc.catalog().unwrap();
        let root_id = match catalog.get(b"Outlines") {
            Ok(Object::Reference(id)) => *id,
            other => panic!("no outline root: {:?}", other),
        };
        doc.get_object(root_id).and_then(Object::as_dict).unwrap()
    }

    fn item_ref(dict: &lopdf::Dictionary, key: &[u8]) -> ObjectId {
        match dict.get(key) {
            Ok(Object::Reference(id)) => *id,
            other => panic!("missing {:?}: {:?}", String::from_utf8_lossy(key), other),
        }
    }

    #[test]
    fn writes_root_and_sibling_links() {
        let mut doc = test_document(5);
        let tree = parse_bookmarks("Ch1 1.0\nCh2 4.0\nCh3 5.0\n").unwrap();
        apply_bookmarks(&mut doc, &tree).unwrap();

        let root = outline_root(&doc);
        assert_eq!(root.get(b"Count").unwrap().as_i64().unwrap(), 3);

        let first_id = item_ref(root, b"First");
        let first = doc.get_object(first_id).and_then(Object::as_dict).unwrap();
        assert!(first.get(b"Prev").is_err());
        let second_id = item_ref(first, b"Next");
        let second = doc.get_object(second_id).and_then(Object::as_dict).unwrap();
        assert_eq!(item_ref(second, b"Prev"), first_id);
        let third_id = item_ref(second, b"Next");
        assert_eq!(item_ref(root, b"Last"), third_id);
    }

    #[test]
    fn destination_is_fit_h_at_decoded_top() {
        let mut doc = test_document(5);
        let tree = parse_bookmarks("Ch2 4.2\n").unwrap();
        apply_bookmarks(&mut doc, &tree).unwrap();

        let root = outline_root(&doc);
        let item_id = item_ref(root, b"First");
        let item = doc.get_object(item_id).and_then(Object::as_dict).unwrap();
        let dest = item.get(b"Dest").unwrap().as_array().unwrap();

        let expected_page = doc.get_pages()[&4];
        assert_eq!(dest[0], Object::Reference(expected_page));
        assert_eq!(dest[1], Object::Name(b"FitH".to_vec()));
        match dest[2] {
            Object::Real(top) => assert!((f64::from(top) - f64::from(HEIGHT) * 0.8).abs() < 1e-2),
            ref other => panic!("expected numeric top, got {:?}", other),
        }
    }

    #[test]
    fn titles_are_bom_prefixed_utf16() {
        let mut doc = test_document(1);
        let tree = parse_bookmarks("第一章 1.0\n").unwrap();
        apply_bookmarks(&mut doc, &tree).unwrap();

        let root = outline_root(&doc);
        let item_id = item_ref(root, b"First");
        let item = doc.get_object(item_id).and_then(Object::as_dict).unwrap();
        match item.get(b"Title").unwrap() {
            Object::String(bytes, _) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                let units: Vec<u16> = bytes[2..]
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                assert_eq!(String::from_utf16(&units).unwrap(), "第一章");
            }
            other => panic!("expected string title, got {:?}", other),
        }
    }

    #[test]
    fn children_hang_off_their_parent() {
        let mut doc = test_document(8);
        let text = "Chapter 2 4\n\t2.1 4.2\n\t2.2 7.3\n";
        let tree = parse_bookmarks(text).unwrap();
        apply_bookmarks(&mut doc, &tree).unwrap();

        let root = outline_root(&doc);
        assert_eq!(root.get(b"Count").unwrap().as_i64().unwrap(), 1);

        let parent_id = item_ref(root, b"First");
        let parent = doc.get_object(parent_id).and_then(Object::as_dict).unwrap();
        assert_eq!(parent.get(b"Count").unwrap().as_i64().unwrap(), -2);

        let child_id = item_ref(parent, b"First");
        let child = doc.get_object(child_id).and_then(Object::as_dict).unwrap();
        assert_eq!(item_ref(child, b"Parent"), parent_id);
        let last_id = item_ref(child, b"Next");
        assert_eq!(item_ref(parent, b"Last"), last_id);
    }

    #[test]
    fn page_mode_is_set() {
        let mut doc = test_document(1);
        let tree = parse_bookmarks("A 1.0\n").unwrap();
        apply_bookmarks(&mut doc, &tree).unwrap();
        let catalog = doc.catalog().unwrap();
        assert_eq!(
            catalog.get(b"PageMode").unwrap(),
            &Object::Name(b"UseOutlines".to_vec())
        );
    }

    #[test]
    fn out_of_range_page_fails_before_writing() {
        let mut doc = test_document(3);
        let objects_before = doc.objects.len();
        let tree = parse_bookmarks("Ch1 1.0\nCh9 9.0\n").unwrap();

        let result = apply_bookmarks(&mut doc, &tree);
        assert!(matches!(
            result,
            Err(BookmarkError::PageRange {
                page: 9,
                page_count: 3
            })
        ));
        assert_eq!(doc.objects.len(), objects_before);
        assert!(doc.catalog().unwrap().get(b"Outlines").is_err());
    }

    #[test]
    fn empty_tree_is_a_no_op() {
        let mut doc = test_document(2);
        apply_bookmarks(&mut doc, &OutlineTree::new()).unwrap();
        assert!(doc.catalog().unwrap().get(b"Outlines").is_err());
    }
}
