//! Page lookup and geometry
//!
//! Helpers shared by the export and import directions: the object-id to
//! page-number index, reference resolution, and per-page media box height.

use std::collections::HashMap;

use lopdf::{Document, Object, ObjectId};

use crate::error::BookmarkError;

/// Map from a page's object reference to its 1-based position in the
/// document. Built once per loaded document, read-only afterwards.
#[derive(Debug)]
pub struct PageIndex {
    pages: HashMap<ObjectId, u32>,
}

impl PageIndex {
    pub fn build(doc: &Document) -> Self {
        let pages = doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| (id, number))
            .collect();
        Self { pages }
    }

    /// 1-based page number for a page object reference.
    pub fn page_number(&self, id: ObjectId) -> Option<u32> {
        self.pages.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Follow an indirect reference, or return the object itself.
pub(crate) fn resolve<'a>(
    doc: &'a Document,
    obj: &'a Object,
) -> Result<&'a Object, BookmarkError> {
    match obj {
        Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|e| BookmarkError::Parse(format!("broken reference {:?}: {}", id, e))),
        other => Ok(other),
    }
}

/// Height of a page, taken from the upper y bound of its `/MediaBox`.
///
/// The media box may live on an ancestor node of the page tree, so the
/// lookup walks `/Parent` links until it finds one.
pub(crate) fn page_height(doc: &Document, page_id: ObjectId) -> Result<f64, BookmarkError> {
    let media_box = inherited_page_attr(doc, page_id, b"MediaBox")?.ok_or_else(|| {
        BookmarkError::Parse(format!("page {:?} has no MediaBox", page_id))
    })?;
    let array = media_box
        .as_array()
        .map_err(|e| BookmarkError::Parse(format!("MediaBox is not an array: {e}")))?;
    number_at(array, 3)
        .ok_or_else(|| BookmarkError::Parse(format!("page {:?} has a non-numeric MediaBox", page_id)))
}

/// Look up a key on the page dictionary, walking up `/Parent` links for
/// inheritable attributes.
fn inherited_page_attr<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BookmarkError> {
    let mut current = page_id;
    loop {
        let dict = doc
            .get_object(current)
            .and_then(Object::as_dict)
            .map_err(|e| BookmarkError::Parse(format!("bad page dictionary {:?}: {}", current, e)))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(resolve(doc, value)?));
        }

        match dict.get(b"Parent") {
            Ok(parent) => {
                current = parent
                    .as_reference()
                    .map_err(|e| BookmarkError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
}

/// Numeric element of a destination or box array, if present and a number.
pub(crate) fn number_at(array: &[Object], index: usize) -> Option<f64> {
    match array.get(index) {
        Some(Object::Integer(v)) => Some(*v as f64),
        Some(Object::Real(v)) => Some(f64::from(*v)),
        _ => None,
    }
}
