//! PDF bookmark import/export
//!
//! This crate converts a PDF's outline (bookmark) tree to a tab-indented
//! text representation and back, using lopdf for document access.
//!
//! Bookmark file format (one line per bookmark):
//!
//! ```text
//! Chapter 1 Title 1 1
//! Chapter 2 Title 2 4
//! \t2.1 SubTitle 2.1 4.2
//! \t\t2.1.1 SubTitle 2.1.1 4.5
//! \t2.2 SubTitle 2.2 7.3
//! Chapter 3 Title 3 8
//! ```
//!
//! Tabs give the nesting depth. The trailing decimal is the page ratio: the
//! integer part is the 1-based page number, the fractional part the vertical
//! position on the page (`.0` top, `.99` near the bottom).

pub mod error;
pub mod export;
pub mod import;
pub mod pages;
pub mod parse;
pub mod ratio;
pub mod serialize;
pub mod tree;

pub use error::BookmarkError;
pub use export::collect_bookmarks;
pub use import::apply_bookmarks;
pub use pages::PageIndex;
pub use parse::parse_bookmarks;
pub use serialize::serialize_bookmarks;
pub use tree::{BookmarkNode, Entry, OutlineTree};

/// Parse PDF bytes and return the page count.
pub fn get_page_count(bytes: &[u8]) -> Result<u32, BookmarkError> {
    let doc = load(bytes)?;
    Ok(doc.get_pages().len() as u32)
}

/// Render a PDF's bookmarks as bookmark text.
pub fn export_bookmarks(bytes: &[u8]) -> Result<String, BookmarkError> {
    let doc = load(bytes)?;
    let tree = collect_bookmarks(&doc)?;
    Ok(serialize_bookmarks(&tree))
}

/// Return a copy of the PDF with the bookmarks from `bookmark_text` as its
/// outline. Nothing is produced on failure.
pub fn import_bookmarks(bytes: &[u8], bookmark_text: &str) -> Result<Vec<u8>, BookmarkError> {
    let tree = parse_bookmarks(bookmark_text)?;
    let mut doc = load(bytes)?;
    apply_bookmarks(&mut doc, &tree)?;

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| BookmarkError::Operation(format!("Failed to save PDF: {e}")))?;
    Ok(buffer)
}

fn load(bytes: &[u8]) -> Result<lopdf::Document, BookmarkError> {
    lopdf::Document::load_mem(bytes).map_err(|e| BookmarkError::Parse(e.to_string()))
}
