use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookmarkError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Bookmark format error: {0}")]
    Format(String),

    #[error("Bookmark indentation error: {0}")]
    Indentation(String),

    #[error("Outline entry has no destination page: {0}")]
    MissingDestination(String),

    #[error("Outline destination page not found: {0}")]
    UnresolvedPage(String),

    #[error("Bookmark targets page {page} but document has {page_count} pages")]
    PageRange { page: u32, page_count: u32 },

    #[error("PDF operation failed: {0}")]
    Operation(String),
}
