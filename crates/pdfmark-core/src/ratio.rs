//! Page-ratio codec
//!
//! A bookmark location is flattened into a single float: the integer part is
//! the page number and the fractional part is the vertical position on that
//! page (0.0 = top of page, approaching 1.0 = bottom).

/// Fold a destination into a page ratio.
///
/// `page_number` is 1-based. `top` is the destination's vertical offset in
/// page space, where the top edge of the page is `page_height`; destinations
/// that omit the offset should pass `top = page_height`, which yields a
/// fraction of 0. Destinations that omit the zoom should pass `zoom = 1.0`.
pub fn to_ratio(page_number: u32, top: f64, zoom: f64, page_height: f64) -> f64 {
    f64::from(page_number) + (1.0 - top / zoom / page_height)
}

/// Unfold a page ratio into a page number and a vertical top offset.
///
/// The page is recovered by truncation, under whichever numbering the caller
/// stored the ratio with. Exact inverse of [`to_ratio`] at zoom 1.
pub fn from_ratio(ratio: f64, page_height: f64) -> (u32, f64) {
    let page = ratio.floor();
    let top = page_height * (1.0 - (ratio - page));
    (page as u32, top)
}
