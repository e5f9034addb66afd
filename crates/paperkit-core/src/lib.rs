//! Client-side PDF page manipulation.
//!
//! Every operation is a pure transform: it receives file bytes plus a
//! small options value, loads them into an in-memory document, mutates
//! that document, and serializes the result. No state survives a call.
//!
//! Out-of-range page indices and malformed range tokens are skipped
//! rather than rejected throughout; callers always get some result, and
//! skip counts go to the log.

mod content;

pub mod document;
pub mod enhance;
pub mod error;
pub mod fonts;
pub mod merge;
pub mod pages;
pub mod ranges;
pub mod split;
pub mod watermark;

pub use document::{load_document, repair_document, save_document, LoadOptions, SaveOptions};
pub use enhance::{
    add_page_numbers, set_metadata, strip_metadata, MetadataUpdate, NumberPosition, StripLevel,
};
pub use error::PdfError;
pub use merge::merge_documents;
pub use pages::{extract_pages, remove_pages, reorder_pages, rotate_pages};
pub use ranges::{parse_page_groups, parse_pages};
pub use split::{split_document, SplitMode, SplitOptions, SplitOutput};
pub use watermark::{add_watermark, Rgb, WatermarkOptions};

/// Parse PDF bytes and return the page count.
pub fn get_page_count(bytes: &[u8]) -> Result<u32, PdfError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| PdfError::Load(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::create_test_pdf;

    #[test]
    fn page_count_of_generated_pdf() {
        let bytes = create_test_pdf(5);
        assert_eq!(get_page_count(&bytes).unwrap(), 5);
    }

    #[test]
    fn page_count_of_garbage_errors() {
        assert!(get_page_count(b"nope").is_err());
    }
}
