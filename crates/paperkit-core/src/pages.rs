//! Page-level operations: rotate, remove, reorder, extract.
//!
//! All index arguments are 0-based. Out-of-range indices are skipped, not
//! rejected; a sparse or partially wrong selection still produces a
//! result. Skips are counted and logged for debuggability.

use crate::document::{load_document, page_ids, save_document, set_page_kids, LoadOptions, SaveOptions};
use crate::error::PdfError;
use lopdf::{Document, Object};
use std::collections::HashSet;
use tracing::warn;

/// Add `angles[i]` degrees to page `i`'s current rotation.
///
/// Rotation is cumulative: the entry is added to whatever `/Rotate` the
/// page already carries, then normalized into `[0, 360)`. Pages without a
/// corresponding entry are left alone, as are entries past the last page.
pub fn rotate_pages(bytes: &[u8], angles: &[i32]) -> Result<Vec<u8>, PdfError> {
    let mut doc = load_document(bytes, LoadOptions::default())?;
    rotate_pages_in(&mut doc, angles);
    save_document(&mut doc, &SaveOptions::default())
}

pub fn rotate_pages_in(doc: &mut Document, angles: &[i32]) {
    let pages = page_ids(doc);

    for (index, &delta) in angles.iter().enumerate() {
        let Some(&page_id) = pages.get(index) else {
            warn!(
                skipped = angles.len() - index,
                total = pages.len(),
                "rotation entries past the last page ignored"
            );
            break;
        };

        let Ok(dict) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) else {
            continue;
        };

        let current = dict
            .get(b"Rotate")
            .and_then(Object::as_i64)
            .unwrap_or(0);
        let next = (current + i64::from(delta)).rem_euclid(360);
        dict.set("Rotate", Object::Integer(next));
    }
}

/// Delete the pages at the given 0-based indices.
pub fn remove_pages(bytes: &[u8], indices: &[usize]) -> Result<Vec<u8>, PdfError> {
    let mut doc = load_document(bytes, LoadOptions::default())?;
    remove_pages_in(&mut doc, indices);
    save_document(&mut doc, &SaveOptions::default())
}

pub fn remove_pages_in(doc: &mut Document, indices: &[usize]) {
    let total = doc.get_pages().len();

    let mut page_numbers: Vec<u32> = indices
        .iter()
        .filter(|&&index| index < total)
        .map(|&index| index as u32 + 1)
        .collect();
    page_numbers.sort_unstable();
    page_numbers.dedup();

    let skipped = indices.len() - indices.iter().filter(|&&i| i < total).count();
    if skipped > 0 {
        warn!(skipped, total, "out-of-range page indices ignored");
    }

    // Deleting from the back keeps not-yet-processed page numbers stable.
    for &page_number in page_numbers.iter().rev() {
        doc.delete_pages(&[page_number]);
    }
}

/// Build a document whose pages are the original pages visited in
/// `new_order`. Indices outside the document are filtered out; duplicate
/// indices duplicate the page, which makes this operation double as a
/// page duplicator.
pub fn reorder_pages(bytes: &[u8], new_order: &[usize]) -> Result<Vec<u8>, PdfError> {
    let mut doc = load_document(bytes, LoadOptions::default())?;
    select_pages_in(&mut doc, new_order)?;
    save_document(&mut doc, &SaveOptions::default())
}

/// Keep only the pages at the given indices, in the given order. Same
/// contract as [`reorder_pages`], with subset intent.
pub fn extract_pages(bytes: &[u8], indices: &[usize]) -> Result<Vec<u8>, PdfError> {
    reorder_pages(bytes, indices)
}

pub(crate) fn select_pages_in(doc: &mut Document, order: &[usize]) -> Result<(), PdfError> {
    let pages = page_ids(doc);
    let mut kids = Vec::with_capacity(order.len());
    let mut seen = HashSet::new();
    let mut skipped = 0_usize;

    for &index in order {
        let Some(&page_id) = pages.get(index) else {
            skipped += 1;
            continue;
        };

        if seen.insert(page_id) {
            kids.push(page_id);
        } else {
            // Duplicate occurrence: clone the page dictionary so each kid
            // is a distinct object. Content and resources stay shared.
            let cloned = doc
                .get_object(page_id)
                .and_then(Object::as_dict)
                .map_err(|_| PdfError::Operation("page is not a dictionary".into()))?
                .clone();
            kids.push(doc.add_object(Object::Dictionary(cloned)));
        }
    }

    if skipped > 0 {
        warn!(skipped, total = pages.len(), "out-of-range page indices ignored");
    }

    set_page_kids(doc, &kids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{load_document, LoadOptions};
    use crate::test_support::create_test_pdf;
    use pretty_assertions::assert_eq;

    fn rotation_of(doc: &Document, index: usize) -> i64 {
        let page_id = page_ids(doc)[index];
        doc.get_object(page_id)
            .and_then(Object::as_dict)
            .unwrap()
            .get(b"Rotate")
            .and_then(Object::as_i64)
            .unwrap_or(0)
    }

    #[test]
    fn rotation_is_additive() {
        let bytes = create_test_pdf(2);
        let once = rotate_pages(&bytes, &[90, 180]).unwrap();
        let twice = rotate_pages(&once, &[90]).unwrap();

        let doc = load_document(&twice, LoadOptions::default()).unwrap();
        assert_eq!(rotation_of(&doc, 0), 180);
        assert_eq!(rotation_of(&doc, 1), 180);
    }

    #[test]
    fn four_quarter_turns_return_to_zero() {
        let mut bytes = create_test_pdf(1);
        for _ in 0..4 {
            bytes = rotate_pages(&bytes, &[90]).unwrap();
        }

        let doc = load_document(&bytes, LoadOptions::default()).unwrap();
        assert_eq!(rotation_of(&doc, 0), 0);
    }

    #[test]
    fn negative_rotation_normalizes() {
        let bytes = create_test_pdf(1);
        let rotated = rotate_pages(&bytes, &[-90]).unwrap();

        let doc = load_document(&rotated, LoadOptions::default()).unwrap();
        assert_eq!(rotation_of(&doc, 0), 270);
    }

    #[test]
    fn remove_handles_descending_shift() {
        // Removing indices 0 and 2 from a 3-page document must leave
        // exactly the original middle page.
        let bytes = create_test_pdf(3);
        let result = remove_pages(&bytes, &[0, 2]).unwrap();

        let doc = load_document(&result, LoadOptions::default()).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn remove_ignores_out_of_range_indices() {
        let bytes = create_test_pdf(3);
        let result = remove_pages(&bytes, &[1, 99]).unwrap();

        let doc = load_document(&result, LoadOptions::default()).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn extract_filters_out_of_bounds() {
        // usize has no -1; 0 and a large index cover the same contract.
        let bytes = create_test_pdf(3);
        let result = extract_pages(&bytes, &[0, 99]).unwrap();

        let doc = load_document(&result, LoadOptions::default()).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn reorder_reverses_pages() {
        let bytes = create_test_pdf(3);
        let result = reorder_pages(&bytes, &[2, 1, 0]).unwrap();

        let doc = load_document(&result, LoadOptions::default()).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn reorder_with_duplicates_duplicates_pages() {
        let bytes = create_test_pdf(2);
        let result = reorder_pages(&bytes, &[0, 0, 1]).unwrap();

        let doc = load_document(&result, LoadOptions::default()).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }
}
