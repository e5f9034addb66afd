//! Combining multiple documents into one.

use crate::document::{page_ids, save_document, set_page_kids, SaveOptions};
use crate::error::PdfError;
use lopdf::{Document, Object, ObjectId};

/// Merge documents in the given order.
///
/// The first document becomes the destination; every further document has
/// its object ids shifted past the destination's current maximum before
/// its objects and pages are appended, so references never collide.
pub fn merge_documents(inputs: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfError> {
    if inputs.is_empty() {
        return Err(PdfError::Operation("no documents to merge".into()));
    }
    if inputs.len() == 1 {
        let mut inputs = inputs;
        return Ok(inputs.swap_remove(0));
    }

    let mut loaded = Vec::with_capacity(inputs.len());
    for (index, bytes) in inputs.iter().enumerate() {
        let doc = Document::load_mem(bytes)
            .map_err(|e| PdfError::Load(format!("document {}: {}", index + 1, e)))?;
        loaded.push(doc);
    }

    let mut dest = loaded.remove(0);
    let mut combined_pages = page_ids(&dest);

    for source in loaded {
        let offset = dest.max_id;
        let source_pages = page_ids(&source);

        for (old_id, object) in source.objects {
            let new_id = (old_id.0 + offset, old_id.1);
            dest.objects.insert(new_id, shift_refs(object, offset));
        }

        combined_pages.extend(
            source_pages
                .into_iter()
                .map(|id| (id.0 + offset, id.1) as ObjectId),
        );
        dest.max_id = (source.max_id + offset).max(dest.max_id);
    }

    set_page_kids(&mut dest, &combined_pages)?;
    save_document(&mut dest, &SaveOptions::default())
}

/// Recursively shift every indirect reference inside an object.
fn shift_refs(object: Object, offset: u32) -> Object {
    match object {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(items) => {
            Object::Array(items.into_iter().map(|o| shift_refs(o, offset)).collect())
        }
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{load_document, LoadOptions};
    use crate::test_support::{create_test_pdf, create_test_pdf_sized};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            merge_documents(Vec::new()),
            Err(PdfError::Operation(_))
        ));
    }

    #[test]
    fn single_input_passes_through_unchanged() {
        let bytes = create_test_pdf(2);
        let merged = merge_documents(vec![bytes.clone()]).unwrap();
        assert_eq!(merged, bytes);
    }

    #[test]
    fn merged_page_count_is_the_sum() {
        let merged = merge_documents(vec![
            create_test_pdf(2),
            create_test_pdf(3),
            create_test_pdf(1),
        ])
        .unwrap();

        let doc = load_document(&merged, LoadOptions::default()).unwrap();
        assert_eq!(doc.get_pages().len(), 6);
    }

    #[test]
    fn merge_keeps_input_order() {
        // Sizes distinguish the sources: A4 pages first, then letter.
        let a4 = create_test_pdf_sized(1, 595.0, 842.0);
        let letter = create_test_pdf(1);
        let merged = merge_documents(vec![a4, letter]).unwrap();

        let doc = load_document(&merged, LoadOptions::default()).unwrap();
        let pages = page_ids(&doc);
        assert_eq!(crate::document::page_size(&doc, pages[0]), (595.0, 842.0));
        assert_eq!(crate::document::page_size(&doc, pages[1]), (612.0, 792.0));
    }

    #[test]
    fn unparseable_member_reports_its_position() {
        let result = merge_documents(vec![create_test_pdf(1), b"junk".to_vec()]);
        match result {
            Err(PdfError::Load(message)) => assert!(message.contains("document 2")),
            other => panic!("expected load error, got {:?}", other),
        }
    }
}
