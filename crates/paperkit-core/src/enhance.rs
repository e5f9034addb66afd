//! Document enhancement: metadata editing, size-oriented metadata
//! stripping, and page numbering.

use crate::content::{append_page_content, ensure_page_font, FONT_RESOURCE};
use crate::document::{
    catalog_id, load_document, page_ids, save_document, LoadOptions, SaveOptions,
};
use crate::error::PdfError;
use crate::fonts::text_width;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::{Deserialize, Serialize};

/// Producer/creator identifier written when stripping metadata.
pub const APP_IDENTIFIER: &str = "Paperkit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripLevel {
    /// Keep metadata; serialize without compaction for maximum viewer
    /// compatibility.
    Low,
    /// Clear descriptive fields, rewrite producer/creator, compact output.
    Recommended,
    /// Everything `Recommended` does, plus best-effort removal of optional
    /// structural dictionaries (tag tree, piece info, named destinations,
    /// XMP metadata stream).
    Extreme,
}

/// Partial metadata update; only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub producer: Option<String>,
    pub creator: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberPosition {
    BottomLeft,
    BottomCenter,
    BottomRight,
}

const NUMBER_FONT_SIZE: f32 = 12.0;
const NUMBER_BASELINE_Y: f32 = 30.0;
const NUMBER_MARGIN: f32 = 40.0;

/// Set document information fields. Omitted fields are left untouched.
pub fn set_metadata(bytes: &[u8], update: &MetadataUpdate) -> Result<Vec<u8>, PdfError> {
    let mut doc = load_document(bytes, LoadOptions::default())?;
    apply_metadata(&mut doc, update)?;
    save_document(&mut doc, &SaveOptions::default())
}

/// Strip metadata for size and privacy, per [`StripLevel`].
pub fn strip_metadata(bytes: &[u8], level: StripLevel) -> Result<Vec<u8>, PdfError> {
    let mut doc = load_document(bytes, LoadOptions::default())?;

    if level != StripLevel::Low {
        let info_id = ensure_info_dict(&mut doc)?;
        if let Ok(info) = doc.get_object_mut(info_id).and_then(Object::as_dict_mut) {
            for key in ["Title", "Author", "Subject", "Keywords"] {
                info.remove(key.as_bytes());
            }
            info.set("Producer", Object::string_literal(APP_IDENTIFIER));
            info.set("Creator", Object::string_literal(APP_IDENTIFIER));
        }
    }

    if level == StripLevel::Extreme {
        strip_optional_structures(&mut doc);
    }

    save_document(
        &mut doc,
        &SaveOptions {
            compact: level != StripLevel::Low,
            ..SaveOptions::default()
        },
    )
}

/// Stamp an incrementing page number onto every page.
pub fn add_page_numbers(
    bytes: &[u8],
    position: NumberPosition,
    start_number: u32,
) -> Result<Vec<u8>, PdfError> {
    let mut doc = load_document(bytes, LoadOptions::default())?;

    let pages = page_ids(&doc);
    for (index, &page_id) in pages.iter().enumerate() {
        let label = (start_number + index as u32).to_string();
        let (width, _) = crate::document::page_size(&doc, page_id);
        let label_width = text_width(&label, NUMBER_FONT_SIZE);

        let x = match position {
            NumberPosition::BottomLeft => NUMBER_MARGIN,
            NumberPosition::BottomCenter => (width - label_width) / 2.0,
            NumberPosition::BottomRight => width - NUMBER_MARGIN - label_width,
        };

        ensure_page_font(&mut doc, page_id)?;
        append_page_content(&mut doc, page_id, number_stamp(&label, x))?;
    }

    save_document(&mut doc, &SaveOptions::default())
}

fn number_stamp(label: &str, x: f32) -> Content {
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                    Object::Real(NUMBER_FONT_SIZE),
                ],
            ),
            Operation::new(
                "Td",
                vec![Object::Real(x), Object::Real(NUMBER_BASELINE_Y)],
            ),
            Operation::new("Tj", vec![Object::string_literal(label)]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    }
}

fn apply_metadata(doc: &mut Document, update: &MetadataUpdate) -> Result<(), PdfError> {
    let info_id = ensure_info_dict(doc)?;
    let info = doc
        .get_object_mut(info_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| PdfError::Operation("Info is not a dictionary".into()))?;

    let fields = [
        ("Title", &update.title),
        ("Author", &update.author),
        ("Subject", &update.subject),
        ("Keywords", &update.keywords),
        ("Producer", &update.producer),
        ("Creator", &update.creator),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            info.set(key, Object::string_literal(value.as_str()));
        }
    }

    Ok(())
}

/// Resolve the trailer's `/Info` dictionary, creating one when the
/// document has none.
fn ensure_info_dict(doc: &mut Document) -> Result<ObjectId, PdfError> {
    if let Ok(Object::Reference(info_id)) = doc.trailer.get(b"Info") {
        let info_id = *info_id;
        if doc
            .get_object(info_id)
            .map(|obj| obj.as_dict().is_ok())
            .unwrap_or(false)
        {
            return Ok(info_id);
        }
    }

    let info_id = doc.add_object(Object::Dictionary(Dictionary::new()));
    doc.trailer.set("Info", Object::Reference(info_id));
    Ok(info_id)
}

/// Best-effort removal of optional structural dictionaries. Each entry is
/// a no-op when absent.
fn strip_optional_structures(doc: &mut Document) {
    let Ok(catalog) = catalog_id(doc) else {
        return;
    };

    let names = if let Ok(dict) = doc.get_object_mut(catalog).and_then(Object::as_dict_mut) {
        // Accessibility tag tree.
        dict.remove(b"StructTreeRoot");
        dict.remove(b"MarkInfo");
        // Application-specific piece info.
        dict.remove(b"PieceInfo");
        // Legacy named-destinations table, plus the XMP metadata stream.
        dict.remove(b"Dests");
        dict.remove(b"Metadata");
        dict.get(b"Names").ok().cloned()
    } else {
        None
    };

    // Named destinations inside the catalog's name dictionary.
    match names {
        Some(Object::Reference(names_id)) => {
            if let Ok(dict) = doc.get_object_mut(names_id).and_then(Object::as_dict_mut) {
                dict.remove(b"Dests");
            }
        }
        Some(Object::Dictionary(mut dict)) => {
            dict.remove(b"Dests");
            if let Ok(catalog_dict) = doc.get_object_mut(catalog).and_then(Object::as_dict_mut) {
                catalog_dict.set("Names", Object::Dictionary(dict));
            }
        }
        _ => {}
    }

    // Per-page piece info.
    for page_id in page_ids(doc) {
        if let Ok(dict) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            dict.remove(b"PieceInfo");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_pdf;
    use pretty_assertions::assert_eq;

    fn info_field(doc: &Document, key: &[u8]) -> Option<String> {
        let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
        let info = doc.get_object(info_id).and_then(Object::as_dict).ok()?;
        match info.get(key) {
            Ok(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    #[test]
    fn set_metadata_is_partial() {
        let bytes = create_test_pdf(1);
        let with_title = set_metadata(
            &bytes,
            &MetadataUpdate {
                title: Some("Quarterly Report".into()),
                author: Some("Alex".into()),
                ..MetadataUpdate::default()
            },
        )
        .unwrap();

        // A second update touching only the author must keep the title.
        let updated = set_metadata(
            &with_title,
            &MetadataUpdate {
                author: Some("Sam".into()),
                ..MetadataUpdate::default()
            },
        )
        .unwrap();

        let doc = load_document(&updated, LoadOptions::default()).unwrap();
        assert_eq!(info_field(&doc, b"Title").as_deref(), Some("Quarterly Report"));
        assert_eq!(info_field(&doc, b"Author").as_deref(), Some("Sam"));
    }

    #[test]
    fn strip_clears_descriptive_fields_and_brands_producer() {
        let bytes = create_test_pdf(1);
        let tagged = set_metadata(
            &bytes,
            &MetadataUpdate {
                title: Some("Secret".into()),
                keywords: Some("internal".into()),
                ..MetadataUpdate::default()
            },
        )
        .unwrap();

        let stripped = strip_metadata(&tagged, StripLevel::Recommended).unwrap();
        let doc = load_document(&stripped, LoadOptions::default()).unwrap();

        assert_eq!(info_field(&doc, b"Title"), None);
        assert_eq!(info_field(&doc, b"Keywords"), None);
        assert_eq!(info_field(&doc, b"Producer").as_deref(), Some(APP_IDENTIFIER));
        assert_eq!(info_field(&doc, b"Creator").as_deref(), Some(APP_IDENTIFIER));
    }

    #[test]
    fn low_level_strip_keeps_metadata() {
        let bytes = create_test_pdf(1);
        let tagged = set_metadata(
            &bytes,
            &MetadataUpdate {
                title: Some("Keep me".into()),
                ..MetadataUpdate::default()
            },
        )
        .unwrap();

        let output = strip_metadata(&tagged, StripLevel::Low).unwrap();
        let doc = load_document(&output, LoadOptions::default()).unwrap();
        assert_eq!(info_field(&doc, b"Title").as_deref(), Some("Keep me"));
    }

    #[test]
    fn extreme_strip_drops_optional_structures() {
        let bytes = create_test_pdf(1);
        let mut doc = load_document(&bytes, LoadOptions::default()).unwrap();

        let catalog = catalog_id(&doc).unwrap();
        doc.get_object_mut(catalog)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("PieceInfo", Object::Dictionary(Dictionary::new()));
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();

        let stripped = strip_metadata(&buffer, StripLevel::Extreme).unwrap();
        let doc = load_document(&stripped, LoadOptions::default()).unwrap();
        let catalog = catalog_id(&doc).unwrap();
        let catalog_dict = doc.get_object(catalog).and_then(Object::as_dict).unwrap();
        assert!(catalog_dict.get(b"PieceInfo").is_err());
    }

    #[test]
    fn page_numbers_stamp_every_page() {
        let bytes = create_test_pdf(3);
        let numbered = add_page_numbers(&bytes, NumberPosition::BottomCenter, 1).unwrap();

        let doc = load_document(&numbered, LoadOptions::default()).unwrap();
        for page_id in page_ids(&doc) {
            let contents = doc
                .get_object(page_id)
                .and_then(Object::as_dict)
                .unwrap()
                .get(b"Contents")
                .unwrap();
            assert!(matches!(contents, Object::Array(arr) if arr.len() == 2));
        }
    }

    #[test]
    fn page_numbers_respect_start_number() {
        let bytes = create_test_pdf(2);
        let numbered = add_page_numbers(&bytes, NumberPosition::BottomLeft, 7).unwrap();

        let doc = load_document(&numbered, LoadOptions::default()).unwrap();
        let page_id = *page_ids(&doc).last().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("(8)"), "expected numeral 8 in {:?}", text);
    }
}
