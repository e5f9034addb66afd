//! Helpers for stamping new drawing content onto existing pages.
//!
//! Pages keep their original content untouched; new operators are appended
//! as an extra content stream, and any resources the operators need (font,
//! graphics state) are registered in the page's `/Resources` dictionary.

use crate::error::PdfError;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Resource name used for the Helvetica font this crate draws with.
pub(crate) const FONT_RESOURCE: &str = "PkHelv";

/// Resource name used for the watermark transparency graphics state.
pub(crate) const GSTATE_RESOURCE: &str = "PkAlpha";

/// Append an encoded content stream to a page, preserving whatever
/// `/Contents` shape the page already has (single reference, array, or
/// nothing at all).
pub(crate) fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    content: Content,
) -> Result<(), PdfError> {
    let encoded = content
        .encode()
        .map_err(|e| PdfError::Operation(format!("failed to encode content stream: {}", e)))?;
    let stream_id = doc.add_object(Object::Stream(Stream::new(Dictionary::new(), encoded)));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| PdfError::Operation("page is not a dictionary".into()))?;

    match page.get(b"Contents").ok().cloned() {
        Some(Object::Reference(existing)) => {
            page.set(
                "Contents",
                Object::Array(vec![
                    Object::Reference(existing),
                    Object::Reference(stream_id),
                ]),
            );
        }
        Some(Object::Array(mut arr)) => {
            arr.push(Object::Reference(stream_id));
            page.set("Contents", Object::Array(arr));
        }
        _ => {
            page.set("Contents", Object::Reference(stream_id));
        }
    }

    Ok(())
}

/// Register a standard Helvetica font under [`FONT_RESOURCE`] in the
/// page's resources. Idempotent.
pub(crate) fn ensure_page_font(doc: &mut Document, page_id: ObjectId) -> Result<(), PdfError> {
    let font = Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]);

    with_page_resources(doc, page_id, |resources| {
        let fonts = match resources.get_mut(b"Font") {
            Ok(Object::Dictionary(fonts)) => fonts,
            _ => {
                resources.set("Font", Object::Dictionary(Dictionary::new()));
                match resources.get_mut(b"Font") {
                    Ok(Object::Dictionary(fonts)) => fonts,
                    _ => return,
                }
            }
        };
        if !fonts.has(FONT_RESOURCE.as_bytes()) {
            fonts.set(FONT_RESOURCE, Object::Dictionary(font));
        }
    })
}

/// Register a transparency graphics state with the given alpha under
/// [`GSTATE_RESOURCE`] in the page's resources.
pub(crate) fn ensure_page_alpha(
    doc: &mut Document,
    page_id: ObjectId,
    alpha: f32,
) -> Result<(), PdfError> {
    let gstate = Dictionary::from_iter([
        ("Type", Object::Name(b"ExtGState".to_vec())),
        ("CA", Object::Real(alpha)),
        ("ca", Object::Real(alpha)),
    ]);

    with_page_resources(doc, page_id, |resources| {
        let states = match resources.get_mut(b"ExtGState") {
            Ok(Object::Dictionary(states)) => states,
            _ => {
                resources.set("ExtGState", Object::Dictionary(Dictionary::new()));
                match resources.get_mut(b"ExtGState") {
                    Ok(Object::Dictionary(states)) => states,
                    _ => return,
                }
            }
        };
        states.set(GSTATE_RESOURCE, Object::Dictionary(gstate));
    })
}

/// Run a mutation against the page's `/Resources` dictionary, resolving
/// the indirect-reference case and creating an empty dictionary when the
/// page has none.
fn with_page_resources<F>(doc: &mut Document, page_id: ObjectId, mutate: F) -> Result<(), PdfError>
where
    F: FnOnce(&mut Dictionary),
{
    let resources = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|_| PdfError::Operation("page is not a dictionary".into()))?
        .get(b"Resources")
        .ok()
        .cloned();

    match resources {
        Some(Object::Reference(resources_id)) => {
            let dict = doc
                .get_object_mut(resources_id)
                .and_then(Object::as_dict_mut)
                .map_err(|_| PdfError::Operation("page resources are not a dictionary".into()))?;
            mutate(dict);
        }
        Some(Object::Dictionary(mut dict)) => {
            mutate(&mut dict);
            set_page_entry(doc, page_id, "Resources", Object::Dictionary(dict))?;
        }
        _ => {
            let mut dict = Dictionary::new();
            mutate(&mut dict);
            set_page_entry(doc, page_id, "Resources", Object::Dictionary(dict))?;
        }
    }

    Ok(())
}

fn set_page_entry(
    doc: &mut Document,
    page_id: ObjectId,
    key: &str,
    value: Object,
) -> Result<(), PdfError> {
    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| PdfError::Operation("page is not a dictionary".into()))?;
    page.set(key, value);
    Ok(())
}
