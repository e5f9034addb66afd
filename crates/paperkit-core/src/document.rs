//! Loading, saving and repairing PDF documents.
//!
//! Every operation in this crate is a pure transform: bytes in, a mutable
//! in-memory [`lopdf::Document`], bytes out. Nothing here touches the
//! network or the disk.

use crate::error::PdfError;
use lopdf::{Document, Object, ObjectId};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Load structural metadata even when content streams are encrypted.
    /// Used by the unlock path to inspect a document before deciding how
    /// to recover it.
    pub tolerate_encryption: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SaveOptions {
    /// Prune unreachable objects and compress streams before serializing.
    pub compact: bool,
    /// Set the AcroForm `/NeedAppearances` flag so viewers regenerate
    /// interactive form field appearances. Off by default to keep output
    /// small.
    pub regenerate_form_appearances: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            compact: true,
            regenerate_form_appearances: false,
        }
    }
}

/// Parse a byte buffer into a document.
///
/// Fails when the buffer is not a parseable PDF, or when the document is
/// encrypted and the caller did not opt into tolerating encryption.
pub fn load_document(bytes: &[u8], options: LoadOptions) -> Result<Document, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Load(e.to_string()))?;

    if doc.is_encrypted() && !options.tolerate_encryption {
        return Err(PdfError::Load("document is password protected".into()));
    }

    Ok(doc)
}

/// Serialize a document back to bytes.
pub fn save_document(doc: &mut Document, options: &SaveOptions) -> Result<Vec<u8>, PdfError> {
    if options.regenerate_form_appearances {
        mark_form_appearances_dirty(doc);
    }

    if options.compact {
        doc.prune_objects();
        doc.compress();
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::Save(e.to_string()))?;

    Ok(buffer)
}

/// Round-trip a document through the in-memory model.
///
/// The save step rewrites the cross-reference table from scratch, which
/// resolves many minor structural corruptions in the original byte layout.
/// Encrypted input is decrypted with the empty password when possible so
/// the rewritten file stays readable.
pub fn repair_document(bytes: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut doc = load_document(
        bytes,
        LoadOptions {
            tolerate_encryption: true,
        },
    )?;

    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| PdfError::Load(format!("cannot repair without a password: {}", e)))?;
        strip_encryption_entry(&mut doc);
    }

    save_document(&mut doc, &SaveOptions::default())
}

/// Remove the trailer `/Encrypt` entry after in-memory decryption so the
/// rewritten file is saved as plaintext.
pub(crate) fn strip_encryption_entry(doc: &mut Document) {
    doc.trailer.remove(b"Encrypt");
}

/// Page object ids in reading order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Resolve the document catalog's object id from the trailer.
pub(crate) fn catalog_id(doc: &Document) -> Result<ObjectId, PdfError> {
    doc.trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::Operation("trailer has no Root reference".into()))
}

/// Resolve the root `/Pages` node of the page tree.
pub(crate) fn pages_root_id(doc: &Document) -> Result<ObjectId, PdfError> {
    let catalog = catalog_id(doc)?;
    doc.get_object(catalog)
        .and_then(Object::as_dict)
        .and_then(|dict| dict.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::Operation("catalog has no Pages reference".into()))
}

/// Replace the page tree's `/Kids` with the given page ids, in order, and
/// point each page's `/Parent` back at the root node. Pages dropped from
/// the list become unreachable and are removed by the next compact save.
pub(crate) fn set_page_kids(doc: &mut Document, kids: &[ObjectId]) -> Result<(), PdfError> {
    let root_id = pages_root_id(doc)?;

    for &page_id in kids {
        if let Ok(dict) = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
        {
            dict.set("Parent", Object::Reference(root_id));
        }
    }

    let root = doc
        .get_object_mut(root_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| PdfError::Operation("page tree root is not a dictionary".into()))?;

    root.set(
        "Kids",
        Object::Array(kids.iter().map(|&id| Object::Reference(id)).collect()),
    );
    root.set("Count", Object::Integer(kids.len() as i64));

    Ok(())
}

/// Media box of a page, walking up the page tree for inherited values.
/// Falls back to US Letter when nothing usable is found, so drawing
/// operations always have a geometry to work with.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    const US_LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

    let mut current = page_id;
    for _ in 0..10 {
        let Ok(dict) = doc.get_object(current).and_then(Object::as_dict) else {
            return US_LETTER;
        };

        if let Some(rect) = dict
            .get(b"MediaBox")
            .ok()
            .and_then(|obj| resolve_rect(doc, obj))
        {
            return rect;
        }

        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }

    US_LETTER
}

fn resolve_rect(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let arr = match obj {
        Object::Array(arr) => arr,
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(arr)) => arr,
            _ => return None,
        },
        _ => return None,
    };

    if arr.len() != 4 {
        return None;
    }

    let mut values = [0.0_f32; 4];
    for (slot, obj) in values.iter_mut().zip(arr) {
        *slot = match obj {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            _ => return None,
        };
    }
    Some(values)
}

/// Width and height of a page in points, derived from its media box.
pub fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let rect = media_box(doc, page_id);
    (rect[2] - rect[0], rect[3] - rect[1])
}

fn mark_form_appearances_dirty(doc: &mut Document) {
    let Ok(catalog) = catalog_id(doc) else {
        return;
    };

    let acro_form = doc
        .get_object(catalog)
        .and_then(Object::as_dict)
        .and_then(|dict| dict.get(b"AcroForm"))
        .ok()
        .cloned();

    match acro_form {
        Some(Object::Reference(form_id)) => {
            if let Ok(dict) = doc.get_object_mut(form_id).and_then(Object::as_dict_mut) {
                dict.set("NeedAppearances", Object::Boolean(true));
            }
        }
        Some(Object::Dictionary(mut dict)) => {
            dict.set("NeedAppearances", Object::Boolean(true));
            if let Ok(catalog_dict) = doc.get_object_mut(catalog).and_then(Object::as_dict_mut) {
                catalog_dict.set("AcroForm", Object::Dictionary(dict));
            }
        }
        _ => {}
    }
}
