//! Rebuilding a document from rendered page bitmaps.
//!
//! Each bitmap becomes a full-page FlateDecode `DeviceRGB` image XObject
//! on a fresh page whose media box is the original page's point size, so
//! geometry survives even though text and vector content do not.

use crate::error::SecurityError;
use crate::raster::RasterPage;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use paperkit_core::{save_document, SaveOptions};
use std::io::Write;

pub struct ImageDocumentBuilder {
    doc: Document,
    pages_root: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl ImageDocumentBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_root = doc.new_object_id();
        Self {
            doc,
            pages_root,
            page_ids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append one rendered page as an image-only PDF page.
    pub fn add_page(&mut self, page: &RasterPage) -> Result<(), SecurityError> {
        let expected = page.width_px as usize * page.height_px as usize * 4;
        if page.rgba.len() != expected {
            return Err(SecurityError::Unsupported(format!(
                "bitmap size mismatch: {} bytes for {}x{} RGBA",
                page.rgba.len(),
                page.width_px,
                page.height_px
            )));
        }

        let image_id = self.doc.add_object(Stream::new(
            Dictionary::from_iter([
                ("Type", Object::Name(b"XObject".to_vec())),
                ("Subtype", Object::Name(b"Image".to_vec())),
                ("Width", Object::Integer(i64::from(page.width_px))),
                ("Height", Object::Integer(i64::from(page.height_px))),
                ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
                ("Filter", Object::Name(b"FlateDecode".to_vec())),
            ]),
            deflate_rgb(&page.rgba)?,
        ));

        // Scale the unit image square up to the full page.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(page.width_pts),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(page.height_pts),
                        Object::Real(0.0),
                        Object::Real(0.0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self.doc.add_object(Stream::new(
            Dictionary::new(),
            content
                .encode()
                .map_err(|e| SecurityError::Unsupported(format!("content encoding: {}", e)))?,
        ));

        let page_id = self.doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_root)),
            (
                "MediaBox",
                Object::Array(vec![
                    0.into(),
                    0.into(),
                    Object::Real(page.width_pts),
                    Object::Real(page.height_pts),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            (
                "Resources",
                Object::Dictionary(Dictionary::from_iter([(
                    "XObject",
                    Object::Dictionary(Dictionary::from_iter([(
                        "Im0",
                        Object::Reference(image_id),
                    )])),
                )])),
            ),
        ]));
        self.page_ids.push(page_id);

        Ok(())
    }

    /// Assemble the page tree and serialize.
    pub fn finish(mut self) -> Result<Vec<u8>, SecurityError> {
        self.doc.objects.insert(
            self.pages_root,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                (
                    "Kids",
                    Object::Array(
                        self.page_ids
                            .iter()
                            .map(|&id| Object::Reference(id))
                            .collect(),
                    ),
                ),
                ("Count", Object::Integer(self.page_ids.len() as i64)),
            ])),
        );

        let catalog_id = self.doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_root)),
        ]));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        Ok(save_document(&mut self.doc, &SaveOptions::default())?)
    }
}

impl Default for ImageDocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop the alpha channel and deflate the remaining RGB samples.
fn deflate_rgb(rgba: &[u8]) -> Result<Vec<u8>, SecurityError> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&rgb)
        .and_then(|_| encoder.finish())
        .map_err(|e| SecurityError::Unsupported(format!("image compression failed: {}", e)))
}
