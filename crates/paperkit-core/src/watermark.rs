//! Text watermark stamping, single or tiled.

use crate::content::{
    append_page_content, ensure_page_alpha, ensure_page_font, FONT_RESOURCE, GSTATE_RESOURCE,
};
use crate::document::{load_document, page_ids, page_size, save_document, LoadOptions, SaveOptions};
use crate::error::PdfError;
use crate::fonts::text_width;
use lopdf::content::{Content, Operation};
use lopdf::Object;
use serde::{Deserialize, Serialize};

/// Horizontal distance between tiled stamps, in points.
const TILE_STEP_X: f32 = 200.0;
/// Vertical distance between tiled stamps, in points.
const TILE_STEP_Y: f32 = 150.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkOptions {
    pub text: String,
    pub font_size: f32,
    /// 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f32,
    pub rotation_degrees: f32,
    pub color: Rgb,
    /// Repeat the text across the whole page in a fixed grid; boundary
    /// tiles run past the page edge and get clipped by the viewer.
    pub tiled: bool,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 48.0,
            opacity: 0.3,
            rotation_degrees: 45.0,
            color: Rgb {
                r: 0.6,
                g: 0.6,
                b: 0.6,
            },
            tiled: false,
        }
    }
}

/// Stamp the watermark text onto every page.
pub fn add_watermark(bytes: &[u8], options: &WatermarkOptions) -> Result<Vec<u8>, PdfError> {
    let mut doc = load_document(bytes, LoadOptions::default())?;

    for page_id in page_ids(&doc) {
        let (width, height) = page_size(&doc, page_id);
        let positions = stamp_positions(options, width, height);

        ensure_page_font(&mut doc, page_id)?;
        ensure_page_alpha(&mut doc, page_id, options.opacity.clamp(0.0, 1.0))?;
        append_page_content(&mut doc, page_id, watermark_content(options, &positions))?;
    }

    save_document(&mut doc, &SaveOptions::default())
}

/// Grid points for a tiled stamp, or the single centered point otherwise.
///
/// The tiled grid starts at the origin and is inclusive of the first point
/// past each page edge, so the rightmost and topmost tiles are partially
/// clipped instead of leaving an unmarked band.
pub(crate) fn stamp_positions(options: &WatermarkOptions, width: f32, height: f32) -> Vec<(f32, f32)> {
    if !options.tiled {
        let x = (width - text_width(&options.text, options.font_size)) / 2.0;
        return vec![(x, height / 2.0)];
    }

    let mut positions = Vec::new();
    let mut y = 0.0;
    while y <= height + TILE_STEP_Y {
        let mut x = 0.0;
        while x <= width + TILE_STEP_X {
            positions.push((x, y));
            x += TILE_STEP_X;
        }
        y += TILE_STEP_Y;
    }
    positions
}

fn watermark_content(options: &WatermarkOptions, positions: &[(f32, f32)]) -> Content {
    let radians = options.rotation_degrees.to_radians();
    let (sin, cos) = radians.sin_cos();

    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![Object::Name(GSTATE_RESOURCE.as_bytes().to_vec())]),
        Operation::new(
            "rg",
            vec![
                Object::Real(options.color.r),
                Object::Real(options.color.g),
                Object::Real(options.color.b),
            ],
        ),
    ];

    for &(x, y) in positions {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                Object::Real(options.font_size),
            ],
        ));
        // Rotation goes through the text matrix so each stamp pivots
        // around its own anchor point.
        operations.push(Operation::new(
            "Tm",
            vec![
                Object::Real(cos),
                Object::Real(sin),
                Object::Real(-sin),
                Object::Real(cos),
                Object::Real(x),
                Object::Real(y),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(options.text.as_str())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    operations.push(Operation::new("Q", vec![]));
    Content { operations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::page_ids;
    use crate::test_support::create_test_pdf;
    use pretty_assertions::assert_eq;

    fn tiled_options() -> WatermarkOptions {
        WatermarkOptions {
            text: "DRAFT".into(),
            tiled: true,
            ..WatermarkOptions::default()
        }
    }

    #[test]
    fn tiled_grid_covers_page_including_clipped_edge() {
        // 612x792 page: x = 0,200,...,800 (5 columns, 800 <= 612+200)
        // and y = 0,150,...,900 (7 rows, 900 <= 792+150).
        let positions = stamp_positions(&tiled_options(), 612.0, 792.0);
        assert_eq!(positions.len(), 5 * 7);
        assert!(positions.contains(&(0.0, 0.0)));
        assert!(positions.contains(&(800.0, 900.0)));
        for (x, y) in positions {
            assert!(x <= 612.0 + 200.0 && y <= 792.0 + 150.0);
        }
    }

    #[test]
    fn single_stamp_is_centered() {
        let options = WatermarkOptions {
            text: "DRAFT".into(),
            font_size: 48.0,
            tiled: false,
            ..WatermarkOptions::default()
        };
        let positions = stamp_positions(&options, 612.0, 792.0);
        assert_eq!(positions.len(), 1);

        let (x, y) = positions[0];
        assert_eq!(y, 396.0);
        let expected = (612.0 - crate::fonts::text_width("DRAFT", 48.0)) / 2.0;
        assert!((x - expected).abs() < 1e-4);
    }

    #[test]
    fn watermark_appends_content_to_every_page() {
        let bytes = create_test_pdf(2);
        let stamped = add_watermark(&bytes, &tiled_options()).unwrap();

        let doc = load_document(&stamped, LoadOptions::default()).unwrap();
        for page_id in page_ids(&doc) {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content);
            assert!(text.contains("(DRAFT)"));
            assert!(text.contains(&format!("/{}", GSTATE_RESOURCE)));
        }
    }
}
