//! Byte-in / byte-out bindings for every PDF operation.
//!
//! Each export takes file bytes (plus a small options value deserialized
//! from JavaScript) and returns the transformed bytes. JavaScript keeps
//! no document state between calls.

use js_sys::{Array, Object, Reflect, Uint8Array};
use paperkit_core::{
    MetadataUpdate, NumberPosition, SplitOptions, StripLevel, WatermarkOptions,
};
use paperkit_security::StructuralUnlock;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn op_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn options_err(e: serde_wasm_bindgen::Error) -> JsValue {
    JsValue::from_str(&format!("Invalid options: {}", e))
}

/// Rotate pages by per-page deltas, parallel to page order. Angles are
/// added to each page's existing /Rotate value; a zero delta leaves the
/// page untouched.
#[wasm_bindgen]
pub fn rotate_pages(bytes: &[u8], angles: &[i32]) -> Result<Vec<u8>, JsValue> {
    paperkit_core::rotate_pages(bytes, angles).map_err(op_err)
}

/// Remove pages by zero-based index. Out-of-range indices are skipped.
#[wasm_bindgen]
pub fn remove_pages(bytes: &[u8], indices: &[u32]) -> Result<Vec<u8>, JsValue> {
    let indices: Vec<usize> = indices.iter().map(|&i| i as usize).collect();
    paperkit_core::remove_pages(bytes, &indices).map_err(op_err)
}

/// Rebuild the page tree in the given zero-based order. Indices may
/// repeat to duplicate a page.
#[wasm_bindgen]
pub fn reorder_pages(bytes: &[u8], new_order: &[u32]) -> Result<Vec<u8>, JsValue> {
    let new_order: Vec<usize> = new_order.iter().map(|&i| i as usize).collect();
    paperkit_core::reorder_pages(bytes, &new_order).map_err(op_err)
}

/// Produce a new document containing only the selected pages, in the
/// order given.
#[wasm_bindgen]
pub fn extract_pages(bytes: &[u8], indices: &[u32]) -> Result<Vec<u8>, JsValue> {
    let indices: Vec<usize> = indices.iter().map(|&i| i as usize).collect();
    paperkit_core::extract_pages(bytes, &indices).map_err(op_err)
}

/// Split a document into parts. Options come in as a plain JS object
/// matching `SplitOptions`; the result is an array of `{name, bytes}`
/// objects with `bytes` as a `Uint8Array`.
#[wasm_bindgen]
pub fn split_document(bytes: &[u8], options: JsValue) -> Result<Array, JsValue> {
    let options: SplitOptions = serde_wasm_bindgen::from_value(options).map_err(options_err)?;
    let outputs = paperkit_core::split_document(bytes, &options).map_err(op_err)?;

    let results = Array::new();
    for output in outputs {
        let entry = Object::new();
        Reflect::set(&entry, &"name".into(), &JsValue::from_str(&output.name))?;
        Reflect::set(
            &entry,
            &"bytes".into(),
            &Uint8Array::from(output.bytes.as_slice()),
        )?;
        results.push(&entry);
    }
    Ok(results)
}

/// Merge documents in the given order. Takes an array of `Uint8Array`s.
#[wasm_bindgen]
pub fn merge_documents(files: Array) -> Result<Vec<u8>, JsValue> {
    let mut inputs = Vec::with_capacity(files.length() as usize);
    for entry in files.iter() {
        let buffer: Uint8Array = entry
            .dyn_into()
            .map_err(|_| JsValue::from_str("merge input must be a Uint8Array"))?;
        inputs.push(buffer.to_vec());
    }
    paperkit_core::merge_documents(inputs).map_err(op_err)
}

/// Apply a partial metadata update. Fields absent from the JS object are
/// left as-is.
#[wasm_bindgen]
pub fn set_metadata(bytes: &[u8], update: JsValue) -> Result<Vec<u8>, JsValue> {
    let update: MetadataUpdate = serde_wasm_bindgen::from_value(update).map_err(options_err)?;
    paperkit_core::set_metadata(bytes, &update).map_err(op_err)
}

/// Strip identifying metadata at the given level: "low", "recommended",
/// or "extreme".
#[wasm_bindgen]
pub fn strip_metadata(bytes: &[u8], level: JsValue) -> Result<Vec<u8>, JsValue> {
    let level: StripLevel = serde_wasm_bindgen::from_value(level).map_err(options_err)?;
    paperkit_core::strip_metadata(bytes, level).map_err(op_err)
}

/// Stamp sequential page numbers. Position is one of "bottom-left",
/// "bottom-center", "bottom-right".
#[wasm_bindgen]
pub fn add_page_numbers(
    bytes: &[u8],
    position: JsValue,
    start_number: u32,
) -> Result<Vec<u8>, JsValue> {
    let position: NumberPosition = serde_wasm_bindgen::from_value(position).map_err(options_err)?;
    paperkit_core::add_page_numbers(bytes, position, start_number).map_err(op_err)
}

/// Stamp a text watermark on every page, centered or tiled.
#[wasm_bindgen]
pub fn add_watermark(bytes: &[u8], options: JsValue) -> Result<Vec<u8>, JsValue> {
    let options: WatermarkOptions = serde_wasm_bindgen::from_value(options).map_err(options_err)?;
    paperkit_core::add_watermark(bytes, &options).map_err(op_err)
}

/// Re-save a damaged document through a tolerant parse.
#[wasm_bindgen]
pub fn repair_document(bytes: &[u8]) -> Result<Vec<u8>, JsValue> {
    paperkit_core::repair_document(bytes).map_err(op_err)
}

/// Attempt the cheap unlock tier: strip encryption that protects with an
/// empty user password. Returns `{recovered: true, bytes: Uint8Array}`
/// on success, or `{recovered: false}` when the file needs the
/// rasterizing unlock (available in native builds only).
#[wasm_bindgen]
pub fn try_structural_unlock(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let result = Object::new();
    match paperkit_security::try_structural_unlock(bytes) {
        StructuralUnlock::Recovered(output) => {
            Reflect::set(&result, &"recovered".into(), &JsValue::TRUE)?;
            Reflect::set(
                &result,
                &"bytes".into(),
                &Uint8Array::from(output.as_slice()),
            )?;
        }
        StructuralUnlock::NeedsRasterization => {
            Reflect::set(&result, &"recovered".into(), &JsValue::FALSE)?;
        }
    }
    Ok(result.into())
}
