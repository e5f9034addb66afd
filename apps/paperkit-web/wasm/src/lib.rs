//! WASM bindings for the Paperkit PDF tools.
//!
//! Every export is a pure byte transform: JavaScript hands over file
//! bytes and a small options object, Rust does the work, and the result
//! comes back as bytes for download. No document state lives on the JS
//! side between calls.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { get_pdf_info, rotate_pages } from './pkg/paperkit_wasm.js';
//!
//! await init();
//!
//! const info = get_pdf_info(bytes);
//! const rotated = rotate_pages(bytes, new Int32Array(info.page_count).fill(90));
//! downloadBlob(rotated, "rotated.pdf");
//! ```
//!
//! Rasterizing unlock and AES encryption need native binaries and are
//! not part of this surface; `try_structural_unlock` covers the cheap
//! tier and reports when a file needs the native path.

pub mod ops;
pub mod validation;

use wasm_bindgen::prelude::*;

pub use validation::PdfInfo;

/// Initialize the WASM module. Called automatically by wasm-bindgen.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Quick validation check for a PDF file.
/// Returns Ok(()) if valid, Err with message if not.
#[wasm_bindgen]
pub fn quick_validate(bytes: &[u8]) -> Result<(), JsValue> {
    validation::quick_validate(bytes).map_err(|e| JsValue::from_str(&e))
}

/// Get detailed PDF info for display before an operation runs.
#[wasm_bindgen]
pub fn get_pdf_info(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = validation::inspect_pdf(bytes).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&info)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Get page count from PDF bytes (convenience function)
#[wasm_bindgen]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    paperkit_core::get_page_count(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        assert!(!get_version().is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(2621440), "2.5 MB");
    }
}
