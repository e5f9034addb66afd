//! The rendering boundary used by tier-2 unlock.
//!
//! The contract with a rendering engine is deliberately small: give it
//! bytes plus an optional password, get each page back as a bitmap with
//! its geometry in points. The visitor shape lets the caller embed and
//! drop one bitmap before the next page renders, so memory stays bounded
//! on large documents.

use crate::error::SecurityError;

/// One rendered page: geometry in points, pixels as tightly packed RGBA.
pub struct RasterPage {
    pub width_pts: f32,
    pub height_pts: f32,
    pub width_px: u32,
    pub height_px: u32,
    pub rgba: Vec<u8>,
}

pub trait PageRasterizer {
    /// Render every page at `scale` and hand each one to `on_page`, in
    /// reading order. Returns the page count.
    ///
    /// A wrong password must surface as [`SecurityError::WrongPassword`];
    /// any other open or render failure as [`SecurityError::Unsupported`].
    fn rasterize_each(
        &self,
        bytes: &[u8],
        password: Option<&str>,
        scale: f32,
        on_page: &mut dyn FnMut(RasterPage) -> Result<(), SecurityError>,
    ) -> Result<u32, SecurityError>;
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use super::{PageRasterizer, RasterPage};
    use crate::error::SecurityError;
    use pdfium_render::prelude::*;

    /// Rasterizer backed by the Pdfium library.
    pub struct PdfiumRasterizer {
        pdfium: Pdfium,
    }

    impl PdfiumRasterizer {
        /// Bind to a Pdfium library next to the executable, falling back
        /// to the system-wide install.
        pub fn new() -> Result<Self, SecurityError> {
            let bindings = Pdfium::bind_to_library(
                Pdfium::pdfium_platform_library_name_at_path("./"),
            )
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| {
                SecurityError::Unsupported(format!("cannot bind Pdfium library: {:?}", e))
            })?;

            Ok(Self {
                pdfium: Pdfium::new(bindings),
            })
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn rasterize_each(
            &self,
            bytes: &[u8],
            password: Option<&str>,
            scale: f32,
            on_page: &mut dyn FnMut(RasterPage) -> Result<(), SecurityError>,
        ) -> Result<u32, SecurityError> {
            let document = self
                .pdfium
                .load_pdf_from_byte_slice(bytes, password)
                .map_err(map_open_error)?;

            let page_count = u32::from(document.pages().len());
            for page in document.pages().iter() {
                let config = PdfRenderConfig::new().scale_page_by_factor(scale);
                let bitmap = page.render_with_config(&config).map_err(|e| {
                    SecurityError::Unsupported(format!("page render failed: {:?}", e))
                })?;

                on_page(RasterPage {
                    width_pts: page.width().value,
                    height_pts: page.height().value,
                    width_px: bitmap.width() as u32,
                    height_px: bitmap.height() as u32,
                    rgba: bitmap.as_rgba_bytes(),
                })?;
                // bitmap and page drop here, before the next render
            }

            Ok(page_count)
        }
    }

    fn map_open_error(error: PdfiumError) -> SecurityError {
        match error {
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                SecurityError::WrongPassword
            }
            other => SecurityError::Unsupported(format!("cannot open document: {:?}", other)),
        }
    }
}
