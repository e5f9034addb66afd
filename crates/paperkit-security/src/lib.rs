//! Document protection and recovery.
//!
//! Two concerns live here, both behind narrow, mockable seams:
//!
//! - **Protect**: AES-256 password protection delegated to an external
//!   qpdf-style encryption tool ([`EncryptionEngine`]).
//! - **Unlock**: a two-tier cascade: lossless structural recovery first,
//!   full-page rasterization through a rendering engine
//!   ([`PageRasterizer`]) as the lossy last resort.

pub mod engine;
pub mod error;
pub mod protect;
pub mod raster;
pub mod rebuild;
pub mod unlock;

pub use engine::{EncryptRequest, EncryptionEngine, Permissions, ProtectOptions, WARNING_EXIT_CODE};
pub use error::SecurityError;
pub use protect::protect;
pub use raster::{PageRasterizer, RasterPage};
pub use rebuild::ImageDocumentBuilder;
pub use unlock::{
    rasterize_unlock, try_structural_unlock, unlock, StructuralUnlock, UNLOCK_RENDER_SCALE,
};

#[cfg(feature = "qpdf-cli")]
pub use engine::QpdfCommandEngine;

#[cfg(feature = "pdfium")]
pub use raster::PdfiumRasterizer;
