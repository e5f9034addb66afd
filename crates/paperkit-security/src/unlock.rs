//! Two-tier unlock: structural recovery first, rasterization last.
//!
//! Tier 1 is cheap and lossless: it recovers documents protected only by
//! owner-level restrictions (no password required to view) by decrypting
//! with the empty password and rewriting the file without its encryption
//! dictionary. Its failure is expected and silent; it is the trigger for
//! tier 2, never a user-facing error.
//!
//! Tier 2 is expensive and lossy: it renders every page through the
//! rasterizer at 2x scale and rebuilds an image-only document. Selectable
//! text, form fields and vector content are lost; visual fidelity and
//! page geometry are kept. It succeeds or fails atomically: no
//! partial-page salvage.

use crate::error::SecurityError;
use crate::raster::PageRasterizer;
use crate::rebuild::ImageDocumentBuilder;
use paperkit_core::{load_document, save_document, LoadOptions, SaveOptions};
use tracing::debug;

/// Render scale used when rebuilding pages as bitmaps.
pub const UNLOCK_RENDER_SCALE: f32 = 2.0;

/// Outcome of the cheap structural tier. Escalation to rasterization is
/// an explicit branch, not an exception path.
pub enum StructuralUnlock {
    /// Lossless recovery succeeded; here is the decrypted document.
    Recovered(Vec<u8>),
    /// The content streams are genuinely password-encrypted; only the
    /// rasterization tier can help.
    NeedsRasterization,
}

/// Tier 1: attempt lossless structural recovery without a password.
pub fn try_structural_unlock(bytes: &[u8]) -> StructuralUnlock {
    match structural_copy(bytes) {
        Ok(recovered) => StructuralUnlock::Recovered(recovered),
        Err(error) => {
            debug!(%error, "structural unlock failed; document needs rasterization");
            StructuralUnlock::NeedsRasterization
        }
    }
}

fn structural_copy(bytes: &[u8]) -> Result<Vec<u8>, SecurityError> {
    let mut doc = load_document(
        bytes,
        LoadOptions {
            tolerate_encryption: true,
        },
    )?;

    if doc.is_encrypted() {
        doc.decrypt("").map_err(|e| {
            SecurityError::Unsupported(format!("empty-password decryption failed: {}", e))
        })?;
        doc.trailer.remove(b"Encrypt");
    }

    Ok(save_document(&mut doc, &SaveOptions::default())?)
}

/// Tier 2: rasterize every page and rebuild an image-only document.
pub fn rasterize_unlock(
    bytes: &[u8],
    password: Option<&str>,
    rasterizer: &dyn PageRasterizer,
) -> Result<Vec<u8>, SecurityError> {
    let mut builder = ImageDocumentBuilder::new();

    let mut embed = |page: crate::raster::RasterPage| builder.add_page(&page);
    let page_count = rasterizer.rasterize_each(bytes, password, UNLOCK_RENDER_SCALE, &mut embed)?;

    if page_count == 0 {
        return Err(SecurityError::Unsupported("document has no pages".into()));
    }

    builder.finish()
}

/// Full unlock cascade: structural first, rasterization as last resort.
pub fn unlock(
    bytes: &[u8],
    password: Option<&str>,
    rasterizer: &dyn PageRasterizer,
) -> Result<Vec<u8>, SecurityError> {
    match try_structural_unlock(bytes) {
        StructuralUnlock::Recovered(recovered) => Ok(recovered),
        StructuralUnlock::NeedsRasterization => rasterize_unlock(bytes, password, rasterizer),
    }
}
