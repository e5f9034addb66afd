//! PDF validation and info extraction for the browser surface.

use lopdf::Document;
use paperkit_core::LoadOptions;
use serde::Serialize;

/// Summary of a loaded PDF, shown to the user before any operation runs.
#[derive(Debug, Clone, Serialize, Default)]
pub struct PdfInfo {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    /// Whether the document carries an /Encrypt dictionary
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    /// Document title from the Info dictionary (if any)
    pub title: Option<String>,
    /// Document author from the Info dictionary (if any)
    pub author: Option<String>,
}

/// Parse a PDF and extract its summary info.
///
/// Encrypted documents are tolerated here so the UI can surface the
/// lock state instead of a parse failure.
pub fn inspect_pdf(bytes: &[u8]) -> Result<PdfInfo, String> {
    quick_validate(bytes)?;

    let version = header_version(bytes);

    let options = LoadOptions {
        tolerate_encryption: true,
    };
    let document = paperkit_core::load_document(bytes, options)
        .map_err(|e| format!("Failed to parse PDF: {}", e))?;

    let encrypted = document.is_encrypted();
    let page_count = document.get_pages().len() as u32;
    if page_count == 0 && !encrypted {
        return Err("PDF has no pages".to_string());
    }

    let (title, author) = info_strings(&document);

    Ok(PdfInfo {
        page_count,
        version,
        encrypted,
        size_bytes: bytes.len(),
        title,
        author,
    })
}

/// Extract the version from the %PDF- header.
fn header_version(bytes: &[u8]) -> String {
    if bytes.len() >= 8 && bytes.starts_with(b"%PDF-") {
        if let Ok(version) = std::str::from_utf8(&bytes[5..8]) {
            return version.trim().to_string();
        }
    }
    "1.4".to_string()
}

/// Pull Title and Author out of the trailer's Info dictionary.
fn info_strings(document: &Document) -> (Option<String>, Option<String>) {
    let mut title = None;
    let mut author = None;

    let info_dict = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
        .and_then(|id| document.objects.get(&id))
        .and_then(|obj| obj.as_dict().ok());

    if let Some(dict) = info_dict {
        if let Ok(raw) = dict.get(b"Title").and_then(|o| o.as_str()) {
            let decoded = String::from_utf8_lossy(raw);
            if !decoded.is_empty() {
                title = Some(decoded.into_owned());
            }
        }
        if let Ok(raw) = dict.get(b"Author").and_then(|o| o.as_str()) {
            let decoded = String::from_utf8_lossy(raw);
            if !decoded.is_empty() {
                author = Some(decoded.into_owned());
            }
        }
    }

    (title, author)
}

/// Cheap structural check without parsing the cross-reference table.
pub fn quick_validate(bytes: &[u8]) -> Result<(), String> {
    if bytes.len() < 8 {
        return Err("File too small to be a valid PDF".to_string());
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err("Not a valid PDF file (missing %PDF- header)".to_string());
    }

    // %%EOF should sit within the last kilobyte.
    let tail = if bytes.len() > 1024 {
        &bytes[bytes.len() - 1024..]
    } else {
        bytes
    };
    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err("PDF appears truncated (missing %%EOF marker)".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_pdf;

    #[test]
    fn test_quick_validate_rejects_non_pdf() {
        assert!(quick_validate(b"not a pdf file").is_err());
    }

    #[test]
    fn test_quick_validate_rejects_small_file() {
        assert!(quick_validate(b"tiny").is_err());
    }

    #[test]
    fn test_quick_validate_accepts_valid_pdf() {
        let pdf = create_test_pdf(1);
        assert!(quick_validate(&pdf).is_ok());
    }

    #[test]
    fn test_inspect_pdf_returns_page_count_and_version() {
        let pdf = create_test_pdf(5);
        let info = inspect_pdf(&pdf).unwrap();
        assert_eq!(info.page_count, 5);
        assert_eq!(info.version, "1.7");
        assert!(!info.encrypted);
        assert_eq!(info.size_bytes, pdf.len());
    }

    #[test]
    fn test_inspect_pdf_rejects_invalid_data() {
        assert!(inspect_pdf(b"not a valid pdf").is_err());
    }

    #[test]
    fn test_header_version() {
        assert_eq!(header_version(b"%PDF-1.7\n"), "1.7");
        assert_eq!(header_version(b"%PDF-2.0\n"), "2.0");
    }
}
