use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error("Failed to save PDF: {0}")]
    Save(String),
}
