use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecurityError {
    /// The external encryption tool terminated outside its accepted
    /// success/warning exit conditions.
    #[error("Encryption engine failed (exit code {code:?}): {stderr}")]
    Engine { code: Option<i32>, stderr: String },

    /// The supplied password does not open the document.
    #[error("Wrong password for this document")]
    WrongPassword,

    /// The document cannot be rendered or rebuilt; trying another
    /// password will not help.
    #[error("Unsupported or corrupt document: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Pdf(#[from] paperkit_core::PdfError),
}
