//! Password protection through an [`EncryptionEngine`].

use crate::engine::{EncryptRequest, EncryptionEngine, ProtectOptions};
use crate::error::SecurityError;

/// Encrypt a document with AES-256 via the given engine.
///
/// With only a user password, the owner password defaults to the same
/// value. An empty user password combined with an owner password yields a
/// document anyone can open but whose permissions are enforced.
pub fn protect(
    bytes: &[u8],
    options: &ProtectOptions,
    engine: &dyn EncryptionEngine,
) -> Result<Vec<u8>, SecurityError> {
    if options.user_password.is_empty()
        && options
            .owner_password
            .as_deref()
            .unwrap_or_default()
            .is_empty()
    {
        return Err(SecurityError::Unsupported(
            "at least one password is required".into(),
        ));
    }

    let request = EncryptRequest::from_options(options);
    let output = engine.encrypt(bytes, &request)?;

    if !output.starts_with(b"%PDF-") {
        return Err(SecurityError::Engine {
            code: None,
            stderr: "engine returned something that is not a PDF".into(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Permissions;
    use std::cell::RefCell;

    /// Engine double that records the request it was handed.
    struct RecordingEngine {
        seen: RefCell<Option<EncryptRequest>>,
        output: Vec<u8>,
    }

    impl RecordingEngine {
        fn returning(output: &[u8]) -> Self {
            Self {
                seen: RefCell::new(None),
                output: output.to_vec(),
            }
        }
    }

    impl EncryptionEngine for RecordingEngine {
        fn encrypt(
            &self,
            _input: &[u8],
            request: &EncryptRequest,
        ) -> Result<Vec<u8>, SecurityError> {
            *self.seen.borrow_mut() = Some(request.clone());
            Ok(self.output.clone())
        }
    }

    fn options() -> ProtectOptions {
        ProtectOptions {
            user_password: "hunter2".into(),
            owner_password: None,
            permissions: Permissions::default(),
        }
    }

    #[test]
    fn passes_resolved_request_to_engine() {
        let engine = RecordingEngine::returning(b"%PDF-1.7 fake");
        let result = protect(b"%PDF-input", &options(), &engine).unwrap();
        assert_eq!(result, b"%PDF-1.7 fake");

        let seen = engine.seen.borrow();
        let request = seen.as_ref().unwrap();
        assert_eq!(request.user_password, "hunter2");
        assert_eq!(request.owner_password, "hunter2");
    }

    #[test]
    fn rejects_non_pdf_engine_output() {
        let engine = RecordingEngine::returning(b"whoops");
        let result = protect(b"%PDF-input", &options(), &engine);
        assert!(matches!(result, Err(SecurityError::Engine { .. })));
    }

    #[test]
    fn rejects_protection_without_any_password() {
        let engine = RecordingEngine::returning(b"%PDF-1.7");
        let result = protect(
            b"%PDF-input",
            &ProtectOptions {
                user_password: String::new(),
                owner_password: None,
                permissions: Permissions::default(),
            },
            &engine,
        );
        assert!(matches!(result, Err(SecurityError::Unsupported(_))));
    }

    #[test]
    fn owner_only_protection_is_allowed() {
        let engine = RecordingEngine::returning(b"%PDF-1.7");
        let result = protect(
            b"%PDF-input",
            &ProtectOptions {
                user_password: String::new(),
                owner_password: Some("admin".into()),
                permissions: Permissions {
                    copying: false,
                    ..Permissions::default()
                },
            },
            &engine,
        );
        assert!(result.is_ok());
    }
}
