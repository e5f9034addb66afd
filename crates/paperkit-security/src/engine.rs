//! The external encryption tool boundary.
//!
//! Password protection is delegated to an embedded qpdf-style encryption
//! tool rather than reimplemented. The tool is modeled as a narrow
//! interface, bytes plus a request in and bytes out, so the real
//! integration can be swapped or mocked without touching any other code.
//! Its argument contract is:
//!
//! ```text
//! --encrypt <user> <owner> <keylen> [restriction flags] -- <in> <out>
//! ```
//!
//! and its exit code 3 is a warning, not a failure.

use crate::error::SecurityError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;

/// Exit code the tool uses for "succeeded with warnings". Must be treated
/// as success; misclassifying it breaks protection of slightly malformed
/// but recoverable inputs.
pub const WARNING_EXIT_CODE: i32 = 3;

/// What a viewer may do with the protected document. Each disabled flag
/// becomes a restriction argument to the tool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Permissions {
    pub printing: bool,
    pub modifying: bool,
    pub copying: bool,
    pub annotating: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            printing: true,
            modifying: true,
            copying: true,
            annotating: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectOptions {
    pub user_password: String,
    /// Defaults to the user password when not supplied.
    pub owner_password: Option<String>,
    #[serde(default)]
    pub permissions: Permissions,
}

/// Fully resolved encryption request handed to an engine.
#[derive(Debug, Clone)]
pub struct EncryptRequest {
    pub user_password: String,
    pub owner_password: String,
    pub key_length: u32,
    pub permissions: Permissions,
}

impl EncryptRequest {
    pub fn from_options(options: &ProtectOptions) -> Self {
        let owner_password = options
            .owner_password
            .clone()
            .filter(|password| !password.is_empty())
            .unwrap_or_else(|| options.user_password.clone());

        Self {
            user_password: options.user_password.clone(),
            owner_password,
            key_length: 256,
            permissions: options.permissions,
        }
    }

    /// Render the documented CLI argument contract for this request.
    pub fn cli_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--encrypt".into(),
            self.user_password.clone().into(),
            self.owner_password.clone().into(),
            self.key_length.to_string().into(),
        ];

        if !self.permissions.printing {
            args.push("--print=none".into());
        }
        if !self.permissions.modifying {
            args.push("--modify=none".into());
        }
        if !self.permissions.copying {
            args.push("--extract=n".into());
        }
        if !self.permissions.annotating {
            args.push("--annotate=n".into());
        }

        args.push("--".into());
        args.push(input.as_os_str().to_owned());
        args.push(output.as_os_str().to_owned());
        args
    }
}

/// Narrow seam in front of the embedded encryption tool.
pub trait EncryptionEngine {
    fn encrypt(&self, input: &[u8], request: &EncryptRequest) -> Result<Vec<u8>, SecurityError>;
}

#[cfg(feature = "qpdf-cli")]
pub use command::QpdfCommandEngine;

#[cfg(feature = "qpdf-cli")]
mod command {
    use super::{EncryptRequest, EncryptionEngine, WARNING_EXIT_CODE};
    use crate::error::SecurityError;
    use std::path::PathBuf;
    use std::process::Command;
    use tracing::debug;

    /// Engine backed by a qpdf binary on the host. Input and output go
    /// through a scratch directory that is removed when the call returns.
    pub struct QpdfCommandEngine {
        binary: PathBuf,
    }

    impl QpdfCommandEngine {
        pub fn new(binary: impl Into<PathBuf>) -> Self {
            Self {
                binary: binary.into(),
            }
        }
    }

    impl Default for QpdfCommandEngine {
        fn default() -> Self {
            Self::new("qpdf")
        }
    }

    impl EncryptionEngine for QpdfCommandEngine {
        fn encrypt(
            &self,
            input: &[u8],
            request: &EncryptRequest,
        ) -> Result<Vec<u8>, SecurityError> {
            let scratch = tempfile::tempdir().map_err(|e| SecurityError::Engine {
                code: None,
                stderr: format!("cannot create scratch directory: {}", e),
            })?;
            let input_path = scratch.path().join("input.pdf");
            let output_path = scratch.path().join("output.pdf");

            std::fs::write(&input_path, input).map_err(|e| SecurityError::Engine {
                code: None,
                stderr: format!("cannot write scratch input: {}", e),
            })?;

            let output = Command::new(&self.binary)
                .args(request.cli_args(&input_path, &output_path))
                .output()
                .map_err(|e| SecurityError::Engine {
                    code: None,
                    stderr: format!("cannot run {}: {}", self.binary.display(), e),
                })?;

            let code = output.status.code();
            let accepted = matches!(code, Some(0) | Some(WARNING_EXIT_CODE));
            if !accepted {
                return Err(SecurityError::Engine {
                    code,
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                });
            }
            if code == Some(WARNING_EXIT_CODE) {
                debug!(
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "encryption tool reported warnings"
                );
            }

            // The tool's own success signal is the output file existing.
            if !output_path.exists() {
                return Err(SecurityError::Engine {
                    code,
                    stderr: "tool exited cleanly but produced no output file".into(),
                });
            }

            std::fs::read(&output_path).map_err(|e| SecurityError::Engine {
                code: None,
                stderr: format!("cannot read tool output: {}", e),
            })
        }
    }
}
