//! Install receipt: the record of what the installer last placed.
//!
//! The receipt is a small JSON document stored in the oclean data
//! directory. `status`, `upgrade`, `test` and `uninstall` read it; a
//! successful install writes it.

use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::target::TargetTriple;
use crate::artefact::version::ReleaseVersion;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Filename of the receipt inside the data directory.
pub const RECEIPT_FILE_NAME: &str = "install-receipt.json";

/// Errors arising from receipt persistence.
#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    /// The receipt file could not be read, written or removed.
    #[error("receipt I/O error at {path}: {source}")]
    Io {
        /// Path of the receipt file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The receipt is not valid JSON for the expected schema.
    #[error("corrupt receipt at {path}: {source}")]
    Corrupt {
        /// Path of the receipt file.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// What is installed, where, and from which archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReceipt {
    /// Installed release.
    pub version: ReleaseVersion,
    /// Target triple of the installed archive.
    pub target: TargetTriple,
    /// Digest of the archive the binary came from.
    pub sha256: Sha256Digest,
    /// Absolute path of the installed binary.
    pub binary_path: Utf8PathBuf,
    /// Seconds since the Unix epoch at install time.
    pub installed_at: u64,
}

impl InstallReceipt {
    /// Build a receipt stamped with the current time.
    #[must_use]
    pub fn new(
        version: ReleaseVersion,
        target: TargetTriple,
        sha256: Sha256Digest,
        binary_path: Utf8PathBuf,
    ) -> Self {
        let installed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        Self {
            version,
            target,
            sha256,
            binary_path,
            installed_at,
        }
    }

    /// Read the receipt at `path`; `Ok(None)` when nothing is installed.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError`] when the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Utf8Path) -> Result<Option<Self>, ReceiptError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ReceiptError::Io {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| ReceiptError::Corrupt {
                path: path.to_owned(),
                source,
            })
    }

    /// Write the receipt to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Io`] when the file cannot be written.
    pub fn save(&self, path: &Utf8Path) -> Result<(), ReceiptError> {
        let io_error = |source| ReceiptError::Io {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ReceiptError::Corrupt {
            path: path.to_owned(),
            source,
        })?;
        std::fs::write(path, json + "\n").map_err(io_error)
    }

    /// Delete the receipt at `path`. A missing receipt is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Io`] for any other removal failure.
    pub fn remove(path: &Utf8Path) -> Result<(), ReceiptError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ReceiptError::Io {
                path: path.to_owned(),
                source,
            }),
        }
    }
}
