//! Checksum verification for downloaded release archives.
//!
//! An archive is only ever extracted after its SHA-256 digest matches the
//! digest published in the release catalog. There is no switch to disable
//! this check.

use super::sha256_digest::Sha256Digest;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Errors arising from checksum verification.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The archive could not be read.
    #[error("failed to read {path} for checksum: {source}")]
    Io {
        /// The file being hashed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The computed digest differs from the published one.
    #[error("checksum mismatch: expected={expected}, actual={actual}")]
    ChecksumMismatch {
        /// The digest recorded in the catalog.
        expected: Sha256Digest,
        /// The digest of the downloaded bytes.
        actual: Sha256Digest,
    },
}

/// Compute the SHA-256 digest of a file.
///
/// Reads the file at `path` in chunks and returns the lowercase hex
/// digest as a validated [`Sha256Digest`].
///
/// # Errors
///
/// Returns [`VerificationError::Io`] if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<Sha256Digest, VerificationError> {
    let io_error = |source| VerificationError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut file = fs::File::open(path).map_err(io_error)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer).map_err(io_error)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(Sha256Digest::from_bytes(&hasher.finalize()))
}

/// Verify that the file at `path` hashes to `expected`.
///
/// Returns the computed digest on success.
///
/// # Errors
///
/// Returns [`VerificationError::ChecksumMismatch`] when the digests differ
/// and [`VerificationError::Io`] when the file cannot be read.
pub fn verify_checksum(
    path: &Path,
    expected: &Sha256Digest,
) -> Result<Sha256Digest, VerificationError> {
    let actual = compute_sha256(path)?;
    if &actual != expected {
        return Err(VerificationError::ChecksumMismatch {
            expected: expected.clone(),
            actual,
        });
    }
    Ok(actual)
}
