//! Error types for the oclean installer CLI.
//!
//! This module defines semantic error variants that provide actionable guidance
//! to users when installation fails. Lower-level errors from the artefact,
//! catalog, receipt and acceptance modules convert into [`InstallerError`]
//! with `?`.

use crate::acceptance::AcceptanceError;
use crate::artefact::download::DownloadError;
use crate::artefact::error::ArtefactError;
use crate::artefact::extraction::ExtractionError;
use crate::artefact::verification::VerificationError;
use crate::artefact::version::ReleaseVersion;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::receipt::ReceiptError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Exit code for a failed acceptance check.
pub const ACCEPTANCE_FAILURE_EXIT_CODE: i32 = 2;

/// Errors that can occur during installer operations.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// A platform, version, target or digest was invalid or unsupported.
    #[error(transparent)]
    Artefact(#[from] ArtefactError),

    /// The release catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The requested release is not in the catalog.
    #[error("oclean {version} is not in the release catalog")]
    ReleaseNotFound {
        /// The requested version.
        version: ReleaseVersion,
    },

    /// Fetching the archive failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The archive's digest does not match the catalog; nothing was installed.
    #[error("{0}; installation aborted")]
    Verification(#[from] VerificationError),

    /// Unpacking the archive failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The archive does not contain the `oclean` binary.
    #[error("archive {archive} does not contain an oclean binary")]
    MissingBinary {
        /// The archive filename.
        archive: String,
    },

    /// The bin directory exists but is not writable.
    #[error("bin directory {path} is not writable: {reason}")]
    TargetNotWritable {
        /// Path to the non-writable directory.
        path: Utf8PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// Moving the binary into place failed.
    #[error("placement failed: {reason}")]
    PlacementFailed {
        /// Description of the placement failure.
        reason: String,
    },

    /// The install receipt could not be read or written.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// The installed binary failed the `--version` check.
    #[error("acceptance check failed: {0}")]
    Acceptance(#[from] AcceptanceError),

    /// The installer configuration file is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A platform directory could not be determined.
    #[error("could not determine the {what} directory; pass it explicitly")]
    DirectoryUnavailable {
        /// Which directory was needed (e.g. "bin").
        what: &'static str,
    },

    /// A platform directory is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// No install receipt exists.
    #[error("oclean is not installed (no install receipt found)")]
    NotInstalled,

    /// One or more published checksums did not match.
    #[error("audit of oclean {version} failed for {failures} artefact(s)")]
    AuditFailed {
        /// The audited release.
        version: ReleaseVersion,
        /// Number of artefacts that failed.
        failures: usize,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    /// Process exit code the CLI uses for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Acceptance(_) => ACCEPTANCE_FAILURE_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
