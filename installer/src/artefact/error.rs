//! Error types for artefact naming, platform selection and digests.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// The target triple is not in the supported set.
    #[error("unsupported target triple \"{value}\"; expected one of: {expected}")]
    UnsupportedTarget {
        /// The rejected triple string.
        value: String,
        /// Comma-separated list of accepted triples.
        expected: String,
    },

    /// A release version is not of the form `major.minor.patch`.
    #[error("invalid release version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },

    /// The running host is neither macOS nor Linux on aarch64 or `x86_64`.
    #[error("unsupported host platform: {os} on {arch}")]
    UnsupportedHost {
        /// Operating system reported by the host.
        os: String,
        /// CPU architecture reported by the host.
        arch: String,
    },

    /// The release publishes no artefact for the requested platform.
    #[error(
        "oclean {version} is not published for {platform}; available targets: {published}"
    )]
    UnsupportedPlatform {
        /// Platform that was requested.
        platform: String,
        /// Version of the release that was consulted.
        version: String,
        /// Comma-separated list of triples the release does publish.
        published: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
