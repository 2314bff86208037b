//! Release artefact naming, retrieval, and verification.
//!
//! This module implements the type-safe domain model for the prebuilt
//! oclean archives published on GitHub releases.
//!
//! # Sub-modules
//!
//! - [`error`] — Semantic error types for validation failures.
//! - [`platform`] — Host platform detection (`Platform`).
//! - [`target`] — Target triple validation (`TargetTriple`).
//! - [`version`] — Release version newtype (`ReleaseVersion`).
//! - [`sha256_digest`] — SHA-256 digest newtype (`Sha256Digest`).
//! - [`naming`] — Archive naming policy (`ArchiveName`).
//! - [`download`] — Artefact download trait and HTTP implementation.
//! - [`extraction`] — Archive extraction with path traversal protection.
//! - [`verification`] — Checksum computation and comparison.

pub mod download;
pub mod error;
pub mod extraction;
pub mod naming;
pub mod platform;
pub mod sha256_digest;
pub mod target;
pub mod verification;
pub mod version;
