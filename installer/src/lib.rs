//! oclean installer library.
//!
//! This crate describes the published oclean releases and installs the
//! matching binary for the host platform. It is used by the
//! `oclean-installer` CLI binary and can be consumed programmatically for
//! testing or custom installation workflows.
//!
//! # Modules
//!
//! - [`acceptance`] - Post-install `--version` check
//! - [`artefact`] - Platform, target, version and digest types plus the
//!   download, verification and extraction steps
//! - [`audit`] - Checksum audit across every artefact of a release
//! - [`catalog`] - The release catalog and per-platform artefact selection
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Optional `installer.toml` settings
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Semantic error types and exit codes
//! - [`formula`] - Homebrew formula rendering
//! - [`install`] - Install, upgrade and uninstall orchestration
//! - [`output`] - Progress and status text
//! - [`receipt`] - Record of the installed release
//! - [`stager`] - Atomic placement of the binary in the bin directory

pub mod acceptance;
pub mod artefact;
pub mod audit;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod formula;
pub mod install;
pub mod output;
pub mod receipt;
pub mod stager;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
