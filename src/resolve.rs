//! Locating the real `opencode` binary and classifying the arguments.
//!
//! oclean is usually installed under the name `opencode` ahead of the real
//! binary on `PATH`, so the search must skip any candidate that resolves to
//! the wrapper itself.

use crate::config::WrapperConfig;
use crate::error::{Result, WrapperError};
use log::debug;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Name of the wrapped executable.
pub const OPENCODE_BINARY: &str = "opencode";

/// Arguments that make `opencode` print and exit, so no tracking is needed.
pub const PASSTHROUGH_FLAGS: [&str; 4] = ["--version", "-v", "--help", "-h"];

const VERSION_FLAGS: [&str; 2] = ["--version", "-v"];

/// Find the `opencode` binary to run.
///
/// `OCLEAN_OPENCODE` wins when set; otherwise `PATH` is searched.
///
/// # Errors
///
/// Returns [`WrapperError::OverrideNotAFile`] for a bad override, and the
/// errors of [`search_path_for_opencode`] otherwise.
pub fn resolve_opencode(config: &WrapperConfig) -> Result<PathBuf> {
    match &config.opencode_override {
        Some(path) if path.is_file() => Ok(path.clone()),
        Some(path) => Err(WrapperError::OverrideNotAFile { path: path.clone() }),
        None => {
            let current = std::env::current_exe().map_err(WrapperError::CurrentExe)?;
            search_path_for_opencode(config.search_path.as_deref(), &current)
        }
    }
}

/// Return the first `opencode` on `search_path` that is not `current_exe`.
///
/// Candidates are compared by canonical path, so a symlink to the wrapper is
/// skipped as well.
///
/// # Errors
///
/// Returns [`WrapperError::PathUnset`] without a search path and
/// [`WrapperError::OpencodeNotFound`] when every candidate is the wrapper.
pub fn search_path_for_opencode(
    search_path: Option<&OsStr>,
    current_exe: &Path,
) -> Result<PathBuf> {
    let search_path = search_path.ok_or(WrapperError::PathUnset)?;
    let own = canonical(current_exe);
    std::env::split_paths(search_path)
        .map(|dir| dir.join(OPENCODE_BINARY))
        .filter(|candidate| candidate.is_file())
        .find(|candidate| {
            let is_self = canonical(candidate) == own;
            if is_self {
                debug!("skipping {} (resolves to oclean)", candidate.display());
            }
            !is_self
        })
        .ok_or(WrapperError::OpencodeNotFound)
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// True when any argument is a passthrough flag.
///
/// # Examples
///
/// ```
/// use std::ffi::OsString;
/// use oclean::resolve::is_passthrough;
///
/// assert!(is_passthrough(&[OsString::from("--help")]));
/// assert!(!is_passthrough(&[OsString::from("run")]));
/// ```
#[must_use]
pub fn is_passthrough(args: &[OsString]) -> bool {
    contains_any(args, &PASSTHROUGH_FLAGS)
}

/// True when the arguments ask for a version.
#[must_use]
pub fn is_version_request(args: &[OsString]) -> bool {
    contains_any(args, &VERSION_FLAGS)
}

fn contains_any(args: &[OsString], flags: &[&str]) -> bool {
    args.iter()
        .any(|arg| flags.iter().any(|flag| arg.as_os_str() == OsStr::new(flag)))
}
