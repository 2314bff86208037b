//! Binary placement into the install bin directory.
//!
//! Placement never truncates the existing binary in place: the new file is
//! written next to the destination and renamed over it, so an interrupted
//! upgrade leaves either the old binary or the new one.

use crate::artefact::naming::BINARY_NAME;
use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Permission bits given to the installed binary.
#[cfg(unix)]
const BINARY_MODE: u32 = 0o755;

/// Handles placement of the `oclean` binary into a bin directory.
#[derive(Debug, Clone)]
pub struct Stager {
    bin_dir: Utf8PathBuf,
}

impl Stager {
    /// Create a stager targeting `bin_dir`.
    #[must_use]
    pub fn new(bin_dir: Utf8PathBuf) -> Self {
        Self { bin_dir }
    }

    /// Ensure the bin directory exists and is writable.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or is not writable.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.bin_dir).map_err(|e| InstallerError::TargetNotWritable {
            path: self.bin_dir.clone(),
            reason: e.to_string(),
        })?;

        // Verify writability by attempting to create a temp file
        match NamedTempFile::new_in(&self.bin_dir) {
            Ok(probe) => {
                drop(probe);
                Ok(())
            }
            Err(e) => Err(InstallerError::TargetNotWritable {
                path: self.bin_dir.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Atomically place `source` at [`Stager::binary_path`] with mode 0755.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::PlacementFailed`] if the copy, permission
    /// change or rename fails. The previous binary is untouched on error.
    pub fn place(&self, source: &Utf8Path) -> Result<Utf8PathBuf> {
        let dest_path = self.binary_path();
        let failed = |stage: &str, e: &dyn std::fmt::Display| InstallerError::PlacementFailed {
            reason: format!("failed to {stage} {source} -> {dest_path}: {e}"),
        };

        let contents = fs::read(source).map_err(|e| failed("read", &e))?;
        let mut staged =
            NamedTempFile::new_in(&self.bin_dir).map_err(|e| failed("create temp file for", &e))?;
        staged
            .write_all(&contents)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| failed("write", &e))?;
        set_executable(staged.path()).map_err(|e| failed("chmod", &e))?;
        staged
            .persist(&dest_path)
            .map_err(|e| failed("rename", &e.error))?;

        debug!("placed {source} at {dest_path}");
        Ok(dest_path)
    }

    /// Remove the installed binary. Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error for failures other than the file being absent.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(self.binary_path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(InstallerError::Io(e)),
        }
    }

    /// Return the full path of the installed binary.
    #[must_use]
    pub fn binary_path(&self) -> Utf8PathBuf {
        self.bin_dir.join(BINARY_NAME)
    }
}

#[cfg(unix)]
fn set_executable(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(BINARY_MODE))
}

#[cfg(not(unix))]
fn set_executable(_path: &std::path::Path) -> std::io::Result<()> {
    Ok(())
}
