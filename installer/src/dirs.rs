//! Directory resolution abstraction for platform-specific paths.
//!
//! The installer needs three locations: the bin directory the `oclean`
//! binary is placed into, a data directory for the install receipt, and a
//! config directory for `installer.toml`. [`SystemBaseDirs`] resolves them
//! through `directories-next`; tests substitute [`MockBaseDirs`].

use directories_next::BaseDirs as PlatformDirs;
use std::path::PathBuf;

/// Application directory name used under the platform data and config roots.
pub const APP_DIR_NAME: &str = "oclean";

/// Source of platform-specific base directories.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Directory executables are installed into (`~/.local/bin` on Linux).
    fn bin_dir(&self) -> Option<PathBuf>;

    /// Directory for installer state such as the receipt.
    fn oclean_data_dir(&self) -> Option<PathBuf>;

    /// Directory holding `installer.toml`.
    fn oclean_config_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] backed by `directories-next`.
///
/// # Examples
///
/// ```
/// use oclean_installer::dirs::{BaseDirs, SystemBaseDirs};
///
/// let dirs = SystemBaseDirs::new();
/// if let Some(data) = dirs.oclean_data_dir() {
///     assert!(data.ends_with("oclean"));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    inner: Option<PlatformDirs>,
}

impl SystemBaseDirs {
    /// Resolve the platform directories for the current user.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PlatformDirs::new(),
        }
    }
}

impl Default for SystemBaseDirs {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseDirs for SystemBaseDirs {
    fn bin_dir(&self) -> Option<PathBuf> {
        let inner = self.inner.as_ref()?;
        // macOS has no executable_dir; fall back to the XDG-style location.
        inner
            .executable_dir()
            .map(PathBuf::from)
            .or_else(|| Some(inner.home_dir().join(".local").join("bin")))
    }

    fn oclean_data_dir(&self) -> Option<PathBuf> {
        self.inner
            .as_ref()
            .map(|d| d.data_local_dir().join(APP_DIR_NAME))
    }

    fn oclean_config_dir(&self) -> Option<PathBuf> {
        self.inner
            .as_ref()
            .map(|d| d.config_dir().join(APP_DIR_NAME))
    }
}
