//! Optional installer configuration file.
//!
//! `<config_dir>/oclean/installer.toml` may set defaults for the bin
//! directory, an alternative release catalog and the download timeout.
//! Command-line flags take precedence over every key.
//!
//! ```toml
//! bin_dir = "/opt/tools/bin"
//! catalog = "/srv/mirror/releases.toml"
//! download_timeout_secs = 60
//! ```

use crate::artefact::download::DEFAULT_DOWNLOAD_TIMEOUT;
use crate::dirs::BaseDirs;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;

/// Filename of the configuration inside the oclean config directory.
pub const CONFIG_FILE_NAME: &str = "installer.toml";

/// Errors arising from loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file is missing (when named explicitly) or could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the config file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected keys.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: Utf8PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Settings read from `installer.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerConfig {
    /// Directory the `oclean` binary is installed into.
    pub bin_dir: Option<Utf8PathBuf>,
    /// Release catalog to use instead of the embedded one.
    pub catalog: Option<Utf8PathBuf>,
    /// Network timeout for archive downloads, in seconds.
    pub download_timeout_secs: Option<u64>,
}

impl InstallerConfig {
    /// Load the config at `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but is unreadable or
    /// invalid.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        Self::read(path, true)
    }

    /// Load the config at `path`, which must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] for a missing or unreadable file and
    /// [`ConfigError::Parse`] for invalid TOML.
    pub fn load_required(path: &Utf8Path) -> Result<Self, ConfigError> {
        Self::read(path, false)
    }

    fn read(path: &Utf8Path, missing_ok: bool) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if missing_ok && e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Load `explicit` when given, otherwise the file in the platform config
    /// directory. An explicit file must exist; a missing platform file or
    /// config directory means defaults.
    ///
    /// # Errors
    ///
    /// See [`InstallerConfig::load`] and [`InstallerConfig::load_required`].
    pub fn discover(explicit: Option<&Utf8Path>, dirs: &dyn BaseDirs) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_required(path);
        }
        let Some(path) = dirs
            .oclean_config_dir()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir.join(CONFIG_FILE_NAME)).ok())
        else {
            return Ok(Self::default());
        };
        Self::load(&path)
    }

    /// The configured download timeout, or the built-in default.
    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        self.download_timeout_secs
            .map_or(DEFAULT_DOWNLOAD_TIMEOUT, Duration::from_secs)
    }
}
