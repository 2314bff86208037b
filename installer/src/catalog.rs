//! Release catalog: the published versions and their per-platform artefacts.
//!
//! The catalog is a TOML document. One is embedded in the installer at build
//! time; another may be supplied on the command line or through the installer
//! configuration to point at a mirror or at releases newer than the binary.
//!
//! ```toml
//! homepage = "https://github.com/kavhnr/oclean"
//! description = "Process-cleanup wrapper for opencode sessions"
//!
//! [[release]]
//! version = "0.1.0"
//!
//! [[release.artefact]]
//! target = "aarch64-apple-darwin"
//! sha256 = "083c6c8b..."
//! url = "https://..."  # optional
//! ```

use crate::artefact::error::ArtefactError;
use crate::artefact::naming::ArchiveName;
use crate::artefact::platform::Platform;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::target::TargetTriple;
use crate::artefact::version::ReleaseVersion;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::BTreeSet;

const EMBEDDED_CATALOG: &str = include_str!("../releases.toml");

const DEFAULT_HOMEPAGE: &str = "https://github.com/kavhnr/oclean";
const DEFAULT_DESCRIPTION: &str = "Process-cleanup wrapper for opencode sessions";

/// Errors arising from loading or validating a release catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog is not valid TOML or does not match the schema.
    #[error("invalid release catalog: {0}")]
    Parse(#[from] toml::de::Error),

    /// The catalog file could not be read.
    #[error("failed to read release catalog {path}: {source}")]
    Read {
        /// Path of the catalog file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A version, target or digest inside a release is malformed.
    #[error("invalid entry in release {version}: {source}")]
    Artefact {
        /// The release the entry belongs to (as written).
        version: String,
        /// The validation failure.
        #[source]
        source: ArtefactError,
    },

    /// The same version appears twice.
    #[error("release {version} is listed more than once")]
    DuplicateRelease {
        /// The repeated version.
        version: ReleaseVersion,
    },

    /// A release lists the same target twice.
    #[error("release {version} lists target {target} more than once")]
    DuplicateTarget {
        /// The release containing the duplicate.
        version: ReleaseVersion,
        /// The repeated target.
        target: TargetTriple,
    },

    /// A release has no artefacts.
    #[error("release {version} has no artefacts")]
    EmptyRelease {
        /// The empty release.
        version: ReleaseVersion,
    },

    /// The catalog lists no releases at all.
    #[error("release catalog contains no releases")]
    NoReleases,
}

/// Result type alias using [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    homepage: Option<String>,
    description: Option<String>,
    #[serde(default, rename = "release")]
    releases: Vec<RawRelease>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRelease {
    version: String,
    #[serde(default, rename = "artefact")]
    artefacts: Vec<RawArtefact>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArtefact {
    target: String,
    sha256: String,
    url: Option<String>,
}

/// A platform-specific release archive and its integrity checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artefact {
    version: ReleaseVersion,
    target: TargetTriple,
    sha256: Sha256Digest,
    url: String,
}

impl Artefact {
    /// The target triple the archive was built for.
    #[must_use]
    pub fn target(&self) -> &TargetTriple {
        &self.target
    }

    /// The published SHA-256 digest of the archive.
    #[must_use]
    pub fn sha256(&self) -> &Sha256Digest {
        &self.sha256
    }

    /// Where the archive is downloaded from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The release this artefact belongs to.
    #[must_use]
    pub fn version(&self) -> ReleaseVersion {
        self.version
    }

    /// The archive filename.
    #[must_use]
    pub fn archive_name(&self) -> ArchiveName {
        ArchiveName::new(self.version, self.target.clone())
    }
}

/// A published release and the artefacts it ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    version: ReleaseVersion,
    artefacts: Vec<Artefact>,
}

impl Release {
    /// The release version.
    #[must_use]
    pub fn version(&self) -> ReleaseVersion {
        self.version
    }

    /// All artefacts, ordered by target triple.
    #[must_use]
    pub fn artefacts(&self) -> &[Artefact] {
        &self.artefacts
    }

    /// The artefact published for `target`, if any.
    #[must_use]
    pub fn artefact_for(&self, target: &TargetTriple) -> Option<&Artefact> {
        self.artefacts.iter().find(|a| a.target() == target)
    }

    /// Select the artefact for `platform` by exact target triple.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] when the release does
    /// not publish an archive for the platform. No fallback to a different
    /// architecture is attempted.
    pub fn select(&self, platform: Platform) -> std::result::Result<&Artefact, ArtefactError> {
        let target = platform.target_triple();
        self.artefact_for(&target)
            .ok_or_else(|| ArtefactError::UnsupportedPlatform {
                platform: platform.to_string(),
                version: self.version.to_string(),
                published: self.published_targets(),
            })
    }

    fn published_targets(&self) -> String {
        self.artefacts
            .iter()
            .map(|a| a.target().as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The validated set of published releases.
///
/// # Examples
///
/// ```
/// use oclean_installer::catalog::ReleaseCatalog;
///
/// let catalog = ReleaseCatalog::embedded().expect("embedded catalog is valid");
/// let latest = catalog.latest().expect("catalog has releases");
/// assert!(!latest.artefacts().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCatalog {
    homepage: String,
    description: String,
    releases: Vec<Release>,
}

impl ReleaseCatalog {
    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for malformed TOML, malformed versions,
    /// targets or digests, duplicate releases or targets, empty releases, or
    /// a catalog without releases.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawCatalog = toml::from_str(text)?;
        let mut releases = raw
            .releases
            .into_iter()
            .map(validate_release)
            .collect::<Result<Vec<_>>>()?;
        if releases.is_empty() {
            return Err(CatalogError::NoReleases);
        }
        releases.sort_by_key(Release::version);
        let duplicate = releases.windows(2).find_map(|pair| match pair {
            [a, b] if a.version == b.version => Some(a.version),
            _ => None,
        });
        if let Some(version) = duplicate {
            return Err(CatalogError::DuplicateRelease { version });
        }
        Ok(Self {
            homepage: raw.homepage.unwrap_or_else(|| DEFAULT_HOMEPAGE.to_owned()),
            description: raw
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned()),
            releases,
        })
    }

    /// The catalog compiled into the installer.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the embedded document is invalid.
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_CATALOG)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Read`] when the file cannot be read and any
    /// [`ReleaseCatalog::parse`] error otherwise.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Load `path` when given, otherwise fall back to the embedded catalog.
    ///
    /// # Errors
    ///
    /// See [`ReleaseCatalog::load`] and [`ReleaseCatalog::embedded`].
    pub fn load_or_embedded(path: Option<&Utf8Path>) -> Result<Self> {
        path.map_or_else(Self::embedded, Self::load)
    }

    /// Look up a release by version.
    #[must_use]
    pub fn release(&self, version: ReleaseVersion) -> Option<&Release> {
        self.releases.iter().find(|r| r.version == version)
    }

    /// The release with the highest version.
    ///
    /// Always `Some` for a catalog produced by [`ReleaseCatalog::parse`].
    #[must_use]
    pub fn latest(&self) -> Option<&Release> {
        self.releases.last()
    }

    /// The requested release, or the latest when `version` is `None`.
    #[must_use]
    pub fn resolve(&self, version: Option<ReleaseVersion>) -> Option<&Release> {
        match version {
            Some(version) => self.release(version),
            None => self.latest(),
        }
    }

    /// All releases in ascending version order.
    #[must_use]
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// Project homepage used in the formula.
    #[must_use]
    pub fn homepage(&self) -> &str {
        &self.homepage
    }

    /// One-line description used in the formula.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

fn validate_release(raw: RawRelease) -> Result<Release> {
    let artefact_error = |source| CatalogError::Artefact {
        version: raw.version.clone(),
        source,
    };
    let version: ReleaseVersion = raw.version.parse().map_err(artefact_error)?;
    if raw.artefacts.is_empty() {
        return Err(CatalogError::EmptyRelease { version });
    }

    let mut seen = BTreeSet::new();
    let mut artefacts = Vec::with_capacity(raw.artefacts.len());
    for entry in raw.artefacts {
        let target = TargetTriple::try_from(entry.target).map_err(artefact_error)?;
        let sha256 = Sha256Digest::try_from(entry.sha256).map_err(artefact_error)?;
        if !seen.insert(target.clone()) {
            return Err(CatalogError::DuplicateTarget { version, target });
        }
        let url = entry
            .url
            .unwrap_or_else(|| ArchiveName::new(version, target.clone()).release_url());
        artefacts.push(Artefact {
            version,
            target,
            sha256,
            url,
        });
    }
    artefacts.sort_by(|a, b| a.target.cmp(&b.target));
    Ok(Release { version, artefacts })
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
