//! Archive naming policy for oclean release artefacts.
//!
//! Release archives are published as
//! `oclean-v<version>-<target>.tar.gz` under the `v<version>` tag of the
//! GitHub repository.

use super::target::TargetTriple;
use super::version::ReleaseVersion;
use std::fmt;

/// The fixed prefix for all artefact archive names.
const ARTEFACT_PREFIX: &str = "oclean";

/// The fixed file extension for artefact archives.
pub const ARTEFACT_EXTENSION: &str = ".tar.gz";

/// The GitHub repository releases are published from.
pub const GITHUB_REPO: &str = "kavhnr/oclean";

/// The name of the binary carried inside every archive.
pub const BINARY_NAME: &str = "oclean";

/// A fully-qualified artefact archive name.
///
/// # Examples
///
/// ```
/// use oclean_installer::artefact::naming::ArchiveName;
/// use oclean_installer::artefact::target::TargetTriple;
/// use oclean_installer::artefact::version::ReleaseVersion;
///
/// let version: ReleaseVersion = "0.1.0".parse().expect("valid version");
/// let target: TargetTriple = "aarch64-apple-darwin".try_into().expect("valid target");
/// let name = ArchiveName::new(version, target);
/// assert_eq!(name.to_string(), "oclean-v0.1.0-aarch64-apple-darwin.tar.gz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    version: ReleaseVersion,
    target: TargetTriple,
}

impl ArchiveName {
    /// Create an archive name from validated components.
    #[must_use]
    pub fn new(version: ReleaseVersion, target: TargetTriple) -> Self {
        Self { version, target }
    }

    /// Return the version component.
    #[must_use]
    pub fn version(&self) -> ReleaseVersion {
        self.version
    }

    /// Return the target triple component.
    #[must_use]
    pub fn target(&self) -> &TargetTriple {
        &self.target
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }

    /// Default download URL on the GitHub release for this archive.
    #[must_use]
    pub fn release_url(&self) -> String {
        format!(
            "https://github.com/{GITHUB_REPO}/releases/download/{}/{self}",
            self.version.tag()
        )
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ARTEFACT_PREFIX}-{}-{}{ARTEFACT_EXTENSION}",
            self.version.tag(),
            self.target
        )
    }
}
