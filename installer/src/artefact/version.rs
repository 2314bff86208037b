//! Semantic release version newtype.
//!
//! oclean releases are tagged `v<major>.<minor>.<patch>`. The leading `v` is
//! accepted on input and never stored.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `major.minor.patch` release version.
///
/// Ordering is numeric, so `0.1.10` sorts after `0.1.9`.
///
/// # Examples
///
/// ```
/// use oclean_installer::artefact::version::ReleaseVersion;
///
/// let old: ReleaseVersion = "0.1.0".parse().expect("valid");
/// let new: ReleaseVersion = "v0.1.1".parse().expect("valid");
/// assert!(new > old);
/// assert_eq!(new.tag(), "v0.1.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseVersion {
    major: u64,
    minor: u64,
    patch: u64,
}

impl ReleaseVersion {
    /// Create a version from its numeric components.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// The git tag the release is published under.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("v{self}")
    }
}

impl std::str::FromStr for ReleaseVersion {
    type Err = ArtefactError;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = |reason: &str| ArtefactError::InvalidVersion {
            value: value.to_owned(),
            reason: reason.to_owned(),
        };
        let trimmed = value.strip_prefix('v').unwrap_or(value);
        let mut parts = trimmed.split('.');
        let mut next_component = |name: &str| -> Result<u64> {
            let part = parts
                .next()
                .ok_or_else(|| invalid(&format!("missing {name} component")))?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(&format!("{name} component must be numeric")));
            }
            part.parse::<u64>()
                .map_err(|_| invalid(&format!("{name} component is out of range")))
        };
        let major = next_component("major")?;
        let minor = next_component("minor")?;
        let patch = next_component("patch")?;
        if parts.next().is_some() {
            return Err(invalid("expected exactly three components"));
        }
        Ok(Self::new(major, minor, patch))
    }
}

impl TryFrom<String> for ReleaseVersion {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ReleaseVersion> for String {
    fn from(version: ReleaseVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
