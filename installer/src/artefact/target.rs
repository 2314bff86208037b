//! Target triple validation for release artefacts.
//!
//! Only the four Unix triples oclean can be built for are accepted. Any other
//! triple is rejected at construction time with a descriptive error.

use super::error::{ArtefactError, Result};
use super::platform::{Arch, Os, Platform};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The target triples an oclean release may publish.
const SUPPORTED_TARGETS: &[&str] = &[
    "aarch64-apple-darwin",
    "x86_64-apple-darwin",
    "x86_64-unknown-linux-gnu",
    "aarch64-unknown-linux-gnu",
];

/// A validated target triple from the supported set.
///
/// Construction via [`TryFrom`] rejects any triple not in the supported set.
///
/// # Examples
///
/// ```
/// use oclean_installer::artefact::target::TargetTriple;
///
/// let triple: TargetTriple = "x86_64-unknown-linux-gnu"
///     .try_into()
///     .expect("valid target triple");
/// assert_eq!(triple.as_str(), "x86_64-unknown-linux-gnu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetTriple(String);

impl TargetTriple {
    /// Return the triple as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a triple taken from the supported table without re-validating it.
    pub(super) fn from_known(triple: &'static str) -> Self {
        debug_assert!(SUPPORTED_TARGETS.contains(&triple));
        Self(triple.to_owned())
    }

    /// Return the full list of supported target triples.
    #[must_use]
    pub fn supported() -> &'static [&'static str] {
        SUPPORTED_TARGETS
    }

    /// Return the platform this triple was built for.
    ///
    /// # Examples
    ///
    /// ```
    /// use oclean_installer::artefact::platform::{Arch, Os};
    /// use oclean_installer::artefact::target::TargetTriple;
    ///
    /// let triple: TargetTriple = "aarch64-apple-darwin".try_into().expect("valid");
    /// let platform = triple.platform();
    /// assert_eq!(platform.os(), Os::MacOs);
    /// assert_eq!(platform.arch(), Arch::Aarch64);
    /// ```
    #[must_use]
    pub fn platform(&self) -> Platform {
        let arch = if self.0.starts_with("aarch64") {
            Arch::Aarch64
        } else {
            Arch::X86_64
        };
        let os = if self.0.contains("darwin") {
            Os::MacOs
        } else {
            Os::Linux
        };
        Platform::new(os, arch)
    }
}

impl TryFrom<&str> for TargetTriple {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        if SUPPORTED_TARGETS.contains(&value) {
            Ok(Self(value.to_owned()))
        } else {
            Err(ArtefactError::UnsupportedTarget {
                value: value.to_owned(),
                expected: SUPPORTED_TARGETS.join(", "),
            })
        }
    }
}

impl TryFrom<String> for TargetTriple {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl From<TargetTriple> for String {
    fn from(triple: TargetTriple) -> Self {
        triple.0
    }
}

impl AsRef<str> for TargetTriple {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
