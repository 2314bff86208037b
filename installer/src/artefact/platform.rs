//! Host platform detection for artefact selection.
//!
//! A [`Platform`] is an (operating system, CPU architecture) pair. The
//! installer detects the host platform at runtime and maps it onto a
//! [`TargetTriple`] to pick the matching release artefact.
//!
//! ## Supported platforms
//!
//! - macOS on ARM64 and `x86_64`
//! - Linux on `x86_64` and ARM64

use super::error::{ArtefactError, Result};
use super::target::TargetTriple;
use std::fmt;

/// Operating systems oclean is distributed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// Apple macOS.
    MacOs,
    /// GNU/Linux.
    Linux,
}

/// CPU architectures oclean is distributed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit ARM (Apple Silicon, Graviton).
    Aarch64,
    /// 64-bit Intel/AMD.
    X86_64,
}

impl Os {
    /// Human-readable name used in messages and formula text.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
        }
    }
}

impl Arch {
    /// The architecture component of a target triple.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aarch64 => "aarch64",
            Self::X86_64 => "x86_64",
        }
    }
}

/// An (operating system, architecture) pair.
///
/// # Examples
///
/// ```
/// use oclean_installer::artefact::platform::{Arch, Os, Platform};
///
/// let platform = Platform::from_parts("macos", "aarch64").expect("supported");
/// assert_eq!(platform, Platform::new(Os::MacOs, Arch::Aarch64));
/// assert_eq!(platform.target_triple().as_str(), "aarch64-apple-darwin");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    os: Os,
    arch: Arch,
}

impl Platform {
    /// Create a platform from its components.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the platform the installer is running on.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedHost`] when the host OS or
    /// architecture is outside the distribution matrix.
    pub fn detect() -> Result<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build a platform from `std::env::consts`-style OS and arch names.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedHost`] for any other values.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        let unsupported = || ArtefactError::UnsupportedHost {
            os: os.to_owned(),
            arch: arch.to_owned(),
        };
        let parsed_os = match os {
            "macos" => Os::MacOs,
            "linux" => Os::Linux,
            _ => return Err(unsupported()),
        };
        let parsed_arch = match arch {
            "aarch64" => Arch::Aarch64,
            "x86_64" => Arch::X86_64,
            _ => return Err(unsupported()),
        };
        Ok(Self::new(parsed_os, parsed_arch))
    }

    /// Return the operating system.
    #[must_use]
    pub fn os(self) -> Os {
        self.os
    }

    /// Return the CPU architecture.
    #[must_use]
    pub fn arch(self) -> Arch {
        self.arch
    }

    /// Map this platform onto the target triple its artefact is built for.
    #[must_use]
    pub fn target_triple(self) -> TargetTriple {
        let triple = match (self.os, self.arch) {
            (Os::MacOs, Arch::Aarch64) => "aarch64-apple-darwin",
            (Os::MacOs, Arch::X86_64) => "x86_64-apple-darwin",
            (Os::Linux, Arch::X86_64) => "x86_64-unknown-linux-gnu",
            (Os::Linux, Arch::Aarch64) => "aarch64-unknown-linux-gnu",
        };
        TargetTriple::from_known(triple)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.arch.as_str(), self.os.display_name())
    }
}
