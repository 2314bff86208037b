//! Install, upgrade and uninstall orchestration.
//!
//! The install pipeline is strictly sequential:
//! select → download → verify → extract → locate → place → record.
//! Any failure before placement leaves the bin directory untouched; there
//! is no retry and no fallback to a different artefact.

use crate::artefact::download::{ArtefactDownloader, HttpDownloader};
use crate::artefact::extraction::{ArtefactExtractor, GzipExtractor};
use crate::artefact::naming::BINARY_NAME;
use crate::artefact::platform::Platform;
use crate::artefact::verification::verify_checksum;
use crate::artefact::version::ReleaseVersion;
use crate::catalog::{Artefact, CatalogError, Release, ReleaseCatalog};
use crate::error::{InstallerError, Result};
use crate::output::{success_message, write_stderr_line};
use crate::receipt::InstallReceipt;
use crate::stager::Stager;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the install pipeline needs to know.
#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    /// Catalog to select the release from.
    pub catalog: &'a ReleaseCatalog,
    /// Release to install; `None` means the latest.
    pub version: Option<ReleaseVersion>,
    /// Platform whose artefact is selected.
    pub platform: Platform,
    /// Directory the binary is placed into.
    pub bin_dir: &'a Utf8Path,
    /// Where the install receipt lives.
    pub receipt_path: &'a Utf8Path,
    /// Network timeout for the archive download.
    pub download_timeout: Duration,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// The release and artefact an install would use.
#[derive(Debug, Clone, Copy)]
pub struct InstallPlan<'a> {
    /// Selected release.
    pub release: &'a Release,
    /// Artefact matching the platform.
    pub artefact: &'a Artefact,
}

/// Result of a completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// The receipt written for the new install.
    pub receipt: InstallReceipt,
    /// Version that was installed before, if the receipt recorded one.
    pub previous: Option<ReleaseVersion>,
}

/// Result of an upgrade request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The installed version is already the latest.
    UpToDate(ReleaseVersion),
    /// A newer release (or a first install) was placed.
    Installed(InstallOutcome),
}

/// Result of an uninstall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallOutcome {
    /// The binary that was deleted, if one existed.
    pub removed_binary: Option<Utf8PathBuf>,
    /// The version the receipt recorded, if any.
    pub version: Option<ReleaseVersion>,
}

/// Look up `version` in the catalog, or the latest release for `None`.
///
/// # Errors
///
/// Returns [`InstallerError::ReleaseNotFound`] for an unknown version.
pub fn select_release(
    catalog: &ReleaseCatalog,
    version: Option<ReleaseVersion>,
) -> Result<&Release> {
    match version {
        Some(version) => catalog
            .release(version)
            .ok_or(InstallerError::ReleaseNotFound { version }),
        None => Ok(catalog.latest().ok_or(CatalogError::NoReleases)?),
    }
}

/// Resolve the release and platform artefact without side effects.
///
/// # Errors
///
/// Returns [`InstallerError::ReleaseNotFound`] for an unknown version and
/// an unsupported-platform error when the release has no matching artefact.
pub fn plan_install(
    catalog: &ReleaseCatalog,
    version: Option<ReleaseVersion>,
    platform: Platform,
) -> Result<InstallPlan<'_>> {
    let release = select_release(catalog, version)?;
    let artefact = release.select(platform)?;
    Ok(InstallPlan { release, artefact })
}

/// Install a release using the production downloader and extractor.
///
/// # Errors
///
/// See [`install_release_with`].
pub fn install_release(
    request: &InstallRequest<'_>,
    stderr: &mut dyn Write,
) -> Result<InstallOutcome> {
    let downloader = HttpDownloader::new(request.download_timeout);
    install_release_with(request, &downloader, &GzipExtractor, stderr)
}

/// Testable inner function with injected dependencies.
///
/// The production entry point [`install_release`] delegates here with
/// real implementations; tests inject mocks.
///
/// # Errors
///
/// Returns an [`InstallerError`] for an unknown release, an unsupported
/// platform, a failed download, a checksum mismatch, a malformed archive,
/// an archive without the binary, or a placement or receipt failure.
pub fn install_release_with(
    request: &InstallRequest<'_>,
    downloader: &dyn ArtefactDownloader,
    extractor: &dyn ArtefactExtractor,
    stderr: &mut dyn Write,
) -> Result<InstallOutcome> {
    let plan = plan_install(request.catalog, request.version, request.platform)?;
    let artefact = plan.artefact;
    let archive_name = artefact.archive_name().filename();

    let stager = Stager::new(request.bin_dir.to_owned());
    stager.prepare()?;

    let temp_dir = tempfile::tempdir()?;
    let archive_path = temp_dir.path().join(&archive_name);

    progress(request, stderr, format!("Downloading {archive_name}..."));
    downloader.download_archive(artefact.url(), &archive_path)?;

    progress(
        request,
        stderr,
        format!("Verifying SHA-256 {}...", artefact.sha256().short()),
    );
    let digest = verify_checksum(&archive_path, artefact.sha256())?;

    let extract_dir = temp_dir.path().join("extracted");
    std::fs::create_dir_all(&extract_dir)?;
    let entries = extractor.extract(&archive_path, &extract_dir)?;
    let binary = locate_binary(&entries).ok_or_else(|| InstallerError::MissingBinary {
        archive: archive_name.clone(),
    })?;
    let source = utf8_path(extract_dir.join(binary))?;

    let previous = previous_version(request.receipt_path);
    let binary_path = stager.place(&source)?;
    let receipt = InstallReceipt::new(
        plan.release.version(),
        artefact.target().clone(),
        digest,
        binary_path,
    );
    receipt.save(request.receipt_path)?;

    progress(request, stderr, success_message(&receipt));
    Ok(InstallOutcome { receipt, previous })
}

/// Upgrade to the latest release using production implementations.
///
/// # Errors
///
/// See [`upgrade_with`].
pub fn upgrade(request: &InstallRequest<'_>, stderr: &mut dyn Write) -> Result<UpgradeOutcome> {
    let downloader = HttpDownloader::new(request.download_timeout);
    upgrade_with(request, &downloader, &GzipExtractor, stderr)
}

/// Install the requested (default latest) release if it is newer than the
/// version recorded in the receipt.
///
/// # Errors
///
/// Returns the receipt error when the receipt is corrupt, and any
/// [`install_release_with`] error otherwise.
pub fn upgrade_with(
    request: &InstallRequest<'_>,
    downloader: &dyn ArtefactDownloader,
    extractor: &dyn ArtefactExtractor,
    stderr: &mut dyn Write,
) -> Result<UpgradeOutcome> {
    let plan = plan_install(request.catalog, request.version, request.platform)?;
    let target = plan.release.version();
    if let Some(current) = InstallReceipt::load(request.receipt_path)? {
        if current.version >= target && current.binary_path.exists() {
            progress(
                request,
                stderr,
                format!("oclean {} is up to date", current.version),
            );
            return Ok(UpgradeOutcome::UpToDate(current.version));
        }
        progress(
            request,
            stderr,
            format!("Upgrading oclean {} -> {target}", current.version),
        );
    }
    let pinned = InstallRequest {
        version: Some(target),
        ..*request
    };
    install_release_with(&pinned, downloader, extractor, stderr).map(UpgradeOutcome::Installed)
}

/// Remove the installed binary and the receipt.
///
/// The binary recorded in the receipt is removed; without a receipt the
/// binary in `bin_dir` is removed.
///
/// # Errors
///
/// Returns [`InstallerError::NotInstalled`] when neither a receipt nor a
/// binary exists, and I/O or receipt errors otherwise.
pub fn uninstall(bin_dir: &Utf8Path, receipt_path: &Utf8Path) -> Result<UninstallOutcome> {
    let receipt = InstallReceipt::load(receipt_path)?;
    let installed_dir = receipt
        .as_ref()
        .and_then(|r| r.binary_path.parent())
        .unwrap_or(bin_dir);
    let stager = Stager::new(installed_dir.to_owned());

    let removed_binary = stager.remove()?.then(|| stager.binary_path());
    InstallReceipt::remove(receipt_path)?;

    if receipt.is_none() && removed_binary.is_none() {
        return Err(InstallerError::NotInstalled);
    }
    debug!("uninstalled {removed_binary:?}");
    Ok(UninstallOutcome {
        removed_binary,
        version: receipt.map(|r| r.version),
    })
}

/// Pick the `oclean` entry from the extracted files, preferring the
/// shallowest one.
fn locate_binary(entries: &[PathBuf]) -> Option<&Path> {
    entries
        .iter()
        .filter(|path| path.file_name().is_some_and(|name| name == BINARY_NAME))
        .min_by_key(|path| path.components().count())
        .map(PathBuf::as_path)
}

fn utf8_path(path: PathBuf) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| InstallerError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

fn previous_version(receipt_path: &Utf8Path) -> Option<ReleaseVersion> {
    match InstallReceipt::load(receipt_path) {
        Ok(receipt) => receipt.map(|r| r.version),
        Err(e) => {
            warn!("ignoring unreadable receipt: {e}");
            None
        }
    }
}

fn progress(request: &InstallRequest<'_>, stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if !request.quiet {
        write_stderr_line(stderr, message);
    }
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
