//! Release audit: every published checksum must match the archive at its URL.

use crate::artefact::download::ArtefactDownloader;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::target::TargetTriple;
use crate::artefact::verification::verify_checksum;
use crate::catalog::Release;
use crate::error::Result;
use log::debug;

/// Outcome for one artefact of the audited release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditStatus {
    /// The downloaded archive hashes to the published digest.
    Verified,
    /// The archive was fetched but its digest differs.
    Mismatch {
        /// Digest of the fetched bytes.
        actual: Sha256Digest,
    },
    /// The archive could not be fetched or read.
    Unavailable {
        /// Description of the failure.
        reason: String,
    },
}

/// Audit result for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Target triple of the artefact.
    pub target: TargetTriple,
    /// Where the archive was fetched from.
    pub url: String,
    /// Digest published in the catalog.
    pub expected: Sha256Digest,
    /// What the check found.
    pub status: AuditStatus,
}

/// Audit results for a whole release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// One entry per published artefact, ordered by target.
    pub entries: Vec<AuditEntry>,
}

impl AuditReport {
    /// Number of entries that did not verify.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status != AuditStatus::Verified)
            .count()
    }

    /// True when every artefact verified.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures() == 0
    }

    /// One line per entry for terminal output.
    #[must_use]
    pub fn display_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| match &entry.status {
                AuditStatus::Verified => format!("ok       {} {}", entry.target, entry.expected),
                AuditStatus::Mismatch { actual } => format!(
                    "MISMATCH {} expected={} actual={actual}",
                    entry.target, entry.expected
                ),
                AuditStatus::Unavailable { reason } => {
                    format!("MISSING  {} {reason}", entry.target)
                }
            })
            .collect()
    }
}

/// Download every artefact of `release` and compare digests.
///
/// Individual download or checksum failures are recorded in the report
/// rather than aborting the audit.
///
/// # Errors
///
/// Returns an error only when the scratch directory cannot be created.
pub fn audit_release(
    release: &Release,
    downloader: &dyn ArtefactDownloader,
) -> Result<AuditReport> {
    let temp_dir = tempfile::tempdir()?;
    let entries = release
        .artefacts()
        .iter()
        .map(|artefact| {
            let archive_path = temp_dir.path().join(artefact.archive_name().filename());
            debug!("auditing {}", artefact.url());
            let status = match downloader.download_archive(artefact.url(), &archive_path) {
                Err(e) => AuditStatus::Unavailable {
                    reason: e.to_string(),
                },
                Ok(()) => match verify_checksum(&archive_path, artefact.sha256()) {
                    Ok(_) => AuditStatus::Verified,
                    Err(crate::artefact::verification::VerificationError::ChecksumMismatch {
                        actual,
                        ..
                    }) => AuditStatus::Mismatch { actual },
                    Err(e) => AuditStatus::Unavailable {
                        reason: e.to_string(),
                    },
                },
            };
            AuditEntry {
                target: artefact.target().clone(),
                url: artefact.url().to_owned(),
                expected: artefact.sha256().clone(),
                status,
            }
        })
        .collect();
    Ok(AuditReport { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReleaseCatalog;
    use crate::test_utils::{CatalogEntry, MapDownloader, catalog_toml, oclean_archive};

    const MAC: &str = "aarch64-apple-darwin";
    const LINUX: &str = "x86_64-unknown-linux-gnu";

    fn catalog(entries: &[CatalogEntry]) -> ReleaseCatalog {
        ReleaseCatalog::parse(&catalog_toml(entries)).expect("catalog")
    }

    #[test]
    fn all_matching_artefacts_pass() {
        let mac = oclean_archive("0.1.1");
        let linux = oclean_archive("0.1.1");
        let entries = [
            CatalogEntry::for_archive("0.1.1", MAC, &mac),
            CatalogEntry::for_archive("0.1.1", LINUX, &linux),
        ];
        let catalog = catalog(&entries);
        let mut downloader = MapDownloader::new();
        downloader.serve(entries[0].url.clone(), mac);
        downloader.serve(entries[1].url.clone(), linux);

        let release = catalog.latest().expect("latest");
        let report = audit_release(release, &downloader).expect("audit");
        assert!(report.passed());
        assert_eq!(report.entries.len(), 2);
        assert_eq!(downloader.requests().len(), 2);
    }

    #[test]
    fn mismatch_and_missing_are_reported_per_target() {
        let mac = oclean_archive("0.1.1");
        let entries = [
            CatalogEntry::for_archive("0.1.1", MAC, &mac),
            CatalogEntry::for_archive("0.1.1", LINUX, b"expected bytes"),
        ];
        let catalog = catalog(&entries);
        let mut downloader = MapDownloader::new();
        downloader.serve(entries[0].url.clone(), b"tampered".to_vec());

        let release = catalog.latest().expect("latest");
        let report = audit_release(release, &downloader).expect("audit");
        assert_eq!(report.failures(), 2);

        let by_target = |target: &str| {
            report
                .entries
                .iter()
                .find(|e| e.target.as_str() == target)
                .map(|e| e.status.clone())
                .expect("entry")
        };
        assert!(matches!(by_target(MAC), AuditStatus::Mismatch { .. }));
        assert!(matches!(by_target(LINUX), AuditStatus::Unavailable { .. }));

        let lines = report.display_lines();
        assert!(lines.iter().any(|l| l.starts_with("MISMATCH aarch64-apple-darwin")));
        assert!(lines.iter().any(|l| l.starts_with("MISSING  x86_64-unknown-linux-gnu")));
    }
}
