//! Output formatting for the installer CLI.
//!
//! Progress and result text goes to an injected writer so that the pipeline
//! can be driven from tests with a `Vec<u8>` in place of stderr.

use crate::catalog::Artefact;
use crate::receipt::InstallReceipt;
use camino::Utf8Path;
use std::io::Write;

/// Write a line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format a success message after installation.
#[must_use]
pub fn success_message(receipt: &InstallReceipt) -> String {
    format!(
        "Installed oclean {} ({}) to {}",
        receipt.version, receipt.target, receipt.binary_path
    )
}

/// Human-readable rendering of an install receipt for `status`.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use oclean_installer::output::status_text;
/// use oclean_installer::receipt::InstallReceipt;
///
/// let receipt = InstallReceipt::new(
///     "0.1.0".parse().expect("version"),
///     "x86_64-unknown-linux-gnu".try_into().expect("target"),
///     "495f121f96ec93a9d9de661c701ed6807da36d575dc135b9929ffcb59fabe456"
///         .try_into()
///         .expect("digest"),
///     Utf8PathBuf::from("/home/user/.local/bin/oclean"),
/// );
/// assert!(status_text(&receipt).contains("Version: 0.1.0"));
/// ```
#[must_use]
pub fn status_text(receipt: &InstallReceipt) -> String {
    [
        format!("Version: {}", receipt.version),
        format!("Target: {}", receipt.target),
        format!("Binary: {}", receipt.binary_path),
        format!("Archive SHA-256: {}", receipt.sha256),
        format!("Installed at (unix): {}", receipt.installed_at),
    ]
    .join("\n")
}

/// Configuration information for dry-run output.
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// The artefact that would be installed.
    pub artefact: &'a Artefact,
    /// Where the binary would be placed.
    pub destination: &'a Utf8Path,
    /// Whether the acceptance check would run afterwards.
    pub run_test: bool,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        [
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Release: {}", self.artefact.version()),
            format!("Target: {}", self.artefact.target()),
            format!("Archive: {}", self.artefact.archive_name()),
            format!("URL: {}", self.artefact.url()),
            format!("SHA-256: {}", self.artefact.sha256()),
            format!("Destination: {}", self.destination),
            format!("Acceptance check: {}", self.run_test),
        ]
        .join("\n")
    }
}
