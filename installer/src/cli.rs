//! CLI argument definitions for the oclean installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::artefact::error::ArtefactError;
use crate::artefact::target::TargetTriple;
use crate::artefact::version::ReleaseVersion;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Install and manage the oclean binary.
#[derive(Parser, Debug)]
#[command(name = "oclean-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install and manage the oclean binary.\n\n",
    "oclean wraps opencode and cleans up the process tree it leaves behind. ",
    "This installer selects the published archive for the current platform, ",
    "verifies its SHA-256 digest, and places the binary in a bin directory.\n\n",
    "A checksum mismatch always aborts the installation and leaves any ",
    "existing binary untouched.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install the latest release into ~/.local/bin and check it runs:\n",
    "    $ oclean-installer install --test\n\n",
    "  Install a specific release into a custom directory:\n",
    "    $ oclean-installer install --release 0.1.0 --bin-dir /opt/tools/bin\n\n",
    "  Preview the selected artefact without downloading:\n",
    "    $ oclean-installer install --dry-run\n\n",
    "  Print the Homebrew formula for the latest release:\n",
    "    $ oclean-installer formula > Formula/oclean.rb\n\n",
    "  Verify every published checksum:\n",
    "    $ oclean-installer audit\n\n",
    "For more information, see: https://github.com/kavhnr/oclean",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file [default: <config dir>/oclean/installer.toml].
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<Utf8PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install a release (the latest by default).
    Install(InstallArgs),

    /// Install the latest release when it is newer than the installed one.
    Upgrade(InstallArgs),

    /// Check that the installed binary reports a version.
    Test(BinDirArgs),

    /// Show what is installed.
    Status(StatusArgs),

    /// Remove the installed binary and its receipt.
    Uninstall(BinDirArgs),

    /// Print the Homebrew formula for a release on stdout.
    Formula(ReleaseArgs),

    /// Download every artefact of a release and verify its checksum.
    Audit(ReleaseArgs),
}

/// Arguments for the install and upgrade commands.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Release to install, e.g. 0.1.1 [default: latest].
    #[arg(long, value_name = "VERSION")]
    pub release: Option<ReleaseVersion>,

    /// Directory the binary is placed into [default: platform-specific].
    #[arg(short, long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Release catalog to use instead of the embedded one.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<Utf8PathBuf>,

    /// Install the artefact for this target triple instead of the host's.
    #[arg(long, value_name = "TRIPLE", value_parser = parse_target)]
    pub target: Option<TargetTriple>,

    /// Run the `--version` acceptance check after installing.
    #[arg(long)]
    pub test: bool,

    /// Show the resolved artefact and exit without downloading.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for commands that only need the bin directory.
#[derive(Parser, Debug, Clone, Default)]
pub struct BinDirArgs {
    /// Directory holding the installed binary [default: from receipt].
    #[arg(short, long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,
}

/// Arguments for the status command.
#[derive(Parser, Debug, Clone, Default)]
pub struct StatusArgs {
    /// Output the receipt as JSON for scripting.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands operating on a catalog release.
#[derive(Parser, Debug, Clone, Default)]
pub struct ReleaseArgs {
    /// Release to use [default: latest].
    #[arg(long, value_name = "VERSION")]
    pub release: Option<ReleaseVersion>,

    /// Release catalog to use instead of the embedded one.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<Utf8PathBuf>,
}

fn parse_target(value: &str) -> Result<TargetTriple, ArtefactError> {
    TargetTriple::try_from(value)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
