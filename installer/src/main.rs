//! oclean installer CLI entrypoint.
//!
//! This binary installs, upgrades, checks and removes the `oclean` binary,
//! and renders the Homebrew formula and checksum audit for a release.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{LevelFilter, warn};
use oclean_installer::acceptance::{DEFAULT_ACCEPTANCE_TIMEOUT, run_acceptance_check};
use oclean_installer::artefact::download::HttpDownloader;
use oclean_installer::artefact::naming::BINARY_NAME;
use oclean_installer::artefact::platform::Platform;
use oclean_installer::artefact::target::TargetTriple;
use oclean_installer::audit::audit_release;
use oclean_installer::catalog::ReleaseCatalog;
use oclean_installer::cli::{BinDirArgs, Cli, Command, InstallArgs, ReleaseArgs, StatusArgs};
use oclean_installer::config::InstallerConfig;
use oclean_installer::dirs::{BaseDirs, SystemBaseDirs};
use oclean_installer::error::{InstallerError, Result};
use oclean_installer::formula::render_formula;
use oclean_installer::install::{
    InstallRequest, UpgradeOutcome, install_release, plan_install, select_release, uninstall,
    upgrade,
};
use oclean_installer::output::{DryRunInfo, status_text, write_stderr_line};
use oclean_installer::receipt::{InstallReceipt, RECEIPT_FILE_NAME};
use std::io::Write;
use std::path::PathBuf;

/// Environment variable holding an `env_logger` filter.
const LOG_ENV: &str = "OCLEAN_LOG";

struct RunContext<'a> {
    cli: &'a Cli,
    dirs: &'a dyn BaseDirs,
    config: &'a InstallerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstallMode {
    Install,
    Upgrade,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity);
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemBaseDirs::new(), &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env(LOG_ENV)
        .format_timestamp(None)
        .init();
}

fn run(
    cli: &Cli,
    dirs: &dyn BaseDirs,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<()> {
    let config = InstallerConfig::discover(cli.config.as_deref(), dirs)?;
    let context = RunContext {
        cli,
        dirs,
        config: &config,
    };

    match &cli.command {
        Command::Install(args) => run_install(&context, args, InstallMode::Install, stderr),
        Command::Upgrade(args) => run_install(&context, args, InstallMode::Upgrade, stderr),
        Command::Test(args) => run_test(&context, args, stderr),
        Command::Status(args) => run_status(&context, args, stdout),
        Command::Uninstall(args) => run_uninstall(&context, args, stderr),
        Command::Formula(args) => run_formula(&context, args, stdout),
        Command::Audit(args) => run_audit(&context, args, stdout),
    }
}

/// Installs or upgrades, then optionally runs the acceptance check.
fn run_install(
    context: &RunContext<'_>,
    args: &InstallArgs,
    mode: InstallMode,
    stderr: &mut dyn Write,
) -> Result<()> {
    let catalog = load_catalog(context, args.catalog.as_deref())?;
    let platform = resolve_platform(args.target.as_ref())?;
    let receipt_path = receipt_path(context.dirs)?;
    let bin_dir = match mode {
        InstallMode::Install => resolve_bin_dir(context, args.bin_dir.as_deref())?,
        InstallMode::Upgrade => upgrade_bin_dir(context, args.bin_dir.as_deref(), &receipt_path)?,
    };

    // Dry-run mode: show what would be done without side effects
    if args.dry_run {
        let plan = plan_install(&catalog, args.release, platform)?;
        let destination = bin_dir.join(BINARY_NAME);
        let info = DryRunInfo {
            artefact: plan.artefact,
            destination: &destination,
            run_test: args.test,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let request = InstallRequest {
        catalog: &catalog,
        version: args.release,
        platform,
        bin_dir: &bin_dir,
        receipt_path: &receipt_path,
        download_timeout: context.config.download_timeout(),
        quiet: context.cli.quiet,
    };
    let binary = match mode {
        InstallMode::Install => install_release(&request, stderr)?.receipt.binary_path,
        InstallMode::Upgrade => match upgrade(&request, stderr)? {
            UpgradeOutcome::Installed(outcome) => outcome.receipt.binary_path,
            UpgradeOutcome::UpToDate(_) => installed_binary(context, args.bin_dir.as_deref())?,
        },
    };

    if args.test {
        check_binary(&binary, context.cli.quiet, stderr)?;
    }
    Ok(())
}

fn run_test(context: &RunContext<'_>, args: &BinDirArgs, stderr: &mut dyn Write) -> Result<()> {
    let binary = installed_binary(context, args.bin_dir.as_deref())?;
    check_binary(&binary, context.cli.quiet, stderr)
}

fn run_status(context: &RunContext<'_>, args: &StatusArgs, stdout: &mut dyn Write) -> Result<()> {
    let receipt =
        InstallReceipt::load(&receipt_path(context.dirs)?)?.ok_or(InstallerError::NotInstalled)?;
    let text = if args.json {
        serde_json::to_string_pretty(&receipt).map_err(std::io::Error::from)?
    } else {
        status_text(&receipt)
    };
    writeln!(stdout, "{text}").map_err(|source| InstallerError::WriteFailed { source })
}

fn run_uninstall(
    context: &RunContext<'_>,
    args: &BinDirArgs,
    stderr: &mut dyn Write,
) -> Result<()> {
    let bin_dir = resolve_bin_dir(context, args.bin_dir.as_deref())?;
    let outcome = uninstall(&bin_dir, &receipt_path(context.dirs)?)?;
    if !context.cli.quiet {
        let what = outcome
            .version
            .map_or_else(|| "oclean".to_owned(), |v| format!("oclean {v}"));
        match outcome.removed_binary {
            Some(path) => write_stderr_line(stderr, format!("Removed {what} from {path}")),
            None => write_stderr_line(stderr, format!("Removed install receipt for {what}")),
        }
    }
    Ok(())
}

fn run_formula(context: &RunContext<'_>, args: &ReleaseArgs, stdout: &mut dyn Write) -> Result<()> {
    let catalog = load_catalog(context, args.catalog.as_deref())?;
    let release = select_release(&catalog, args.release)?;
    stdout
        .write_all(render_formula(&catalog, release).as_bytes())
        .map_err(|source| InstallerError::WriteFailed { source })
}

fn run_audit(context: &RunContext<'_>, args: &ReleaseArgs, stdout: &mut dyn Write) -> Result<()> {
    let catalog = load_catalog(context, args.catalog.as_deref())?;
    let release = select_release(&catalog, args.release)?;
    let downloader = HttpDownloader::new(context.config.download_timeout());
    let report = audit_release(release, &downloader)?;
    for line in report.display_lines() {
        writeln!(stdout, "{line}").map_err(|source| InstallerError::WriteFailed { source })?;
    }
    if report.passed() {
        Ok(())
    } else {
        Err(InstallerError::AuditFailed {
            version: release.version(),
            failures: report.failures(),
        })
    }
}

/// Runs the `--version` acceptance check against `binary`.
fn check_binary(binary: &Utf8Path, quiet: bool, stderr: &mut dyn Write) -> Result<()> {
    let report = run_acceptance_check(binary, DEFAULT_ACCEPTANCE_TIMEOUT)?;
    if !quiet {
        write_stderr_line(
            stderr,
            format!("Acceptance check passed: {binary} reports {}", report.version),
        );
    }
    Ok(())
}

/// Catalog from the CLI flag, then the config file, then the embedded one.
fn load_catalog(
    context: &RunContext<'_>,
    cli_catalog: Option<&Utf8Path>,
) -> Result<ReleaseCatalog> {
    let path = cli_catalog.or(context.config.catalog.as_deref());
    Ok(ReleaseCatalog::load_or_embedded(path)?)
}

/// Platform from `--target`, else the host. A target other than the host
/// is allowed but logged.
fn resolve_platform(target: Option<&TargetTriple>) -> Result<Platform> {
    let host = Platform::detect();
    let Some(triple) = target else {
        return Ok(host?);
    };
    let requested = triple.platform();
    if let Some(message) = foreign_target_warning(requested, host.ok()) {
        warn!("{message}");
    }
    Ok(requested)
}

fn foreign_target_warning(requested: Platform, host: Option<Platform>) -> Option<String> {
    match host {
        Some(host) if host == requested => None,
        Some(host) => Some(format!(
            "installing the {requested} build on this {host} host; it may not run here"
        )),
        None => Some(format!(
            "installing the {requested} build on an unrecognised host; it may not run here"
        )),
    }
}

/// Bin directory from the CLI flag, then the config file, then the platform.
fn resolve_bin_dir(context: &RunContext<'_>, cli_dir: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    if let Some(dir) = cli_dir.or(context.config.bin_dir.as_deref()) {
        return Ok(dir.to_owned());
    }
    let dir = context
        .dirs
        .bin_dir()
        .ok_or(InstallerError::DirectoryUnavailable { what: "bin" })?;
    utf8(dir)
}

/// Bin directory for an upgrade: an explicit directory wins, otherwise the
/// directory of the binary the receipt records.
fn upgrade_bin_dir(
    context: &RunContext<'_>,
    cli_dir: Option<&Utf8Path>,
    receipt_path: &Utf8Path,
) -> Result<Utf8PathBuf> {
    if cli_dir.or(context.config.bin_dir.as_deref()).is_none() {
        let installed_dir = InstallReceipt::load(receipt_path)?
            .and_then(|receipt| receipt.binary_path.parent().map(Utf8Path::to_owned));
        if let Some(dir) = installed_dir {
            return Ok(dir);
        }
    }
    resolve_bin_dir(context, cli_dir)
}

fn receipt_path(dirs: &dyn BaseDirs) -> Result<Utf8PathBuf> {
    let dir = dirs
        .oclean_data_dir()
        .ok_or(InstallerError::DirectoryUnavailable { what: "data" })?;
    Ok(utf8(dir)?.join(RECEIPT_FILE_NAME))
}

/// The binary an explicit bin directory, the receipt, or the default bin
/// directory points at, in that order.
fn installed_binary(context: &RunContext<'_>, cli_dir: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    if let Some(dir) = cli_dir {
        return Ok(dir.join(BINARY_NAME));
    }
    if let Some(receipt) = InstallReceipt::load(&receipt_path(context.dirs)?)? {
        return Ok(receipt.binary_path);
    }
    let candidate = resolve_bin_dir(context, None)?.join(BINARY_NAME);
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(InstallerError::NotInstalled)
    }
}

fn utf8(path: PathBuf) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| InstallerError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, &err);
            err.exit_code()
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
