//! Tests for installer CLI parsing and default behaviours.

use super::*;
use clap::CommandFactory;
use rstest::rstest;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn install_parses_defaults() {
    let cli = Cli::parse_from(["oclean-installer", "install"]);
    let Command::Install(args) = cli.command else {
        panic!("expected Install command");
    };
    assert!(args.release.is_none());
    assert!(args.bin_dir.is_none());
    assert!(args.catalog.is_none());
    assert!(args.target.is_none());
    assert!(!args.test);
    assert!(!args.dry_run);
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
    assert!(cli.config.is_none());
}

#[test]
fn install_parses_every_flag() {
    let cli = Cli::parse_from([
        "oclean-installer",
        "install",
        "--release",
        "v0.1.1",
        "--bin-dir",
        "/opt/bin",
        "--catalog",
        "/srv/releases.toml",
        "--target",
        "x86_64-unknown-linux-gnu",
        "--test",
        "--dry-run",
    ]);
    let Command::Install(args) = cli.command else {
        panic!("expected Install command");
    };
    assert_eq!(args.release, Some(ReleaseVersion::new(0, 1, 1)));
    assert_eq!(args.bin_dir, Some(Utf8PathBuf::from("/opt/bin")));
    assert_eq!(args.catalog, Some(Utf8PathBuf::from("/srv/releases.toml")));
    assert_eq!(
        args.target.as_ref().map(TargetTriple::as_str),
        Some("x86_64-unknown-linux-gnu")
    );
    assert!(args.test);
    assert!(args.dry_run);
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = Cli::parse_from([
        "oclean-installer",
        "upgrade",
        "-vv",
        "--quiet",
        "--config",
        "/etc/oclean.toml",
    ]);
    assert!(matches!(cli.command, Command::Upgrade(_)));
    assert_eq!(cli.verbosity, 2);
    assert!(cli.quiet);
    assert_eq!(cli.config, Some(Utf8PathBuf::from("/etc/oclean.toml")));
}

#[rstest]
#[case::bad_version(&["oclean-installer", "install", "--release", "1.2"])]
#[case::unknown_target(&["oclean-installer", "install", "--target", "riscv64gc-unknown-linux-gnu"])]
#[case::missing_subcommand(&["oclean-installer"])]
fn invalid_arguments_are_rejected(#[case] argv: &[&str]) {
    assert!(Cli::try_parse_from(argv).is_err());
}

#[test]
fn status_parses_json_flag() {
    let cli = Cli::parse_from(["oclean-installer", "status", "--json"]);
    let Command::Status(args) = cli.command else {
        panic!("expected Status command");
    };
    assert!(args.json);
}

#[rstest]
#[case::test("test")]
#[case::uninstall("uninstall")]
fn bin_dir_commands_accept_short_flag(#[case] subcommand: &str) {
    let cli = Cli::parse_from(["oclean-installer", subcommand, "-b", "/tmp/bin"]);
    let args = match cli.command {
        Command::Test(args) | Command::Uninstall(args) => args,
        other => panic!("unexpected command {other:?}"),
    };
    assert_eq!(args.bin_dir, Some(Utf8PathBuf::from("/tmp/bin")));
}

#[rstest]
#[case::formula("formula")]
#[case::audit("audit")]
fn release_commands_parse_release_and_catalog(#[case] subcommand: &str) {
    let cli = Cli::parse_from([
        "oclean-installer",
        subcommand,
        "--release",
        "0.1.0",
        "--catalog",
        "releases.toml",
    ]);
    let args = match cli.command {
        Command::Formula(args) | Command::Audit(args) => args,
        other => panic!("unexpected command {other:?}"),
    };
    assert_eq!(args.release, Some(ReleaseVersion::new(0, 1, 0)));
    assert_eq!(args.catalog, Some(Utf8PathBuf::from("releases.toml")));
}
