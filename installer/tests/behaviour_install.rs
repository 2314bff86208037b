//! Behaviour-driven tests for the install pipeline.
//!
//! Archives are served from memory by `MapDownloader`, so the scenarios
//! exercise selection, verification, extraction, placement and the
//! acceptance check without network access. Tests use the rstest-bdd v0.5.0
//! mutable world pattern.

use camino::Utf8PathBuf;
use oclean_installer::acceptance::{
    AcceptanceError, AcceptanceReport, DEFAULT_ACCEPTANCE_TIMEOUT, run_acceptance_check,
};
use oclean_installer::artefact::error::ArtefactError;
use oclean_installer::artefact::extraction::GzipExtractor;
use oclean_installer::artefact::platform::Platform;
use oclean_installer::artefact::target::TargetTriple;
use oclean_installer::artefact::verification::VerificationError;
use oclean_installer::artefact::version::ReleaseVersion;
use oclean_installer::catalog::ReleaseCatalog;
use oclean_installer::error::InstallerError;
use oclean_installer::install::{InstallRequest, install_release_with, upgrade_with};
use oclean_installer::receipt::InstallReceipt;
use oclean_installer::test_utils::{
    CatalogEntry, MapDownloader, catalog_toml, fake_binary_script, oclean_archive,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::time::Duration;

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

struct InstallWorld {
    _temp: tempfile::TempDir,
    bin_dir: Utf8PathBuf,
    receipt_path: Utf8PathBuf,
    entries: Vec<CatalogEntry>,
    downloader: MapDownloader,
    platform: Option<Platform>,
    outcome: Option<Result<(), InstallerError>>,
    acceptance: Option<Result<AcceptanceReport, AcceptanceError>>,
}

impl InstallWorld {
    fn binary_path(&self) -> Utf8PathBuf {
        self.bin_dir.join("oclean")
    }

    fn catalog(&self) -> ReleaseCatalog {
        ReleaseCatalog::parse(&catalog_toml(&self.entries)).expect("world catalog")
    }

    fn request<'a>(
        &'a self,
        catalog: &'a ReleaseCatalog,
        version: Option<ReleaseVersion>,
    ) -> InstallRequest<'a> {
        InstallRequest {
            catalog,
            version,
            platform: self.platform.expect("host platform set"),
            bin_dir: &self.bin_dir,
            receipt_path: &self.receipt_path,
            download_timeout: Duration::from_secs(1),
            quiet: true,
        }
    }

    fn error(&self) -> &InstallerError {
        match self.outcome.as_ref().expect("an install was attempted") {
            Ok(()) => panic!("expected the installation to fail"),
            Err(err) => err,
        }
    }
}

#[fixture]
fn world() -> InstallWorld {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp path");
    InstallWorld {
        _temp: temp,
        bin_dir: root.join("bin"),
        receipt_path: root.join("data").join("install-receipt.json"),
        entries: Vec::new(),
        downloader: MapDownloader::new(),
        platform: None,
        outcome: None,
        acceptance: None,
    }
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a catalog publishing \"{version}\" for \"{target}\"")]
fn given_catalog_publishing(world: &mut InstallWorld, version: String, target: String) {
    let archive = oclean_archive(&version);
    let entry = CatalogEntry::for_archive(&version, &target, &archive);
    world.downloader.serve(entry.url.clone(), archive);
    world.entries.push(entry);
}

#[given("the host platform is \"{target}\"")]
fn given_host_platform(world: &mut InstallWorld, target: String) {
    let triple = TargetTriple::try_from(target).expect("test triple");
    world.platform = Some(triple.platform());
}

#[given("an existing oclean binary")]
fn given_existing_binary(world: &mut InstallWorld) {
    std::fs::create_dir_all(&world.bin_dir).expect("bin dir");
    std::fs::write(world.binary_path(), b"previous").expect("seed binary");
}

#[given("the published archive has been tampered with")]
fn given_tampered_archive(world: &mut InstallWorld) {
    for entry in &world.entries {
        world.downloader.serve(entry.url.clone(), b"tampered".to_vec());
    }
}

#[given("release \"{version}\" is installed")]
fn given_release_installed(world: &mut InstallWorld, version: String) {
    let catalog = world.catalog();
    let version: ReleaseVersion = version.parse().expect("test version");
    install_release_with(
        &world.request(&catalog, Some(version)),
        &world.downloader,
        &GzipExtractor,
        &mut Vec::new(),
    )
    .expect("initial install");
}

#[given("an installed binary without a version")]
fn given_versionless_binary(world: &mut InstallWorld) {
    std::fs::create_dir_all(&world.bin_dir).expect("bin dir");
    std::fs::write(world.binary_path(), fake_binary_script(None)).expect("write script");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(world.binary_path(), std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
    }
}

#[when("the latest release is installed")]
fn when_latest_installed(world: &mut InstallWorld) {
    let catalog = world.catalog();
    let result = install_release_with(
        &world.request(&catalog, None),
        &world.downloader,
        &GzipExtractor,
        &mut Vec::new(),
    )
    .map(|_| ());
    world.outcome = Some(result);
}

#[when("the installation is upgraded")]
fn when_upgraded(world: &mut InstallWorld) {
    let catalog = world.catalog();
    let result = upgrade_with(
        &world.request(&catalog, None),
        &world.downloader,
        &GzipExtractor,
        &mut Vec::new(),
    )
    .map(|_| ());
    world.outcome = Some(result);
}

#[when("the acceptance check runs")]
fn when_acceptance_runs(world: &mut InstallWorld) {
    world.acceptance = Some(run_acceptance_check(
        &world.binary_path(),
        DEFAULT_ACCEPTANCE_TIMEOUT,
    ));
}

#[then("the installation succeeds")]
fn then_installation_succeeds(world: &mut InstallWorld) {
    let outcome = world.outcome.as_ref().expect("an install was attempted");
    assert!(outcome.is_ok(), "install failed: {outcome:?}");
}

#[then("the installed binary reports version \"{version}\"")]
fn then_binary_reports_version(world: &mut InstallWorld, version: String) {
    let report = run_acceptance_check(&world.binary_path(), DEFAULT_ACCEPTANCE_TIMEOUT)
        .expect("acceptance check passes");
    assert_eq!(report.version, version);
}

#[then("the receipt records version \"{version}\"")]
fn then_receipt_records_version(world: &mut InstallWorld, version: String) {
    let receipt = InstallReceipt::load(&world.receipt_path)
        .expect("readable receipt")
        .expect("receipt present");
    assert_eq!(receipt.version.to_string(), version);
}

#[then("installation fails with an unsupported platform error")]
fn then_unsupported_platform(world: &mut InstallWorld) {
    let err = world.error();
    assert!(
        matches!(
            err,
            InstallerError::Artefact(ArtefactError::UnsupportedPlatform { .. })
        ),
        "unexpected error: {err}"
    );
}

#[then("nothing was downloaded")]
fn then_nothing_downloaded(world: &mut InstallWorld) {
    assert!(world.downloader.requests().is_empty());
}

#[then("no binary is installed")]
fn then_no_binary(world: &mut InstallWorld) {
    assert!(!world.binary_path().exists());
    assert!(!world.receipt_path.exists());
}

#[then("installation fails with a checksum mismatch")]
fn then_checksum_mismatch(world: &mut InstallWorld) {
    let err = world.error();
    assert!(
        matches!(
            err,
            InstallerError::Verification(VerificationError::ChecksumMismatch { .. })
        ),
        "unexpected error: {err}"
    );
}

#[then("the existing binary is untouched")]
fn then_existing_untouched(world: &mut InstallWorld) {
    let contents = std::fs::read(world.binary_path()).expect("binary still present");
    assert_eq!(contents, b"previous");
}

#[then("the acceptance check fails for a missing version")]
fn then_acceptance_fails(world: &mut InstallWorld) {
    let result = world.acceptance.as_ref().expect("acceptance check ran");
    assert!(
        matches!(result, Err(AcceptanceError::NoVersion { .. })),
        "unexpected result: {result:?}"
    );
}

#[then("the binary is still installed")]
fn then_binary_still_installed(world: &mut InstallWorld) {
    assert!(world.binary_path().is_file());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[scenario(
    path = "tests/features/install.feature",
    name = "Install the latest release on a supported platform"
)]
fn scenario_install_supported(world: InstallWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install.feature",
    name = "Refuse a platform the release does not publish"
)]
fn scenario_refuse_unpublished_platform(world: InstallWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install.feature",
    name = "Abort on checksum mismatch and keep the existing binary"
)]
fn scenario_checksum_mismatch(world: InstallWorld) {
    let _ = world;
}

#[cfg(unix)]
#[scenario(
    path = "tests/features/install.feature",
    name = "Upgrade from 0.1.0 to 0.1.1"
)]
fn scenario_upgrade(world: InstallWorld) {
    let _ = world;
}

#[cfg(unix)]
#[scenario(
    path = "tests/features/install.feature",
    name = "Acceptance check rejects a binary without a version"
)]
fn scenario_acceptance_rejects_versionless(world: InstallWorld) {
    let _ = world;
}
