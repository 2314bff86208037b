//! Unit tests for release catalog parsing and artefact selection.

use super::*;
use crate::artefact::platform::{Arch, Os};
use rstest::{fixture, rstest};

const DIGEST_A: &str = "1111111111111111111111111111111111111111111111111111111111111111";
const DIGEST_B: &str = "2222222222222222222222222222222222222222222222222222222222222222";

#[fixture]
fn two_releases() -> ReleaseCatalog {
    let text = format!(
        r#"
[[release]]
version = "0.1.1"

[[release.artefact]]
target = "x86_64-unknown-linux-gnu"
sha256 = "{DIGEST_B}"
url = "file:///srv/mirror/oclean-v0.1.1-x86_64-unknown-linux-gnu.tar.gz"

[[release]]
version = "0.1.0"

[[release.artefact]]
target = "x86_64-unknown-linux-gnu"
sha256 = "{DIGEST_A}"
"#
    );
    ReleaseCatalog::parse(&text).expect("valid catalog")
}

#[test]
fn embedded_catalog_publishes_0_1_0() {
    let catalog = ReleaseCatalog::embedded().expect("embedded catalog");
    let version = ReleaseVersion::new(0, 1, 0);
    let release = catalog.release(version).expect("0.1.0 present");

    let targets: Vec<&str> = release
        .artefacts()
        .iter()
        .map(|a| a.target().as_str())
        .collect();
    assert_eq!(
        targets,
        vec!["aarch64-apple-darwin", "x86_64-unknown-linux-gnu"]
    );
    assert_eq!(catalog.homepage(), "https://github.com/kavhnr/oclean");
    assert_eq!(
        catalog.description(),
        "Process-cleanup wrapper for opencode sessions"
    );
}

#[test]
fn embedded_catalog_derives_github_urls() {
    let catalog = ReleaseCatalog::embedded().expect("embedded catalog");
    let release = catalog.latest().expect("latest");
    let artefact = release
        .select(Platform::new(Os::MacOs, Arch::Aarch64))
        .expect("arm macOS published");
    assert_eq!(
        artefact.url(),
        concat!(
            "https://github.com/kavhnr/oclean/releases/download/v0.1.0/",
            "oclean-v0.1.0-aarch64-apple-darwin.tar.gz"
        )
    );
    assert_eq!(
        artefact.sha256().as_str(),
        "083c6c8bd086a3e474235e2ad1a5a0204a73251df5dfa8fb8009c23ca9b66a00"
    );
}

#[rstest]
#[case::intel_mac(Os::MacOs, Arch::X86_64)]
#[case::arm_linux(Os::Linux, Arch::Aarch64)]
fn embedded_release_rejects_unpublished_platforms(#[case] os: Os, #[case] arch: Arch) {
    let catalog = ReleaseCatalog::embedded().expect("embedded catalog");
    let release = catalog.latest().expect("latest");
    let err = release
        .select(Platform::new(os, arch))
        .expect_err("platform is not published");
    match err {
        ArtefactError::UnsupportedPlatform {
            version, published, ..
        } => {
            assert_eq!(version, "0.1.0");
            assert!(published.contains("aarch64-apple-darwin"));
        }
        other => panic!("expected UnsupportedPlatform, got {other:?}"),
    }
}

#[rstest]
fn latest_is_highest_version(two_releases: ReleaseCatalog) {
    let latest = two_releases.latest().expect("latest");
    assert_eq!(latest.version(), ReleaseVersion::new(0, 1, 1));
    assert_eq!(
        two_releases
            .releases()
            .iter()
            .map(Release::version)
            .collect::<Vec<_>>(),
        vec![ReleaseVersion::new(0, 1, 0), ReleaseVersion::new(0, 1, 1)]
    );
}

#[rstest]
fn explicit_url_is_kept(two_releases: ReleaseCatalog) {
    let release = two_releases
        .release(ReleaseVersion::new(0, 1, 1))
        .expect("0.1.1");
    let artefact = release
        .select(Platform::new(Os::Linux, Arch::X86_64))
        .expect("linux");
    assert!(artefact.url().starts_with("file:///srv/mirror/"));
    assert_eq!(
        artefact.archive_name().to_string(),
        "oclean-v0.1.1-x86_64-unknown-linux-gnu.tar.gz"
    );
}

#[rstest]
fn resolve_defaults_to_latest(two_releases: ReleaseCatalog) {
    let resolved = two_releases.resolve(None).expect("latest");
    assert_eq!(resolved.version(), ReleaseVersion::new(0, 1, 1));
    assert!(
        two_releases
            .resolve(Some(ReleaseVersion::new(9, 9, 9)))
            .is_none()
    );
}

#[test]
fn rejects_duplicate_release() {
    let text = format!(
        r#"
[[release]]
version = "0.1.0"
[[release.artefact]]
target = "x86_64-unknown-linux-gnu"
sha256 = "{DIGEST_A}"

[[release]]
version = "v0.1.0"
[[release.artefact]]
target = "aarch64-apple-darwin"
sha256 = "{DIGEST_B}"
"#
    );
    let err = ReleaseCatalog::parse(&text).expect_err("duplicate");
    assert!(matches!(err, CatalogError::DuplicateRelease { .. }));
}

#[test]
fn rejects_duplicate_target() {
    let text = format!(
        r#"
[[release]]
version = "0.1.0"
[[release.artefact]]
target = "x86_64-unknown-linux-gnu"
sha256 = "{DIGEST_A}"
[[release.artefact]]
target = "x86_64-unknown-linux-gnu"
sha256 = "{DIGEST_B}"
"#
    );
    let err = ReleaseCatalog::parse(&text).expect_err("duplicate target");
    assert!(matches!(err, CatalogError::DuplicateTarget { .. }));
}

#[rstest]
#[case::bad_version("0.1", "x86_64-unknown-linux-gnu", DIGEST_A)]
#[case::bad_target("0.1.0", "x86_64-pc-windows-msvc", DIGEST_A)]
#[case::bad_digest("0.1.0", "x86_64-unknown-linux-gnu", "deadbeef")]
fn rejects_malformed_entries(#[case] version: &str, #[case] target: &str, #[case] sha: &str) {
    let text = format!(
        "[[release]]\nversion = \"{version}\"\n[[release.artefact]]\ntarget = \"{target}\"\nsha256 = \"{sha}\"\n"
    );
    let err = ReleaseCatalog::parse(&text).expect_err("malformed");
    assert!(
        matches!(err, CatalogError::Artefact { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn rejects_release_without_artefacts() {
    let err = ReleaseCatalog::parse("[[release]]\nversion = \"0.1.0\"\n").expect_err("empty");
    assert!(matches!(err, CatalogError::EmptyRelease { .. }));
}

#[test]
fn rejects_empty_catalog() {
    let err = ReleaseCatalog::parse("homepage = \"https://example.test\"\n").expect_err("empty");
    assert!(matches!(err, CatalogError::NoReleases));
}

#[test]
fn rejects_unknown_keys() {
    let err = ReleaseCatalog::parse("mirror = \"x\"\n").expect_err("unknown key");
    assert!(matches!(err, CatalogError::Parse(_)));
}

#[test]
fn load_reports_missing_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = camino::Utf8PathBuf::from_path_buf(temp.path().join("absent.toml"))
        .expect("utf-8 temp path");
    let err = ReleaseCatalog::load(&path).expect_err("missing");
    assert!(matches!(err, CatalogError::Read { .. }));
}

#[test]
fn load_or_embedded_falls_back() {
    let catalog = ReleaseCatalog::load_or_embedded(None).expect("embedded");
    assert_eq!(catalog, ReleaseCatalog::embedded().expect("embedded"));
}
