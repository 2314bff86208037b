//! Shared test utilities for the installer crate.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour tests under `tests/`.

use crate::artefact::download::{ArtefactDownloader, DownloadError};
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// A shell script standing in for an `oclean` binary of `version`.
///
/// Passing `None` produces a binary that prints no version at all.
pub fn fake_binary_script(version: Option<&str>) -> Vec<u8> {
    match version {
        Some(version) => format!("#!/bin/sh\necho \"oclean {version}\"\n").into_bytes(),
        None => b"#!/bin/sh\necho \"oclean development build\"\n".to_vec(),
    }
}

/// Build an in-memory `.tar.gz` from `(path, contents)` entries.
///
/// # Panics
///
/// Panics if the archive cannot be assembled in memory.
pub fn build_release_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder
            .append_data(&mut header, path, *contents)
            .expect("append archive entry");
    }
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .expect("finish archive")
}

/// A release archive containing only the fake `oclean` for `version`.
pub fn oclean_archive(version: &str) -> Vec<u8> {
    build_release_archive(&[("oclean", &fake_binary_script(Some(version)))])
}

/// One artefact line of a catalog fixture.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Release version, e.g. `0.1.1`.
    pub version: String,
    /// Target triple.
    pub target: String,
    /// Lowercase hex SHA-256.
    pub sha256: String,
    /// Download URL.
    pub url: String,
}

impl CatalogEntry {
    /// Entry whose digest is computed from `archive` and whose URL is a
    /// synthetic `mem://` address keyed by version and target.
    pub fn for_archive(version: &str, target: &str, archive: &[u8]) -> Self {
        Self {
            version: version.to_owned(),
            target: target.to_owned(),
            sha256: sha256_hex(archive),
            url: format!("mem://oclean-v{version}-{target}.tar.gz"),
        }
    }
}

/// Render a catalog TOML document from entries, grouping by version.
pub fn catalog_toml(entries: &[CatalogEntry]) -> String {
    let mut versions: Vec<&str> = entries.iter().map(|e| e.version.as_str()).collect();
    versions.dedup();
    let mut text = String::from("homepage = \"https://github.com/kavhnr/oclean\"\n");
    for version in versions {
        text.push_str(&format!("\n[[release]]\nversion = \"{version}\"\n"));
        for entry in entries.iter().filter(|e| e.version == version) {
            text.push_str(&format!(
                "\n[[release.artefact]]\ntarget = \"{}\"\nsha256 = \"{}\"\nurl = \"{}\"\n",
                entry.target, entry.sha256, entry.url
            ));
        }
    }
    text
}

/// An [`ArtefactDownloader`] serving archives from memory.
///
/// Unknown URLs yield [`DownloadError::NotFound`]; every request is logged.
#[derive(Debug, Default)]
pub struct MapDownloader {
    archives: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl MapDownloader {
    /// Create an empty downloader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` at `url`.
    pub fn serve(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.archives.insert(url.into(), bytes);
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ArtefactDownloader for MapDownloader {
    fn download_archive(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        self.requests.borrow_mut().push(url.to_owned());
        let bytes = self.archives.get(url).ok_or_else(|| DownloadError::NotFound {
            url: url.to_owned(),
        })?;
        let mut file = std::fs::File::create(dest)?;
        file.write_all(bytes)?;
        Ok(())
    }
}
