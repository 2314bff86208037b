//! Archive extraction for oclean release artefacts.
//!
//! Extracts `.tar.gz` archives to a target directory with path
//! traversal protection to prevent zip-slip attacks. Only regular files
//! and directories are accepted; links in a release archive are treated as
//! tampering.

use flate2::read::GzDecoder;
use std::path::{Component, Path, PathBuf};
use tar::EntryType;

/// Trait for extracting artefact archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use oclean_installer::artefact::extraction::GzipExtractor;
///
/// let extractor = GzipExtractor;
/// // Use extractor.extract(archive_path, dest_dir) in production
/// # let _ = extractor;
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the relative paths of the regular files that were extracted.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry
    /// attempts to escape the destination directory.
    /// Returns [`ExtractionError::UnsupportedEntry`] for links and devices.
    /// Returns [`ExtractionError::EmptyArchive`] if no files are found.
    /// Returns [`ExtractionError::Io`] on I/O failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path)
    -> Result<Vec<PathBuf>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive holds an entry that is neither a file nor a directory.
    #[error("unsupported archive entry: {path}")]
    UnsupportedEntry {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive contains no files.
    #[error("archive contains no files")]
    EmptyArchive,
}

/// Default extractor using the `tar` and `flate2` crates.
pub struct GzipExtractor;

impl ArtefactExtractor for GzipExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractionError> {
        let file = std::fs::File::open(archive_path)?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let mut extracted = Vec::new();

        for entry_result in archive.entries()? {
            let mut entry = entry_result?;
            let entry_path = entry.path()?.into_owned();

            validate_entry_path(&entry_path)?;

            let dest_path = dest_dir.join(&entry_path);
            match entry.header().entry_type() {
                EntryType::Directory => {
                    std::fs::create_dir_all(&dest_path)?;
                    continue;
                }
                EntryType::Regular => {}
                _ => {
                    return Err(ExtractionError::UnsupportedEntry {
                        path: entry_path.display().to_string(),
                    });
                }
            }

            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            entry.unpack(&dest_path)?;
            extracted.push(entry_path);
        }

        if extracted.is_empty() {
            return Err(ExtractionError::EmptyArchive);
        }

        Ok(extracted)
    }
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir | Component::RootDir));
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use rstest::rstest;

    fn write_archive(path: &Path, build: impl FnOnce(&mut tar::Builder<GzEncoder<std::fs::File>>)) {
        let output_file = std::fs::File::create(path).expect("create archive");
        let mut builder = tar::Builder::new(GzEncoder::new(output_file, Compression::default()));
        build(&mut builder);
        let encoder = builder.into_inner().expect("tar finish");
        encoder.finish().expect("gzip finish");
    }

    fn append_file(
        builder: &mut tar::Builder<GzEncoder<std::fs::File>>,
        name: &str,
        contents: &[u8],
    ) {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_entry_type(EntryType::Regular);
        header.set_cksum();
        builder
            .append_data(&mut header, name, contents)
            .expect("append file");
    }

    #[test]
    fn extract_real_archive() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("oclean.tar.gz");
        let dest_dir = temp_dir.path().join("out");
        std::fs::create_dir_all(&dest_dir).expect("create dest");

        write_archive(&archive_path, |builder| {
            append_file(builder, "oclean", b"#!/bin/sh\necho oclean 0.1.0\n");
        });

        let files = GzipExtractor
            .extract(&archive_path, &dest_dir)
            .expect("extract");
        assert_eq!(files, vec![PathBuf::from("oclean")]);
        assert!(dest_dir.join("oclean").is_file());
    }

    #[test]
    fn extract_nested_archive_reports_relative_paths() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("nested.tar.gz");
        let dest_dir = temp_dir.path().join("out");

        write_archive(&archive_path, |builder| {
            append_file(builder, "oclean-v0.1.0/oclean", b"binary");
            append_file(builder, "oclean-v0.1.0/README.md", b"docs");
        });

        let files = GzipExtractor
            .extract(&archive_path, &dest_dir)
            .expect("extract");
        assert_eq!(
            files,
            vec![
                PathBuf::from("oclean-v0.1.0/oclean"),
                PathBuf::from("oclean-v0.1.0/README.md"),
            ]
        );
        assert!(dest_dir.join("oclean-v0.1.0/oclean").is_file());
    }

    #[test]
    fn rejects_symlink_entries() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("link.tar.gz");
        let dest_dir = temp_dir.path().join("out");

        write_archive(&archive_path, |builder| {
            let mut header = tar::Header::new_gnu();
            header.set_size(0);
            header.set_entry_type(EntryType::Symlink);
            header.set_cksum();
            builder
                .append_link(&mut header, "oclean", "/usr/bin/true")
                .expect("append link");
        });

        let result = GzipExtractor.extract(&archive_path, &dest_dir);
        assert!(matches!(
            result,
            Err(ExtractionError::UnsupportedEntry { .. })
        ));
    }

    #[rstest]
    #[case::parent_dir("../escape.txt")]
    #[case::nested_parent("foo/../../escape.txt")]
    fn rejects_path_traversal(#[case] bad_path: &str) {
        let result = validate_entry_path(Path::new(bad_path));
        assert!(
            matches!(result, Err(ExtractionError::PathTraversal { .. })),
            "expected PathTraversal for {bad_path}"
        );
    }

    #[test]
    fn accepts_normal_paths() {
        assert!(validate_entry_path(Path::new("bin/oclean")).is_ok());
    }

    #[test]
    fn rejects_absolute_path() {
        let result = validate_entry_path(Path::new("/etc/passwd"));
        assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
    }

    #[test]
    fn extract_empty_archive() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("empty.tar.gz");
        let dest_dir = temp_dir.path().join("out");
        std::fs::create_dir_all(&dest_dir).expect("create dest");

        write_archive(&archive_path, |_| {});

        let result = GzipExtractor.extract(&archive_path, &dest_dir);
        assert!(matches!(result, Err(ExtractionError::EmptyArchive)));
    }

    #[test]
    fn corrupt_archive_is_an_io_error() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("corrupt.tar.gz");
        std::fs::write(&archive_path, b"not gzip at all").expect("write");

        let result = GzipExtractor.extract(&archive_path, temp_dir.path());
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }
}
