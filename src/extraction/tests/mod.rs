use crate::error::{Error, ExtractionError};
use crate::extraction::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a valid ZIP archive containing the given files
fn create_zip_archive(archive_path: &Path, files: &[(&str, &[u8])]) {
    let file = fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

// ---------------------------------------------------------------------------
// ZipExtractor::extract
// ---------------------------------------------------------------------------

#[test]
fn test_extract_nested_entries() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("artifact.zip");
    create_zip_archive(
        &archive,
        &[
            ("bin/app", b"binary"),
            ("README.md", b"readme"),
            ("assets/img/logo.svg", b"<svg/>"),
        ],
    );
    let dest = temp_dir.path().join("out");

    let files = ZipExtractor::extract(&archive, &dest).unwrap();

    assert_eq!(files.len(), 3);
    assert_eq!(fs::read(dest.join("bin/app")).unwrap(), b"binary");
    assert_eq!(fs::read(dest.join("README.md")).unwrap(), b"readme");
    assert_eq!(
        fs::read(dest.join("assets/img/logo.svg")).unwrap(),
        b"<svg/>"
    );
}

#[test]
fn test_extract_directory_entries() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("artifact.zip");
    {
        let file = fs::File::create(&archive).unwrap();
        let mut writer = ::zip::ZipWriter::new(file);
        let options = ::zip::write::FileOptions::default();
        writer.add_directory("empty/", options).unwrap();
        writer.start_file("data.txt", options).unwrap();
        std::io::Write::write_all(&mut writer, b"data").unwrap();
        writer.finish().unwrap();
    }
    let dest = temp_dir.path().join("out");

    let files = ZipExtractor::extract(&archive, &dest).unwrap();

    // Directories are created but not reported
    assert_eq!(files, vec![dest.join("data.txt")]);
    assert!(dest.join("empty").is_dir());
}

#[test]
fn test_extract_corrupt_archive() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("artifact.zip");
    fs::write(&archive, b"this is not a zip file").unwrap();

    let err = ZipExtractor::extract(&archive, &temp_dir.path().join("out")).unwrap_err();

    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::CorruptArchive { .. })
    ));
}

#[test]
fn test_extract_missing_archive_is_io_error() {
    let temp_dir = TempDir::new().unwrap();

    let err = ZipExtractor::extract(
        &temp_dir.path().join("missing.zip"),
        &temp_dir.path().join("out"),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_extract_skips_path_traversal() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("evil.zip");
    create_zip_archive(
        &archive,
        &[
            ("../escaped.txt", b"nope".as_slice()),
            ("ok.txt", b"ok".as_slice()),
        ],
    );
    let dest = temp_dir.path().join("out");

    let files = ZipExtractor::extract(&archive, &dest).unwrap();

    assert_eq!(files, vec![dest.join("ok.txt")]);
    assert!(!temp_dir.path().join("escaped.txt").exists());
}

// ---------------------------------------------------------------------------
// prepare_and_extract
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_prepare_and_extract_replaces_previous_contents() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("artifact.zip");
    create_zip_archive(&archive, &[("new.txt", b"new")]);

    let dest = temp_dir.path().join("out");
    fs::create_dir_all(dest.join("old_dir")).unwrap();
    fs::write(dest.join("old.txt"), "old").unwrap();
    fs::write(dest.join("old_dir/inner.txt"), "old").unwrap();

    let files = prepare_and_extract(&archive, &dest).await.unwrap();

    assert_eq!(files, vec![dest.join("new.txt")]);
    assert!(!dest.join("old.txt").exists());
    assert!(!dest.join("old_dir").exists());
    assert_eq!(fs::read(dest.join("new.txt")).unwrap(), b"new");
}

#[tokio::test]
async fn test_prepare_and_extract_archive_inside_destination() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("site");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("old.txt"), "old").unwrap();
    let archive = dest.join("artifact.zip");
    create_zip_archive(&archive, &[("new.txt", b"new")]);

    let files = prepare_and_extract(&archive, &dest).await.unwrap();

    assert_eq!(files, vec![dest.join("new.txt")]);
    assert!(archive.exists());
    assert!(!dest.join("old.txt").exists());
    assert_eq!(fs::read(dest.join("new.txt")).unwrap(), b"new");
}

#[tokio::test]
async fn test_prepare_and_extract_target_is_file() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("artifact.zip");
    create_zip_archive(&archive, &[("new.txt", b"new")]);
    let dest = temp_dir.path().join("out");
    fs::write(&dest, "not a directory").unwrap();

    let err = prepare_and_extract(&archive, &dest).await.unwrap_err();

    assert!(matches!(err, Error::NotADirectory { .. }));
    // Downloaded archive is kept regardless
    assert!(archive.exists());
    assert_eq!(fs::read_to_string(&dest).unwrap(), "not a directory");
}

#[tokio::test]
async fn test_prepare_and_extract_corrupt_archive_keeps_zip() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("artifact.zip");
    fs::write(&archive, b"garbage").unwrap();
    let dest = temp_dir.path().join("out");

    let err = prepare_and_extract(&archive, &dest).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::CorruptArchive { .. })
    ));
    assert!(archive.exists());
    // Directory was prepared before the archive was found to be bad
    assert!(dest.is_dir());
}
