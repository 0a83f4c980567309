//! Tests for hcpack extract module

use hcpack::codec::{put_prefixed, put_u32};
use hcpack::{
    Container, ExtractOptions, ExtractWarning, Extractor, PackError, PackMetrics,
    CONTAINER_VERSION, MAGIC, PAYLOAD_FILENAME,
};
use std::fs;
use tempfile::TempDir;

fn sample_bytes() -> Vec<u8> {
    let mut container = Container::new(b"PRINT(\"HI\");".to_vec());
    container.add_resource("icon.bmp", vec![0xDE, 0xAD, 0xBE, 0xEF]);
    container.add_resource("notes.txt", b"hello".to_vec());
    container.to_bytes()
}

#[test]
fn test_extract_writes_payload_and_resources() {
    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("extracted");

    let report = Extractor::new()
        .extract(&sample_bytes(), 0, &out_dir)
        .unwrap();

    assert_eq!(report.payload_path, out_dir.join(PAYLOAD_FILENAME));
    assert_eq!(report.payload_size, 12);
    assert_eq!(report.resources_written, 2);
    assert!(report.warnings.is_empty());

    assert_eq!(
        fs::read(out_dir.join(PAYLOAD_FILENAME)).unwrap(),
        b"PRINT(\"HI\");"
    );
    assert_eq!(
        fs::read(out_dir.join("icon.bmp")).unwrap(),
        [0xDE, 0xAD, 0xBE, 0xEF]
    );
    assert_eq!(fs::read(out_dir.join("notes.txt")).unwrap(), b"hello");
}

#[test]
fn test_extract_at_offset() {
    let mut stream = b"some stub prefix".to_vec();
    let offset = stream.len();
    stream.extend_from_slice(&sample_bytes());

    let out = TempDir::new().unwrap();
    let report = Extractor::new().extract(&stream, offset, out.path()).unwrap();
    assert_eq!(report.resources_written, 2);
}

#[test]
fn test_invalid_magic_writes_nothing() {
    let mut bytes = sample_bytes();
    bytes[0..4].copy_from_slice(b"JUNK");

    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("never-created");
    let err = Extractor::new().extract(&bytes, 0, &out_dir).unwrap_err();

    assert!(matches!(err, PackError::InvalidMagic { found } if &found == b"JUNK"));
    assert!(!out_dir.exists());
}

#[test]
fn test_version_accepted_by_default() {
    let mut container = Container::new(b"x".to_vec());
    container.version = 42;

    let out = TempDir::new().unwrap();
    let report = Extractor::new()
        .extract(&container.to_bytes(), 0, out.path())
        .unwrap();
    assert_eq!(report.resources_written, 0);
}

#[test]
fn test_version_policy_rejects_unknown() {
    let mut container = Container::new(b"x".to_vec());
    container.version = 42;

    let extractor = Extractor::with_options(ExtractOptions {
        accepted_versions: Some(vec![CONTAINER_VERSION]),
        ..Default::default()
    });

    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("never-created");
    let err = extractor
        .extract(&container.to_bytes(), 0, &out_dir)
        .unwrap_err();
    assert!(matches!(err, PackError::UnsupportedVersion(42)));
    assert!(!out_dir.exists());
}

#[test]
fn test_version_policy_accepts_listed() {
    let extractor = Extractor::with_options(ExtractOptions {
        accepted_versions: Some(vec![CONTAINER_VERSION]),
        ..Default::default()
    });
    let out = TempDir::new().unwrap();
    assert!(extractor.extract(&sample_bytes(), 0, out.path()).is_ok());
}

#[test]
fn test_zero_name_length_is_partial_success() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(MAGIC);
    put_u32(&mut bytes, CONTAINER_VERSION);
    put_prefixed(&mut bytes, b"code");
    put_u32(&mut bytes, 3);
    put_prefixed(&mut bytes, b"first.dat");
    put_prefixed(&mut bytes, b"abc");
    put_u32(&mut bytes, 0);

    let out = TempDir::new().unwrap();
    let report = Extractor::new().extract(&bytes, 0, out.path()).unwrap();

    assert_eq!(report.resources_written, 1);
    assert_eq!(
        report.warnings,
        vec![ExtractWarning::SuspiciousNameLength { index: 1, len: 0 }]
    );
    assert_eq!(fs::read(out.path().join("first.dat")).unwrap(), b"abc");
    assert_eq!(fs::read(out.path().join(PAYLOAD_FILENAME)).unwrap(), b"code");
}

#[test]
fn test_unwritable_resource_is_warning_and_loop_continues() {
    // A name smuggling a separator fails to create (no such subdirectory)
    // but must not abort the resources after it.
    let mut container = Container::new(b"code".to_vec());
    container.add_resource("missing-dir/evil.txt", b"nope".to_vec());
    container.add_resource("fine.txt", b"yes".to_vec());

    let out = TempDir::new().unwrap();
    let report = Extractor::new()
        .extract(&container.to_bytes(), 0, out.path())
        .unwrap();

    assert_eq!(report.resources_written, 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        ExtractWarning::FileCreateFailed { name, .. } if name == "missing-dir/evil.txt"
    ));
    assert_eq!(fs::read(out.path().join("fine.txt")).unwrap(), b"yes");
}

#[test]
fn test_truncated_resource_is_fatal_but_payload_survives() {
    let bytes = sample_bytes();
    let cut = &bytes[..bytes.len() - 2];

    let out = TempDir::new().unwrap();
    let err = Extractor::new().extract(cut, 0, out.path()).unwrap_err();

    assert!(matches!(err, PackError::TruncatedInput { .. }));
    // The payload was written as soon as it was read, so it is still on
    // disk for inspection.
    assert_eq!(
        fs::read(out.path().join(PAYLOAD_FILENAME)).unwrap(),
        b"PRINT(\"HI\");"
    );
}

#[test]
fn test_truncated_header_is_fatal() {
    let bytes = sample_bytes();
    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("never-created");

    let err = Extractor::new().extract(&bytes[..6], 0, &out_dir).unwrap_err();
    assert!(matches!(err, PackError::TruncatedInput { .. }));
    assert!(!out_dir.exists());
}

#[test]
fn test_empty_resource_list() {
    let container = Container::new(b"solo".to_vec());
    let out = TempDir::new().unwrap();

    let report = Extractor::new()
        .extract(&container.to_bytes(), 0, out.path())
        .unwrap();
    assert_eq!(report.resources_written, 0);
    assert!(report.warnings.is_empty());
    assert_eq!(fs::read(out.path().join(PAYLOAD_FILENAME)).unwrap(), b"solo");
}

#[test]
fn test_output_dir_created_if_absent() {
    let out = TempDir::new().unwrap();
    let nested = out.path().join("deep").join("out");

    let report = Extractor::new().extract(&sample_bytes(), 0, &nested).unwrap();
    assert_eq!(report.resources_written, 2);
    assert!(nested.join(PAYLOAD_FILENAME).exists());
}

#[test]
fn test_report_json_export() {
    let out = TempDir::new().unwrap();
    let report = Extractor::new()
        .extract(&sample_bytes(), 0, out.path())
        .unwrap();

    let json = report.to_json().unwrap();
    assert!(json.contains("\"resources_written\": 2"));
    assert!(json.contains(PAYLOAD_FILENAME));
}

#[test]
fn test_extract_with_metrics() {
    let out = TempDir::new().unwrap();
    let mut metrics = PackMetrics::new();

    Extractor::new()
        .extract_with_metrics(&sample_bytes(), 0, out.path(), Some(&mut metrics))
        .unwrap();

    assert!(metrics.payload_write.is_some());
    assert!(metrics.resources_write.is_some());
    assert!(metrics.total.is_some());
}

#[test]
fn test_warning_display() {
    let warning = ExtractWarning::SuspiciousNameLength { index: 3, len: 5000 };
    let text = warning.to_string();
    assert!(text.contains('3'));
    assert!(text.contains("5000"));
}
