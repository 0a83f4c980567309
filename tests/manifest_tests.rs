//! Tests for hcpack manifest module

use hcpack::{
    Extractor, Manifest, PackError, Packer, DEFAULT_SCAN_WINDOW, PAYLOAD_FILENAME,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_parse_full_manifest() {
    let manifest = Manifest::parse(
        r#"
[package]
name = "demo"
script = "main.hc"
output = "dist/demo.hcpk"

[[resources]]
path = "assets/icon.bmp"

[[resources]]
name = "font.dat"
path = "assets/font-v2.dat"

[extract]
accepted_versions = [1]
scan_window = 32768
        "#,
    )
    .unwrap();

    assert_eq!(manifest.package.name, "demo");
    assert_eq!(manifest.package.script, PathBuf::from("main.hc"));
    assert_eq!(manifest.output_path(), PathBuf::from("dist/demo.hcpk"));
    assert_eq!(manifest.resources.len(), 2);
    assert_eq!(manifest.resources[0].name, None);
    assert_eq!(manifest.resources[1].name.as_deref(), Some("font.dat"));
    assert_eq!(manifest.extract.accepted_versions, Some(vec![1]));
    assert_eq!(manifest.extract.scan_window, 32768);
}

#[test]
fn test_manifest_defaults() {
    let manifest = Manifest::parse(
        r#"
[package]
name = "demo"
script = "main.hc"
        "#,
    )
    .unwrap();

    assert_eq!(manifest.output_path(), PathBuf::from("demo.hcpk"));
    assert!(manifest.resources.is_empty());
    assert_eq!(manifest.extract.accepted_versions, None);
    assert_eq!(manifest.extract.scan_window, DEFAULT_SCAN_WINDOW);
}

#[test]
fn test_empty_name_rejected() {
    let err = Manifest::parse(
        r#"
[package]
name = ""
script = "main.hc"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, PackError::InvalidManifest(_)));
}

#[test]
fn test_empty_script_rejected() {
    let err = Manifest::parse(
        r#"
[package]
name = "demo"
script = ""
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, PackError::InvalidManifest(_)));
}

#[test]
fn test_zero_scan_window_rejected() {
    let err = Manifest::parse(
        r#"
[package]
name = "demo"
script = "main.hc"

[extract]
scan_window = 0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, PackError::InvalidManifest(_)));
}

#[test]
fn test_malformed_toml() {
    let err = Manifest::parse("this is not toml [").unwrap_err();
    assert!(matches!(err, PackError::TomlParse(_)));
}

#[test]
fn test_manifest_driven_pack() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("main.hc"), b"manifest packed").unwrap();
    fs::create_dir(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets").join("icon.bmp"), [1, 2, 3]).unwrap();

    let manifest = Manifest::parse(
        r#"
[package]
name = "demo"
script = "main.hc"

[[resources]]
path = "assets/icon.bmp"
        "#,
    )
    .unwrap();

    let dest = dir.path().join(manifest.output_path());
    Packer::from_manifest(&manifest, dir.path())
        .unwrap()
        .pack_to_file(&dest)
        .unwrap();

    let out = dir.path().join("out");
    let report = Extractor::new().extract_package(&dest, &out).unwrap();
    assert_eq!(report.resources_written, 1);
    assert_eq!(
        fs::read(out.join(PAYLOAD_FILENAME)).unwrap(),
        b"manifest packed"
    );
    assert_eq!(fs::read(out.join("icon.bmp")).unwrap(), [1, 2, 3]);
}

#[test]
fn test_manifest_resource_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("main.hc"), b"code").unwrap();
    fs::create_dir(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets").join("a.txt"), b"a").unwrap();
    fs::write(dir.path().join("assets").join("b.txt"), b"b").unwrap();

    let manifest = Manifest::parse(
        r#"
[package]
name = "demo"
script = "main.hc"
resource_dir = "assets"
        "#,
    )
    .unwrap();

    let container = Packer::from_manifest(&manifest, dir.path())
        .unwrap()
        .build_container()
        .unwrap();
    assert_eq!(container.resources.len(), 2);
}

#[test]
fn test_manifest_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hcpack.toml");
    fs::write(
        &path,
        "[package]\nname = \"demo\"\nscript = \"main.hc\"\n",
    )
    .unwrap();

    let manifest = Manifest::load(&path).unwrap();
    assert_eq!(manifest.package.name, "demo");
}
