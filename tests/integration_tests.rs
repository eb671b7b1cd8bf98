use std::fs;
use std::io::Write;
use std::path::Path;

use dependency_delivery::{
    generate_bill_of_materials, resolve, Catalog, DeliveryService, FileTransport,
};
use tempfile::tempdir;

fn write_catalog(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("catalog.toml");
    fs::write(&path, contents).unwrap();
    path
}

fn build_tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_path(name).unwrap();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, *data).unwrap();
    }
    let tar_bytes = builder.into_inner().unwrap();

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&tar_bytes).unwrap();
    encoder.finish().unwrap()
}

fn sha256_hex(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(data))
}

#[test]
fn resolve_picks_highest_pessimistic_match() {
    let dir = tempdir().unwrap();
    let catalog = write_catalog(
        dir.path(),
        r#"
[metadata]
[[metadata.dependencies]]
id = "tool"
version = "1.2.3"
stacks = ["io.buildpacks.stacks.jammy"]
uri = "tool-1.2.3.tgz"

[[metadata.dependencies]]
id = "tool"
version = "1.3.0"
stacks = ["io.buildpacks.stacks.jammy"]
uri = "tool-1.3.0.tgz"
"#,
    );

    let dep = resolve(&catalog, "tool", "~> 1.2.0", "io.buildpacks.stacks.jammy").unwrap();
    assert_eq!(dep.version, "1.2.3");
}

#[test]
fn deliver_extracts_gzipped_tar_into_layer_with_verified_checksum() {
    let dir = tempdir().unwrap();
    let archive_bytes = build_tar_gz(&[("bin/tool", b"#!/bin/sh\necho hi\n")]);
    fs::write(dir.path().join("tool.tar.gz"), &archive_bytes).unwrap();

    let checksum = sha256_hex(&archive_bytes);
    let catalog = write_catalog(
        dir.path(),
        &format!(
            r#"
[metadata]
[[metadata.dependencies]]
id = "tool"
version = "1.2.3"
stacks = ["*"]
uri = "tool.tar.gz"
checksum = "sha256:{checksum}"
"#
        ),
    );

    let catalog = Catalog::load(&catalog).unwrap();
    let dep =
        dependency_delivery::resolve_from_catalog(&catalog, "tool", "", "any-stack").unwrap();

    let service = DeliveryService::builder(FileTransport).build();
    let layer = dir.path().join("layer");
    service
        .deliver(&dep, dir.path(), &layer, dir.path())
        .unwrap();

    let extracted = fs::read(layer.join("bin/tool")).unwrap();
    assert_eq!(extracted, b"#!/bin/sh\necho hi\n");
}

#[test]
fn deliver_fails_on_checksum_mismatch() {
    let dir = tempdir().unwrap();
    let archive_bytes = build_tar_gz(&[("bin/tool", b"payload")]);
    fs::write(dir.path().join("tool.tar.gz"), &archive_bytes).unwrap();

    let catalog = write_catalog(
        dir.path(),
        r#"
[metadata]
[[metadata.dependencies]]
id = "tool"
version = "1.2.3"
stacks = ["*"]
uri = "tool.tar.gz"
checksum = "sha256:0000000000000000000000000000000000000000000000000000000000000000"
"#,
    );

    let catalog = Catalog::load(&catalog).unwrap();
    let dep =
        dependency_delivery::resolve_from_catalog(&catalog, "tool", "", "any-stack").unwrap();

    let service = DeliveryService::builder(FileTransport).build();
    let layer = dir.path().join("layer");
    let err = service
        .deliver(&dep, dir.path(), &layer, dir.path())
        .unwrap_err();
    assert!(matches!(
        err,
        dependency_delivery::DeliverError::Checksum(_)
    ));
}

#[test]
fn deliver_copies_plain_file_when_no_archive_magic_present() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("tool"), b"just a binary, no archive magic").unwrap();

    let catalog = write_catalog(
        dir.path(),
        r#"
[metadata]
[[metadata.dependencies]]
id = "tool"
version = "1.0.0"
stacks = ["*"]
uri = "tool"
"#,
    );

    let catalog = Catalog::load(&catalog).unwrap();
    let dep =
        dependency_delivery::resolve_from_catalog(&catalog, "tool", "", "any-stack").unwrap();

    let service = DeliveryService::builder(FileTransport).build();
    let layer = dir.path().join("layer");
    service
        .deliver(&dep, dir.path(), &layer, dir.path())
        .unwrap();

    let extracted = fs::read(layer.join("tool")).unwrap();
    assert_eq!(extracted, b"just a binary, no archive magic");
}

#[test]
fn bom_projection_preserves_order_and_checksum_precedence() {
    let dir = tempdir().unwrap();
    let catalog = write_catalog(
        dir.path(),
        r#"
[metadata]
[[metadata.dependencies]]
id = "a"
version = "1.0.0"
stacks = ["*"]
uri = "a.tgz"
sha256 = "aaaa"

[[metadata.dependencies]]
id = "b"
version = "2.0.0"
stacks = ["*"]
uri = "b.tgz"
checksum = "sha512:bbbb"
"#,
    );

    let catalog = Catalog::load(&catalog).unwrap();
    let bom = generate_bill_of_materials(&catalog.dependencies);

    assert_eq!(bom.len(), 2);
    assert_eq!(bom[0].name, "a");
    assert_eq!(bom[1].name, "b");
    assert_eq!(bom[1].checksum.algorithm_name(), "sha512");
}
