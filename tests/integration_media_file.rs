//! Integration tests for media file handles: identity and file operations.

mod common;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use media_identity::core::{MediaFile, TypeCategory};
use media_identity::ErrorKind;
use predicates::prelude::*;

#[test]
fn construction_on_missing_path_is_not_found() {
    let err = MediaFile::open("/definitely/not/here.jpg").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn capture_time_is_read_as_utc() {
    let dir = TempDir::new().unwrap();
    let path = common::put(&dir, "elephants.jpg", &common::jpeg_taken_at(64, 48, "2013:11:26 13:53:55"));
    let file = MediaFile::open(path).unwrap();

    assert_eq!(file.date_created().to_rfc3339(), "2013-11-26T13:53:55+00:00");
    assert!(file.canonical_name().unwrap().starts_with("20131126_135355_"));
}

#[test]
fn canonical_name_survives_move_and_copy() {
    let dir = TempDir::new().unwrap();
    let path = common::put(&dir, "inbox/IMG_4120.JPG", &common::jpeg_taken_at(64, 48, "2019:01:02 03:04:05"));
    let mut file = MediaFile::open(&path).unwrap();
    let name = file.canonical_name().unwrap();
    assert_eq!(name.len(), "20190102_030405_".len() + 8);
    assert_eq!(name[16..], name[16..].to_uppercase());

    let archived = dir.child("archive/2019/IMG_4120.JPG");
    file.move_to(archived.path()).unwrap();
    archived.assert(predicate::path::is_file());
    dir.child("inbox/IMG_4120.JPG").assert(predicate::path::missing());
    assert_eq!(file.file_name(), archived.path());

    let copy = file.copy_to(dir.child("backup/renamed.jpg").path()).unwrap();
    assert_eq!(file.file_name(), archived.path());
    assert_eq!(MediaFile::open(copy.file_name()).unwrap().canonical_name().unwrap(), name);
    assert_eq!(MediaFile::open(archived.path()).unwrap().canonical_name().unwrap(), name);
}

#[test]
fn dimensions_for_images_and_not_a_photo_otherwise() {
    let dir = TempDir::new().unwrap();
    let jpeg = MediaFile::open(common::put(&dir, "a.jpg", &common::jpeg(416, 331))).unwrap();
    let text = MediaFile::open(common::put(&dir, "notes.txt", b"hello")).unwrap();
    let bare = MediaFile::open(common::put(&dir, "no_extension", &common::jpeg(10, 20))).unwrap();

    assert_eq!(jpeg.decode_dimensions().unwrap(), (416, 331));
    assert_eq!(text.decode_dimensions().unwrap_err().kind(), ErrorKind::NotAPhoto);
    assert_eq!(text.aspect_ratio(), 0.0);

    assert!(bare.has_type(TypeCategory::Photo));
    assert_eq!(bare.mime_type(), "image/jpeg");
    assert_eq!(bare.decode_dimensions().unwrap(), (10, 20));
}
