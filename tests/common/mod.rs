//! Shared fixtures for integration tests.

#![allow(dead_code)]

use assert_fs::prelude::*;
use assert_fs::TempDir;
use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;
use std::path::PathBuf;

/// Gradient JPEG of the given size
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

/// JPEG with an EXIF capture time (`YYYY:MM:DD HH:MM:SS`)
pub fn jpeg_taken_at(width: u32, height: u32, taken: &str) -> Vec<u8> {
    let field = Field {
        tag: Tag::DateTimeOriginal,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![taken.as_bytes().to_vec()]),
    };
    let mut writer = Writer::new();
    writer.push_field(&field);
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let mut app1 = vec![0xFF, 0xE1];
    app1.extend_from_slice(&((8 + tiff.len()) as u16).to_be_bytes());
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&tiff);

    let plain = jpeg(width, height);
    let mut out = plain[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&plain[2..]);
    out
}

/// Write `bytes` to `name` inside `dir` and return the full path
pub fn put(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let child = dir.child(name);
    child.write_binary(bytes).unwrap();
    child.path().to_path_buf()
}
