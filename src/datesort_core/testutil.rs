//! Fixture builders shared by the unit tests.

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use filetime::FileTime;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Encode a tiny JPEG without any metadata.
pub fn plain_jpeg() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    RgbImage::new(4, 4)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

/// Encode a tiny PNG without any metadata.
pub fn plain_png() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    RgbImage::new(2, 2)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// A TIFF-structured EXIF block holding the given ASCII tags.
pub fn exif_block(tags: &[(Tag, &str)]) -> Vec<u8> {
    let fields: Vec<Field> = tags
        .iter()
        .map(|(tag, value)| Field {
            tag: *tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![value.as_bytes().to_vec()]),
        })
        .collect();

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    tiff.into_inner()
}

/// Encode a tiny JPEG carrying the given ASCII date tags in its EXIF block.
pub fn jpeg_with_dates(tags: &[(Tag, &str)]) -> Vec<u8> {
    let tiff = exif_block(tags);

    // Splice an APP1 "Exif" segment right after SOI.
    let jpeg = plain_jpeg();
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Encode a tiny PNG with an `eXIf` chunk right after IHDR.
pub fn png_with_dates(tags: &[(Tag, &str)]) -> Vec<u8> {
    let tiff = exif_block(tags);
    let png = plain_png();

    // 8-byte signature, then IHDR: length + type + 13 data bytes + CRC.
    let ihdr_end = 8 + 4 + 4 + 13 + 4;
    let mut out = Vec::with_capacity(png.len() + tiff.len() + 12);
    out.extend_from_slice(&png[..ihdr_end]);
    out.extend_from_slice(&png_chunk(b"eXIf", &tiff));
    out.extend_from_slice(&png[ihdr_end..]);
    out
}

fn png_chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(data.len() + 12);
    chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
    chunk.extend_from_slice(kind);
    chunk.extend_from_slice(data);
    let crc = crc32(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());
    chunk
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// ISO-BMFF box: 32-bit size, type, payload.
fn bmff_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

/// ISO-BMFF full box: a box whose payload starts with version and flags.
fn bmff_full_box(kind: &[u8; 4], version: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![version, 0, 0, 0];
    body.extend_from_slice(payload);
    bmff_box(kind, &body)
}

/// A minimal HEIC container whose only item is an `Exif` block.
///
/// Layout: `ftyp`, `meta` (`iinf` with one `infe`, `iloc` pointing into
/// the file), then `mdat` holding the Exif item.
pub fn heic_with_dates(tags: &[(Tag, &str)]) -> Vec<u8> {
    const EXIF_ITEM_ID: u16 = 1;

    // Exif item payload: offset to the TIFF header, then the TIFF block.
    let mut exif_item = 0u32.to_be_bytes().to_vec();
    exif_item.extend_from_slice(&exif_block(tags));

    let mut ftyp_payload = Vec::new();
    ftyp_payload.extend_from_slice(b"heic");
    ftyp_payload.extend_from_slice(&0u32.to_be_bytes());
    ftyp_payload.extend_from_slice(b"mif1heic");
    let ftyp = bmff_box(b"ftyp", &ftyp_payload);

    let mut infe_payload = Vec::new();
    infe_payload.extend_from_slice(&EXIF_ITEM_ID.to_be_bytes());
    infe_payload.extend_from_slice(&0u16.to_be_bytes()); // protection index
    infe_payload.extend_from_slice(b"Exif");
    infe_payload.push(0); // empty item name
    let infe = bmff_full_box(b"infe", 2, &infe_payload);

    let mut iinf_payload = 1u16.to_be_bytes().to_vec();
    iinf_payload.extend_from_slice(&infe);
    let iinf = bmff_full_box(b"iinf", 0, &iinf_payload);

    // The iloc size is fixed, so the mdat offset can be computed up front.
    let iloc_len = 8 + 4 + 2 + 2 + 2 + 2 + 2 + 4 + 4;
    let meta_len = 8 + 4 + iinf.len() + iloc_len;
    let exif_offset = ftyp.len() + meta_len + 8;

    let mut iloc_payload = Vec::new();
    // offset_size = 4, length_size = 4, base_offset_size = 0
    iloc_payload.extend_from_slice(&0x4400u16.to_be_bytes());
    iloc_payload.extend_from_slice(&1u16.to_be_bytes()); // item count
    iloc_payload.extend_from_slice(&EXIF_ITEM_ID.to_be_bytes());
    iloc_payload.extend_from_slice(&0u16.to_be_bytes()); // data reference index
    iloc_payload.extend_from_slice(&1u16.to_be_bytes()); // extent count
    iloc_payload.extend_from_slice(&(exif_offset as u32).to_be_bytes());
    iloc_payload.extend_from_slice(&(exif_item.len() as u32).to_be_bytes());
    let iloc = bmff_full_box(b"iloc", 0, &iloc_payload);
    debug_assert_eq!(iloc.len(), iloc_len);

    let mut meta_payload = iinf;
    meta_payload.extend_from_slice(&iloc);
    let meta = bmff_full_box(b"meta", 0, &meta_payload);
    debug_assert_eq!(meta.len(), meta_len);

    let mut out = ftyp;
    out.extend_from_slice(&meta);
    out.extend_from_slice(&bmff_box(b"mdat", &exif_item));
    out
}

/// Write a JPEG whose DateTimeOriginal is `date` ("YYYY:MM:DD HH:MM:SS").
pub fn write_dated_jpeg(path: &Path, date: &str) {
    std::fs::write(path, jpeg_with_dates(&[(Tag::DateTimeOriginal, date)])).unwrap();
}

/// Write a small PNG without EXIF.
pub fn write_plain_png(path: &Path) {
    std::fs::write(path, plain_png()).unwrap();
}

/// Pin the modification time of `path` to `unix_seconds`.
pub fn set_mtime(path: &Path, unix_seconds: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(unix_seconds, 0)).unwrap();
}

/// 2020-01-02 08:00:00 UTC
pub const JAN_2_2020_0800_UTC: i64 = 1_577_952_000;
