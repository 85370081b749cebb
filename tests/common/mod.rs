#![allow(dead_code)]

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

pub const VENDOR: &str = "reference libFLAC 1.4.3 20230623";
pub const AUDIO: &[u8] = &[0xFF, 0xF8, 0x69, 0x08, 0x00, 0x1C, 0xAA, 0xBB, 0xCC, 0xDD];

// Block type, raw body.
pub type RawBlock = (u8, Vec<u8>);

pub fn stream_info_body() -> Vec<u8> {
    (0u8..34).collect()
}

pub fn comment_body(vendor: &str, entries: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    out.extend_from_slice(vendor.as_bytes());
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        out.extend_from_slice(entry.as_bytes());
    }
    out
}

/// Serializes a FLAC file from raw blocks and audio bytes.
pub fn build_flac(blocks: &[RawBlock], audio: &[u8]) -> Vec<u8> {
    let mut out = b"fLaC".to_vec();
    for (i, (block_type, body)) in blocks.iter().enumerate() {
        let last = if i == blocks.len() - 1 { 0x80 } else { 0 };
        out.push(last | block_type);
        let len = (body.len() as u32).to_be_bytes();
        out.extend_from_slice(&len[1..]);
        out.extend_from_slice(body);
    }
    out.extend_from_slice(audio);
    out
}

/// STREAMINFO, a Vorbis comment with an old title, padding, audio.
pub fn sample_flac() -> Vec<u8> {
    build_flac(
        &[
            (0, stream_info_body()),
            (4, comment_body(VENDOR, &["TITLE=Old title", "ENCODER=test"])),
            (1, vec![0; 16]),
        ],
        AUDIO,
    )
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf
}
