#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Builds a polygon the way ImageJ itself lays it out: no reserved pad,
/// Header2 directly after the coordinates, name right after Header2, and a
/// newer version number than roicodec writes.
pub fn imagej_polygon_bytes(x: &[i16], y: &[i16], name: &str, position: i32) -> Vec<u8> {
    assert_eq!(x.len(), y.len());
    let n = x.len();
    let header2 = 64 + 4 * n;
    let name_offset = header2 + 64;

    let mut bytes = vec![0u8; name_offset + 2 * name.len()];
    bytes[0..4].copy_from_slice(b"Iout");
    bytes[4..6].copy_from_slice(&228i16.to_be_bytes());
    bytes[6] = 0;
    bytes[8..10].copy_from_slice(&10i16.to_be_bytes());
    bytes[10..12].copy_from_slice(&20i16.to_be_bytes());
    bytes[12..14].copy_from_slice(&110i16.to_be_bytes());
    bytes[14..16].copy_from_slice(&220i16.to_be_bytes());
    bytes[16..18].copy_from_slice(&(n as i16).to_be_bytes());
    bytes[56..60].copy_from_slice(&position.to_be_bytes());
    bytes[60..64].copy_from_slice(&(header2 as i32).to_be_bytes());

    for (i, (&xv, &yv)) in x.iter().zip(y).enumerate() {
        let xo = 64 + 2 * i;
        let yo = 64 + 2 * n + 2 * i;
        bytes[xo..xo + 2].copy_from_slice(&xv.to_be_bytes());
        bytes[yo..yo + 2].copy_from_slice(&yv.to_be_bytes());
    }

    bytes[header2 + 16..header2 + 20].copy_from_slice(&(name_offset as i32).to_be_bytes());
    bytes[header2 + 20..header2 + 24].copy_from_slice(&(name.len() as i32).to_be_bytes());
    for (i, b) in name.bytes().enumerate() {
        bytes[name_offset + 2 * i] = 0;
        bytes[name_offset + 2 * i + 1] = b;
    }
    bytes
}

/// An ImageJ ellipse: a freehand outline with `SUBTYPE` 3 whose defining
/// axis endpoints sit in the float block at 18..34.
pub fn imagej_ellipse_bytes() -> Vec<u8> {
    let mut bytes = imagej_polygon_bytes(&[20, 60, 100, 60], &[40, 20, 40, 60], "ellipse", 0);
    bytes[6] = 7;
    bytes[18..22].copy_from_slice(&10.5f32.to_be_bytes());
    bytes[22..26].copy_from_slice(&20.25f32.to_be_bytes());
    bytes[26..30].copy_from_slice(&90.75f32.to_be_bytes());
    bytes[30..34].copy_from_slice(&60.5f32.to_be_bytes());
    bytes[48..50].copy_from_slice(&3i16.to_be_bytes());
    bytes
}

/// An older-revision oval with no Header2 (`HEADER2_OFFSET` is zero).
pub fn legacy_oval_bytes() -> Vec<u8> {
    let mut bytes = vec![0u8; 64];
    bytes[0..4].copy_from_slice(b"Iout");
    bytes[4..6].copy_from_slice(&217i16.to_be_bytes());
    bytes[6] = 2;
    bytes[8..10].copy_from_slice(&5i16.to_be_bytes());
    bytes[10..12].copy_from_slice(&5i16.to_be_bytes());
    bytes[12..14].copy_from_slice(&25i16.to_be_bytes());
    bytes[14..16].copy_from_slice(&45i16.to_be_bytes());
    bytes
}

pub fn write_fixture(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bytes).expect("write roi fixture");
}
