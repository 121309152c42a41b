//! Static header field tables for the ImageJ ROI layout.
//!
//! Every field is described by a wire-type token (`h`, `i`, `f`, `b`, `4s`),
//! from which its byte width is derived, and a byte offset. Header1 offsets
//! are absolute. Header2 offsets are relative to the `HEADER2_OFFSET` value
//! stored in Header1.
//!
//! Both tables are built at compile time and shared read-only by every
//! decoder and encoder.

use crate::error::SchemaError;

/// Magic marker at the start of every ROI record.
pub const MAGIC: [u8; 4] = *b"Iout";

/// Value written to `VERSION_OFFSET` by the encoder.
pub const VERSION: i64 = 225;

/// Size of the fixed Header1 block.
pub const HEADER1_SIZE: u64 = 64;

/// Size reserved for the Header2 block.
pub const HEADER2_SIZE: u64 = 64;

/// Byte offset of the coordinate array (directly after Header1).
pub const COORDINATES_OFFSET: u64 = HEADER1_SIZE;

/// Zero padding written before any field when a record is encoded.
pub const RESERVED_PAD: usize = 128;

/// Header field names.
pub mod fields {
    pub const MAGIC: &str = "MAGIC";
    pub const VERSION_OFFSET: &str = "VERSION_OFFSET";
    pub const TYPE: &str = "TYPE";
    pub const TOP: &str = "TOP";
    pub const LEFT: &str = "LEFT";
    pub const BOTTOM: &str = "BOTTOM";
    pub const RIGHT: &str = "RIGHT";
    pub const N_COORDINATES: &str = "N_COORDINATES";
    pub const X1: &str = "X1";
    pub const Y1: &str = "Y1";
    pub const X2: &str = "X2";
    pub const Y2: &str = "Y2";
    pub const XD: &str = "XD";
    pub const YD: &str = "YD";
    pub const WIDTH: &str = "WIDTH";
    pub const HEIGHT: &str = "HEIGHT";
    pub const STROKE_WIDTH: &str = "STROKE_WIDTH";
    pub const SHAPE_ROI_SIZE: &str = "SHAPE_ROI_SIZE";
    pub const STROKE_COLOR: &str = "STROKE_COLOR";
    pub const FILL_COLOR: &str = "FILL_COLOR";
    pub const SUBTYPE: &str = "SUBTYPE";
    pub const OPTIONS: &str = "OPTIONS";
    pub const ARROW_STYLE: &str = "ARROW_STYLE";
    pub const ELLIPSE_ASPECT_RATIO: &str = "ELLIPSE_ASPECT_RATIO";
    pub const POINT_TYPE: &str = "POINT_TYPE";
    pub const ARROW_HEAD_SIZE: &str = "ARROW_HEAD_SIZE";
    pub const ROUNDED_RECT_ARC_SIZE: &str = "ROUNDED_RECT_ARC_SIZE";
    pub const POSITION: &str = "POSITION";
    pub const HEADER2_OFFSET: &str = "HEADER2_OFFSET";

    pub const C_POSITION: &str = "C_POSITION";
    pub const Z_POSITION: &str = "Z_POSITION";
    pub const T_POSITION: &str = "T_POSITION";
    pub const NAME_OFFSET: &str = "NAME_OFFSET";
    pub const NAME_LENGTH: &str = "NAME_LENGTH";
    pub const OVERLAY_LABEL_COLOR: &str = "OVERLAY_LABEL_COLOR";
    pub const OVERLAY_FONT_SIZE: &str = "OVERLAY_FONT_SIZE";
    pub const AVAILABLE_BYTE1: &str = "AVAILABLE_BYTE1";
    pub const IMAGE_OPACITY: &str = "IMAGE_OPACITY";
    pub const IMAGE_SIZE: &str = "IMAGE_SIZE";
    pub const FLOAT_STROKE_WIDTH: &str = "FLOAT_STROKE_WIDTH";
    pub const ROI_PROPS_OFFSET: &str = "ROI_PROPS_OFFSET";
    pub const ROI_PROPS_LENGTH: &str = "ROI_PROPS_LENGTH";
}

/// Primitive type of a header field on the wire. All numbers are big-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireType {
    /// `b`: signed 8-bit integer.
    Byte,
    /// `h`: signed 16-bit integer.
    Short,
    /// `i`: signed 32-bit integer.
    Int,
    /// `f`: IEEE-754 32-bit float.
    Float,
    /// `s`: raw bytes, width given by the repeat count.
    Str,
}

impl WireType {
    /// Size in bytes of a single element of this type.
    pub const fn base_size(self) -> usize {
        match self {
            WireType::Byte | WireType::Str => 1,
            WireType::Short => 2,
            WireType::Int | WireType::Float => 4,
        }
    }
}

/// Which header block a field lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Block {
    Header1,
    Header2,
}

/// Wire type, width and position of one header field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub wire_type: WireType,
    pub byte_width: usize,
    /// Absolute for [`Block::Header1`], relative to `header2_offset` for
    /// [`Block::Header2`].
    pub offset: u64,
    pub block: Block,
}

impl FieldDescriptor {
    /// Resolves the field's position in the byte stream.
    #[inline]
    pub fn absolute_offset(&self, header2_offset: u64) -> u64 {
        match self.block {
            Block::Header1 => self.offset,
            Block::Header2 => header2_offset + self.offset,
        }
    }
}

/// Parses a wire-type token such as `h` or `4s` into its type and byte width.
///
/// Evaluated at compile time for the tables below; a malformed token is a
/// build error.
pub const fn parse_token(token: &str) -> (WireType, usize) {
    let bytes = token.as_bytes();
    let mut repeat = 0usize;
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        repeat = repeat * 10 + (bytes[i] - b'0') as usize;
        i += 1;
    }
    if i + 1 != bytes.len() {
        panic!("wire-type token must end in exactly one type character");
    }
    if repeat == 0 {
        repeat = 1;
    }
    let wire_type = match bytes[i] {
        b'b' => WireType::Byte,
        b'h' => WireType::Short,
        b'i' => WireType::Int,
        b'f' => WireType::Float,
        b's' => WireType::Str,
        _ => panic!("unknown wire-type character"),
    };
    (wire_type, wire_type.base_size() * repeat)
}

const fn field(name: &'static str, token: &str, offset: u64, block: Block) -> FieldDescriptor {
    let (wire_type, byte_width) = parse_token(token);
    FieldDescriptor {
        name,
        wire_type,
        byte_width,
        offset,
        block,
    }
}

const fn h1(name: &'static str, token: &str, offset: u64) -> FieldDescriptor {
    field(name, token, offset, Block::Header1)
}

const fn h2(name: &'static str, token: &str, offset: u64) -> FieldDescriptor {
    field(name, token, offset, Block::Header2)
}

/// Header1 fields, in on-disk order. `XD`..`HEIGHT` alias `X1`..`Y2`, and
/// the three byte fields at 52 alias each other.
pub static HEADER1: [FieldDescriptor; 29] = [
    h1(fields::MAGIC, "4s", 0),
    h1(fields::VERSION_OFFSET, "h", 4),
    h1(fields::TYPE, "b", 6),
    h1(fields::TOP, "h", 8),
    h1(fields::LEFT, "h", 10),
    h1(fields::BOTTOM, "h", 12),
    h1(fields::RIGHT, "h", 14),
    h1(fields::N_COORDINATES, "h", 16),
    h1(fields::X1, "f", 18),
    h1(fields::Y1, "f", 22),
    h1(fields::X2, "f", 26),
    h1(fields::Y2, "f", 30),
    h1(fields::XD, "f", 18),
    h1(fields::YD, "f", 22),
    h1(fields::WIDTH, "f", 26),
    h1(fields::HEIGHT, "f", 30),
    h1(fields::STROKE_WIDTH, "h", 34),
    h1(fields::SHAPE_ROI_SIZE, "i", 36),
    h1(fields::STROKE_COLOR, "i", 40),
    h1(fields::FILL_COLOR, "i", 44),
    h1(fields::SUBTYPE, "h", 48),
    h1(fields::OPTIONS, "h", 50),
    h1(fields::ARROW_STYLE, "b", 52),
    h1(fields::ELLIPSE_ASPECT_RATIO, "b", 52),
    h1(fields::POINT_TYPE, "b", 52),
    h1(fields::ARROW_HEAD_SIZE, "b", 53),
    h1(fields::ROUNDED_RECT_ARC_SIZE, "h", 54),
    h1(fields::POSITION, "i", 56),
    h1(fields::HEADER2_OFFSET, "i", 60),
];

/// Header2 fields, offsets relative to `HEADER2_OFFSET`.
pub static HEADER2: [FieldDescriptor; 13] = [
    h2(fields::C_POSITION, "i", 4),
    h2(fields::Z_POSITION, "i", 8),
    h2(fields::T_POSITION, "i", 12),
    h2(fields::NAME_OFFSET, "i", 16),
    h2(fields::NAME_LENGTH, "i", 20),
    h2(fields::OVERLAY_LABEL_COLOR, "i", 24),
    h2(fields::OVERLAY_FONT_SIZE, "h", 28),
    h2(fields::AVAILABLE_BYTE1, "b", 30),
    h2(fields::IMAGE_OPACITY, "b", 31),
    h2(fields::IMAGE_SIZE, "i", 32),
    h2(fields::FLOAT_STROKE_WIDTH, "f", 36),
    h2(fields::ROI_PROPS_OFFSET, "i", 40),
    h2(fields::ROI_PROPS_LENGTH, "i", 44),
];

/// Looks up a field by name in Header1, then Header2.
pub fn lookup(name: &str) -> Result<&'static FieldDescriptor, SchemaError> {
    HEADER1
        .iter()
        .chain(HEADER2.iter())
        .find(|desc| desc.name == name)
        .ok_or_else(|| SchemaError::UnknownField(name.to_string()))
}

/// Iterates every field of both tables, Header1 first.
pub fn all_fields() -> impl Iterator<Item = &'static FieldDescriptor> {
    HEADER1.iter().chain(HEADER2.iter())
}

/// Position of Header2 for a record with `n_coordinates` points, or `None`
/// for variants that carry no coordinate array.
///
/// Each point takes two bytes of x and two bytes of y.
#[inline]
pub fn header2_offset(n_coordinates: Option<usize>) -> u64 {
    match n_coordinates {
        Some(n) => COORDINATES_OFFSET + 4 * n as u64,
        None => COORDINATES_OFFSET,
    }
}

/// Position of the name, directly after the Header2 block.
#[inline]
pub fn name_offset(header2_offset: u64) -> u64 {
    header2_offset + HEADER2_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_widths() {
        assert_eq!(parse_token("h"), (WireType::Short, 2));
        assert_eq!(parse_token("f"), (WireType::Float, 4));
        assert_eq!(parse_token("i"), (WireType::Int, 4));
        assert_eq!(parse_token("b"), (WireType::Byte, 1));
        assert_eq!(parse_token("4s"), (WireType::Str, 4));
        assert_eq!(parse_token("12s"), (WireType::Str, 12));
    }

    #[test]
    fn test_lookup_header1_field() {
        let desc = lookup("TYPE").unwrap();
        assert_eq!(desc.wire_type, WireType::Byte);
        assert_eq!(desc.byte_width, 1);
        assert_eq!(desc.offset, 6);
        assert_eq!(desc.block, Block::Header1);
        assert_eq!(desc.absolute_offset(500), 6);
    }

    #[test]
    fn test_lookup_header2_field_is_relative() {
        let desc = lookup("NAME_LENGTH").unwrap();
        assert_eq!(desc.block, Block::Header2);
        assert_eq!(desc.offset, 20);
        assert_eq!(desc.absolute_offset(84), 104);
    }

    #[test]
    fn test_lookup_unknown_field() {
        let err = lookup("NOT_A_FIELD").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField(name) if name == "NOT_A_FIELD"));
    }

    #[test]
    fn test_header1_fits_in_block() {
        for desc in HEADER1.iter() {
            assert!(desc.offset + desc.byte_width as u64 <= HEADER1_SIZE, "{}", desc.name);
        }
    }

    #[test]
    fn test_header2_fits_in_block() {
        for desc in HEADER2.iter() {
            assert!(desc.offset + desc.byte_width as u64 <= HEADER2_SIZE, "{}", desc.name);
        }
    }

    #[test]
    fn test_field_names_are_unique() {
        let mut names: Vec<_> = all_fields().map(|d| d.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 42);
    }

    #[test]
    fn test_offsets() {
        assert_eq!(header2_offset(None), 64);
        assert_eq!(header2_offset(Some(0)), 64);
        assert_eq!(header2_offset(Some(5)), 84);
        assert_eq!(name_offset(header2_offset(Some(5))), 148);
        assert_eq!(name_offset(header2_offset(None)), 128);
    }
}
