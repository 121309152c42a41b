//! ROI decoder.
//!
//! Decoding runs in a fixed order over a seekable byte source:
//!
//! 1. Check the 4-byte magic at offset 0.
//! 2. Read every Header1 and Header2 field at its absolute offset into a
//!    [`HeaderMap`].
//! 3. Select the shape reader from the `TYPE` discriminant.
//! 4. Read the shape's fields and, for multi-point shapes, `N_COORDINATES`
//!    x values followed by `N_COORDINATES` y values at offset 64.
//! 5. Read `NAME_LENGTH` two-byte characters at `NAME_OFFSET`.
//!
//! The source is owned by the decoder and released when it is dropped, on
//! success and error alike.

use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};

use super::bbox::RoiBox;
use super::coords::Coordinates;
use super::header::{HeaderMap, HeaderValue};
use super::kind::RoiKind;
use super::model::{RoiRecord, Shape};
use super::name::decode_name;
use super::schema::{self, fields, Block, FieldDescriptor, WireType};
use crate::error::{FormatError, RoiError};

/// Fields that are set to 0 instead of read, for compatibility with file
/// revisions whose Header2 stops before them.
const DEFAULTED_FIELDS: [&str; 3] = [
    fields::OVERLAY_LABEL_COLOR,
    fields::OVERLAY_FONT_SIZE,
    fields::IMAGE_OPACITY,
];

/// Reads one ROI record from a seekable source.
pub struct RoiDecoder<R> {
    source: R,
    header: HeaderMap,
    header_read: bool,
}

impl<R: Read + Seek> RoiDecoder<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            header: HeaderMap::new(),
            header_read: false,
        }
    }

    /// Verifies the magic and reads all header fields.
    ///
    /// # Errors
    /// [`FormatError::BadMagic`] if the first four bytes are not `Iout`.
    pub fn read_header(&mut self) -> Result<&HeaderMap, RoiError> {
        self.check_magic()?;

        let header2_offset = self.header2_offset()?;
        for desc in schema::HEADER1.iter() {
            let value = self.read_value(desc, header2_offset)?;
            self.header.insert(desc.name, value);
        }

        for desc in schema::HEADER2.iter() {
            if DEFAULTED_FIELDS.contains(&desc.name) {
                continue;
            }
            let value = match header2_offset {
                // No Header2 in this revision.
                0 => zero_value(desc),
                offset => self.read_optional_value(desc, offset)?,
            };
            self.header.insert(desc.name, value);
        }

        for name in DEFAULTED_FIELDS {
            self.header.insert(name, HeaderValue::Int(0));
        }

        self.header_read = true;
        Ok(&self.header)
    }

    /// Decodes the record, reading the header first if needed.
    ///
    /// # Errors
    /// - [`FormatError::BadMagic`] for non-ROI input.
    /// - [`FormatError::UnsupportedType`] for a discriminant outside 0..=10
    ///   or a kind with no reader (no-roi, angle, point).
    /// - [`FormatError::InvalidLength`] for a negative count or length field.
    pub fn get_roi(&mut self) -> Result<RoiRecord, RoiError> {
        if !self.header_read {
            self.read_header()?;
        }

        // TYPE is a signed byte, so the raw value always fits in i16.
        let raw = self.header_int(fields::TYPE)? as i16;
        let code = u8::try_from(raw).map_err(|_| FormatError::UnsupportedType(raw))?;
        let kind = RoiKind::from_code(code)?;
        tracing::debug!(kind = %kind, "decoding roi");

        let shape = match kind {
            RoiKind::Polygon => self.read_polygon()?,
            RoiKind::Rect => self.read_rect()?,
            RoiKind::Oval => self.read_oval()?,
            RoiKind::Line => self.read_line()?,
            RoiKind::FreeLine => self.read_free_line()?,
            RoiKind::Polyline => self.read_polyline()?,
            RoiKind::NoRoi => return Err(FormatError::UnsupportedType(raw).into()),
            RoiKind::Freehand => self.read_freehand()?,
            RoiKind::Traced => self.read_traced()?,
            RoiKind::Angle => return Err(FormatError::UnsupportedType(raw).into()),
            RoiKind::Point => return Err(FormatError::UnsupportedType(raw).into()),
        };

        let name = self.read_name()?;

        Ok(RoiRecord {
            shape,
            name,
            header: self.header.clone(),
        })
    }

    /// The header read so far. Empty until [`read_header`](Self::read_header)
    /// or [`get_roi`](Self::get_roi) has run.
    pub fn header(&self) -> &HeaderMap {
        &self.header
    }

    /// Releases the decoder, returning the source.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn read_polygon(&mut self) -> Result<Shape, RoiError> {
        let bbox = self.read_box()?;
        let coords = self.read_coords()?;
        Ok(Shape::Polygon { bbox, coords })
    }

    fn read_rect(&mut self) -> Result<Shape, RoiError> {
        let arc = self.set_header(fields::ROUNDED_RECT_ARC_SIZE)? as i16;
        let bbox = self.read_box()?;
        Ok(Shape::Rect { bbox, arc })
    }

    fn read_oval(&mut self) -> Result<Shape, RoiError> {
        let bbox = self.read_box()?;
        Ok(Shape::Oval { bbox })
    }

    fn read_line(&mut self) -> Result<Shape, RoiError> {
        Ok(Shape::Line {
            x1: self.header_float(fields::X1)?,
            y1: self.header_float(fields::Y1)?,
            x2: self.header_float(fields::X2)?,
            y2: self.header_float(fields::Y2)?,
        })
    }

    fn read_free_line(&mut self) -> Result<Shape, RoiError> {
        let bbox = self.read_box()?;
        let coords = self.read_coords()?;
        Ok(Shape::FreeLine { bbox, coords })
    }

    fn read_polyline(&mut self) -> Result<Shape, RoiError> {
        let bbox = self.read_box()?;
        let coords = self.read_coords()?;
        Ok(Shape::Polyline { bbox, coords })
    }

    fn read_freehand(&mut self) -> Result<Shape, RoiError> {
        let bbox = self.read_box()?;
        let coords = self.read_coords()?;
        Ok(Shape::Freehand { bbox, coords })
    }

    fn read_traced(&mut self) -> Result<Shape, RoiError> {
        let bbox = self.read_box()?;
        let coords = self.read_coords()?;
        Ok(Shape::Traced { bbox, coords })
    }

    fn check_magic(&mut self) -> Result<(), RoiError> {
        self.source.seek(SeekFrom::Start(0))?;
        let mut magic = [0u8; 4];
        match self.source.read_exact(&mut magic) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(FormatError::BadMagic.into());
            }
            Err(e) => return Err(e.into()),
        }
        if magic != schema::MAGIC {
            return Err(FormatError::BadMagic.into());
        }
        Ok(())
    }

    fn header2_offset(&mut self) -> Result<u64, RoiError> {
        let desc = schema::lookup(fields::HEADER2_OFFSET)?;
        let raw = self.read_value(desc, 0)?.as_i64().unwrap_or_default();
        let offset = u64::try_from(raw).map_err(|_| FormatError::InvalidLength {
            field: fields::HEADER2_OFFSET,
            value: raw,
        })?;
        Ok(offset)
    }

    /// Re-reads `name` from the source into the header map.
    fn set_header(&mut self, name: &str) -> Result<i64, RoiError> {
        let desc = schema::lookup(name)?;
        let header2_offset = match desc.block {
            Block::Header1 => 0,
            Block::Header2 => self.header2_offset()?,
        };
        let value = self.read_value(desc, header2_offset)?;
        let int = value.as_i64().unwrap_or_default();
        self.header.insert(desc.name, value);
        Ok(int)
    }

    fn read_box(&mut self) -> Result<RoiBox, RoiError> {
        let top = self.set_header(fields::TOP)? as i16;
        let left = self.set_header(fields::LEFT)? as i16;
        let bottom = self.set_header(fields::BOTTOM)? as i16;
        let right = self.set_header(fields::RIGHT)? as i16;
        Ok(RoiBox::new(top, left, bottom, right))
    }

    fn read_coords(&mut self) -> Result<Coordinates, RoiError> {
        let n = self.header_int(fields::N_COORDINATES)?;
        let n = usize::try_from(n).map_err(|_| FormatError::InvalidLength {
            field: fields::N_COORDINATES,
            value: n,
        })?;

        self.source.seek(SeekFrom::Start(schema::COORDINATES_OFFSET))?;
        let mut x = vec![0i16; n];
        let mut y = vec![0i16; n];
        self.source.read_i16_into::<BigEndian>(&mut x)?;
        self.source.read_i16_into::<BigEndian>(&mut y)?;
        tracing::trace!(points = n, "read coordinates");

        let x: Vec<i32> = x.into_iter().map(i32::from).collect();
        let y: Vec<i32> = y.into_iter().map(i32::from).collect();
        Ok(Coordinates::new(x, y)?)
    }

    fn read_name(&mut self) -> Result<Option<String>, RoiError> {
        let length = self.header_int(fields::NAME_LENGTH)?;
        let offset = self.header_int(fields::NAME_OFFSET)?;
        if length < 0 {
            return Err(FormatError::InvalidLength {
                field: fields::NAME_LENGTH,
                value: length,
            }
            .into());
        }
        if length == 0 || offset <= 0 {
            return Ok(None);
        }

        let byte_len = 2 * length as u64;
        self.source.seek(SeekFrom::Start(offset as u64))?;
        let mut bytes = Vec::new();
        (&mut self.source).take(byte_len).read_to_end(&mut bytes)?;
        if (bytes.len() as u64) < byte_len {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("name needs {} bytes, found {}", byte_len, bytes.len()),
            )
            .into());
        }
        Ok(Some(decode_name(&bytes)))
    }

    fn header_int(&self, name: &str) -> Result<i64, RoiError> {
        // Validates the name even though every field is in the map.
        let desc = schema::lookup(name)?;
        Ok(self.header.get_i64(desc.name).unwrap_or_default())
    }

    fn header_float(&self, name: &str) -> Result<f32, RoiError> {
        let desc = schema::lookup(name)?;
        Ok(self.header.get_f32(desc.name).unwrap_or_default())
    }

    /// Like [`read_value`](Self::read_value), but a field cut off by the end
    /// of input reads as zero.
    fn read_optional_value(
        &mut self,
        desc: &FieldDescriptor,
        header2_offset: u64,
    ) -> Result<HeaderValue, RoiError> {
        match self.read_value(desc, header2_offset) {
            Err(RoiError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                tracing::debug!(field = desc.name, "header2 truncated, defaulting to 0");
                Ok(zero_value(desc))
            }
            other => other,
        }
    }

    fn read_value(
        &mut self,
        desc: &FieldDescriptor,
        header2_offset: u64,
    ) -> Result<HeaderValue, RoiError> {
        let offset = desc.absolute_offset(header2_offset);
        self.source.seek(SeekFrom::Start(offset))?;
        let value = match desc.wire_type {
            WireType::Byte => HeaderValue::Int(self.source.read_i8()? as i64),
            WireType::Short => HeaderValue::Int(self.source.read_i16::<BigEndian>()? as i64),
            WireType::Int => HeaderValue::Int(self.source.read_i32::<BigEndian>()? as i64),
            WireType::Float => HeaderValue::Float(self.source.read_f32::<BigEndian>()?),
            WireType::Str => {
                let mut buf = vec![0u8; desc.byte_width];
                self.source.read_exact(&mut buf)?;
                HeaderValue::Bytes(buf)
            }
        };
        tracing::trace!(field = desc.name, offset, %value, "read header field");
        Ok(value)
    }
}

fn zero_value(desc: &FieldDescriptor) -> HeaderValue {
    match desc.wire_type {
        WireType::Float => HeaderValue::Float(0.0),
        WireType::Str => HeaderValue::Bytes(vec![0; desc.byte_width]),
        WireType::Byte | WireType::Short | WireType::Int => HeaderValue::Int(0),
    }
}

/// Reads the ROI record stored at `path`.
///
/// The file is closed before this returns, whether decoding succeeded or not.
pub fn read_roi(path: &Path) -> Result<RoiRecord, RoiError> {
    let file = File::open(path).map_err(RoiError::Io)?;
    RoiDecoder::new(BufReader::new(file)).get_roi()
}

/// Reads only the header fields of the ROI file at `path`.
pub fn read_roi_header(path: &Path) -> Result<HeaderMap, RoiError> {
    let file = File::open(path).map_err(RoiError::Io)?;
    let mut decoder = RoiDecoder::new(BufReader::new(file));
    decoder.read_header()?;
    Ok(decoder.header)
}

/// Decodes an ROI record from an in-memory byte slice.
///
/// Useful for testing without file I/O.
pub fn from_roi_slice(bytes: &[u8]) -> Result<RoiRecord, RoiError> {
    RoiDecoder::new(Cursor::new(bytes)).get_roi()
}

/// Fuzz-only entrypoint for header parsing on its own.
#[cfg(feature = "fuzzing")]
pub fn fuzz_read_header(input: &[u8]) -> Result<(), RoiError> {
    RoiDecoder::new(Cursor::new(input)).read_header()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-built rectangle as ImageJ writes it: no pad, UTF-16 name.
    fn rect_bytes() -> Vec<u8> {
        let mut bytes = vec![0u8; 128 + 8];
        bytes[0..4].copy_from_slice(b"Iout");
        bytes[4..6].copy_from_slice(&227i16.to_be_bytes());
        bytes[6] = 1;
        bytes[8..10].copy_from_slice(&0i16.to_be_bytes());
        bytes[10..12].copy_from_slice(&0i16.to_be_bytes());
        bytes[12..14].copy_from_slice(&55i16.to_be_bytes());
        bytes[14..16].copy_from_slice(&114i16.to_be_bytes());
        bytes[60..64].copy_from_slice(&64i32.to_be_bytes());
        // Header2: C_POSITION, NAME_OFFSET, NAME_LENGTH
        bytes[68..72].copy_from_slice(&2i32.to_be_bytes());
        bytes[80..84].copy_from_slice(&128i32.to_be_bytes());
        bytes[84..88].copy_from_slice(&4i32.to_be_bytes());
        bytes[88..92].copy_from_slice(&0x00ff_00ffi32.to_be_bytes());
        bytes[128..136].copy_from_slice(&[0, b'r', 0, b'e', 0, b'c', 0, b't']);
        bytes
    }

    #[test]
    fn test_decode_rect() {
        let record = from_roi_slice(&rect_bytes()).unwrap();
        assert_eq!(record.shape, Shape::rect(RoiBox::new(0, 0, 55, 114)));
        assert_eq!(record.area(), Some(6270.0));
        assert_eq!(record.name.as_deref(), Some("rect"));
        assert_eq!(record.header.get_i64("C_POSITION"), Some(2));
        assert_eq!(record.header.get_i64("VERSION_OFFSET"), Some(227));
    }

    #[test]
    fn test_defaulted_fields_are_zero() {
        let record = from_roi_slice(&rect_bytes()).unwrap();
        assert_eq!(record.header.get_i64("OVERLAY_LABEL_COLOR"), Some(0));
        assert_eq!(record.header.get_i64("OVERLAY_FONT_SIZE"), Some(0));
        assert_eq!(record.header.get_i64("IMAGE_OPACITY"), Some(0));
    }

    #[test]
    fn test_header_contains_every_field() {
        let mut decoder = RoiDecoder::new(Cursor::new(rect_bytes()));
        let header = decoder.read_header().unwrap();
        assert_eq!(header.len(), 42);
        assert_eq!(
            header.get("MAGIC"),
            Some(&HeaderValue::Bytes(b"Iout".to_vec()))
        );
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = rect_bytes();
        bytes[0] = b'X';
        let err = from_roi_slice(&bytes).unwrap_err();
        assert!(matches!(err, RoiError::Format(FormatError::BadMagic)));
    }

    #[test]
    fn test_short_input_is_bad_magic() {
        let err = from_roi_slice(b"Io").unwrap_err();
        assert!(matches!(err, RoiError::Format(FormatError::BadMagic)));
    }

    #[test]
    fn test_unmapped_type() {
        let mut bytes = rect_bytes();
        bytes[6] = 11;
        let err = from_roi_slice(&bytes).unwrap_err();
        assert!(matches!(
            err,
            RoiError::Format(FormatError::UnsupportedType(11))
        ));
    }

    #[test]
    fn test_negative_type_reported_unwrapped() {
        let mut bytes = rect_bytes();
        bytes[6] = 0xFF;
        let err = from_roi_slice(&bytes).unwrap_err();
        assert!(matches!(
            err,
            RoiError::Format(FormatError::UnsupportedType(-1))
        ));
        assert!(err.to_string().contains("code -1"));
    }

    #[test]
    fn test_point_has_no_reader() {
        let mut bytes = rect_bytes();
        bytes[6] = 10;
        let err = from_roi_slice(&bytes).unwrap_err();
        assert!(matches!(
            err,
            RoiError::Format(FormatError::UnsupportedType(10))
        ));
    }

    #[test]
    fn test_missing_header2_decodes_without_name() {
        let mut bytes = rect_bytes();
        bytes[60..64].copy_from_slice(&0i32.to_be_bytes());
        let record = from_roi_slice(&bytes).unwrap();
        assert_eq!(record.name, None);
        assert_eq!(record.header.get_i64("C_POSITION"), Some(0));
    }

    #[test]
    fn test_truncated_header2_tail_reads_as_zero() {
        let mut bytes = rect_bytes();
        bytes.truncate(64 + 24);
        bytes[80..84].copy_from_slice(&0i32.to_be_bytes());
        let record = from_roi_slice(&bytes).unwrap();
        assert_eq!(record.header.get_i64("IMAGE_SIZE"), Some(0));
        assert_eq!(record.name, None);
    }

    #[test]
    fn test_negative_coordinate_count() {
        let mut bytes = rect_bytes();
        bytes[6] = 0;
        bytes[16..18].copy_from_slice(&(-3i16).to_be_bytes());
        let err = from_roi_slice(&bytes).unwrap_err();
        assert!(matches!(
            err,
            RoiError::Format(FormatError::InvalidLength {
                field: "N_COORDINATES",
                value: -3
            })
        ));
    }

    #[test]
    fn test_name_past_end_of_input() {
        let mut bytes = rect_bytes();
        bytes[84..88].copy_from_slice(&1000i32.to_be_bytes());
        let err = from_roi_slice(&bytes).unwrap_err();
        assert!(matches!(err, RoiError::Io(e) if e.kind() == ErrorKind::UnexpectedEof));
    }
}
