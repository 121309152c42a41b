//! ROI encoder.
//!
//! Every field is written at its fixed offset rather than appended, so the
//! sink must support seeking. The layout written for a record with `N`
//! points is:
//!
//! ```text
//! 0      Header1 (64 bytes; 128 zero bytes are reserved up front)
//! 64     x[0..N], y[0..N]           (i16, big-endian)
//! 64+4N  Header2 (64 bytes)
//! +64    name (2 bytes per character)
//! ```
//!
//! Shapes without coordinates put Header2 at 64.

use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

use super::bbox::RoiBox;
use super::coords::Coordinates;
use super::header::HeaderValue;
use super::model::{RoiRecord, Shape};
use super::name::{encode_name, name_length};
use super::schema::{self, fields, FieldDescriptor, WireType};
use crate::error::{FormatError, RoiError, SchemaError};

/// Fields the encoder derives from the shape. Header values under these
/// names are not carried over.
const COMPUTED_FIELDS: [&str; 11] = [
    fields::MAGIC,
    fields::VERSION_OFFSET,
    fields::TYPE,
    fields::TOP,
    fields::LEFT,
    fields::BOTTOM,
    fields::RIGHT,
    fields::N_COORDINATES,
    fields::ROUNDED_RECT_ARC_SIZE,
    fields::HEADER2_OFFSET,
    fields::SHAPE_ROI_SIZE,
];

/// The float block at 18..34. Lines store their endpoints here; other shapes
/// use it for sub-pixel bounds or ellipse and rotated-rectangle parameters,
/// which are carried over from the header.
const FLOAT_FIELDS: [&str; 8] = [
    fields::X1,
    fields::Y1,
    fields::X2,
    fields::Y2,
    fields::XD,
    fields::YD,
    fields::WIDTH,
    fields::HEIGHT,
];

/// Fields that locate data the encoder never writes.
const LOCATOR_FIELDS: [&str; 4] = [
    fields::NAME_OFFSET,
    fields::NAME_LENGTH,
    fields::ROI_PROPS_OFFSET,
    fields::ROI_PROPS_LENGTH,
];

/// Writes one ROI record to a seekable sink.
pub struct RoiEncoder<'a, W> {
    sink: W,
    record: &'a RoiRecord,
    default_name: String,
}

impl<'a, W: Write + Seek> RoiEncoder<'a, W> {
    /// Takes ownership of `sink` and writes the reserved zero pad.
    pub fn new(mut sink: W, record: &'a RoiRecord) -> Result<Self, RoiError> {
        sink.seek(SeekFrom::Start(0))?;
        sink.write_all(&[0u8; schema::RESERVED_PAD])?;
        Ok(Self {
            sink,
            record,
            default_name: String::new(),
        })
    }

    /// Name to write when the record has none, typically the destination
    /// file's stem.
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Writes the record and flushes the sink.
    ///
    /// # Errors
    /// - [`FormatError::UnsupportedType`] for no-roi, traced, angle and point
    ///   shapes. Bytes already written are left in place.
    /// - [`FormatError::InvalidLength`] for more points than `N_COORDINATES`
    ///   can hold.
    /// - [`FormatError::UnencodableName`] for a name outside Latin-1.
    pub fn write(&mut self) -> Result<(), RoiError> {
        self.write_bytes(fields::MAGIC, &schema::MAGIC)?;
        self.write_int(fields::VERSION_OFFSET, schema::VERSION)?;
        self.write_passthrough()?;

        let record = self.record;
        tracing::debug!(kind = %record.kind(), "encoding roi");
        match &record.shape {
            Shape::Polygon { bbox, coords }
            | Shape::FreeLine { bbox, coords }
            | Shape::Polyline { bbox, coords }
            | Shape::Freehand { bbox, coords } => self.write_multi_point(bbox, coords)?,
            Shape::Rect { bbox, arc } => self.write_rect(bbox, *arc)?,
            Shape::Oval { bbox } => self.write_oval(bbox)?,
            Shape::Line { x1, y1, x2, y2 } => self.write_line([*x1, *y1, *x2, *y2])?,
            Shape::NoRoi | Shape::Traced { .. } | Shape::Angle | Shape::Point => {
                return Err(FormatError::UnsupportedType(i16::from(record.kind().code())).into());
            }
        }

        self.write_name()?;
        self.sink.flush()?;
        Ok(())
    }

    /// Releases the encoder, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_rect(&mut self, bbox: &RoiBox, arc: i16) -> Result<(), RoiError> {
        self.write_type()?;
        self.write_box(bbox)?;
        self.write_int(fields::ROUNDED_RECT_ARC_SIZE, arc as i64)?;
        self.write_offsets()
    }

    fn write_oval(&mut self, bbox: &RoiBox) -> Result<(), RoiError> {
        self.write_type()?;
        self.write_box(bbox)?;
        self.write_offsets()
    }

    fn write_line(&mut self, endpoints: [f32; 4]) -> Result<(), RoiError> {
        self.write_type()?;
        let names = [fields::X1, fields::Y1, fields::X2, fields::Y2];
        for (name, value) in names.into_iter().zip(endpoints) {
            self.write_float(name, value)?;
        }
        self.write_offsets()
    }

    fn write_multi_point(&mut self, bbox: &RoiBox, coords: &Coordinates) -> Result<(), RoiError> {
        let n = i16::try_from(coords.len()).map_err(|_| FormatError::InvalidLength {
            field: fields::N_COORDINATES,
            value: coords.len() as i64,
        })?;

        self.write_type()?;
        self.write_box(bbox)?;
        self.write_int(fields::N_COORDINATES, n as i64)?;
        self.write_offsets()?;

        self.sink.seek(SeekFrom::Start(schema::COORDINATES_OFFSET))?;
        for &v in coords.x().iter().chain(coords.y()) {
            self.sink.write_i16::<BigEndian>(v as i16)?;
        }
        tracing::trace!(points = coords.len(), "wrote coordinates");
        Ok(())
    }

    fn write_type(&mut self) -> Result<(), RoiError> {
        self.write_int(fields::TYPE, self.record.kind().code() as i64)
    }

    fn write_box(&mut self, bbox: &RoiBox) -> Result<(), RoiError> {
        self.write_int(fields::TOP, bbox.top as i64)?;
        self.write_int(fields::LEFT, bbox.left as i64)?;
        self.write_int(fields::BOTTOM, bbox.bottom as i64)?;
        self.write_int(fields::RIGHT, bbox.right as i64)
    }

    fn write_offsets(&mut self) -> Result<(), RoiError> {
        self.write_int(fields::HEADER2_OFFSET, self.record.header2_offset() as i64)?;
        self.write_int(fields::NAME_OFFSET, self.record.name_offset() as i64)
    }

    fn write_name(&mut self) -> Result<(), RoiError> {
        let name = match self.record.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.default_name.clone(),
        };
        let bytes = encode_name(&name)?;
        let length = name_length(&name) as i64;

        self.write_int(fields::NAME_LENGTH, length)?;
        let offset = self.record.name_offset();
        self.sink.seek(SeekFrom::Start(offset))?;
        self.sink.write_all(&bytes)?;
        Ok(())
    }

    /// Copies caller-set header values that the shape writer does not own.
    fn write_passthrough(&mut self) -> Result<(), RoiError> {
        let record = self.record;
        let is_line = matches!(record.shape, Shape::Line { .. });
        for desc in schema::all_fields() {
            if COMPUTED_FIELDS.contains(&desc.name)
                || LOCATOR_FIELDS.contains(&desc.name)
                || (is_line && FLOAT_FIELDS.contains(&desc.name))
            {
                continue;
            }
            let Some(value) = record.header.get(desc.name) else {
                continue;
            };
            match (desc.wire_type, value) {
                (WireType::Str, HeaderValue::Bytes(bytes)) => self.write_bytes(desc.name, bytes)?,
                (WireType::Float, value) => {
                    if let Some(v) = value.as_f32() {
                        self.write_float(desc.name, v)?;
                    }
                }
                (_, value) => match value.as_i64() {
                    Some(v) => self.write_int(desc.name, v)?,
                    None => {
                        tracing::warn!(field = desc.name, "skipping non-numeric header value");
                    }
                },
            }
        }
        Ok(())
    }

    fn seek_field(&mut self, name: &str) -> Result<&'static FieldDescriptor, RoiError> {
        let desc = schema::lookup(name)?;
        let offset = desc.absolute_offset(self.record.header2_offset());
        self.sink.seek(SeekFrom::Start(offset))?;
        tracing::trace!(field = desc.name, offset, "write header field");
        Ok(desc)
    }

    /// Writes an integer field, narrowing to the field's width.
    fn write_int(&mut self, name: &str, value: i64) -> Result<(), RoiError> {
        let desc = self.seek_field(name)?;
        match desc.wire_type {
            WireType::Byte => self.sink.write_i8(value as i8)?,
            WireType::Short => self.sink.write_i16::<BigEndian>(value as i16)?,
            WireType::Int => self.sink.write_i32::<BigEndian>(value as i32)?,
            WireType::Float => self.sink.write_f32::<BigEndian>(value as f32)?,
            WireType::Str => return Err(mismatch(desc)),
        }
        Ok(())
    }

    fn write_float(&mut self, name: &str, value: f32) -> Result<(), RoiError> {
        let desc = self.seek_field(name)?;
        match desc.wire_type {
            WireType::Float => self.sink.write_f32::<BigEndian>(value)?,
            _ => return Err(mismatch(desc)),
        }
        Ok(())
    }

    /// Writes a string field, zero-padded or truncated to its width.
    fn write_bytes(&mut self, name: &str, value: &[u8]) -> Result<(), RoiError> {
        let desc = self.seek_field(name)?;
        if desc.wire_type != WireType::Str {
            return Err(mismatch(desc));
        }
        let mut buf = vec![0u8; desc.byte_width];
        let n = value.len().min(desc.byte_width);
        buf[..n].copy_from_slice(&value[..n]);
        self.sink.write_all(&buf)?;
        Ok(())
    }
}

fn mismatch(desc: &FieldDescriptor) -> RoiError {
    SchemaError::WireTypeMismatch {
        field: desc.name,
        wire_type: desc.wire_type,
    }
    .into()
}

/// Default name for a record written to `path`: the file name without its
/// extension.
pub fn default_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Writes `record` to a new file at `path`.
///
/// Unnamed records are named after the file. The file is closed before this
/// returns, whether encoding succeeded or not; on error it is left partially
/// written.
pub fn write_roi(path: &Path, record: &RoiRecord) -> Result<(), RoiError> {
    let file = File::create(path).map_err(RoiError::Io)?;
    let mut encoder =
        RoiEncoder::new(BufWriter::new(file), record)?.with_default_name(default_name_for(path));
    encoder.write()
}

/// Encodes `record` into a byte vector.
///
/// Useful for testing without file I/O.
pub fn to_roi_bytes(record: &RoiRecord, default_name: &str) -> Result<Vec<u8>, RoiError> {
    let mut encoder =
        RoiEncoder::new(Cursor::new(Vec::new()), record)?.with_default_name(default_name);
    encoder.write()?;
    Ok(encoder.into_inner().into_inner())
}
