use std::path::PathBuf;
use thiserror::Error;

use crate::roi::WireType;

/// Byte-level problems with an ROI stream, or a record the format cannot hold.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid ROI file: magic number mismatch")]
    BadMagic,

    #[error("Unsupported ROI type code {0}")]
    UnsupportedType(i16),

    #[error("Invalid {field} value {value}")]
    InvalidLength { field: &'static str, value: i64 },

    #[error("Character {0:?} cannot be stored in an ROI name")]
    UnencodableName(char),
}

/// Lookup of a header field that is not part of either schema table.
///
/// Only reachable through a programming error inside the codec.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Header variable {0} not found")]
    UnknownField(String),

    #[error("Header variable {field} has wire type {wire_type:?}")]
    WireTypeMismatch {
        field: &'static str,
        wire_type: WireType,
    },
}

/// Rejected shape construction.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("Unequal length of x and y coords ({x} x values, {y} y values)")]
    LengthMismatch { x: usize, y: usize },
}

/// The main error type for roicodec operations.
#[derive(Debug, Error)]
pub enum RoiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("Failed to parse ROI JSON from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write ROI JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
