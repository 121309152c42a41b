//! JSON form of an ROI record.
//!
//! This provides a readable stand-in for the binary format. It is useful for:
//! - Inspecting what a `.roi` file decodes to
//! - Authoring records by hand and encoding them with `roicodec convert`
//! - Carrying header fields such as slice position through edits
//!
//! The shape is flattened into the top-level object and tagged by `type`:
//!
//! ```json
//! {
//!   "type": "polygon",
//!   "bbox": { "top": 30, "left": 22, "bottom": 76, "right": 83 },
//!   "coords": { "x": [0, 13, 25, 60, 5], "y": [45, 30, 0, 12, 20] },
//!   "name": "cell_1",
//!   "header": { "POSITION": 4 }
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::model::RoiRecord;
use crate::error::RoiError;

/// Reads a record from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, including
/// coordinate sequences of unequal length.
pub fn read_roi_json(path: &Path) -> Result<RoiRecord, RoiError> {
    let file = File::open(path).map_err(RoiError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| RoiError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a record to a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_roi_json(path: &Path, record: &RoiRecord) -> Result<(), RoiError> {
    let file = File::create(path).map_err(RoiError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, record).map_err(|source| RoiError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a record from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<RoiRecord, serde_json::Error> {
    serde_json::from_str(json)
}

/// Writes a record to a JSON string.
///
/// Useful for testing without file I/O.
pub fn to_json_string(record: &RoiRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}
