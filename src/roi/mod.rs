//! ImageJ ROI records and their binary codec.
//!
//! An ROI file holds a single region of interest: a fixed 64-byte Header1,
//! an optional coordinate array, a 64-byte Header2 whose position is stored
//! in Header1, and a name. All numbers are big-endian.
//!
//! # Example
//!
//! ```
//! use roicodec::roi::{from_roi_slice, to_roi_bytes, RoiBox, RoiRecord, Shape};
//!
//! let record = RoiRecord::new(Shape::rect(RoiBox::new(20, 30, 40, 50))).with_name("rect_test");
//! let bytes = to_roi_bytes(&record, "unused")?;
//! let decoded = from_roi_slice(&bytes)?;
//!
//! assert_eq!(decoded.shape, record.shape);
//! assert_eq!(decoded.area(), Some(400.0));
//! # Ok::<(), roicodec::RoiError>(())
//! ```

mod bbox;
mod coords;
pub mod decoder;
pub mod encoder;
mod header;
pub mod io_json;
mod kind;
mod model;
pub mod name;
pub mod schema;

// Re-export core types for convenient access
pub use bbox::RoiBox;
pub use coords::Coordinates;
pub use decoder::{from_roi_slice, read_roi, read_roi_header, RoiDecoder};
pub use encoder::{default_name_for, to_roi_bytes, write_roi, RoiEncoder};
pub use header::{HeaderMap, HeaderValue};
pub use kind::RoiKind;
pub use model::{RoiRecord, Shape};
pub use schema::{FieldDescriptor, WireType};
