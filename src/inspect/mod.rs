//! ROI inspection.
//!
//! Produces a structured summary of a decoded record: its shape, box,
//! coordinate count, area, name and the stack position fields ImageJ uses
//! to attach an ROI to a slice.

mod report;

pub use report::{GeometrySection, InspectReport, LayoutSection, PositionSection};

use crate::roi::schema::fields;
use crate::roi::RoiRecord;

/// Inspect a record and produce a report.
pub fn inspect_roi(record: &RoiRecord) -> InspectReport {
    let shape = &record.shape;
    let kind = record.kind();

    let geometry = GeometrySection {
        bbox: shape.bbox().copied(),
        points: shape.coords().map(|c| c.len()),
        width: shape.width(),
        height: shape.height(),
        area: record.area(),
    };

    let header = &record.header;
    let layout = LayoutSection {
        version: header.get_i64(fields::VERSION_OFFSET),
        header2_offset: header
            .get_i64(fields::HEADER2_OFFSET)
            .unwrap_or(record.header2_offset() as i64),
        name_offset: header
            .get_i64(fields::NAME_OFFSET)
            .unwrap_or(record.name_offset() as i64),
        header_fields: header.len(),
    };

    let position = PositionSection {
        position: header.get_i64(fields::POSITION).unwrap_or(0),
        channel: header.get_i64(fields::C_POSITION).unwrap_or(0),
        slice: header.get_i64(fields::Z_POSITION).unwrap_or(0),
        frame: header.get_i64(fields::T_POSITION).unwrap_or(0),
    };

    InspectReport {
        kind: kind.name().to_string(),
        code: kind.code(),
        name: record.name.clone(),
        geometry,
        layout,
        position,
    }
}
