//! Inspect report types and terminal formatting.

use std::fmt;

use serde::Serialize;

use crate::roi::RoiBox;

/// Inner width of the framed sections, in characters.
const PANEL_WIDTH: usize = 59;

/// The result of inspecting a single ROI.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    /// Shape name, e.g. `polygon`.
    pub kind: String,
    /// Numeric type code stored in the `TYPE` field.
    pub code: u8,
    /// Display name, if the record has one.
    pub name: Option<String>,
    pub geometry: GeometrySection,
    pub layout: LayoutSection,
    pub position: PositionSection,
}

/// Shape extent and size.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GeometrySection {
    /// Bounding box, for shapes that store one.
    pub bbox: Option<RoiBox>,
    /// Number of coordinate pairs, for multi-point shapes.
    pub points: Option<usize>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Area in square pixels, where a formula exists for the shape.
    pub area: Option<f64>,
}

/// Where the variable-position blocks sit in the file.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LayoutSection {
    /// `VERSION_OFFSET`, present only on decoded records.
    pub version: Option<i64>,
    pub header2_offset: i64,
    pub name_offset: i64,
    /// Number of header fields carried by the record.
    pub header_fields: usize,
}

/// Stack position fields. Zero means "not attached".
#[derive(Clone, Debug, Default, Serialize)]
pub struct PositionSection {
    pub position: i64,
    pub channel: i64,
    pub slice: i64,
    pub frame: i64,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "╭{}╮", "─".repeat(PANEL_WIDTH))?;
        writeln!(f, "│{:^width$}│", "ROI Inspection Report", width = PANEL_WIDTH)?;
        writeln!(f, "╰{}╯", "─".repeat(PANEL_WIDTH))?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;

        self.fmt_geometry(f)?;
        writeln!(f)?;

        self.fmt_layout(f)?;

        Ok(())
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section_top(f, "Summary")?;
        row(f, "Type", &format!("{} ({})", self.kind, self.code))?;
        row(f, "Name", self.name.as_deref().unwrap_or("(none)"))?;

        let p = &self.position;
        if p.position > 0 {
            row(f, "Position", &p.position.to_string())?;
        }
        if p.channel > 0 || p.slice > 0 || p.frame > 0 {
            row(
                f,
                "C / Z / T",
                &format!("{} / {} / {}", p.channel, p.slice, p.frame),
            )?;
        }
        section_bottom(f)
    }

    fn fmt_geometry(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.geometry;
        section_top(f, "Geometry")?;

        if let Some(bbox) = g.bbox {
            row(
                f,
                "Box (t, l, b, r)",
                &format!("{}, {}, {}, {}", bbox.top, bbox.left, bbox.bottom, bbox.right),
            )?;
        }
        if let Some(points) = g.points {
            row(f, "Points", &points.to_string())?;
        }
        row(f, "Width", &fmt_optional(g.width))?;
        row(f, "Height", &fmt_optional(g.height))?;

        let area = match g.area {
            Some(area) => format!("{:.2}", area),
            None => "n/a".to_string(),
        };
        row(f, "Area", &area)?;
        section_bottom(f)
    }

    fn fmt_layout(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = &self.layout;
        section_top(f, "Layout")?;
        if let Some(version) = l.version {
            row(f, "Version", &version.to_string())?;
        }
        row(f, "Header2 offset", &l.header2_offset.to_string())?;
        row(f, "Name offset", &l.name_offset.to_string())?;
        row(f, "Header fields", &l.header_fields.to_string())?;
        section_bottom(f)
    }
}

fn section_top(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let fill = PANEL_WIDTH.saturating_sub(title.chars().count() + 3);
    writeln!(f, "┌─ {} {}┐", title, "─".repeat(fill))?;
    writeln!(f, "│{}│", " ".repeat(PANEL_WIDTH))
}

fn section_bottom(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "│{}│", " ".repeat(PANEL_WIDTH))?;
    writeln!(f, "└{}┘", "─".repeat(PANEL_WIDTH))
}

/// A `label: value` line padded to the panel width.
fn row(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    let text = format!("   {:<18} {}", format!("{}:", label), value);
    let pad = PANEL_WIDTH.saturating_sub(text.chars().count());
    writeln!(f, "│{}{}│", text, " ".repeat(pad))
}

fn fmt_optional(value: Option<i32>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "n/a".to_string(),
    }
}
