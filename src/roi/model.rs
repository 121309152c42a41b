//! Shape variants and the ROI record that carries them.
//!
//! A [`RoiRecord`] is what the decoder produces and the encoder consumes:
//! the typed [`Shape`], an optional display name, and the raw [`HeaderMap`]
//! for fields the codec passes through without interpreting.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::bbox::RoiBox;
use super::coords::Coordinates;
use super::header::{float_repr, HeaderMap, HeaderValue};
use super::kind::RoiKind;
use super::schema;
use crate::error::ShapeError;

/// Geometry of an ROI, one variant per type discriminant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Polygon {
        bbox: RoiBox,
        coords: Coordinates,
    },
    Rect {
        bbox: RoiBox,
        /// Corner arc size for rounded rectangles; 0 for square corners.
        #[serde(default)]
        arc: i16,
    },
    Oval {
        bbox: RoiBox,
    },
    Line {
        #[serde(with = "float_repr")]
        x1: f32,
        #[serde(with = "float_repr")]
        y1: f32,
        #[serde(with = "float_repr")]
        x2: f32,
        #[serde(with = "float_repr")]
        y2: f32,
    },
    #[serde(rename = "freeline")]
    FreeLine {
        bbox: RoiBox,
        coords: Coordinates,
    },
    Polyline {
        bbox: RoiBox,
        coords: Coordinates,
    },
    NoRoi,
    Freehand {
        bbox: RoiBox,
        coords: Coordinates,
    },
    Traced {
        bbox: RoiBox,
        coords: Coordinates,
    },
    Angle,
    Point,
}

impl Shape {
    /// A square-cornered rectangle.
    pub fn rect(bbox: RoiBox) -> Self {
        Shape::Rect { bbox, arc: 0 }
    }

    pub fn rounded_rect(bbox: RoiBox, arc: i16) -> Self {
        Shape::Rect { bbox, arc }
    }

    pub fn oval(bbox: RoiBox) -> Self {
        Shape::Oval { bbox }
    }

    pub fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Shape::Line { x1, y1, x2, y2 }
    }

    pub fn polygon(
        bbox: RoiBox,
        x: impl Into<Vec<i32>>,
        y: impl Into<Vec<i32>>,
    ) -> Result<Self, ShapeError> {
        let coords = Coordinates::new(x, y)?;
        Ok(Shape::Polygon { bbox, coords })
    }

    pub fn free_line(
        bbox: RoiBox,
        x: impl Into<Vec<i32>>,
        y: impl Into<Vec<i32>>,
    ) -> Result<Self, ShapeError> {
        let coords = Coordinates::new(x, y)?;
        Ok(Shape::FreeLine { bbox, coords })
    }

    pub fn polyline(
        bbox: RoiBox,
        x: impl Into<Vec<i32>>,
        y: impl Into<Vec<i32>>,
    ) -> Result<Self, ShapeError> {
        let coords = Coordinates::new(x, y)?;
        Ok(Shape::Polyline { bbox, coords })
    }

    pub fn freehand(
        bbox: RoiBox,
        x: impl Into<Vec<i32>>,
        y: impl Into<Vec<i32>>,
    ) -> Result<Self, ShapeError> {
        let coords = Coordinates::new(x, y)?;
        Ok(Shape::Freehand { bbox, coords })
    }

    pub fn traced(
        bbox: RoiBox,
        x: impl Into<Vec<i32>>,
        y: impl Into<Vec<i32>>,
    ) -> Result<Self, ShapeError> {
        let coords = Coordinates::new(x, y)?;
        Ok(Shape::Traced { bbox, coords })
    }

    /// Returns the type discriminant of this shape.
    pub fn kind(&self) -> RoiKind {
        match self {
            Shape::Polygon { .. } => RoiKind::Polygon,
            Shape::Rect { .. } => RoiKind::Rect,
            Shape::Oval { .. } => RoiKind::Oval,
            Shape::Line { .. } => RoiKind::Line,
            Shape::FreeLine { .. } => RoiKind::FreeLine,
            Shape::Polyline { .. } => RoiKind::Polyline,
            Shape::NoRoi => RoiKind::NoRoi,
            Shape::Freehand { .. } => RoiKind::Freehand,
            Shape::Traced { .. } => RoiKind::Traced,
            Shape::Angle => RoiKind::Angle,
            Shape::Point => RoiKind::Point,
        }
    }

    /// The bounding box, for every shape that stores one.
    pub fn bbox(&self) -> Option<&RoiBox> {
        match self {
            Shape::Polygon { bbox, .. }
            | Shape::Rect { bbox, .. }
            | Shape::Oval { bbox }
            | Shape::FreeLine { bbox, .. }
            | Shape::Polyline { bbox, .. }
            | Shape::Freehand { bbox, .. }
            | Shape::Traced { bbox, .. } => Some(bbox),
            Shape::Line { .. } | Shape::NoRoi | Shape::Angle | Shape::Point => None,
        }
    }

    /// The coordinate sequences of multi-point shapes.
    pub fn coords(&self) -> Option<&Coordinates> {
        match self {
            Shape::Polygon { coords, .. }
            | Shape::FreeLine { coords, .. }
            | Shape::Polyline { coords, .. }
            | Shape::Freehand { coords, .. }
            | Shape::Traced { coords, .. } => Some(coords),
            _ => None,
        }
    }

    /// Width of the shape: box width for rectangles and ovals, coordinate
    /// extent for multi-point shapes.
    pub fn width(&self) -> Option<i32> {
        match self {
            Shape::Rect { bbox, .. } | Shape::Oval { bbox } => Some(bbox.width()),
            _ => self.coords().and_then(Coordinates::width),
        }
    }

    /// Height of the shape, measured like [`Shape::width`].
    pub fn height(&self) -> Option<i32> {
        match self {
            Shape::Rect { bbox, .. } | Shape::Oval { bbox } => Some(bbox.height()),
            _ => self.coords().and_then(Coordinates::height),
        }
    }

    /// Area in square pixels, or `None` where no formula is implemented
    /// (the multi-point shapes).
    pub fn area(&self) -> Option<f64> {
        match self {
            Shape::Rect { bbox, arc } => {
                let full = bbox.width() as f64 * bbox.height() as f64;
                if *arc == 0 {
                    Some(full)
                } else {
                    let half_arc = *arc as f64 / 2.0;
                    Some(full - (4.0 - PI) * half_arc * half_arc)
                }
            }
            Shape::Oval { bbox } => Some(PI * bbox.width() as f64 * bbox.height() as f64 / 4.0),
            Shape::Line { .. } | Shape::NoRoi | Shape::Angle | Shape::Point => Some(0.0),
            Shape::Polygon { .. }
            | Shape::FreeLine { .. }
            | Shape::Polyline { .. }
            | Shape::Freehand { .. }
            | Shape::Traced { .. } => None,
        }
    }
}

/// A single ROI: shape, name and pass-through header fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoiRecord {
    #[serde(flatten)]
    pub shape: Shape,

    /// Display name. When encoding without one, the destination's default
    /// name is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Header fields by name. The decoder fills every known field; before
    /// encoding, callers set only the fields they want carried over.
    #[serde(default, skip_serializing_if = "HeaderMap::is_empty")]
    pub header: HeaderMap,
}

impl RoiRecord {
    /// Creates an unnamed record with an empty header.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            name: None,
            header: HeaderMap::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a header field to carry through encoding.
    pub fn with_header_value(
        mut self,
        name: impl Into<String>,
        value: impl Into<HeaderValue>,
    ) -> Self {
        self.header.insert(name, value);
        self
    }

    #[inline]
    pub fn kind(&self) -> RoiKind {
        self.shape.kind()
    }

    #[inline]
    pub fn area(&self) -> Option<f64> {
        self.shape.area()
    }

    /// Where Header2 starts for this record.
    pub fn header2_offset(&self) -> u64 {
        schema::header2_offset(self.shape.coords().map(Coordinates::len))
    }

    /// Where the name starts for this record.
    pub fn name_offset(&self) -> u64 {
        schema::name_offset(self.header2_offset())
    }
}

impl From<Shape> for RoiRecord {
    fn from(shape: Shape) -> Self {
        RoiRecord::new(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> RoiBox {
        RoiBox::new(20, 30, 40, 50)
    }

    #[test]
    fn test_rect_area() {
        assert_eq!(Shape::rect(bbox()).area(), Some(400.0));
    }

    #[test]
    fn test_rounded_rect_area() {
        let area = Shape::rounded_rect(bbox(), 10).area().unwrap();
        let expected = 400.0 - (4.0 - PI) * 25.0;
        assert!((area - expected).abs() < 1e-9);
    }

    #[test]
    fn test_oval_area() {
        let oval = Shape::oval(RoiBox::new(100, 25, 150, 50));
        let expected = PI * 25.0 * 50.0 / 4.0;
        assert!((oval.area().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_line_area_is_zero() {
        assert_eq!(Shape::line(1.0, 2.0, 30.0, 40.0).area(), Some(0.0));
        assert!(Shape::line(0.0, 0.0, 1.0, 1.0).bbox().is_none());
    }

    #[test]
    fn test_multi_point_area_unimplemented() {
        let shape = Shape::freehand(bbox(), vec![0, 1, 2], vec![0, 1, 0]).unwrap();
        assert_eq!(shape.area(), None);
        assert_eq!(shape.width(), Some(3));
        assert_eq!(shape.height(), Some(2));
    }

    #[test]
    fn test_constructors_reject_length_mismatch() {
        assert!(Shape::freehand(bbox(), vec![0, 1], vec![0]).is_err());
        assert!(Shape::polyline(bbox(), vec![0], vec![]).is_err());
        assert!(Shape::free_line(bbox(), vec![], vec![1]).is_err());
        assert!(Shape::polygon(bbox(), vec![0, 1, 2], vec![0, 1]).is_err());
    }

    #[test]
    fn test_record_offsets() {
        let polygon = Shape::polygon(bbox(), vec![0, 13, 25, 60, 5], vec![45, 30, 0, 12, 20])
            .unwrap();
        let record = RoiRecord::new(polygon);
        assert_eq!(record.header2_offset(), 84);
        assert_eq!(record.name_offset(), 148);

        let rect = RoiRecord::new(Shape::rect(bbox()));
        assert_eq!(rect.header2_offset(), 64);
        assert_eq!(rect.name_offset(), 128);
    }

    #[test]
    fn test_line_non_finite_endpoints_survive_json() {
        let record = RoiRecord::new(Shape::line(f32::NAN, 2.0, f32::INFINITY, 4.0));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""x1":"NaN""#));
        assert!(json.contains(r#""x2":"inf""#));

        let restored: RoiRecord = serde_json::from_str(&json).unwrap();
        match restored.shape {
            Shape::Line { x1, y1, x2, y2 } => {
                assert!(x1.is_nan());
                assert_eq!((y1, x2, y2), (2.0, f32::INFINITY, 4.0));
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Shape::NoRoi.kind(), RoiKind::NoRoi);
        assert_eq!(Shape::oval(bbox()).kind(), RoiKind::Oval);
        assert_eq!(
            Shape::traced(bbox(), vec![1], vec![1]).unwrap().kind(),
            RoiKind::Traced
        );
    }
}
