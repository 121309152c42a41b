//! The ROI type discriminant stored at Header1 offset 6.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FormatError;

/// The eleven ROI kinds the format defines, with their on-disk codes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiKind {
    Polygon,
    Rect,
    Oval,
    Line,
    #[serde(rename = "freeline")]
    FreeLine,
    Polyline,
    NoRoi,
    Freehand,
    Traced,
    Angle,
    Point,
}

impl RoiKind {
    /// Every kind, ordered by discriminant.
    pub const ALL: [RoiKind; 11] = [
        RoiKind::Polygon,
        RoiKind::Rect,
        RoiKind::Oval,
        RoiKind::Line,
        RoiKind::FreeLine,
        RoiKind::Polyline,
        RoiKind::NoRoi,
        RoiKind::Freehand,
        RoiKind::Traced,
        RoiKind::Angle,
        RoiKind::Point,
    ];

    /// Returns the discriminant written to the `TYPE` field.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            RoiKind::Polygon => 0,
            RoiKind::Rect => 1,
            RoiKind::Oval => 2,
            RoiKind::Line => 3,
            RoiKind::FreeLine => 4,
            RoiKind::Polyline => 5,
            RoiKind::NoRoi => 6,
            RoiKind::Freehand => 7,
            RoiKind::Traced => 8,
            RoiKind::Angle => 9,
            RoiKind::Point => 10,
        }
    }

    /// Maps a `TYPE` value back to its kind.
    pub fn from_code(code: u8) -> Result<Self, FormatError> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(FormatError::UnsupportedType(i16::from(code)))
    }

    /// Short lowercase name, as used in the JSON form.
    pub fn name(self) -> &'static str {
        match self {
            RoiKind::Polygon => "polygon",
            RoiKind::Rect => "rect",
            RoiKind::Oval => "oval",
            RoiKind::Line => "line",
            RoiKind::FreeLine => "freeline",
            RoiKind::Polyline => "polyline",
            RoiKind::NoRoi => "no_roi",
            RoiKind::Freehand => "freehand",
            RoiKind::Traced => "traced",
            RoiKind::Angle => "angle",
            RoiKind::Point => "point",
        }
    }

    /// True for the kinds that store an x/y coordinate array after Header1.
    #[inline]
    pub fn has_coordinates(self) -> bool {
        matches!(
            self,
            RoiKind::Polygon
                | RoiKind::FreeLine
                | RoiKind::Polyline
                | RoiKind::Freehand
                | RoiKind::Traced
        )
    }
}

impl TryFrom<u8> for RoiKind {
    type Error = FormatError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl fmt::Debug for RoiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoiKind({}={})", self.name(), self.code())
    }
}

impl fmt::Display for RoiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
