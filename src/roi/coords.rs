//! Parallel x/y coordinate sequences for multi-point ROIs.

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// Ordered x and y sequences of equal length.
///
/// Values are kept as `i32` in memory; the encoder narrows them to the
/// format's signed 16-bit range. Out-of-range values are a caller error and
/// wrap on write.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CoordinatesData")]
pub struct Coordinates {
    x: Vec<i32>,
    y: Vec<i32>,
}

#[derive(Deserialize)]
struct CoordinatesData {
    x: Vec<i32>,
    y: Vec<i32>,
}

impl TryFrom<CoordinatesData> for Coordinates {
    type Error = ShapeError;

    fn try_from(data: CoordinatesData) -> Result<Self, Self::Error> {
        Coordinates::new(data.x, data.y)
    }
}

impl Coordinates {
    /// Pairs up `x` and `y`, rejecting sequences of different length.
    pub fn new(x: impl Into<Vec<i32>>, y: impl Into<Vec<i32>>) -> Result<Self, ShapeError> {
        let x = x.into();
        let y = y.into();
        if x.len() != y.len() {
            return Err(ShapeError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    /// Builds coordinates from `(x, y)` points.
    pub fn from_points(points: impl IntoIterator<Item = (i32, i32)>) -> Self {
        let (x, y) = points.into_iter().unzip();
        Self { x, y }
    }

    #[inline]
    pub fn x(&self) -> &[i32] {
        &self.x
    }

    #[inline]
    pub fn y(&self) -> &[i32] {
        &self.y
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterates `(x, y)` points in stored order.
    pub fn points(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// `max(x) - min(x) + 1`, or `None` when there are no points.
    pub fn width(&self) -> Option<i32> {
        extent(&self.x)
    }

    /// `max(y) - min(y) + 1`, or `None` when there are no points.
    pub fn height(&self) -> Option<i32> {
        extent(&self.y)
    }

    /// Consumes the coordinates, returning the x and y sequences.
    pub fn into_parts(self) -> (Vec<i32>, Vec<i32>) {
        (self.x, self.y)
    }
}

/// Saturates at `i32::MAX` for spans wider than `i32` can hold.
fn extent(values: &[i32]) -> Option<i32> {
    let min = *values.iter().min()? as i64;
    let max = *values.iter().max()? as i64;
    Some(i32::try_from(max - min + 1).unwrap_or(i32::MAX))
}
