//! Integer bounding boxes as stored in Header1.

use serde::{Deserialize, Serialize};

/// The `TOP`, `LEFT`, `BOTTOM`, `RIGHT` fields of an ROI, in image pixels.
///
/// Note: This type does NOT enforce `left <= right` or `top <= bottom`.
/// The codec only guarantees byte-level correctness; a malformed box is
/// written and read back unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoiBox {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

impl RoiBox {
    /// Creates a box from its four edges, in on-disk field order.
    #[inline]
    pub fn new(top: i16, left: i16, bottom: i16, right: i16) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Returns `right - left`.
    ///
    /// May be negative if the box is malformed.
    #[inline]
    pub fn width(&self) -> i32 {
        self.right as i32 - self.left as i32
    }

    /// Returns `bottom - top`.
    ///
    /// May be negative if the box is malformed.
    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom as i32 - self.top as i32
    }

    /// Returns true if the box is properly ordered on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.left <= self.right && self.top <= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_dimensions() {
        let bbox = RoiBox::new(20, 30, 40, 50);
        assert_eq!(bbox.width(), 20);
        assert_eq!(bbox.height(), 20);
        assert!(bbox.is_ordered());
    }

    #[test]
    fn test_box_does_not_overflow() {
        let bbox = RoiBox::new(i16::MIN, i16::MIN, i16::MAX, i16::MAX);
        assert_eq!(bbox.width(), 65535);
        assert_eq!(bbox.height(), 65535);
    }

    #[test]
    fn test_unordered_box_is_representable() {
        let bbox = RoiBox::new(40, 50, 20, 30);
        assert!(!bbox.is_ordered());
        assert_eq!(bbox.width(), -20);
    }
}
