use serde::{Deserialize, Serialize};

/// Axis-aligned box in frame pixel coordinates: `[x1, y1, x2, y2]`.
///
/// The detector is trusted to deliver `x1 < x2` and `y1 < y2`; degenerate
/// boxes are not rejected, their points just follow the arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box center, floored to whole pixels.
    pub fn center(&self) -> (i32, i32) {
        (midpoint(self.x1, self.x2), midpoint(self.y1, self.y2))
    }

    /// Approximate head position of a person box: horizontal center,
    /// a quarter of the box height below the top edge.
    pub fn head_point(&self) -> (i32, i32) {
        let height = i64::from(self.y2) - i64::from(self.y1);
        let y = i64::from(self.y1) + height.div_euclid(4);
        // Lies between y1 and y2, so it fits back into i32.
        (midpoint(self.x1, self.x2), y as i32)
    }

    /// Returns the box clamped to `[0, width) x [0, height)`, or `None` when
    /// nothing of it lies inside the frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        let max_x = i32::try_from(width).unwrap_or(i32::MAX) - 1;
        let max_y = i32::try_from(height).unwrap_or(i32::MAX) - 1;
        if max_x < 0 || max_y < 0 {
            return None;
        }
        let clamped = BoundingBox {
            x1: self.x1.clamp(0, max_x),
            y1: self.y1.clamp(0, max_y),
            x2: self.x2.clamp(0, max_x),
            y2: self.y2.clamp(0, max_y),
        };
        if self.x2 < 0 || self.y2 < 0 || self.x1 > max_x || self.y1 > max_y {
            return None;
        }
        Some(clamped)
    }
}

/// Floored midpoint, computed wide so coordinates near the i32 limits do
/// not overflow.
fn midpoint(a: i32, b: i32) -> i32 {
    ((i64::from(a) + i64::from(b)).div_euclid(2)) as i32
}

impl From<[i32; 4]> for BoundingBox {
    fn from(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}
