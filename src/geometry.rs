/// Axis-aligned rectangle in screen pixels, always normalized so that
/// `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PixelRect {
    /// Build a rectangle from two opposite corners given in any order
    #[must_use]
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[must_use]
    pub fn contains(&self, point: (f64, f64)) -> bool {
        (self.x0..=self.x1).contains(&point.0) && (self.y0..=self.y1).contains(&point.1)
    }

    /// Checks whether a segment may cross the rectangle.
    ///
    /// Compares bounding boxes only, so it can report false positives for
    /// diagonal segments passing near a corner. Good enough for culling.
    #[must_use]
    pub fn may_intersect_segment(&self, a: (f64, f64), b: (f64, f64)) -> bool {
        a.0.max(b.0) >= self.x0 && a.0.min(b.0) <= self.x1 && a.1.max(b.1) >= self.y0 && a.1.min(b.1) <= self.y1
    }
}

/// Calculates the minimum distance from a point to a line segment.
///
/// # Arguments
/// * `point` - The point to measure from
/// * `seg_start` - Starting point of the line segment
/// * `seg_end` - Ending point of the line segment
#[must_use]
pub fn point_to_line_segment_distance(point: (f64, f64), seg_start: (f64, f64), seg_end: (f64, f64)) -> f64 {
    let dx = seg_end.0 - seg_start.0;
    let dy = seg_end.1 - seg_start.1;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return (point.0 - seg_start.0).hypot(point.1 - seg_start.1);
    }

    let t = (((point.0 - seg_start.0) * dx + (point.1 - seg_start.1) * dy) / len_sq).clamp(0.0, 1.0);

    let closest_x = seg_start.0 + t * dx;
    let closest_y = seg_start.1 + t * dy;

    (point.0 - closest_x).hypot(point.1 - closest_y)
}

/// Minimum distance from a point to a polyline.
///
/// A single-vertex polyline behaves as a point. Returns `None` when the
/// polyline is empty.
#[must_use]
pub fn point_to_polyline_distance(point: (f64, f64), polyline: &[(f64, f64)]) -> Option<f64> {
    match polyline {
        [] => None,
        [single] => Some((point.0 - single.0).hypot(point.1 - single.1)),
        _ => polyline
            .windows(2)
            .map(|w| point_to_line_segment_distance(point, w[0], w[1]))
            .reduce(f64::min),
    }
}
