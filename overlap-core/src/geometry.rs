/// Radius of the reference (left) circle, in canvas pixels.
pub const BASE_RADIUS: f64 = 50.0;

/// Size value at which both circles have the same area.
pub const EQUAL_SIZE: f64 = 100.0;

/// Radius of a circle whose area is `size_percent`% of the reference circle.
pub fn radius(size_percent: f64) -> f64 {
    scaled_radius(BASE_RADIUS, size_percent)
}

/// Same area law as [`radius`] for an arbitrary reference radius.
pub fn scaled_radius(base: f64, size_percent: f64) -> f64 {
    base * (size_percent / EQUAL_SIZE).sqrt()
}

/// Horizontal centre distance that produces `overlap_percent` overlap.
///
/// At 0% the circles touch. Full overlap is capped at the diameter of the
/// smaller circle, i.e. the smaller circle sitting inside the larger one.
/// Callers keep `overlap_percent` within [0, 100].
pub fn separation(overlap_percent: f64, r1: f64, r2: f64) -> f64 {
    if overlap_percent == 0.0 {
        return r1 + r2;
    }
    let max_overlap = 2.0 * r1.min(r2);
    let actual_overlap = (overlap_percent / 100.0) * max_overlap;
    r1 + r2 - actual_overlap
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// The reference circle and the adjustable circle to its right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePair {
    pub left: Circle,
    pub right: Circle,
}

impl CirclePair {
    pub fn layout(
        anchor: (f64, f64),
        base_radius: f64,
        size_percent: f64,
        overlap_percent: f64,
    ) -> Self {
        let (x, y) = anchor;
        let right_radius = scaled_radius(base_radius, size_percent);
        let distance = separation(overlap_percent, base_radius, right_radius);
        Self {
            left: Circle {
                x,
                y,
                radius: base_radius,
            },
            right: Circle {
                x: x + distance,
                y,
                radius: right_radius,
            },
        }
    }

    pub fn separation(&self) -> f64 {
        self.right.x - self.left.x
    }
}
