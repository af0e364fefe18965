//! Cubic Bézier easing curve through (0,0) and (1,1), CSS-style.

use serde::{Deserialize, Serialize};

const NEWTON_ITERATIONS: usize = 8;
const NEWTON_MIN_SLOPE: f64 = 1e-3;
const SUBDIVISION_PRECISION: f64 = 1e-7;
const SUBDIVISION_MAX_ITERATIONS: usize = 40;

/// Easing curve with control points `(x1, y1)` and `(x2, y2)`.
///
/// `x1` and `x2` must lie in [0, 1] so that x(t) is monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    /// Curve used by potential fields: slow start, steep middle.
    pub const POTENTIAL: CubicBezier = CubicBezier {
        x1: 0.72,
        y1: 0.01,
        x2: 0.87,
        y2: 0.62,
    };

    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// Eased value for progress `x`, clamped to [0, 1].
    pub fn ease(&self, x: f64) -> f64 {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        if x == 0.0 || x == 1.0 {
            return x;
        }
        bezier(self.t_for_x(x), self.y1, self.y2)
    }

    fn t_for_x(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let slope = bezier_slope(t, self.x1, self.x2);
            if slope < NEWTON_MIN_SLOPE {
                return self.subdivide(x);
            }
            let err = bezier(t, self.x1, self.x2) - x;
            if err.abs() < SUBDIVISION_PRECISION {
                return t;
            }
            t -= err / slope;
        }
        if (0.0..=1.0).contains(&t) && (bezier(t, self.x1, self.x2) - x).abs() < SUBDIVISION_PRECISION
        {
            t
        } else {
            self.subdivide(x)
        }
    }

    fn subdivide(&self, x: f64) -> f64 {
        let (mut lo, mut hi) = (0.0, 1.0);
        let mut t = x;
        for _ in 0..SUBDIVISION_MAX_ITERATIONS {
            t = 0.5 * (lo + hi);
            let err = bezier(t, self.x1, self.x2) - x;
            if err.abs() < SUBDIVISION_PRECISION {
                break;
            }
            if err > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
        }
        t
    }
}

/// One coordinate of the curve at parameter `t` (endpoints 0 and 1).
fn bezier(t: f64, a1: f64, a2: f64) -> f64 {
    let a = 1.0 - 3.0 * a2 + 3.0 * a1;
    let b = 3.0 * a2 - 6.0 * a1;
    let c = 3.0 * a1;
    ((a * t + b) * t + c) * t
}

fn bezier_slope(t: f64, a1: f64, a2: f64) -> f64 {
    let a = 1.0 - 3.0 * a2 + 3.0 * a1;
    let b = 3.0 * a2 - 6.0 * a1;
    let c = 3.0 * a1;
    3.0 * a * t * t + 2.0 * b * t + c
}
