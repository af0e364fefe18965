//! Two-dimensional vector value type.
//!
//! [`Vector2`] is `glam::DVec2`: a `Copy` value with `+`, `-` and scalar `*`
//! already defined, so particles never alias each other's positions.
//! [`VectorExt`] adds the polar helpers the field code needs.

pub use glam::DVec2 as Vector2;

/// Polar and magnitude helpers on [`Vector2`].
pub trait VectorExt: Sized {
    /// Euclidean length. Zero for the zero vector.
    fn magnitude(self) -> f64;

    /// Angle in radians measured from +x, in (-π, π].
    ///
    /// The zero vector yields `0.0` (the `atan2(0, 0)` convention).
    fn heading(self) -> f64;

    /// Vector of the given `length` pointing along `angle` radians.
    fn from_polar(angle: f64, length: f64) -> Self;

    /// Unit vector in the same direction, or zero for a (near-)zero vector.
    fn normalized_or_zero(self) -> Self;
}

impl VectorExt for Vector2 {
    fn magnitude(self) -> f64 {
        self.length()
    }

    fn heading(self) -> f64 {
        self.y.atan2(self.x)
    }

    fn from_polar(angle: f64, length: f64) -> Self {
        Vector2::new(angle.cos() * length, angle.sin() * length)
    }

    fn normalized_or_zero(self) -> Self {
        self.normalize_or_zero()
    }
}
