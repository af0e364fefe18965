//! Field sources: everything a particle can be advected through.
//!
//! A [`FieldSource`] maps a simulation-space position (and time) to a
//! velocity. A [`ScalarSource`] maps it to a scalar, which
//! [`finite_difference_curl`] turns into an approximately divergence-free
//! velocity. [`FieldKind`] is the tagged union the simulation owns; each
//! variant holds only the parameters it needs to evaluate itself.
//!
//! All implementations are deterministic: same inputs, same output. Noise
//! generators are seeded once at construction.

mod charge;
mod curl_noise;
mod easing;
mod equation;
mod image;
mod potential;

pub use charge::{ChargeField, ChargeSource, CHARGE_DISPLAY_SCALE, DEFAULT_MIN_CHARGE_DISTANCE};
pub use curl_noise::{CurlNoiseField, NoiseBackend};
pub use easing::CubicBezier;
pub use equation::{Equation, EquationField};
pub use image::{ImageMode, ImageScalarField};
pub use potential::{PotentialField, PotentialSource, OUTSIDE_PUSH};

use crate::vector::{Vector2, VectorExt};
use serde::{Deserialize, Serialize};

/// A source of 2D velocity values.
pub trait FieldSource: Send + Sync {
    /// Velocity at `position` at the given `time`.
    fn evaluate(&self, position: Vector2, time: f64) -> Vector2;
}

/// A source of scalar values, the input to a curl transform.
pub trait ScalarSource: Send + Sync {
    fn evaluate_scalar(&self, position: Vector2, time: f64) -> f64;
}

/// Centered finite-difference curl of a scalar function:
///
/// `vx = s(x, y+ε) − s(x, y−ε)`, `vy = −(s(x+ε, y) − s(x−ε, y))`, times `gain`.
///
/// Callers normally pass `gain = strength / ε`. A small ε resolves the
/// gradient more accurately but loses digits to cancellation; it must stay
/// strictly positive.
pub fn finite_difference_curl(
    scalar: impl Fn(Vector2) -> f64,
    position: Vector2,
    epsilon: f64,
    gain: f64,
) -> Vector2 {
    let ex = Vector2::new(epsilon, 0.0);
    let ey = Vector2::new(0.0, epsilon);
    let dx = scalar(position + ex) - scalar(position - ex);
    let dy = scalar(position + ey) - scalar(position - ey);
    Vector2::new(dy, -dx) * gain
}

/// Curl settings shared by charge and potential fields, which feed their
/// field magnitude through [`finite_difference_curl`] when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurlParams {
    pub epsilon: f64,
    pub strength: f64,
}

impl CurlParams {
    /// Curl of the magnitude of `raw` at `position`.
    pub(crate) fn curl_of_magnitude(
        &self,
        raw: impl Fn(Vector2) -> Vector2,
        position: Vector2,
    ) -> Vector2 {
        finite_difference_curl(
            |p| raw(p).magnitude(),
            position,
            self.epsilon,
            self.strength / self.epsilon,
        )
    }
}

/// The active field of a simulation.
pub enum FieldKind {
    Equation(EquationField),
    CurlNoise(CurlNoiseField),
    Charge(ChargeField),
    Potential(PotentialField),
    Image(ImageScalarField),
}

impl FieldKind {
    /// Short name of the variant, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Equation(_) => "equation",
            FieldKind::CurlNoise(_) => "curl-noise",
            FieldKind::Charge(_) => "charge",
            FieldKind::Potential(_) => "potential",
            FieldKind::Image(_) => "image",
        }
    }
}

impl FieldSource for FieldKind {
    fn evaluate(&self, position: Vector2, time: f64) -> Vector2 {
        match self {
            FieldKind::Equation(f) => f.evaluate(position, time),
            FieldKind::CurlNoise(f) => f.evaluate(position, time),
            FieldKind::Charge(f) => f.evaluate(position, time),
            FieldKind::Potential(f) => f.evaluate(position, time),
            FieldKind::Image(f) => f.evaluate(position, time),
        }
    }
}
