//! Superposed inverse-square point charges.

use super::{CurlParams, FieldSource, ScalarSource};
use crate::error::FlowError;
use crate::vector::{Vector2, VectorExt};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Multiplier that brings Coulomb-scale magnitudes up to display speed.
pub const CHARGE_DISPLAY_SCALE: f64 = 1.0e6;

/// Distance floor (display units) applied before the inverse-square term.
pub const DEFAULT_MIN_CHARGE_DISTANCE: f64 = 1.0;

/// A point charge. Positive strength pushes particles away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeSource {
    pub position: Vector2,
    pub strength: f64,
}

impl ChargeSource {
    pub fn new(position: Vector2, strength: f64) -> Self {
        Self { position, strength }
    }
}

/// Field of one or more [`ChargeSource`]s, optionally curled.
///
/// Raw velocity at `p` is
/// `Σ normalize(p − q) · strength / (4π · max(|p − q|, min_distance)²)`,
/// times [`CHARGE_DISPLAY_SCALE`]. A sample that lands exactly on a charge
/// gets no contribution from that charge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeField {
    charges: Vec<ChargeSource>,
    curl: Option<CurlParams>,
    min_distance: f64,
}

impl ChargeField {
    pub fn new(charges: Vec<ChargeSource>, min_distance: f64) -> Result<Self, FlowError> {
        if charges.is_empty() {
            return Err(FlowError::EmptySources { field: "charge" });
        }
        if charges
            .iter()
            .any(|c| !c.position.is_finite() || !c.strength.is_finite())
        {
            return Err(FlowError::NonFinite("charge"));
        }
        if !(min_distance.is_finite() && min_distance > 0.0) {
            return Err(FlowError::NonFinite("min_distance"));
        }
        Ok(Self {
            charges,
            curl: None,
            min_distance,
        })
    }

    /// Feeds the field magnitude through the finite-difference curl.
    pub fn with_curl(mut self, curl: Option<CurlParams>) -> Result<Self, FlowError> {
        if let Some(params) = curl {
            if !(params.epsilon.is_finite() && params.epsilon > 0.0) {
                return Err(FlowError::InvalidEpsilon(params.epsilon));
            }
        }
        self.curl = curl;
        Ok(self)
    }

    pub fn charges(&self) -> &[ChargeSource] {
        &self.charges
    }

    pub fn curl(&self) -> Option<CurlParams> {
        self.curl
    }

    /// Uncurled superposition at `position`.
    pub fn raw(&self, position: Vector2) -> Vector2 {
        let mut total = Vector2::ZERO;
        for charge in &self.charges {
            let offset = position - charge.position;
            let dist = offset.magnitude();
            if dist < f64::EPSILON {
                continue;
            }
            let dist = dist.max(self.min_distance);
            total += offset / offset.magnitude() * (charge.strength / (4.0 * PI * dist * dist));
        }
        total * CHARGE_DISPLAY_SCALE
    }
}

impl ScalarSource for ChargeField {
    fn evaluate_scalar(&self, position: Vector2, _time: f64) -> f64 {
        self.raw(position).magnitude()
    }
}

impl FieldSource for ChargeField {
    fn evaluate(&self, position: Vector2, _time: f64) -> Vector2 {
        match self.curl {
            Some(curl) => curl.curl_of_magnitude(|p| self.raw(p), position),
            None => self.raw(position),
        }
    }
}
