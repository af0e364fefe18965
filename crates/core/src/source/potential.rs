//! Bounded radial potentials blended through an easing curve.

use super::{CubicBezier, CurlParams, FieldSource, ScalarSource};
use crate::error::FlowError;
use crate::vector::{Vector2, VectorExt};
use serde::{Deserialize, Serialize};

/// Speed of the outward drift a source applies beyond its radius.
pub const OUTSIDE_PUSH: f64 = 0.02;

/// A circular region of influence.
///
/// Positive polarity pulls hardest near the rim and fades toward the
/// centre; non-positive polarity inverts the eased profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotentialSource {
    pub position: Vector2,
    pub radius: f64,
    pub polarity: f64,
}

impl PotentialSource {
    pub fn new(position: Vector2, radius: f64, polarity: f64) -> Self {
        Self {
            position,
            radius,
            polarity,
        }
    }

    fn contribution(&self, at: Vector2, easing: &CubicBezier) -> Vector2 {
        let offset = self.position - at;
        let dist = offset.magnitude();
        let toward = offset.normalized_or_zero();
        if dist < self.radius {
            let eased = easing.ease((self.radius - dist) / self.radius);
            let weight = if self.polarity > 0.0 { eased } else { 1.0 - eased };
            toward * weight
        } else {
            -toward * OUTSIDE_PUSH
        }
    }
}

/// Unnormalised sum of [`PotentialSource`] contributions.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialField {
    sources: Vec<PotentialSource>,
    easing: CubicBezier,
    curl: Option<CurlParams>,
}

impl PotentialField {
    pub fn new(sources: Vec<PotentialSource>) -> Result<Self, FlowError> {
        if sources.is_empty() {
            return Err(FlowError::EmptySources { field: "potential" });
        }
        for s in &sources {
            if !s.position.is_finite() || !s.polarity.is_finite() {
                return Err(FlowError::NonFinite("potential"));
            }
            if !(s.radius.is_finite() && s.radius > 0.0) {
                return Err(FlowError::NonFinite("radius"));
            }
        }
        Ok(Self {
            sources,
            easing: CubicBezier::POTENTIAL,
            curl: None,
        })
    }

    pub fn with_easing(mut self, easing: CubicBezier) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_curl(mut self, curl: Option<CurlParams>) -> Result<Self, FlowError> {
        if let Some(params) = curl {
            if !(params.epsilon.is_finite() && params.epsilon > 0.0) {
                return Err(FlowError::InvalidEpsilon(params.epsilon));
            }
        }
        self.curl = curl;
        Ok(self)
    }

    pub fn sources(&self) -> &[PotentialSource] {
        &self.sources
    }

    pub fn raw(&self, position: Vector2) -> Vector2 {
        self.sources
            .iter()
            .map(|s| s.contribution(position, &self.easing))
            .fold(Vector2::ZERO, |acc, v| acc + v)
    }
}

impl ScalarSource for PotentialField {
    fn evaluate_scalar(&self, position: Vector2, _time: f64) -> f64 {
        self.raw(position).magnitude()
    }
}

impl FieldSource for PotentialField {
    fn evaluate(&self, position: Vector2, _time: f64) -> Vector2 {
        match self.curl {
            Some(curl) => curl.curl_of_magnitude(|p| self.raw(p), position),
            None => self.raw(position),
        }
    }
}
