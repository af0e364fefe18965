//! Fields sampled from a preloaded raster.

use super::{finite_difference_curl, FieldSource, ScalarSource};
use crate::error::FlowError;
use crate::grid::ScalarGrid;
use crate::vector::{Vector2, VectorExt};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::sync::Arc;

/// How a sampled intensity becomes a velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ImageMode {
    /// Heading `n · 2π`, length `n`.
    Angle,
    /// Curl of the intensity with a difference offset in display units.
    Curl { offset: f64 },
}

impl ImageMode {
    pub const DEFAULT_CURL_OFFSET: f64 = 20.0;
}

/// Scalar field read from one raster channel in [0, 1].
///
/// Positions are display coordinates; they are stretched onto the raster so
/// the whole image covers the display extent. Until a raster is installed
/// every sample is 0 and every velocity is zero.
#[derive(Debug, Clone)]
pub struct ImageScalarField {
    raster: Option<Arc<ScalarGrid>>,
    extent: Vector2,
    mode: ImageMode,
    strength: f64,
}

impl ImageScalarField {
    pub fn new(
        raster: Option<Arc<ScalarGrid>>,
        extent: Vector2,
        mode: ImageMode,
        strength: f64,
    ) -> Result<Self, FlowError> {
        if !(extent.x.is_finite() && extent.y.is_finite() && extent.x > 0.0 && extent.y > 0.0) {
            return Err(FlowError::InvalidDimensions);
        }
        if !strength.is_finite() {
            return Err(FlowError::NonFinite("strength"));
        }
        if let ImageMode::Curl { offset } = mode {
            if !(offset.is_finite() && offset > 0.0) {
                return Err(FlowError::InvalidEpsilon(offset));
            }
        }
        Ok(Self {
            raster,
            extent,
            mode,
            strength,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.raster.is_some()
    }

    pub fn mode(&self) -> ImageMode {
        self.mode
    }

    fn sample(&self, position: Vector2) -> f64 {
        let Some(raster) = &self.raster else {
            return 0.0;
        };
        let x = position.x / self.extent.x * raster.width() as f64;
        let y = position.y / self.extent.y * raster.height() as f64;
        raster.sample_nearest(x, y)
    }
}

impl ScalarSource for ImageScalarField {
    fn evaluate_scalar(&self, position: Vector2, _time: f64) -> f64 {
        self.sample(position)
    }
}

impl FieldSource for ImageScalarField {
    fn evaluate(&self, position: Vector2, _time: f64) -> Vector2 {
        if !self.is_ready() {
            return Vector2::ZERO;
        }
        match self.mode {
            ImageMode::Angle => {
                let n = self.sample(position);
                Vector2::from_polar(n * TAU, n) * self.strength
            }
            ImageMode::Curl { offset } => {
                finite_difference_curl(|p| self.sample(p), position, offset, self.strength)
            }
        }
    }
}
