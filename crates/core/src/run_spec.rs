//! Reproducible description of a headless run.
//!
//! A [`RunSpec`] names a scene, the display size, parameter overrides, the
//! PRNG seed, how many ticks to run and the frame rate to report to the
//! step policy. Identical specs produce bit-identical particle state.

use crate::error::FlowError;
use serde::{Deserialize, Serialize};

fn default_frame_rate() -> f64 {
    60.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpec {
    pub scene: String,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub ticks: usize,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
}

impl RunSpec {
    /// Empty params, zero ticks, 60 fps.
    pub fn new(scene: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            scene: scene.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            ticks: 0,
            frame_rate: default_frame_rate(),
        }
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        if self.width == 0 || self.height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(FlowError::InvalidDimensions)?;
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(FlowError::InvalidFrameRate(self.frame_rate));
        }
        Ok(())
    }
}
