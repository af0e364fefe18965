#![deny(unsafe_code)]
//! Scene registry: maps scene names to configuration presets and provides
//! headless rendering.
//!
//! Each scene is a thin [`SimulationConfig`] preset over `flowfield-core`.
//! The CLI depends on this crate so that name dispatch, raster loading and
//! trail accumulation live in one place.

pub mod pixel;
pub mod trail;

#[cfg(feature = "png")]
pub mod raster;
#[cfg(feature = "png")]
pub mod snapshot;

use flowfield_core::config::{FieldConfig, StepPolicy};
use flowfield_core::error::FlowError;
use flowfield_core::source::{
    ChargeSource, Equation, ImageMode, NoiseBackend, PotentialSource, DEFAULT_MIN_CHARGE_DISTANCE,
};
use flowfield_core::{
    DirectionMode, Projection, RunSpec, Simulation, SimulationConfig, SpawnConfig, TickSchedule, Vector2,
};
use serde_json::Value;
use tracing::debug;

/// All available scene names.
const SCENE_NAMES: &[&str] = &[
    "flow-stream",
    "param-field",
    "electric",
    "potential",
    "curl-noise",
    "image",
];

/// Population of the display-space scenes, spawned up front.
const SCREEN_SCENE_BLOBS: usize = 100;

/// One preset per field family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    /// Named closed-form equation in a centered, y-up frame.
    FlowStream,
    /// Parametric linear system `(a·x + b·y, c·x + d·y)`.
    ParamField,
    /// Two opposite point charges, curled.
    Electric,
    /// Two bounded radial sources, curled.
    Potential,
    /// Curl of Perlin noise.
    CurlNoise,
    /// Flow angles read from a raster.
    Image,
}

impl SceneKind {
    /// Looks a scene up by name.
    ///
    /// Returns `FlowError::UnknownScene` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "flow-stream" => Ok(SceneKind::FlowStream),
            "param-field" => Ok(SceneKind::ParamField),
            "electric" => Ok(SceneKind::Electric),
            "potential" => Ok(SceneKind::Potential),
            "curl-noise" => Ok(SceneKind::CurlNoise),
            "image" => Ok(SceneKind::Image),
            _ => Err(FlowError::UnknownScene(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SceneKind::FlowStream => "flow-stream",
            SceneKind::ParamField => "param-field",
            SceneKind::Electric => "electric",
            SceneKind::Potential => "potential",
            SceneKind::CurlNoise => "curl-noise",
            SceneKind::Image => "image",
        }
    }

    /// Returns a slice of all recognized scene names.
    pub fn list_scenes() -> &'static [&'static str] {
        SCENE_NAMES
    }

    /// Whether the scene samples a raster that has to be installed first.
    pub fn needs_raster(&self) -> bool {
        matches!(self, SceneKind::Image)
    }

    /// The preset for a `width × height` display.
    pub fn config(&self, width: usize, height: usize) -> SimulationConfig {
        let (w, h) = (width as f64, height as f64);
        let base = SimulationConfig {
            width: w,
            height: h,
            ..SimulationConfig::default()
        };
        match self {
            SceneKind::FlowStream => base,
            SceneKind::ParamField => SimulationConfig {
                field: FieldConfig::Equation {
                    equation: Equation::Linear {
                        a: 0.0,
                        b: -1.0,
                        c: 1.0,
                        d: 1.0,
                    },
                },
                ..base
            },
            SceneKind::Electric => SimulationConfig {
                schedule: TickSchedule::DOUBLE_STEP,
                field: FieldConfig::Charge {
                    charges: vec![
                        ChargeSource::new(Vector2::new(100.0, 300.0), 1.0),
                        ChargeSource::new(Vector2::new(1000.0, 300.0), -1.0),
                    ],
                    curl: true,
                    epsilon: 1e-4,
                    strength: 50.0,
                    min_distance: DEFAULT_MIN_CHARGE_DISTANCE,
                },
                ..screen_space(base)
            },
            SceneKind::Potential => SimulationConfig {
                schedule: TickSchedule::DOUBLE_UPDATE,
                field: FieldConfig::Potential {
                    sources: vec![
                        PotentialSource::new(Vector2::new(w / 2.0, h / 2.0), h / 2.0, 1.0),
                        PotentialSource::new(Vector2::new(800.0, 300.0), 300.0, -1.0),
                    ],
                    curl: true,
                    epsilon: 1e-4,
                    strength: 50.0,
                },
                ..screen_space(base)
            },
            SceneKind::CurlNoise => SimulationConfig {
                schedule: TickSchedule::DOUBLE_UPDATE,
                field: FieldConfig::curl_noise(NoiseBackend::Perlin),
                ..screen_space(base)
            },
            SceneKind::Image => SimulationConfig {
                schedule: TickSchedule::DOUBLE_UPDATE,
                field: FieldConfig::Image {
                    mode: ImageMode::Angle,
                    strength: 1.0,
                },
                ..screen_space(base)
            },
        }
    }

    /// Builds a simulation for the named scene with `params` overrides.
    ///
    /// `seed` seeds both the spawn PRNG and the stochastic fields; a `seed`
    /// key in `params` overrides the latter only.
    pub fn build(
        name: &str,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Simulation, FlowError> {
        let scene = Self::from_name(name)?;
        let mut config = scene.config(width, height);
        config.seed = seed;
        config.apply_json(params)?;
        debug!(
            scene = scene.name(),
            width,
            height,
            seed,
            field = config.field.kind_name(),
            "scene configured"
        );
        Simulation::with_seed(config, seed)
    }

    /// [`SceneKind::build`] from a validated [`RunSpec`].
    pub fn from_spec(spec: &RunSpec) -> Result<Simulation, FlowError> {
        spec.validate()?;
        Self::build(&spec.scene, spec.width, spec.height, spec.seed, &spec.params)
    }
}

/// Display-space scenes: identity projection, the field value is the
/// per-tick velocity, every particle moves forward at full speed, and the
/// population starts full.
fn screen_space(base: SimulationConfig) -> SimulationConfig {
    SimulationConfig {
        projection: Projection::Screen,
        step: StepPolicy::Fixed(1.0),
        target_count: SCREEN_SCENE_BLOBS,
        prefill: true,
        spawn: SpawnConfig {
            direction: DirectionMode::Constant,
            ..SpawnConfig::default()
        },
        ..base
    }
}
