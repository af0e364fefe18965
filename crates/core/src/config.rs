//! Versioned simulation configuration.
//!
//! A [`SimulationConfig`] is a plain value: every setting the host can
//! change lives here, and the simulation rebuilds its derived state (field,
//! coordinate mapping, population target) from it at tick boundaries.
//! Hosts build one from a flat JSON object with [`SimulationConfig::from_json`]
//! and change it afterwards through [`crate::command::Command`]s.

use crate::error::FlowError;
use crate::grid::ScalarGrid;
use crate::integrator::Integrator;
use crate::mapper::Projection;
use crate::params::{
    as_vec2, param_array, param_bool, param_f64, param_u32, param_u64, param_usize,
};
use crate::particle::{DirectionMode, SpawnConfig, TickSchedule};
use crate::source::{
    ChargeField, ChargeSource, CurlNoiseField, CurlParams, Equation, EquationField, FieldKind,
    ImageMode, ImageScalarField, NoiseBackend, PotentialField, PotentialSource,
};
use crate::vector::Vector2;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Largest population a config accepts.
pub const MAX_TARGET_COUNT: usize = 100_000;

/// How the per-tick integration step is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// `step = measured fps × multiplier`: a faster display takes larger
    /// steps.
    FrameRate { multiplier: f64 },
    /// The same step every tick.
    Fixed(f64),
}

impl StepPolicy {
    /// Step size for a tick measured at `frame_rate` frames per second.
    ///
    /// An unusable frame rate (zero, negative, non-finite) yields a zero
    /// step for frame-rate policies.
    pub fn step_size(&self, frame_rate: f64) -> f64 {
        match *self {
            StepPolicy::FrameRate { multiplier } => {
                if frame_rate.is_finite() && frame_rate > 0.0 {
                    frame_rate * multiplier
                } else {
                    0.0
                }
            }
            StepPolicy::Fixed(step) => step,
        }
    }

    fn amount(&self) -> f64 {
        match *self {
            StepPolicy::FrameRate { multiplier } => multiplier,
            StepPolicy::Fixed(step) => step,
        }
    }

    pub(crate) fn with_amount(&self, amount: f64) -> StepPolicy {
        match self {
            StepPolicy::FrameRate { .. } => StepPolicy::FrameRate { multiplier: amount },
            StepPolicy::Fixed(_) => StepPolicy::Fixed(amount),
        }
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        let amount = self.amount();
        if amount.is_finite() && amount >= 0.0 {
            Ok(())
        } else {
            Err(FlowError::InvalidStepMultiplier(amount))
        }
    }
}

/// Which field the simulation advects through, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldConfig {
    Equation {
        equation: Equation,
    },
    CurlNoise {
        backend: NoiseBackend,
        noise_scale: f64,
        depth: f64,
        drift: f64,
        epsilon: f64,
        strength: f64,
    },
    Charge {
        charges: Vec<ChargeSource>,
        curl: bool,
        epsilon: f64,
        strength: f64,
        min_distance: f64,
    },
    Potential {
        sources: Vec<PotentialSource>,
        curl: bool,
        epsilon: f64,
        strength: f64,
    },
    Image {
        mode: ImageMode,
        strength: f64,
    },
}

impl FieldConfig {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldConfig::Equation { .. } => "equation",
            FieldConfig::CurlNoise { .. } => "curl-noise",
            FieldConfig::Charge { .. } => "charge",
            FieldConfig::Potential { .. } => "potential",
            FieldConfig::Image { .. } => "image",
        }
    }

    /// Curl noise with the sketch defaults.
    pub fn curl_noise(backend: NoiseBackend) -> Self {
        FieldConfig::CurlNoise {
            backend,
            noise_scale: 0.0015,
            depth: 0.1,
            drift: 0.0,
            epsilon: CurlNoiseField::DEFAULT_EPSILON,
            strength: 1.0,
        }
    }

    fn check_finite(value: f64, name: &'static str) -> Result<(), FlowError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(FlowError::NonFinite(name))
        }
    }

    fn check_epsilon(epsilon: f64) -> Result<(), FlowError> {
        if epsilon.is_finite() && epsilon > 0.0 {
            Ok(())
        } else {
            Err(FlowError::InvalidEpsilon(epsilon))
        }
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        match self {
            FieldConfig::Equation { equation } => {
                if let Equation::Linear { a, b, c, d } = *equation {
                    for v in [a, b, c, d] {
                        Self::check_finite(v, "linear coefficient")?;
                    }
                }
                Ok(())
            }
            FieldConfig::CurlNoise {
                noise_scale,
                depth,
                drift,
                epsilon,
                strength,
                ..
            } => {
                Self::check_epsilon(*epsilon)?;
                Self::check_finite(*noise_scale, "noise_scale")?;
                Self::check_finite(*depth, "depth")?;
                Self::check_finite(*drift, "drift")?;
                Self::check_finite(*strength, "strength")
            }
            FieldConfig::Charge {
                charges,
                epsilon,
                strength,
                min_distance,
                ..
            } => {
                // Construction performs the source checks.
                ChargeField::new(charges.clone(), *min_distance)?;
                Self::check_epsilon(*epsilon)?;
                Self::check_finite(*strength, "strength")
            }
            FieldConfig::Potential {
                sources,
                epsilon,
                strength,
                ..
            } => {
                PotentialField::new(sources.clone())?;
                Self::check_epsilon(*epsilon)?;
                Self::check_finite(*strength, "strength")
            }
            FieldConfig::Image { mode, strength } => {
                if let ImageMode::Curl { offset } = mode {
                    Self::check_epsilon(*offset)?;
                }
                Self::check_finite(*strength, "strength")
            }
        }
    }

    /// Instantiates the field. `extent` is the display size, used by image
    /// fields to stretch the raster.
    pub fn build(
        &self,
        seed: u64,
        extent: Vector2,
        raster: Option<Arc<ScalarGrid>>,
    ) -> Result<FieldKind, FlowError> {
        let curl_params = |curl: bool, epsilon: f64, strength: f64| {
            curl.then_some(CurlParams { epsilon, strength })
        };
        Ok(match self {
            FieldConfig::Equation { equation } => {
                FieldKind::Equation(EquationField::new(*equation, seed))
            }
            FieldConfig::CurlNoise {
                backend,
                noise_scale,
                depth,
                drift,
                epsilon,
                strength,
            } => FieldKind::CurlNoise(
                CurlNoiseField::new(*backend, noise_seed(seed), *noise_scale, *epsilon, *strength)?
                    .with_depth(*depth, *drift),
            ),
            FieldConfig::Charge {
                charges,
                curl,
                epsilon,
                strength,
                min_distance,
            } => FieldKind::Charge(
                ChargeField::new(charges.clone(), *min_distance)?
                    .with_curl(curl_params(*curl, *epsilon, *strength))?,
            ),
            FieldConfig::Potential {
                sources,
                curl,
                epsilon,
                strength,
            } => FieldKind::Potential(
                PotentialField::new(sources.clone())?
                    .with_curl(curl_params(*curl, *epsilon, *strength))?,
            ),
            FieldConfig::Image { mode, strength } => {
                FieldKind::Image(ImageScalarField::new(raster, extent, *mode, *strength)?)
            }
        })
    }

    /// Applies the field-specific keys of a flat JSON object.
    pub fn apply_json(&mut self, params: &Value) -> Result<(), FlowError> {
        match self {
            FieldConfig::Equation { equation } => {
                if let Some(name) = params.get("equation").and_then(Value::as_str) {
                    *equation = Equation::from_name(name)?;
                }
                let keys = ["a", "b", "c", "d"];
                if keys.iter().any(|k| params.get(k).is_some()) {
                    let (a0, b0, c0, d0) = match *equation {
                        Equation::Linear { a, b, c, d } => (a, b, c, d),
                        _ => (0.0, -1.0, 1.0, 1.0),
                    };
                    *equation = Equation::Linear {
                        a: param_f64(params, "a", a0),
                        b: param_f64(params, "b", b0),
                        c: param_f64(params, "c", c0),
                        d: param_f64(params, "d", d0),
                    };
                }
            }
            FieldConfig::CurlNoise {
                backend,
                noise_scale,
                depth,
                drift,
                epsilon,
                strength,
            } => {
                if let Some(name) = params.get("noise").and_then(Value::as_str) {
                    *backend = NoiseBackend::from_name(name)?;
                }
                *noise_scale = param_f64(params, "noise_scale", *noise_scale);
                *depth = param_f64(params, "depth", *depth);
                *drift = param_f64(params, "drift", *drift);
                *epsilon = param_f64(params, "epsilon", *epsilon);
                *strength = param_f64(params, "strength", *strength);
            }
            FieldConfig::Charge {
                charges,
                curl,
                epsilon,
                strength,
                min_distance,
            } => {
                if let Some(items) = param_array(params, "charges") {
                    *charges = items
                        .iter()
                        .map(parse_charge)
                        .collect::<Result<_, _>>()?;
                }
                *curl = param_bool(params, "curl", *curl);
                *epsilon = param_f64(params, "epsilon", *epsilon);
                *strength = param_f64(params, "strength", *strength);
                *min_distance = param_f64(params, "min_distance", *min_distance);
            }
            FieldConfig::Potential {
                sources,
                curl,
                epsilon,
                strength,
            } => {
                if let Some(items) = param_array(params, "sources") {
                    *sources = items
                        .iter()
                        .map(parse_potential)
                        .collect::<Result<_, _>>()?;
                }
                *curl = param_bool(params, "curl", *curl);
                *epsilon = param_f64(params, "epsilon", *epsilon);
                *strength = param_f64(params, "strength", *strength);
            }
            FieldConfig::Image { mode, strength } => {
                let offset = match *mode {
                    ImageMode::Curl { offset } => offset,
                    ImageMode::Angle => ImageMode::DEFAULT_CURL_OFFSET,
                };
                let offset = param_f64(params, "offset", offset);
                let use_curl = param_bool(params, "curl", matches!(mode, ImageMode::Curl { .. }));
                *mode = if use_curl {
                    ImageMode::Curl { offset }
                } else {
                    ImageMode::Angle
                };
                *strength = param_f64(params, "strength", *strength);
            }
        }
        Ok(())
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        out.insert("field".into(), json!(self.kind_name()));
        match self {
            FieldConfig::Equation { equation } => {
                out.insert("equation".into(), json!(equation.name()));
                if let Equation::Linear { a, b, c, d } = *equation {
                    for (k, v) in [("a", a), ("b", b), ("c", c), ("d", d)] {
                        out.insert(k.into(), json!(v));
                    }
                }
            }
            FieldConfig::CurlNoise {
                backend,
                noise_scale,
                depth,
                drift,
                epsilon,
                strength,
            } => {
                out.insert("noise".into(), json!(backend.name()));
                out.insert("noise_scale".into(), json!(noise_scale));
                out.insert("depth".into(), json!(depth));
                out.insert("drift".into(), json!(drift));
                out.insert("epsilon".into(), json!(epsilon));
                out.insert("strength".into(), json!(strength));
            }
            FieldConfig::Charge {
                charges,
                curl,
                epsilon,
                strength,
                min_distance,
            } => {
                let list: Vec<Value> = charges
                    .iter()
                    .map(|c| json!({"position": [c.position.x, c.position.y], "strength": c.strength}))
                    .collect();
                out.insert("charges".into(), Value::Array(list));
                out.insert("curl".into(), json!(curl));
                out.insert("epsilon".into(), json!(epsilon));
                out.insert("strength".into(), json!(strength));
                out.insert("min_distance".into(), json!(min_distance));
            }
            FieldConfig::Potential {
                sources,
                curl,
                epsilon,
                strength,
            } => {
                let list: Vec<Value> = sources
                    .iter()
                    .map(|s| {
                        json!({
                            "position": [s.position.x, s.position.y],
                            "radius": s.radius,
                            "polarity": s.polarity,
                        })
                    })
                    .collect();
                out.insert("sources".into(), Value::Array(list));
                out.insert("curl".into(), json!(curl));
                out.insert("epsilon".into(), json!(epsilon));
                out.insert("strength".into(), json!(strength));
            }
            FieldConfig::Image { mode, strength } => {
                out.insert("curl".into(), json!(matches!(mode, ImageMode::Curl { .. })));
                if let ImageMode::Curl { offset } = mode {
                    out.insert("offset".into(), json!(offset));
                }
                out.insert("strength".into(), json!(strength));
            }
        }
    }
}

/// Noise generators take a 32-bit seed; fold the run seed into one.
fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

fn parse_charge(item: &Value) -> Result<ChargeSource, FlowError> {
    let position = item
        .get("position")
        .and_then(as_vec2)
        .ok_or(FlowError::MalformedParam("charges"))?;
    let strength = item
        .get("strength")
        .and_then(Value::as_f64)
        .ok_or(FlowError::MalformedParam("charges"))?;
    Ok(ChargeSource::new(position, strength))
}

fn parse_potential(item: &Value) -> Result<PotentialSource, FlowError> {
    let position = item
        .get("position")
        .and_then(as_vec2)
        .ok_or(FlowError::MalformedParam("sources"))?;
    let radius = item
        .get("radius")
        .and_then(Value::as_f64)
        .ok_or(FlowError::MalformedParam("sources"))?;
    let polarity = param_f64(item, "polarity", 1.0);
    Ok(PotentialSource::new(position, radius, polarity))
}

/// Everything the host can configure, plus a version that increases every
/// time a command is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub version: u64,
    pub width: f64,
    pub height: f64,
    pub projection: Projection,
    pub target_count: usize,
    /// Spawn the whole population at construction instead of one per tick.
    pub prefill: bool,
    pub integrator: Integrator,
    pub step: StepPolicy,
    pub schedule: TickSchedule,
    pub spawn: SpawnConfig,
    pub field: FieldConfig,
    /// Seeds the stochastic fields (noise, random linear).
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            version: 0,
            width: 800.0,
            height: 600.0,
            projection: Projection::Centered { field_scale: 20.0 },
            target_count: 150,
            prefill: false,
            integrator: Integrator::Rk4,
            step: StepPolicy::FrameRate { multiplier: 0.0002 },
            schedule: TickSchedule::DOUBLE_STEP,
            spawn: SpawnConfig::default(),
            field: FieldConfig::Equation {
                equation: Equation::SlopeCosXY,
            },
            seed: 1,
        }
    }
}

impl SimulationConfig {
    /// The default config with `params` applied, validated.
    pub fn from_json(params: &Value) -> Result<Self, FlowError> {
        let mut config = Self::default();
        config.apply_json(params)?;
        Ok(config)
    }

    /// Overrides every setting named in `params`; others keep their value.
    /// The result is validated, and `self` is left unchanged on error.
    pub fn apply_json(&mut self, params: &Value) -> Result<(), FlowError> {
        let mut next = self.clone();
        next.width = param_f64(params, "width", next.width);
        next.height = param_f64(params, "height", next.height);
        if let Some(name) = params.get("projection").and_then(Value::as_str) {
            next.projection = match name {
                "screen" => Projection::Screen,
                _ => Projection::Centered {
                    field_scale: next.field_scale().unwrap_or(20.0),
                },
            };
        }
        if let Projection::Centered { field_scale } = &mut next.projection {
            *field_scale = param_f64(params, "field_scale", *field_scale);
        }
        next.target_count = param_usize(params, "blobs", next.target_count);
        next.prefill = param_bool(params, "prefill", next.prefill);
        if let Some(name) = params.get("integrator").and_then(Value::as_str) {
            next.integrator = Integrator::from_name(name)?;
        }
        next.step = next.step.with_amount(param_f64(params, "speed", next.step.amount()));
        if let Some(name) = params.get("direction").and_then(Value::as_str) {
            next.spawn.direction = DirectionMode::from_name(name)?;
        }
        next.spawn.min_lifespan = param_u32(params, "min_lifespan", next.spawn.min_lifespan);
        next.spawn.max_lifespan = param_u32(params, "max_lifespan", next.spawn.max_lifespan);
        next.spawn.min_size = param_f64(params, "min_size", next.spawn.min_size);
        next.spawn.max_size = param_f64(params, "max_size", next.spawn.max_size);
        next.spawn.color_count = param_usize(params, "colors", next.spawn.color_count);
        next.schedule.age_increment =
            param_u32(params, "age_increment", next.schedule.age_increment);
        next.schedule.displacement_repeats =
            param_u32(params, "repeats", next.schedule.displacement_repeats);
        next.seed = param_u64(params, "seed", next.seed);
        next.field.apply_json(params)?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn field_scale(&self) -> Option<f64> {
        match self.projection {
            Projection::Centered { field_scale } => Some(field_scale),
            Projection::Screen => None,
        }
    }

    pub fn extent(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(FlowError::InvalidDimensions);
        }
        self.projection.validate()?;
        if self.target_count > MAX_TARGET_COUNT {
            return Err(FlowError::InvalidTargetCount {
                count: self.target_count,
                max: MAX_TARGET_COUNT,
            });
        }
        self.step.validate()?;
        self.schedule.validate()?;
        self.spawn.validate()?;
        self.field.validate()
    }

    /// Builds the active field from this config.
    pub fn build_field(&self, raster: Option<Arc<ScalarGrid>>) -> Result<FieldKind, FlowError> {
        self.field.build(self.seed, self.extent(), raster)
    }

    /// Current values as a flat JSON object, in the keys `apply_json` reads.
    pub fn params(&self) -> Value {
        let mut out = Map::new();
        out.insert("version".into(), json!(self.version));
        out.insert("width".into(), json!(self.width));
        out.insert("height".into(), json!(self.height));
        match self.projection {
            Projection::Centered { field_scale } => {
                out.insert("projection".into(), json!("centered"));
                out.insert("field_scale".into(), json!(field_scale));
            }
            Projection::Screen => {
                out.insert("projection".into(), json!("screen"));
            }
        }
        out.insert("blobs".into(), json!(self.target_count));
        out.insert("prefill".into(), json!(self.prefill));
        out.insert("integrator".into(), json!(self.integrator.name()));
        out.insert("speed".into(), json!(self.step.amount()));
        out.insert("direction".into(), json!(self.spawn.direction.name()));
        out.insert("min_lifespan".into(), json!(self.spawn.min_lifespan));
        out.insert("max_lifespan".into(), json!(self.spawn.max_lifespan));
        out.insert("min_size".into(), json!(self.spawn.min_size));
        out.insert("max_size".into(), json!(self.spawn.max_size));
        out.insert("colors".into(), json!(self.spawn.color_count));
        out.insert("age_increment".into(), json!(self.schedule.age_increment));
        out.insert("repeats".into(), json!(self.schedule.displacement_repeats));
        out.insert("seed".into(), json!(self.seed));
        self.field.write_json(&mut out);
        Value::Object(out)
    }
}
