//! Host intents, applied to the configuration between ticks.

use crate::config::{FieldConfig, SimulationConfig, MAX_TARGET_COUNT};
use crate::error::FlowError;
use crate::grid::ScalarGrid;
use crate::integrator::Integrator;
use crate::mapper::Projection;
use crate::particle::DirectionMode;
use crate::source::{Equation, ImageMode, NoiseBackend};
use crate::vector::Vector2;
use std::sync::Arc;

/// A change requested by the host: a control-panel edit, a drag, a resize.
#[derive(Debug, Clone)]
pub enum Command {
    Resize { width: f64, height: f64 },
    SetFieldScale(f64),
    SetTargetCount(usize),
    SetIntegrator(Integrator),
    /// Frame-rate multiplier, or the fixed step for fixed-step configs.
    SetStepMultiplier(f64),
    SetDirectionMode(DirectionMode),
    SetEquation(Equation),
    SetCurl(bool),
    /// Finite-difference step; the difference offset for image fields.
    SetEpsilon(f64),
    SetStrength(f64),
    SetNoiseBackend(NoiseBackend),
    /// Moves a charge or potential source, e.g. while dragging it.
    MoveSource { index: usize, position: Vector2 },
    /// Installs the raster sampled by image fields.
    InstallRaster(Arc<ScalarGrid>),
    /// Swaps in a whole new configuration and restarts the population.
    Replace(Box<SimulationConfig>),
}

/// Derived state a command invalidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effect {
    pub remap: bool,
    pub rebuild_field: bool,
    pub retarget: bool,
    pub reset_population: bool,
}

impl Effect {
    pub fn merge(self, other: Effect) -> Effect {
        Effect {
            remap: self.remap || other.remap,
            rebuild_field: self.rebuild_field || other.rebuild_field,
            retarget: self.retarget || other.retarget,
            reset_population: self.reset_population || other.reset_population,
        }
    }

    const REMAP: Effect = Effect {
        remap: true,
        rebuild_field: true,
        retarget: false,
        reset_population: false,
    };

    const FIELD: Effect = Effect {
        remap: false,
        rebuild_field: true,
        retarget: false,
        reset_population: false,
    };
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Resize { .. } => "resize",
            Command::SetFieldScale(_) => "set-field-scale",
            Command::SetTargetCount(_) => "set-target-count",
            Command::SetIntegrator(_) => "set-integrator",
            Command::SetStepMultiplier(_) => "set-step-multiplier",
            Command::SetDirectionMode(_) => "set-direction-mode",
            Command::SetEquation(_) => "set-equation",
            Command::SetCurl(_) => "set-curl",
            Command::SetEpsilon(_) => "set-epsilon",
            Command::SetStrength(_) => "set-strength",
            Command::SetNoiseBackend(_) => "set-noise-backend",
            Command::MoveSource { .. } => "move-source",
            Command::InstallRaster(_) => "install-raster",
            Command::Replace(_) => "replace",
        }
    }

    fn unsupported(&self, kind: &str) -> FlowError {
        FlowError::UnsupportedCommand(format!("{} on {kind} field", self.name()))
    }

    /// Applies the command to `config` and validates the result.
    ///
    /// `config` is left unchanged on error. The version is not touched;
    /// the simulation bumps it once the command is actually applied.
    pub fn apply_to(&self, config: &mut SimulationConfig) -> Result<Effect, FlowError> {
        let mut next = config.clone();
        let effect = self.apply_unchecked(&mut next)?;
        next.validate()?;
        *config = next;
        Ok(effect)
    }

    fn apply_unchecked(&self, config: &mut SimulationConfig) -> Result<Effect, FlowError> {
        let kind = config.field.kind_name();
        match self {
            Command::Resize { width, height } => {
                config.width = *width;
                config.height = *height;
                Ok(Effect::REMAP)
            }
            Command::SetFieldScale(scale) => match &mut config.projection {
                Projection::Centered { field_scale } => {
                    *field_scale = *scale;
                    Ok(Effect::REMAP)
                }
                Projection::Screen => Err(self.unsupported(kind)),
            },
            Command::SetTargetCount(count) => {
                if *count > MAX_TARGET_COUNT {
                    return Err(FlowError::InvalidTargetCount {
                        count: *count,
                        max: MAX_TARGET_COUNT,
                    });
                }
                config.target_count = *count;
                Ok(Effect {
                    retarget: true,
                    ..Effect::default()
                })
            }
            Command::SetIntegrator(integrator) => {
                config.integrator = *integrator;
                Ok(Effect::default())
            }
            Command::SetStepMultiplier(amount) => {
                config.step = config.step.with_amount(*amount);
                Ok(Effect::default())
            }
            Command::SetDirectionMode(mode) => {
                config.spawn.direction = *mode;
                Ok(Effect::default())
            }
            Command::SetEquation(new) => match &mut config.field {
                FieldConfig::Equation { equation } => {
                    *equation = *new;
                    Ok(Effect::FIELD)
                }
                _ => Err(self.unsupported(kind)),
            },
            Command::SetCurl(enabled) => match &mut config.field {
                FieldConfig::Charge { curl, .. } | FieldConfig::Potential { curl, .. } => {
                    *curl = *enabled;
                    Ok(Effect::FIELD)
                }
                FieldConfig::Image { mode, .. } => {
                    *mode = match (*enabled, *mode) {
                        (true, ImageMode::Angle) => ImageMode::Curl {
                            offset: ImageMode::DEFAULT_CURL_OFFSET,
                        },
                        (true, curl @ ImageMode::Curl { .. }) => curl,
                        (false, _) => ImageMode::Angle,
                    };
                    Ok(Effect::FIELD)
                }
                _ => Err(self.unsupported(kind)),
            },
            Command::SetEpsilon(value) => match &mut config.field {
                FieldConfig::CurlNoise { epsilon, .. }
                | FieldConfig::Charge { epsilon, .. }
                | FieldConfig::Potential { epsilon, .. } => {
                    *epsilon = *value;
                    Ok(Effect::FIELD)
                }
                FieldConfig::Image {
                    mode: ImageMode::Curl { offset },
                    ..
                } => {
                    *offset = *value;
                    Ok(Effect::FIELD)
                }
                _ => Err(self.unsupported(kind)),
            },
            Command::SetStrength(value) => match &mut config.field {
                FieldConfig::CurlNoise { strength, .. }
                | FieldConfig::Charge { strength, .. }
                | FieldConfig::Potential { strength, .. }
                | FieldConfig::Image { strength, .. } => {
                    *strength = *value;
                    Ok(Effect::FIELD)
                }
                FieldConfig::Equation { .. } => Err(self.unsupported(kind)),
            },
            Command::SetNoiseBackend(new) => match &mut config.field {
                FieldConfig::CurlNoise { backend, .. } => {
                    *backend = *new;
                    Ok(Effect::FIELD)
                }
                _ => Err(self.unsupported(kind)),
            },
            Command::MoveSource { index, position } => {
                let slot = match &mut config.field {
                    FieldConfig::Charge { charges, .. } => {
                        let len = charges.len();
                        charges
                            .get_mut(*index)
                            .map(|c| &mut c.position)
                            .ok_or(FlowError::SourceIndexOutOfRange { index: *index, len })?
                    }
                    FieldConfig::Potential { sources, .. } => {
                        let len = sources.len();
                        sources
                            .get_mut(*index)
                            .map(|s| &mut s.position)
                            .ok_or(FlowError::SourceIndexOutOfRange { index: *index, len })?
                    }
                    _ => return Err(self.unsupported(kind)),
                };
                *slot = *position;
                Ok(Effect::FIELD)
            }
            Command::InstallRaster(_) => Ok(Effect::FIELD),
            Command::Replace(new) => {
                let version = config.version;
                *config = (**new).clone();
                config.version = version;
                Ok(Effect {
                    remap: true,
                    rebuild_field: true,
                    retarget: true,
                    reset_population: true,
                })
            }
        }
    }
}
