//! A single advected particle and its lifecycle.

use crate::error::FlowError;
use crate::integrator::Integrator;
use crate::mapper::CoordinateMapper;
use crate::prng::RandomSource;
use crate::source::FieldSource;
use crate::vector::Vector2;
use serde::{Deserialize, Serialize};

/// Distribution the per-particle direction sign is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionMode {
    /// Uniform in [0.1, 1).
    #[default]
    Positive,
    /// Uniform in (-1, -0.1].
    Negative,
    /// Positive magnitude with a random sign.
    Mixed,
    /// Always exactly 1.
    Constant,
}

impl DirectionMode {
    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "positive" => Ok(DirectionMode::Positive),
            "negative" => Ok(DirectionMode::Negative),
            "mixed" | "pos/neg" => Ok(DirectionMode::Mixed),
            "constant" => Ok(DirectionMode::Constant),
            _ => Err(FlowError::UnknownDirectionMode(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DirectionMode::Positive => "positive",
            DirectionMode::Negative => "negative",
            DirectionMode::Mixed => "mixed",
            DirectionMode::Constant => "constant",
        }
    }

    pub fn sample(&self, rng: &mut dyn RandomSource) -> f64 {
        match self {
            DirectionMode::Positive => rng.range(0.1, 1.0),
            DirectionMode::Negative => rng.range(-0.1, -1.0),
            DirectionMode::Mixed => {
                let magnitude = rng.range(0.1, 1.0);
                if rng.coin() {
                    magnitude
                } else {
                    -magnitude
                }
            }
            DirectionMode::Constant => 1.0,
        }
    }
}

/// How much a particle ages and moves per tick.
///
/// Some field types advance particles through two update calls per frame,
/// which ages them twice as fast as the rest. The schedule keeps that
/// per-field difference explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSchedule {
    pub age_increment: u32,
    pub displacement_repeats: u32,
}

impl TickSchedule {
    /// Age 1, move once.
    pub const SINGLE: TickSchedule = TickSchedule {
        age_increment: 1,
        displacement_repeats: 1,
    };
    /// Age 1, apply the displacement twice (equation and charge scenes).
    pub const DOUBLE_STEP: TickSchedule = TickSchedule {
        age_increment: 1,
        displacement_repeats: 2,
    };
    /// Age 2, apply the displacement twice (noise, potential and image scenes).
    pub const DOUBLE_UPDATE: TickSchedule = TickSchedule {
        age_increment: 2,
        displacement_repeats: 2,
    };

    pub fn validate(&self) -> Result<(), FlowError> {
        if self.age_increment == 0 || self.displacement_repeats == 0 {
            return Err(FlowError::InvalidSchedule);
        }
        Ok(())
    }
}

impl Default for TickSchedule {
    fn default() -> Self {
        TickSchedule::SINGLE
    }
}

/// Ranges new particles draw their attributes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub min_size: f64,
    pub max_size: f64,
    pub color_count: usize,
    pub min_lifespan: u32,
    pub max_lifespan: u32,
    pub direction: DirectionMode,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            min_size: 1.0,
            max_size: 5.0,
            color_count: 5,
            min_lifespan: 300,
            max_lifespan: 600,
            direction: DirectionMode::Positive,
        }
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.min_lifespan > self.max_lifespan {
            return Err(FlowError::InvalidLifespan {
                min: self.min_lifespan,
                max: self.max_lifespan,
            });
        }
        if !self.min_size.is_finite() || !self.max_size.is_finite() {
            return Err(FlowError::NonFinite("size"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeStage {
    Spawning,
    Alive,
    Dead,
}

/// A line from the previous to the current display position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub from: Vector2,
    pub to: Vector2,
    pub size: f64,
    pub color: usize,
    /// False on a particle's first tick, when `from` is its spawn point.
    pub drawable: bool,
}

/// Everything one particle step needs besides the particle.
pub struct Advection<'a, S: FieldSource + ?Sized> {
    pub field: &'a S,
    pub integrator: Integrator,
    pub mapper: &'a CoordinateMapper,
    pub schedule: TickSchedule,
    pub time: f64,
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vector2,
    pub last_display: Vector2,
    pub velocity: Vector2,
    pub size: f64,
    pub color: usize,
    pub direction: f64,
    pub age: u32,
    pub lifespan: u32,
}

impl Particle {
    /// Spawns at a uniformly random point of the viewport.
    ///
    /// Draw order: x, y, size, color, direction, lifespan.
    pub fn spawn(
        rng: &mut dyn RandomSource,
        mapper: &CoordinateMapper,
        config: &SpawnConfig,
    ) -> Self {
        let extent = mapper.extent();
        let display = Vector2::new(rng.range(0.0, extent.x), rng.range(0.0, extent.y));
        let size = rng.range(config.min_size, config.max_size);
        let color = rng.index(config.color_count);
        let direction = config.direction.sample(rng);
        let lifespan = rng.range(
            f64::from(config.min_lifespan),
            f64::from(config.max_lifespan),
        ) as u32;
        Self {
            position: mapper.to_simulation(display),
            last_display: display,
            velocity: Vector2::ZERO,
            size,
            color,
            direction,
            age: 0,
            lifespan,
        }
    }

    pub fn stage(&self) -> LifeStage {
        if self.is_dead() {
            LifeStage::Dead
        } else if self.age == 0 {
            LifeStage::Spawning
        } else {
            LifeStage::Alive
        }
    }

    pub fn is_dead(&self) -> bool {
        self.age > self.lifespan
    }

    pub fn display_position(&self, mapper: &CoordinateMapper) -> Vector2 {
        mapper.to_display(self.position)
    }

    /// Advances one tick and returns the trail segment it drew.
    ///
    /// The displacement is evaluated once at the tick's starting position
    /// and added `displacement_repeats` times. A non-finite displacement is
    /// treated as zero.
    pub fn step<S: FieldSource + ?Sized>(&mut self, ctx: &Advection<'_, S>) -> TrailSegment {
        let drawable = self.age > 0;
        let d = ctx.integrator.integrate(
            ctx.field,
            self.position,
            ctx.time,
            ctx.step,
            self.direction,
        );
        self.velocity = if d.is_finite() {
            d * self.direction
        } else {
            Vector2::ZERO
        };
        for _ in 0..ctx.schedule.displacement_repeats {
            self.position += self.velocity;
        }
        let to = self.display_position(ctx.mapper);
        let segment = TrailSegment {
            from: self.last_display,
            to,
            size: self.size,
            color: self.color,
            drawable,
        };
        self.last_display = to;
        self.age = self.age.saturating_add(ctx.schedule.age_increment);
        segment
    }
}
