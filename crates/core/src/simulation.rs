//! The simulation context: one field, one mapping, one population.
//!
//! Everything mutable lives here and is touched only from [`Simulation::tick`].
//! Hosts never reach into the live state; they [`post`](Simulation::post)
//! commands, which are validated immediately and applied at the start of the
//! next tick, in posting order.

use crate::command::{Command, Effect};
use crate::config::SimulationConfig;
use crate::error::FlowError;
use crate::grid::ScalarGrid;
use crate::mapper::CoordinateMapper;
use crate::particle::{Advection, Particle, TrailSegment};
use crate::population::ParticlePopulation;
use crate::prng::{RandomSource, Xorshift64};
use crate::sampler::FieldSampler;
use crate::source::FieldKind;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// What one tick produced for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Zero-based index of this tick.
    pub tick: u64,
    /// The coordinate mapping changed this tick; trails should not be drawn.
    pub suppress_draw: bool,
    pub segments: Vec<TrailSegment>,
    pub population: usize,
    pub born: usize,
    pub died: usize,
    pub culled: usize,
    pub config_version: u64,
}

impl Frame {
    /// Segments the renderer should draw this frame.
    pub fn drawable(&self) -> impl Iterator<Item = &TrailSegment> + '_ {
        let suppressed = self.suppress_draw;
        self.segments
            .iter()
            .filter(move |s| s.drawable && !suppressed)
    }
}

pub struct Simulation {
    config: SimulationConfig,
    /// `config` with every queued command applied; new commands are
    /// validated against it.
    pending: SimulationConfig,
    queue: VecDeque<Command>,
    field: FieldKind,
    raster: Option<Arc<ScalarGrid>>,
    mapper: CoordinateMapper,
    population: ParticlePopulation,
    rng: Box<dyn RandomSource + Send>,
    tick: u64,
    suppress_draw: bool,
}

impl Simulation {
    /// Validates `config` and builds the initial state.
    pub fn new(
        config: SimulationConfig,
        mut rng: Box<dyn RandomSource + Send>,
    ) -> Result<Self, FlowError> {
        config.validate()?;
        let mapper = CoordinateMapper::new(config.width, config.height, config.projection)?;
        let field = config.build_field(None)?;
        let mut population = ParticlePopulation::new(config.target_count);
        if config.prefill {
            population.fill(rng.as_mut(), &mapper, &config.spawn);
        }
        debug!(
            field = field.kind_name(),
            integrator = config.integrator.name(),
            particles = population.len(),
            "simulation created"
        );
        Ok(Self {
            pending: config.clone(),
            config,
            queue: VecDeque::new(),
            field,
            raster: None,
            mapper,
            population,
            rng,
            tick: 0,
            suppress_draw: false,
        })
    }

    /// [`Simulation::new`] with an [`Xorshift64`] seeded from `seed`.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Result<Self, FlowError> {
        Self::new(config, Box::new(Xorshift64::new(seed)))
    }

    /// Queues a command for the next tick.
    ///
    /// The command is checked against the configuration as it will be once
    /// everything already queued has been applied; a rejected command is
    /// not queued.
    pub fn post(&mut self, command: Command) -> Result<(), FlowError> {
        if let Err(err) = command.apply_to(&mut self.pending) {
            warn!(command = command.name(), error = %err, "command rejected");
            return Err(err);
        }
        self.queue.push_back(command);
        Ok(())
    }

    fn drain_commands(&mut self) -> Effect {
        let mut effect = Effect::default();
        while let Some(command) = self.queue.pop_front() {
            match command.apply_to(&mut self.config) {
                Ok(applied) => {
                    if let Command::InstallRaster(raster) = &command {
                        debug!(
                            width = raster.width(),
                            height = raster.height(),
                            "raster installed"
                        );
                        self.raster = Some(Arc::clone(raster));
                    }
                    self.config.version += 1;
                    debug!(
                        command = command.name(),
                        version = self.config.version,
                        "command applied"
                    );
                    effect = effect.merge(applied);
                }
                Err(err) => {
                    warn!(command = command.name(), error = %err, "queued command no longer applies");
                }
            }
        }
        self.pending = self.config.clone();
        effect
    }

    fn apply_effect(&mut self, effect: Effect) {
        if effect.remap {
            match self
                .mapper
                .recompute(self.config.width, self.config.height, self.config.projection)
            {
                Ok(()) => {
                    self.suppress_draw = true;
                    debug!(
                        width = self.config.width,
                        height = self.config.height,
                        scale = ?self.mapper.scale(),
                        "coordinate mapping recomputed"
                    );
                }
                Err(err) => warn!(error = %err, "coordinate mapping kept"),
            }
        }
        if effect.rebuild_field {
            match self.config.build_field(self.raster.clone()) {
                Ok(field) => self.field = field,
                Err(err) => warn!(error = %err, "field rebuild failed; keeping previous field"),
            }
        }
        if effect.reset_population {
            self.population = ParticlePopulation::new(self.config.target_count);
            if self.config.prefill {
                self.population
                    .fill(self.rng.as_mut(), &self.mapper, &self.config.spawn);
            }
        } else if effect.retarget {
            self.population.set_target(self.config.target_count);
        }
    }

    /// Applies every queued command now instead of at the next tick.
    ///
    /// Particles do not move and the tick counter is unchanged; a redraw
    /// suppression raised here still reaches the next frame.
    pub fn apply_pending(&mut self) {
        let effect = self.drain_commands();
        self.apply_effect(effect);
    }

    /// Runs one frame: apply queued commands, then advance every particle.
    ///
    /// `frame_rate` is the measured display rate used by frame-rate step
    /// policies.
    pub fn tick(&mut self, frame_rate: f64) -> Frame {
        self.apply_pending();

        let step = self.config.step.step_size(frame_rate);
        let ctx = Advection {
            field: &self.field,
            integrator: self.config.integrator,
            mapper: &self.mapper,
            schedule: self.config.schedule,
            time: self.tick as f64,
            step,
        };
        let report = self
            .population
            .step(&ctx, self.rng.as_mut(), &self.config.spawn);

        let frame = Frame {
            tick: self.tick,
            suppress_draw: std::mem::take(&mut self.suppress_draw),
            segments: report.segments,
            population: self.population.len(),
            born: report.born,
            died: report.died,
            culled: report.culled,
            config_version: self.config.version,
        };
        trace!(
            tick = frame.tick,
            population = frame.population,
            born = frame.born,
            died = frame.died,
            culled = frame.culled,
            step,
            "tick"
        );
        self.tick += 1;
        frame
    }

    /// Grid sampler over the current field, for arrow plots.
    pub fn sampler(
        &self,
        frame_rate: f64,
        resolution: f64,
    ) -> Result<FieldSampler<'_, FieldKind>, FlowError> {
        FieldSampler::new(
            &self.field,
            self.config.integrator,
            &self.mapper,
            self.tick as f64,
            self.config.step.step_size(frame_rate),
            resolution,
        )
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Configuration after every queued command.
    pub fn pending_config(&self) -> &SimulationConfig {
        &self.pending
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn field(&self) -> &FieldKind {
        &self.field
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn particles(&self) -> &[Particle] {
        self.population.particles()
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn has_raster(&self) -> bool {
        self.raster.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, StepPolicy};
    use crate::mapper::Projection;
    use crate::particle::TickSchedule;
    use crate::source::{Equation, ImageMode};
    use crate::vector::Vector2;

    fn flow() -> SimulationConfig {
        SimulationConfig {
            target_count: 10,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = SimulationConfig {
            projection: Projection::Centered { field_scale: -1.0 },
            ..flow()
        };
        assert!(matches!(
            Simulation::with_seed(config, 1),
            Err(FlowError::InvalidFieldScale(_))
        ));
    }

    #[test]
    fn population_grows_from_empty() {
        let mut sim = Simulation::with_seed(flow(), 42).unwrap();
        assert!(sim.particles().is_empty());
        for _ in 0..10 {
            sim.tick(60.0);
        }
        assert_eq!(sim.particles().len(), 10);
    }

    #[test]
    fn prefill_spawns_everything_up_front() {
        let config = SimulationConfig {
            prefill: true,
            ..flow()
        };
        let sim = Simulation::with_seed(config, 42).unwrap();
        assert_eq!(sim.particles().len(), 10);
    }

    #[test]
    fn commands_wait_for_the_next_tick() {
        let mut sim = Simulation::with_seed(flow(), 1).unwrap();
        sim.post(Command::SetEquation(Equation::Pendulum)).unwrap();
        assert_eq!(sim.queued(), 1);
        assert_eq!(
            sim.config().field,
            FieldConfig::Equation {
                equation: Equation::SlopeCosXY
            }
        );
        assert_eq!(
            sim.pending_config().field,
            FieldConfig::Equation {
                equation: Equation::Pendulum
            }
        );
        let frame = sim.tick(60.0);
        assert_eq!(sim.queued(), 0);
        assert_eq!(frame.config_version, 1);
        assert_eq!(
            sim.config().field,
            FieldConfig::Equation {
                equation: Equation::Pendulum
            }
        );
    }

    #[test]
    fn rejected_command_is_not_queued() {
        let mut sim = Simulation::with_seed(flow(), 1).unwrap();
        assert!(sim.post(Command::SetFieldScale(0.0)).is_err());
        assert!(sim.post(Command::SetNoiseBackend(crate::source::NoiseBackend::Value)).is_err());
        assert_eq!(sim.queued(), 0);
    }

    #[test]
    fn commands_are_validated_against_queued_state() {
        let mut sim = Simulation::with_seed(flow(), 1).unwrap();
        sim.post(Command::Replace(Box::new(SimulationConfig {
            projection: Projection::Screen,
            ..flow()
        })))
        .unwrap();
        // Screen projection has no field scale.
        assert!(sim.post(Command::SetFieldScale(5.0)).is_err());
    }

    #[test]
    fn version_counts_applied_commands() {
        let mut sim = Simulation::with_seed(flow(), 1).unwrap();
        sim.post(Command::SetTargetCount(3)).unwrap();
        sim.post(Command::SetStepMultiplier(0.001)).unwrap();
        let frame = sim.tick(60.0);
        assert_eq!(frame.config_version, 2);
        assert_eq!(sim.config().version, 2);
    }

    #[test]
    fn resize_suppresses_exactly_one_frame() {
        let config = SimulationConfig {
            prefill: true,
            ..flow()
        };
        let mut sim = Simulation::with_seed(config, 5).unwrap();
        sim.tick(60.0);
        assert!(sim.tick(60.0).drawable().count() > 0);
        sim.post(Command::Resize {
            width: 1024.0,
            height: 512.0,
        })
        .unwrap();
        let frame = sim.tick(60.0);
        assert!(frame.suppress_draw);
        assert_eq!(frame.drawable().count(), 0);
        let frame = sim.tick(60.0);
        assert!(!frame.suppress_draw);
        assert_eq!(sim.mapper().extent(), Vector2::new(1024.0, 512.0));
    }

    #[test]
    fn field_scale_change_suppresses_draw() {
        let mut sim = Simulation::with_seed(flow(), 5).unwrap();
        sim.post(Command::SetFieldScale(8.0)).unwrap();
        assert!(sim.tick(60.0).suppress_draw);
    }

    #[test]
    fn image_field_waits_for_raster() {
        let config = SimulationConfig {
            projection: Projection::Screen,
            step: StepPolicy::Fixed(1.0),
            schedule: TickSchedule::DOUBLE_UPDATE,
            prefill: true,
            field: FieldConfig::Image {
                mode: ImageMode::Angle,
                strength: 1.0,
            },
            ..flow()
        };
        let mut sim = Simulation::with_seed(config, 9).unwrap();
        let before: Vec<_> = sim.particles().iter().map(|p| p.position).collect();
        sim.tick(60.0);
        let after: Vec<_> = sim.particles().iter().map(|p| p.position).collect();
        assert_eq!(before, after, "no raster: particles must not move");

        let raster = ScalarGrid::from_data(1, 1, vec![0.5]).unwrap();
        sim.post(Command::InstallRaster(Arc::new(raster))).unwrap();
        sim.tick(60.0);
        assert!(sim.has_raster());
        let moved = sim
            .particles()
            .iter()
            .zip(&after)
            .any(|(p, q)| p.position != *q);
        assert!(moved);
    }

    #[test]
    fn apply_pending_installs_raster_without_ticking() {
        let config = SimulationConfig {
            projection: Projection::Screen,
            step: StepPolicy::Fixed(1.0),
            field: FieldConfig::Image {
                mode: ImageMode::Angle,
                strength: 1.0,
            },
            ..flow()
        };
        let mut sim = Simulation::with_seed(config, 2).unwrap();
        let still = |sim: &Simulation| {
            sim.sampler(60.0, 100.0)
                .unwrap()
                .samples()
                .all(|s| s.magnitude == 0.0)
        };
        assert!(still(&sim));

        let raster = ScalarGrid::from_data(1, 1, vec![0.5]).unwrap();
        sim.post(Command::InstallRaster(Arc::new(raster))).unwrap();
        sim.apply_pending();
        assert!(sim.has_raster());
        assert_eq!(sim.queued(), 0);
        assert_eq!(sim.ticks(), 0);
        assert!(!still(&sim));
    }

    #[test]
    fn same_seed_same_trajectory() {
        let run = |seed| {
            let mut sim = Simulation::with_seed(flow(), seed).unwrap();
            for _ in 0..50 {
                sim.tick(60.0);
            }
            sim.particles().to_vec()
        };
        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }

    #[test]
    fn sampler_covers_display() {
        let sim = Simulation::with_seed(flow(), 1).unwrap();
        let count = sim.sampler(60.0, 100.0).unwrap().samples().count();
        // 800 x 600 at 100 units: 9 columns x 7 rows.
        assert_eq!(count, 63);
    }
}
