//! The particle list and its spawn / replace / cull policy.

use crate::mapper::CoordinateMapper;
use crate::particle::{Advection, Particle, SpawnConfig, TrailSegment};
use crate::prng::RandomSource;
use crate::source::FieldSource;

/// Outcome of one population step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub segments: Vec<TrailSegment>,
    /// Particles spawned this step, replacements included.
    pub born: usize,
    pub died: usize,
    pub culled: usize,
}

/// Ordered particles plus the count they converge toward.
///
/// Dead particles are replaced one-for-one in the same step. On top of
/// that, each step spawns one particle if the population is below target,
/// or culls the oldest one if above, so a target change is absorbed at one
/// particle per step.
#[derive(Debug, Clone, Default)]
pub struct ParticlePopulation {
    particles: Vec<Particle>,
    target: usize,
}

impl ParticlePopulation {
    pub fn new(target: usize) -> Self {
        Self {
            particles: Vec::with_capacity(target),
            target,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn set_target(&mut self, target: usize) {
        self.target = target;
    }

    /// Spawns particles until the population reaches its target.
    pub fn fill(
        &mut self,
        rng: &mut dyn RandomSource,
        mapper: &CoordinateMapper,
        spawn: &SpawnConfig,
    ) -> usize {
        let missing = self.target.saturating_sub(self.particles.len());
        for _ in 0..missing {
            self.particles.push(Particle::spawn(rng, mapper, spawn));
        }
        missing
    }

    /// Removes every particle; the target is kept.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advects every particle once, replaces the dead, then moves one step
    /// toward the target count.
    pub fn step<S: FieldSource + ?Sized>(
        &mut self,
        ctx: &Advection<'_, S>,
        rng: &mut dyn RandomSource,
        spawn: &SpawnConfig,
    ) -> StepReport {
        let segments: Vec<TrailSegment> = self.particles.iter_mut().map(|p| p.step(ctx)).collect();

        let before = self.particles.len();
        self.particles.retain(|p| !p.is_dead());
        let died = before - self.particles.len();
        for _ in 0..died {
            self.particles.push(Particle::spawn(rng, ctx.mapper, spawn));
        }

        let mut born = died;
        let mut culled = 0;
        if self.particles.len() < self.target {
            self.particles.push(Particle::spawn(rng, ctx.mapper, spawn));
            born += 1;
        } else if self.particles.len() > self.target {
            self.particles.remove(0);
            culled = 1;
        }

        StepReport {
            segments,
            born,
            died,
            culled,
        }
    }
}
