#![deny(unsafe_code)]
//! Core of the flowfield engine.
//!
//! Particles are advected through a 2D velocity field by an explicit
//! integrator and leave trails for an external renderer. This crate provides
//! the field sources ([`FieldKind`]: closed-form equations, curl noise, point
//! charges, radial potentials, raster-sampled fields), the [`Integrator`]s,
//! the simulation↔display [`CoordinateMapper`], the particle lifecycle and
//! [`ParticlePopulation`] policy, a diagnostic [`FieldSampler`], and the
//! [`Simulation`] context that ties them together behind a versioned
//! [`SimulationConfig`] and a [`Command`] queue.

pub mod command;
pub mod config;
pub mod error;
pub mod grid;
pub mod integrator;
pub mod mapper;
pub mod params;
pub mod particle;
pub mod population;
pub mod prng;
pub mod run_spec;
pub mod sampler;
pub mod simulation;
pub mod source;
pub mod vector;

pub use command::Command;
pub use config::{FieldConfig, SimulationConfig, StepPolicy};
pub use error::FlowError;
pub use grid::ScalarGrid;
pub use integrator::Integrator;
pub use mapper::{CoordinateMapper, Projection};
pub use particle::{DirectionMode, LifeStage, Particle, SpawnConfig, TickSchedule, TrailSegment};
pub use population::ParticlePopulation;
pub use prng::{RandomSource, Xorshift64};
pub use run_spec::RunSpec;
pub use sampler::{FieldSampler, GridSample};
pub use simulation::{Frame, Simulation};
pub use source::{FieldKind, FieldSource, ScalarSource};
pub use vector::{Vector2, VectorExt};
