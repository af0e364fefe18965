//! Curl of a coherent noise function.

use super::{finite_difference_curl, FieldSource, ScalarSource};
use crate::error::FlowError;
use crate::vector::Vector2;
use noise::{NoiseFn, OpenSimplex, Perlin, Value};
use serde::{Deserialize, Serialize};

/// Interchangeable scalar noise generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseBackend {
    Perlin,
    Value,
    Simplex,
}

impl NoiseBackend {
    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "perlin" => Ok(NoiseBackend::Perlin),
            "value" => Ok(NoiseBackend::Value),
            "simplex" => Ok(NoiseBackend::Simplex),
            _ => Err(FlowError::UnknownNoiseBackend(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoiseBackend::Perlin => "perlin",
            NoiseBackend::Value => "value",
            NoiseBackend::Simplex => "simplex",
        }
    }

    /// Output gain applied after the curl. Simplex has steeper gradients
    /// than the lattice noises and is damped to a comparable speed.
    pub fn gain(&self) -> f64 {
        match self {
            NoiseBackend::Simplex => 0.25,
            NoiseBackend::Perlin | NoiseBackend::Value => 1.0,
        }
    }
}

enum Generator {
    Perlin(Perlin),
    Value(Value),
    Simplex(OpenSimplex),
}

impl Generator {
    fn new(backend: NoiseBackend, seed: u32) -> Self {
        match backend {
            NoiseBackend::Perlin => Generator::Perlin(Perlin::new(seed)),
            NoiseBackend::Value => Generator::Value(Value::new(seed)),
            NoiseBackend::Simplex => Generator::Simplex(OpenSimplex::new(seed)),
        }
    }

    fn get(&self, point: [f64; 3]) -> f64 {
        match self {
            Generator::Perlin(n) => n.get(point),
            Generator::Value(n) => n.get(point),
            Generator::Simplex(n) => n.get(point),
        }
    }
}

/// Divergence-free flow from the curl of `n(x·scale, y·scale, z)`.
///
/// `z = depth + drift · time`; with zero drift the field is static.
pub struct CurlNoiseField {
    backend: NoiseBackend,
    generator: Generator,
    scale: f64,
    depth: f64,
    drift: f64,
    epsilon: f64,
    strength: f64,
}

impl CurlNoiseField {
    /// Default finite-difference step, in noise space.
    pub const DEFAULT_EPSILON: f64 = 1e-4;

    /// Creates a curl-noise field. `epsilon` is the finite-difference step in
    /// noise space and must be positive.
    pub fn new(
        backend: NoiseBackend,
        seed: u32,
        scale: f64,
        epsilon: f64,
        strength: f64,
    ) -> Result<Self, FlowError> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(FlowError::InvalidEpsilon(epsilon));
        }
        if !scale.is_finite() {
            return Err(FlowError::NonFinite("noise_scale"));
        }
        if !strength.is_finite() {
            return Err(FlowError::NonFinite("strength"));
        }
        Ok(Self {
            backend,
            generator: Generator::new(backend, seed),
            scale,
            depth: 0.0,
            drift: 0.0,
            epsilon,
            strength,
        })
    }

    /// Sets the noise z-coordinate and how fast it moves per unit time.
    pub fn with_depth(mut self, depth: f64, drift: f64) -> Self {
        self.depth = depth;
        self.drift = drift;
        self
    }

    pub fn backend(&self) -> NoiseBackend {
        self.backend
    }

    fn z(&self, time: f64) -> f64 {
        self.depth + self.drift * time
    }
}

impl ScalarSource for CurlNoiseField {
    fn evaluate_scalar(&self, position: Vector2, time: f64) -> f64 {
        let q = position * self.scale;
        self.generator.get([q.x, q.y, self.z(time)])
    }
}

impl FieldSource for CurlNoiseField {
    fn evaluate(&self, position: Vector2, time: f64) -> Vector2 {
        let z = self.z(time);
        finite_difference_curl(
            |q| self.generator.get([q.x, q.y, z]),
            position * self.scale,
            self.epsilon,
            self.strength / self.epsilon * self.backend.gain(),
        )
    }
}
