//! Explicit one-step ODE integrators.
//!
//! An [`Integrator`] turns a field, a position and a step size into a
//! displacement. The `direction` sign scales every stage, so the same field
//! can be followed forward (`+1`) or backward (`-1`), or at an asymmetric
//! speed, without building a second field.

use crate::error::FlowError;
use crate::source::FieldSource;
use crate::vector::Vector2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Integrator {
    Euler,
    /// Two-stage scheme averaging the slopes at the start and at the
    /// half-step estimate.
    Rk2,
    /// Classical midpoint method: the half-step slope alone.
    Midpoint,
    #[default]
    Rk4,
}

impl Integrator {
    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name.to_ascii_lowercase().as_str() {
            "euler" => Ok(Integrator::Euler),
            "rk2" => Ok(Integrator::Rk2),
            "midpoint" => Ok(Integrator::Midpoint),
            "rk4" => Ok(Integrator::Rk4),
            _ => Err(FlowError::UnknownIntegrator(name.to_string())),
        }
    }

    /// Every scheme, in order of accuracy.
    pub fn all() -> [Integrator; 4] {
        [
            Integrator::Euler,
            Integrator::Rk2,
            Integrator::Midpoint,
            Integrator::Rk4,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Integrator::Euler => "euler",
            Integrator::Rk2 => "rk2",
            Integrator::Midpoint => "midpoint",
            Integrator::Rk4 => "rk4",
        }
    }

    /// Displacement over one step of size `step`, before the direction sign
    /// is applied to the result.
    ///
    /// The caller moves the particle by `direction * displacement`. Inside
    /// the scheme, `direction` places the intermediate stages so that a
    /// backward-running particle samples the field behind it.
    pub fn integrate<S: FieldSource + ?Sized>(
        &self,
        source: &S,
        position: Vector2,
        time: f64,
        step: f64,
        direction: f64,
    ) -> Vector2 {
        let f = |p: Vector2, t: f64| source.evaluate(p, t);
        let h = step * direction;
        match self {
            Integrator::Euler => f(position, time) * step,
            Integrator::Rk2 => {
                let k1 = f(position, time);
                let k2 = f(position + k1 * (0.5 * h), time + 0.5 * step);
                (k1 + k2) * (0.5 * step)
            }
            Integrator::Midpoint => {
                let k1 = f(position, time);
                f(position + k1 * (0.5 * h), time + 0.5 * step) * step
            }
            Integrator::Rk4 => {
                let k1 = f(position, time);
                let k2 = f(position + k1 * (0.5 * h), time + 0.5 * step);
                let k3 = f(position + k2 * (0.5 * h), time + 0.5 * step);
                let k4 = f(position + k3 * h, time + step);
                (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (step / 6.0)
            }
        }
    }

    /// Position after one signed step: `position + direction · displacement`.
    pub fn advance<S: FieldSource + ?Sized>(
        &self,
        source: &S,
        position: Vector2,
        time: f64,
        step: f64,
        direction: f64,
    ) -> Vector2 {
        position + self.integrate(source, position, time, step, direction) * direction
    }
}
