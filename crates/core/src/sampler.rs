//! Regular-grid diagnostic sampling of a field.

use crate::error::FlowError;
use crate::integrator::Integrator;
use crate::mapper::CoordinateMapper;
use crate::source::FieldSource;
use crate::vector::{Vector2, VectorExt};
use serde::Serialize;

/// One arrow of a field plot, in display space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSample {
    pub position: Vector2,
    pub angle: f64,
    pub magnitude: f64,
}

/// Samples `field` through `integrator` at every `resolution` display units,
/// `x` and `y` from 0 up to and including the display extent.
///
/// Each sample is the forward (direction +1) displacement of one step from
/// that point, oriented into display axes. The sampler only reads its
/// inputs.
pub struct FieldSampler<'a, S: FieldSource + ?Sized> {
    field: &'a S,
    integrator: Integrator,
    mapper: &'a CoordinateMapper,
    time: f64,
    step: f64,
    resolution: f64,
}

impl<'a, S: FieldSource + ?Sized> FieldSampler<'a, S> {
    pub fn new(
        field: &'a S,
        integrator: Integrator,
        mapper: &'a CoordinateMapper,
        time: f64,
        step: f64,
        resolution: f64,
    ) -> Result<Self, FlowError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(FlowError::InvalidResolution(resolution));
        }
        Ok(Self {
            field,
            integrator,
            mapper,
            time,
            step,
            resolution,
        })
    }

    fn axis(&self, limit: f64) -> impl Iterator<Item = f64> + '_ {
        let count = (limit / self.resolution).floor() as usize + 1;
        (0..count).map(move |i| i as f64 * self.resolution)
    }

    pub fn sample_at(&self, display: Vector2) -> GridSample {
        let sim = self.mapper.to_simulation(display);
        let d = self
            .integrator
            .integrate(self.field, sim, self.time, self.step, 1.0);
        let v = if d.is_finite() {
            self.mapper.orient(d)
        } else {
            Vector2::ZERO
        };
        GridSample {
            position: display,
            angle: v.heading(),
            magnitude: v.magnitude(),
        }
    }

    /// Column-major: all rows of the first column, then the next column.
    pub fn samples(&self) -> impl Iterator<Item = GridSample> + '_ {
        let extent = self.mapper.extent();
        self.axis(extent.x).flat_map(move |x| {
            self.axis(extent.y)
                .map(move |y| self.sample_at(Vector2::new(x, y)))
        })
    }
}
