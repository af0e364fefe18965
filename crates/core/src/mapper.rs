//! Simulation-space ↔ display-space transform.
//!
//! Equation fields are authored in a small y-up domain centred on the
//! origin; particles are drawn in pixel space with y pointing down. A
//! [`CoordinateMapper`] holds the affine map between the two and is
//! recomputed whenever the display extent or the field scale changes.

use crate::error::FlowError;
use crate::vector::Vector2;
use serde::{Deserialize, Serialize};

/// How simulation space sits inside the display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Projection {
    /// Origin at the viewport centre, y up, `field_scale` simulation units
    /// across the shorter display axis.
    Centered { field_scale: f64 },
    /// Simulation space is display space.
    Screen,
}

impl Projection {
    pub fn validate(&self) -> Result<(), FlowError> {
        match *self {
            Projection::Centered { field_scale } => {
                if field_scale.is_finite() && field_scale > 0.0 {
                    Ok(())
                } else {
                    Err(FlowError::InvalidFieldScale(field_scale))
                }
            }
            Projection::Screen => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    projection: Projection,
    extent: Vector2,
    /// Display units per simulation unit, y negative when flipped.
    scale: Vector2,
    center: Vector2,
}

impl CoordinateMapper {
    pub fn new(width: f64, height: f64, projection: Projection) -> Result<Self, FlowError> {
        let mut mapper = Self {
            projection,
            extent: Vector2::ONE,
            scale: Vector2::ONE,
            center: Vector2::ZERO,
        };
        mapper.recompute(width, height, projection)?;
        Ok(mapper)
    }

    /// Rebuilds `scale` and `center` for a new extent or projection.
    ///
    /// On error the mapper is left unchanged.
    pub fn recompute(
        &mut self,
        width: f64,
        height: f64,
        projection: Projection,
    ) -> Result<(), FlowError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(FlowError::InvalidDimensions);
        }
        projection.validate()?;
        let (scale, center) = match projection {
            Projection::Centered { field_scale } => {
                let s = width.min(height) / field_scale;
                (Vector2::new(s, -s), Vector2::new(width / 2.0, height / 2.0))
            }
            Projection::Screen => (Vector2::ONE, Vector2::ZERO),
        };
        self.projection = projection;
        self.extent = Vector2::new(width, height);
        self.scale = scale;
        self.center = center;
        Ok(())
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Display width and height.
    pub fn extent(&self) -> Vector2 {
        self.extent
    }

    pub fn scale(&self) -> Vector2 {
        self.scale
    }

    pub fn center(&self) -> Vector2 {
        self.center
    }

    pub fn to_simulation(&self, display: Vector2) -> Vector2 {
        (display - self.center) / self.scale
    }

    pub fn to_display(&self, simulation: Vector2) -> Vector2 {
        simulation * self.scale + self.center
    }

    /// Reorients a simulation-space direction into display axes without
    /// scaling it (flips y under a centred projection).
    pub fn orient(&self, v: Vector2) -> Vector2 {
        Vector2::new(v.x * self.scale.x.signum(), v.y * self.scale.y.signum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered(w: f64, h: f64, field_scale: f64) -> CoordinateMapper {
        CoordinateMapper::new(w, h, Projection::Centered { field_scale }).unwrap()
    }

    #[test]
    fn centre_of_display_is_origin() {
        let m = centered(800.0, 600.0, 20.0);
        assert_eq!(m.to_simulation(Vector2::new(400.0, 300.0)), Vector2::ZERO);
    }

    #[test]
    fn shorter_axis_spans_field_scale() {
        let m = centered(800.0, 600.0, 20.0);
        let top = m.to_simulation(Vector2::new(400.0, 0.0));
        let bottom = m.to_simulation(Vector2::new(400.0, 600.0));
        assert!((top.y - bottom.y - 20.0).abs() < 1e-12);
        assert!(top.y > 0.0, "y axis should point up");
    }

    #[test]
    fn screen_projection_is_identity() {
        let m = CoordinateMapper::new(640.0, 480.0, Projection::Screen).unwrap();
        let p = Vector2::new(12.5, 400.0);
        assert_eq!(m.to_simulation(p), p);
        assert_eq!(m.to_display(p), p);
        assert_eq!(m.orient(p), p);
    }

    #[test]
    fn orient_flips_y_under_centred_projection() {
        let m = centered(100.0, 100.0, 4.0);
        assert_eq!(m.orient(Vector2::new(1.0, 2.0)), Vector2::new(1.0, -2.0));
    }

    #[test]
    fn invalid_field_scale_is_rejected() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = CoordinateMapper::new(100.0, 100.0, Projection::Centered { field_scale: scale });
            assert!(matches!(err, Err(FlowError::InvalidFieldScale(_))), "{scale}");
        }
    }

    #[test]
    fn invalid_extent_is_rejected_and_state_kept() {
        let mut m = centered(800.0, 600.0, 20.0);
        let before = m;
        assert!(m
            .recompute(0.0, 600.0, Projection::Centered { field_scale: 20.0 })
            .is_err());
        assert_eq!(m, before);
    }

    #[test]
    fn recompute_changes_scale() {
        let mut m = centered(800.0, 600.0, 20.0);
        m.recompute(800.0, 600.0, Projection::Centered { field_scale: 10.0 })
            .unwrap();
        assert_eq!(m.scale(), Vector2::new(60.0, -60.0));
        assert_eq!(m.extent(), Vector2::new(800.0, 600.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn display_round_trip(
                w in 1.0f64..4000.0,
                h in 1.0f64..4000.0,
                field_scale in 0.01f64..1000.0,
                x in -5000.0f64..5000.0,
                y in -5000.0f64..5000.0,
            ) {
                let m = centered(w, h, field_scale);
                let p = Vector2::new(x, y);
                let back = m.to_display(m.to_simulation(p));
                prop_assert!((back - p).length() < 1e-9 * (1.0 + p.length()));
            }
        }
    }
}
