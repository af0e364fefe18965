//! Closed-form planar ODE fields.
//!
//! Each catalog entry is a pair `(fx, fy)` written in label order, so
//! `|y,x|` is `dx/dt = y, dy/dt = x`. Slope-field entries `y'=f(x,y)` are
//! `(1, f)`. Switching the active equation is a plain value swap; particles
//! keep their positions and bend onto the new flow.

use super::FieldSource;
use crate::error::FlowError;
use crate::vector::Vector2;
use serde::{Deserialize, Serialize};

/// Named equation catalog plus a parametric linear system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Equation {
    SinYSinX,
    CosX2PlusY,
    X2Y2,
    Y2X2,
    X2MinusY2,
    XY,
    YX,
    YNegX,
    SlopeCosXY,
    SlopeXPlusY,
    SlopeSinXCosY,
    SlopeCosXY2,
    SlopeLogXLogY,
    SlopeTanXCosY,
    SlopeFourCosY,
    Pendulum,
    Oval,
    DampedDriven,
    LotkaVolterra,
    Spiral,
    DiamondsPeriodic,
    DiamondsSinks,
    RandomLinear,
    DoubleRotational,
    CircleAttractor,
    NonLinear1,
    VanDerPol,
    NonLinear2,
    SourceSink,
    Doublet,
    /// `(a·x + b·y, c·x + d·y)`.
    Linear { a: f64, b: f64, c: f64, d: f64 },
}

const CATALOG: &[(&str, Equation)] = &[
    ("|sin(y),sin(x)|", Equation::SinYSinX),
    ("|cos(x^2+y),x+y^2+1|", Equation::CosX2PlusY),
    ("|x^2,y^2|", Equation::X2Y2),
    ("|y^2,x^2|", Equation::Y2X2),
    ("|x^2-y^2,x+y|", Equation::X2MinusY2),
    ("|x,y|", Equation::XY),
    ("|y,x|", Equation::YX),
    ("|y,-x|", Equation::YNegX),
    ("y'=cos(xy)", Equation::SlopeCosXY),
    ("y'=x+y", Equation::SlopeXPlusY),
    ("y'=sin(x)cos(y)", Equation::SlopeSinXCosY),
    ("y'=cos(x)*y^2", Equation::SlopeCosXY2),
    ("y'=log(x)log(y)", Equation::SlopeLogXLogY),
    ("y'=tan(x)cos(y)", Equation::SlopeTanXCosY),
    ("y'=4cos(y)(1-y)", Equation::SlopeFourCosY),
    ("Pendulum", Equation::Pendulum),
    ("Oval", Equation::Oval),
    ("x''=-g*x'-sin(x)+F", Equation::DampedDriven),
    ("Lotka-Volterra", Equation::LotkaVolterra),
    ("Spiral", Equation::Spiral),
    ("Diamonds periodic", Equation::DiamondsPeriodic),
    ("Diamonds sinks", Equation::DiamondsSinks),
    ("Random linear", Equation::RandomLinear),
    ("Double rotational", Equation::DoubleRotational),
    ("Circle attractor", Equation::CircleAttractor),
    ("Non Linear 1", Equation::NonLinear1),
    ("van der Pol", Equation::VanDerPol),
    ("Non Linear 2", Equation::NonLinear2),
    ("Source & Sink", Equation::SourceSink),
    ("Doublet", Equation::Doublet),
];

impl Equation {
    /// Looks up a catalog entry by its display name.
    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        CATALOG
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, e)| *e)
            .ok_or_else(|| FlowError::UnknownEquation(name.to_string()))
    }

    /// Display names of every catalog entry, in menu order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        CATALOG.iter().map(|(n, _)| *n)
    }

    /// Display name; `"linear"` for the parametric system.
    pub fn name(&self) -> &'static str {
        CATALOG
            .iter()
            .find(|(_, e)| e == self)
            .map_or("linear", |(n, _)| *n)
    }

    /// Evaluates `(fx, fy)` at `(x, y)`. `seed` only affects `RandomLinear`.
    pub fn eval(&self, x: f64, y: f64, seed: u64) -> (f64, f64) {
        match *self {
            Equation::SinYSinX => (y.sin(), x.sin()),
            Equation::CosX2PlusY => ((x * x + y).cos(), x + y * y + 1.0),
            Equation::X2Y2 => (x * x, y * y),
            Equation::Y2X2 => (y * y, x * x),
            Equation::X2MinusY2 => (x * x - y * y, x + y),
            Equation::XY => (x, y),
            Equation::YX => (y, x),
            Equation::YNegX => (y, -x),
            Equation::SlopeCosXY => (1.0, (x * y).cos()),
            Equation::SlopeXPlusY => (1.0, x + y),
            Equation::SlopeSinXCosY => (1.0, x.sin() * y.cos()),
            Equation::SlopeCosXY2 => (1.0, x.cos() * y * y),
            Equation::SlopeLogXLogY => (1.0, x.abs().ln() * y.abs().ln()),
            Equation::SlopeTanXCosY => (1.0, x.tan() * y.cos()),
            Equation::SlopeFourCosY => (1.0, 4.0 * y.cos() * (1.0 - y)),
            Equation::Pendulum => (y, -x.sin()),
            Equation::Oval => (y, -2.0 * x),
            Equation::DampedDriven => (1.5 * y, -y - (1.5 * x).sin() + 0.7),
            Equation::LotkaVolterra => (x * (1.0 - y), -y * (1.0 - x)),
            Equation::Spiral => (y, -x - y),
            Equation::DiamondsPeriodic => (y.cos(), x.sin()),
            Equation::DiamondsSinks => (y.sin() * x.cos(), x.sin() * y.cos()),
            Equation::RandomLinear => (
                hash_unit(x, y, seed),
                hash_unit(x, y, seed ^ 0x9E37_79B9_7F4A_7C15),
            ),
            Equation::DoubleRotational => {
                let (x, y) = (x / 4.0, y / 4.0);
                (y, x - x * x * x)
            }
            Equation::CircleAttractor => {
                let (x, y) = (x / 5.0, y / 5.0);
                let r2 = x * x + y * y;
                (x - y - x * r2, x + y - y * r2)
            }
            Equation::NonLinear1 => (x * (5.0 - x) - y * x, y * (x - 1.0)),
            Equation::VanDerPol => {
                const MU: f64 = 0.7;
                const GAIN: f64 = 0.6;
                (
                    GAIN * MU * y,
                    GAIN * (-(MU * MU * x * x - 1.0) * MU * y - MU * x),
                )
            }
            Equation::NonLinear2 => (x * (y - 1.0), 4.0 - x * x - y * y),
            Equation::SourceSink => {
                let (hx, hy) = (0.5 * x, 0.5 * y);
                (hx * hx - hy * hy - 1.0, 2.0 * hx * hy)
            }
            Equation::Doublet => {
                let (hx, hy) = (0.5 * x, 0.5 * y);
                let (hx2, hy2) = (hx * hx, hy * hy);
                let denom = (hx2 + hy2).powi(2);
                (
                    (hx2 * hx2 + hx2 * (2.0 * hy2 - 1.0) + hy2 * hy2 + hy2) / denom,
                    -(2.0 * hx * hy) / denom,
                )
            }
            Equation::Linear { a, b, c, d } => (a * x + b * y, c * x + d * y),
        }
    }
}

/// Deterministic hash of a position into [0, 1).
fn hash_unit(x: f64, y: f64, seed: u64) -> f64 {
    let mut h = seed
        ^ x.to_bits().wrapping_mul(0xBF58_476D_1CE4_E5B9)
        ^ y.to_bits().rotate_left(29).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;
    (h >> 11) as f64 / (1u64 << 53) as f64
}

/// Field backed by a catalog [`Equation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquationField {
    equation: Equation,
    seed: u64,
}

impl EquationField {
    pub fn new(equation: Equation, seed: u64) -> Self {
        Self { equation, seed }
    }

    pub fn equation(&self) -> Equation {
        self.equation
    }

    pub fn set_equation(&mut self, equation: Equation) {
        self.equation = equation;
    }
}

impl FieldSource for EquationField {
    fn evaluate(&self, position: Vector2, _time: f64) -> Vector2 {
        let (fx, fy) = self.equation.eval(position.x, position.y, self.seed);
        Vector2::new(fx, fy)
    }
}
