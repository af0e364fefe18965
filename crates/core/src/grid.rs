//! Two-dimensional scalar grid.
//!
//! A `ScalarGrid` stores `width * height` f64 values in row-major layout. It
//! backs image-sampled fields (a raster channel normalised to [0, 1]) and the
//! trail density buffer used by headless rendering. Unlike a toroidal
//! simulation lattice, reads outside the grid return 0.

use crate::error::FlowError;

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl ScalarGrid {
    /// Creates a zero-filled grid.
    ///
    /// Returns `FlowError::InvalidDimensions` if either dimension is zero or
    /// `width * height` overflows.
    pub fn new(width: usize, height: usize) -> Result<Self, FlowError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; len],
        })
    }

    /// Wraps a pre-built row-major buffer. Values are stored as given.
    pub fn from_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self, FlowError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(FlowError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a grid from one 8-bit channel, mapping 0..=255 onto [0, 1].
    pub fn from_channel(width: usize, height: usize, channel: &[u8]) -> Result<Self, FlowError> {
        let data = channel.iter().map(|&v| f64::from(v) / 255.0).collect();
        Self::from_data(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    fn index(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Value at integer `(x, y)`, or 0 outside the grid.
    pub fn get(&self, x: isize, y: isize) -> f64 {
        self.index(x, y).map_or(0.0, |i| self.data[i])
    }

    /// Adds `amount` at `(x, y)`. Out-of-range deposits are ignored.
    pub fn deposit(&mut self, x: isize, y: isize, amount: f64) {
        if let Some(i) = self.index(x, y) {
            self.data[i] += amount;
        }
    }

    /// Nearest-sample lookup at fractional grid coordinates (floored).
    pub fn sample_nearest(&self, x: f64, y: f64) -> f64 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }
        self.get(x.floor() as isize, y.floor() as isize)
    }

    /// Largest stored value, or 0 for an all-zero grid.
    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    /// Copy of the grid scaled so the maximum becomes 1. An all-zero grid is
    /// returned unchanged.
    pub fn normalized(&self) -> ScalarGrid {
        let max = self.max_value();
        if max <= 0.0 {
            return self.clone();
        }
        ScalarGrid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|v| (v / max).clamp(0.0, 1.0)).collect(),
        }
    }

    /// Iterates `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(|(i, &v)| (i % self.width, i / self.width, v))
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, FlowError> {
    if width == 0 || height == 0 {
        return Err(FlowError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(FlowError::InvalidDimensions)
}
