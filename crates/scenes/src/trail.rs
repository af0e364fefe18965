//! Headless trail accumulation.
//!
//! A [`TrailCanvas`] stands in for an on-screen renderer: it rasterises the
//! drawable segments of each [`Frame`] into a density grid, one unit per
//! covered pixel. Stroke width is approximated by a square stamp.

use flowfield_core::error::FlowError;
use flowfield_core::{Frame, ScalarGrid, TrailSegment, Vector2};

/// Segments longer than this (in pixels) are skipped as re-projection jumps.
const MAX_SEGMENT_LENGTH: f64 = 4096.0;

pub struct TrailCanvas {
    density: ScalarGrid,
    segments_drawn: usize,
    frames_suppressed: usize,
}

impl TrailCanvas {
    pub fn new(width: usize, height: usize) -> Result<Self, FlowError> {
        Ok(Self {
            density: ScalarGrid::new(width, height)?,
            segments_drawn: 0,
            frames_suppressed: 0,
        })
    }

    pub fn density(&self) -> &ScalarGrid {
        &self.density
    }

    pub fn segments_drawn(&self) -> usize {
        self.segments_drawn
    }

    /// Frames whose trails were withheld because the mapping changed.
    pub fn frames_suppressed(&self) -> usize {
        self.frames_suppressed
    }

    /// Draws every drawable segment of `frame`.
    pub fn draw_frame(&mut self, frame: &Frame) {
        if frame.suppress_draw {
            self.frames_suppressed += 1;
            return;
        }
        for segment in frame.drawable() {
            self.draw_segment(segment);
        }
    }

    /// Rasterises one segment with uniform steps of at most one pixel.
    pub fn draw_segment(&mut self, segment: &TrailSegment) {
        let delta = segment.to - segment.from;
        let length = delta.length();
        if !length.is_finite() || length > MAX_SEGMENT_LENGTH {
            return;
        }
        let steps = length.ceil().max(1.0) as usize;
        let radius = (segment.size / 2.0).floor().max(0.0) as isize;
        for i in 0..=steps {
            let p = segment.from + delta * (i as f64 / steps as f64);
            self.stamp(p, radius);
        }
        self.segments_drawn += 1;
    }

    fn stamp(&mut self, p: Vector2, radius: isize) {
        let (cx, cy) = (p.x.floor() as isize, p.y.floor() as isize);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                self.density.deposit(cx + dx, cy + dy, 1.0);
            }
        }
    }

    pub fn clear(&mut self) {
        let (w, h) = (self.density.width(), self.density.height());
        if let Ok(grid) = ScalarGrid::new(w, h) {
            self.density = grid;
        }
        self.segments_drawn = 0;
        self.frames_suppressed = 0;
    }
}
