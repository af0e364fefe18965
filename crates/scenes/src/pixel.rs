//! Pure-computation pixel buffer conversion from a [`ScalarGrid`].
//!
//! This module is always available (no feature gate) so that hosts without
//! the `image` crate can still turn a trail density into pixels.

use flowfield_core::ScalarGrid;

/// Maps grid values to an RGBA8 grayscale buffer.
///
/// Each value `t` is clamped to [0, 1] and written as four bytes
/// (v, v, v, 255) with `v = round(t · 255)`. Non-finite values are black.
/// The buffer length is `width * height * 4`.
pub fn grid_to_rgba(grid: &ScalarGrid) -> Vec<u8> {
    grid.data()
        .iter()
        .flat_map(|&t| {
            let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
            let v = (t * 255.0).round() as u8;
            [v, v, v, 255u8]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_to_rgba_correct_length() {
        let grid = ScalarGrid::new(8, 4).unwrap();
        let buf = grid_to_rgba(&grid);
        assert_eq!(buf.len(), 8 * 4 * 4);
    }

    #[test]
    fn grid_to_rgba_alpha_always_255() {
        let grid = ScalarGrid::from_data(2, 2, vec![0.0, 0.3, 0.7, 1.0]).unwrap();
        let buf = grid_to_rgba(&grid);
        for (i, &byte) in buf.iter().enumerate() {
            if i % 4 == 3 {
                assert_eq!(byte, 255, "alpha at pixel {} should be 255", i / 4);
            }
        }
    }

    #[test]
    fn grid_to_rgba_clamps_and_blacks_out_nan() {
        let grid = ScalarGrid::from_data(4, 1, vec![-2.0, 0.5, 9.0, f64::NAN]).unwrap();
        let buf = grid_to_rgba(&grid);
        assert_eq!(&buf[0..4], &[0, 0, 0, 255]);
        assert_eq!(&buf[4..8], &[128, 128, 128, 255]);
        assert_eq!(&buf[8..12], &[255, 255, 255, 255]);
        assert_eq!(&buf[12..16], &[0, 0, 0, 255]);
    }
}
