//! CPU-side PNG rendering of a trail density.
//!
//! This module is feature-gated behind `png` (default on) so that embedders
//! can depend on the `scenes` crate without pulling in the `image` crate.
//! The pixel buffer conversion itself lives in [`crate::pixel`] (always available).

use flowfield_core::error::FlowError;
use flowfield_core::ScalarGrid;
use std::path::Path;

use crate::pixel::grid_to_rgba;

/// Writes a grid as a grayscale PNG, scaled so its maximum is white.
///
/// Returns `FlowError::InvalidDimensions` if the grid dimensions overflow
/// `u32`, or `FlowError::Io` on write failure.
pub fn write_png(grid: &ScalarGrid, path: &Path) -> Result<(), FlowError> {
    let rgba = grid_to_rgba(&grid.normalized());
    let w = u32::try_from(grid.width()).map_err(|_| FlowError::InvalidDimensions)?;
    let h = u32::try_from(grid.height()).map_err(|_| FlowError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| FlowError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FlowError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::TrailCanvas;
    use crate::SceneKind;
    use serde_json::json;

    #[test]
    fn write_png_round_trip() {
        let grid = ScalarGrid::from_data(2, 1, vec![2.0, 4.0]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");

        write_png(&grid, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 1);
        assert_eq!(img.get_pixel(0, 0).0, [128, 128, 128, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn scene_run_produces_visible_trails() {
        let mut sim = SceneKind::build("electric", 120, 90, 5, &json!({})).unwrap();
        let mut canvas = TrailCanvas::new(120, 90).unwrap();
        for _ in 0..30 {
            let frame = sim.tick(60.0);
            canvas.draw_frame(&frame);
        }
        assert!(canvas.segments_drawn() > 0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("electric.png");
        write_png(canvas.density(), &path).unwrap();
        let img = image::open(&path).unwrap().to_rgba8();
        assert!(img.pixels().any(|p| p.0[0] > 0));
    }

    #[test]
    fn write_png_bad_directory_is_io_error() {
        let grid = ScalarGrid::new(2, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(write_png(&grid, &path), Err(FlowError::Io(_))));
    }
}
