//! Raster loading for image-sampled fields.
//!
//! Feature-gated behind `png` together with [`crate::snapshot`].

use flowfield_core::error::FlowError;
use flowfield_core::ScalarGrid;
use std::path::Path;
use tracing::debug;

/// Colour channel a raster is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    #[default]
    Red,
    Green,
    Blue,
    /// Rec. 601 luma.
    Luma,
}

impl Channel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "red" | "r" => Some(Channel::Red),
            "green" | "g" => Some(Channel::Green),
            "blue" | "b" => Some(Channel::Blue),
            "luma" | "gray" => Some(Channel::Luma),
            _ => None,
        }
    }

    fn extract(self, [r, g, b, _]: [u8; 4]) -> u8 {
        match self {
            Channel::Red => r,
            Channel::Green => g,
            Channel::Blue => b,
            Channel::Luma => {
                let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
                y.round().clamp(0.0, 255.0) as u8
            }
        }
    }
}

/// Reads one channel of an RGBA8 buffer into a grid normalised to [0, 1].
pub fn grid_from_rgba(
    width: usize,
    height: usize,
    rgba: &[u8],
    channel: Channel,
) -> Result<ScalarGrid, FlowError> {
    let values: Vec<u8> = rgba
        .chunks_exact(4)
        .map(|px| channel.extract([px[0], px[1], px[2], px[3]]))
        .collect();
    ScalarGrid::from_channel(width, height, &values)
}

/// Loads an image file and extracts `channel`.
///
/// Returns `FlowError::Io` if the file cannot be opened or decoded.
pub fn load_raster(path: &Path, channel: Channel) -> Result<ScalarGrid, FlowError> {
    let img = image::open(path)
        .map_err(|e| FlowError::Io(format!("{}: {e}", path.display())))?
        .to_rgba8();
    let (w, h) = (img.width() as usize, img.height() as usize);
    let grid = grid_from_rgba(w, h, img.as_raw(), channel)?;
    debug!(path = %path.display(), width = w, height = h, ?channel, "raster loaded");
    Ok(grid)
}
