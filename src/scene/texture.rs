use crate::core::color::pack;
use log::info;
use std::path::Path;

/// A decoded texture: packed ARGB pixels in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureMap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl TextureMap {
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Loads a pixel map from disk.
    ///
    /// Binary PPM (`P6`: magic line, `width height` line, max-value line, then RGB byte
    /// triplets) is the native format; anything else `image` can decode is accepted too.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref)
            .map_err(|e| format!("Failed to load texture '{}': {}", path_ref.display(), e))?
            .to_rgb8();

        let width = img.width() as usize;
        let height = img.height() as usize;
        let pixels = img
            .pixels()
            .map(|p| pack(p[0], p[1], p[2], 255))
            .collect();

        info!("Loaded texture: {:?} ({}x{})", path_ref, width, height);

        Ok(Self::new(width, height, pixels))
    }

    /// Nearest-texel lookup. Coordinates are in texel units and truncated; out-of-range
    /// coordinates are clamped to the border.
    pub fn texel(&self, x: f32, y: f32) -> u32 {
        if self.pixels.is_empty() {
            return 0;
        }
        let tx = (x.max(0.0) as usize).min(self.width - 1);
        let ty = (y.max(0.0) as usize).min(self.height - 1);
        self.pixels[ty * self.width + tx]
    }

    /// Looks up a `[0, 1]` texture coordinate.
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        self.texel(u * self.width as f32, v * self.height as f32)
    }
}
