/// A pixel surface the rasterizer and ray tracer draw into.
///
/// Colours are packed ARGB words (see [`crate::core::color::pack`]).
pub trait Canvas {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn set_pixel_colour(&mut self, x: usize, y: usize, colour: u32);
    fn clear_pixels(&mut self);
}

/// An in-memory ARGB colour buffer, presented by the window loop or saved to disk.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
    background: u32,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, background: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width * height],
            background,
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<u32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }
}

impl Canvas for FrameBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn set_pixel_colour(&mut self, x: usize, y: usize, colour: u32) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.pixels[idx] = colour;
        }
    }

    fn clear_pixels(&mut self) {
        self.pixels.fill(self.background);
    }
}

/// Per-pixel record of the nearest surface drawn so far, as inverse depth.
///
/// Cleared to 0 (infinitely far) at the start of every raster frame; larger values are
/// nearer to the camera.
#[derive(Debug, Clone, Default)]
pub struct DepthBuffer {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Resizes if needed and resets every entry to 0.
    pub fn reset(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.values = vec![0.0; width * height];
        } else {
            self.values.fill(0.0);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.values[y * self.width + x])
    }

    /// Depth test and update.
    /// Returns true (and stores `inverse_depth`) when the sample is at least as near as the
    /// stored value.
    #[inline]
    pub fn test_and_update(&mut self, x: usize, y: usize, inverse_depth: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y * self.width + x;
        if self.values[idx] > inverse_depth {
            return false;
        }
        self.values[idx] = inverse_depth;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_clear_and_bounds() {
        let mut fb = FrameBuffer::new(4, 3, 0xFF00_0000);
        fb.set_pixel_colour(1, 2, 0xFFFF_FFFF);
        fb.set_pixel_colour(4, 0, 0xFFFF_FFFF);
        assert_eq!(fb.get_pixel(1, 2), Some(0xFFFF_FFFF));
        assert_eq!(fb.get_pixel(4, 0), None);
        fb.clear_pixels();
        assert!(fb.pixels.iter().all(|&p| p == 0xFF00_0000));
    }

    #[test]
    fn test_depth_nearer_wins() {
        let mut depth = DepthBuffer::new(2, 2);
        assert!(depth.test_and_update(0, 0, 0.5));
        assert!(!depth.test_and_update(0, 0, 0.25));
        assert!(depth.test_and_update(0, 0, 0.5));
        assert!(depth.test_and_update(0, 0, 0.75));
        assert_eq!(depth.get(0, 0), Some(0.75));

        depth.reset(2, 2);
        assert_eq!(depth.get(0, 0), Some(0.0));
    }
}
