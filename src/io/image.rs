use crate::core::color::unpack;
use crate::core::framebuffer::FrameBuffer;
use image::{ImageBuffer, Rgb, RgbImage};
use log::info;
use std::path::Path;

/// Converts a packed ARGB frame to an RGB image, dropping alpha.
pub fn frame_to_image(frame: &FrameBuffer) -> RgbImage {
    ImageBuffer::from_fn(frame.width as u32, frame.height as u32, |x, y| {
        let [r, g, b, _] = unpack(frame.pixels[y as usize * frame.width + x as usize]);
        Rgb([r, g, b])
    })
}

/// Saves a frame as an image; the format follows the file extension (PNG normally).
pub fn save_frame<P: AsRef<Path>>(frame: &FrameBuffer, path: P) -> Result<(), String> {
    let path = path.as_ref();
    frame_to_image(frame)
        .save(path)
        .map_err(|e| format!("Failed to save image to '{}': {}", path.display(), e))?;
    info!("Saved {}x{} frame to {}", frame.width, frame.height, path.display());
    Ok(())
}
