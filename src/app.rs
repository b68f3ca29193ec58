use crate::core::framebuffer::{Canvas, FrameBuffer};
use crate::io::config::Config;
use crate::io::image::save_frame;
use crate::pipeline::renderer::Renderer;
use crate::scene::loader::{background_colour, build_renderer, init_scene};
use crate::scene::texture::TextureMap;
use crate::ui::input::InputController;
use log::{debug, info};
use minifb::{Key, Window, WindowOptions};
use std::path::Path;
use std::time::Instant;

/// Runs the interactive window: poll input, clear, draw, present.
pub fn run_gui(config: Config) -> Result<(), String> {
    let width = config.render.width;
    let height = config.render.height;

    info!("Starting GUI mode ({}x{})...", width, height);
    info!(
        "Controls: A/D Space/LShift W/S=Move, Arrows [ ]=Rotate world, J/L U/O I/K=Rotate camera, \
         R=Look at origin, 1/2/3=Wireframe/Raster/Raytraced, Esc=Quit"
    );

    let mut window = Window::new(
        "Scanline Renderer",
        width,
        height,
        WindowOptions {
            resize: false,
            ..WindowOptions::default()
        },
    )
    .map_err(|e| format!("Failed to open window: {}", e))?;
    window.set_target_fps(60);

    let mut scene = init_scene(&config)?;
    let renderer = build_renderer(&config);
    let input = InputController::new(config.camera.translate_step, config.camera.rotate_step);
    let mut frame = FrameBuffer::new(width, height, background_colour(&config));

    let mut frame_count = 0;
    let mut last_fps_update = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        input.update(&window, &mut scene);

        let start = Instant::now();
        frame.clear_pixels();
        renderer.draw(&mut scene, &mut frame);
        debug!("Frame time: {:.2?}", start.elapsed());

        window
            .update_with_buffer(&frame.pixels, width, height)
            .map_err(|e| format!("Failed to present frame: {}", e))?;
        window.set_title(&format!("Scanline Renderer - {}", scene.render_mode()));

        frame_count += 1;
        if last_fps_update.elapsed().as_secs_f32() >= 2.0 {
            info!(
                "Average FPS: {:.1}",
                frame_count as f32 / last_fps_update.elapsed().as_secs_f32()
            );
            frame_count = 0;
            last_fps_update = Instant::now();
        }
    }
    Ok(())
}

/// Renders a single frame in the configured mode and saves it to `config.render.output`.
pub fn run_cli(config: Config) -> Result<(), String> {
    info!("Starting CLI mode...");
    let mut scene = init_scene(&config)?;
    let renderer = build_renderer(&config);
    let mut frame = FrameBuffer::new(
        config.render.width,
        config.render.height,
        background_colour(&config),
    );

    let start = Instant::now();
    renderer.draw(&mut scene, &mut frame);
    info!(
        "Render ({}) completed in {:.2?}",
        scene.render_mode(),
        start.elapsed()
    );

    save_frame(&frame, &config.render.output)?;
    info!("Done.");
    Ok(())
}

/// Draws a texture map unprocessed, for checking that an image loads as expected. Saves it
/// when `headless`, otherwise shows it until the window is closed.
pub fn show_texture(config: &Config, path: &Path, headless: bool) -> Result<(), String> {
    let texture = TextureMap::load(path)?;
    let renderer = Renderer::new();
    let mut frame = FrameBuffer::new(
        config.render.width,
        config.render.height,
        background_colour(config),
    );
    renderer.rasterizer.render_map(&mut frame, &texture);

    if headless {
        return save_frame(&frame, &config.render.output);
    }

    let mut window = Window::new(
        &format!("Texture - {}", path.display()),
        frame.width,
        frame.height,
        WindowOptions::default(),
    )
    .map_err(|e| format!("Failed to open window: {}", e))?;
    window.set_target_fps(30);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&frame.pixels, frame.width, frame.height)
            .map_err(|e| format!("Failed to present frame: {}", e))?;
    }
    Ok(())
}
