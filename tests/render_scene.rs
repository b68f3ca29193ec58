use nalgebra::Point3;
use scanline_renderer::app::run_cli;
use scanline_renderer::core::color::{Colour, pack, unpack};
use scanline_renderer::core::framebuffer::FrameBuffer;
use scanline_renderer::io::config::Config;
use scanline_renderer::pipeline::renderer::Renderer;
use scanline_renderer::scene::camera::Camera;
use scanline_renderer::scene::context::{RenderMode, Scene};
use scanline_renderer::scene::light::PointLight;
use std::fs;
use std::path::PathBuf;

const SIZE: usize = 128;
const DRAW_SCALE: f32 = 100.0;

fn background() -> u32 {
    pack(0, 0, 0, 255)
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("render-scene-{}-{}", tag, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Single triangle (0,0,0), (1,0,0), (0,1,0) with a flat red material.
fn write_red_triangle(dir: &PathBuf) -> PathBuf {
    let obj = dir.join("triangle.obj");
    fs::write(
        &obj,
        "mtllib triangle.mtl\no triangle\nusemtl Red\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
    )
    .unwrap();
    fs::write(dir.join("triangle.mtl"), "newmtl Red\nKd 1 0 0\n").unwrap();
    obj
}

fn scene_from(obj: &PathBuf, mode: RenderMode) -> Scene {
    let mut scene = Scene::new(
        Camera::new(Point3::new(0.0, 0.0, -5.0), 2.0),
        PointLight::new(Point3::new(0.2, 0.2, -2.0), 8.0),
    );
    scene.load_object(obj, 1.0, DRAW_SCALE).unwrap();
    assert!(scene.look_at(&Point3::origin()));
    scene.set_render_mode(mode);
    scene
}

/// Screen-space bounding box of the projected triangle, as inclusive pixel bounds.
fn projected_bounds(scene: &Scene) -> (usize, usize, usize, usize) {
    let corners = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ]
    .map(|p| scene.camera.project(&p, DRAW_SCALE, SIZE, SIZE));
    let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    (
        min_x.floor() as usize,
        max_x.floor() as usize,
        min_y.floor() as usize,
        max_y.floor() as usize,
    )
}

#[test]
fn test_raster_red_triangle_stays_in_bounds() {
    let dir = scratch_dir("raster");
    let obj = write_red_triangle(&dir);
    let mut scene = scene_from(&obj, RenderMode::Raster);
    let mut frame = FrameBuffer::new(SIZE, SIZE, background());

    Renderer::new().draw(&mut scene, &mut frame);

    let (x0, x1, y0, y1) = projected_bounds(&scene);
    assert!(x1 > x0 && y1 > y0);

    let red = Colour::new(255, 0, 0).pack(255);
    let mut red_inside = 0;
    for y in 0..SIZE {
        for x in 0..SIZE {
            let pixel = frame.get_pixel(x, y).unwrap();
            let inside = x + 1 >= x0 && x <= x1 + 1 && y + 1 >= y0 && y <= y1 + 1;
            if inside {
                if pixel == red {
                    red_inside += 1;
                }
            } else {
                assert_eq!(pixel, background(), "pixel ({}, {}) outside the triangle", x, y);
            }
        }
    }
    assert!(red_inside > 0);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_raytraced_triangle_is_lit_red() {
    let dir = scratch_dir("raytraced");
    let obj = write_red_triangle(&dir);
    let mut scene = scene_from(&obj, RenderMode::Raytraced);
    let mut frame = FrameBuffer::new(SIZE, SIZE, background());

    Renderer::new().draw(&mut scene, &mut frame);

    let lit: Vec<[u8; 4]> = frame
        .pixels
        .iter()
        .filter(|&&p| p != background())
        .map(|&p| unpack(p))
        .collect();
    assert!(!lit.is_empty());
    assert!(lit.iter().all(|[r, g, b, _]| *r > 0 && *g == 0 && *b == 0));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_textured_triangle_samples_texture() {
    let dir = scratch_dir("textured");
    let mut ppm = b"P6\n2 1\n255\n".to_vec();
    ppm.extend_from_slice(&[0, 0, 255, 0, 255, 0]);
    fs::write(dir.join("stripes.ppm"), ppm).unwrap();
    fs::write(dir.join("stripes.mtl"), "newmtl Stripes\nKd 1 1 1\nmap_Kd stripes.ppm\n").unwrap();
    let obj = dir.join("stripes.obj");
    fs::write(
        &obj,
        "mtllib stripes.mtl\no quad\nusemtl Stripes\n\
         v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n",
    )
    .unwrap();

    let mut scene = scene_from(&obj, RenderMode::Raster);
    assert_eq!(scene.textures.len(), 1);
    let mut frame = FrameBuffer::new(SIZE, SIZE, background());
    Renderer::new().draw(&mut scene, &mut frame);

    let blue = pack(0, 0, 255, 255);
    let green = pack(0, 255, 0, 255);
    assert!(frame.pixels.contains(&blue));
    assert!(frame.pixels.contains(&green));
    assert!(frame.pixels.iter().all(|&p| p == background() || p == blue || p == green));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_headless_render_writes_png() {
    let dir = scratch_dir("headless");
    let obj = write_red_triangle(&dir);
    let output = dir.join("frame.png");

    let config = Config::parse(&format!(
        r#"
        [render]
        width = 64
        height = 64
        mode = "raster"
        output = "{}"

        [camera]
        position = [0.0, 0.0, -5.0]
        look_at = [0.0, 0.0, 0.0]

        [[objects]]
        path = "{}"
        load_scale = 1.0
        draw_scale = 50.0
        "#,
        output.display(),
        obj.display()
    ))
    .unwrap();

    run_cli(config).unwrap();

    let image = image::open(&output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (64, 64));
    assert!(image.pixels().any(|p| p.0 == [255, 0, 0]));

    fs::remove_dir_all(&dir).ok();
}
