use crate::core::color::{Colour, pack};
use crate::io::config::Config;
use crate::pipeline::raytracer::RayTracer;
use crate::pipeline::renderer::Renderer;
use crate::scene::camera::Camera;
use crate::scene::context::{RenderMode, Scene};
use crate::scene::light::{PointLight, ShadingParams};
use log::{info, warn};
use nalgebra::Point3;

/// Builds the light and shading terms from the `[light]` section.
pub fn build_light_from_config(config: &Config) -> (PointLight, ShadingParams) {
    let l = &config.light;
    let light = PointLight::new(Point3::from(l.position), l.intensity);
    let shading = ShadingParams {
        ambient: l.ambient,
        specular_power: l.specular_power,
        specular_cull: l.specular_cull,
        shadow_epsilon: l.shadow_epsilon,
    };
    (light, shading)
}

/// Builds the draw dispatcher from the `[render]` and `[light]` sections.
pub fn build_renderer(config: &Config) -> Renderer {
    let mut renderer = Renderer::new();
    renderer.wire_colour = Colour::from(config.render.wire_colour);
    renderer.near_plane = config.render.near_plane;
    renderer.raytracer = RayTracer::new(config.light.field_of_view);
    renderer
}

/// Packed background colour from the `[render]` section.
pub fn background_colour(config: &Config) -> u32 {
    let [r, g, b] = config.render.background;
    pack(r, g, b, 255)
}

/// Creates the scene: camera, light, render mode, then every configured object with its
/// materials and textures. Any object failing to load aborts the whole scene.
pub fn init_scene(config: &Config) -> Result<Scene, String> {
    let camera = Camera::new(
        Point3::from(config.camera.position),
        config.camera.focal_length,
    );
    let (light, shading) = build_light_from_config(config);

    let mut scene = Scene::new(camera, light);
    scene.shading = shading;
    scene.set_render_mode(config.render.mode.parse::<RenderMode>()?);

    for obj_conf in &config.objects {
        scene
            .load_object(&obj_conf.path, obj_conf.load_scale, obj_conf.draw_scale)
            .map_err(|e| format!("Error loading model '{}': {}", obj_conf.path, e))?;
    }

    if let Some(target) = config.camera.look_at
        && !scene.look_at(&Point3::from(target))
    {
        warn!("Initial lookAt target {:?} ignored", target);
    }

    info!(
        "Scene initialized with {} objects, {} faces, {} materials, {} textures.",
        scene.objects.len(),
        scene.face_count(),
        scene.materials.len(),
        scene.textures.len()
    );

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_without_objects() {
        let config = Config::parse(
            r#"
            objects = []

            [render]
            mode = "raytraced"
            wire_colour = [0, 255, 0]

            [camera]
            position = [0.0, 0.0, -5.0]
            look_at = [0.0, 0.0, 0.0]

            [light]
            ambient = 0.3
            field_of_view = 60.0
            "#,
        )
        .unwrap();

        let scene = init_scene(&config).unwrap();
        assert!(scene.objects.is_empty());
        assert_eq!(scene.render_mode(), RenderMode::Raytraced);
        assert_eq!(scene.shading.ambient, 0.3);
        let origin = scene.camera.to_camera_space(&Point3::origin());
        assert!(origin.x.abs() < 1e-5 && (origin.z + 5.0).abs() < 1e-5);

        let renderer = build_renderer(&config);
        assert_eq!(renderer.wire_colour, Colour::new(0, 255, 0));
        assert_eq!(renderer.raytracer.field_of_view, Some(60.0));
        assert_eq!(background_colour(&config), 0xFF00_0000);
    }

    #[test]
    fn test_bad_mode_is_error() {
        let config = Config::parse("objects = []\n[render]\nmode = \"shaded\"").unwrap();
        assert!(init_scene(&config).is_err());
    }

    #[test]
    fn test_missing_object_is_error() {
        let config = Config::parse("[[objects]]\npath = \"does/not/exist.obj\"").unwrap();
        let err = init_scene(&config).err().unwrap();
        assert!(err.contains("does/not/exist.obj"));
    }
}
