use crate::core::framebuffer::DepthBuffer;
use crate::io::obj_loader::load_geometry;
use crate::scene::camera::Camera;
use crate::scene::light::{PointLight, ShadingParams};
use crate::scene::material::{Material, MaterialLibrary};
use crate::scene::model::Model;
use crate::scene::scene_object::SceneObject;
use crate::scene::texture::TextureMap;
use log::info;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Selects the draw path used for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Wireframe,
    Raster,
    Raytraced,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wireframe" => Ok(Self::Wireframe),
            "raster" => Ok(Self::Raster),
            "raytraced" | "raytrace" => Ok(Self::Raytraced),
            other => Err(format!(
                "Unknown render mode '{}' (expected wireframe, raster or raytraced)",
                other
            )),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wireframe => "wireframe",
            Self::Raster => "raster",
            Self::Raytraced => "raytraced",
        };
        f.write_str(name)
    }
}

/// Everything a frame is rendered from: the camera, the light, the loaded objects with their
/// materials and textures, the depth buffer and the active render mode.
///
/// The renderer borrows a `Scene` for the duration of a draw call; input handling mutates the
/// camera and mode between frames.
pub struct Scene {
    pub camera: Camera,
    pub light: PointLight,
    pub shading: ShadingParams,
    pub objects: Vec<SceneObject>,
    pub materials: MaterialLibrary,
    /// Loaded texture maps keyed by file name.
    pub textures: HashMap<String, Arc<TextureMap>>,
    pub depth: DepthBuffer,
    render_mode: RenderMode,
}

impl Scene {
    pub fn new(camera: Camera, light: PointLight) -> Self {
        Self {
            camera,
            light,
            shading: ShadingParams::default(),
            objects: Vec::new(),
            materials: MaterialLibrary::default(),
            textures: HashMap::new(),
            depth: DepthBuffer::default(),
            render_mode: RenderMode::default(),
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if mode != self.render_mode {
            info!("Render mode: {}", mode);
        }
        self.render_mode = mode;
    }

    pub fn translate(&mut self, offset: &Vector3<f32>) {
        self.camera.translate(offset);
    }

    pub fn rotate_camera(&mut self, angles: &Vector3<f32>) {
        self.camera.rotate_camera(angles);
    }

    pub fn rotate_world(&mut self, angles: &Vector3<f32>) {
        self.camera.rotate_world(angles);
    }

    pub fn look_at(&mut self, target: &Point3<f32>) -> bool {
        self.camera.look_at(target)
    }

    pub fn add_material(&mut self, material: Material) {
        self.materials.add(material);
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// Loads an OBJ file and every material library it references.
    pub fn load_object<P: AsRef<Path>>(
        &mut self,
        path: P,
        load_scale: f32,
        draw_scale: f32,
    ) -> Result<(), String> {
        let data = load_geometry(path, load_scale, &mut self.textures)?;
        for material in data.materials {
            self.materials.add(material);
        }

        let model = Model::new(data.name, data.elements);
        info!(
            "Added '{}' ({} faces, draw scale {})",
            model.name,
            model.face_count(),
            draw_scale
        );
        self.objects.push(SceneObject::new(model, draw_scale));
        Ok(())
    }

    pub fn face_count(&self) -> usize {
        self.objects.iter().map(|o| o.model.face_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode_parsing() {
        assert_eq!("RASTER".parse::<RenderMode>(), Ok(RenderMode::Raster));
        assert_eq!("raytraced".parse::<RenderMode>(), Ok(RenderMode::Raytraced));
        assert!("shaded".parse::<RenderMode>().is_err());
        assert_eq!(RenderMode::Wireframe.to_string(), "wireframe");
    }

    #[test]
    fn test_camera_controls_forward_to_camera() {
        let mut scene = Scene::new(
            Camera::new(Point3::new(0.0, 0.0, 4.0), 2.0),
            PointLight::new(Point3::origin(), 1.0),
        );
        scene.translate(&Vector3::new(1.0, 0.0, 0.0));
        assert!((scene.camera.position().x - 1.0).abs() < 1e-5);

        scene.set_render_mode(RenderMode::Raytraced);
        assert_eq!(scene.render_mode(), RenderMode::Raytraced);
    }

    #[test]
    fn test_load_missing_object_leaves_scene_empty() {
        let mut scene = Scene::new(
            Camera::new(Point3::new(0.0, 0.0, 4.0), 2.0),
            PointLight::new(Point3::origin(), 1.0),
        );
        assert!(scene.load_object("missing.obj", 1.0, 1.0).is_err());
        assert!(scene.objects.is_empty());
    }
}
