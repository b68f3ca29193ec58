use serde::Deserialize;
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            objects: default_objects(),
        }
    }
}

fn default_objects() -> Vec<ObjectConfig> {
    vec![ObjectConfig {
        path: "models/cornell-box.obj".to_string(),
        load_scale: default_load_scale(),
        draw_scale: default_draw_scale(),
    }]
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    /// "wireframe", "raster" or "raytraced".
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    #[serde(default = "default_wire_colour")]
    pub wire_colour: [u8; 3],
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_near_plane")]
    pub near_plane: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            mode: default_mode(),
            background: default_background(),
            wire_colour: default_wire_colour(),
            output: default_output(),
            near_plane: default_near_plane(),
        }
    }
}

fn default_width() -> usize {
    512
}
fn default_height() -> usize {
    512
}
fn default_mode() -> String {
    "wireframe".to_string()
}
fn default_background() -> [u8; 3] {
    [0, 0, 0]
}
fn default_wire_colour() -> [u8; 3] {
    [255, 255, 255]
}
fn default_output() -> String {
    "output.png".to_string()
}
fn default_near_plane() -> f32 {
    0.1
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default = "default_focal_length")]
    pub focal_length: f32,
    /// Optional target the camera is turned towards at start-up.
    #[serde(default)]
    pub look_at: Option<[f32; 3]>,
    #[serde(default = "default_translate_step")]
    pub translate_step: f32,
    /// Radians per key press.
    #[serde(default = "default_rotate_step")]
    pub rotate_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            focal_length: default_focal_length(),
            look_at: None,
            translate_step: default_translate_step(),
            rotate_step: default_rotate_step(),
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 0.0, 4.0]
}
fn default_focal_length() -> f32 {
    2.0
}
fn default_translate_step() -> f32 {
    0.05
}
fn default_rotate_step() -> f32 {
    PI / 100.0
}

#[derive(Debug, Deserialize)]
pub struct LightConfig {
    #[serde(default = "default_light_position")]
    pub position: [f32; 3],
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default = "default_ambient")]
    pub ambient: f32,
    #[serde(default = "default_specular_power")]
    pub specular_power: f32,
    #[serde(default = "default_specular_cull")]
    pub specular_cull: f32,
    #[serde(default = "default_shadow_epsilon")]
    pub shadow_epsilon: f32,
    /// Horizontal field of view of the ray tracer, in degrees. When unset, primary rays use
    /// the camera projection so ray-traced and rasterized frames line up.
    #[serde(default)]
    pub field_of_view: Option<f32>,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: default_light_position(),
            intensity: default_intensity(),
            ambient: default_ambient(),
            specular_power: default_specular_power(),
            specular_cull: default_specular_cull(),
            shadow_epsilon: default_shadow_epsilon(),
            field_of_view: None,
        }
    }
}

fn default_light_position() -> [f32; 3] {
    [0.0, 0.4, 0.2]
}
fn default_intensity() -> f32 {
    8.0
}
fn default_ambient() -> f32 {
    0.2
}
fn default_specular_power() -> f32 {
    8.0
}
fn default_specular_cull() -> f32 {
    0.4
}
fn default_shadow_epsilon() -> f32 {
    0.01
}

#[derive(Debug, Deserialize)]
pub struct ObjectConfig {
    pub path: String,
    /// Multiplier applied to every vertex position while loading.
    #[serde(default = "default_load_scale")]
    pub load_scale: f32,
    /// Pixel scale used when projecting this object.
    #[serde(default = "default_draw_scale")]
    pub draw_scale: f32,
}

fn default_load_scale() -> f32 {
    0.17
}
fn default_draw_scale() -> f32 {
    250.0
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}
