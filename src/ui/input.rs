use crate::scene::context::{RenderMode, Scene};
use log::info;
use minifb::{Key, KeyRepeat, Window};
use nalgebra::{Point3, Vector3};

/// A camera or render-mode change triggered by one key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Move the camera along world axes.
    Translate(Vector3<f32>),
    /// Rotate the world about its origin.
    RotateWorld(Vector3<f32>),
    /// Turn the camera about its own origin.
    RotateCamera(Vector3<f32>),
    LookAtOrigin,
    SetMode(RenderMode),
}

/// Maps key presses to scene controls.
///
/// A/D, Space/LeftShift and W/S translate along x, y and z. Arrow keys and `[`/`]` rotate
/// the world; J/L, U/O and I/K rotate the camera. R looks at the origin and 1/2/3 select
/// the render mode.
pub struct InputController {
    pub translate_step: f32,
    /// Radians per press.
    pub rotate_step: f32,
}

impl InputController {
    pub fn new(translate_step: f32, rotate_step: f32) -> Self {
        Self {
            translate_step,
            rotate_step,
        }
    }

    pub fn action_for_key(&self, key: Key) -> Option<InputAction> {
        let t = self.translate_step;
        let r = self.rotate_step;
        let action = match key {
            Key::A => InputAction::Translate(Vector3::new(-t, 0.0, 0.0)),
            Key::D => InputAction::Translate(Vector3::new(t, 0.0, 0.0)),
            Key::LeftShift => InputAction::Translate(Vector3::new(0.0, -t, 0.0)),
            Key::Space => InputAction::Translate(Vector3::new(0.0, t, 0.0)),
            Key::W => InputAction::Translate(Vector3::new(0.0, 0.0, -t)),
            Key::S => InputAction::Translate(Vector3::new(0.0, 0.0, t)),

            Key::Up => InputAction::RotateWorld(Vector3::new(-r, 0.0, 0.0)),
            Key::Down => InputAction::RotateWorld(Vector3::new(r, 0.0, 0.0)),
            Key::Left => InputAction::RotateWorld(Vector3::new(0.0, -r, 0.0)),
            Key::Right => InputAction::RotateWorld(Vector3::new(0.0, r, 0.0)),
            Key::LeftBracket => InputAction::RotateWorld(Vector3::new(0.0, 0.0, -r)),
            Key::RightBracket => InputAction::RotateWorld(Vector3::new(0.0, 0.0, r)),

            Key::J => InputAction::RotateCamera(Vector3::new(-r, 0.0, 0.0)),
            Key::L => InputAction::RotateCamera(Vector3::new(r, 0.0, 0.0)),
            Key::U => InputAction::RotateCamera(Vector3::new(0.0, -r, 0.0)),
            Key::O => InputAction::RotateCamera(Vector3::new(0.0, r, 0.0)),
            Key::I => InputAction::RotateCamera(Vector3::new(0.0, 0.0, -r)),
            Key::K => InputAction::RotateCamera(Vector3::new(0.0, 0.0, r)),

            Key::R => InputAction::LookAtOrigin,
            Key::Key1 => InputAction::SetMode(RenderMode::Wireframe),
            Key::Key2 => InputAction::SetMode(RenderMode::Raster),
            Key::Key3 => InputAction::SetMode(RenderMode::Raytraced),
            _ => return None,
        };
        Some(action)
    }

    pub fn apply(&self, action: InputAction, scene: &mut Scene) {
        match action {
            InputAction::Translate(v) => scene.translate(&v),
            InputAction::RotateWorld(r) => scene.rotate_world(&r),
            InputAction::RotateCamera(r) => scene.rotate_camera(&r),
            InputAction::LookAtOrigin => {
                if scene.look_at(&Point3::origin()) {
                    info!("Camera reset to look at the origin");
                }
            }
            InputAction::SetMode(mode) => scene.set_render_mode(mode),
        }
    }

    /// Applies every key pressed since the last frame. Returns how many actions ran.
    pub fn update(&self, window: &Window, scene: &mut Scene) -> usize {
        let mut applied = 0;
        for key in window.get_keys_pressed(KeyRepeat::Yes) {
            if let Some(action) = self.action_for_key(key) {
                self.apply(action, scene);
                applied += 1;
            }
        }
        applied
    }
}
