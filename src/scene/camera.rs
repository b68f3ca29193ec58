use crate::core::geometry::CanvasPoint;
use crate::core::math::transform::{
    TransformFactory, is_finite_matrix, rotation_block, transform_point,
};
use log::warn;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Pinhole camera: a world-to-camera view matrix plus a focal length.
///
/// Camera space is right-handed with the camera at the origin looking down -Z and +Y up.
/// Screen space has its origin in the top-left corner with +Y pointing down.
#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Matrix4<f32>,
    pub focal_length: f32,
}

impl Camera {
    /// Camera at `position` looking down the world -Z axis.
    pub fn new(position: Point3<f32>, focal_length: f32) -> Self {
        Self {
            view_matrix: TransformFactory::translation(&-position.coords),
            focal_length,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    /// World-to-camera rotation.
    pub fn rotation(&self) -> Matrix3<f32> {
        rotation_block(&self.view_matrix)
    }

    /// Camera origin in world space.
    pub fn position(&self) -> Point3<f32> {
        let translation = self.view_matrix.fixed_view::<3, 1>(0, 3).into_owned();
        Point3::from(-(self.rotation().transpose() * translation))
    }

    pub fn to_camera_space(&self, point: &Point3<f32>) -> Point3<f32> {
        transform_point(&self.view_matrix, point)
    }

    /// Rotates a camera-space direction into world space.
    pub fn direction_to_world(&self, direction: &Vector3<f32>) -> Vector3<f32> {
        self.rotation().transpose() * direction
    }

    /// Projects a world-space point onto a `width` x `height` canvas.
    ///
    /// The result carries `1/z` as depth, where `z` is the distance in front of the camera.
    /// Points on the camera plane produce non-finite coordinates; points behind it produce
    /// a negative depth.
    pub fn project(
        &self,
        point: &Point3<f32>,
        draw_scale: f32,
        width: usize,
        height: usize,
    ) -> CanvasPoint {
        let p = self.to_camera_space(point);
        let distance = -p.z;
        let scale = self.focal_length * draw_scale;
        CanvasPoint::new(
            scale * (p.x / distance) + (width / 2) as f32,
            -scale * (p.y / distance) + (height / 2) as f32,
            1.0 / distance,
        )
    }

    /// Moves the camera by `offset`, given in world axes.
    pub fn translate(&mut self, offset: &Vector3<f32>) {
        self.view_matrix *= TransformFactory::translation(&-offset);
    }

    /// Turns the camera about its own origin. Angles in radians, applied X, then Y, then Z.
    pub fn rotate_camera(&mut self, angles: &Vector3<f32>) {
        self.view_matrix = TransformFactory::rotation_xyz(angles) * self.view_matrix;
    }

    /// Rotates the world about the world origin, as seen from the camera.
    pub fn rotate_world(&mut self, angles: &Vector3<f32>) {
        let pivot = self.to_camera_space(&Point3::origin()).coords;
        self.view_matrix = TransformFactory::translation(&pivot)
            * TransformFactory::rotation_xyz(angles)
            * TransformFactory::translation(&-pivot)
            * self.view_matrix;
    }

    /// Points the camera at `target` without moving it, keeping world +Y as up.
    ///
    /// Returns false and leaves the camera unchanged when the basis is degenerate
    /// (target at the camera position, or straight above or below it).
    pub fn look_at(&mut self, target: &Point3<f32>) -> bool {
        let view = TransformFactory::view(&self.position(), target, &Vector3::y());
        if !is_finite_matrix(&view) {
            warn!("Ignoring lookAt({:?}): degenerate camera basis", target);
            return false;
        }
        self.view_matrix = view;
        true
    }
}
