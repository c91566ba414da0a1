//! Camera controls.

use crate::navigation::event::MouseDragSettings;
use pasture_core::math::AABB;
use pasture_core::nalgebra::{Matrix4, Rotation3, Vector2, Vector3, Vector4};

pub mod event;
pub mod orbit;

/// A navigation receives the user input events of a window and derives the
/// camera matrices for rendering from them.
pub trait Navigation {
    /// Called when the window size changes. Only the aspect ratio of the
    /// projection may change as a result, never the camera placement.
    fn on_window_resized(&mut self, w: f64, h: f64);

    /// Called when the user drags the mouse from `(x1, y1)` to `(x2, y2)`
    /// (logical pixels) with a button held down.
    fn on_drag(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, drag: MouseDragSettings);

    /// Called when the user scrolls, with the scroll amount in logical pixels.
    fn on_scroll(&mut self, d: f64);

    /// Recalculates and returns the current camera matrices.
    /// Called once before each frame.
    fn update(&mut self) -> Matrices;

    /// Moves the camera so that the given bounding box is fully visible.
    fn focus_on(&mut self, aabb: AABB<f64>);

    /// Places the camera exactly at `target + offset`, looking at `target`.
    fn focus_on_point(&mut self, target: Vector3<f64>, offset: Vector3<f64>);
}

/// The camera matrices, that define how the scene is projected onto the window.
///
/// The view matrix transforms homogeneous world space coordinates into camera
/// space. World space is right-handed with the y axis pointing up. The
/// projection matrix maps camera space to OpenGL clip coordinates, where every
/// axis ranges from -1.0 to 1.0 and z points into the screen. Window
/// coordinates are obtained from clip coordinates via
/// `x = (clip_x + 1.0) / 2.0 * window_size.x` and
/// `y = (1.0 - clip_y) / 2.0 * window_size.y`.
#[derive(Clone, PartialEq, Debug)]
pub struct Matrices {
    pub view_matrix: Matrix4<f64>,
    pub projection_matrix: Matrix4<f64>,
    pub view_matrix_inv: Matrix4<f64>,
    pub projection_matrix_inv: Matrix4<f64>,
    pub window_size: Vector2<f64>,
}

/// Camera position and orientation in world space, as displayed by the
/// telemetry overlay.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CameraPose {
    /// Position of the camera.
    pub position: Vector3<f64>,

    /// Orientation as euler angles (rotations around the world x, y and z
    /// axes, in radians).
    pub rotation: Vector3<f64>,
}

impl Matrices {
    /// Extracts the camera placement from the inverse view matrix.
    pub fn camera_pose(&self) -> CameraPose {
        let position_hom = self.view_matrix_inv * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let position = position_hom.xyz() / position_hom.w;

        let mut rotation_mat = Rotation3::from_matrix_unchecked(
            self.view_matrix_inv.fixed_view::<3, 3>(0, 0).into(),
        );
        rotation_mat.renormalize();
        let (x, y, z) = rotation_mat.euler_angles();

        CameraPose {
            position,
            rotation: Vector3::new(x, y, z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasture_core::nalgebra::Point3;

    #[test]
    fn camera_pose_position() {
        let view = Matrix4::look_at_rh(
            &Point3::new(4.0, 2.0, 1.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Vector3::y(),
        );
        let matrices = Matrices {
            view_matrix: view,
            view_matrix_inv: view.try_inverse().unwrap(),
            projection_matrix: Matrix4::identity(),
            projection_matrix_inv: Matrix4::identity(),
            window_size: Vector2::new(100.0, 100.0),
        };
        let pose = matrices.camera_pose();
        assert!((pose.position - Vector3::new(4.0, 2.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn camera_pose_rotation_of_identity_view() {
        let matrices = Matrices {
            view_matrix: Matrix4::identity(),
            view_matrix_inv: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
            projection_matrix_inv: Matrix4::identity(),
            window_size: Vector2::new(100.0, 100.0),
        };
        let pose = matrices.camera_pose();
        assert!(pose.rotation.norm() < 1e-9);
    }
}
