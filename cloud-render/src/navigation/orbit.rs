//! An orbit-style navigation.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::navigation::event::{MouseButton, MouseDragSettings};
use crate::navigation::{Matrices, Navigation};
use pasture_core::math::AABB;
use pasture_core::nalgebra::{Matrix4, Point3, Vector2, Vector3};

/// Vertical field of view of the camera.
const FIELD_OF_VIEW_Y: f64 = 75.0 / 180.0 * PI;

/// Keep the pitch at least one degree away from the poles, where the view
/// matrix would degenerate.
const MAX_PITCH: f64 = FRAC_PI_2 - PI / 180.0;

/// A navigation where the camera orbits around a focus point.
///
/// Dragging with the left mouse button rotates the camera around the focus
/// point, dragging with the right (or middle) button pans the focus point in
/// the view plane, and the mouse wheel moves the camera closer to or further
/// away from it. The world y axis points up.
pub struct OrbitNavigation {
    /// size of the window in (scaled) pixels
    window_size: Vector2<f64>,

    /// world space point, that the camera orbits around and looks at.
    focus: Vector3<f64>,

    /// log2 of the distance between camera and focus point.
    log_distance: f64,

    /// Rotation of the camera around the world y axis.
    yaw: f64,

    /// How much the camera looks down onto the focus point (positive values)
    /// or up at it (negative values). Kept strictly between -90 and 90 degrees.
    pitch: f64,

    view_matrix: Matrix4<f64>,
    projection_matrix: Matrix4<f64>,
    view_matrix_inv: Matrix4<f64>,
    projection_matrix_inv: Matrix4<f64>,
}

impl OrbitNavigation {
    pub fn new() -> Self {
        let mut nav = OrbitNavigation {
            window_size: Vector2::new(1.0, 1.0),
            focus: Vector3::zeros(),
            log_distance: 2.0,
            yaw: PI / 4.0,
            pitch: PI / 8.0,
            view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
            view_matrix_inv: Matrix4::identity(),
            projection_matrix_inv: Matrix4::identity(),
        };
        nav.update();
        nav
    }

    fn distance(&self) -> f64 {
        2.0_f64.powf(self.log_distance)
    }

    /// Offset from the focus point to the camera, for the current orbit state.
    fn camera_offset(&self) -> Vector3<f64> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vector3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch) * self.distance()
    }

    /// The camera "right" direction in world space.
    fn right(&self) -> Vector3<f64> {
        Vector3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// The camera "up" direction in world space.
    fn up(&self) -> Vector3<f64> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vector3::new(-sin_yaw * sin_pitch, cos_pitch, -cos_yaw * sin_pitch)
    }

    /// How far (in world units) a point at the focus distance moves per
    /// logical pixel of cursor movement.
    fn world_units_per_pixel(&self) -> f64 {
        2.0 * self.distance() * (FIELD_OF_VIEW_Y / 2.0).tan() / self.window_size.y
    }

    fn min_render_distance(&self) -> f64 {
        self.distance() * 0.005
    }

    fn max_render_distance(&self) -> f64 {
        self.distance() * 5000.0
    }
}

impl Navigation for OrbitNavigation {
    fn on_window_resized(&mut self, w: f64, h: f64) {
        self.window_size.x = w;
        self.window_size.y = h;
    }

    fn on_drag(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, drag: MouseDragSettings) {
        match drag.button {
            MouseButton::Left => {
                self.yaw += (x1 - x2) * 0.01;
                self.pitch = (self.pitch + (y2 - y1) * 0.01).clamp(-MAX_PITCH, MAX_PITCH);
            }
            MouseButton::Middle | MouseButton::Right => {
                let scale = self.world_units_per_pixel();
                self.focus += self.right() * (x1 - x2) * scale;
                self.focus += self.up() * (y2 - y1) * scale;
            }
            MouseButton::Other => {}
        }
    }

    fn on_scroll(&mut self, d: f64) {
        self.log_distance -= d * 0.005;
    }

    fn update(&mut self) -> Matrices {
        let camera_position = self.focus + self.camera_offset();

        self.view_matrix = Matrix4::look_at_rh(
            &Point3::from(camera_position),
            &Point3::from(self.focus),
            &Vector3::y(),
        );
        self.view_matrix_inv = self.view_matrix.try_inverse().unwrap(); // the view matrix is always invertible

        self.projection_matrix = Matrix4::new_perspective(
            self.window_size.x / self.window_size.y,
            FIELD_OF_VIEW_Y,
            self.min_render_distance(),
            self.max_render_distance(),
        );
        self.projection_matrix_inv = self.projection_matrix.try_inverse().unwrap(); // same

        Matrices {
            view_matrix: self.view_matrix,
            projection_matrix: self.projection_matrix,
            view_matrix_inv: self.view_matrix_inv,
            projection_matrix_inv: self.projection_matrix_inv,
            window_size: self.window_size,
        }
    }

    fn focus_on(&mut self, aabb: AABB<f64>) {
        self.focus = aabb.center().coords;

        // distance at which the bounding sphere of the aabb fills the
        // vertical field of view
        let radius = (aabb.max() - aabb.min()).norm() / 2.0;
        if radius > 0.0 {
            self.log_distance = (radius / (FIELD_OF_VIEW_Y / 2.0).sin()).log2();
        }
        self.update();
    }

    fn focus_on_point(&mut self, target: Vector3<f64>, offset: Vector3<f64>) {
        self.focus = target;
        let distance = offset.norm();
        if distance > f64::EPSILON {
            self.log_distance = distance.log2();
            self.pitch = (offset.y / distance).asin().clamp(-MAX_PITCH, MAX_PITCH);
            self.yaw = offset.x.atan2(offset.z);
        }
        self.update();
    }
}

impl Default for OrbitNavigation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::event::{MouseButton, MouseDragSettings};
    use pasture_core::nalgebra::Vector4;

    fn drag(button: MouseButton) -> MouseDragSettings {
        MouseDragSettings {
            button,
            shift_pressed: false,
            ctrl_pressed: false,
            alt_pressed: false,
        }
    }

    #[test]
    fn focus_on_point_places_camera_exactly() {
        let mut nav = OrbitNavigation::new();
        nav.on_window_resized(800.0, 600.0);
        nav.focus_on_point(Vector3::new(1.0, 1.0, 1.0), Vector3::new(0.0, 0.8, 2.0));
        let pose = nav.update().camera_pose();
        assert!((pose.position - Vector3::new(1.0, 1.8, 3.0)).norm() < 1e-9);
    }

    #[test]
    fn focus_on_point_looks_at_target() {
        let mut nav = OrbitNavigation::new();
        nav.on_window_resized(800.0, 600.0);
        let target = Vector3::new(-3.0, 0.5, 7.0);
        nav.focus_on_point(target, Vector3::new(4.0, 2.0, 1.0));
        let matrices = nav.update();

        // the target must end up on the negative z axis of camera space
        let target_view = matrices.view_matrix * Vector4::new(target.x, target.y, target.z, 1.0);
        assert!(target_view.x.abs() < 1e-9);
        assert!(target_view.y.abs() < 1e-9);
        assert!(target_view.z < 0.0);
    }

    #[test]
    fn resize_changes_aspect_ratio_but_not_the_camera() {
        let mut nav = OrbitNavigation::new();
        nav.on_window_resized(800.0, 600.0);
        nav.focus_on_point(Vector3::zeros(), Vector3::new(4.0, 2.0, 1.0));
        let before = nav.update();

        nav.on_window_resized(400.0, 600.0);
        let after = nav.update();

        assert_eq!(
            before.camera_pose().position,
            after.camera_pose().position
        );
        assert_eq!(before.view_matrix, after.view_matrix);
        assert_ne!(before.projection_matrix, after.projection_matrix);
    }

    #[test]
    fn rotating_keeps_the_focus_distance() {
        let mut nav = OrbitNavigation::new();
        nav.on_window_resized(800.0, 600.0);
        let focus = Vector3::new(1.0, 2.0, 3.0);
        nav.focus_on_point(focus, Vector3::new(0.0, 0.8, 2.0));
        let d_before = (nav.update().camera_pose().position - focus).norm();

        nav.on_drag(100.0, 100.0, 160.0, 130.0, drag(MouseButton::Left));
        let d_after = (nav.update().camera_pose().position - focus).norm();

        assert!((d_before - d_after).abs() < 1e-9);
    }

    #[test]
    fn scrolling_zooms_in() {
        let mut nav = OrbitNavigation::new();
        nav.on_window_resized(800.0, 600.0);
        let focus = Vector3::zeros();
        nav.focus_on_point(focus, Vector3::new(0.0, 0.8, 2.0));
        let d_before = (nav.update().camera_pose().position - focus).norm();

        nav.on_scroll(40.0);
        let d_after = (nav.update().camera_pose().position - focus).norm();

        assert!(d_after < d_before);
    }

    #[test]
    fn panning_moves_the_focus_in_the_view_plane() {
        let mut nav = OrbitNavigation::new();
        nav.on_window_resized(800.0, 600.0);
        nav.focus_on_point(Vector3::zeros(), Vector3::new(0.0, 0.0, 2.0));
        let before = nav.update().camera_pose().position;

        nav.on_drag(100.0, 100.0, 150.0, 100.0, drag(MouseButton::Right));
        let after = nav.update().camera_pose().position;

        // camera moved sideways, the distance to the (moved) focus is unchanged
        assert!((after - before).norm() > 0.0);
        assert!((after.y - before.y).abs() < 1e-9);
        assert!((after.z - before.z).abs() < 1e-9);
    }
}
