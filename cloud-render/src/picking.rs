//! Projecting window coordinates into world-space rays and intersecting them
//! with marker geometry.

use crate::navigation::Matrices;
use pasture_core::nalgebra::{Vector2, Vector3, Vector4};

/// A half line in world space.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: Vector3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Constructs the ray that starts at the camera and passes through the
    /// given window position (logical pixels, origin at the top left).
    pub fn through_window_position(matrices: &Matrices, position: Vector2<f64>) -> Ray {
        // window coordinates to clip coordinates
        let clip_x = position.x / matrices.window_size.x * 2.0 - 1.0;
        let clip_y = -position.y / matrices.window_size.y * 2.0 + 1.0;
        let point_clip = Vector4::new(clip_x, clip_y, 0.0, 1.0);

        // undo the projection, to get the point in view space
        let point_view = matrices.projection_matrix_inv * point_clip;

        // turn it into a direction (w = 0, so the translation component of the
        // view matrix does not apply) and transform back to world space
        let dir_view = Vector4::new(point_view.x, point_view.y, point_view.z, 0.0);
        let direction = (matrices.view_matrix_inv * dir_view).xyz().normalize();

        // the camera position in world space
        let origin_hom = matrices.view_matrix_inv * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let origin = origin_hom.xyz() / origin_hom.w;

        Ray { origin, direction }
    }

    /// Intersects the ray with a sphere.
    ///
    /// Returns the distance along the ray to the closest intersection in
    /// front of the ray origin, or [None] if the ray misses the sphere.
    pub fn intersect_sphere(&self, center: Vector3<f64>, radius: f64) -> Option<f64> {
        // solve |origin + t * direction - center|^2 == radius^2 for t
        let oc = self.origin - center;
        let a = self.direction.dot(&self.direction);
        let b = 2.0 * oc.dot(&self.direction);
        let c = oc.dot(&oc) - radius * radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let t_near = (-b - sqrt_d) / (2.0 * a);
        let t_far = (-b + sqrt_d) / (2.0 * a);
        if t_near >= 0.0 {
            Some(t_near)
        } else if t_far >= 0.0 {
            Some(t_far)
        } else {
            None
        }
    }
}

/// Casts a ray through the given window position and returns the id of the
/// closest sphere it hits.
///
/// Ties are broken by the smallest intersection distance.
pub fn pick<I>(
    matrices: &Matrices,
    position: Vector2<f64>,
    spheres: impl IntoIterator<Item = (I, Vector3<f64>, f64)>,
) -> Option<I> {
    let ray = Ray::through_window_position(matrices, position);

    let mut nearest: Option<(I, f64)> = None;
    for (id, center, radius) in spheres {
        if let Some(t) = ray.intersect_sphere(center, radius) {
            let closer = match &nearest {
                None => true,
                Some((_, nearest_t)) => t < *nearest_t,
            };
            if closer {
                nearest = Some((id, t));
            }
        }
    }
    nearest.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::orbit::OrbitNavigation;
    use crate::navigation::Navigation;

    fn example_matrices() -> Matrices {
        let mut nav = OrbitNavigation::new();
        nav.on_window_resized(800.0, 600.0);
        nav.focus_on_point(Vector3::zeros(), Vector3::new(0.0, 0.8, 2.0));
        nav.update()
    }

    #[test]
    fn ray_through_the_window_center_passes_through_the_focus_point() {
        let matrices = example_matrices();
        let ray = Ray::through_window_position(&matrices, Vector2::new(400.0, 300.0));

        // distance between the focus point (the origin) and the ray
        let to_focus = -ray.origin;
        let closest = ray.origin + ray.direction * to_focus.dot(&ray.direction);
        assert!(closest.norm() < 1e-9);
    }

    #[test]
    fn sphere_intersection_from_outside() {
        let ray = Ray {
            origin: Vector3::new(0.0, 0.0, 5.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        let t = ray.intersect_sphere(Vector3::zeros(), 1.0);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn sphere_intersection_from_inside() {
        let ray = Ray {
            origin: Vector3::zeros(),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        let t = ray.intersect_sphere(Vector3::zeros(), 1.0);
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn sphere_behind_the_ray_is_missed() {
        let ray = Ray {
            origin: Vector3::new(0.0, 0.0, 5.0),
            direction: Vector3::new(0.0, 0.0, 1.0),
        };
        assert_eq!(ray.intersect_sphere(Vector3::zeros(), 1.0), None);
    }

    #[test]
    fn picking_a_marker_at_the_focus_point() {
        let matrices = example_matrices();
        let spheres = vec![(7_u32, Vector3::zeros(), 0.05)];
        let hit = pick(&matrices, Vector2::new(400.0, 300.0), spheres);
        assert_eq!(hit, Some(7));
    }

    #[test]
    fn clicking_empty_space_picks_nothing() {
        let matrices = example_matrices();
        let spheres = vec![(7_u32, Vector3::zeros(), 0.05)];
        let hit = pick(&matrices, Vector2::new(10.0, 10.0), spheres);
        assert_eq!(hit, None);
    }

    #[test]
    fn the_nearest_of_two_markers_wins() {
        let matrices = example_matrices();
        let camera = matrices.camera_pose().position;

        // two markers on the line from the camera through the focus point,
        // the further one twice as large
        let dir = (-camera).normalize();
        let near = camera + dir * 1.0;
        let far = camera + dir * 2.0;
        let spheres = vec![(1_u32, far, 0.2), (2_u32, near, 0.1)];

        let hit = pick(&matrices, Vector2::new(400.0, 300.0), spheres);
        assert_eq!(hit, Some(2));
    }
}
