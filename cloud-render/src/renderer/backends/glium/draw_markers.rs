//! Functionality to draw the markers as solid-color spheres.

use crate::renderer::backends::glium::util::matrix_to_gl;
use crate::renderer::error::{RendererError, RendererResult};
use crate::renderer::renderer_command::{Marker, MarkerId};
use crate::renderer::settings::MarkerStyle;
use glium::index::{NoIndices, PrimitiveType};
use glium::{implement_vertex, uniform};
use glium::{DepthTest, Display, DrawParameters, Frame, Program, Surface, VertexBuffer};
use pasture_core::nalgebra::{Matrix4, Vector3};
use std::f32::consts::PI;

/// Number of latitude bands of the marker sphere mesh.
const SPHERE_STACKS: u32 = 8;

/// Number of longitude segments of the marker sphere mesh.
const SPHERE_SLICES: u32 = 8;

#[derive(Copy, Clone, Debug)]
struct MarkerVertex {
    position: [f32; 3],
}

implement_vertex!(MarkerVertex, position);

mod shaders {
    pub const MARKER_VERT: &str = include_str!("shaders/marker.vert");
    pub const MARKER_FRAG: &str = include_str!("shaders/marker.frag");
}

/// Keeps the markers of one window and draws them as spheres.
///
/// All markers share a single unit sphere mesh, that is scaled to the marker
/// radius and moved to the marker position by the vertex shader.
pub struct MarkersRenderer {
    markers: Vec<(MarkerId, Marker)>,
    next_id: MarkerId,
    style: MarkerStyle,
    vertex_buffer: VertexBuffer<MarkerVertex>,
    shader_program: Program,
}

/// Triangulates the unit sphere into `stacks` latitude bands with `slices`
/// segments each, as a flat triangle list.
fn sphere_vertices(stacks: u32, slices: u32) -> Vec<MarkerVertex> {
    fn vertex(theta: f32, phi: f32) -> MarkerVertex {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        MarkerVertex {
            position: [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi],
        }
    }

    let mut vertices = Vec::with_capacity((stacks * slices * 6) as usize);
    for stack in 0..stacks {
        let theta_0 = PI * stack as f32 / stacks as f32;
        let theta_1 = PI * (stack + 1) as f32 / stacks as f32;
        for slice in 0..slices {
            let phi_0 = 2.0 * PI * slice as f32 / slices as f32;
            let phi_1 = 2.0 * PI * (slice + 1) as f32 / slices as f32;

            let a = vertex(theta_0, phi_0);
            let b = vertex(theta_1, phi_0);
            let c = vertex(theta_1, phi_1);
            let d = vertex(theta_0, phi_1);
            vertices.extend([a, b, c]);
            vertices.extend([a, c, d]);
        }
    }
    vertices
}

impl MarkersRenderer {
    pub fn new(display: &Display) -> RendererResult<Self> {
        let vertex_data = sphere_vertices(SPHERE_STACKS, SPHERE_SLICES);
        let vertex_buffer = VertexBuffer::new(display, &vertex_data).map_err(|e| {
            RendererError::Graphics {
                source: Box::new(e),
            }
        })?;

        let shader_program =
            Program::from_source(display, shaders::MARKER_VERT, shaders::MARKER_FRAG, None)
                .map_err(|e| RendererError::Graphics {
                    source: Box::new(e),
                })?;

        Ok(MarkersRenderer {
            markers: Vec::new(),
            next_id: MarkerId::begin(),
            style: MarkerStyle::default(),
            vertex_buffer,
            shader_program,
        })
    }

    pub fn add(&mut self, marker: Marker) -> MarkerId {
        let id = self.next_id.increment();
        self.markers.push((id, marker));
        id
    }

    pub fn remove(&mut self, id: MarkerId) -> RendererResult<()> {
        let index = self.markers.iter().position(|(marker_id, _)| *marker_id == id);
        match index {
            None => Err(RendererError::MarkerDoesNotExist { id }),
            Some(index) => {
                self.markers.remove(index);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: MarkerId) -> RendererResult<&Marker> {
        self.markers
            .iter()
            .find(|(marker_id, _)| *marker_id == id)
            .map(|(_, marker)| marker)
            .ok_or(RendererError::MarkerDoesNotExist { id })
    }

    /// All markers in the order they were added.
    /// (The marker sidebar lists them in this order.)
    pub fn markers(&self) -> &[(MarkerId, Marker)] {
        &self.markers
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: MarkerStyle) {
        self.style = style;
    }

    /// The marker spheres for hit testing.
    pub fn spheres(&self) -> impl Iterator<Item = (MarkerId, Vector3<f64>, f64)> + '_ {
        let radius = self.style.radius;
        self.markers
            .iter()
            .map(move |(id, marker)| (*id, marker.position, radius))
    }

    pub fn draw(
        &self,
        frame: &mut Frame,
        view_projection_matrix: &Matrix4<f64>,
    ) -> RendererResult<()> {
        let color = [self.style.color.r, self.style.color.g, self.style.color.b];
        let draw_parameters = DrawParameters {
            depth: glium::Depth {
                write: true,
                test: DepthTest::IfLess,
                ..Default::default()
            },
            ..Default::default()
        };

        for (_, marker) in &self.markers {
            // scale and translate in f64, so markers far from the origin
            // do not jitter
            let model_matrix = Matrix4::new_translation(&marker.position)
                * Matrix4::new_scaling(self.style.radius);
            let matrix = matrix_to_gl(&(view_projection_matrix * model_matrix));

            frame
                .draw(
                    &self.vertex_buffer,
                    NoIndices(PrimitiveType::TrianglesList),
                    &self.shader_program,
                    &uniform! {
                        modelViewProjectionMatrix: matrix,
                        marker_color: color,
                    },
                    &draw_parameters,
                )
                .map_err(|e| RendererError::Graphics {
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_mesh_is_a_full_triangle_list() {
        let vertices = sphere_vertices(8, 8);
        assert_eq!(vertices.len(), 8 * 8 * 6);
    }

    #[test]
    fn sphere_mesh_lies_on_the_unit_sphere() {
        for vertex in sphere_vertices(8, 8) {
            let [x, y, z] = vertex.position;
            let norm = (x * x + y * y + z * z).sqrt();
            assert!((norm - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn sphere_mesh_reaches_both_poles() {
        let vertices = sphere_vertices(8, 8);
        assert!(vertices.iter().any(|v| (v.position[1] - 1.0).abs() < 1e-6));
        assert!(vertices.iter().any(|v| (v.position[1] + 1.0).abs() < 1e-6));
    }
}
