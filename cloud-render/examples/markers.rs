use bytemuck::{Pod, Zeroable};
use cloud_render::renderer::backends::glium::GliumRenderOptions;
use cloud_render::renderer::settings::{
    Color, PointCloudRenderSettings, PointColor, PointShape, PointSize,
};
use cloud_render::renderer::viewer::{Marker, RenderThreadBuilderExt};
use pasture_core::containers::VectorBuffer;
use pasture_core::nalgebra::Vector3;
use pasture_derive::PointType;

// This is an (almost) minimal example for how to use the renderer:
// it displays a generated point cloud with two clickable markers.

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, Default, PointType, Pod, Zeroable)]
struct ExamplePoint {
    #[pasture(BUILTIN_POSITION_3D)]
    position: Vector3<f64>,
}

/// A wavy grid of points around the origin.
fn example_point_cloud() -> VectorBuffer {
    let mut points = Vec::new();
    for ix in -50..=50 {
        for iz in -50..=50 {
            let x = ix as f64 * 0.05;
            let z = iz as f64 * 0.05;
            let y = 0.2 * (x * 3.0).sin() * (z * 3.0).cos();
            points.push(ExamplePoint {
                position: Vector3::new(x, y, z),
            });
        }
    }
    points.into_iter().collect()
}

fn main() {
    pretty_env_logger::init();

    let options = GliumRenderOptions::default();
    options.run(|render_thread| {
        // open window
        let window = render_thread.open_window().unwrap();

        // add point cloud
        let point_buffer = example_point_cloud();
        window.add_point_cloud(&point_buffer).unwrap();
        window
            .set_default_point_cloud_settings(PointCloudRenderSettings {
                point_color: PointColor::Fixed(Color::BLUE),
                point_shape: PointShape::Round,
                point_size: PointSize::Fixed(3.0),
            })
            .unwrap();

        // add two markers
        window
            .add_marker(Marker {
                label: "Center".to_string(),
                description: "The center of the grid".to_string(),
                position: Vector3::new(0.0, 0.0, 0.0),
            })
            .unwrap();
        window
            .add_marker(Marker {
                label: "Corner".to_string(),
                description: "The corner of the grid".to_string(),
                position: Vector3::new(2.5, 0.0, 2.5),
            })
            .unwrap();

        // initial camera placement
        window.focus_on_all().unwrap();

        // whenever a marker is selected (by clicking either the sphere or its
        // button in the sidebar), fly to it and show its description.
        let selections = window.subscribe_to_selection().unwrap();
        for marker_id in selections {
            window
                .camera_movement()
                .focus_on_marker(marker_id)
                .execute()
                .unwrap();
            window.show_marker_info(marker_id).unwrap();
        }
    });
}
