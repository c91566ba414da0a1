//! Settings for how the scene should look.

use pasture_core::layout::{attributes, PointAttributeDefinition};
use pasture_core::nalgebra::Vector3;

/// Settings controlling the general look of one viewer window.
#[derive(Clone, Debug)]
pub struct BaseRenderSettings {
    /// Window title of the renderer window
    pub window_title: String,

    /// Background color
    pub bg_color: Color,

    /// Whether to draw the camera telemetry overlay
    /// (camera position and rotation, updated every frame).
    pub show_camera_stats: bool,
}

/// Settings for how the markers of a window are rendered and focused.
#[derive(Clone, Debug)]
pub struct MarkerStyle {
    /// Color of the marker spheres.
    pub color: Color,

    /// Radius of the marker spheres, in world units.
    pub radius: f64,

    /// When a marker is focused, the camera is placed at
    /// `marker position + focus_offset`, looking at the marker.
    pub focus_offset: Vector3<f64>,
}

/// Settings for how a single point cloud should be rendered.
#[derive(Clone, Debug)]
pub struct PointCloudRenderSettings {
    /// The color of the points.
    pub point_color: PointColor,

    /// The shape of the points.
    pub point_shape: PointShape,

    /// The size of the points.
    pub point_size: PointSize,
}

/// Defines, how the points of a point cloud are colored.
#[derive(Clone, Debug)]
pub enum PointColor {
    /// Draws every point with the same, fixed color.
    Fixed(Color),

    /// Colors every point based on a scalar point attribute, such as the
    /// intensity, by sampling from a continuous color map.
    ScalarAttribute(ScalarAttributeColoring),

    /// Colors every point with its own RGB color attribute.
    Rgb(RgbPointColoring),
}

/// Settings for coloring a point cloud based on a scalar attribute.
#[derive(Clone, Debug)]
pub struct ScalarAttributeColoring {
    /// The attribute to use for the coloring
    pub attribute: PointAttributeDefinition,

    /// Color map that the attribute value is looked up in
    pub color_map: ColorMap,

    /// Attribute value that is mapped to the start of the color map.
    /// Smaller values are clamped.
    pub min: f32,

    /// Attribute value that is mapped to the end of the color map.
    /// Larger values are clamped.
    pub max: f32,
}

/// Settings for coloring a point cloud with per-point RGB colors.
#[derive(Clone, Debug)]
pub struct RgbPointColoring {
    /// The vec3 attribute to use for the coloring
    pub attribute: PointAttributeDefinition,
}

/// A mapping from an input value between 0.0 and 1.0 to a color.
#[derive(Clone, Debug)]
pub struct ColorMap {
    colors: Vec<(f32, Color)>,
}

/// The shape of the individual points
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum PointShape {
    /// Square points
    Square,

    /// Round points
    Round,
}

/// Defines, how the sizing of the points is determined
#[derive(Copy, Clone, Debug)]
pub enum PointSize {
    /// All points have the same, fixed, size (in logical pixels).
    Fixed(f32),

    /// Points that are closer to the camera appear larger.
    Depth(f32),
}

/// An RGB color value.
/// Each of the three channels should be in between 0.0 and 1.0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Creates a color from its r, g, b components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const GREY: Color = Color::rgb(0.5, 0.5, 0.5);
}

impl ColorMap {
    /// Makes a simple color map, that is a gradient between the two given colors.
    pub fn gradient(from: Color, to: Color) -> Self {
        ColorMap {
            colors: vec![(0.0, from), (1.0, to)],
        }
    }

    /// Makes a color map with equally sized gradients between the given colors.
    ///
    /// # Panics
    /// Panics, if less than two colors are given.
    pub fn equally_spaced(colors: &[Color]) -> Self {
        assert!(colors.len() >= 2);
        let nr_gradients = colors.len() as f32 - 1.0;
        let colors = colors
            .iter()
            .copied()
            .enumerate()
            .map(|(i, c)| (i as f32 / nr_gradients, c))
            .collect();
        ColorMap { colors }
    }

    /// Samples the color map at the given position between 0.0 and 1.0.
    pub fn color_at(&self, value: f32) -> Color {
        let &(first_value, first_color) = self.colors.first().unwrap();
        if value <= first_value {
            return first_color;
        }

        for window in self.colors.windows(2) {
            let (left_value, left_color) = window[0];
            let (right_value, right_color) = window[1];
            if left_value < value && value <= right_value {
                let f = (value - left_value) / (right_value - left_value);
                return Color {
                    r: (1.0 - f) * left_color.r + f * right_color.r,
                    g: (1.0 - f) * left_color.g + f * right_color.g,
                    b: (1.0 - f) * left_color.b + f * right_color.b,
                };
            }
        }

        self.colors.last().unwrap().1
    }

    /// Black over red to yellow.
    pub fn fire() -> ColorMap {
        ColorMap {
            colors: vec![
                (0.0, Color::BLACK),
                (0.33, Color::RED),
                (1.0, Color::YELLOW),
            ],
        }
    }

    /// Black to white.
    pub fn greyscale() -> ColorMap {
        ColorMap::gradient(Color::BLACK, Color::WHITE)
    }
}

impl Default for BaseRenderSettings {
    fn default() -> Self {
        BaseRenderSettings {
            window_title: "Point Cloud Viewer".to_string(),
            bg_color: Color::rgb(0.1, 0.1, 0.1),
            show_camera_stats: true,
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle {
            color: Color::RED,
            radius: 0.05,
            focus_offset: Vector3::new(0.0, 0.8, 2.0),
        }
    }
}

impl Default for PointCloudRenderSettings {
    fn default() -> Self {
        PointCloudRenderSettings {
            point_color: PointColor::Fixed(Color::WHITE),
            point_shape: PointShape::Square,
            point_size: PointSize::Fixed(3.0),
        }
    }
}

impl Default for ScalarAttributeColoring {
    fn default() -> Self {
        Self {
            attribute: attributes::INTENSITY.clone(),
            color_map: ColorMap::fire(),
            min: 0.0,
            max: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_map_endpoints() {
        let map = ColorMap::gradient(Color::BLACK, Color::WHITE);
        assert_eq!(map.color_at(0.0), Color::BLACK);
        assert_eq!(map.color_at(1.0), Color::WHITE);
    }

    #[test]
    fn color_map_interpolates() {
        let map = ColorMap::gradient(Color::BLACK, Color::WHITE);
        let mid = map.color_at(0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert!((mid.g - 0.5).abs() < 1e-6);
        assert!((mid.b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn color_map_clamps_out_of_range_values() {
        let map = ColorMap::equally_spaced(&[Color::RED, Color::GREEN, Color::BLUE]);
        assert_eq!(map.color_at(-3.0), Color::RED);
        assert_eq!(map.color_at(42.0), Color::BLUE);
    }

    #[test]
    fn equally_spaced_hits_every_color() {
        let map = ColorMap::equally_spaced(&[Color::RED, Color::GREEN, Color::BLUE]);
        assert_eq!(map.color_at(0.0), Color::RED);
        assert_eq!(map.color_at(0.5), Color::GREEN);
        assert_eq!(map.color_at(1.0), Color::BLUE);
    }
}
