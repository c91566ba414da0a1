//! Conversion of pasture point attributes into vertex buffer data for the GPU.

use crate::renderer::error::{RendererError, RendererResult};
use crate::renderer::viewer::private::RenderThreadHandle;
use pasture_core::containers::{BorrowedBuffer, BorrowedBufferExt};
use pasture_core::layout::{PointAttributeDataType, PointAttributeDefinition, PrimitiveType};
use pasture_core::nalgebra::Vector3;
use std::fmt;
use std::fmt::{Debug, Formatter};

/// The different types of vertex data.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum VertexDataType {
    F32,
    U8,
    Vec3F32,

    /// Like [VertexDataType::Vec3F32], but with an additional offset/scale
    /// transformation, that the renderer applies to every vertex:
    /// `position = value * scale + offset`.
    ///
    /// Used for f64 data, that would lose too much precision if it was
    /// naively cast to f32 (GPS coordinates, for example, easily reach
    /// magnitudes where f32 resolution is worse than a centimeter).
    Vec3F32Transform,
}

/// Contains the data for one vertex buffer.
/// The enum variants correspond to the values of [VertexDataType].
#[derive(Clone)]
pub enum VertexData {
    F32(Vec<F32Attribute>),
    U8(Vec<U8Attribute>),
    Vec3F32(Vec<Vec3F32Attribute>),
    Vec3F32Transform {
        /// position = value * scale + offset
        values: Vec<Vec3F32Attribute>,
        offset: Vector3<f64>,
        scale: Vector3<f64>,
    },
}

/// Generic wrapper for a scalar vertex attribute value.
/// glium requires each vertex to be a struct, that `implement_vertex!()` was
/// called on, even if it only wraps a single primitive.
#[derive(Copy, Clone, Debug)]
pub struct Attribute<T> {
    pub value: T,
}

/// Generic wrapper for a 3d vector vertex attribute.
#[derive(Copy, Clone, Debug)]
pub struct Vec3<T> {
    pub position: [T; 3],
}

pub type F32Attribute = Attribute<f32>;
pub type U8Attribute = Attribute<u8>;
pub type Vec3F32Attribute = Vec3<f32>;

impl<T> Attribute<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Vec3<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

impl VertexData {
    /// The data type of this vertex buffer data
    pub fn data_type(&self) -> VertexDataType {
        match self {
            VertexData::F32(_) => VertexDataType::F32,
            VertexData::U8(_) => VertexDataType::U8,
            VertexData::Vec3F32(_) => VertexDataType::Vec3F32,
            VertexData::Vec3F32Transform { .. } => VertexDataType::Vec3F32Transform,
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        match self {
            VertexData::F32(v) => v.len(),
            VertexData::U8(v) => v.len(),
            VertexData::Vec3F32(v) => v.len(),
            VertexData::Vec3F32Transform { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Debug for VertexData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32(v) => f.debug_tuple("F32").field(&v.len()).finish(),
            Self::U8(v) => f.debug_tuple("U8").field(&v.len()).finish(),
            Self::Vec3F32(v) => f.debug_tuple("Vec3F32").field(&v.len()).finish(),
            Self::Vec3F32Transform { offset, scale, .. } => f
                .debug_struct("Vec3F32Transform")
                .field("offset", offset)
                .field("scale", scale)
                .finish(),
        }
    }
}

impl fmt::Display for VertexDataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            VertexDataType::F32 => write!(f, "float"),
            VertexDataType::U8 => write!(f, "u8"),
            VertexDataType::Vec3F32 => write!(f, "vec3f"),
            VertexDataType::Vec3F32Transform => write!(f, "vec3f+transformation"),
        }
    }
}

/// Extracts the data for one point attribute from the point buffer and
/// converts it to vertex data of a type, that is both appropriate for the
/// attribute and supported by the given render backend.
pub fn point_attribute_to_vertex_data<B, P>(
    points: &P,
    attribute: &PointAttributeDefinition,
    backend: &B,
) -> RendererResult<VertexData>
where
    B: RenderThreadHandle + ?Sized,
    P: BorrowedBuffer,
{
    let candidates: &[VertexDataType] = match attribute.datatype() {
        PointAttributeDataType::U8 => &[VertexDataType::U8],
        PointAttributeDataType::U16 => &[VertexDataType::F32],
        PointAttributeDataType::F32 => &[VertexDataType::F32],
        PointAttributeDataType::F64 => &[VertexDataType::F32],
        PointAttributeDataType::Vec3u16 => &[VertexDataType::Vec3F32],
        PointAttributeDataType::Vec3f32 => &[VertexDataType::Vec3F32],
        PointAttributeDataType::Vec3f64 => {
            &[VertexDataType::Vec3F32Transform, VertexDataType::Vec3F32]
        }
        _ => &[],
    };

    let chosen = candidates
        .iter()
        .copied()
        .find(|candidate| backend.is_vertex_data_type_supported(*candidate));

    let chosen = match chosen {
        None => {
            return Err(RendererError::UnsupportedOperation {
                backend_name: backend.name(),
                operation_name: format!("point attribute data type {}", attribute.datatype()),
            });
        }
        Some(dt) => dt,
    };

    Ok(convert(points, attribute, chosen))
}

/// Extracts the values of one point attribute and converts them to vertex
/// data of the given type.
/// Panics, if the combination of attribute type and vertex data type is not
/// one of the conversions offered by [point_attribute_to_vertex_data].
fn convert(
    points: &impl BorrowedBuffer,
    attribute: &PointAttributeDefinition,
    vertex_data_type: VertexDataType,
) -> VertexData {
    match (attribute.datatype(), vertex_data_type) {
        (PointAttributeDataType::U8, VertexDataType::U8) => {
            VertexData::U8(collect_attribute(points, attribute, Attribute::<u8>::new))
        }

        (PointAttributeDataType::U16, VertexDataType::F32) => VertexData::F32(collect_attribute(
            points,
            attribute,
            |v: u16| F32Attribute::new(v as f32),
        )),

        (PointAttributeDataType::F32, VertexDataType::F32) => {
            VertexData::F32(collect_attribute(points, attribute, F32Attribute::new))
        }

        (PointAttributeDataType::F64, VertexDataType::F32) => VertexData::F32(collect_attribute(
            points,
            attribute,
            |v: f64| F32Attribute::new(v as f32),
        )),

        (PointAttributeDataType::Vec3u16, VertexDataType::Vec3F32) => {
            // u16 color channels are normalized to 0.0 - 1.0
            VertexData::Vec3F32(collect_attribute(points, attribute, |v: Vector3<u16>| {
                Vec3F32Attribute::new(
                    v.x as f32 / u16::MAX as f32,
                    v.y as f32 / u16::MAX as f32,
                    v.z as f32 / u16::MAX as f32,
                )
            }))
        }

        (PointAttributeDataType::Vec3f32, VertexDataType::Vec3F32) => {
            VertexData::Vec3F32(collect_attribute(points, attribute, |v: Vector3<f32>| {
                Vec3F32Attribute::new(v.x, v.y, v.z)
            }))
        }

        (PointAttributeDataType::Vec3f64, VertexDataType::Vec3F32) => {
            VertexData::Vec3F32(collect_attribute(points, attribute, |v: Vector3<f64>| {
                Vec3F32Attribute::new(v.x as f32, v.y as f32, v.z as f32)
            }))
        }

        (PointAttributeDataType::Vec3f64, VertexDataType::Vec3F32Transform) => {
            quantize_vec3f64(points, attribute)
        }

        (dt, vt) => panic!(
            "the conversion from the point attribute data type {} to the vertex data type {} is not supported",
            dt, vt
        ),
    }
}

/// Converts f64 vectors to f32 vectors with an offset/scale transformation,
/// chosen such that every value lands between -5000.0 and 5000.0, where f32
/// still has an acceptable precision.
fn quantize_vec3f64(
    points: &impl BorrowedBuffer,
    attribute: &PointAttributeDefinition,
) -> VertexData {
    let mut min = Vector3::repeat(f64::MAX);
    let mut max = Vector3::repeat(f64::MIN);
    for value in points.view_attribute::<Vector3<f64>>(attribute) {
        min = min.inf(&value);
        max = max.sup(&value);
    }

    let (offset, scale) = if points.is_empty() {
        (Vector3::zeros(), Vector3::repeat(1.0))
    } else {
        let offset = (min + max) / 2.0;
        let scale = ((max - min) / 10_000.0).sup(&Vector3::repeat(1.0));
        (offset, scale)
    };

    let mut values = Vec::with_capacity(points.len());
    for value in points.view_attribute::<Vector3<f64>>(attribute) {
        let v = (value - offset).component_div(&scale);
        values.push(Vec3F32Attribute::new(v.x as f32, v.y as f32, v.z as f32));
    }

    VertexData::Vec3F32Transform {
        values,
        offset,
        scale,
    }
}

/// Copies one point attribute into a vector, applying a conversion function
/// to each element.
fn collect_attribute<T, U, F, P>(
    points: &P,
    attribute: &PointAttributeDefinition,
    map_fn: F,
) -> Vec<U>
where
    F: Fn(T) -> U,
    T: PrimitiveType,
    P: BorrowedBuffer,
{
    points
        .view_attribute::<T>(attribute)
        .into_iter()
        .map(map_fn)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::renderer_command::RendererCommand;
    use bytemuck::{Pod, Zeroable};
    use pasture_core::containers::VectorBuffer;
    use pasture_core::layout::attributes;
    use pasture_core::layout::PointType;
    use pasture_derive::PointType;

    #[repr(C, packed)]
    #[derive(Clone, Copy, Debug, PartialEq, Default, PointType, Pod, Zeroable)]
    struct TestPoint {
        #[pasture(BUILTIN_POSITION_3D)]
        position: Vector3<f64>,
        #[pasture(BUILTIN_COLOR_RGB)]
        color: Vector3<u16>,
    }

    struct TestBackend;

    impl RenderThreadHandle for TestBackend {
        fn name(&self) -> &'static str {
            "test"
        }

        fn is_vertex_data_type_supported(&self, _data_type: VertexDataType) -> bool {
            true
        }

        fn execute_command(&self, _command: RendererCommand) {
            unreachable!("the conversion does not execute commands");
        }
    }

    fn buffer(points: &[TestPoint]) -> VectorBuffer {
        points.iter().copied().collect()
    }

    #[test]
    fn f64_positions_become_a_quantized_transform() {
        let points = buffer(&[
            TestPoint {
                position: Vector3::new(363_000.0, 5_620_000.0, 120.0),
                ..Default::default()
            },
            TestPoint {
                position: Vector3::new(363_800.0, 5_621_000.0, 145.5),
                ..Default::default()
            },
        ]);

        let data =
            point_attribute_to_vertex_data(&points, &attributes::POSITION_3D, &TestBackend)
                .unwrap();

        let (values, offset, scale) = match data {
            VertexData::Vec3F32Transform {
                values,
                offset,
                scale,
            } => (values, offset, scale),
            other => panic!("expected a transform, got {:?}", other),
        };

        // quantized values stay small, and the transform restores the originals
        let original = [
            Vector3::new(363_000.0, 5_620_000.0, 120.0),
            Vector3::new(363_800.0, 5_621_000.0, 145.5),
        ];
        for (value, original) in values.iter().zip(original) {
            let [x, y, z] = value.position;
            assert!(x.abs() <= 5_000.0 && y.abs() <= 5_000.0 && z.abs() <= 5_000.0);
            let restored = Vector3::new(x as f64, y as f64, z as f64).component_mul(&scale) + offset;
            assert!((restored - original).norm() < 1e-3);
        }
    }

    #[test]
    fn u16_colors_are_normalized() {
        let points = buffer(&[TestPoint {
            color: Vector3::new(0, u16::MAX / 2 + 1, u16::MAX),
            ..Default::default()
        }]);

        let data = point_attribute_to_vertex_data(&points, &attributes::COLOR_RGB, &TestBackend)
            .unwrap();

        let values = match data {
            VertexData::Vec3F32(values) => values,
            other => panic!("expected vec3f data, got {:?}", other),
        };
        let [r, g, b] = values[0].position;
        assert_eq!(r, 0.0);
        assert!((g - 0.5).abs() < 1e-3);
        assert_eq!(b, 1.0);
    }

    #[test]
    fn unsupported_attribute_types_are_rejected() {
        struct PositionsOnly;
        impl RenderThreadHandle for PositionsOnly {
            fn name(&self) -> &'static str {
                "test"
            }
            fn is_vertex_data_type_supported(&self, data_type: VertexDataType) -> bool {
                data_type == VertexDataType::Vec3F32
            }
            fn execute_command(&self, _command: RendererCommand) {}
        }

        let points = buffer(&[TestPoint::default()]);
        let result =
            point_attribute_to_vertex_data(&points, &attributes::INTENSITY, &PositionsOnly);
        assert!(matches!(
            result,
            Err(RendererError::UnsupportedOperation { .. })
        ));
    }
}
