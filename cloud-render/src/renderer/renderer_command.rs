use crate::renderer::error::RendererResult;
use crate::renderer::settings::{BaseRenderSettings, MarkerStyle, PointCloudRenderSettings};
use crate::renderer::vertex_data::VertexData;
use pasture_core::layout::PointAttributeDefinition;
use pasture_core::math::AABB;
use pasture_core::nalgebra::Vector3;

/// The commands, that the render thread executes on behalf of the
/// handle types in [crate::renderer::viewer].
///
/// Commands, that can fail, carry a sender for reporting the result back to
/// the calling thread.
#[derive(Clone, Debug)]
pub enum RendererCommand {
    Terminate,
    OpenWindow {
        closed_notify_sender: crossbeam_channel::Sender<()>,
        response_sender: crossbeam_channel::Sender<RendererResult<WindowId>>,
    },
    CloseWindow {
        window_id: WindowId,
    },
    UpdateSettings {
        window_id: WindowId,
        new_settings: BaseRenderSettings,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
    UpdateMarkerStyle {
        window_id: WindowId,
        new_style: MarkerStyle,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
    UpdateDefaultPointCloudSettings {
        window_id: WindowId,
        new_settings: PointCloudRenderSettings,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
    UpdatePointCloudSettings {
        window_id: WindowId,
        point_cloud_id: PointCloudId,
        new_settings: PointCloudRenderSettings,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
    AddPointCloud {
        window_id: WindowId,
        positions: VertexData,
        attributes: Vec<PointAttribute>,
        render_settings: Option<PointCloudRenderSettings>,
        result_sender: crossbeam_channel::Sender<RendererResult<PointCloudId>>,
    },
    UpdatePoints {
        window_id: WindowId,
        point_cloud_id: PointCloudId,
        positions: VertexData,
        attributes: Vec<PointAttribute>,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
    RemovePointCloud {
        window_id: WindowId,
        point_cloud_id: PointCloudId,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
    AddMarker {
        window_id: WindowId,
        marker: Marker,
        result_sender: crossbeam_channel::Sender<RendererResult<MarkerId>>,
    },
    RemoveMarker {
        window_id: WindowId,
        marker_id: MarkerId,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
    ShowMarkerInfo {
        window_id: WindowId,
        marker_id: MarkerId,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
    SetStatusText {
        window_id: WindowId,
        text: Option<String>,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
    AddSelectionSubscriber {
        window_id: WindowId,
        result_sender:
            crossbeam_channel::Sender<RendererResult<crossbeam_channel::Receiver<MarkerId>>>,
    },
    CameraMovement {
        window_id: WindowId,
        focus: FocusTarget,
        result_sender: crossbeam_channel::Sender<RendererResult<()>>,
    },
}

/// A labeled point of interest in the scene.
///
/// Every marker is drawn as a clickable sphere, and listed with its label as
/// a button in the marker sidebar.
#[derive(Clone, Debug)]
pub struct Marker {
    /// Short name, used as the button label.
    pub label: String,

    /// Longer text, shown in the info panel when the marker is selected.
    pub description: String,

    /// World space position of the marker.
    pub position: Vector3<f64>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PointCloudId(usize);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct WindowId(usize);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MarkerId(usize);

/// What to move the camera towards.
#[derive(Copy, Clone, Debug)]
pub enum FocusTarget {
    /// Fit all point clouds into the view.
    All,

    /// Fit the given bounding box into the view.
    BoundingBox(AABB<f64>),

    /// Fit the given point cloud into the view.
    PointCloud(PointCloudId),

    /// Place the camera at the marker position plus the configured focus
    /// offset, looking at the marker.
    Marker(MarkerId),

    /// Place the camera at `target + offset`, looking at `target`.
    Point {
        target: Vector3<f64>,
        offset: Vector3<f64>,
    },
}

impl PointCloudId {
    pub fn begin() -> Self {
        PointCloudId(0)
    }

    pub fn increment(&mut self) -> Self {
        self.0 += 1;
        *self
    }
}

impl WindowId {
    pub fn begin() -> Self {
        WindowId(0)
    }

    pub fn next(&mut self) -> Self {
        self.0 += 1;
        *self
    }
}

impl MarkerId {
    pub fn begin() -> Self {
        MarkerId(0)
    }

    pub fn increment(&mut self) -> Self {
        self.0 += 1;
        *self
    }
}

/// One additional point attribute of a point cloud, together with the vertex
/// data it was converted into.
#[derive(Clone, Debug)]
pub struct PointAttribute {
    pub attribute: PointAttributeDefinition,
    pub data: VertexData,
}
