//! The types in this module are the main way of interacting with the renderer.

use self::private::{RenderThreadBuilder, RenderThreadHandle};
use crate::renderer::error::RendererResult;
pub use crate::renderer::renderer_command::{Marker, MarkerId, PointCloudId};
use crate::renderer::renderer_command::{FocusTarget, PointAttribute, RendererCommand, WindowId};
use crate::renderer::settings::{BaseRenderSettings, MarkerStyle, PointCloudRenderSettings};
use crate::renderer::vertex_data::point_attribute_to_vertex_data;
use pasture_core::containers::BorrowedBuffer;
use pasture_core::layout::{attributes, PointAttributeDefinition};
use pasture_core::math::AABB;
use pasture_core::nalgebra::Vector3;
use std::thread;

pub(crate) mod private {
    //! The traits in this module are only meant to be implemented and used by
    //! this crate. Users of this crate use [super::RenderThreadBuilderExt] and
    //! [super::RenderThread] instead, which offer a more convenient interface.

    use crate::renderer::renderer_command::RendererCommand;
    use crate::renderer::vertex_data::VertexDataType;

    pub trait RenderThreadBuilder {
        type Handle: RenderThreadHandle + 'static;

        fn run(&self, handle_sender: crossbeam_channel::Sender<Self::Handle>);
    }

    pub trait RenderThreadHandle: Send {
        fn name(&self) -> &'static str;

        fn is_vertex_data_type_supported(&self, data_type: VertexDataType) -> bool;

        fn execute_command(&self, command: RendererCommand);
    }
}

/// This trait is implemented by each render backend and runs the render
/// thread with that backend.
pub trait RenderThreadBuilderExt: RenderThreadBuilder {
    /// Runs the render thread.
    ///
    /// Once the renderer is initialized, the given callback is invoked on a
    /// second thread with a [RenderThread] handle for controlling the
    /// viewer windows.
    ///
    /// This method must be called on the main thread. It turns the current
    /// thread into the render thread and never returns.
    fn run<F>(&self, callback: F)
    where
        F: Send + 'static + FnOnce(RenderThread),
    {
        let (handle_sender, handle_receiver) = crossbeam_channel::bounded::<Self::Handle>(1);

        thread::spawn(move || {
            let handle = handle_receiver.recv().unwrap();
            let render_thread = RenderThread {
                handle: Box::new(handle),
            };
            callback(render_thread);
        });

        RenderThreadBuilder::run(self, handle_sender);
    }
}

impl<T> RenderThreadBuilderExt for T where T: RenderThreadBuilder {}

/// Handle through which the renderer can be controlled.
pub struct RenderThread {
    handle: Box<dyn RenderThreadHandle>,
}

impl RenderThread {
    /// Closes all viewer windows and exits the render thread,
    /// which terminates the application.
    pub fn terminate(self) {
        // the Drop impl sends the terminate command
    }

    /// Opens a new window.
    pub fn open_window(&self) -> RendererResult<Window> {
        let (response_sender, response_receiver) = crossbeam_channel::bounded(1);
        let (closed_notify_sender, closed_notify_receiver) = crossbeam_channel::bounded(1);
        self.handle.execute_command(RendererCommand::OpenWindow {
            response_sender,
            closed_notify_sender,
        });
        let window_id = response_receiver.recv().unwrap()?;
        Ok(Window {
            renderer: self.handle.as_ref(),
            window_id,
            closed_notify_receiver,
        })
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.handle.execute_command(RendererCommand::Terminate)
    }
}

/// Handle to a single viewer window.
///
/// A window displays any number of point clouds and markers. Point clouds are
/// created with one of the [Self::add_point_cloud] methods, which return an id
/// for referencing the point cloud later. Point clouds and markers are not
/// shared between windows.
///
/// A point cloud consists of at least the [3d position](attributes::POSITION_3D)
/// of each point. Any additional attribute, that should be available for
/// rendering (colors, intensities, ...), has to be listed explicitly when the
/// point cloud is created, so that its data gets uploaded to the GPU.
///
/// The look of each point cloud is defined by its
/// [render settings](PointCloudRenderSettings) - either its own, or the
/// window-wide default settings.
pub struct Window<'a> {
    renderer: &'a dyn RenderThreadHandle,
    window_id: WindowId,
    closed_notify_receiver: crossbeam_channel::Receiver<()>,
}

impl Window<'_> {
    /// Closes the window.
    pub fn close(self) {
        // the Drop impl sends the close command
    }

    /// Waits for the user to close the window.
    pub fn join(self) {
        self.closed_notify_receiver.recv().unwrap();
    }

    fn execute<T>(
        &self,
        make_command: impl FnOnce(crossbeam_channel::Sender<RendererResult<T>>) -> RendererCommand,
    ) -> RendererResult<T> {
        let (result_sender, result_receiver) = crossbeam_channel::bounded(1);
        self.renderer.execute_command(make_command(result_sender));
        // the renderer always sends exactly one result per command
        result_receiver.recv().unwrap()
    }

    /// Changes the render settings affecting the general look of the window.
    pub fn set_render_settings(&self, new_settings: BaseRenderSettings) -> RendererResult<()> {
        self.execute(|result_sender| RendererCommand::UpdateSettings {
            window_id: self.window_id,
            new_settings,
            result_sender,
        })
    }

    /// Changes the look and focus behavior of all markers of this window.
    pub fn set_marker_style(&self, new_style: MarkerStyle) -> RendererResult<()> {
        self.execute(|result_sender| RendererCommand::UpdateMarkerStyle {
            window_id: self.window_id,
            new_style,
            result_sender,
        })
    }

    /// Changes the default settings for how point clouds look.
    ///
    /// Every point cloud without custom render settings falls back to these.
    pub fn set_default_point_cloud_settings(
        &self,
        new_settings: PointCloudRenderSettings,
    ) -> RendererResult<()> {
        self.execute(
            |result_sender| RendererCommand::UpdateDefaultPointCloudSettings {
                window_id: self.window_id,
                new_settings,
                result_sender,
            },
        )
    }

    fn add_point_cloud_impl(
        &self,
        points: &impl BorrowedBuffer,
        attributes: &[&PointAttributeDefinition],
        settings: Option<PointCloudRenderSettings>,
    ) -> RendererResult<PointCloudId> {
        let positions =
            point_attribute_to_vertex_data(points, &attributes::POSITION_3D, self.renderer)?;
        let attributes = self.convert_attributes(points, attributes)?;
        self.execute(|result_sender| RendererCommand::AddPointCloud {
            window_id: self.window_id,
            positions,
            attributes,
            render_settings: settings,
            result_sender,
        })
    }

    fn convert_attributes(
        &self,
        points: &impl BorrowedBuffer,
        attributes: &[&PointAttributeDefinition],
    ) -> RendererResult<Vec<PointAttribute>> {
        attributes
            .iter()
            .map(|&attr| {
                Ok(PointAttribute {
                    attribute: attr.to_owned(),
                    data: point_attribute_to_vertex_data(points, attr, self.renderer)?,
                })
            })
            .collect()
    }

    /// Adds the given points to the window.
    /// Only the position of each point is uploaded to the GPU. To render
    /// additional attributes, use [Window::add_point_cloud_with_attributes].
    pub fn add_point_cloud(&self, points: &impl BorrowedBuffer) -> RendererResult<PointCloudId> {
        self.add_point_cloud_impl(points, &[], None)
    }

    /// Adds the given points to the window, together with the data of the
    /// listed point attributes.
    pub fn add_point_cloud_with_attributes(
        &self,
        points: &impl BorrowedBuffer,
        attributes: &[&PointAttributeDefinition],
    ) -> RendererResult<PointCloudId> {
        self.add_point_cloud_impl(points, attributes, None)
    }

    /// Adds the given points to the window, with custom render settings.
    pub fn add_point_cloud_with_attributes_and_settings(
        &self,
        points: &impl BorrowedBuffer,
        attributes: &[&PointAttributeDefinition],
        settings: PointCloudRenderSettings,
    ) -> RendererResult<PointCloudId> {
        self.add_point_cloud_impl(points, attributes, Some(settings))
    }

    /// Sets the render settings of a specific point cloud,
    /// overriding the window default.
    pub fn set_point_cloud_settings(
        &self,
        id: PointCloudId,
        new_settings: PointCloudRenderSettings,
    ) -> RendererResult<()> {
        self.execute(|result_sender| RendererCommand::UpdatePointCloudSettings {
            window_id: self.window_id,
            point_cloud_id: id,
            new_settings,
            result_sender,
        })
    }

    /// Replaces the points of an existing point cloud.
    pub fn update_point_cloud(
        &self,
        id: PointCloudId,
        points: &impl BorrowedBuffer,
        attributes: &[&PointAttributeDefinition],
    ) -> RendererResult<()> {
        let positions =
            point_attribute_to_vertex_data(points, &attributes::POSITION_3D, self.renderer)?;
        let attributes = self.convert_attributes(points, attributes)?;
        self.execute(|result_sender| RendererCommand::UpdatePoints {
            window_id: self.window_id,
            point_cloud_id: id,
            positions,
            attributes,
            result_sender,
        })
    }

    /// Removes the point cloud with the given id.
    pub fn remove_point_cloud(&self, id: PointCloudId) -> RendererResult<()> {
        self.execute(|result_sender| RendererCommand::RemovePointCloud {
            window_id: self.window_id,
            point_cloud_id: id,
            result_sender,
        })
    }

    /// Adds a marker to the window.
    ///
    /// The marker is drawn as a sphere at its position and listed in the
    /// marker sidebar. Clicking either one selects the marker (see
    /// [Self::subscribe_to_selection]).
    pub fn add_marker(&self, marker: Marker) -> RendererResult<MarkerId> {
        self.execute(|result_sender| RendererCommand::AddMarker {
            window_id: self.window_id,
            marker,
            result_sender,
        })
    }

    /// Removes the marker with the given id.
    pub fn remove_marker(&self, id: MarkerId) -> RendererResult<()> {
        self.execute(|result_sender| RendererCommand::RemoveMarker {
            window_id: self.window_id,
            marker_id: id,
            result_sender,
        })
    }

    /// Displays the label and description of the given marker in the info
    /// panel, replacing the previous contents.
    pub fn show_marker_info(&self, id: MarkerId) -> RendererResult<()> {
        self.execute(|result_sender| RendererCommand::ShowMarkerInfo {
            window_id: self.window_id,
            marker_id: id,
            result_sender,
        })
    }

    /// Sets the status text (e.g. a loading message), or hides it with [None].
    pub fn set_status_text(&self, text: Option<String>) -> RendererResult<()> {
        self.execute(|result_sender| RendererCommand::SetStatusText {
            window_id: self.window_id,
            text,
            result_sender,
        })
    }

    /// Returns a receiver, that gets the id of a marker whenever the user
    /// selects one - by clicking the marker in the 3d view, or its button in
    /// the marker sidebar.
    pub fn subscribe_to_selection(
        &self,
    ) -> RendererResult<crossbeam_channel::Receiver<MarkerId>> {
        self.execute(
            |result_sender| RendererCommand::AddSelectionSubscriber {
                window_id: self.window_id,
                result_sender,
            },
        )
    }

    /// Returns a builder, that is used to initiate a camera movement.
    pub fn camera_movement(&self) -> CameraMovementBuilder {
        CameraMovementBuilder {
            window: self,
            focus: None,
        }
    }

    /// Moves the camera, so that all point clouds are fully visible.
    /// Shorthand for the more flexible [Self::camera_movement].
    pub fn focus_on_all(&self) -> RendererResult<()> {
        self.camera_movement().focus_on_all().execute()
    }
}

impl Drop for Window<'_> {
    fn drop(&mut self) {
        self.renderer.execute_command(RendererCommand::CloseWindow {
            window_id: self.window_id,
        });
    }
}

/// Builder that describes and executes a camera movement.
#[must_use]
pub struct CameraMovementBuilder<'a> {
    window: &'a Window<'a>,
    focus: Option<FocusTarget>,
}

impl CameraMovementBuilder<'_> {
    /// Positions the camera, such that all point clouds are visible.
    pub fn focus_on_all(self) -> Self {
        CameraMovementBuilder {
            focus: Some(FocusTarget::All),
            ..self
        }
    }

    /// Positions the camera, such that the contents of the given bounding box
    /// are visible on screen.
    pub fn focus_on_bounding_box(self, aabb: AABB<f64>) -> Self {
        CameraMovementBuilder {
            focus: Some(FocusTarget::BoundingBox(aabb)),
            ..self
        }
    }

    /// Positions the camera, such that the given point cloud is fully visible.
    pub fn focus_on_point_cloud(self, id: PointCloudId) -> Self {
        CameraMovementBuilder {
            focus: Some(FocusTarget::PointCloud(id)),
            ..self
        }
    }

    /// Places the camera at the marker position plus the configured
    /// [focus offset](crate::renderer::settings::MarkerStyle::focus_offset),
    /// looking at the marker.
    pub fn focus_on_marker(self, id: MarkerId) -> Self {
        CameraMovementBuilder {
            focus: Some(FocusTarget::Marker(id)),
            ..self
        }
    }

    /// Places the camera at `target + offset`, looking at `target`.
    pub fn view_from_offset(self, target: Vector3<f64>, offset: Vector3<f64>) -> Self {
        CameraMovementBuilder {
            focus: Some(FocusTarget::Point { target, offset }),
            ..self
        }
    }

    /// Executes the camera movement.
    pub fn execute(self) -> RendererResult<()> {
        let focus = match self.focus {
            // nothing to do
            None => return Ok(()),
            Some(focus) => focus,
        };
        self.window
            .execute(|result_sender| RendererCommand::CameraMovement {
                window_id: self.window.window_id,
                focus,
                result_sender,
            })
    }
}
