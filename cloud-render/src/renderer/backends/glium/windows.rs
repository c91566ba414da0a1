use crate::navigation::event::{MouseButton, MouseDragSettings};
use crate::navigation::orbit::OrbitNavigation;
use crate::navigation::Navigation;
use crate::picking;
use crate::renderer::backends::glium::draw_markers::MarkersRenderer;
use crate::renderer::backends::glium::draw_point_cloud::PointCloudsRenderer;
use crate::renderer::backends::glium::overlay::{self, Overlay};
use crate::renderer::error::{RendererError, RendererResult};
use crate::renderer::renderer_command::{
    FocusTarget, Marker, MarkerId, PointAttribute, PointCloudId, RendererCommand, WindowId,
};
use crate::renderer::settings::{BaseRenderSettings, MarkerStyle, PointCloudRenderSettings};
use crate::renderer::vertex_data::VertexData;
use glium::glutin::dpi::{LogicalSize, PhysicalPosition};
use glium::glutin::event::{
    DeviceId, ElementState, ModifiersState, MouseButton as WinitMouseButton, MouseScrollDelta,
    WindowEvent,
};
use glium::glutin::event_loop::EventLoopWindowTarget;
use glium::glutin::window::WindowId as OsWindowId;
use glium::{glutin, Display, Surface};
use log::debug;
use pasture_core::nalgebra::Vector2;
use std::collections::HashMap;

/// How far (in logical pixels) the cursor may travel between pressing and
/// releasing a mouse button for the gesture to still count as a click.
/// Anything further is an orbit drag and never selects a marker.
const CLICK_DRAG_TOLERANCE: f64 = 4.0;

struct DragState {
    device: DeviceId,
    button: WinitMouseButton,
    modifiers: ModifiersState,
    start_position: Option<PhysicalPosition<f64>>,
    exceeded_click_tolerance: bool,
}

pub struct Window {
    display: Display,
    closed_notify_sender: crossbeam_channel::Sender<()>,
    render_settings: BaseRenderSettings,
    point_clouds: PointCloudsRenderer,
    markers: MarkersRenderer,
    overlay: Overlay,
    current_scale_factor: f64,
    modifiers: ModifiersState,
    cursors: HashMap<DeviceId, PhysicalPosition<f64>>,
    current_drag: Option<DragState>,
    nav_controller: Box<dyn Navigation>,
    selection_subscribers: Vec<crossbeam_channel::Sender<MarkerId>>,
}

pub struct WindowManager {
    window_id_counter: WindowId,
    windows_by_id: HashMap<WindowId, Window>,
}

impl WindowManager {
    pub fn new() -> Self {
        WindowManager {
            window_id_counter: WindowId::begin(),
            windows_by_id: HashMap::new(),
        }
    }

    pub fn open_window(
        &mut self,
        event_loop: &EventLoopWindowTarget<RendererCommand>,
        closed_notify_sender: crossbeam_channel::Sender<()>,
        multisampling: u16,
    ) -> RendererResult<WindowId> {
        // Create window
        let wb = glutin::window::WindowBuilder::new()
            .with_title("Point Cloud Viewer")
            .with_inner_size(LogicalSize::new(500, 500));
        let gl_window = glutin::ContextBuilder::new()
            .with_gl(glutin::GlRequest::Specific(glutin::Api::OpenGl, (4, 0)))
            .with_gl_profile(glutin::GlProfile::Core)
            .with_multisampling(multisampling)
            .with_depth_buffer(24)
            .with_vsync(true)
            .build_windowed(wb, event_loop)
            .map_err(|e| RendererError::Graphics {
                source: Box::new(e),
            })?;
        let display = Display::from_gl_window(gl_window).map_err(|e| RendererError::Graphics {
            source: Box::new(e),
        })?;
        let render_settings = BaseRenderSettings::default();
        let point_clouds = PointCloudsRenderer::new();
        let markers = MarkersRenderer::new(&display)?;
        let overlay = Overlay::new(&display, event_loop);
        let modifiers = ModifiersState::default();
        let cursors = HashMap::new();
        let current_drag = None;
        let nav_controller: Box<dyn Navigation> = Box::new(OrbitNavigation::new());
        let current_scale_factor = display.gl_window().window().scale_factor();
        let current_size = display.gl_window().window().inner_size();

        let mut window = Window {
            display,
            closed_notify_sender,
            render_settings,
            point_clouds,
            markers,
            overlay,
            current_scale_factor,
            modifiers,
            cursors,
            current_drag,
            nav_controller,
            selection_subscribers: vec![],
        };

        // initialize size and scale factor
        let mut tmp = current_size;
        window.process_window_event(WindowEvent::ScaleFactorChanged {
            scale_factor: current_scale_factor,
            new_inner_size: &mut tmp,
        });
        window.process_window_event(WindowEvent::Resized(current_size));

        // log
        debug!(
            "Window opened: {:?}",
            window.display.gl_window().window().id()
        );
        debug!(
            "OpenGL version: {}",
            window.display.get_opengl_version_string()
        );
        debug!(
            "OpenGL vendor: {}",
            window.display.get_opengl_vendor_string()
        );
        debug!(
            "OpenGL renderer: {}",
            window.display.get_opengl_renderer_string()
        );
        debug!("OpenGL profile: {:?}", window.display.get_opengl_profile());

        // insert window
        let id = self.window_id_counter.next();
        self.windows_by_id.insert(id, window);
        Ok(id)
    }

    pub fn window_by_id_mut(&mut self, id: WindowId) -> RendererResult<&mut Window> {
        match self.windows_by_id.get_mut(&id) {
            None => Err(RendererError::WindowClosed { id }),
            Some(win) => Ok(win),
        }
    }

    pub fn window_by_os_id_mut(&mut self, os_window_id: OsWindowId) -> Option<&mut Window> {
        self.windows_by_id
            .values_mut()
            .find(|it| it.display.gl_window().window().id() == os_window_id)
    }

    pub fn close(&mut self, id: WindowId) {
        self.windows_by_id.remove(&id);
    }

    pub fn close_os(&mut self, id: OsWindowId) {
        let item = self
            .windows_by_id
            .iter()
            .find(|(_, v)| v.display.gl_window().window().id() == id);
        if let Some((&k, _)) = item {
            self.close(k.to_owned());
        }
    }
}

impl Window {
    pub fn request_redraw(&self) {
        self.display.gl_window().window().request_redraw()
    }

    pub fn process_window_event(&mut self, event: WindowEvent) {
        // the overlay gets the event first and can consume it
        // (e.g. clicks on the marker sidebar)
        let overlay_response = self.overlay.on_event(&event);
        if overlay_response.repaint {
            self.request_redraw();
        }
        if overlay_response.consumed {
            return;
        }

        match event {
            WindowEvent::ModifiersChanged(new_modifiers) => {
                self.modifiers = new_modifiers;
            }
            WindowEvent::CursorMoved {
                position,
                device_id,
                ..
            } => {
                let previous = self.cursors.insert(device_id, position);
                if let Some(previous_position) = previous {
                    if let Some(drag) = &mut self.current_drag {
                        if device_id == drag.device {
                            let start = *drag.start_position.get_or_insert(previous_position);
                            let moved_x = position.x - start.x;
                            let moved_y = position.y - start.y;
                            let tolerance = CLICK_DRAG_TOLERANCE * self.current_scale_factor;
                            if moved_x * moved_x + moved_y * moved_y > tolerance * tolerance {
                                drag.exceeded_click_tolerance = true;
                            }

                            let drag_settings = MouseDragSettings {
                                button: match drag.button {
                                    WinitMouseButton::Left => MouseButton::Left,
                                    WinitMouseButton::Middle => MouseButton::Middle,
                                    WinitMouseButton::Right => MouseButton::Right,
                                    WinitMouseButton::Other(_) => MouseButton::Other,
                                },
                                shift_pressed: drag.modifiers.shift(),
                                ctrl_pressed: drag.modifiers.ctrl(),
                                alt_pressed: drag.modifiers.alt(),
                            };
                            self.nav_controller.on_drag(
                                previous_position.x / self.current_scale_factor,
                                previous_position.y / self.current_scale_factor,
                                position.x / self.current_scale_factor,
                                position.y / self.current_scale_factor,
                                drag_settings,
                            );
                            self.request_redraw();
                        }
                    }
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.current_scale_factor = scale_factor;
            }
            WindowEvent::Resized(size) => {
                self.nav_controller.on_window_resized(
                    size.width as f64 / self.current_scale_factor,
                    size.height as f64 / self.current_scale_factor,
                );
                self.request_redraw();
            }
            WindowEvent::MouseInput {
                state,
                button,
                device_id,
                ..
            } => match state {
                ElementState::Pressed => {
                    if self.current_drag.is_none() {
                        self.current_drag = Some(DragState {
                            device: device_id,
                            button,
                            modifiers: self.modifiers,
                            start_position: self.cursors.get(&device_id).copied(),
                            exceeded_click_tolerance: false,
                        });
                    }
                }
                ElementState::Released => {
                    if let Some(drag) = &self.current_drag {
                        if device_id == drag.device && button == drag.button {
                            let is_click = !drag.exceeded_click_tolerance
                                && drag.button == WinitMouseButton::Left;
                            self.current_drag = None;
                            if is_click {
                                self.click(device_id);
                            }
                        }
                    }
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_amount = match delta {
                    MouseScrollDelta::LineDelta(_, delta_y) => {
                        // assume a line to be equivalent to 20 logical pixels
                        delta_y as f64 * 20.0
                    }
                    MouseScrollDelta::PixelDelta(delta) => delta.y / self.current_scale_factor,
                };
                self.nav_controller.on_scroll(scroll_amount);
                self.request_redraw();
            }
            _ => (),
        }
    }

    /// Casts a ray through the clicked position and selects the nearest
    /// marker it hits. A click into empty space does nothing.
    fn click(&mut self, device_id: DeviceId) {
        let position = match self.cursors.get(&device_id) {
            None => return,
            Some(p) => Vector2::new(
                p.x / self.current_scale_factor,
                p.y / self.current_scale_factor,
            ),
        };
        let matrices = self.nav_controller.update();
        let hit = picking::pick(&matrices, position, self.markers.spheres());
        if let Some(marker_id) = hit {
            self.broadcast_selection(marker_id);
        }
    }

    fn broadcast_selection(&mut self, marker_id: MarkerId) {
        let mut it = 0;
        while it < self.selection_subscribers.len() {
            let subscriber = &self.selection_subscribers[it];
            match subscriber.send(marker_id) {
                Ok(_) => it += 1,
                Err(_) => {
                    // a send operation can only fail, if the receiving end of
                    // the channel is disconnected.
                    self.selection_subscribers.swap_remove(it);
                }
            }
        }
    }

    pub fn draw(&mut self) -> RendererResult<()> {
        // get the camera matrices
        let matrices = self.nav_controller.update();
        let view_projection = matrices.projection_matrix * matrices.view_matrix;

        // draw background
        let mut frame = self.display.draw();
        frame.clear_color_and_depth(
            (
                self.render_settings.bg_color.r,
                self.render_settings.bg_color.g,
                self.render_settings.bg_color.b,
                1.0,
            ),
            1.0,
        );

        // draw point clouds and markers
        self.point_clouds
            .draw(&mut frame, self.current_scale_factor, &view_projection)
            .unwrap();
        self.markers.draw(&mut frame, &view_projection).unwrap();

        // overlay on top
        let overlay_output = self.overlay.run(
            &self.display,
            &self.render_settings,
            &matrices.camera_pose(),
            self.markers.markers(),
        );
        self.overlay.paint(&self.display, &mut frame);

        let result = frame.finish().map_err(|e| RendererError::Graphics {
            source: Box::new(e),
        });

        // selecting a marker in the sidebar behaves exactly like clicking it
        for marker_id in overlay_output.clicked_markers {
            self.broadcast_selection(marker_id);
        }
        if overlay_output.repaint_after.is_zero() {
            self.request_redraw();
        }

        result
    }

    pub fn set_title(&mut self, title: &str) {
        self.display.gl_window().window().set_title(title);
    }

    pub fn update_settings(&mut self, new_settings: BaseRenderSettings) -> RendererResult<()> {
        self.set_title(&new_settings.window_title);
        self.render_settings = new_settings;
        self.request_redraw();
        Ok(())
    }

    pub fn update_marker_style(&mut self, new_style: MarkerStyle) -> RendererResult<()> {
        self.markers.set_style(new_style);
        self.request_redraw();
        Ok(())
    }

    pub fn update_default_point_cloud_render_settings(
        &mut self,
        new_settings: PointCloudRenderSettings,
    ) -> RendererResult<()> {
        let result = self
            .point_clouds
            .update_default_settings(&self.display, &new_settings);
        self.request_redraw();
        result
    }

    pub fn update_point_cloud_render_settings(
        &mut self,
        point_cloud_id: PointCloudId,
        new_settings: Option<PointCloudRenderSettings>,
    ) -> RendererResult<()> {
        let result = self
            .point_clouds
            .update_settings(&self.display, point_cloud_id, new_settings);
        self.request_redraw();
        result
    }

    pub fn add_point_cloud(
        &mut self,
        positions: &VertexData,
        attributes: &[PointAttribute],
        render_settings: &Option<PointCloudRenderSettings>,
    ) -> RendererResult<PointCloudId> {
        let result = self
            .point_clouds
            .add(&self.display, positions, attributes, render_settings);
        self.request_redraw();
        result
    }

    pub fn update_points(
        &mut self,
        id: PointCloudId,
        positions: &VertexData,
        attributes: &[PointAttribute],
    ) -> RendererResult<()> {
        let result = self
            .point_clouds
            .update_points(&self.display, id, positions, attributes);
        self.request_redraw();
        result
    }

    pub fn remove_point_cloud(&mut self, id: PointCloudId) -> RendererResult<()> {
        let result = self.point_clouds.remove(id);
        self.request_redraw();
        result
    }

    pub fn add_marker(&mut self, marker: Marker) -> RendererResult<MarkerId> {
        let id = self.markers.add(marker);
        self.request_redraw();
        Ok(id)
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> RendererResult<()> {
        let result = self.markers.remove(id);
        self.request_redraw();
        result
    }

    pub fn show_marker_info(&mut self, id: MarkerId) -> RendererResult<()> {
        let marker = self.markers.get(id)?;
        self.overlay.set_info_text(overlay::marker_info_text(marker));
        self.request_redraw();
        Ok(())
    }

    pub fn set_status_text(&mut self, text: Option<String>) -> RendererResult<()> {
        self.overlay.set_status_text(text);
        self.request_redraw();
        Ok(())
    }

    pub fn add_selection_subscriber(&mut self) -> crossbeam_channel::Receiver<MarkerId> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.selection_subscribers.push(sender);
        receiver
    }

    pub fn move_camera(&mut self, focus: FocusTarget) -> RendererResult<()> {
        match focus {
            FocusTarget::All => {
                if let Some(aabb) = self.point_clouds.bounding_box() {
                    self.nav_controller.focus_on(aabb);
                }
            }
            FocusTarget::BoundingBox(aabb) => {
                self.nav_controller.focus_on(aabb);
            }
            FocusTarget::PointCloud(id) => {
                if let Some(aabb) = self.point_clouds.point_cloud_bounding_box(id)? {
                    self.nav_controller.focus_on(aabb);
                }
            }
            FocusTarget::Marker(id) => {
                let target = self.markers.get(id)?.position;
                let offset = self.markers.style().focus_offset;
                self.nav_controller.focus_on_point(target, offset);
            }
            FocusTarget::Point { target, offset } => {
                self.nav_controller.focus_on_point(target, offset);
            }
        }
        self.request_redraw();
        Ok(())
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.closed_notify_sender.send(()).ok();
        debug!(
            "Window closed: {:?}",
            self.display.gl_window().window().id()
        );
    }
}
