//! The 2d overlay that is drawn on top of the 3d viewport.
//!
//! It contains the camera telemetry block, the marker sidebar with its toggle
//! button, the marker info panel and the status line. The overlay is drawn
//! with egui and consumes input events before the navigation sees them.

use crate::navigation::CameraPose;
use crate::renderer::renderer_command::{Marker, MarkerId};
use crate::renderer::settings::BaseRenderSettings;
use egui::{Align2, Id};
use egui_glium::EguiGlium;
use glium::glutin::event::WindowEvent;
use glium::glutin::event_loop::EventLoopWindowTarget;
use glium::{Display, Frame};
use std::time::Duration;

pub struct Overlay {
    egui_glium: EguiGlium,
    show_marker_panel: bool,
    info_text: Option<String>,
    status_text: Option<String>,
}

/// How the overlay reacted to an input event.
pub struct OverlayEventResponse {
    /// The event was consumed by the overlay
    /// and should not reach the navigation.
    pub consumed: bool,

    /// The overlay wants to be redrawn.
    pub repaint: bool,
}

/// The result of building the overlay ui for one frame.
pub struct OverlayOutput {
    /// Markers, whose sidebar button was clicked this frame.
    pub clicked_markers: Vec<MarkerId>,

    /// Time until the overlay wants to be redrawn
    /// (zero while an animation is playing).
    pub repaint_after: Duration,
}

/// Renders the camera placement the way the telemetry block displays it.
pub fn camera_stats_text(pose: &CameraPose) -> String {
    format!(
        "Camera position:\n  x: {:.2}\n  y: {:.2}\n  z: {:.2}\n\
         Camera rotation:\n  x: {:.2}\n  y: {:.2}\n  z: {:.2}",
        pose.position.x,
        pose.position.y,
        pose.position.z,
        pose.rotation.x,
        pose.rotation.y,
        pose.rotation.z,
    )
}

/// Renders the text shown in the info panel for a selected marker.
pub fn marker_info_text(marker: &Marker) -> String {
    format!("{}: {}", marker.label, marker.description)
}

/// The label of the sidebar toggle button.
fn toggle_button_label(panel_shown: bool) -> &'static str {
    if panel_shown {
        "Hide POIs"
    } else {
        "Show POIs"
    }
}

impl Overlay {
    pub fn new<E>(display: &Display, event_loop: &EventLoopWindowTarget<E>) -> Self {
        Overlay {
            egui_glium: EguiGlium::new(display, event_loop),
            show_marker_panel: false,
            info_text: None,
            status_text: None,
        }
    }

    /// Gives the overlay a chance to handle an input event before the
    /// navigation does.
    pub fn on_event(&mut self, event: &WindowEvent<'_>) -> OverlayEventResponse {
        let response = self.egui_glium.on_event(event);
        OverlayEventResponse {
            consumed: response.consumed,
            repaint: response.repaint,
        }
    }

    pub fn set_info_text(&mut self, text: String) {
        self.info_text = Some(text);
    }

    pub fn set_status_text(&mut self, text: Option<String>) {
        self.status_text = text;
    }

    /// Builds the overlay ui for the current frame.
    /// The actual drawing happens afterwards, in [Self::paint].
    pub fn run(
        &mut self,
        display: &Display,
        settings: &BaseRenderSettings,
        camera: &CameraPose,
        markers: &[(MarkerId, Marker)],
    ) -> OverlayOutput {
        let Overlay {
            egui_glium,
            show_marker_panel,
            info_text,
            status_text,
        } = self;

        let mut clicked_markers = Vec::new();
        let repaint_after = egui_glium.run(display, |ctx| {
            if settings.show_camera_stats {
                egui::Area::new(Id::new("camera stats"))
                    .anchor(Align2::LEFT_TOP, [8.0, 8.0])
                    .show(ctx, |ui| {
                        egui::Frame::popup(&ctx.style()).show(ui, |ui| {
                            ui.monospace(camera_stats_text(camera));
                        });
                    });
            }

            egui::Area::new(Id::new("marker sidebar"))
                .anchor(Align2::RIGHT_TOP, [-8.0, 8.0])
                .show(ctx, |ui| {
                    egui::Frame::popup(&ctx.style()).show(ui, |ui| {
                        if ui.button(toggle_button_label(*show_marker_panel)).clicked() {
                            *show_marker_panel = !*show_marker_panel;
                        }
                        if *show_marker_panel {
                            ui.separator();
                            for (id, marker) in markers {
                                if ui.button(marker.label.as_str()).clicked() {
                                    clicked_markers.push(*id);
                                }
                            }
                        }
                    });
                });

            if let Some(text) = info_text {
                egui::Area::new(Id::new("marker info"))
                    .anchor(Align2::LEFT_BOTTOM, [8.0, -8.0])
                    .show(ctx, |ui| {
                        egui::Frame::popup(&ctx.style()).show(ui, |ui| {
                            ui.label(text.as_str());
                        });
                    });
            }

            if let Some(text) = status_text {
                egui::Area::new(Id::new("status"))
                    .anchor(Align2::CENTER_BOTTOM, [0.0, -24.0])
                    .show(ctx, |ui| {
                        egui::Frame::popup(&ctx.style()).show(ui, |ui| {
                            ui.label(text.as_str());
                        });
                    });
            }
        });

        OverlayOutput {
            clicked_markers,
            repaint_after,
        }
    }

    /// Draws the ui built by the last call to [Self::run] on top of the frame.
    pub fn paint(&mut self, display: &Display, frame: &mut Frame) {
        self.egui_glium.paint(display, frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasture_core::nalgebra::Vector3;

    #[test]
    fn camera_stats_have_two_decimal_places() {
        let pose = CameraPose {
            position: Vector3::new(4.0, 2.0, 1.0),
            rotation: Vector3::new(-0.463, 1.3, 0.624),
        };
        let text = camera_stats_text(&pose);
        assert_eq!(
            text,
            "Camera position:\n  x: 4.00\n  y: 2.00\n  z: 1.00\n\
             Camera rotation:\n  x: -0.46\n  y: 1.30\n  z: 0.62"
        );
    }

    #[test]
    fn toggling_the_panel_twice_restores_the_button_label() {
        let mut shown = false;
        let initial_label = toggle_button_label(shown);
        shown = !shown;
        assert_ne!(toggle_button_label(shown), initial_label);
        shown = !shown;
        assert_eq!(toggle_button_label(shown), initial_label);
    }

    #[test]
    fn marker_info_is_label_colon_description() {
        let marker = Marker {
            label: "POI 1".to_string(),
            description: "This is point of interest #1".to_string(),
            position: Vector3::zeros(),
        };
        assert_eq!(
            marker_info_text(&marker),
            "POI 1: This is point of interest #1"
        );
    }
}
