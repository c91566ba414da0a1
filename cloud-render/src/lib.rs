//! An interactive renderer for point clouds with clickable markers.
//!
//! The renderer runs on its own thread and is controlled through the handle
//! types in [renderer::viewer]. A window displays any number of point clouds,
//! a set of labeled markers, and an overlay with camera telemetry, a marker
//! sidebar and a status line.

pub mod navigation;
pub mod picking;
pub mod renderer;

pub use crossbeam_channel;
