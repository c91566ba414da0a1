//! Contains all render backends that can be used with the renderer.
//!
//! At the current state of development, the [glium] backend is the only available one.

pub mod glium;
