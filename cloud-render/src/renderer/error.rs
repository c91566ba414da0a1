//! Error types returned by the renderer.

use crate::renderer::renderer_command::{MarkerId, PointCloudId, WindowId};
use pasture_core::layout::PointAttributeDefinition;
use std::error::Error;

/// Shorthand for a [Result] with a [RendererError].
pub type RendererResult<T> = Result<T, RendererError>;

/// Error type returned by the renderer.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    /// The window was closed by the user.
    #[error("the window is closed")]
    WindowClosed { id: WindowId },

    /// Some GPU operation was unsuccessful
    /// (e.g. a shader failed to compile, or graphics memory ran out).
    #[error("gpu error: {source}")]
    Graphics {
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    /// The operation is not supported by the render backend.
    #[error("the graphics backend `{backend_name}` does not support `{operation_name}`")]
    UnsupportedOperation {
        /// Name of the backend that is in use.
        backend_name: &'static str,

        /// Operation that was attempted.
        operation_name: String,
    },

    /// The point cloud, that was referred to, does not exist.
    #[error("the point cloud does not exist")]
    PointCloudDoesNotExist { id: PointCloudId },

    /// The marker, that was referred to, does not exist.
    #[error("the marker does not exist")]
    MarkerDoesNotExist { id: MarkerId },

    /// The referred-to attribute is missing in the point cloud,
    /// or its data type cannot be used for the requested purpose.
    #[error("the attribute {attribute} is missing or has an unusable data type")]
    AttributeMismatch { attribute: PointAttributeDefinition },
}
