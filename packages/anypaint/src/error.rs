use thiserror::Error;

/// Errors surfaced by surfaces and canvases.
///
/// Degenerate gradient geometry is intentionally absent: coincident radial
/// circles and zero-length linear axes resolve to a defined flat-color
/// fallback instead of failing.
#[derive(Error, Debug)]
pub enum Error {
    /// Bounding box with a non-positive extent, rejected at surface
    /// construction before any drawing state exists.
    #[error("invalid bounding box: ({x_min}, {y_min}, {x_max}, {y_max})")]
    InvalidBoundingBox {
        x_min: f64,
        y_min: f64,
        x_max: f64,
        y_max: f64,
    },

    /// A vector surface's recorded content must start exactly at the page
    /// origin; anything else is a contract violation and nothing is written.
    #[error("recorded content origin ({x}, {y}) is not the page origin")]
    OriginViolation { x: f64, y: f64 },

    /// Unknown backend name at selection time, never mid-render.
    #[error("backend {0:?} is not available")]
    BackendUnavailable(String),

    /// Pixel or layer buffer allocation failed.
    #[error("failed to allocate a {width}x{height} buffer")]
    Allocation { width: u32, height: u32 },

    /// A layer or state pop without a matching push.
    #[error("scope pop without matching push")]
    UnbalancedScope,

    /// Output encoding failed while the artifact was still in memory.
    #[error("failed to encode output: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
