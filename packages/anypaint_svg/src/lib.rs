//! Deferred-recording vector backend persisted as single-page SVG.
//!
//! Canvas calls are captured as a [`Recording`] and replayed into XML by
//! [`writer::write_document`] only when the surface is saved, so drawing
//! never touches the filesystem. The page contract is stricter than the
//! raster backend's: recorded content must start exactly at the page origin.

pub mod record;
pub mod writer;

use std::path::Path as FsPath;

use anypaint::{Error, Surface, flip_transform, validate_bounding_box, write_atomic};
use kurbo::{Affine, Rect};

pub use record::{Command, Recording, RecordingCanvas};
pub use writer::write_document;

/// Vector surface persisted as SVG.
pub struct SvgSurface {
    canvas: RecordingCanvas,
    base: Affine,
}

impl SvgSurface {
    /// Start a page covering `bounds`. The box must sit at the origin;
    /// a displaced box is refused here so no recording (and no file) can
    /// ever exist for it.
    pub fn new(bounds: Rect) -> Result<Self, Error> {
        validate_bounding_box(bounds)?;
        if bounds.x0 != 0.0 || bounds.y0 != 0.0 {
            return Err(Error::OriginViolation {
                x: bounds.x0,
                y: bounds.y0,
            });
        }
        Ok(Self {
            canvas: RecordingCanvas::new(bounds),
            base: flip_transform(bounds),
        })
    }

    pub fn recording(&self) -> &Recording {
        self.canvas.recording()
    }

    /// Serialize the current recording without consuming the surface.
    pub fn snapshot_svg(&self) -> Result<Vec<u8>, Error> {
        write_document(self.canvas.recording(), self.base)
    }
}

impl Surface for SvgSurface {
    type Canvas = RecordingCanvas;

    fn canvas(&mut self) -> &mut RecordingCanvas {
        &mut self.canvas
    }

    fn file_extension(&self) -> &'static str {
        ".svg"
    }

    fn save_image(self, path: &FsPath) -> Result<(), Error> {
        let base = self.base;
        let recording = self.canvas.into_recording();
        let bytes = write_document(&recording, base)?;
        write_atomic(path, &bytes)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}
