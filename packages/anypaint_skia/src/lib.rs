//! Raster backend over [tiny-skia].
//!
//! [`PixelSurface`] owns a premultiplied RGBA pixmap sized from the source
//! bounding box and serves a [`SkiaCanvas`] that draws into it with the
//! origin flip already installed. Saving encodes PNG fully in memory and
//! publishes the file atomically.
//!
//! [tiny-skia]: https://github.com/linebender/tiny-skia

mod canvas;
mod convert;
mod gradient;

use std::path::Path as FsPath;

use anypaint::{Error, Surface, flip_transform, validate_bounding_box, write_atomic};
use kurbo::Rect;
use tiny_skia::Pixmap;

pub use canvas::SkiaCanvas;

/// Raster surface persisted as PNG.
pub struct PixelSurface {
    canvas: SkiaCanvas,
}

impl PixelSurface {
    /// Allocate a pixmap covering `bounds` (source units, lower-left
    /// origin). Pixel dimensions are the ceiling of the box extent so the
    /// whole box is covered.
    pub fn new(bounds: Rect) -> Result<Self, Error> {
        validate_bounding_box(bounds)?;
        let width = bounds.width().ceil() as u32;
        let height = bounds.height().ceil() as u32;
        let pixmap = Pixmap::new(width, height).ok_or(Error::Allocation { width, height })?;
        Ok(Self {
            canvas: SkiaCanvas::new(pixmap, flip_transform(bounds)),
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        self.canvas.pixmap()
    }

    /// Encode the current pixels as PNG without consuming the surface.
    pub fn snapshot_png(&self) -> Result<Vec<u8>, Error> {
        self.canvas
            .pixmap()
            .encode_png()
            .map_err(|err| Error::Encode(err.to_string()))
    }
}

impl Surface for PixelSurface {
    type Canvas = SkiaCanvas;

    fn canvas(&mut self) -> &mut SkiaCanvas {
        &mut self.canvas
    }

    fn file_extension(&self) -> &'static str {
        ".png"
    }

    fn save_image(self, path: &FsPath) -> Result<(), Error> {
        let pixmap = self.canvas.into_pixmap();
        let bytes = pixmap
            .encode_png()
            .map_err(|err| Error::Encode(err.to_string()))?;
        write_atomic(path, &bytes)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}
