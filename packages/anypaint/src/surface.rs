use std::fs;
use std::path::Path as FsPath;
use std::str::FromStr;

use kurbo::{Affine, Rect};

use crate::canvas::Canvas;
use crate::error::Error;

/// Owner of one canvas and one output sink.
///
/// A surface is created for a bounding box in source units (lower-left
/// origin, y-up), serves zero or more canvas calls, and is consumed by
/// [`Surface::save_image`], the terminal state: no drawing can follow a
/// save because the surface no longer exists.
pub trait Surface: Sized {
    type Canvas: Canvas;

    fn canvas(&mut self) -> &mut Self::Canvas;

    /// Extension of the persisted artifact, used verbatim (with the dot).
    fn file_extension(&self) -> &'static str;

    /// Persist the rendered output and consume the surface. Implementations
    /// encode fully in memory and publish atomically, so a failed render
    /// never leaves a partially-written artifact behind.
    fn save_image(self, path: &FsPath) -> Result<(), Error>;
}

/// Reject bounding boxes without positive extent before any surface state
/// is built.
pub fn validate_bounding_box(bounds: Rect) -> Result<(), Error> {
    if !bounds.x0.is_finite()
        || !bounds.y0.is_finite()
        || !bounds.x1.is_finite()
        || !bounds.y1.is_finite()
        || bounds.x1 <= bounds.x0
        || bounds.y1 <= bounds.y0
    {
        return Err(Error::InvalidBoundingBox {
            x_min: bounds.x0,
            y_min: bounds.y0,
            x_max: bounds.x1,
            y_max: bounds.y1,
        });
    }
    Ok(())
}

/// The fixed coordinate-system transform every surface installs once at
/// construction, beneath all interpreter-issued transforms: it maps the
/// source bounding box (lower-left origin, y-up) onto the backend's
/// y-down space with the box's lower-left corner at the page origin.
pub fn flip_transform(bounds: Rect) -> Affine {
    Affine::new([1.0, 0.0, 0.0, -1.0, -bounds.x0, bounds.y1])
}

/// Write-then-rename publication so failures leave no partial artifact.
pub fn write_atomic(path: &FsPath, bytes: &[u8]) -> Result<(), Error> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    if let Err(err) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            log::warn!("failed to publish {}: {err}", path.display());
            let _ = fs::remove_file(&tmp);
            Err(err.into())
        }
    }
}

/// A drawing backend selectable by name, mirroring how a render harness asks
/// for an engine. Unknown names fail here, at selection time, never
/// mid-render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Raster backend over tiny-skia, persisted as PNG.
    Skia,
    /// Deferred-recording vector backend, persisted as single-page SVG.
    Svg,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Skia, Backend::Svg];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Skia => "skia",
            Backend::Svg => "svg",
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        match name {
            "skia" => Ok(Backend::Skia),
            "svg" => Ok(Backend::Svg),
            other => Err(Error::BackendUnavailable(other.to_string())),
        }
    }
}
