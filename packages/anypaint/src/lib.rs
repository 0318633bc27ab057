//! A 2D canvas drawing abstraction for color-font paint graphs.
//!
//! A paint-graph interpreter (for example a COLRv1 walker) drives one
//! [`Canvas`] per render: it enters scopes, applies transforms and clips, and
//! issues solid or gradient fills. Backends implement [`Canvas`] and
//! [`Surface`] on top of their native 2D engine and must agree on the
//! semantics defined here: gradient sampling, extend-mode tiling, layer
//! compositing and the fixed origin-flip transform.

mod canvas;
mod color_line;
mod composite;
mod error;
mod path;
mod surface;

pub use canvas::Canvas;
pub use color_line::{ColorLine, ColorStop, ExtendMode, ResolvedColorLine};
pub use composite::CompositeMode;
pub use error::Error;
pub use path::Path;
pub use surface::{Backend, Surface, flip_transform, validate_bounding_box, write_atomic};

pub use kurbo;
pub use peniko;
