use kurbo::{BezPath, Point, Rect, Shape};

/// Backend-neutral geometric path built from pen-style segment commands.
///
/// Paths are append-only and never fail to build. Open (unclosed) subpaths
/// are valid and fillable; the fill rule is always nonzero winding. A path is
/// owned by the caller and read-only to the canvas that fills it.
#[derive(Clone, Debug, Default)]
pub struct Path {
    segments: BezPath,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for an axis-aligned rectangle contour.
    pub fn rect(rect: Rect) -> Self {
        let mut path = Self::new();
        path.move_to((rect.x0, rect.y0));
        path.line_to((rect.x1, rect.y0));
        path.line_to((rect.x1, rect.y1));
        path.line_to((rect.x0, rect.y1));
        path.close_path();
        path
    }

    pub fn move_to(&mut self, p: impl Into<Point>) {
        self.segments.move_to(p);
    }

    pub fn line_to(&mut self, p: impl Into<Point>) {
        self.segments.line_to(p);
    }

    pub fn cubic_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>, p3: impl Into<Point>) {
        self.segments.curve_to(p1.into(), p2.into(), p3.into());
    }

    pub fn quad_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>) {
        self.segments.quad_to(p1.into(), p2.into());
    }

    pub fn close_path(&mut self) {
        self.segments.close_path();
    }

    /// The underlying Bezier path, in caller (pre-transform) space.
    pub fn bezier(&self) -> &BezPath {
        &self.segments
    }

    pub fn bounding_box(&self) -> Rect {
        self.segments.bounding_box()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.elements().is_empty()
    }
}
