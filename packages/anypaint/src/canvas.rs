use kurbo::{Affine, Point};
use peniko::Color;

use crate::color_line::{ColorLine, ExtendMode};
use crate::composite::CompositeMode;
use crate::error::Error;
use crate::path::Path;

/// Stateful drawing context a paint-graph interpreter issues fills into.
///
/// Implementations keep a scoped stack of (transform, clip) state plus a
/// stack of compositing layers. The interpreter drives one canvas per render
/// with the grammar: enter scope, apply transforms and clips, then either a
/// terminal fill or a composite scope recursing into children, then exit.
///
/// The push/pop primitives obey strict stack discipline; callers should
/// prefer [`Canvas::with_saved_state`] and [`Canvas::with_composite_mode`],
/// which guarantee the matching pop on every exit path, so transforms and
/// clips pushed inside a scope never leak outward even when the body fails.
pub trait Canvas {
    /// A fresh empty path; part of the backend capability set so an
    /// interpreter can stay fully backend-generic.
    fn new_path(&self) -> Path {
        Path::new()
    }

    fn push_state(&mut self);

    fn pop_state(&mut self);

    /// Open a transparent compositing layer. The layer's accumulated content
    /// is flattened onto its parent as a single unit by
    /// [`Canvas::pop_composite`] using `mode`; whole-layer flattening is
    /// what makes the non-separable blend modes well defined.
    fn push_composite(&mut self, mode: CompositeMode) -> Result<(), Error>;

    /// Flatten the top layer onto its parent. Flattening happens exactly
    /// once per pushed layer, even when nothing was drawn into it.
    fn pop_composite(&mut self) -> Result<(), Error>;

    /// Concatenate onto the current transform; reverted on scope exit.
    fn transform(&mut self, affine: Affine);

    /// Intersect the current clip with the path's nonzero-filled region.
    /// Clips only ever shrink; scope exit restores the previous clip.
    fn clip_path(&mut self, path: &Path);

    /// Flat fill through the current transform and clip.
    fn draw_path_solid(&mut self, path: &Path, color: Color);

    /// Gradient along the axis `p0 -> p1` in gradient space.
    ///
    /// `gradient_transform` positions the gradient geometry only: it is
    /// composed after (inside) the canvas transform and does not move the
    /// path. A zero-length axis falls back to a flat end-stop fill.
    fn draw_path_linear_gradient(
        &mut self,
        path: &Path,
        color_line: &ColorLine,
        p0: Point,
        p1: Point,
        extend: ExtendMode,
        gradient_transform: Affine,
    );

    /// Two-circle conical gradient from `(start_center, start_radius)` to
    /// `(end_center, end_radius)`. Coincident circles (equal centers and
    /// radii) degenerate to a flat end-stop fill rather than dividing by
    /// zero.
    #[allow(clippy::too_many_arguments)]
    fn draw_path_radial_gradient(
        &mut self,
        path: &Path,
        color_line: &ColorLine,
        start_center: Point,
        start_radius: f64,
        end_center: Point,
        end_radius: f64,
        extend: ExtendMode,
        gradient_transform: Affine,
    );

    /// Angular gradient sweeping counter-clockwise from `start_angle` to
    /// `end_angle`, both in degrees. Angles outside the sweep go through the
    /// same extend logic as offset-domain gradients.
    #[allow(clippy::too_many_arguments)]
    fn draw_path_sweep_gradient(
        &mut self,
        path: &Path,
        color_line: &ColorLine,
        center: Point,
        start_angle: f64,
        end_angle: f64,
        extend: ExtendMode,
        gradient_transform: Affine,
    );

    /// Run `body` inside a saved-state scope. The state is restored before
    /// this returns, on the error path as much as on success.
    fn with_saved_state<R>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error>
    where
        Self: Sized,
    {
        self.push_state();
        let result = body(self);
        self.pop_state();
        result
    }

    /// Run `body` inside a compositing layer flattened with `mode`.
    ///
    /// The layer is flattened exactly once when `body` returns, whether it
    /// drew anything or not and whether it succeeded or not; a failed pop
    /// takes precedence only if the body itself succeeded.
    fn with_composite_mode<R>(
        &mut self,
        mode: CompositeMode,
        body: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error>
    where
        Self: Sized,
    {
        self.push_composite(mode)?;
        let result = body(self);
        let popped = self.pop_composite();
        match (result, popped) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) => Err(err),
        }
    }
}
