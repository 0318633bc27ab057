use anypaint::{Canvas, ColorLine, CompositeMode, Error, ExtendMode, Path, ResolvedColorLine};
use kurbo::{Affine, Point};
use peniko::Color;
use tiny_skia::{FillRule, Mask, Paint, Pixmap, PixmapPaint, Shader, Transform};

use crate::convert::{
    to_blend_mode, to_gradient_stops, to_skia_color, to_skia_path, to_spread_mode, to_transform,
};
use crate::gradient::{
    fill_path_sampled, linear_position, radial_position, sweep_position,
};

const DEGENERATE_EPSILON: f64 = 1e-9;

#[derive(Clone)]
struct State {
    transform: Affine,
    clip: Option<Mask>,
}

struct Layer {
    parent: Pixmap,
    mode: CompositeMode,
    // Clip in effect when the layer was pushed; flattening composites
    // through it so destination-affecting modes cannot touch pixels the
    // scope could not reach.
    clip: Option<Mask>,
}

/// [`Canvas`] over a tiny-skia pixel buffer.
///
/// Drawing always targets the top compositing layer; `push_composite` swaps
/// in a fresh transparent pixmap and `pop_composite` flattens it back onto
/// the parent with the mapped blend mode. Transform and clip state live in a
/// separate scoped stack and carry across layer boundaries, the way a native
/// save-layer does.
pub struct SkiaCanvas {
    pixmap: Pixmap,
    state: State,
    saved: Vec<State>,
    layers: Vec<Layer>,
}

impl SkiaCanvas {
    pub(crate) fn new(pixmap: Pixmap, base_transform: Affine) -> Self {
        Self {
            pixmap,
            state: State {
                transform: base_transform,
                clip: None,
            },
            saved: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// The pixel buffer currently receiving draws (the top layer).
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub(crate) fn into_pixmap(self) -> Pixmap {
        if !self.layers.is_empty() {
            log::warn!(
                "finishing canvas with {} unflattened layer(s)",
                self.layers.len()
            );
        }
        self.pixmap
    }

    fn fill_with_shader(&mut self, path: &Path, shader: Shader<'static>) {
        if self.state.transform.determinant().abs() < DEGENERATE_EPSILON {
            return;
        }
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        self.pixmap.fill_path(
            &skia_path,
            &paint,
            FillRule::Winding,
            to_transform(self.state.transform),
            self.state.clip.as_ref(),
        );
    }

    fn fill_solid(&mut self, path: &Path, color: Color) {
        self.fill_with_shader(path, Shader::SolidColor(to_skia_color(color)));
    }

    fn fill_sampled(
        &mut self,
        path: &Path,
        gradient_transform: Affine,
        resolved: &ResolvedColorLine,
        position: impl Fn(Point) -> Option<f64>,
    ) {
        let canvas_transform = self.state.transform;
        fill_path_sampled(
            &mut self.pixmap,
            self.state.clip.as_ref(),
            path,
            canvas_transform,
            gradient_transform,
            resolved,
            position,
        );
    }

    /// Stops a native tiny-skia shader can represent directly: already in
    /// the unit domain and non-decreasing. Anything else goes through the
    /// software sampler so caller order is honored.
    fn native_friendly(resolved: &ResolvedColorLine) -> bool {
        let stops = resolved.stops();
        stops.len() >= 2
            && stops
                .iter()
                .all(|s| (0.0..=1.0).contains(&s.offset) && s.offset.is_finite())
            && stops.windows(2).all(|w| w[0].offset <= w[1].offset)
    }
}

impl Canvas for SkiaCanvas {
    fn push_state(&mut self) {
        self.saved.push(self.state.clone());
    }

    fn pop_state(&mut self) {
        match self.saved.pop() {
            Some(state) => self.state = state,
            None => log::warn!("state pop without matching push"),
        }
    }

    fn push_composite(&mut self, mode: CompositeMode) -> Result<(), Error> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let fresh = Pixmap::new(width, height).ok_or(Error::Allocation { width, height })?;
        let parent = std::mem::replace(&mut self.pixmap, fresh);
        self.layers.push(Layer {
            parent,
            mode,
            clip: self.state.clip.clone(),
        });
        Ok(())
    }

    fn pop_composite(&mut self) -> Result<(), Error> {
        let layer = self.layers.pop().ok_or(Error::UnbalancedScope)?;
        let flattened = std::mem::replace(&mut self.pixmap, layer.parent);
        let paint = PixmapPaint {
            blend_mode: to_blend_mode(layer.mode),
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            flattened.as_ref(),
            &paint,
            Transform::identity(),
            layer.clip.as_ref(),
        );
        Ok(())
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform = self.state.transform * affine;
    }

    fn clip_path(&mut self, path: &Path) {
        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        if let Some(skia_path) = to_skia_path(path) {
            mask.fill_path(
                &skia_path,
                FillRule::Winding,
                true,
                to_transform(self.state.transform),
            );
        }
        // Intersection only: multiply against whatever clip is active.
        if let Some(existing) = &self.state.clip {
            for (dst, src) in mask.data_mut().iter_mut().zip(existing.data().iter()) {
                *dst = ((*dst as u16 * *src as u16 + 127) / 255) as u8;
            }
        }
        self.state.clip = Some(mask);
    }

    fn draw_path_solid(&mut self, path: &Path, color: Color) {
        self.fill_solid(path, color);
    }

    fn draw_path_linear_gradient(
        &mut self,
        path: &Path,
        color_line: &ColorLine,
        p0: Point,
        p1: Point,
        extend: ExtendMode,
        gradient_transform: Affine,
    ) {
        let resolved = color_line.resolve(extend);
        if color_line.is_empty() {
            return;
        }
        if let Some(color) = resolved.as_solid() {
            self.fill_solid(path, color);
            return;
        }
        if (p1 - p0).hypot2() < DEGENERATE_EPSILON {
            // Zero-length axis: defined fallback, flat end-stop fill.
            self.fill_solid(path, resolved.last_color());
            return;
        }
        if Self::native_friendly(&resolved) {
            let shader = tiny_skia::LinearGradient::new(
                tiny_skia::Point::from_xy(p0.x as f32, p0.y as f32),
                tiny_skia::Point::from_xy(p1.x as f32, p1.y as f32),
                to_gradient_stops(&resolved),
                to_spread_mode(extend),
                to_transform(gradient_transform),
            );
            if let Some(shader) = shader {
                self.fill_with_shader(path, shader);
                return;
            }
        }
        self.fill_sampled(path, gradient_transform, &resolved, |q| {
            linear_position(q, p0, p1)
        });
    }

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
    ) {
        let resolved = color_line.resolve(extend);
        if color_line.is_empty() {
            return;
        }
        if let Some(color) = resolved.as_solid() {
            self.fill_solid(path, color);
            return;
        }
        let degenerate = (end_center - start_center).hypot2() < DEGENERATE_EPSILON
            && (end_radius - start_radius).abs() < DEGENERATE_EPSILON;
        if degenerate {
            // Coincident circles: flat end-stop fill, never a division by
            // zero.
            self.fill_solid(path, resolved.last_color());
            return;
        }
        self.fill_sampled(path, gradient_transform, &resolved, |q| {
            radial_position(q, start_center, start_radius, end_center, end_radius)
        });
    }

    fn draw_path_sweep_gradient(
        &mut self,
        path: &Path,
        color_line: &ColorLine,
        center: Point,
        start_angle: f64,
        end_angle: f64,
        extend: ExtendMode,
        gradient_transform: Affine,
    ) {
        let resolved = color_line.resolve(extend);
        if color_line.is_empty() {
            return;
        }
        if let Some(color) = resolved.as_solid() {
            self.fill_solid(path, color);
            return;
        }
        if (end_angle - start_angle).abs() < DEGENERATE_EPSILON {
            log::debug!("sweep gradient with empty angular range, skipping fill");
            return;
        }
        self.fill_sampled(path, gradient_transform, &resolved, |q| {
            sweep_position(q, center, start_angle, end_angle)
        });
    }
}
