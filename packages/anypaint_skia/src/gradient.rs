//! Software gradient sampling for the shapes tiny-skia has no native shader
//! for: the two-circle conical (radial) gradient and the angular sweep
//! gradient. Coverage comes from a path mask, colors from the shared
//! resolver, and the result is composited as a premultiplied pixmap.

use anypaint::{Path, ResolvedColorLine};
use kurbo::{Affine, Point, Vec2};
use tiny_skia::{FillRule, Mask, Pixmap, PixmapPaint, PremultipliedColorU8, Transform};

use crate::convert::{to_skia_path, to_transform};

const EPSILON: f64 = 1e-9;

/// Gradient coordinate of `q` along the linear axis `p0 -> p1`.
pub(crate) fn linear_position(q: Point, p0: Point, p1: Point) -> Option<f64> {
    let axis = p1 - p0;
    let denom = axis.dot(axis);
    if denom < EPSILON {
        return None;
    }
    Some((q - p0).dot(axis) / denom)
}

/// Gradient coordinate of `q` in a two-circle conical gradient: the largest
/// `t` whose interpolated circle through `q` has non-negative radius, or
/// `None` where no circle reaches the point.
pub(crate) fn radial_position(
    q: Point,
    start_center: Point,
    start_radius: f64,
    end_center: Point,
    end_radius: f64,
) -> Option<f64> {
    let cd: Vec2 = end_center - start_center;
    let rd = end_radius - start_radius;
    let d = q - start_center;

    let a = cd.dot(cd) - rd * rd;
    let b = d.dot(cd) + start_radius * rd;
    let c = d.dot(d) - start_radius * start_radius;

    let radius_ok = |t: f64| start_radius + t * rd >= 0.0;

    if a.abs() < EPSILON {
        if b.abs() < EPSILON {
            return None;
        }
        let t = c / (2.0 * b);
        return radius_ok(t).then_some(t);
    }

    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let hi = (b + sq) / a;
    let lo = (b - sq) / a;
    let (first, second) = if hi >= lo { (hi, lo) } else { (lo, hi) };
    if radius_ok(first) {
        Some(first)
    } else if radius_ok(second) {
        Some(second)
    } else {
        None
    }
}

/// Gradient coordinate of `q` in an angular sweep around `center`.
///
/// The point's angle is measured counter-clockwise from the positive x axis
/// and normalized into `[0, 360)`; the coordinate is its position within the
/// `start -> end` sweep, with out-of-range values left for the extend logic.
pub(crate) fn sweep_position(
    q: Point,
    center: Point,
    start_deg: f64,
    end_deg: f64,
) -> Option<f64> {
    let span = end_deg - start_deg;
    if span.abs() < EPSILON {
        return None;
    }
    let phi = (q.y - center.y)
        .atan2(q.x - center.x)
        .to_degrees()
        .rem_euclid(360.0);
    Some((phi - start_deg) / span)
}

/// Fill `path` by sampling `position` per pixel in gradient space.
///
/// `position` receives points already mapped through the inverse of the
/// combined canvas-then-gradient transform, so the sampler itself works in
/// plain gradient coordinates. Pixels where `position` returns `None` stay
/// unpainted, matching native conical shaders.
pub(crate) fn fill_path_sampled(
    pixmap: &mut Pixmap,
    clip: Option<&Mask>,
    path: &Path,
    canvas_transform: Affine,
    gradient_transform: Affine,
    resolved: &ResolvedColorLine,
    position: impl Fn(Point) -> Option<f64>,
) {
    if canvas_transform.determinant().abs() < EPSILON {
        return;
    }
    let combined = canvas_transform * gradient_transform;
    if combined.determinant().abs() < EPSILON {
        return;
    }
    let inverse = combined.inverse();

    let Some(device_path) = to_skia_path(path) else {
        return;
    };

    // Crop to the device-space path bounds so big canvases only pay for the
    // pixels the fill can touch.
    let device_bounds = canvas_transform.transform_rect_bbox(path.bounding_box());
    let left = device_bounds.x0.floor().max(0.0) as i32;
    let top = device_bounds.y0.floor().max(0.0) as i32;
    let right = (device_bounds.x1.ceil() as i32).min(pixmap.width() as i32);
    let bottom = (device_bounds.y1.ceil() as i32).min(pixmap.height() as i32);
    if left >= right || top >= bottom {
        return;
    }
    let crop_w = (right - left) as u32;
    let crop_h = (bottom - top) as u32;

    let Some(mut coverage) = Mask::new(crop_w, crop_h) else {
        return;
    };
    let local = Affine::translate((-(left as f64), -(top as f64))) * canvas_transform;
    coverage.fill_path(&device_path, FillRule::Winding, true, to_transform(local));

    let Some(mut gradient) = Pixmap::new(crop_w, crop_h) else {
        return;
    };
    let pixels = gradient.pixels_mut();
    let coverage_data = coverage.data();
    let clip_data = clip.map(|m| (m.data(), m.width() as usize));

    for y in 0..crop_h as usize {
        for x in 0..crop_w as usize {
            let idx = y * crop_w as usize + x;
            let mut alpha = coverage_data[idx] as u16;
            if alpha == 0 {
                continue;
            }
            if let Some((data, stride)) = clip_data {
                let clip_idx = (top as usize + y) * stride + left as usize + x;
                alpha = (alpha * data[clip_idx] as u16 + 127) / 255;
                if alpha == 0 {
                    continue;
                }
            }
            let device = Point::new(
                left as f64 + x as f64 + 0.5,
                top as f64 + y as f64 + 0.5,
            );
            let Some(t) = position(inverse * device) else {
                continue;
            };
            let color = resolved.sample(t as f32).components;
            pixels[idx] = premultiply(color, alpha as u8);
        }
    }

    pixmap.draw_pixmap(
        left,
        top,
        gradient.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

fn premultiply(components: [f32; 4], coverage: u8) -> PremultipliedColorU8 {
    let alpha = (components[3].clamp(0.0, 1.0) * coverage as f32 / 255.0).clamp(0.0, 1.0);
    let a8 = (alpha * 255.0 + 0.5) as u8;
    let channel = |c: f32| ((c.clamp(0.0, 1.0) * a8 as f32) + 0.5) as u8;
    PremultipliedColorU8::from_rgba(
        channel(components[0]),
        channel(components[1]),
        channel(components[2]),
        a8,
    )
    .unwrap_or(PremultipliedColorU8::TRANSPARENT)
}
