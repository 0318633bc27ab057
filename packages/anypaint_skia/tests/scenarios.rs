//! End-to-end rendering checks against the raster backend: known scenes are
//! drawn through the `Canvas` trait and verified by reading pixels back.

use anypaint::{Canvas, ColorLine, CompositeMode, Error, ExtendMode, Path, Surface};
use anypaint_skia::PixelSurface;
use kurbo::{Affine, Point, Rect};
use peniko::Color;
use peniko::color::palette::css::{BLACK, BLUE, RED};

fn pixel(surface: &PixelSurface, x: u32, y: u32) -> (u8, u8, u8, u8) {
    let p = surface
        .pixmap()
        .pixel(x, y)
        .expect("pixel inside surface")
        .demultiply();
    (p.red(), p.green(), p.blue(), p.alpha())
}

fn full_cover(bounds: Rect) -> Path {
    // Generous overfill so anti-aliased edges never reach sampled pixels.
    Path::rect(bounds.inflate(10.0, 10.0))
}

#[test]
fn linear_gradient_band_with_markers() {
    let bounds = Rect::new(0.0, 0.0, 600.0, 100.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    let canvas = surface.canvas();

    let line = ColorLine::new([(0.0, RED), (1.0, BLUE)]);
    canvas.draw_path_linear_gradient(
        &full_cover(bounds),
        &line,
        Point::new(200.0, 0.0),
        Point::new(400.0, 0.0),
        ExtendMode::Pad,
        Affine::IDENTITY,
    );
    for x in [200.0, 400.0] {
        canvas.draw_path_solid(&Path::rect(Rect::new(x - 1.0, 0.0, x + 1.0, 100.0)), BLACK);
    }

    // Before the axis start: padded to the first stop.
    assert_eq!(pixel(&surface, 100, 50), (255, 0, 0, 255));
    // Past the axis end: padded to the last stop.
    assert_eq!(pixel(&surface, 500, 50), (0, 0, 255, 255));
    // Midway along the axis: roughly half red, half blue.
    let (r, g, b, a) = pixel(&surface, 300, 50);
    assert!((100..=160).contains(&r), "mid red channel {r}");
    assert!((100..=160).contains(&b), "mid blue channel {b}");
    assert_eq!(g, 0);
    assert_eq!(a, 255);
    // Markers sit exactly on the gradient endpoints.
    assert_eq!(pixel(&surface, 200, 50), (0, 0, 0, 255));
    assert_eq!(pixel(&surface, 400, 50), (0, 0, 0, 255));
}

#[test]
fn single_stop_gradients_match_the_solid_fill() {
    let bounds = Rect::new(0.0, 0.0, 64.0, 64.0);
    let line = ColorLine::new([(0.4, RED)]);
    let shape = Path::rect(Rect::new(8.0, 8.0, 56.0, 56.0));

    let mut reference = PixelSurface::new(bounds).unwrap();
    reference.canvas().draw_path_solid(&shape, RED);

    let mut linear = PixelSurface::new(bounds).unwrap();
    linear.canvas().draw_path_linear_gradient(
        &shape,
        &line,
        Point::new(0.0, 0.0),
        Point::new(64.0, 0.0),
        ExtendMode::Repeat,
        Affine::IDENTITY,
    );
    assert_eq!(linear.pixmap().data(), reference.pixmap().data());

    let mut radial = PixelSurface::new(bounds).unwrap();
    radial.canvas().draw_path_radial_gradient(
        &shape,
        &line,
        Point::new(32.0, 32.0),
        0.0,
        Point::new(32.0, 32.0),
        30.0,
        ExtendMode::Reflect,
        Affine::IDENTITY,
    );
    assert_eq!(radial.pixmap().data(), reference.pixmap().data());

    let mut sweep = PixelSurface::new(bounds).unwrap();
    sweep.canvas().draw_path_sweep_gradient(
        &shape,
        &line,
        Point::new(32.0, 32.0),
        0.0,
        360.0,
        ExtendMode::Pad,
        Affine::IDENTITY,
    );
    assert_eq!(sweep.pixmap().data(), reference.pixmap().data());
}

#[test]
fn sweep_hard_stop_splits_at_the_edge_angle() {
    let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
    let mut surface = PixelSurface::new(bounds).unwrap();

    let green = Color::from_rgba8(0, 255, 0, 255);
    let yellow = Color::from_rgba8(255, 255, 0, 255);
    let line = ColorLine::new([(0.0, green), (0.5, green), (0.5, yellow), (1.0, yellow)]);
    surface.canvas().draw_path_sweep_gradient(
        &full_cover(bounds),
        &line,
        Point::new(200.0, 200.0),
        0.0,
        360.0,
        ExtendMode::Repeat,
        Affine::IDENTITY,
    );

    // The hard edge sits on the 180-degree ray (source space, y-up), which
    // is the horizontal line left of center. Above it the angle is just
    // under 180 (green half); below it just over (yellow half). The origin
    // flip maps source y=210 to device row 190 and vice versa.
    let (r_above, g_above, ..) = pixel(&surface, 100, 189);
    assert_eq!(r_above, 0, "above the edge should be green");
    assert_eq!(g_above, 255);
    let (r_below, g_below, ..) = pixel(&surface, 100, 210);
    assert_eq!(r_below, 255, "below the edge should be yellow");
    assert_eq!(g_below, 255);
}

#[test]
fn partial_sweep_wraps_out_of_range_angles_under_repeat() {
    let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
    let mut surface = PixelSurface::new(bounds).unwrap();

    let line = ColorLine::new([
        (0.0, RED),
        (0.25, RED),
        (0.5, RED),
        (0.5, BLUE),
        (1.0, BLUE),
    ]);
    surface.canvas().draw_path_sweep_gradient(
        &full_cover(bounds),
        &line,
        Point::new(200.0, 200.0),
        45.0,
        315.0,
        ExtendMode::Repeat,
        Affine::IDENTITY,
    );

    // The hard edge inside the sweep sits at 180 degrees (t = 0.5): red
    // just above the leftward ray, blue just below it (source space, y-up).
    assert_eq!(pixel(&surface, 50, 189), (255, 0, 0, 255));
    assert_eq!(pixel(&surface, 50, 210), (0, 0, 255, 255));

    // The rightward ray (0 degrees) lies outside the 45..315 sweep, so its
    // colors come entirely from the repeat wrap: just above the ray the
    // angle is slightly positive and t = -0.166 wraps to 0.834 (blue);
    // just below, the normalized angle is near 360 and t = 1.166 wraps to
    // 0.166 (red).
    assert_eq!(pixel(&surface, 350, 199), (0, 0, 255, 255));
    assert_eq!(pixel(&surface, 350, 200), (255, 0, 0, 255));
}

#[test]
fn coincident_radial_circles_fill_flat() {
    let bounds = Rect::new(0.0, 0.0, 64.0, 64.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    let line = ColorLine::new([(0.0, RED), (1.0, BLUE)]);
    surface.canvas().draw_path_radial_gradient(
        &full_cover(bounds),
        &line,
        Point::new(32.0, 32.0),
        10.0,
        Point::new(32.0, 32.0),
        10.0,
        ExtendMode::Pad,
        Affine::IDENTITY,
    );
    // Flat fill with the end-stop color, everywhere.
    assert_eq!(pixel(&surface, 1, 1), (0, 0, 255, 255));
    assert_eq!(pixel(&surface, 32, 32), (0, 0, 255, 255));
    assert_eq!(pixel(&surface, 62, 62), (0, 0, 255, 255));
}

#[test]
fn inverse_transforms_cancel_inside_saved_state() {
    let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
    let shape = Path::rect(Rect::new(20.0, 20.0, 80.0, 80.0));

    let mut reference = PixelSurface::new(bounds).unwrap();
    reference.canvas().draw_path_solid(&shape, RED);

    let mut nested = PixelSurface::new(bounds).unwrap();
    let forward = Affine::scale(2.0).then_translate((7.0, -3.0).into());
    nested
        .canvas()
        .with_saved_state(|canvas| {
            canvas.transform(forward);
            canvas.with_saved_state(|canvas| {
                canvas.transform(forward.inverse());
                canvas.draw_path_solid(&shape, RED);
                Ok(())
            })
        })
        .unwrap();

    assert_eq!(nested.pixmap().data(), reference.pixmap().data());
}

#[test]
fn transforms_revert_on_scope_exit() {
    let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
    let shape = Path::rect(Rect::new(20.0, 20.0, 80.0, 80.0));

    let mut reference = PixelSurface::new(bounds).unwrap();
    reference.canvas().draw_path_solid(&shape, RED);

    let mut scoped = PixelSurface::new(bounds).unwrap();
    scoped
        .canvas()
        .with_saved_state(|canvas| {
            canvas.transform(Affine::scale(0.001));
            Ok(())
        })
        .unwrap();
    scoped.canvas().draw_path_solid(&shape, RED);

    assert_eq!(scoped.pixmap().data(), reference.pixmap().data());
}

#[test]
fn disjoint_clips_intersect_to_nothing() {
    let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    surface
        .canvas()
        .with_saved_state(|canvas| {
            canvas.clip_path(&Path::rect(Rect::new(0.0, 0.0, 40.0, 100.0)));
            canvas.clip_path(&Path::rect(Rect::new(60.0, 0.0, 100.0, 100.0)));
            canvas.draw_path_solid(&full_cover(bounds), RED);
            Ok(())
        })
        .unwrap();

    assert!(
        surface.pixmap().data().iter().all(|&b| b == 0),
        "disjoint clips must leave the surface untouched"
    );
}

#[test]
fn clip_restores_on_scope_exit() {
    let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    surface
        .canvas()
        .with_saved_state(|canvas| {
            canvas.clip_path(&Path::rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
            Ok(())
        })
        .unwrap();
    surface.canvas().draw_path_solid(&full_cover(bounds), RED);

    // The clip from the exited scope must not constrain this fill.
    assert_eq!(pixel(&surface, 50, 50), (255, 0, 0, 255));
}

#[test]
fn empty_composite_layer_still_flattens() {
    let bounds = Rect::new(0.0, 0.0, 32.0, 32.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    surface.canvas().draw_path_solid(&full_cover(bounds), RED);
    // Src replaces the destination with the (empty, transparent) layer, so
    // flattening an untouched layer must still run and clear the canvas.
    surface
        .canvas()
        .with_composite_mode(CompositeMode::Src, |_| Ok(()))
        .unwrap();

    assert!(surface.pixmap().data().iter().all(|&b| b == 0));
}

#[test]
fn multiply_layer_blends_against_the_parent() {
    let bounds = Rect::new(0.0, 0.0, 32.0, 32.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    surface.canvas().draw_path_solid(&full_cover(bounds), RED);
    surface
        .canvas()
        .with_composite_mode(CompositeMode::Multiply, |canvas| {
            canvas.draw_path_solid(&full_cover(bounds), BLUE);
            Ok(())
        })
        .unwrap();

    // Red times blue is black, at full alpha.
    assert_eq!(pixel(&surface, 16, 16), (0, 0, 0, 255));
}

#[test]
fn layer_flatten_respects_the_active_clip() {
    let bounds = Rect::new(0.0, 0.0, 32.0, 32.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    surface.canvas().draw_path_solid(&full_cover(bounds), RED);
    surface
        .canvas()
        .with_saved_state(|canvas| {
            canvas.clip_path(&Path::rect(Rect::new(0.0, 0.0, 16.0, 32.0)));
            canvas.with_composite_mode(CompositeMode::SrcIn, |canvas| {
                canvas.draw_path_solid(&full_cover(bounds), BLUE);
                Ok(())
            })
        })
        .unwrap();

    // Inside the clip SrcIn replaces the red with blue.
    assert_eq!(pixel(&surface, 8, 16), (0, 0, 255, 255));
    // Outside the clip the destination-affecting flatten must not reach.
    assert_eq!(pixel(&surface, 24, 16), (255, 0, 0, 255));
}

#[test]
fn composite_layer_keeps_transform_state() {
    let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
    let shape = Path::rect(Rect::new(10.0, 10.0, 20.0, 20.0));

    let mut reference = PixelSurface::new(bounds).unwrap();
    reference.canvas().transform(Affine::translate((40.0, 40.0)));
    reference.canvas().draw_path_solid(&shape, RED);

    let mut layered = PixelSurface::new(bounds).unwrap();
    layered.canvas().transform(Affine::translate((40.0, 40.0)));
    layered
        .canvas()
        .with_composite_mode(CompositeMode::SrcOver, |canvas| {
            canvas.draw_path_solid(&shape, RED);
            Ok(())
        })
        .unwrap();

    assert_eq!(layered.pixmap().data(), reference.pixmap().data());
}

#[test]
fn unbalanced_composite_pop_is_an_error() {
    let bounds = Rect::new(0.0, 0.0, 16.0, 16.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    assert!(matches!(
        surface.canvas().pop_composite(),
        Err(Error::UnbalancedScope)
    ));
}

#[test]
fn invalid_bounding_box_is_rejected_at_construction() {
    assert!(matches!(
        PixelSurface::new(Rect::new(0.0, 0.0, -5.0, 10.0)),
        Err(Error::InvalidBoundingBox { .. })
    ));
    assert!(matches!(
        PixelSurface::new(Rect::new(0.0, 0.0, 10.0, 0.0)),
        Err(Error::InvalidBoundingBox { .. })
    ));
}

#[test]
fn save_image_writes_a_png_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let bounds = Rect::new(0.0, 0.0, 16.0, 16.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    surface.canvas().draw_path_solid(&full_cover(bounds), RED);
    assert_eq!(surface.file_extension(), ".png");

    let out = dir.path().join("glyph.png");
    surface.save_image(&out).unwrap();
    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert!(!dir.path().join("glyph.png.tmp").exists());
}

#[test]
fn origin_flip_maps_source_bottom_to_device_bottom_row() {
    // A bar along the bottom of the source box (y in [0, 10], y-up) must
    // land on the bottom rows of the raster image (high device y).
    let bounds = Rect::new(0.0, 0.0, 50.0, 50.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    surface
        .canvas()
        .draw_path_solid(&Path::rect(Rect::new(0.0, 0.0, 50.0, 10.0)), RED);

    assert_eq!(pixel(&surface, 25, 45), (255, 0, 0, 255));
    assert_eq!(pixel(&surface, 25, 5), (0, 0, 0, 0));
}

#[test]
fn nonzero_origin_bounds_translate_onto_the_page() {
    // Glyph-style bounds with a negative lower-left corner still render
    // with the box's lower-left pinned to the page corner.
    let bounds = Rect::new(-25.0, -25.0, 25.0, 25.0);
    let mut surface = PixelSurface::new(bounds).unwrap();
    surface
        .canvas()
        .draw_path_solid(&Path::rect(Rect::new(-25.0, -25.0, 0.0, 0.0)), RED);

    // Source lower-left quadrant maps to the device bottom-left quadrant.
    assert_eq!(pixel(&surface, 10, 40), (255, 0, 0, 255));
    assert_eq!(pixel(&surface, 40, 10), (0, 0, 0, 0));
}
