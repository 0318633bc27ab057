use anypaint::{CompositeMode, Error, ExtendMode, Path, ResolvedColorLine};
use kurbo::{Affine, Point, Rect};
use peniko::Color;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::record::{Command, Recording};

const EPSILON: f64 = 1e-9;
/// Angular resolution of the wedge fan approximating a sweep gradient.
const SWEEP_WEDGES: u32 = 720;

/// The `mix-blend-mode` value for a compositing mode, when CSS has one.
///
/// `SrcOver` needs no attribute at all; the remaining Porter-Duff operators
/// have no CSS equivalent and return `None`, which the writer downgrades to
/// source-over with a warning.
pub fn css_blend_mode(mode: CompositeMode) -> Option<&'static str> {
    match mode {
        CompositeMode::Plus => Some("plus-lighter"),
        CompositeMode::Screen => Some("screen"),
        CompositeMode::Overlay => Some("overlay"),
        CompositeMode::Darken => Some("darken"),
        CompositeMode::Lighten => Some("lighten"),
        CompositeMode::ColorDodge => Some("color-dodge"),
        CompositeMode::ColorBurn => Some("color-burn"),
        CompositeMode::HardLight => Some("hard-light"),
        CompositeMode::SoftLight => Some("soft-light"),
        CompositeMode::Difference => Some("difference"),
        CompositeMode::Exclusion => Some("exclusion"),
        CompositeMode::Multiply => Some("multiply"),
        CompositeMode::HslHue => Some("hue"),
        CompositeMode::HslSaturation => Some("saturation"),
        CompositeMode::HslColor => Some("color"),
        CompositeMode::HslLuminosity => Some("luminosity"),
        _ => None,
    }
}

fn spread_method(extend: ExtendMode) -> &'static str {
    match extend {
        ExtendMode::Pad => "pad",
        ExtendMode::Repeat => "repeat",
        ExtendMode::Reflect => "reflect",
    }
}

fn matrix(affine: Affine) -> String {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

fn hex_color(color: Color) -> (String, Option<String>) {
    let rgba = color.to_rgba8();
    let hex = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
    let opacity = (rgba.a < 255).then(|| format!("{}", rgba.a as f64 / 255.0));
    (hex, opacity)
}

/// Serialize a recording as a standalone single-page SVG document.
///
/// `base` is the surface's origin-flip transform; it becomes one root group
/// so every recorded coordinate stays in source units (y-up). A recording
/// whose cull rectangle does not start at the page origin is refused, and
/// nothing is produced.
pub fn write_document(recording: &Recording, base: Affine) -> Result<Vec<u8>, Error> {
    let bounds = recording.bounds();
    if bounds.x0.abs() > EPSILON || bounds.y0.abs() > EPSILON {
        return Err(Error::OriginViolation {
            x: bounds.x0,
            y: bounds.y0,
        });
    }

    let mut emitter = Emitter::new(bounds, base)?;
    for command in recording.commands() {
        emitter.emit(command)?;
    }
    emitter.finish()
}

enum FrameKind {
    Root,
    State,
    Layer,
}

struct Frame {
    kind: FrameKind,
    opened: usize,
}

struct Emitter {
    writer: Writer<Vec<u8>>,
    frames: Vec<Frame>,
    bounds: Rect,
    next_id: usize,
}

impl Emitter {
    fn new(bounds: Rect, base: Affine) -> Result<Self, Error> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let width = format!("{}", bounds.width());
        let height = format!("{}", bounds.height());
        let view_box = format!("0 0 {} {}", bounds.width(), bounds.height());
        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
        svg.push_attribute(("version", "1.1"));
        svg.push_attribute(("width", width.as_str()));
        svg.push_attribute(("height", height.as_str()));
        svg.push_attribute(("viewBox", view_box.as_str()));
        writer.write_event(Event::Start(svg))?;

        let flip = matrix(base);
        let mut root = BytesStart::new("g");
        root.push_attribute(("transform", flip.as_str()));
        writer.write_event(Event::Start(root))?;

        Ok(Self {
            writer,
            frames: vec![Frame {
                kind: FrameKind::Root,
                opened: 0,
            }],
            bounds,
            next_id: 0,
        })
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{}", self.next_id);
        self.next_id += 1;
        id
    }

    fn open_group(&mut self, group: BytesStart<'_>) -> Result<(), Error> {
        self.writer.write_event(Event::Start(group))?;
        if let Some(frame) = self.frames.last_mut() {
            frame.opened += 1;
        }
        Ok(())
    }

    fn close_frame_groups(&mut self, opened: usize) -> Result<(), Error> {
        for _ in 0..opened {
            self.writer.write_event(Event::End(BytesEnd::new("g")))?;
        }
        Ok(())
    }

    fn emit(&mut self, command: &Command) -> Result<(), Error> {
        match command {
            Command::PushState => {
                self.frames.push(Frame {
                    kind: FrameKind::State,
                    opened: 0,
                });
                Ok(())
            }
            Command::PopState => match self.frames.pop() {
                Some(frame) => self.close_frame_groups(frame.opened),
                None => Ok(()),
            },
            Command::PushComposite(mode) => {
                let mut group = BytesStart::new("g");
                let style;
                match css_blend_mode(*mode) {
                    Some(name) => {
                        style = format!("isolation:isolate;mix-blend-mode:{name}");
                        group.push_attribute(("style", style.as_str()));
                    }
                    None if *mode == CompositeMode::SrcOver => {}
                    None => {
                        log::warn!(
                            "compositing mode {mode:?} has no SVG equivalent, \
                             rendering as source-over"
                        );
                    }
                }
                self.writer.write_event(Event::Start(group))?;
                self.frames.push(Frame {
                    kind: FrameKind::Layer,
                    opened: 0,
                });
                Ok(())
            }
            Command::PopComposite => {
                if let Some(frame) = self.frames.pop() {
                    self.close_frame_groups(frame.opened)?;
                    debug_assert!(matches!(frame.kind, FrameKind::Layer));
                    self.writer.write_event(Event::End(BytesEnd::new("g")))?;
                }
                Ok(())
            }
            Command::Transform(affine) => {
                let transform = matrix(*affine);
                let mut group = BytesStart::new("g");
                group.push_attribute(("transform", transform.as_str()));
                self.open_group(group)
            }
            Command::ClipPath(path) => {
                let id = self.fresh_id("clip");
                self.write_clip_def(&id, path)?;
                let reference = format!("url(#{id})");
                let mut group = BytesStart::new("g");
                group.push_attribute(("clip-path", reference.as_str()));
                self.open_group(group)
            }
            Command::FillSolid { path, color } => self.fill_solid(path, *color),
            Command::FillLinear {
                path,
                color_line,
                p0,
                p1,
                extend,
                gradient_transform,
            } => {
                let resolved = color_line.resolve(*extend);
                if color_line.is_empty() {
                    return Ok(());
                }
                if let Some(color) = resolved.as_solid() {
                    return self.fill_solid(path, color);
                }
                if (*p1 - *p0).hypot2() < EPSILON {
                    return self.fill_solid(path, resolved.last_color());
                }
                let id = self.fresh_id("grad");
                let mut def = BytesStart::new("linearGradient");
                def.push_attribute(("id", id.as_str()));
                let (x1, y1) = (format!("{}", p0.x), format!("{}", p0.y));
                let (x2, y2) = (format!("{}", p1.x), format!("{}", p1.y));
                def.push_attribute(("x1", x1.as_str()));
                def.push_attribute(("y1", y1.as_str()));
                def.push_attribute(("x2", x2.as_str()));
                def.push_attribute(("y2", y2.as_str()));
                self.write_gradient_def(def, "linearGradient", &resolved, *gradient_transform)?;
                self.fill_with_reference(path, &id)
            }
            Command::FillRadial {
                path,
                color_line,
                start_center,
                start_radius,
                end_center,
                end_radius,
                extend,
                gradient_transform,
            } => {
                let resolved = color_line.resolve(*extend);
                if color_line.is_empty() {
                    return Ok(());
                }
                if let Some(color) = resolved.as_solid() {
                    return self.fill_solid(path, color);
                }
                let degenerate = (*end_center - *start_center).hypot2() < EPSILON
                    && (end_radius - start_radius).abs() < EPSILON;
                if degenerate {
                    return self.fill_solid(path, resolved.last_color());
                }
                let id = self.fresh_id("grad");
                let mut def = BytesStart::new("radialGradient");
                def.push_attribute(("id", id.as_str()));
                let cx = format!("{}", end_center.x);
                let cy = format!("{}", end_center.y);
                let r = format!("{end_radius}");
                let fx = format!("{}", start_center.x);
                let fy = format!("{}", start_center.y);
                let fr = format!("{start_radius}");
                def.push_attribute(("cx", cx.as_str()));
                def.push_attribute(("cy", cy.as_str()));
                def.push_attribute(("r", r.as_str()));
                def.push_attribute(("fx", fx.as_str()));
                def.push_attribute(("fy", fy.as_str()));
                def.push_attribute(("fr", fr.as_str()));
                self.write_gradient_def(def, "radialGradient", &resolved, *gradient_transform)?;
                self.fill_with_reference(path, &id)
            }
            Command::FillSweep {
                path,
                color_line,
                center,
                start_angle,
                end_angle,
                extend,
                gradient_transform,
            } => self.fill_sweep(
                path,
                &color_line.resolve(*extend),
                *center,
                *start_angle,
                *end_angle,
                *gradient_transform,
            ),
        }
    }

    fn write_clip_def(&mut self, id: &str, path: &Path) -> Result<(), Error> {
        let mut def = BytesStart::new("clipPath");
        def.push_attribute(("id", id));
        self.writer.write_event(Event::Start(def))?;
        let data = path.bezier().to_svg();
        let mut shape = BytesStart::new("path");
        shape.push_attribute(("d", data.as_str()));
        self.writer.write_event(Event::Empty(shape))?;
        self.writer
            .write_event(Event::End(BytesEnd::new("clipPath")))?;
        Ok(())
    }

    fn write_gradient_def(
        &mut self,
        mut def: BytesStart<'_>,
        tag: &str,
        resolved: &ResolvedColorLine,
        gradient_transform: Affine,
    ) -> Result<(), Error> {
        def.push_attribute(("gradientUnits", "userSpaceOnUse"));
        def.push_attribute(("spreadMethod", spread_method(resolved.extend())));
        let transform;
        if gradient_transform != Affine::IDENTITY {
            transform = matrix(gradient_transform);
            def.push_attribute(("gradientTransform", transform.as_str()));
        }
        self.writer
            .write_event(Event::Start(BytesStart::new("defs")))?;
        self.writer.write_event(Event::Start(def))?;
        for stop in resolved.stops() {
            let mut elem = BytesStart::new("stop");
            let offset = format!("{}", stop.offset.clamp(0.0, 1.0));
            elem.push_attribute(("offset", offset.as_str()));
            let (hex, opacity) = hex_color(stop.color);
            elem.push_attribute(("stop-color", hex.as_str()));
            if let Some(opacity) = &opacity {
                elem.push_attribute(("stop-opacity", opacity.as_str()));
            }
            self.writer.write_event(Event::Empty(elem))?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        self.writer.write_event(Event::End(BytesEnd::new("defs")))?;
        Ok(())
    }

    fn fill_solid(&mut self, path: &Path, color: Color) -> Result<(), Error> {
        let data = path.bezier().to_svg();
        let (hex, opacity) = hex_color(color);
        let mut shape = BytesStart::new("path");
        shape.push_attribute(("d", data.as_str()));
        shape.push_attribute(("fill", hex.as_str()));
        if let Some(opacity) = &opacity {
            shape.push_attribute(("fill-opacity", opacity.as_str()));
        }
        shape.push_attribute(("fill-rule", "nonzero"));
        self.writer.write_event(Event::Empty(shape))?;
        Ok(())
    }

    fn fill_with_reference(&mut self, path: &Path, id: &str) -> Result<(), Error> {
        let data = path.bezier().to_svg();
        let reference = format!("url(#{id})");
        let mut shape = BytesStart::new("path");
        shape.push_attribute(("d", data.as_str()));
        shape.push_attribute(("fill", reference.as_str()));
        shape.push_attribute(("fill-rule", "nonzero"));
        self.writer.write_event(Event::Empty(shape))?;
        Ok(())
    }

    /// SVG has no sweep gradient primitive, so the fill is approximated by a
    /// fan of flat-colored wedges clipped to the target path, each colored
    /// by sampling the resolved color line at its mid angle.
    fn fill_sweep(
        &mut self,
        path: &Path,
        resolved: &ResolvedColorLine,
        center: Point,
        start_angle: f64,
        end_angle: f64,
        gradient_transform: Affine,
    ) -> Result<(), Error> {
        if resolved.stops().is_empty() {
            return Ok(());
        }
        if let Some(color) = resolved.as_solid() {
            return self.fill_solid(path, color);
        }
        if (end_angle - start_angle).abs() < EPSILON {
            log::debug!("sweep gradient with empty angular range, skipping fill");
            return Ok(());
        }
        if gradient_transform.determinant().abs() < EPSILON {
            return Ok(());
        }

        // Wedge radius: far enough, in gradient space, to cover every page
        // corner once the gradient transform is applied.
        let inverse = gradient_transform.inverse();
        let corners = [
            Point::new(self.bounds.x0, self.bounds.y0),
            Point::new(self.bounds.x1, self.bounds.y0),
            Point::new(self.bounds.x0, self.bounds.y1),
            Point::new(self.bounds.x1, self.bounds.y1),
        ];
        let radius = corners
            .iter()
            .map(|corner| (inverse * *corner - center).hypot())
            .fold(0.0f64, f64::max)
            * 1.05
            + 1.0;

        let clip_id = self.fresh_id("clip");
        self.write_clip_def(&clip_id, path)?;
        let reference = format!("url(#{clip_id})");
        let mut outer = BytesStart::new("g");
        outer.push_attribute(("clip-path", reference.as_str()));
        self.writer.write_event(Event::Start(outer))?;
        let transform;
        let mut inner = BytesStart::new("g");
        if gradient_transform != Affine::IDENTITY {
            transform = matrix(gradient_transform);
            inner.push_attribute(("transform", transform.as_str()));
        }
        self.writer.write_event(Event::Start(inner))?;

        let step = 360.0 / SWEEP_WEDGES as f64;
        let span = end_angle - start_angle;
        for i in 0..SWEEP_WEDGES {
            let a0 = i as f64 * step;
            // Slight overlap so adjacent wedges never show a hairline seam.
            let a1 = a0 + step * 1.5;
            let mid = a0 + step * 0.5;
            let color = resolved.sample(((mid - start_angle) / span) as f32);
            let (hex, opacity) = hex_color(color);
            let (s0, c0) = a0.to_radians().sin_cos();
            let (s1, c1) = a1.to_radians().sin_cos();
            let data = format!(
                "M{} {} L{} {} L{} {} Z",
                center.x,
                center.y,
                center.x + radius * c0,
                center.y + radius * s0,
                center.x + radius * c1,
                center.y + radius * s1,
            );
            let mut wedge = BytesStart::new("path");
            wedge.push_attribute(("d", data.as_str()));
            wedge.push_attribute(("fill", hex.as_str()));
            if let Some(opacity) = &opacity {
                wedge.push_attribute(("fill-opacity", opacity.as_str()));
            }
            self.writer.write_event(Event::Empty(wedge))?;
        }

        self.writer.write_event(Event::End(BytesEnd::new("g")))?;
        self.writer.write_event(Event::End(BytesEnd::new("g")))?;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, Error> {
        while let Some(frame) = self.frames.pop() {
            self.close_frame_groups(frame.opened)?;
            if matches!(frame.kind, FrameKind::Layer) {
                self.writer.write_event(Event::End(BytesEnd::new("g")))?;
            }
        }
        self.writer.write_event(Event::End(BytesEnd::new("g")))?;
        self.writer.write_event(Event::End(BytesEnd::new("svg")))?;
        Ok(self.writer.into_inner())
    }
}
