use peniko::Color;

/// Sampling policy outside a gradient's `[0, 1]` domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtendMode {
    /// Clamp to the nearest end color.
    Pad,
    /// Tile the `[0, 1]` pattern.
    Repeat,
    /// Mirror the `[0, 1]` pattern.
    Reflect,
}

/// One gradient stop: an offset on the color line and its color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

impl From<(f32, Color)> for ColorStop {
    fn from((offset, color): (f32, Color)) -> Self {
        Self { offset, color }
    }
}

/// Ordered stop list defining a gradient ramp.
///
/// Offsets need not be sorted or distinct; duplicate offsets express hard
/// color edges. The order given by the caller is preserved exactly, both
/// here and in the backend arrays produced by [`ColorLine::resolve`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorLine {
    stops: Vec<ColorStop>,
}

impl ColorLine {
    pub fn new(stops: impl IntoIterator<Item = impl Into<ColorStop>>) -> Self {
        Self {
            stops: stops.into_iter().map(Into::into).collect(),
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Pairs the stop list with an extend mode, yielding the backend-ready
    /// form every gradient fill is sampled through.
    pub fn resolve(&self, extend: ExtendMode) -> ResolvedColorLine {
        ResolvedColorLine {
            stops: self.stops.clone(),
            extend,
        }
    }
}

/// A color line resolved against an extend mode.
///
/// Backends either hand the stop array to a native shader (together with the
/// matching native tile mode) or sample colors directly through
/// [`ResolvedColorLine::sample`]; both routes must agree. A single-stop line
/// degenerates to a solid fill over the whole domain.
#[derive(Clone, Debug)]
pub struct ResolvedColorLine {
    stops: Vec<ColorStop>,
    extend: ExtendMode,
}

impl ResolvedColorLine {
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn extend(&self) -> ExtendMode {
        self.extend
    }

    /// The solid color this line collapses to, if it has exactly one stop.
    pub fn as_solid(&self) -> Option<Color> {
        match self.stops.as_slice() {
            [only] => Some(only.color),
            _ => None,
        }
    }

    /// Color at the start of the ramp (pad fallback below the first stop).
    pub fn first_color(&self) -> Color {
        self.stops
            .first()
            .map(|s| s.color)
            .unwrap_or(peniko::color::palette::css::TRANSPARENT)
    }

    /// Color at the end of the ramp; also the flat-fill fallback for
    /// degenerate gradient geometry.
    pub fn last_color(&self) -> Color {
        self.stops
            .last()
            .map(|s| s.color)
            .unwrap_or(peniko::color::palette::css::TRANSPARENT)
    }

    /// Map a raw gradient coordinate into `[0, 1]` per the extend mode.
    ///
    /// Ties at integer domain values resolve the way the tile interior does:
    /// under `Repeat`, t == 1.0 belongs to the next tile and maps to 0.0, so
    /// adjacent tiles meet without a seam no matter how a backend rounds.
    pub fn extend_position(&self, t: f32) -> f32 {
        if !t.is_finite() {
            return 0.0;
        }
        match self.extend {
            ExtendMode::Pad => t.clamp(0.0, 1.0),
            ExtendMode::Repeat => t.rem_euclid(1.0),
            ExtendMode::Reflect => {
                let t = t.rem_euclid(2.0);
                if t > 1.0 { 2.0 - t } else { t }
            }
        }
    }

    /// Sample the ramp at a raw (pre-extend) gradient coordinate.
    pub fn sample(&self, t: f32) -> Color {
        self.sample_extended(self.extend_position(t))
    }

    /// Sample the ramp at a coordinate already mapped into `[0, 1]`.
    ///
    /// Stops are scanned in caller order, so duplicate offsets keep their
    /// given left/right colors and render as a hard edge.
    pub fn sample_extended(&self, u: f32) -> Color {
        let stops = &self.stops;
        match stops.len() {
            0 => peniko::color::palette::css::TRANSPARENT,
            1 => stops[0].color,
            _ => {
                if u <= stops[0].offset {
                    return stops[0].color;
                }
                let last = stops[stops.len() - 1];
                if u >= last.offset {
                    return last.color;
                }
                for pair in stops.windows(2) {
                    let (s0, s1) = (pair[0], pair[1]);
                    if u < s0.offset {
                        return s0.color;
                    }
                    if u <= s1.offset {
                        let span = s1.offset - s0.offset;
                        if span.abs() <= f32::EPSILON {
                            // Hard stop: the tie goes to the earlier stop so
                            // the edge sits exactly at the shared offset.
                            return s0.color;
                        }
                        let frac = ((u - s0.offset) / span).clamp(0.0, 1.0);
                        return lerp_color(s0.color, s1.color, frac);
                    }
                }
                last.color
            }
        }
    }
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let a = a.components;
    let b = b.components;
    Color::new([
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ])
}
