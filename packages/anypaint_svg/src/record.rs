use anypaint::{Canvas, ColorLine, CompositeMode, Error, ExtendMode, Path};
use kurbo::{Affine, Point, Rect};

/// One recorded canvas call, replayed verbatim by the writer.
#[derive(Clone, Debug)]
pub enum Command {
    PushState,
    PopState,
    PushComposite(CompositeMode),
    PopComposite,
    Transform(Affine),
    ClipPath(Path),
    FillSolid {
        path: Path,
        color: peniko::Color,
    },
    FillLinear {
        path: Path,
        color_line: ColorLine,
        p0: Point,
        p1: Point,
        extend: ExtendMode,
        gradient_transform: Affine,
    },
    FillRadial {
        path: Path,
        color_line: ColorLine,
        start_center: Point,
        start_radius: f64,
        end_center: Point,
        end_radius: f64,
        extend: ExtendMode,
        gradient_transform: Affine,
    },
    FillSweep {
        path: Path,
        color_line: ColorLine,
        center: Point,
        start_angle: f64,
        end_angle: f64,
        extend: ExtendMode,
        gradient_transform: Affine,
    },
}

/// The deferred draw stream for one page, bounded by its cull rectangle.
#[derive(Clone, Debug)]
pub struct Recording {
    bounds: Rect,
    commands: Vec<Command>,
}

impl Recording {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            commands: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// [`Canvas`] that records calls instead of rasterizing them.
///
/// Scope balance is enforced here, at record time, so the writer can replay
/// the stream trusting that every push has its pop.
pub struct RecordingCanvas {
    recording: Recording,
    state_depth: usize,
    composite_depth: usize,
}

impl RecordingCanvas {
    pub fn new(bounds: Rect) -> Self {
        Self {
            recording: Recording::new(bounds),
            state_depth: 0,
            composite_depth: 0,
        }
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn into_recording(self) -> Recording {
        if self.state_depth > 0 || self.composite_depth > 0 {
            log::warn!(
                "finishing recording with {} open state scope(s) and {} open layer(s)",
                self.state_depth,
                self.composite_depth
            );
        }
        self.recording
    }

    fn push(&mut self, command: Command) {
        self.recording.commands.push(command);
    }
}

impl Canvas for RecordingCanvas {
    fn push_state(&mut self) {
        self.state_depth += 1;
        self.push(Command::PushState);
    }

    fn pop_state(&mut self) {
        if self.state_depth == 0 {
            log::warn!("state pop without matching push");
            return;
        }
        self.state_depth -= 1;
        self.push(Command::PopState);
    }

    fn push_composite(&mut self, mode: CompositeMode) -> Result<(), Error> {
        self.composite_depth += 1;
        self.push(Command::PushComposite(mode));
        Ok(())
    }

    fn pop_composite(&mut self) -> Result<(), Error> {
        if self.composite_depth == 0 {
            return Err(Error::UnbalancedScope);
        }
        self.composite_depth -= 1;
        self.push(Command::PopComposite);
        Ok(())
    }

    fn transform(&mut self, affine: Affine) {
        self.push(Command::Transform(affine));
    }

    fn clip_path(&mut self, path: &Path) {
        self.push(Command::ClipPath(path.clone()));
    }

    fn draw_path_solid(&mut self, path: &Path, color: peniko::Color) {
        self.push(Command::FillSolid {
            path: path.clone(),
            color,
        });
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
        self.push(Command::FillLinear {
            path: path.clone(),
            color_line: color_line.clone(),
            p0,
            p1,
            extend,
            gradient_transform,
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
        self.push(Command::FillRadial {
            path: path.clone(),
            color_line: color_line.clone(),
            start_center,
            start_radius,
            end_center,
            end_radius,
            extend,
            gradient_transform,
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
        self.push(Command::FillSweep {
            path: path.clone(),
            color_line: color_line.clone(),
            center,
            start_angle,
            end_angle,
            extend,
            gradient_transform,
        });
    }
}
