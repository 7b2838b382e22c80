//! Per-frame host state behind the player.
//!
//! Owns the toy, one surface per panel, and the slider. Every frame the left
//! surface is replayed at the slider position and the right one at the end
//! of the list, the way the two panels of the toy are driven.

use log::info;

use crate::canvas::Canvas;
use crate::engine::commands::Surface;
use crate::engine::source::{CommandList, ToySource};
use crate::engine::target::{CanvasHost, Target};
use crate::engine::{Direction, Engine};
use crate::renderer::{CanvasOverlay, Renderer, SceneView};
use crate::scene::SceneGraph;
use crate::types::{Grid, TerminalContract, Trace};

use super::builder::Builder;

/// A host surface kept alive across frames.
#[derive(Debug, Clone)]
pub enum Stage {
    Scene(SceneGraph),
    Canvas(Canvas),
}

impl Stage {
    pub fn new(surface: Surface) -> Self {
        match surface {
            Surface::Scene => Stage::Scene(SceneGraph::new()),
            Surface::Canvas => Stage::Canvas(Canvas::new()),
        }
    }

    /// Replay one frame. A canvas is cleared first; a scene persists and is
    /// brought up to date by the replay itself.
    pub fn replay(&mut self, commands: &CommandList, progress: f64, direction: Direction) -> Trace {
        match self {
            Stage::Scene(scene) => Engine::replay(Target::Scene(scene), commands, progress, direction),
            Stage::Canvas(canvas) => {
                canvas.begin_frame();
                Engine::replay(Target::Canvas(canvas), commands, progress, direction)
            }
        }
    }

    pub fn render(&self, overlays: Overlays, view: SceneView, contract: TerminalContract) -> Grid {
        match self {
            Stage::Scene(scene) => Renderer::render_scene(scene, view, contract),
            Stage::Canvas(canvas) => {
                let overlay = CanvasOverlay {
                    original: overlays.original_csys,
                    final_transform: overlays.final_csys.then(|| canvas.transform()),
                };
                Renderer::render_canvas(canvas, overlay, contract)
            }
        }
    }

    /// Extra readout lines shown under the trace.
    pub fn describe(&self) -> Vec<String> {
        match self {
            Stage::Scene(scene) => Renderer::describe_scene(scene),
            Stage::Canvas(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlays {
    pub original_csys: bool,
    pub final_csys: bool,
}

/// One rendered frame of both panels.
pub struct FrameView {
    pub left: Grid,
    pub left_trace: Trace,
    pub left_notes: Vec<String>,
    pub right: Option<(Grid, Trace, Vec<String>)>,
}

pub struct Session {
    pub toy: ToySource,
    left: Stage,
    right: Stage,
    progress: f64,
    direction: Direction,
    pub show_result: bool,
    /// Right panel only; the left panel always shows both systems.
    pub original_csys: bool,
    pub final_csys: bool,
    running: bool,
    builder: Builder,
    building: bool,
}

impl Session {
    pub fn new(toy: ToySource) -> Self {
        let surface = toy.surface();
        info!("loaded {:?}: {} commands on a {surface:?}", toy.title, toy.commands.len());
        Session {
            toy,
            left: Stage::new(surface),
            right: Stage::new(surface),
            progress: 0.0,
            direction: Direction::Forward,
            show_result: true,
            original_csys: true,
            final_csys: false,
            running: false,
            builder: Builder::new(),
            building: false,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Slider maximum: one unit per command.
    pub fn max_progress(&self) -> f64 {
        self.toy.commands.len() as f64
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, self.max_progress())
        };
    }

    pub fn nudge(&mut self, delta: f64) {
        self.running = false;
        self.set_progress(self.progress + delta);
    }

    /// Flip playback direction. Refused for lists using save/restore.
    pub fn toggle_reverse(&mut self) -> bool {
        if !self.toy.commands.supports_reverse() {
            return false;
        }
        self.direction = self.direction.flipped();
        true
    }

    /// Start autoplay from the beginning, or stop it.
    pub fn toggle_run(&mut self) {
        self.running = !self.running;
        if self.running && self.progress >= self.max_progress() {
            self.progress = 0.0;
        }
    }

    /// Autoplay tick.
    pub fn advance(&mut self, step: f64) {
        if !self.running {
            return;
        }
        self.set_progress(self.progress + step);
        if self.progress >= self.max_progress() {
            self.running = false;
        }
    }

    /// Swap in a new command list and start over from progress 0.
    pub fn load_commands(&mut self, commands: CommandList) {
        self.toy.commands = commands;
        self.toy.surface = None;
        let surface = self.toy.surface();
        self.left = Stage::new(surface);
        self.right = Stage::new(surface);
        self.progress = 0.0;
        self.running = false;
        if !self.toy.commands.supports_reverse() {
            self.direction = Direction::Forward;
        }
        info!("loaded {} commands on a {surface:?}", self.toy.commands.len());
    }

    pub fn is_building(&self) -> bool {
        self.building
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut Builder {
        &mut self.builder
    }

    /// Enter or leave the builder. The draft survives leaving.
    pub fn toggle_builder(&mut self) {
        self.building = !self.building;
        self.running = false;
    }

    /// Replay the draft list. False when there is nothing to run.
    pub fn run_builder(&mut self) -> bool {
        if self.builder.commands().is_empty() {
            return false;
        }
        self.load_commands(self.builder.commands().clone());
        self.toy.title = "Custom sequence".to_string();
        self.building = false;
        true
    }

    /// Discard the draft and go back to forward playback.
    pub fn reset_builder(&mut self) {
        self.builder.clear();
        self.direction = Direction::Forward;
    }

    pub fn frame(&mut self, view: SceneView, contract: TerminalContract) -> FrameView {
        let overlays = Overlays {
            original_csys: self.original_csys,
            final_csys: self.final_csys,
        };
        let left_trace = self.left.replay(&self.toy.commands, self.progress, self.direction);
        // The scrubbed panel always shows where it started and where it is.
        let left_overlays = Overlays {
            original_csys: true,
            final_csys: true,
        };
        let left = self.left.render(left_overlays, view, contract);
        let left_notes = self.left.describe();

        let max = self.max_progress();
        let right = self.show_result.then(|| {
            let trace = self.right.replay(&self.toy.commands, max, Direction::Forward);
            let grid = self.right.render(overlays, view, contract);
            (grid, trace, self.right.describe())
        });

        FrameView {
            left,
            left_trace,
            left_notes,
            right,
        }
    }
}
