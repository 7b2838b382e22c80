//! The incremental transform replayer.
//!
//! Replays a `CommandList` against a host surface at a fractional progress
//! value, applying each command in proportion to how far the progress has
//! swept past its slot, and returns the pseudocode `Trace` of the pass.
//!
//! The engine holds no state between passes. It never deals with terminals,
//! cells or key events.

pub mod commands;
pub mod source;
pub mod target;

use std::collections::HashSet;

use log::warn;
use nalgebra::Matrix3;
use serde_json::Value;

use crate::types::Trace;
use commands::{Replay, Surface};
use source::{CommandError, CommandList, Step};
use target::{CanvasHost, NodeId, SceneHost, Target};

/// Playback direction of the progress slider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    /// Non-negative signs play forward.
    pub fn from_sign(sign: f64) -> Self {
        if sign >= 0.0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// How much of the command in `slot` is applied at `progress`, in `[0, 1]`.
///
/// Forward playback starts a command once progress passes its slot and
/// completes it at `slot + 1`. Reverse playback mirrors this around
/// `slot + 1`, so the last command is the first to be un-applied.
pub fn application_fraction(slot: usize, progress: f64, direction: Direction) -> f64 {
    let i = slot as f64;
    let progress = if progress.is_nan() { 0.0 } else { progress };
    match direction {
        Direction::Forward => {
            if i > progress {
                0.0
            } else {
                (progress - i).min(1.0)
            }
        }
        Direction::Reverse => {
            if i + 1.0 < progress {
                0.0
            } else {
                (i + 1.0 - progress).min(1.0)
            }
        }
    }
}

/// State scoped to a single replay pass.
pub struct Pass<'a> {
    target: Target<'a>,
    stack: Vec<Matrix3<f64>>,
    touched: HashSet<String>,
}

impl<'a> Pass<'a> {
    fn new(target: Target<'a>) -> Self {
        Pass {
            target,
            stack: Vec::new(),
            touched: HashSet::new(),
        }
    }

    pub fn scene(&mut self) -> Option<&mut (dyn SceneHost + 'a)> {
        match &mut self.target {
            Target::Scene(scene) => Some(&mut **scene),
            Target::Canvas(_) => None,
        }
    }

    pub fn canvas(&mut self) -> Option<&mut (dyn CanvasHost + 'a)> {
        match &mut self.target {
            Target::Canvas(canvas) => Some(&mut **canvas),
            Target::Scene(_) => None,
        }
    }

    /// Resolve a named object for one command.
    ///
    /// The first time a pass reaches an object it is put back at its rest
    /// pose, so relative commands never accumulate across passes. Commands
    /// resolve their object even at `amt = 0`, which returns a rewound
    /// object to rest.
    pub fn node(&mut self, name: &str) -> Option<(&mut (dyn SceneHost + 'a), NodeId)> {
        let Target::Scene(scene) = &mut self.target else {
            return None;
        };
        let id = scene.find_by_name(name)?;
        if self.touched.insert(name.to_string()) {
            scene.reset_transform(id);
        }
        Some((&mut **scene, id))
    }

    pub fn mark_touched(&mut self, name: &str) {
        self.touched.insert(name.to_string());
    }

    pub fn push_transform(&mut self, matrix: Matrix3<f64>) {
        self.stack.push(matrix);
    }

    pub fn pop_transform(&mut self) -> Option<Matrix3<f64>> {
        self.stack.pop()
    }
}

pub struct Engine;

impl Engine {
    /// Replay `commands` against `target` at `progress` and trace the pass.
    ///
    /// Never fails: malformed steps and commands aimed at the wrong kind of
    /// surface are reported in `Trace::diagnostics` and skipped.
    pub fn replay(
        target: Target<'_>,
        commands: &CommandList,
        progress: f64,
        direction: Direction,
    ) -> Trace {
        let surface = match target {
            Target::Scene(_) => Surface::Scene,
            Target::Canvas(_) => Surface::Canvas,
        };
        let kind = target.kind();
        let mut pass = Pass::new(target);
        let mut trace = Trace::default();

        for (slot, step) in commands.steps().iter().enumerate() {
            let amt = application_fraction(slot, progress, direction);
            match step {
                Step::Command(command) => {
                    if command.surface() == surface {
                        command.apply(amt, &mut pass);
                    } else {
                        let message = format!("command {slot} cannot run on a {kind}");
                        warn!("{message}");
                        trace.diagnostics.push(message);
                    }
                    for line in command.trace_lines(amt) {
                        trace.push(amt, line);
                    }
                }
                Step::Malformed { raw, error } => report_malformed(&mut trace, raw, error),
            }
        }

        trace
    }

    /// The trace a pass would produce, without touching any surface.
    pub fn trace(commands: &CommandList, progress: f64, direction: Direction) -> Trace {
        let mut trace = Trace::default();
        for (slot, step) in commands.steps().iter().enumerate() {
            match step {
                Step::Command(command) => {
                    let amt = application_fraction(slot, progress, direction);
                    for line in command.trace_lines(amt) {
                        trace.push(amt, line);
                    }
                }
                Step::Malformed { raw, error } => report_malformed(&mut trace, raw, error),
            }
        }
        trace
    }
}

fn report_malformed(trace: &mut Trace, raw: &Value, error: &CommandError) {
    let message = format!("bad transform {raw}: {error}");
    warn!("{message}");
    trace.diagnostics.push(message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_fraction_ramps_across_slot() {
        assert_eq!(application_fraction(2, 0.0, Direction::Forward), 0.0);
        assert_eq!(application_fraction(2, 2.0, Direction::Forward), 0.0);
        assert_eq!(application_fraction(2, 2.25, Direction::Forward), 0.25);
        assert_eq!(application_fraction(2, 3.0, Direction::Forward), 1.0);
        assert_eq!(application_fraction(2, 7.5, Direction::Forward), 1.0);
    }

    #[test]
    fn reverse_fraction_mirrors_around_slot_end() {
        assert_eq!(application_fraction(2, 0.0, Direction::Reverse), 1.0);
        assert_eq!(application_fraction(2, 2.0, Direction::Reverse), 1.0);
        assert_eq!(application_fraction(2, 2.75, Direction::Reverse), 0.25);
        assert_eq!(application_fraction(2, 3.0, Direction::Reverse), 0.0);
        assert_eq!(application_fraction(2, 4.0, Direction::Reverse), 0.0);
    }

    #[test]
    fn fraction_stays_in_unit_interval_and_is_monotonic() {
        for slot in 0..5 {
            let mut prev_fwd = 0.0;
            let mut prev_rev = 1.0;
            for step in 0..=300 {
                let progress = step as f64 * 0.02 - 0.5;
                let fwd = application_fraction(slot, progress, Direction::Forward);
                let rev = application_fraction(slot, progress, Direction::Reverse);
                assert!((0.0..=1.0).contains(&fwd));
                assert!((0.0..=1.0).contains(&rev));
                assert!(fwd >= prev_fwd);
                assert!(rev <= prev_rev);
                prev_fwd = fwd;
                prev_rev = rev;
            }
        }
    }

    #[test]
    fn nan_progress_counts_as_zero() {
        assert_eq!(application_fraction(0, f64::NAN, Direction::Forward), 0.0);
        assert_eq!(application_fraction(0, f64::NAN, Direction::Reverse), 1.0);
    }

    #[test]
    fn direction_from_sign() {
        assert_eq!(Direction::from_sign(1.0), Direction::Forward);
        assert_eq!(Direction::from_sign(0.0), Direction::Forward);
        assert_eq!(Direction::from_sign(-1.0), Direction::Reverse);
        assert_eq!(Direction::Forward.flipped(), Direction::Reverse);
    }

    #[test]
    fn trace_reports_malformed_steps_like_replay() {
        let commands: CommandList =
            serde_json::from_value(serde_json::json!([["translate", 1, 1], ["spin", 3], 7])).unwrap();
        let trace = Engine::trace(&commands, 3.0, Direction::Forward);
        assert_eq!(trace.lines.len(), 1);
        assert_eq!(trace.diagnostics.len(), 2);

        let mut canvas = crate::canvas::Canvas::new();
        let replayed = Engine::replay(Target::Canvas(&mut canvas), &commands, 3.0, Direction::Forward);
        assert_eq!(replayed, trace);
    }
}
