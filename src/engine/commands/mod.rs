//! Command types and their replay implementations.
//!
//! Each command family lives in its own module with its struct definitions and
//! `Replay` implementation side by side.

mod canvas;
mod create;
mod rotate;
mod scale;
mod translate;

pub use canvas::{FillRect, Rotate, Scale2d, Translate, Triangle};
pub use create::Create;
pub use rotate::{LookAt, RotateAxis, RotateOnAxis, Rotation};
pub use scale::{Scale, interpolate_scale};
pub use translate::{Position, TranslateAxis};

use serde::{Deserialize, Serialize};

use super::Pass;

/// Which kind of host a command can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Scene,
    Canvas,
}

/// Apply a command at a given application fraction, and describe it.
pub trait Replay {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>);
    /// Pseudocode for the command at `amt`. Has no side effects.
    fn trace_lines(&self, amt: f64) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformCommand {
    /// `box` and `cone`.
    Create(Create),
    TranslateAxis(TranslateAxis),
    Position(Position),
    RotateAxis(RotateAxis),
    Rotation(Rotation),
    RotateOnAxis(RotateOnAxis),
    LookAt(LookAt),
    Scale(Scale),
    Translate(Translate),
    Rotate(Rotate),
    Scale2d(Scale2d),
    Save,
    Restore,
    FillRect(FillRect),
    Triangle(Triangle),
}

impl TransformCommand {
    pub fn surface(&self) -> Surface {
        match self {
            TransformCommand::Create(_)
            | TransformCommand::TranslateAxis(_)
            | TransformCommand::Position(_)
            | TransformCommand::RotateAxis(_)
            | TransformCommand::Rotation(_)
            | TransformCommand::RotateOnAxis(_)
            | TransformCommand::LookAt(_)
            | TransformCommand::Scale(_) => Surface::Scene,
            TransformCommand::Translate(_)
            | TransformCommand::Rotate(_)
            | TransformCommand::Scale2d(_)
            | TransformCommand::Save
            | TransformCommand::Restore
            | TransformCommand::FillRect(_)
            | TransformCommand::Triangle(_) => Surface::Canvas,
        }
    }
}

impl Replay for TransformCommand {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        match self {
            TransformCommand::Create(c) => c.apply(amt, pass),
            TransformCommand::TranslateAxis(c) => c.apply(amt, pass),
            TransformCommand::Position(c) => c.apply(amt, pass),
            TransformCommand::RotateAxis(c) => c.apply(amt, pass),
            TransformCommand::Rotation(c) => c.apply(amt, pass),
            TransformCommand::RotateOnAxis(c) => c.apply(amt, pass),
            TransformCommand::LookAt(c) => c.apply(amt, pass),
            TransformCommand::Scale(c) => c.apply(amt, pass),
            TransformCommand::Translate(c) => c.apply(amt, pass),
            TransformCommand::Rotate(c) => c.apply(amt, pass),
            TransformCommand::Scale2d(c) => c.apply(amt, pass),
            TransformCommand::Save => canvas::save(amt, pass),
            TransformCommand::Restore => canvas::restore(amt, pass),
            TransformCommand::FillRect(c) => c.apply(amt, pass),
            TransformCommand::Triangle(c) => c.apply(amt, pass),
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        match self {
            TransformCommand::Create(c) => c.trace_lines(amt),
            TransformCommand::TranslateAxis(c) => c.trace_lines(amt),
            TransformCommand::Position(c) => c.trace_lines(amt),
            TransformCommand::RotateAxis(c) => c.trace_lines(amt),
            TransformCommand::Rotation(c) => c.trace_lines(amt),
            TransformCommand::RotateOnAxis(c) => c.trace_lines(amt),
            TransformCommand::LookAt(c) => c.trace_lines(amt),
            TransformCommand::Scale(c) => c.trace_lines(amt),
            TransformCommand::Translate(c) => c.trace_lines(amt),
            TransformCommand::Rotate(c) => c.trace_lines(amt),
            TransformCommand::Scale2d(c) => c.trace_lines(amt),
            TransformCommand::Save => vec!["context.save();".to_string()],
            TransformCommand::Restore => vec!["context.restore();".to_string()],
            TransformCommand::FillRect(c) => c.trace_lines(amt),
            TransformCommand::Triangle(c) => c.trace_lines(amt),
        }
    }
}

// ---------------------------------------------------------------------------
// Number formatting shared by the trace lines
// ---------------------------------------------------------------------------

/// Interpolated value, one decimal place with ties rounded away from zero.
/// Negative zero prints as `0.0`.
pub(crate) fn fixed1(v: f64) -> String {
    format!("{:.1}", (v * 10.0).round() / 10.0 + 0.0)
}

/// Authored value, printed the way it was written (`5`, `0.25`).
pub(crate) fn literal(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed1_hides_negative_zero() {
        assert_eq!(fixed1(-5.0 * 0.0), "0.0");
        assert_eq!(fixed1(2.5), "2.5");
        assert_eq!(fixed1(-1.26), "-1.3");
        assert_eq!(fixed1(-0.04), "0.0");
    }

    #[test]
    fn fixed1_rounds_ties_up() {
        assert_eq!(fixed1(0.25), "0.3");
        assert_eq!(fixed1(1.25), "1.3");
        assert_eq!(fixed1(0.75), "0.8");
        assert_eq!(fixed1(-0.25), "-0.3");
    }

    #[test]
    fn literal_keeps_integers_short() {
        assert_eq!(literal(5.0), "5");
        assert_eq!(literal(-10.0), "-10");
        assert_eq!(literal(0.25), "0.25");
    }
}
