//! Toy files: the human-authored command list format.
//!
//! A toy file names a list of commands written as positional JSON arrays,
//! tag first: `["translateX", "b1", 5]`. Entries that cannot be understood are
//! kept as malformed steps so every later command keeps its slot.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::types::{Axis, Color, ParseColorError};

use super::commands::{
    Create, FillRect, LookAt, Position, Rotate, RotateAxis, RotateOnAxis, Rotation, Scale,
    Scale2d, Surface, TransformCommand, Translate, TranslateAxis, Triangle,
};
use super::target::Primitive;

#[derive(Debug, Clone, Deserialize)]
pub struct ToySource {
    pub title: String,
    #[serde(default)]
    pub surface: Option<Surface>,
    pub commands: CommandList,
}

impl ToySource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Explicit surface, or the one the commands call for.
    pub fn surface(&self) -> Surface {
        self.surface.unwrap_or_else(|| self.commands.surface_hint())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("entry is not an array")]
    NotAnArray,
    #[error("entry has no command tag")]
    MissingTag,
    #[error("unknown command {0:?}")]
    UnknownTag(String),
    #[error("{tag} takes {expected} parameters, got {actual}")]
    Arity {
        tag: String,
        expected: &'static str,
        actual: usize,
    },
    #[error("{tag} parameter {index} must be a number")]
    NotANumber { tag: String, index: usize },
    #[error("{tag} parameter {index} must be a string")]
    NotAString { tag: String, index: usize },
    #[error(transparent)]
    Color(#[from] ParseColorError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Command(TransformCommand),
    Malformed { raw: Value, error: CommandError },
}

impl Step {
    pub fn parse(raw: Value) -> Self {
        match parse_command(&raw) {
            Ok(command) => Step::Command(command),
            Err(error) => Step::Malformed { raw, error },
        }
    }
}

/// Ordered command list. Slot `i` is the `i`th entry, malformed or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandList {
    steps: Vec<Step>,
}

impl CommandList {
    pub fn new(commands: Vec<TransformCommand>) -> Self {
        CommandList {
            steps: commands.into_iter().map(Step::Command).collect(),
        }
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        CommandList { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push(&mut self, command: TransformCommand) {
        self.steps.push(Step::Command(command));
    }

    pub fn pop(&mut self) -> Option<Step> {
        self.steps.pop()
    }

    pub fn commands(&self) -> impl Iterator<Item = &TransformCommand> {
        self.steps.iter().filter_map(|step| match step {
            Step::Command(c) => Some(c),
            Step::Malformed { .. } => None,
        })
    }

    /// Reverse playback of save/restore pairs would restore before saving.
    pub fn supports_reverse(&self) -> bool {
        !self
            .commands()
            .any(|c| matches!(c, TransformCommand::Save | TransformCommand::Restore))
    }

    pub fn surface_hint(&self) -> Surface {
        if self.commands().any(|c| c.surface() == Surface::Scene) {
            Surface::Scene
        } else {
            Surface::Canvas
        }
    }
}

impl<'de> Deserialize<'de> for CommandList {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Vec::<Value>::deserialize(d)?;
        Ok(CommandList::from_steps(raw.into_iter().map(Step::parse).collect()))
    }
}

// ---------------------------------------------------------------------------
// Positional parameter parsing
// ---------------------------------------------------------------------------

struct Params<'v> {
    tag: &'v str,
    items: &'v [Value],
}

impl<'v> Params<'v> {
    fn arity(&self, min: usize, max: usize, expected: &'static str) -> Result<(), CommandError> {
        let n = self.items.len();
        if n < min || n > max {
            return Err(CommandError::Arity {
                tag: self.tag.to_string(),
                expected,
                actual: n,
            });
        }
        Ok(())
    }

    fn number(&self, index: usize) -> Result<f64, CommandError> {
        self.items
            .get(index)
            .and_then(Value::as_f64)
            .ok_or_else(|| CommandError::NotANumber {
                tag: self.tag.to_string(),
                index: index + 1,
            })
    }

    fn string(&self, index: usize) -> Result<&'v str, CommandError> {
        self.items
            .get(index)
            .and_then(Value::as_str)
            .ok_or_else(|| CommandError::NotAString {
                tag: self.tag.to_string(),
                index: index + 1,
            })
    }

    fn optional_string(&self, index: usize) -> Result<Option<&'v str>, CommandError> {
        match self.items.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.string(index).map(Some),
        }
    }

    fn color(&self, index: usize) -> Result<Color, CommandError> {
        match self.optional_string(index)? {
            Some(text) => Ok(text.parse()?),
            None => Ok(Color::default()),
        }
    }

    fn vector(&self, start: usize) -> Result<Vector3<f64>, CommandError> {
        Ok(Vector3::new(
            self.number(start)?,
            self.number(start + 1)?,
            self.number(start + 2)?,
        ))
    }
}

fn parse_command(raw: &Value) -> Result<TransformCommand, CommandError> {
    let entry = raw.as_array().ok_or(CommandError::NotAnArray)?;
    let (tag, items) = entry.split_first().ok_or(CommandError::MissingTag)?;
    let tag = tag.as_str().ok_or(CommandError::MissingTag)?;
    let p = Params { tag, items };

    let command = match tag {
        "box" => {
            p.arity(4, 6, "name, width, height, depth, color?, parent?")?;
            TransformCommand::Create(Create {
                name: p.string(0)?.to_string(),
                primitive: Primitive::Box {
                    width: p.number(1)?,
                    height: p.number(2)?,
                    depth: p.number(3)?,
                },
                color: p.color(4)?,
                parent: p.optional_string(5)?.map(str::to_string),
            })
        }
        "cone" => {
            p.arity(3, 5, "name, radius, height, color?, parent?")?;
            TransformCommand::Create(Create {
                name: p.string(0)?.to_string(),
                primitive: Primitive::Cone {
                    radius: p.number(1)?,
                    height: p.number(2)?,
                },
                color: p.color(3)?,
                parent: p.optional_string(4)?.map(str::to_string),
            })
        }
        "translateX" | "translateY" | "translateZ" => {
            p.arity(2, 2, "name, distance")?;
            TransformCommand::TranslateAxis(TranslateAxis {
                name: p.string(0)?.to_string(),
                axis: axis_suffix(tag),
                distance: p.number(1)?,
            })
        }
        "rotateX" | "rotateY" | "rotateZ" => {
            p.arity(2, 2, "name, degrees")?;
            TransformCommand::RotateAxis(RotateAxis {
                name: p.string(0)?.to_string(),
                axis: axis_suffix(tag),
                degrees: p.number(1)?,
            })
        }
        "position" => {
            p.arity(4, 4, "name, x, y, z")?;
            let v = p.vector(1)?;
            TransformCommand::Position(Position {
                name: p.string(0)?.to_string(),
                x: v.x,
                y: v.y,
                z: v.z,
            })
        }
        "rotation" => {
            p.arity(4, 4, "name, x, y, z")?;
            let v = p.vector(1)?;
            TransformCommand::Rotation(Rotation {
                name: p.string(0)?.to_string(),
                x: v.x,
                y: v.y,
                z: v.z,
            })
        }
        "rotateOnAxis" => {
            p.arity(5, 5, "name, x, y, z, degrees")?;
            TransformCommand::RotateOnAxis(RotateOnAxis {
                name: p.string(0)?.to_string(),
                axis: p.vector(1)?,
                degrees: p.number(4)?,
            })
        }
        "lookAt" => {
            p.arity(4, 4, "name, x, y, z")?;
            TransformCommand::LookAt(LookAt {
                name: p.string(0)?.to_string(),
                target: p.vector(1)?,
            })
        }
        // `scale` is shared: a leading name means the 3D form.
        "scale" if items.first().is_some_and(Value::is_string) => {
            p.arity(4, 4, "name, x, y, z")?;
            let v = p.vector(1)?;
            TransformCommand::Scale(Scale {
                name: p.string(0)?.to_string(),
                x: v.x,
                y: v.y,
                z: v.z,
            })
        }
        "scale" => {
            p.arity(2, 2, "x, y")?;
            TransformCommand::Scale2d(Scale2d {
                x: p.number(0)?,
                y: p.number(1)?,
            })
        }
        "translate" => {
            p.arity(2, 2, "x, y")?;
            TransformCommand::Translate(Translate {
                x: p.number(0)?,
                y: p.number(1)?,
            })
        }
        "rotate" => {
            p.arity(1, 1, "degrees")?;
            TransformCommand::Rotate(Rotate {
                degrees: p.number(0)?,
            })
        }
        "save" => {
            p.arity(0, 0, "no")?;
            TransformCommand::Save
        }
        "restore" => {
            p.arity(0, 0, "no")?;
            TransformCommand::Restore
        }
        "fillRect" => {
            p.arity(4, 5, "x, y, width, height, color?")?;
            TransformCommand::FillRect(FillRect {
                x: p.number(0)?,
                y: p.number(1)?,
                width: p.number(2)?,
                height: p.number(3)?,
                color: p.color(4)?,
            })
        }
        "triangle" => {
            p.arity(2, 3, "x, y, color?")?;
            TransformCommand::Triangle(Triangle {
                x: p.number(0)?,
                y: p.number(1)?,
                color: p.color(2)?,
            })
        }
        other => return Err(CommandError::UnknownTag(other.to_string())),
    };
    Ok(command)
}

fn axis_suffix(tag: &str) -> Axis {
    match tag.chars().last() {
        Some('X') => Axis::X,
        Some('Y') => Axis::Y,
        _ => Axis::Z,
    }
}
