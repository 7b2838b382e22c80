//! Keyboard sequence builder for canvas toys.
//!
//! Pick a command kind, dial in its parameters, and append it to a draft
//! list. The session swaps the draft in when it is run.

use crate::engine::commands::{
    FillRect, Replay, Rotate, Scale2d, TransformCommand, Translate, literal,
};
use crate::engine::source::{CommandList, Step};
use crate::types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    Translate,
    Scale,
    Rotate,
    FillRect,
    Save,
    Restore,
}

impl BuildKind {
    pub const ALL: [BuildKind; 6] = [
        BuildKind::Translate,
        BuildKind::Scale,
        BuildKind::Rotate,
        BuildKind::FillRect,
        BuildKind::Save,
        BuildKind::Restore,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuildKind::Translate => "translate",
            BuildKind::Scale => "scale",
            BuildKind::Rotate => "rotate",
            BuildKind::FillRect => "fillRect",
            BuildKind::Save => "save",
            BuildKind::Restore => "restore",
        }
    }

    /// Parameter dials with their ranges, starting values and step sizes.
    fn params(self) -> Vec<Param> {
        match self {
            BuildKind::Translate => vec![
                Param::new("translateX", -50.0, 50.0, 0.0, 5.0),
                Param::new("translateY", -50.0, 50.0, 0.0, 5.0),
            ],
            BuildKind::Scale => vec![
                Param::new("scaleX", 0.0, 3.0, 1.0, 0.5),
                Param::new("scaleY", 0.0, 3.0, 1.0, 0.5),
            ],
            BuildKind::Rotate => vec![Param::new("angle", -180.0, 180.0, 0.0, 5.0)],
            BuildKind::FillRect => vec![
                Param::new("posX", -50.0, 50.0, 0.0, 10.0),
                Param::new("posY", -50.0, 50.0, 0.0, 10.0),
                Param::new("sizeX", 0.0, 100.0, 0.0, 10.0),
                Param::new("sizeY", 0.0, 100.0, 0.0, 10.0),
            ],
            BuildKind::Save | BuildKind::Restore => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub step: f64,
}

impl Param {
    fn new(label: &'static str, min: f64, max: f64, value: f64, step: f64) -> Self {
        Param { label, min, max, value, step }
    }

    fn adjust(&mut self, steps: i32) {
        self.value = (self.value + f64::from(steps) * self.step).clamp(self.min, self.max);
    }
}

#[derive(Debug, Clone)]
pub struct Builder {
    kind: BuildKind,
    params: Vec<Param>,
    selected: usize,
    commands: CommandList,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            kind: BuildKind::Translate,
            params: BuildKind::Translate.params(),
            selected: 0,
            commands: CommandList::default(),
        }
    }

    pub fn kind(&self) -> BuildKind {
        self.kind
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn commands(&self) -> &CommandList {
        &self.commands
    }

    /// Move to the next or previous command kind. Its dials start fresh.
    pub fn cycle_kind(&mut self, delta: isize) {
        let n = BuildKind::ALL.len() as isize;
        let at = BuildKind::ALL.iter().position(|k| *k == self.kind).unwrap_or(0) as isize;
        self.kind = BuildKind::ALL[(at + delta).rem_euclid(n) as usize];
        self.params = self.kind.params();
        self.selected = 0;
    }

    pub fn select_param(&mut self, delta: isize) {
        if self.params.is_empty() {
            return;
        }
        let n = self.params.len() as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(n) as usize;
    }

    /// Turn the selected dial by whole steps, staying inside its range.
    pub fn adjust(&mut self, steps: i32) {
        if let Some(param) = self.params.get_mut(self.selected) {
            param.adjust(steps);
        }
    }

    /// The command the current dials describe.
    pub fn draft(&self) -> TransformCommand {
        let v = |i: usize| self.params.get(i).map_or(0.0, |p| p.value);
        match self.kind {
            BuildKind::Translate => TransformCommand::Translate(Translate { x: v(0), y: v(1) }),
            BuildKind::Scale => TransformCommand::Scale2d(Scale2d { x: v(0), y: v(1) }),
            BuildKind::Rotate => TransformCommand::Rotate(Rotate { degrees: v(0) }),
            BuildKind::FillRect => TransformCommand::FillRect(FillRect {
                x: v(0),
                y: v(1),
                width: v(2),
                height: v(3),
                color: Color::default(),
            }),
            BuildKind::Save => TransformCommand::Save,
            BuildKind::Restore => TransformCommand::Restore,
        }
    }

    pub fn add(&mut self) {
        self.commands.push(self.draft());
    }

    /// Drop the last added command. False when the list is already empty.
    pub fn delete_last(&mut self) -> bool {
        self.commands.pop().is_some()
    }

    pub fn clear(&mut self) {
        *self = Builder::new();
    }

    /// The draft list as code, one line per command.
    pub fn listing(&self) -> Vec<String> {
        self.commands
            .steps()
            .iter()
            .filter_map(|step| match step {
                Step::Command(command) => Some(listing_line(command)),
                Step::Malformed { .. } => None,
            })
            .collect()
    }
}

fn listing_line(command: &TransformCommand) -> String {
    match command {
        TransformCommand::Translate(t) => {
            format!("context.translate({},{});", literal(t.x), literal(t.y))
        }
        TransformCommand::Scale2d(s) => format!("context.scale({},{});", literal(s.x), literal(s.y)),
        TransformCommand::Rotate(r) => format!("context.rotate({});", literal(r.degrees)),
        TransformCommand::FillRect(f) => format!(
            "context.fillRect({},{},{},{});",
            literal(f.x),
            literal(f.y),
            literal(f.width),
            literal(f.height)
        ),
        TransformCommand::Save => "context.save();".to_string(),
        TransformCommand::Restore => "context.restore();".to_string(),
        other => other.trace_lines(1.0).join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dials_clamp_to_their_range() {
        let mut builder = Builder::new();
        builder.adjust(3);
        assert_eq!(builder.params()[0].value, 15.0);
        builder.adjust(100);
        assert_eq!(builder.params()[0].value, 50.0);
        builder.select_param(1);
        builder.adjust(-100);
        assert_eq!(builder.params()[1].value, -50.0);
        builder.select_param(1);
        assert_eq!(builder.selected(), 0);
    }

    #[test]
    fn cycling_kinds_resets_dials() {
        let mut builder = Builder::new();
        builder.adjust(2);
        builder.cycle_kind(1);
        assert_eq!(builder.kind(), BuildKind::Scale);
        assert_eq!(builder.params()[0].value, 1.0);
        builder.cycle_kind(-2);
        assert_eq!(builder.kind(), BuildKind::Restore);
        assert!(builder.params().is_empty());
        builder.adjust(1);
        builder.select_param(1);
        assert_eq!(builder.draft(), TransformCommand::Restore);
    }

    #[test]
    fn add_and_delete_edit_the_listing() {
        let mut builder = Builder::new();
        builder.adjust(2);
        builder.add();
        builder.cycle_kind(2);
        builder.adjust(-9);
        builder.add();
        builder.cycle_kind(1);
        builder.select_param(2);
        builder.adjust(2);
        builder.add();
        assert_eq!(
            builder.listing(),
            [
                "context.translate(10,0);",
                "context.rotate(-45);",
                "context.fillRect(0,0,20,0);",
            ]
        );
        assert!(builder.delete_last());
        assert_eq!(builder.commands().len(), 2);
        builder.clear();
        assert!(!builder.delete_last());
        assert_eq!(builder.kind(), BuildKind::Translate);
    }
}
