use anyhow::{Context, Result};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde_json::json;

use transform_toy::canvas::Canvas;
use transform_toy::engine::source::{CommandList, ToySource};
use transform_toy::engine::target::{CanvasHost, Target};
use transform_toy::engine::{Direction, Engine, application_fraction};
use transform_toy::scene::{Pose, SceneGraph};
use transform_toy::types::Activation;

fn commands(list: serde_json::Value) -> CommandList {
    serde_json::from_value(list).unwrap()
}

fn texts(trace: &transform_toy::types::Trace) -> Vec<&str> {
    trace.lines.iter().map(|l| l.text.as_str()).collect()
}

fn box_slide_turn() -> CommandList {
    commands(json!([
        ["box", "b1", 1, 1, 1],
        ["translateX", "b1", 5],
        ["rotateY", "b1", 90],
    ]))
}

fn close(a: Vector3<f64>, b: Vector3<f64>) -> bool {
    (a - b).norm() < 1.0e-9
}

#[test]
fn halfway_through_the_move_leaves_rotation_alone() {
    let mut scene = SceneGraph::new();
    let trace = Engine::replay(Target::Scene(&mut scene), &box_slide_turn(), 1.5, Direction::Forward);

    let b1 = scene.get("b1").unwrap();
    assert!(close(b1.pose.position, Vector3::new(2.5, 0.0, 0.0)));
    assert_eq!(b1.pose.rotation, UnitQuaternion::identity());

    let activations: Vec<Activation> = trace.lines.iter().map(|l| l.activation).collect();
    assert_eq!(activations.len(), 6);
    assert!(activations[..4].iter().all(|a| *a == Activation::Complete));
    assert_eq!(activations[4], Activation::Partial);
    assert_eq!(activations[5], Activation::Inactive);
    assert_eq!(trace.lines[4].text, "b1.translateX(2.5);");
    assert_eq!(trace.lines[5].text, "b1.rotateY(0.0);");
    assert!(trace.diagnostics.is_empty());
}

#[test]
fn fully_rewound_removes_the_object_quietly() {
    let list = box_slide_turn();
    let mut scene = SceneGraph::new();
    Engine::replay(Target::Scene(&mut scene), &list, 3.0, Direction::Forward);
    assert!(scene.get("b1").is_some());

    let trace = Engine::replay(Target::Scene(&mut scene), &list, 3.0, Direction::Reverse);
    assert!(scene.get("b1").is_none());
    assert!(scene.is_empty());
    assert!(trace.diagnostics.is_empty());
    assert!(trace.lines.iter().all(|l| l.activation == Activation::Inactive));
}

#[test]
fn creation_tracks_the_application_fraction() {
    let list = box_slide_turn();
    let mut scene = SceneGraph::new();
    for direction in [Direction::Forward, Direction::Reverse] {
        for step in 0..=60 {
            let progress = step as f64 * 0.05;
            Engine::replay(Target::Scene(&mut scene), &list, progress, direction);
            let expected = application_fraction(0, progress, direction) > 0.0;
            assert_eq!(
                scene.get("b1").is_some(),
                expected,
                "{direction:?} at {progress}"
            );
        }
    }
}

#[test]
fn repeated_replays_are_identical() {
    let list = commands(json!([
        ["box", "base", 2, 1, 2],
        ["cone", "tip", 0.5, 1, "red", "base"],
        ["translateY", "tip", 1],
        ["rotateOnAxis", "base", 0, 1, 0, 30],
        ["scale", "tip", 2, 2, 2],
    ]));
    let mut scene = SceneGraph::new();
    let first = Engine::replay(Target::Scene(&mut scene), &list, 3.7, Direction::Forward);
    let tip = scene.get("tip").unwrap().pose;
    let base = scene.get("base").unwrap().pose;

    for _ in 0..5 {
        let again = Engine::replay(Target::Scene(&mut scene), &list, 3.7, Direction::Forward);
        assert_eq!(again, first);
    }
    assert_eq!(scene.get("tip").unwrap().pose, tip);
    assert_eq!(scene.get("base").unwrap().pose, base);
}

#[test]
fn scale_interpolates_from_unit() {
    let list = commands(json!([["box", "b", 1, 1, 1], ["scale", "b", 2, 3, 4]]));
    let mut scene = SceneGraph::new();
    for (progress, expected) in [
        (1.0, Vector3::new(1.0, 1.0, 1.0)),
        (1.5, Vector3::new(1.5, 2.0, 2.5)),
        (2.0, Vector3::new(2.0, 3.0, 4.0)),
    ] {
        Engine::replay(Target::Scene(&mut scene), &list, progress, Direction::Forward);
        assert!(close(scene.get("b").unwrap().pose.scale, expected));
    }
}

#[test]
fn save_restore_round_trip_keeps_the_transform() {
    let list = commands(json!([["save"], ["translate", 10, 10], ["restore"]]));
    let mut canvas = Canvas::new();
    let before: Matrix3<f64> = canvas.transform();
    let trace = Engine::replay(Target::Canvas(&mut canvas), &list, 3.0, Direction::Forward);
    assert_eq!(canvas.transform(), before);
    assert_eq!(
        texts(&trace),
        ["context.save();", "context.translate(10.0,10.0);", "context.restore();"]
    );
}

#[test]
fn bad_entries_are_reported_and_skipped() {
    let list = commands(json!([
        ["box", "b", 1, 1, 1],
        ["wobble", "b"],
        ["translateX", "b", "far"],
        ["translateX", "b", 2],
        ["translateX", "ghost", 9],
    ]));
    let mut scene = SceneGraph::new();
    let trace = Engine::replay(Target::Scene(&mut scene), &list, 5.0, Direction::Forward);

    assert_eq!(trace.diagnostics.len(), 2);
    assert!(trace.diagnostics[0].contains("unknown command \"wobble\""));
    assert!(trace.diagnostics[1].contains("must be a number"));
    // Malformed slots still consume their place in the list.
    assert!(close(scene.get("b").unwrap().pose.position, Vector3::new(2.0, 0.0, 0.0)));
    assert!(scene.get("ghost").is_none());
}

#[test]
fn wrong_surface_is_a_diagnostic() {
    let list = commands(json!([["translate", 5, 5], ["box", "b", 1, 1, 1]]));
    let mut canvas = Canvas::new();
    let trace = Engine::replay(Target::Canvas(&mut canvas), &list, 2.0, Direction::Forward);
    assert_eq!(trace.diagnostics, ["command 1 cannot run on a canvas"]);
    assert!(canvas.display_list().is_empty());
}

#[test]
fn rewound_host_nodes_return_to_rest() {
    let rest = Pose {
        position: Vector3::new(0.0, 1.0, 0.0),
        ..Pose::default()
    };
    let list = commands(json!([
        ["translateX", "rig", 5],
        ["scale", "rig", 2, 2, 2],
        ["rotateY", "rig", 90],
    ]));

    let mut scene = SceneGraph::new();
    scene.insert_group("rig", None, rest);
    Engine::replay(Target::Scene(&mut scene), &list, 3.0, Direction::Forward);
    assert!(scene.get("rig").unwrap().pose != rest);

    Engine::replay(Target::Scene(&mut scene), &list, 0.0, Direction::Forward);
    assert_eq!(scene.get("rig").unwrap().pose, rest);

    Engine::replay(Target::Scene(&mut scene), &list, 1.0, Direction::Forward);
    let mut fresh = SceneGraph::new();
    fresh.insert_group("rig", None, rest);
    Engine::replay(Target::Scene(&mut fresh), &list, 1.0, Direction::Forward);
    assert_eq!(scene.get("rig").unwrap().pose, fresh.get("rig").unwrap().pose);
    assert!(close(scene.get("rig").unwrap().pose.position, Vector3::new(5.0, 1.0, 0.0)));
}

#[test]
fn quarter_steps_round_like_the_canvas_readout() {
    let list = commands(json!([["translate", 1, 3], ["scale", 2, 2]]));
    let trace = Engine::trace(&list, 1.25, Direction::Forward);
    assert_eq!(texts(&trace), ["context.translate(1.0,3.0);", "context.scale(1.3,1.3);"]);
    let trace = Engine::trace(&list, 0.25, Direction::Forward);
    assert_eq!(texts(&trace)[0], "context.translate(0.3,0.8);");
}

#[test]
fn any_css_color_draws() -> Result<()> {
    let list: CommandList = serde_json::from_value(json!([
        ["fillRect", 0, 0, 10, 10, "lightgray"],
        ["fillRect", 0, 0, 10, 10, "#FFFFFF80"],
        ["triangle", 0, 0, "rebeccapurple"],
    ]))?;
    let mut canvas = Canvas::new();
    let trace = Engine::replay(Target::Canvas(&mut canvas), &list, 3.0, Direction::Forward);
    assert!(trace.diagnostics.is_empty());
    assert_eq!(canvas.display_list().len(), 3);
    assert_eq!(trace.lines[0].text, "context.fillStyle=\"lightgray\"");
    assert_eq!(trace.lines[5].text, "triangle(context,0,0,rebeccapurple);");
    Ok(())
}

#[test]
fn demo_toys_load_and_replay_cleanly() -> Result<()> {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let mut seen = 0;
    for entry in std::fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let toy = ToySource::load(&path)?;
        assert!(!toy.commands.is_empty(), "{}", path.display());
        let end = toy.commands.len() as f64;
        let trace = Engine::trace(&toy.commands, end, Direction::Forward);
        assert!(trace.lines.iter().all(|l| l.activation == Activation::Complete));
        assert!(trace.diagnostics.is_empty(), "{}: {:?}", path.display(), trace.diagnostics);

        let mut scene = SceneGraph::new();
        let mut canvas = Canvas::new();
        let target = match toy.surface() {
            transform_toy::engine::commands::Surface::Scene => Target::Scene(&mut scene),
            transform_toy::engine::commands::Surface::Canvas => Target::Canvas(&mut canvas),
        };
        let replayed = Engine::replay(target, &toy.commands, end, Direction::Forward);
        assert!(replayed.diagnostics.is_empty(), "{}: {:?}", path.display(), replayed.diagnostics);
        seen += 1;
    }
    assert!(seen >= 4);
    Ok(())
}
