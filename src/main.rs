use std::process;

use anyhow::{Context, Result, bail};

use transform_toy::{
    config::ToyConfig,
    engine::{Direction, source::ToySource},
    player::{
        Player,
        session::{Overlays, Stage},
    },
    renderer::SceneView,
    types::{Grid, TerminalContract},
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const TRACE_USAGE: &str = "transform-toy trace <toy.json> <progress> [--reverse]";
const RENDER_USAGE: &str = "transform-toy render <toy.json> <progress> [--reverse]";
const PLAY_USAGE: &str = "transform-toy play <toy.json>";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("trace") => {
            let path = args.next().context(TRACE_USAGE)?;
            let progress = parse_progress(args.next(), TRACE_USAGE)?;
            let direction = parse_direction(args.next(), TRACE_USAGE)?;
            trace(&path, progress, direction)
        }
        Some("render") => {
            let path = args.next().context(RENDER_USAGE)?;
            let progress = parse_progress(args.next(), RENDER_USAGE)?;
            let direction = parse_direction(args.next(), RENDER_USAGE)?;
            render(&path, progress, direction)
        }
        Some("play") => {
            let path = args.next().context(PLAY_USAGE)?;
            play(&path)
        }
        _ => bail!(
            "Transform Toy - step through 2D and 3D transform sequences\n\nUsage:\n  {TRACE_USAGE}\n  {RENDER_USAGE}\n  {PLAY_USAGE}"
        ),
    }
}

fn parse_progress(arg: Option<String>, usage: &str) -> Result<f64> {
    let arg = arg.context(usage.to_string())?;
    arg.parse()
        .with_context(|| format!("Invalid progress {arg:?}\n\nUsage:\n  {usage}"))
}

fn parse_direction(arg: Option<String>, usage: &str) -> Result<Direction> {
    match arg.as_deref() {
        None => Ok(Direction::Forward),
        Some("--reverse") => Ok(Direction::Reverse),
        Some(other) => bail!("Unexpected argument {other:?}\n\nUsage:\n  {usage}"),
    }
}

fn check_reverse(toy: &ToySource, direction: Direction) -> Result<()> {
    if direction == Direction::Reverse && !toy.commands.supports_reverse() {
        bail!("{:?} uses save/restore and cannot play in reverse", toy.title);
    }
    Ok(())
}

fn trace(path: &str, progress: f64, direction: Direction) -> Result<()> {
    let toy = ToySource::load(path)?;
    check_reverse(&toy, direction)?;

    let mut stage = Stage::new(toy.surface());
    let trace = stage.replay(&toy.commands, progress, direction);
    for line in &trace.lines {
        println!("{}", line.text);
    }
    for diagnostic in &trace.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    Ok(())
}

fn render(path: &str, progress: f64, direction: Direction) -> Result<()> {
    let toy = ToySource::load(path)?;
    check_reverse(&toy, direction)?;

    let config = ToyConfig::load();
    let contract = TerminalContract {
        width: config.viewport.panel_width,
        height: config.viewport.panel_height,
    };
    let view = SceneView {
        extent: config.viewport.scene_extent,
        ..SceneView::default()
    };
    let overlays = Overlays {
        original_csys: true,
        final_csys: true,
    };

    let mut stage = Stage::new(toy.surface());
    let trace = stage.replay(&toy.commands, progress, direction);
    let grid = stage.render(overlays, view, contract);

    print_grid(&grid);
    println!();
    for line in &trace.lines {
        println!("{}", line.text);
    }
    for note in stage.describe() {
        println!("{note}");
    }
    for diagnostic in &trace.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    eprintln!(
        "Rendered {:?} at {progress} of {} commands",
        toy.title,
        toy.commands.len()
    );
    Ok(())
}

fn print_grid(grid: &Grid) {
    for row in grid {
        let line: String = row.iter().map(|cell| cell.ch).collect();
        println!("{}", line.trim_end());
    }
}

fn play(path: &str) -> Result<()> {
    let toy = ToySource::load(path)?;
    let mut player = Player::new(toy, ToyConfig::load());
    player.play()
}
