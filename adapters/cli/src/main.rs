#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Hungry Worm level headlessly.
//!
//! Frames are simulated at a fixed step and scripted inputs are delivered on
//! the first frame at or after their timestamp. A summary of the run is printed
//! once the requested duration has elapsed.

mod script;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use hungry_worm_core::{OverlayKind, SessionState};
use hungry_worm_presentation::{GridPresentation, PresentationRequest};
use hungry_worm_session::SessionController;
use hungry_worm_system_markers::LevelAsset;
use serde::Serialize;
use tracing::{debug, info};

use script::{ScriptedInput, Signal};

#[derive(Parser, Debug)]
#[command(
    name = "hungry-worm",
    version,
    about = "Play a Hungry Worm level headlessly with scripted input"
)]
struct Cli {
    /// Level asset to load.
    #[arg(long, default_value = "levels/meadow.toml")]
    level: PathBuf,
    /// Seed for spawn point and entity placement.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Simulated run length in seconds.
    #[arg(long, default_value_t = 30.0)]
    duration: f64,
    /// Simulated frame length in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame: f64,
    /// Side length of a tile in world units, used for reported positions.
    #[arg(long, default_value_t = 32.0)]
    tile_length: f32,
    /// Scripted input as `time:signal`, e.g. `0.5:right` or `4:pause`.
    #[arg(long = "input", value_name = "TIME:SIGNAL")]
    inputs: Vec<ScriptedInput>,
    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Outcome of a headless run.
#[derive(Debug, Serialize)]
struct RunSummary {
    level: String,
    seed: u64,
    frames: u64,
    state: &'static str,
    generation: u64,
    score: u32,
    best_score: u32,
    deaths: u32,
    simulation_seconds: f64,
    creature: Option<CreatureSummary>,
    entities: usize,
}

#[derive(Debug, Serialize)]
struct CreatureSummary {
    length: usize,
    head: [i32; 2],
    head_position: [f32; 2],
}

/// Entry point for the Hungry Worm command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let summary = run(&cli)?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode run summary")?
        );
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let duration = positive_seconds("duration", cli.duration)?;
    let frame = positive_seconds("frame", cli.frame)?;

    let level = LevelAsset::load(&cli.level)
        .with_context(|| format!("failed to load level from {}", cli.level.display()))?;
    let name = level.name().to_owned();
    let mut controller = SessionController::new(level, cli.seed)
        .with_context(|| format!("failed to start level `{name}`"))?;
    let grid = GridPresentation::new(controller.layout().walls(), cli.tile_length)
        .context("invalid tile length")?;

    let mut inputs = cli.inputs.clone();
    inputs.sort_by_key(|input| input.at);
    let mut pending = inputs.into_iter().peekable();

    let mut tally = Tally::default();
    tally.observe(controller.drain_requests());

    let mut now = Duration::ZERO;
    let mut frames = 0_u64;
    while now < duration {
        now = now.saturating_add(frame).min(duration);
        while let Some(input) = pending.next_if(|input| input.at <= now) {
            debug!(at = ?input.at, signal = ?input.signal, "delivering scripted input");
            deliver(&mut controller, input.signal);
        }
        controller.update(now);
        tally.observe(controller.drain_requests());
        frames += 1;
    }

    info!(
        frames,
        score = controller.score(),
        deaths = tally.deaths,
        "run finished"
    );

    Ok(RunSummary {
        level: name,
        seed: cli.seed,
        frames,
        state: state_name(controller.state()),
        generation: controller.generation().get(),
        score: controller.score(),
        best_score: tally.best_score,
        deaths: tally.deaths,
        simulation_seconds: controller.simulation_time().as_secs_f64(),
        creature: controller.creature().map(|creature| {
            let head = creature.head();
            CreatureSummary {
                length: creature.len(),
                head: [head.column(), head.row()],
                head_position: grid.cell_center(head).to_array(),
            }
        }),
        entities: controller.entities().len(),
    })
}

fn deliver(controller: &mut SessionController, signal: Signal) {
    match signal {
        Signal::Turn(direction) => controller.change_direction(direction),
        Signal::Pause => controller.toggle_pause(),
        Signal::Restart => controller.restart(),
        Signal::Complete => controller.complete_level(),
    }
}

fn positive_seconds(name: &str, value: f64) -> Result<Duration> {
    if !value.is_finite() || value <= 0.0 {
        bail!("--{name} must be a positive number of seconds (received {value})");
    }
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("--{name} is out of range (received {value})"))
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Active => "active",
        SessionState::Paused => "paused",
        SessionState::Death => "death",
        SessionState::Results => "results",
    }
}

fn print_summary(summary: &RunSummary) {
    println!("level:      {}", summary.level);
    println!("seed:       {}", summary.seed);
    println!(
        "simulated:  {:.2}s over {} frames",
        summary.simulation_seconds, summary.frames
    );
    println!("state:      {}", summary.state);
    println!(
        "score:      {} (best {})",
        summary.score, summary.best_score
    );
    println!("deaths:     {}", summary.deaths);
    match &summary.creature {
        Some(creature) => println!(
            "creature:   length {} with head at ({}, {})",
            creature.length, creature.head[0], creature.head[1]
        ),
        None => println!("creature:   detached"),
    }
    println!("entities:   {}", summary.entities);
}

/// Running totals gathered from presentation requests.
#[derive(Debug, Default)]
struct Tally {
    deaths: u32,
    best_score: u32,
}

impl Tally {
    fn observe(&mut self, requests: Vec<PresentationRequest>) {
        for request in requests {
            match request {
                PresentationRequest::ShowOverlay(OverlayKind::Death) => self.deaths += 1,
                PresentationRequest::Score(score) => {
                    self.best_score = self.best_score.max(score);
                }
                _ => {}
            }
        }
    }
}
