use clap::Parser;
use fps_sim_core::{GameSimulation, InputSnapshot, LevelDescription, SimulationConfig, Vec3};
use std::path::PathBuf;
use tracing::{info, warn};

/// Built-in arena used when no level file is given
const DEMO_LEVEL: &str = "\
# Demo arena: a row of soldiers ahead of the spawn, two trees and a low wall
PLANE models/ground.gem 0 0 0 0 0 0 100 1 100
ENEMY models/soldier.gem 0 0 5 0 0 0 0.02 0.02 0.02
ENEMY models/soldier.gem -4 0 15 0 0 0 0.02 0.02 0.02
ENEMY models/soldier.gem 4 0 15 0 0 0 0.02 0.02 0.02
ENEMY models/soldier.gem 0 0 30 0 0 0 0.02 0.02 0.02
TREE models/tree.gem -12 0 8 0 0 0 1 1 1
TREE models/tree.gem 12 0 8 0 0 0 1 1 1
WALL models/wall.gem 0 0 40 0 0 0 10 3 1
";

/// Headless FPS simulation driver with scripted input
#[derive(Parser, Debug)]
#[command(name = "fps-sim-demo")]
#[command(about = "Runs the FPS gameplay simulation without a renderer", long_about = None)]
struct Args {
    /// Level description file (defaults to a built-in arena)
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// JSON simulation config; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u32,

    /// Frame time in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Pull the trigger every N frames (0 = never fire)
    #[arg(long, default_value_t = 10)]
    fire_every: u32,

    /// Strafe left and right while firing
    #[arg(short, long)]
    strafe: bool,

    /// Seed for enemy animation phases
    #[arg(long)]
    seed: Option<u64>,

    /// Report interval in frames
    #[arg(short, long, default_value_t = 60)]
    report_interval: u32,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(path: Option<&PathBuf>) -> Result<SimulationConfig, String> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {}", path.display(), e))
}

fn load_level(path: Option<&PathBuf>) -> Result<LevelDescription, String> {
    match path {
        Some(path) => LevelDescription::load(path).map_err(|e| e.to_string()),
        None => Ok(LevelDescription::parse(DEMO_LEVEL)),
    }
}

/// Scripted input for one frame.
fn scripted_input(frame: u32, args: &Args) -> InputSnapshot {
    let mut input = InputSnapshot::idle();
    input.fire = args.fire_every > 0 && frame % args.fire_every == 0;
    if args.strafe {
        // Alternate direction once per second of simulated time
        let period = ((1.0 / args.dt.max(1e-3)).round() as u32).max(1);
        if (frame / period) % 2 == 0 {
            input.left = true;
        } else {
            input.right = true;
        }
    }
    input
}

fn main() {
    init_tracing();
    let args = Args::parse();

    println!("=== FPS Simulation Demo ===\n");

    let mut config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let level = match load_level(args.level.as_ref()) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if !(args.dt.is_finite() && args.dt > 0.0) {
        warn!("Frame time {} is not usable, frames will not advance time", args.dt);
    }

    let mut sim = GameSimulation::from_level(&config, &level);
    let start = sim.player().position();
    println!(
        "Level: {} entries, {} enemies, {} obstacles",
        level.entries().len(),
        sim.enemies().len(),
        sim.obstacles().len()
    );
    println!("Player spawn: ({:.1}, {:.1}, {:.1})\n", start.x, start.y, start.z);

    println!("Frame | Time(s) | State  | Clip | Reserve | Bullets | Enemies");
    println!("------|---------|--------|------|---------|---------|--------");

    for frame in 0..args.frames {
        let input = scripted_input(frame, &args);
        let report = sim.step(args.dt, &input);

        for index in &report.enemies_killed {
            let position: Vec3 = sim.enemies().enemies()[*index].position();
            info!(
                frame,
                enemy = index,
                "Enemy killed at ({:.1}, {:.1}, {:.1})",
                position.x,
                position.y,
                position.z
            );
        }
        if report.reload_completed {
            info!(frame, "Reload complete");
        }

        if args.report_interval > 0 && (frame + 1) % args.report_interval == 0 {
            let hud = sim.hud();
            println!(
                "{:5} | {:7.2} | {:6} | {:4} | {:7} | {:7} | {:3}/{}",
                frame + 1,
                sim.stats().simulation_time,
                hud.state.name(),
                hud.clip,
                hud.reserve,
                sim.bullets().len(),
                hud.enemies_alive,
                hud.enemies_total
            );
        }
    }

    let stats = sim.stats();
    let hud = sim.hud();
    let end = sim.player().position();
    println!("\n=== Simulation Complete ===");
    println!("Frames: {}", stats.frames);
    println!("Simulated time: {:.2}s", stats.simulation_time);
    println!("Shots fired: {}", stats.shots_fired);
    println!("Kills: {}", stats.kills);
    println!("Enemies alive: {}/{}", stats.enemies_alive, hud.enemies_total);
    println!("Ammo: {} / {} reserve", hud.clip, hud.reserve);
    println!("Player position: ({:.2}, {:.2}, {:.2})", end.x, end.y, end.z);
}
