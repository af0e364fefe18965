#![deny(unsafe_code)]
//! CLI binary for the flowfield engine.
//!
//! Subcommands:
//! - `run <scene>`: advect a scene for N ticks, write the trails as PNG
//! - `sample <scene>`: print a grid of field arrows
//! - `list`: print available scenes, equations, integrators and noise backends

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use flowfield_core::source::{Equation, NoiseBackend};
use flowfield_core::{Command as SimCommand, Integrator, RunSpec, Simulation};
use flowfield_scenes::raster::{load_raster, Channel};
use flowfield_scenes::snapshot::write_png;
use flowfield_scenes::trail::TrailCanvas;
use flowfield_scenes::SceneKind;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowfield", about = "Particle flow-field CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SceneArgs {
    /// Scene name (e.g. "flow-stream"). Ignored with --spec.
    #[arg(default_value = "flow-stream")]
    scene: String,

    /// Read the whole run description from a JSON file.
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Display width in pixels.
    #[arg(short = 'W', long, default_value_t = 800)]
    width: usize,

    /// Display height in pixels.
    #[arg(short = 'H', long, default_value_t = 600)]
    height: usize,

    /// Number of ticks to run.
    #[arg(short, long, default_value_t = 600)]
    ticks: usize,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Frame rate reported to frame-rate step policies.
    #[arg(long, default_value_t = 60.0)]
    frame_rate: f64,

    /// Scene parameter overrides as a JSON object.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Image to sample for raster-driven scenes.
    #[arg(long)]
    raster: Option<PathBuf>,

    /// Raster channel: red, green, blue or luma.
    #[arg(long, default_value = "red")]
    channel: String,
}

impl SceneArgs {
    fn run_spec(&self) -> Result<RunSpec, CliError> {
        let spec = match &self.spec {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
                serde_json::from_str(&text)
                    .map_err(|e| CliError::Input(format!("invalid run spec: {e}")))?
            }
            None => {
                let params = serde_json::from_str(&self.params)
                    .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
                RunSpec {
                    params,
                    ticks: self.ticks,
                    frame_rate: self.frame_rate,
                    ..RunSpec::new(&self.scene, self.width, self.height, self.seed)
                }
            }
        };
        spec.validate()?;
        Ok(spec)
    }

    fn simulation(&self, spec: &RunSpec) -> Result<Simulation, CliError> {
        let mut sim = SceneKind::from_spec(spec)?;
        match &self.raster {
            Some(path) => {
                let channel = Channel::from_name(&self.channel)
                    .ok_or_else(|| CliError::Input(format!("unknown channel: {}", self.channel)))?;
                let grid = load_raster(path, channel)?;
                sim.post(SimCommand::InstallRaster(Arc::new(grid)))?;
            }
            None => {
                if SceneKind::from_name(&spec.scene)?.needs_raster() {
                    info!(scene = %spec.scene, "no --raster given; the field stays still");
                }
            }
        }
        Ok(sim)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run a scene for N ticks and write the accumulated trails as a PNG.
    Run {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// Run a scene for N ticks, then print the field on a regular grid.
    Sample {
        #[command(flatten)]
        scene: SceneArgs,

        /// Grid spacing in display units.
        #[arg(short, long, default_value_t = 75.0)]
        resolution: f64,
    },
    /// List scenes, equations, integrators and noise backends.
    List,
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => list(cli.json)?,
        Command::Run { scene, output } => render(&scene, &output, cli.json)?,
        Command::Sample { scene, resolution } => sample(&scene, resolution, cli.json)?,
    }
    Ok(())
}

fn list(json: bool) -> Result<(), CliError> {
    let scenes = SceneKind::list_scenes();
    let equations: Vec<&str> = Equation::names().collect();
    let integrators: Vec<&str> = Integrator::all().iter().map(Integrator::name).collect();
    let noise: Vec<&str> = [NoiseBackend::Perlin, NoiseBackend::Value, NoiseBackend::Simplex]
        .iter()
        .map(NoiseBackend::name)
        .collect();
    if json {
        let info = serde_json::json!({
            "scenes": scenes,
            "equations": equations,
            "integrators": integrators,
            "noise": noise,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Scenes:");
        for name in scenes {
            println!("  {name}");
        }
        println!("Equations:");
        for name in &equations {
            println!("  {name}");
        }
        println!("Integrators: {}", integrators.join(", "));
        println!("Noise: {}", noise.join(", "));
    }
    Ok(())
}

fn render(args: &SceneArgs, output: &Path, json: bool) -> Result<(), CliError> {
    let spec = args.run_spec()?;
    let mut sim = args.simulation(&spec)?;
    let mut canvas = TrailCanvas::new(spec.width, spec.height)?;

    for _ in 0..spec.ticks {
        let frame = sim.tick(spec.frame_rate);
        canvas.draw_frame(&frame);
    }
    debug!(
        segments = canvas.segments_drawn(),
        suppressed = canvas.frames_suppressed(),
        "trails accumulated"
    );

    write_png(canvas.density(), output)?;

    if json {
        let info = serde_json::json!({
            "scene": spec.scene,
            "width": spec.width,
            "height": spec.height,
            "ticks": spec.ticks,
            "seed": spec.seed,
            "particles": sim.particles().len(),
            "segments": canvas.segments_drawn(),
            "params": sim.config().params(),
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "rendered {} ({}x{}, {} ticks, seed {}) -> {}",
            spec.scene,
            spec.width,
            spec.height,
            spec.ticks,
            spec.seed,
            output.display()
        );
    }
    Ok(())
}

fn sample(args: &SceneArgs, resolution: f64, json: bool) -> Result<(), CliError> {
    let spec = args.run_spec()?;
    let mut sim = args.simulation(&spec)?;
    sim.apply_pending();
    for _ in 0..spec.ticks {
        sim.tick(spec.frame_rate);
    }
    let sampler = sim.sampler(spec.frame_rate, resolution)?;
    if json {
        let samples: Vec<_> = sampler.samples().collect();
        println!("{}", serde_json::to_string_pretty(&samples)?);
    } else {
        println!("{:>10} {:>10} {:>10} {:>12}", "x", "y", "angle", "magnitude");
        for s in sampler.samples() {
            println!(
                "{:>10.1} {:>10.1} {:>10.4} {:>12.6}",
                s.position.x, s.position.y, s.angle, s.magnitude
            );
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "flowfield=debug"
    } else {
        "flowfield=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
