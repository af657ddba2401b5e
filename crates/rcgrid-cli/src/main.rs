//! rcgrid command-line front end.
//!
//! Runs one simulation, writes every frame to a gnuplot data file, and
//! prints the elapsed wall-clock time as `seconds:milliseconds` on
//! stdout. Log output goes to stderr.
//!
//! ```text
//! rcgrid 64 64 100 4 --output output.txt --gnuplot-script plot.gp
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rcgrid::prelude::*;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Boundary drive applied at the four corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// `sin(steps)` held for the whole run.
    FrozenSine,
    /// `voltage * sin(omega * step)`.
    Sine,
    /// `voltage` at every step.
    Constant,
}

/// Simulate voltage spreading through a mesh of RC elements.
#[derive(Debug, Parser)]
#[command(name = "rcgrid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parallel RC-mesh voltage simulator", long_about = None)]
struct Cli {
    /// Mesh rows. Must be a multiple of THREADS.
    rows: usize,

    /// Mesh columns.
    cols: usize,

    /// Simulated steps. The output holds STEPS + 2 frames.
    steps: u64,

    /// Worker threads.
    threads: usize,

    /// Gnuplot data file to write.
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Boundary source.
    #[arg(long, value_enum, default_value_t = SourceKind::FrozenSine)]
    source: SourceKind,

    /// Amplitude of the sine source, or level of the constant source [V].
    #[arg(long, default_value_t = 220.0)]
    voltage: f64,

    /// Angular step of the sine source [rad/step].
    #[arg(long, default_value_t = 1.0)]
    omega: f64,

    /// Element capacitance C.
    #[arg(long, default_value_t = 1.0)]
    capacitance: f64,

    /// Element resistance R.
    #[arg(long, default_value_t = 5.0)]
    resistance: f64,

    /// Integration step h.
    #[arg(long, default_value_t = 1.0)]
    step: f64,

    /// Run on the calling thread instead of the worker pool.
    #[arg(long)]
    serial: bool,

    /// Also write a gnuplot script that renders the output as a GIF.
    #[arg(long)]
    gnuplot_script: Option<PathBuf>,

    /// GIF the script should produce.
    #[arg(long, default_value = "grid.gif")]
    gif: PathBuf,

    /// Delay between animation frames [1/100 s].
    #[arg(long, default_value_t = 40)]
    delay: u32,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        SimConfig::new(self.rows, self.cols, self.steps, self.threads).with_constants(
            RcConstants::new(self.capacitance, self.resistance, self.step),
        )
    }

    fn boundary_source(&self) -> Box<dyn BoundarySource> {
        match self.source {
            SourceKind::FrozenSine => Box::new(FrozenSineSource::new(self.steps)),
            SourceKind::Sine => Box::new(SineSource::new(self.voltage, self.omega)),
            SourceKind::Constant => Box::new(ConstantSource(self.voltage)),
        }
    }

    fn script(&self) -> GnuplotScript {
        let mut script = GnuplotScript::new(self.rows, self.cols, self.steps, &self.output);
        script.gif_path = self.gif.clone();
        script.delay = self.delay;
        script
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let elapsed = simulate(&cli)?;
    println!("{}:{}", elapsed.as_secs(), elapsed.subsec_millis());
    Ok(())
}

/// Validate, run, and write the outputs. Returns the simulation time.
///
/// Nothing is created on disk until the parameters have been validated.
fn simulate(cli: &Cli) -> Result<Duration> {
    let config = cli.sim_config();
    config.validate().context("invalid simulation parameters")?;

    let mut source = cli.boundary_source();
    let sink = GnuplotTextSink::create(&cli.output)
        .with_context(|| format!("cannot create {}", cli.output.display()))?;
    let controller = StepController::new(config, move |step: StepId| source.voltage(step), sink)
        .context("invalid simulation parameters")?;

    let started = Instant::now();
    let report = if cli.serial {
        controller.run_serial()
    } else {
        controller.run()
    }
    .context("simulation failed")?;
    let elapsed = started.elapsed();

    info!(
        frames = report.metrics.frames_emitted,
        output = %cli.output.display(),
        "frames written"
    );

    if let Some(path) = &cli.gnuplot_script {
        cli.script()
            .write_to(path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!(script = %path.display(), "gnuplot script written");
    }
    Ok(elapsed)
}
