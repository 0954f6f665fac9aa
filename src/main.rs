//! Presidential Plinko entry point
//!
//! Reads settings, plans the drop and writes the renderer export.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use presidential_plinko::{Settings, TargetMode, plan};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to settings JSON (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for target sampling and path shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Number of balls to drop
    #[arg(long)]
    balls: Option<usize>,

    /// Forecast mean
    #[arg(long)]
    mean: Option<f64>,

    /// Forecast standard deviation
    #[arg(long)]
    sd: Option<f64>,

    /// Number of pin rows
    #[arg(long)]
    rows: Option<u32>,

    /// Target assignment: quantile or sample
    #[arg(long, value_parser = parse_mode)]
    mode: Option<TargetMode>,

    /// Include per-tick frames in the export
    #[arg(long, default_value_t = false)]
    frames: bool,

    /// Write the export here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn parse_mode(s: &str) -> Result<TargetMode, String> {
    TargetMode::from_str(s).ok_or_else(|| format!("unknown target mode '{s}' (quantile or sample)"))
}

fn settings_from(args: &Args) -> presidential_plinko::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(balls) = args.balls {
        settings.balls = balls;
    }
    if let Some(mean) = args.mean {
        settings.mean = mean;
    }
    if let Some(sd) = args.sd {
        settings.sd = sd;
    }
    if (args.mean.is_some() || args.sd.is_some()) && settings.forecast.take().is_some() {
        log::warn!("--mean/--sd override the forecast distribution from the config");
    }
    if let Some(rows) = args.rows {
        settings.pin_rows = rows;
    }
    if let Some(mode) = args.mode {
        settings.target_mode = mode;
    }
    settings.include_frames |= args.frames;

    Ok(settings)
}

fn run(args: &Args) -> presidential_plinko::Result<()> {
    let settings = settings_from(args)?;
    log::info!("Planning with seed: {}", settings.seed);

    let export = plan(&settings)?;
    match &args.output {
        Some(path) => export.write_json(path)?,
        None => println!("{}", export.to_json_string()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
