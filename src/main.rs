//! Decontam command line
//!
//! Validates scenario files and runs headless simulations.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use decontam::{Session, Settings, scenario};

/// Robot fleet decontamination simulator
#[derive(Parser, Debug)]
#[command(name = "decontam")]
#[command(about = "Validate and run decontamination scenarios")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a scenario file and report the first error
    Validate {
        file: PathBuf,
    },
    /// Run a scenario headless until it is clean or the tick limit is hit
    Run {
        file: PathBuf,

        /// Maximum ticks to run
        #[arg(long, default_value_t = 10_000)]
        ticks: u64,

        /// Random seed (overrides the settings file)
        #[arg(long)]
        seed: Option<u64>,

        /// JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Record the decontamination rate of every tick
        #[arg(long)]
        record: bool,

        /// Write the final scenario to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Outcome of a headless run
#[derive(Serialize, Debug)]
struct RunSummary {
    ticks: u64,
    robots: usize,
    particles_left: usize,
    initial_energy: f64,
    removed_energy: f64,
    rate: f64,
    seed: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Command::Validate { file } => validate(file),
        Command::Run {
            file,
            ticks,
            seed,
            config,
            record,
            save,
            json,
        } => run(file, ticks, seed, config, record, save, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let (robots, particles) = scenario::load_file(&file)?;
    println!(
        "{}: ok ({} robot(s), {} particle(s))",
        file.display(),
        robots.count(),
        particles.count()
    );
    Ok(())
}

fn run(
    file: PathBuf,
    ticks: u64,
    seed: Option<u64>,
    config: Option<PathBuf>,
    record: bool,
    save: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = match config {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    if let Some(seed) = seed {
        settings.seed = seed;
    }

    let mut session = Session::new(&settings);
    session.open(&file)?;
    if record {
        session.set_recording(true)?;
    }
    session.toggle_running();

    let mut ran = 0;
    while ran < ticks && session.idle() {
        ran += 1;
    }
    session.toggle_running();
    log::info!("Run finished after {} tick(s)", ran);

    if let Some(out) = save {
        session.save(&out)?;
    }

    let rate = session.rate();
    let summary = RunSummary {
        ticks: ran,
        robots: session.state.robots.count(),
        particles_left: session.state.particles.count(),
        initial_energy: rate.initial_energy,
        removed_energy: rate.removed_energy,
        rate: rate.rate,
        seed: settings.seed,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} tick(s), {} particle(s) left, rate {:.2}%",
            summary.ticks, summary.particles_left, summary.rate
        );
    }
    Ok(())
}
