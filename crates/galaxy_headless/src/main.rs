//! Headless galaxy runner.
//!
//! Runs NPC-only galaxies without any interface and reports what happened
//! as JSON. Useful for tuning the economy and for CI determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # One galaxy, metrics printed to stdout
//! cargo run -p galaxy_headless -- run --seed 7 --ticks 2000
//!
//! # Many seeds in parallel
//! cargo run -p galaxy_headless -- batch --count 200 --output results/batch.json
//!
//! # Replay one seed and compare final hashes
//! cargo run -p galaxy_headless -- verify --seed 7 --runs 5
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the `-v` level.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use galaxy_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    config_loader::load_or_default,
    error::{HeadlessError, Result},
    runner::run_galaxy,
};

#[derive(Parser)]
#[command(name = "galaxy_headless")]
#[command(about = "Headless galaxy trading simulation runner")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Galaxy config file (RON); defaults are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single galaxy and report its metrics
    Run {
        /// Galaxy seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Ticks to simulate
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Write metrics here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run many seeds in parallel
    Batch {
        /// Number of galaxies to run
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// Seed of the first galaxy
        #[arg(long, default_value = "0")]
        start_seed: u64,

        /// Ticks per galaxy
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Worker threads (0 = one per core)
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Output JSON file
        #[arg(short, long, default_value = "results/batch.json")]
        output: PathBuf,
    },

    /// Replay one seed several times and compare final hashes
    Verify {
        /// Galaxy seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Ticks per run
        #[arg(short, long, default_value = "500")]
        ticks: u64,

        /// Number of runs
        #[arg(short, long, default_value = "3")]
        runs: u32,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = load_or_default(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Run {
            seed,
            ticks,
            output,
        } => cmd_run(&config, seed, ticks, output.as_deref()),
        Commands::Batch {
            count,
            start_seed,
            ticks,
            threads,
            output,
        } => cmd_batch(
            BatchConfig::new(count, ticks)
                .with_seed(start_seed)
                .with_threads(threads)
                .with_galaxy(config),
            &output,
        ),
        Commands::Verify { seed, ticks, runs } => cmd_verify(&config, seed, ticks, runs),
    });

    match outcome {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(
    config: &galaxy_core::config::GalaxyConfig,
    seed: u64,
    ticks: u64,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let metrics = run_galaxy(config, seed, ticks)?;
    let json = serde_json::to_string_pretty(&metrics)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).map_err(|e| HeadlessError::io(path, e))?;
            eprintln!("Metrics written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_batch(config: BatchConfig, output: &Path) -> Result<ExitCode> {
    let results = run_batch(config)?;
    results.save(output)?;

    let summary = &results.summary;
    eprintln!(
        "{} runs in {:.1}s ({} failed)",
        summary.total_runs,
        results.duration_seconds,
        results.errors.len()
    );
    eprintln!(
        "avg battles {:.1}, kills {:.1}, respawns {:.1}, NPC credits {:.0}",
        summary.avg_battles, summary.avg_kills, summary.avg_respawns, summary.avg_npc_credits
    );
    eprintln!("Results written to {}", output.display());

    Ok(if results.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_verify(
    config: &galaxy_core::config::GalaxyConfig,
    seed: u64,
    ticks: u64,
    runs: u32,
) -> Result<ExitCode> {
    tracing::info!(seed, ticks, runs, "Verifying determinism");

    let check = verify_determinism(config, seed, ticks, runs)?;
    if check.is_deterministic() {
        eprintln!("PASS: All {runs} runs produced identical results");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("FAIL: Non-determinism detected! Hashes: {:?}", check.hashes);
        Ok(ExitCode::FAILURE)
    }
}
