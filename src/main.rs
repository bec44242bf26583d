//! parhist - parallel per-file letter-frequency histograms.
//!
//! The supervisor spawns one worker process per input and collects each
//! worker's histogram over a private channel as terminations are reaped.
//! The same binary doubles as the worker, re-entered through a hidden
//! `--internal-worker` flag.

mod cli;
mod error;
mod histogram;
mod logging;
mod report;
mod supervise;
mod worker;

use anyhow::Result;
use clap::Parser;
use owo_colors::{OwoColorize, Stream::Stderr};

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    logging::init(
        logging::LogConfig::default()
            .with_level(cli.log_level())
            .with_format(cli.log_format)
            .with_env_overrides(),
    );

    if cli.internal_worker {
        match cli.worker_context() {
            Ok(ctx) => worker::run_worker_main(ctx),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = run(&cli) {
        eprintln!(
            "{}: {}",
            "error"
                .if_supports_color(Stderr, |text| text.red())
                .if_supports_color(Stderr, |text| text.bold()),
            e
        );
        // Print the error chain if there are causes
        for cause in e.chain().skip(1) {
            eprintln!(
                "  {}: {}",
                "caused by".if_supports_color(Stderr, |text| text.yellow()),
                cause
            );
        }
        std::process::exit(1);
    }
}

/// Supervise one full run and report the outcome.
fn run(cli: &Cli) -> Result<()> {
    let config = supervise::SupervisorConfig {
        output_dir: cli.output_dir.clone(),
        worker_options: cli.worker_options(),
    };

    let summary = supervise::run(&cli.inputs, &config)?;

    if !cli.quiet {
        eprintln!(
            "Processed {} workers: {} persisted, {} interrupted.",
            summary.spawned, summary.persisted, summary.interrupted
        );
    }
    Ok(())
}
