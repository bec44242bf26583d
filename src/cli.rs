//! Command-line interface definitions using clap.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::error::{ParhistError, Result};
use crate::logging::LogFormat;
use crate::supervise::{WorkerInput, WorkerOptions};
use crate::worker::WorkerContext;

/// Parallel per-file letter-frequency histograms, one worker process per
/// input.
#[derive(Parser, Debug)]
#[command(name = "parhist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input files to histogram, or the literal token "SIG" for a worker
    /// that waits to be interrupted.
    pub inputs: Vec<String>,

    /// Directory where result files are written.
    #[arg(short, long, env = "PARHIST_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Stagger sleep applied by every worker after transmitting (ms).
    #[arg(long, default_value_t = 250)]
    pub stagger_base_ms: u64,

    /// Additional stagger sleep per worker index (ms).
    #[arg(long, default_value_t = 100)]
    pub stagger_step_ms: u64,

    /// How long a "SIG" worker waits for its interrupt before giving up (ms).
    #[arg(long, default_value_t = 10_000)]
    pub sig_timeout_ms: u64,

    /// Log output format.
    #[arg(long, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Enable verbose output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Run as an internal worker (spawned by the supervisor).
    #[arg(long, hide = true)]
    pub internal_worker: bool,

    /// Position of this worker in the spawn order.
    #[arg(long, hide = true, default_value_t = 0)]
    pub worker_index: usize,
}

impl Cli {
    /// Log level implied by the verbosity flags.
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            }
        }
    }

    /// Worker options forwarded to every spawned worker.
    pub fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            stagger_base_ms: self.stagger_base_ms,
            stagger_step_ms: self.stagger_step_ms,
            sig_timeout_ms: self.sig_timeout_ms,
        }
    }

    /// Decode the hidden worker-mode flags into a worker context.
    pub fn worker_context(&self) -> Result<WorkerContext> {
        let raw = self.inputs.first().ok_or_else(|| {
            ParhistError::Config("internal worker invoked without an input".to_string())
        })?;
        Ok(WorkerContext {
            index: self.worker_index,
            input: WorkerInput::parse(raw),
            options: self.worker_options(),
        })
    }
}
